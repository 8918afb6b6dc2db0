//! Rule-set loading — JSON file to validated `RuleSet`.

use std::path::Path;

use tracing::info;

use crate::error::RuleSetError;
use crate::rules::model::RuleSet;

/// Load and validate a rule set from a JSON file.
///
/// The file holds a top-level array of rules. Any shape or
/// field/predicate-combination problem is rejected here, before a single
/// message is evaluated.
pub fn load_rules(path: &Path) -> Result<RuleSet, RuleSetError> {
    let raw = std::fs::read_to_string(path)?;
    let set = parse_rules(&raw)?;
    info!(path = %path.display(), rules = set.rules.len(), "Rule set loaded");
    Ok(set)
}

/// Parse and validate a rule set from a JSON string.
pub fn parse_rules(raw: &str) -> Result<RuleSet, RuleSetError> {
    let set: RuleSet = serde_json::from_str(raw)?;
    set.validate()?;
    Ok(set)
}
