//! Match-all / match-any combination of condition results.

use chrono::{DateTime, Utc};

use crate::error::EvaluationError;
use crate::rules::evaluate::evaluate;
use crate::rules::headers::HeaderIndex;
use crate::rules::model::{MatchPolicy, Rule};

/// Decide whether a rule matches a message's headers.
///
/// Conditions are evaluated in declaration order and combined per the
/// rule's match policy: `all` requires every result true (vacuously true
/// with zero conditions), `any` requires at least one (vacuously false
/// with zero conditions). A condition-level error aborts matching for
/// this rule and propagates to the caller.
pub fn matches(
    rule: &Rule,
    index: &HeaderIndex,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    let mut results = Vec::with_capacity(rule.conditions.rules.len());
    for condition in &rule.conditions.rules {
        results.push(evaluate(condition, index, now)?);
    }

    Ok(match rule.conditions.policy {
        MatchPolicy::All => results.iter().all(|&matched| matched),
        MatchPolicy::Any => results.iter().any(|&matched| matched),
    })
}
