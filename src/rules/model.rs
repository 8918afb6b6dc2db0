//! Rule-set data model — conditions, predicates, rules, actions.
//!
//! The serde shapes match the rules.json wire format: a rule carries a
//! `conditions` block with a `match` policy and a `rules` array of
//! conditions, plus an ordered `actions` list. Condition values may be
//! JSON strings or integers; both deserialize to a string.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RuleSetError;

/// Reserved pseudo-field: the age of a message relative to its Date header.
pub const RECEIVED_AT: &str = "received_at";

/// The closed set of condition predicates.
///
/// Unknown tokens are rejected at deserialization time, so evaluation can
/// match exhaustively without a runtime "unsupported predicate" fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateKind {
    Contains,
    NotContains,
    Equals,
    NotEquals,
    IsLessThan,
    IsGreaterThan,
}

impl PredicateKind {
    /// The wire token for this predicate.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::NotContains => "not_contains",
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::IsLessThan => "is_less_than",
            Self::IsGreaterThan => "is_greater_than",
        }
    }

    /// Whether this predicate compares message age rather than header text.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::IsLessThan | Self::IsGreaterThan)
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// How a rule combines its condition results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Every condition must hold. Vacuously true with zero conditions.
    All,
    /// At least one condition must hold. Vacuously false with zero conditions.
    Any,
}

/// A single field/predicate/value test against a message's headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Header name to look up, or the `received_at` pseudo-field.
    pub field: String,
    pub predicate: PredicateKind,
    /// Comparison operand. For `received_at` this is a relative duration
    /// string such as `"2 days"` or `"1 month"`.
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
}

impl Condition {
    /// Whether this condition targets the message-age pseudo-field.
    pub fn is_temporal_field(&self) -> bool {
        self.field == RECEIVED_AT
    }
}

/// The `conditions` block of a rule: a match policy plus the condition list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionBlock {
    #[serde(rename = "match")]
    pub policy: MatchPolicy,
    #[serde(default)]
    pub rules: Vec<Condition>,
}

/// An opaque action token, passed through to the executor unmodified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Action(pub String);

impl Action {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A combination of conditions plus an ordered action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Optional human-readable name, used in logs and error records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub conditions: ConditionBlock,
    pub actions: Vec<Action>,
}

impl Rule {
    /// Display label: the rule's name, or its position in the set.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("rule[{index}]"),
        }
    }
}

/// An ordered, validated sequence of rules. Immutable during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Reject malformed field/predicate combinations before any evaluation.
    ///
    /// `received_at` pairs only with the temporal predicates; every other
    /// field pairs only with the four string predicates.
    pub fn validate(&self) -> std::result::Result<(), RuleSetError> {
        for (index, rule) in self.rules.iter().enumerate() {
            for condition in &rule.conditions.rules {
                let temporal_field = condition.is_temporal_field();
                let temporal_predicate = condition.predicate.is_temporal();
                if temporal_field != temporal_predicate {
                    return Err(RuleSetError::InvalidCondition {
                        rule: rule.label(index),
                        detail: format!(
                            "predicate '{}' cannot be used with field '{}'",
                            condition.predicate, condition.field
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Accept a JSON string or integer for a condition value.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    })
}
