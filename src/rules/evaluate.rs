//! Single-condition evaluation against a header index.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::EvaluationError;
use crate::rules::duration::RelativeDuration;
use crate::rules::headers::HeaderIndex;
use crate::rules::model::{Condition, PredicateKind, RECEIVED_AT};

/// Evaluate one condition against a message's headers.
///
/// `now` is threaded in explicitly so tests can pin the evaluation instant;
/// production callers pass the real clock.
pub fn evaluate(
    condition: &Condition,
    index: &HeaderIndex,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    if condition.field == RECEIVED_AT {
        return evaluate_age(condition, index, now);
    }

    let field_value = index.get(&condition.field).unwrap_or("");
    match condition.predicate {
        PredicateKind::Contains => Ok(field_value.contains(&condition.value)),
        PredicateKind::NotContains => Ok(!field_value.contains(&condition.value)),
        PredicateKind::Equals => Ok(field_value == condition.value),
        PredicateKind::NotEquals => Ok(field_value != condition.value),
        PredicateKind::IsLessThan | PredicateKind::IsGreaterThan => {
            Err(EvaluationError::InvalidFieldCombination {
                field: condition.field.clone(),
                predicate: condition.predicate.to_string(),
            })
        }
    }
}

/// Compare the message's age against a relative-duration threshold.
///
/// Both comparisons are strict; an age exactly at the threshold matches
/// neither `is_less_than` nor `is_greater_than`.
fn evaluate_age(
    condition: &Condition,
    index: &HeaderIndex,
    now: DateTime<Utc>,
) -> Result<bool, EvaluationError> {
    let raw_date = index.get("date").ok_or_else(|| EvaluationError::DateParse {
        reason: "missing Date header".into(),
    })?;
    let message_date = parse_message_date(raw_date)?;
    let threshold = RelativeDuration::parse(&condition.value)?;

    // The sender's UTC offset is discarded: the printed wall-clock time is
    // subtracted from naive UTC now. This matches the reference behavior of
    // the rule format and existing rule fixtures depend on it.
    let age = now.naive_utc() - message_date;

    match condition.predicate {
        PredicateKind::IsLessThan => Ok(age < threshold.as_delta()),
        PredicateKind::IsGreaterThan => Ok(age > threshold.as_delta()),
        other => Err(EvaluationError::InvalidFieldCombination {
            field: RECEIVED_AT.into(),
            predicate: other.to_string(),
        }),
    }
}

/// Parse a Date header permissively: RFC 2822 first, then a chain of
/// fallback formats. The timezone offset, when present, is dropped.
fn parse_message_date(raw: &str) -> Result<NaiveDateTime, EvaluationError> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }
    // RFC 2822 without the weekday prefix
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%d %b %Y %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(d.and_hms_opt(0, 0, 0).unwrap());
    }

    Err(EvaluationError::DateParse {
        reason: format!("unrecognized date format: '{trimmed}'"),
    })
}
