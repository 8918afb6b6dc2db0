//! Relative-duration strings for `received_at` conditions.
//!
//! Grammar: `"<integer> day(s)"` or `"<integer> month(s)"`, whitespace
//! tolerant, plural optional. A month is exactly [`DAYS_PER_MONTH`] days;
//! calendar-aware month arithmetic was never part of the rule format.

use chrono::TimeDelta;

use crate::error::EvaluationError;

/// Days in a "month" duration token. An explicit approximation.
pub const DAYS_PER_MONTH: i64 = 30;

/// A parsed relative duration, held at day granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeDuration {
    days: i64,
}

impl RelativeDuration {
    pub fn days(days: i64) -> Self {
        Self { days }
    }

    pub fn months(months: i64) -> Self {
        Self {
            days: months * DAYS_PER_MONTH,
        }
    }

    /// The duration as a chrono delta, for comparison against message age.
    pub fn as_delta(&self) -> TimeDelta {
        TimeDelta::days(self.days)
    }

    /// Parse a duration string such as `"2 days"` or `"1 month"`.
    pub fn parse(input: &str) -> Result<Self, EvaluationError> {
        let mut tokens = input.split_whitespace();
        let (Some(count_token), Some(unit_token)) = (tokens.next(), tokens.next()) else {
            // No unit at all (e.g. a bare "2").
            return Err(EvaluationError::UnsupportedDurationUnit {
                token: input.trim().to_string(),
            });
        };
        if tokens.next().is_some() {
            return Err(EvaluationError::InvalidDurationValue {
                value: input.trim().to_string(),
            });
        }

        let count: i64 = count_token.parse().map_err(|_| {
            EvaluationError::InvalidDurationValue {
                value: input.trim().to_string(),
            }
        })?;
        if count < 0 {
            return Err(EvaluationError::InvalidDurationValue {
                value: input.trim().to_string(),
            });
        }

        match unit_token.to_ascii_lowercase().as_str() {
            "day" | "days" => Ok(Self::days(count)),
            "month" | "months" => Ok(Self::months(count)),
            other => Err(EvaluationError::UnsupportedDurationUnit {
                token: other.to_string(),
            }),
        }
    }
}
