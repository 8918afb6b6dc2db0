//! Rule engine — runs a rule set over stored messages and dispatches actions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{ActionError, Error, EvaluationError, RuleSetError};
use crate::rules::headers::HeaderIndex;
use crate::rules::matcher;
use crate::rules::model::{Action, RuleSet};
use crate::store::MessageStore;

/// Executes an ordered action list against the mail provider.
///
/// Actions must be idempotent at this layer: the same message may be
/// re-evaluated across runs and the same submission re-applied.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Apply each action in order for the given message. May no-op on an
    /// empty list.
    async fn apply(&self, message_id: &str, actions: &[Action]) -> Result<(), ActionError>;
}

/// What to do when a (message, rule) evaluation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Record the error in the summary and continue with the next rule.
    #[default]
    ContinueOnError,
    /// Abort the whole run on the first evaluation error.
    FailFast,
}

/// An error recorded against a single (message, rule) pair.
#[derive(Debug)]
pub enum RunError {
    Evaluation {
        message_id: String,
        rule: String,
        error: EvaluationError,
    },
    Action {
        message_id: String,
        rule: String,
        error: ActionError,
    },
}

/// Aggregate outcome of one engine run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub messages_processed: usize,
    pub rules_matched: usize,
    /// Individual action tokens submitted across all matching rules.
    pub actions_submitted: usize,
    pub errors: Vec<RunError>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Evaluates a validated rule set against every stored message.
pub struct RuleEngine {
    rule_set: RuleSet,
    failure_mode: FailureMode,
}

impl RuleEngine {
    /// Create an engine, re-validating the rule set so a malformed set is
    /// rejected before any message is touched.
    pub fn new(rule_set: RuleSet, failure_mode: FailureMode) -> Result<Self, RuleSetError> {
        rule_set.validate()?;
        Ok(Self {
            rule_set,
            failure_mode,
        })
    }

    /// Run against the current clock.
    pub async fn run(
        &self,
        store: &dyn MessageStore,
        executor: &dyn ActionExecutor,
    ) -> Result<RunSummary, Error> {
        self.run_at(store, executor, Utc::now()).await
    }

    /// Run with an explicit evaluation instant, for deterministic tests.
    ///
    /// For each message a header index is built once; rules are checked in
    /// rule-set order and each match yields its own executor submission
    /// carrying only that rule's action list. Evaluation errors isolate to
    /// the (message, rule) pair under [`FailureMode::ContinueOnError`];
    /// action errors are always recorded and never block later submissions.
    pub async fn run_at(
        &self,
        store: &dyn MessageStore,
        executor: &dyn ActionExecutor,
        now: DateTime<Utc>,
    ) -> Result<RunSummary, Error> {
        let messages = store.list_all().await?;
        let mut summary = RunSummary::new();
        info!(
            run_id = %summary.run_id,
            messages = messages.len(),
            rules = self.rule_set.rules.len(),
            "Starting rule engine run"
        );

        for message in &messages {
            let index = HeaderIndex::build(message);

            for (rule_index, rule) in self.rule_set.rules.iter().enumerate() {
                let label = rule.label(rule_index);
                match matcher::matches(rule, &index, now) {
                    Ok(false) => {}
                    Ok(true) => {
                        summary.rules_matched += 1;
                        debug!(
                            message_id = %message.id,
                            rule = %label,
                            actions = rule.actions.len(),
                            "Rule matched"
                        );
                        match executor.apply(&message.id, &rule.actions).await {
                            Ok(()) => summary.actions_submitted += rule.actions.len(),
                            Err(error) => {
                                warn!(
                                    message_id = %message.id,
                                    rule = %label,
                                    error = %error,
                                    "Action submission failed"
                                );
                                summary.errors.push(RunError::Action {
                                    message_id: message.id.clone(),
                                    rule: label,
                                    error,
                                });
                            }
                        }
                    }
                    Err(error) => {
                        warn!(
                            message_id = %message.id,
                            rule = %label,
                            error = %error,
                            "Rule evaluation failed"
                        );
                        if self.failure_mode == FailureMode::FailFast {
                            return Err(error.into());
                        }
                        summary.errors.push(RunError::Evaluation {
                            message_id: message.id.clone(),
                            rule: label,
                            error,
                        });
                    }
                }
            }

            summary.messages_processed += 1;
        }

        info!(
            run_id = %summary.run_id,
            messages = summary.messages_processed,
            matched = summary.rules_matched,
            actions = summary.actions_submitted,
            errors = summary.errors.len(),
            "Rule engine run complete"
        );
        Ok(summary)
    }
}
