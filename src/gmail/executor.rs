//! `ActionExecutor` implementation backed by Gmail label changes.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ActionError;
use crate::gmail::client::GmailClient;
use crate::rules::engine::ActionExecutor;
use crate::rules::model::Action;

/// Prefix for folder-move action tokens; the suffix names the folder.
const MOVE_TO_PREFIX: &str = "move_to_";

/// Gmail's unread marker label.
const UNREAD_LABEL: &str = "UNREAD";

/// Labels to add and remove for one action token.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LabelChange {
    add: Vec<String>,
    remove: Vec<String>,
}

/// Translate an opaque action token into a Gmail label change.
///
/// `move_to_<folder>` maps to adding the upper-cased folder label, so
/// `move_to_inbox` adds `INBOX`. Unknown tokens are rejected.
fn translate(action: &Action) -> Result<LabelChange, ActionError> {
    match action.as_str() {
        "mark_as_read" => Ok(LabelChange {
            add: vec![],
            remove: vec![UNREAD_LABEL.into()],
        }),
        "mark_as_unread" => Ok(LabelChange {
            add: vec![UNREAD_LABEL.into()],
            remove: vec![],
        }),
        token => match token.strip_prefix(MOVE_TO_PREFIX) {
            Some(folder) if !folder.is_empty() => Ok(LabelChange {
                add: vec![folder.to_uppercase()],
                remove: vec![],
            }),
            _ => Err(ActionError::UnsupportedAction {
                token: token.to_string(),
            }),
        },
    }
}

/// Applies rule actions to Gmail messages via the modify endpoint.
///
/// Label changes are idempotent on the provider side, so re-applying a
/// submission from a previous run is safe.
pub struct GmailExecutor {
    client: GmailClient,
}

impl GmailExecutor {
    pub fn new(client: GmailClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ActionExecutor for GmailExecutor {
    async fn apply(&self, message_id: &str, actions: &[Action]) -> Result<(), ActionError> {
        if actions.is_empty() {
            return Ok(());
        }

        for action in actions {
            let change = translate(action)?;
            self.client
                .modify_labels(message_id, &change.add, &change.remove)
                .await?;
            debug!(message_id = %message_id, action = %action, "Action applied");
        }
        Ok(())
    }
}
