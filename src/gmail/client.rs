//! Gmail REST client — message listing, metadata fetch, label modification.
//!
//! Talks to the Gmail v1 API over plain HTTP with a bearer token obtained
//! out-of-band. Only the metadata surface this crate needs is covered.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use crate::error::{ActionError, MailError};
use crate::ingest::MailService;
use crate::store::{Header, MessageRecord};

/// Default API root; overridable for tests and proxies.
pub const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Gmail API client for a single account.
pub struct GmailClient {
    http: reqwest::Client,
    base_url: String,
    access_token: SecretString,
}

impl GmailClient {
    pub fn new(base_url: impl Into<String>, access_token: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            access_token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/users/me/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn get_json(&self, url: &str) -> Result<String, MailError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MailError::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(MailError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(body)
    }

    /// Add/remove labels on a message. The modify endpoint is idempotent:
    /// re-applying the same label change is a no-op on the provider side.
    pub async fn modify_labels(
        &self,
        message_id: &str,
        add: &[String],
        remove: &[String],
    ) -> Result<(), ActionError> {
        let body = serde_json::json!({
            "addLabelIds": add,
            "removeLabelIds": remove,
        });

        let response = self
            .http
            .post(self.url(&format!("messages/{message_id}/modify")))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ActionError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ActionError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        debug!(message_id = %message_id, add = ?add, remove = ?remove, "Labels modified");
        Ok(())
    }
}

#[async_trait::async_trait]
impl MailService for GmailClient {
    async fn list_message_ids(&self, max_results: u32) -> Result<Vec<String>, MailError> {
        let url = format!("{}?maxResults={max_results}", self.url("messages"));
        let body = self.get_json(&url).await?;
        decode_message_list(&body)
    }

    async fn fetch_message(&self, id: &str) -> Result<MessageRecord, MailError> {
        let url = format!("{}?format=metadata", self.url(&format!("messages/{id}")));
        let body = self.get_json(&url).await?;
        decode_message(&body)
    }
}

// ── Response decoding ───────────────────────────────────────────────

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
}

#[derive(Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Deserialize)]
struct MessageResponse {
    id: String,
    #[serde(default)]
    payload: Payload,
}

#[derive(Deserialize, Default)]
struct Payload {
    #[serde(default)]
    headers: Vec<Header>,
}

fn decode_message_list(body: &str) -> Result<Vec<String>, MailError> {
    let response: ListResponse =
        serde_json::from_str(body).map_err(|e| MailError::Decode(e.to_string()))?;
    Ok(response.messages.into_iter().map(|m| m.id).collect())
}

fn decode_message(body: &str) -> Result<MessageRecord, MailError> {
    let response: MessageResponse =
        serde_json::from_str(body).map_err(|e| MailError::Decode(e.to_string()))?;
    Ok(MessageRecord {
        id: response.id,
        headers: response.payload.headers,
    })
}
