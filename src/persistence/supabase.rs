// src/persistence/supabase.rs
// Supabase (PostgREST) insert into the `messages` table

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{LogError, MessageLog, MessageRecord, StoredMessage};

const MESSAGES_TABLE: &str = "messages";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct SupabaseMessageLog {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: String,
    #[serde(default)]
    code: Option<String>,
}

impl SupabaseMessageLog {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| HttpClient::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, MESSAGES_TABLE)
    }
}

#[async_trait]
impl MessageLog for SupabaseMessageLog {
    async fn insert(&self, record: MessageRecord) -> Result<StoredMessage, LogError> {
        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=representation")
            .json(&[&record])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<PostgrestError>(&body) {
                Ok(err) => match err.code {
                    Some(code) => format!("{} ({})", err.message, code),
                    None => err.message,
                },
                Err(_) => format!("Supabase insert failed: {} {}", status, body.trim()),
            };
            return Err(LogError::Store {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<StoredMessage> = response.json().await?;
        debug!(rows = rows.len(), "Supabase insert complete");
        rows.into_iter().next().ok_or(LogError::NoRowReturned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let log = SupabaseMessageLog::new("https://abc.supabase.co/".into(), "anon".into());
        assert_eq!(log.table_url(), "https://abc.supabase.co/rest/v1/messages");
    }

    #[tokio::test]
    async fn test_unreachable_store_is_http_error() {
        let log = SupabaseMessageLog::new("http://127.0.0.1:1".into(), "anon".into());
        let err = log
            .insert(MessageRecord {
                text: "hi".into(),
                sender: "user".into(),
                user_id: "u1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, LogError::Http(_)));
    }
}
