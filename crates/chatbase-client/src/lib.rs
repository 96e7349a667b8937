//! HTTP client for the Chatbase conversations API.

use chatbase_config::{ApiSettings, ExportSettings};
use chatbase_core::{ChatbaseError, ConversationRecord, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

pub struct ConversationClient {
    http: reqwest::Client,
    base_url: String,
}

impl ConversationClient {
    /// Build a client with the bearer token installed as a default header.
    pub fn new(api: &ApiSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", api.api_key))
            .map_err(|e| ChatbaseError::Config(format!("Invalid API key header value: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(api.timeout_ms))
            .default_headers(headers)
            .build()
            .map_err(|e| ChatbaseError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: api.base_url.clone(),
        })
    }

    /// Fetch conversations for the configured chatbot and date range.
    ///
    /// One GET request, no pagination. Non-2xx responses carry the body
    /// text back to the caller for display.
    pub async fn fetch_conversations(&self, query: &ExportSettings) -> Result<ConversationPage> {
        info!(
            "Fetching conversations for chatbot {} ({} to {})",
            query.chatbot_id, query.start_date, query.end_date
        );

        let mut request = self.http.get(&self.base_url).query(&[
            ("chatbotId", query.chatbot_id.as_str()),
            ("startDate", query.start_date.as_str()),
            ("endDate", query.end_date.as_str()),
        ]);
        if let Some(sources) = &query.filtered_sources {
            request = request.query(&[("filteredSources", sources.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ChatbaseError::Request(format!("Error fetching conversations: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatbaseError::Request(format!("Error reading response body: {}", e)))?;

        if !status.is_success() {
            return Err(ChatbaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = serde_json::from_str(&body)
            .map_err(|source| ChatbaseError::Decode { source, body })?;

        let page = ConversationPage::from_value(raw);
        debug!(
            "Normalized {} conversation(s) from response",
            page.conversations.len()
        );
        Ok(page)
    }
}

/// One parsed API response: the raw body plus the normalized records.
///
/// The raw body is kept so the zero-conversation report can dump it for
/// operators to inspect unexpected shapes.
#[derive(Debug, Clone)]
pub struct ConversationPage {
    pub raw: Value,
    pub conversations: Vec<ConversationRecord>,
}

impl ConversationPage {
    pub fn from_value(raw: Value) -> Self {
        let conversations = normalize_conversations(&raw)
            .into_iter()
            .map(ConversationRecord::new)
            .collect();
        Self { raw, conversations }
    }
}

/// Flatten the known response shapes into one conversation list.
///
/// Precedence: a `conversations` key, then a `data` key, then the whole
/// mapping as a single conversation; a bare array is used directly. An
/// empty mapping, a scalar body, or a null-valued key yields an empty
/// list.
fn normalize_conversations(raw: &Value) -> Vec<Value> {
    match raw {
        Value::Object(map) => match map.get("conversations").or_else(|| map.get("data")) {
            Some(Value::Array(items)) => items.clone(),
            Some(Value::Null) => Vec::new(),
            Some(single) => vec![single.clone()],
            None if map.is_empty() => Vec::new(),
            None => vec![raw.clone()],
        },
        Value::Array(items) => items.clone(),
        _ => Vec::new(),
    }
}
