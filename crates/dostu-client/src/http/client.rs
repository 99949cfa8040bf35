// HTTP implementation of the exchange endpoint

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::Value;

use crate::config::EndpointConfig;
use crate::error::ExchangeError;
use crate::traits::{ExchangeClient, ExchangeReply, ExchangeRequest};

const SUCCESS_STATUS: &str = "success";

/// Exchange client talking JSON over HTTPS with a bearer token
pub struct HttpExchangeClient {
    http_client: reqwest::Client,
    url: String,
}

impl HttpExchangeClient {
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                .context("Invalid API token format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            url: config.url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Response envelope: `{"status": "success", "data": {"response": "..."}}`
#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    status: Option<String>,
    data: Option<ReplyData>,
}

#[derive(Debug, Deserialize)]
struct ReplyData {
    response: Option<String>,
}

/// Accept a response body only if it reports success and carries reply text
fn interpret_body(raw: Value) -> Result<ExchangeReply, ExchangeError> {
    let envelope: ReplyEnvelope = serde_json::from_value(raw.clone())
        .map_err(|e| ExchangeError::MalformedBody(e.to_string()))?;

    if envelope.status.as_deref() != Some(SUCCESS_STATUS) {
        return Err(ExchangeError::Rejected(envelope.status));
    }

    let text = envelope
        .data
        .and_then(|d| d.response)
        .filter(|text| !text.is_empty())
        .ok_or(ExchangeError::EmptyReply)?;

    Ok(ExchangeReply { text, raw })
}

#[async_trait]
impl ExchangeClient for HttpExchangeClient {
    async fn exchange(&self, request: ExchangeRequest) -> Result<ExchangeReply, ExchangeError> {
        tracing::debug!(
            url = %self.url,
            history = request.conversation_history.len(),
            "Sending exchange request"
        );

        let response = self.http_client.post(&self.url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ExchangeError::MalformedBody(e.to_string()))?;

        interpret_body(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = HttpExchangeClient::new(&EndpointConfig::new("https://example.test", "tok"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().url(), "https://example.test/yoldostu/chat");
    }

    #[test]
    fn test_invalid_token_rejected() {
        let client = HttpExchangeClient::new(&EndpointConfig::new("https://example.test", "bad\ntoken"));
        assert!(client.is_err());
    }

    #[test]
    fn test_interpret_success() {
        let reply = interpret_body(json!({"status": "success", "data": {"response": "Cavab"}})).unwrap();
        assert_eq!(reply.text, "Cavab");
    }

    #[test]
    fn test_interpret_wrong_status() {
        let err = interpret_body(json!({"status": "error", "data": {"response": "Cavab"}})).unwrap_err();
        assert!(matches!(err, ExchangeError::Rejected(Some(s)) if s == "error"));

        let err = interpret_body(json!({"data": {"response": "Cavab"}})).unwrap_err();
        assert!(matches!(err, ExchangeError::Rejected(None)));
    }

    #[test]
    fn test_interpret_missing_or_empty_text() {
        assert!(matches!(
            interpret_body(json!({"status": "success"})),
            Err(ExchangeError::EmptyReply)
        ));
        assert!(matches!(
            interpret_body(json!({"status": "success", "data": {}})),
            Err(ExchangeError::EmptyReply)
        ));
        assert!(matches!(
            interpret_body(json!({"status": "success", "data": {"response": ""}})),
            Err(ExchangeError::EmptyReply)
        ));

        // Whitespace is still a reply
        let reply = interpret_body(json!({"status": "success", "data": {"response": "  "}})).unwrap();
        assert_eq!(reply.text, "  ");
    }

    #[test]
    fn test_interpret_wrong_shape() {
        assert!(matches!(
            interpret_body(json!({"status": 200})),
            Err(ExchangeError::MalformedBody(_))
        ));
        assert!(matches!(
            interpret_body(json!(["not", "an", "object"])),
            Err(ExchangeError::MalformedBody(_))
        ));
    }
}
