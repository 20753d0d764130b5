//! Textbelt SMS sender.
//!
//! POSTs `{phone, message, key}` as JSON and reads back
//! `{success, textId, error}`. The body is read as text first so a non-JSON
//! reply can be reported as a malformed response rather than a transport error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SmsConfig;
use crate::domain::DeliveryError;
use crate::ports::NotificationSender;

#[derive(Debug, Serialize)]
struct TextbeltRequest<'a> {
    phone: &'a str,
    message: &'a str,
    key: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextbeltResponse {
    success: bool,
    #[serde(default)]
    text_id: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Sends reminders through the Textbelt HTTP API.
#[derive(Clone)]
pub struct TextbeltSender {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl TextbeltSender {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build from config; the key comes from [`SmsConfig::resolved_api_key`].
    pub fn from_config(config: &SmsConfig) -> Self {
        Self::new(config.endpoint.clone(), config.resolved_api_key())
    }
}

#[async_trait]
impl NotificationSender for TextbeltSender {
    async fn send(&self, phone: &str, message: &str) -> Result<String, DeliveryError> {
        if phone.trim().is_empty() || message.trim().is_empty() {
            return Err(DeliveryError::InvalidRequest(
                "missing phone or message".to_string(),
            ));
        }

        let body = TextbeltRequest {
            phone,
            message,
            key: &self.api_key,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let raw = response
            .text()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        debug!(body = %raw, "textbelt response");

        let result: TextbeltResponse = serde_json::from_str(&raw)
            .map_err(|e| DeliveryError::MalformedResponse(format!("invalid JSON: {e}")))?;

        if !result.success {
            let reason = result
                .error
                .unwrap_or_else(|| "unknown error from SMS API".to_string());
            warn!(error = %reason, "textbelt rejected message");
            return Err(DeliveryError::Rejected(reason));
        }

        // textId is numeric in current responses, a string in older ones
        let text_id = match result.text_id {
            Some(serde_json::Value::String(id)) => id,
            Some(serde_json::Value::Number(id)) => id.to_string(),
            _ => "N/A".to_string(),
        };
        Ok(text_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn sender_for(server: &MockServer) -> TextbeltSender {
        TextbeltSender::new(format!("{}/text", server.uri()), "test-key")
    }

    #[tokio::test]
    async fn posts_phone_message_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/text"))
            .and(body_json(json!({
                "phone": "+15550100",
                "message": "stretch",
                "key": "test-key"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "textId": 12345})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let id = sender_for(&server)
            .await
            .send("+15550100", "stretch")
            .await
            .unwrap();
        assert_eq!(id, "12345");
    }

    #[tokio::test]
    async fn missing_text_id_is_reported_as_na() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let id = sender_for(&server).await.send("+1555", "hi").await.unwrap();
        assert_eq!(id, "N/A");
    }

    #[tokio::test]
    async fn provider_failure_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "Out of quota"})),
            )
            .mount(&server)
            .await;

        let err = sender_for(&server).await.send("+1555", "hi").await.unwrap_err();
        assert_eq!(err, DeliveryError::Rejected("Out of quota".to_string()));
    }

    #[tokio::test]
    async fn provider_failure_without_reason_gets_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let err = sender_for(&server).await.send("+1555", "hi").await.unwrap_err();
        assert_eq!(
            err,
            DeliveryError::Rejected("unknown error from SMS API".to_string())
        );
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = sender_for(&server).await.send("+1555", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_phone_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = sender_for(&server).await.send("", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let sender = TextbeltSender::new("http://127.0.0.1:9/text", "k");
        let err = sender.send("+1555", "hi").await.unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
