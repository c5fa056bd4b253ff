//! Slack incoming-webhook delivery channel.

use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::error::ChannelError;
use crate::message::SlackMessage;
use crate::DeliveryChannel;

/// Fallback wait reported when Slack rate limits without a `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Slack webhook delivery channel.
pub struct SlackChannel {
    webhook_url: String,
    client: reqwest::Client,
}

impl SlackChannel {
    /// Create a Slack channel with a specific webhook URL.
    #[must_use]
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self::with_client(webhook_url, reqwest::Client::new())
    }

    /// Create a Slack channel that reuses an existing HTTP client.
    #[must_use]
    pub fn with_client(webhook_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client,
        }
    }
}

#[async_trait]
impl DeliveryChannel for SlackChannel {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(&self, message: &SlackMessage) -> Result<(), ChannelError> {
        debug!(channel = "slack", text = %message.text, "Sending notification");

        let response = self
            .client
            .post(&self.webhook_url)
            .json(message)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(channel = "slack", "Notification sent successfully");
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);

            warn!(channel = "slack", retry_after_secs, "Slack rate limited the webhook");
            return Err(ChannelError::RateLimited { retry_after_secs });
        }

        let body = response.text().await.unwrap_or_default();

        warn!(
            channel = "slack",
            status = %status,
            body = %body,
            "Slack webhook request failed"
        );

        Err(ChannelError::Other(format!(
            "Slack returned {status}: {body}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{Attachment, Block};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn message() -> SlackMessage {
        SlackMessage {
            text: "New Outages".to_string(),
            channel: Some("#ops".to_string()),
            username: Some("Outage Notify".to_string()),
            icon_url: None,
            attachments: vec![Attachment {
                color: "#e74c3c".to_string(),
                blocks: vec![Block::markdown("*New Outages*")],
            }],
        }
    }

    #[tokio::test]
    async fn test_posts_payload_as_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T/B/X"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "text": "New Outages",
                "channel": "#ops",
                "attachments": [{ "color": "#e74c3c" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let channel = SlackChannel::new(format!("{}/services/T/B/X", server.uri()));
        channel.send(&message()).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri());
        let err = channel.send(&message()).await.unwrap_err();

        match err {
            ChannelError::Other(text) => {
                assert!(text.contains("404"), "{text}");
                assert!(text.contains("no_service"), "{text}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_reports_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
            .mount(&server)
            .await;

        let channel = SlackChannel::new(server.uri());
        let err = channel.send(&message()).await.unwrap_err();

        assert!(matches!(
            err,
            ChannelError::RateLimited {
                retry_after_secs: 30
            }
        ));
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_http_error() {
        let channel = SlackChannel::new("http://127.0.0.1:1/hook");
        let err = channel.send(&message()).await.unwrap_err();
        assert!(matches!(err, ChannelError::Http(_)));
    }
}
