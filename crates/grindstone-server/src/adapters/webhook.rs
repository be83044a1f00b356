//! HTTP Event Publisher
//!
//! Delivers engine events to the notification service as signed JSON
//! webhooks using reqwest.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use grindstone::{DomainError, EngineEvent, EventEnvelope, EventPublisher};

/// Delivery tuning for the webhook publisher
#[derive(Debug, Clone)]
pub struct WebhookDeliveryConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
    pub user_agent: String,
}

impl Default for WebhookDeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_retries: 2,
            retry_base_delay_ms: 200,
            retry_max_delay_ms: 2_000,
            user_agent: format!("grindstone/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Posts each event to a single endpoint, signed with HMAC-SHA256 when a secret is set
#[derive(Clone)]
pub struct WebhookPublisher {
    client: Client,
    url: String,
    secret: Option<String>,
    config: WebhookDeliveryConfig,
}

impl WebhookPublisher {
    pub fn new(url: impl Into<String>, secret: Option<String>) -> Result<Self, DomainError> {
        Self::with_config(url, secret, WebhookDeliveryConfig::default())
    }

    pub fn with_config(
        url: impl Into<String>,
        secret: Option<String>,
        config: WebhookDeliveryConfig,
    ) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| DomainError::ExternalService(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            secret,
            config,
        })
    }

    async fn deliver(&self, event: &EngineEvent, body: &[u8]) -> Result<(), DomainError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .header("X-Grindstone-Event", event.name());

        if let Some(secret) = &self.secret {
            request = request.header("X-Grindstone-Signature", sign_payload(secret, body)?);
        }

        let response = request
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| DomainError::ExternalService(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = response
            .text()
            .await
            .unwrap_or_else(|_| "No response body".to_string());
        Err(DomainError::ExternalService(format!(
            "webhook returned {}: {}",
            status.as_u16(),
            detail
        )))
    }
}

#[async_trait]
impl EventPublisher for WebhookPublisher {
    async fn publish(&self, event: &EngineEvent) -> Result<(), DomainError> {
        let envelope = EventEnvelope::new(event.clone());
        let body = serde_json::to_vec(&envelope).map_err(|e| {
            DomainError::ExternalService(format!("Failed to serialize event: {e}"))
        })?;

        let mut delay = self.config.retry_base_delay_ms;
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay = (delay * 2).min(self.config.retry_max_delay_ms);
            }

            match self.deliver(event, &body).await {
                Ok(()) => {
                    tracing::debug!(
                        "Delivered {} ({}) after {} attempt(s)",
                        event.name(),
                        envelope.delivery_id,
                        attempt + 1
                    );
                    return Ok(());
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| DomainError::ExternalService("webhook not attempted".to_string())))
    }

    /// Delivers the batch in order on a background task and returns at once.
    /// Failures are logged there.
    async fn publish_all(&self, events: &[EngineEvent]) {
        if events.is_empty() {
            return;
        }
        let publisher = self.clone();
        let events = events.to_vec();
        tokio::spawn(async move {
            for event in &events {
                if let Err(e) = publisher.publish(event).await {
                    tracing::warn!(
                        "Failed to deliver {} for user {}: {}",
                        event.name(),
                        event.user_id(),
                        e
                    );
                }
            }
        });
    }
}

/// `sha256=<hex>` over the raw body
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, DomainError> {
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DomainError::ExternalService(format!("Invalid signing key: {e}")))?;
    mac.update(payload);
    let bytes = mac.finalize().into_bytes();

    Ok(format!("sha256={}", hex::encode(bytes)))
}

/// Drops every event; used when no webhook is configured
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl EventPublisher for NoopPublisher {
    async fn publish(&self, event: &EngineEvent) -> Result<(), DomainError> {
        tracing::debug!("No webhook configured, dropping {}", event.name());
        Ok(())
    }
}
