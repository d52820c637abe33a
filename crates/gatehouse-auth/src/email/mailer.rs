//! Mail delivery strategies.

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use gatehouse_core::config::email::EmailConfig;
use gatehouse_core::error::AppError;

/// Delivery strategy for outbound mail.
///
/// The implementation is chosen once at process initialization from
/// configuration; call sites never branch on the provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a single plain-text message.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Mailer that logs messages instead of sending them.
///
/// The default in development and test environments.
#[derive(Debug, Default)]
pub struct StubMailer;

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        info!(to = %to, subject = %subject, "Stub mailer: message not sent");
        debug!(body = %body, "Stub mailer message body");
        Ok(())
    }
}

/// Mailer that posts to a SendGrid-compatible JSON API.
#[derive(Debug)]
pub struct HttpMailer {
    /// HTTP client.
    client: reqwest::Client,
    /// API endpoint.
    api_url: String,
    /// Bearer token.
    api_key: String,
    /// Sender address.
    from_address: String,
}

impl HttpMailer {
    /// Creates an HTTP mailer from email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        let payload = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from_address },
            "subject": subject,
            "content": [{ "type": "text/plain", "value": body }],
        });

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    gatehouse_core::error::ErrorKind::ExternalService,
                    "Mail provider request failed",
                    e,
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::external_service(format!(
                "Mail provider rejected message: {status} {detail}"
            )));
        }

        debug!(to = %to, "Message accepted by mail provider");
        Ok(())
    }
}

/// Builds the configured mailer.
pub fn from_config(config: &EmailConfig) -> Result<Box<dyn Mailer>, AppError> {
    match config.provider.as_str() {
        "stub" => Ok(Box::new(StubMailer)),
        "http" => {
            if config.api_key.is_empty() {
                return Err(AppError::configuration(
                    "HTTP mail provider requires an API key",
                ));
            }
            Ok(Box::new(HttpMailer::new(config)))
        }
        other => Err(AppError::configuration(format!(
            "Unknown mail provider '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_selects_stub() {
        let config = EmailConfig::default();
        assert!(from_config(&config).is_ok());
    }

    #[test]
    fn test_http_provider_requires_api_key() {
        let config = EmailConfig {
            provider: "http".to_string(),
            ..Default::default()
        };
        assert!(from_config(&config).is_err());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = EmailConfig {
            provider: "carrier-pigeon".to_string(),
            ..Default::default()
        };
        assert!(from_config(&config).is_err());
    }
}
