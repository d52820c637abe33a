//! Outbound email configuration.

use serde::{Deserialize, Serialize};

/// Email delivery configuration.
///
/// The provider is selected once at process initialization; `"stub"`
/// logs messages instead of sending them, `"http"` posts to a
/// SendGrid-compatible JSON API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// Provider name: `"stub"` or `"http"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// API endpoint for the HTTP provider.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key for the HTTP provider.
    #[serde(default)]
    pub api_key: String,
    /// Sender address.
    #[serde(default = "default_from")]
    pub from_address: String,
    /// Base URL for email-verification links; the token is appended.
    #[serde(default)]
    pub verification_url: String,
    /// Base URL for password-reset links; the token is appended.
    #[serde(default)]
    pub reset_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_url: default_api_url(),
            api_key: String::new(),
            from_address: default_from(),
            verification_url: String::new(),
            reset_url: String::new(),
        }
    }
}

fn default_provider() -> String {
    "stub".to_string()
}

fn default_api_url() -> String {
    "https://api.sendgrid.com/v3/mail/send".to_string()
}

fn default_from() -> String {
    "no-reply@localhost".to_string()
}
