//! Message composition over the configured mailer.

use std::sync::Arc;

use gatehouse_core::config::email::EmailConfig;
use gatehouse_core::error::AppError;

use super::mailer::Mailer;

/// Composes and dispatches account lifecycle emails.
pub struct EmailService {
    /// Delivery strategy.
    mailer: Arc<dyn Mailer>,
    /// Base URL for verification links.
    verification_url: String,
    /// Base URL for reset links.
    reset_url: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("verification_url", &self.verification_url)
            .field("reset_url", &self.reset_url)
            .finish()
    }
}

impl EmailService {
    /// Creates a new email service over the given mailer.
    pub fn new(mailer: Arc<dyn Mailer>, config: &EmailConfig) -> Self {
        Self {
            mailer,
            verification_url: config.verification_url.clone(),
            reset_url: config.reset_url.clone(),
        }
    }

    /// Sends the email-verification message containing the tokenized link.
    pub async fn send_verification_email(&self, to: &str, token: &str) -> Result<(), AppError> {
        let link = build_link(&self.verification_url, token);
        let body = format!(
            "Welcome!\n\n\
             Please verify your email address by opening the link below:\n\n\
             {link}\n\n\
             This link expires in 24 hours. If you did not create an account, \
             you can ignore this message."
        );
        self.mailer.send(to, "Verify your email address", &body).await
    }

    /// Sends the password-reset message containing the tokenized link.
    pub async fn send_reset_email(&self, to: &str, token: &str) -> Result<(), AppError> {
        let link = build_link(&self.reset_url, token);
        let body = format!(
            "A password reset was requested for your account.\n\n\
             Open the link below to choose a new password:\n\n\
             {link}\n\n\
             This link expires in 1 hour. If you did not request a reset, \
             you can ignore this message and your password will stay unchanged."
        );
        self.mailer.send(to, "Reset your password", &body).await
    }
}

/// Appends a token query parameter to a base link.
fn build_link(base: &str, token: &str) -> String {
    if base.contains('?') {
        format!("{base}&token={token}")
    } else {
        format!("{base}?token={token}")
    }
}
