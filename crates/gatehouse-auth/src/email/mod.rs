//! Outbound email delivery.

pub mod mailer;
pub mod service;

pub use mailer::{HttpMailer, Mailer, StubMailer};
pub use service::EmailService;
