//! Repository implementations for all Gatehouse entities.

pub mod account;
pub mod login_attempt;
pub mod outbox;
pub mod password_reset;
pub mod refresh_token;
pub mod role;
pub mod verification;

pub use account::AccountRepository;
pub use login_attempt::LoginAttemptRepository;
pub use outbox::OutboxRepository;
pub use password_reset::PasswordResetRepository;
pub use refresh_token::RefreshTokenRepository;
pub use role::RoleRepository;
pub use verification::VerificationRepository;
