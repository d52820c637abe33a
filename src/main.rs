//! Gatehouse server — authentication and session authority.
//!
//! Main entry point that wires all crates together and starts the server.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_api::AppState;
use gatehouse_auth::abuse::AbuseGuard;
use gatehouse_auth::email::{EmailService, Mailer, mailer};
use gatehouse_auth::federation::{FederationClient, IdentityVerifier};
use gatehouse_auth::jwt::{JwtDecoder, JwtEncoder};
use gatehouse_auth::rbac::RoleAuthority;
use gatehouse_auth::session::SessionAuthority;
use gatehouse_auth::token::TokenService;
use gatehouse_core::config::AppConfig;
use gatehouse_core::error::AppError;
use gatehouse_database::DatabasePool;
use gatehouse_database::migration::run_migrations;
use gatehouse_database::repositories::{
    AccountRepository, LoginAttemptRepository, OutboxRepository, PasswordResetRepository,
    RefreshTokenRepository, RoleRepository, VerificationRepository,
};
use gatehouse_worker::{JobHandlers, MaintenanceScheduler, OutboxRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing from the logging configuration.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt().json().with_env_filter(filter).with_target(true).init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));
    let config = Arc::new(config);

    let db = DatabasePool::connect(&config.database).await?;
    run_migrations(db.pool()).await?;
    let pool = db.pool().clone();

    // Repositories.
    let account_repo = Arc::new(AccountRepository::new(pool.clone()));
    let attempt_repo = Arc::new(LoginAttemptRepository::new(pool.clone()));
    let refresh_repo = Arc::new(RefreshTokenRepository::new(pool.clone()));
    let verification_repo = Arc::new(VerificationRepository::new(pool.clone()));
    let reset_repo = Arc::new(PasswordResetRepository::new(pool.clone()));
    let role_repo = Arc::new(RoleRepository::new(pool.clone()));
    let outbox_repo = Arc::new(OutboxRepository::new(pool.clone()));

    // Auth components.
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth)?);
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth)?);
    let token_service = Arc::new(TokenService::new(
        Arc::clone(&refresh_repo),
        Arc::clone(&verification_repo),
        Arc::clone(&reset_repo),
        &config.auth,
    ));
    let role_authority = Arc::new(RoleAuthority::new(Arc::clone(&role_repo)));
    let abuse_guard = Arc::new(AbuseGuard::new(
        &config.rate_limit,
        Arc::clone(&attempt_repo),
    ));
    let federation_client = Arc::new(FederationClient::new(config.federation.clone()));
    let identity_verifier = Arc::new(IdentityVerifier::new(config.federation.clone()));
    let session_authority = Arc::new(SessionAuthority::new(
        pool.clone(),
        Arc::clone(&account_repo),
        Arc::clone(&attempt_repo),
        Arc::clone(&outbox_repo),
        Arc::clone(&token_service),
        Arc::clone(&jwt_encoder),
        &config.auth,
        &config.worker,
    ));

    // Outbound mail, chosen once from configuration.
    let mail: Arc<dyn Mailer> = Arc::from(mailer::from_config(&config.email)?);
    let email_service = Arc::new(EmailService::new(mail, &config.email));

    // Background workers: the outbox runner drains enqueued jobs, the
    // scheduler sweeps expired tokens on a cron schedule.
    let handlers = Arc::new(JobHandlers::new(
        Arc::clone(&role_authority),
        Arc::clone(&email_service),
    ));
    let runner = OutboxRunner::new(Arc::clone(&outbox_repo), handlers, &config.worker);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let runner_handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    let mut scheduler = MaintenanceScheduler::new(Arc::clone(&token_service), &config.worker).await?;
    scheduler.start().await?;

    let state = AppState {
        config: Arc::clone(&config),
        db: db.clone(),
        jwt_decoder,
        session_authority,
        role_authority,
        abuse_guard,
        federation_client,
        identity_verifier,
        account_repo,
        attempt_repo,
    };
    let app = gatehouse_api::build_router(state)
        .into_make_service_with_connect_info::<SocketAddr>();

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    info!(addr = %addr, "Gatehouse listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server failed: {e}")))?;

    info!("Shutting down background workers");
    let _ = shutdown_tx.send(true);
    if let Err(e) = scheduler.shutdown().await {
        error!(error = %e, "Scheduler shutdown failed");
    }
    let _ = runner_handle.await;
    db.close().await;

    info!("Shutdown complete");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
