pub mod audit;
pub mod config;
pub mod contact;
pub mod health;
pub mod mailer;
pub mod server;
pub mod viewer;

use anyhow::{Context, Result};
use audit::AuditLog;
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub async fn run() -> Result<()> {
    info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let audit = Arc::new(AuditLog::new(&config.log_dir));
    let dispatcher = mailer::from_config(&config).context("Failed to initialize mail dispatcher")?;

    let state = server::AppState::new(
        Arc::clone(&audit),
        Arc::clone(&dispatcher),
        config.recipient_email.clone(),
    );
    let router = server::create_router(state, &config.static_dir);

    // Verification only reports; requests are served regardless of its outcome.
    let verify_audit = Arc::clone(&audit);
    let recipient = config.recipient_email.clone();
    tokio::spawn(async move {
        mailer::verify_and_report(dispatcher.as_ref(), recipient.as_deref(), &verify_audit).await;
    });

    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;
    info!("Server running at http://{}", listener.local_addr()?);
    audit.info("Server started");

    let cancel = CancellationToken::new();
    let cancel_on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            return;
        }
        info!("Shutdown signal received, draining in-flight requests...");
        cancel_on_signal.cancel();
    });

    axum::serve(listener, router)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}
