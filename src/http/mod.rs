//! HTTP transport for the ledger.
//!
//! A thin shell: handlers decode JSON, convert money to cents, call
//! `LedgerService`, and map `LedgerError` kinds onto status codes.

mod dto;
mod error;
mod handlers;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::application::LedgerService;

pub use dto::{cents_to_number, number_to_cents};
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerService>,
}

impl AppState {
    pub fn new(ledger: Arc<LedgerService>) -> Self {
        Self { ledger }
    }
}

/// Build the application router over a shared ledger.
pub fn build_router(ledger: Arc<LedgerService>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/create-account", post(handlers::create_account))
        .route("/transfer", post(handlers::transfer))
        .route("/accounts", get(handlers::list_accounts))
        .route("/account/:account_id", get(handlers::get_account))
        .route("/account/:account_id/balance", get(handlers::get_balance))
        .route(
            "/account/:account_id/transactions",
            get(handlers::get_transactions),
        )
        .route("/ledger/check", get(handlers::check_integrity))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(ledger))
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
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
