use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use crate::application::LedgerService;
use crate::http::{build_router, shutdown_signal};
use crate::telemetry::{LogFormat, init_tracing};

/// Coffer - in-memory account ledger service
#[derive(Parser, Debug)]
#[command(name = "coffer")]
#[command(about = "A minimal account ledger service with atomic transfers")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "COFFER_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "COFFER_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Log level or filter directive (overridden by RUST_LOG)
    #[arg(long, env = "COFFER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, env = "COFFER_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl Cli {
    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub async fn run(self) -> Result<()> {
        init_tracing(&self.log_level, self.log_format)?;

        let ledger = Arc::new(LedgerService::new());
        let router = build_router(ledger);

        let addr = self.address();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        info!(
            address = %listener.local_addr()?,
            "Ledger server is running"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Ledger server stopped");
        Ok(())
    }
}
