use std::sync::Arc;

use minihttpd::config::{Config, parse_port};
use minihttpd::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let mut cfg = Config::load();

    if let Some(arg) = std::env::args().nth(1) {
        cfg.port = parse_port(&arg)?;
    }

    if !cfg.root_dir.is_dir() {
        tracing::warn!(root = %cfg.root_dir.display(), "Resource root is not a directory");
    }

    tokio::select! {
        res = server::listener::run(Arc::new(cfg)) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
