use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{Instrument, info};

use crate::config::Config;
use crate::http::connection;

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Binds the configured address and serves until the task is dropped.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let addr = cfg.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(addr = %addr, root = %cfg.root_dir.display(), "Listening");

    serve(listener, cfg).await
}

/// Accept loop. Each connection is handled on its own task so the loop never
/// waits on a client.
pub async fn serve(listener: TcpListener, cfg: Arc<Config>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "Accept failed");
                tokio::time::sleep(ACCEPT_BACKOFF).await;
                continue;
            }
        };

        tracing::debug!(%peer, "Accepted connection");

        let cfg = Arc::clone(&cfg);
        tokio::spawn(
            connection::handle(socket, cfg).instrument(tracing::info_span!("conn", %peer)),
        );
    }
}
