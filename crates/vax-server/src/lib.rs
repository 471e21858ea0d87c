pub mod dialogue;
pub mod state;

use anyhow::Context;
use tokio::io::BufReader;
use tokio::net::TcpListener;
use tracing::Instrument;
use vax_core::config::ServerConfig;
use vax_core::types::CloseReason;

pub use state::ServerState;

/// Bind the configured address, run one dialogue, and return its outcome.
pub async fn serve(config: &ServerConfig, state: ServerState) -> anyhow::Result<CloseReason> {
    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(listener, state).await
}

/// Run one dialogue on a pre-bound listener.
///
/// Exactly one connection is accepted. The listener is closed right after
/// the accept, so later connection attempts are refused.
pub async fn serve_on(listener: TcpListener, state: ServerState) -> anyhow::Result<CloseReason> {
    let local = listener.local_addr()?;
    tracing::info!("vax server listening on {local}");

    let (stream, peer) = listener.accept().await?;
    drop(listener);

    let id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("session", %id, %peer);
    async move {
        tracing::info!("client connected");
        let today = chrono::Local::now().date_naive();
        let (read, write) = stream.into_split();
        dialogue::run_session(&state, today, BufReader::new(read), write).await
    }
    .instrument(span)
    .await
}
