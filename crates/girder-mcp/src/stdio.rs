//! Standalone pipe-oriented transport.
//!
//! Reads newline-delimited JSON-RPC messages from stdin and writes responses
//! to stdout, one per line. Logs go to stderr so the message stream stays
//! clean. No session table or keep-alive is involved; the pipe itself is the
//! channel.

use crate::error::Result;
use crate::protocol::ProtocolHandler;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::debug;

/// Serve the protocol over stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if reading stdin or writing stdout fails.
pub async fn run(handler: &ProtocolHandler) -> Result<()> {
    serve(handler, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// Serve the protocol over arbitrary line-oriented pipes.
///
/// # Errors
///
/// Returns an error if the reader or writer fails.
pub async fn serve<R, W>(handler: &ProtocolHandler, reader: R, mut writer: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(response) = handler.handle_message(line).await {
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            writer.write_all(payload.as_bytes()).await?;
            writer.flush().await?;
        }
    }
    debug!("stdin closed, shutting down");
    Ok(())
}
