//! Per-session writer task.

use crate::state::{Line, Mailbox};
use futures_util::SinkExt;
use linechat_proto::{LineCodec, ProtocolError};
use tokio::net::tcp::OwnedWriteHalf;
use tokio_util::codec::FramedWrite;
use tracing::debug;

type LineSink = FramedWrite<OwnedWriteHalf, LineCodec>;

/// Drain `mailbox` to the socket, one line per entry, until every sender is
/// dropped or a write fails.
///
/// Returns the number of lines written.
pub(super) async fn run(write_half: OwnedWriteHalf, mut mailbox: Mailbox) -> usize {
    let mut sink = FramedWrite::new(write_half, LineCodec::new());
    let mut written = 0;

    while let Some(line) = mailbox.recv().await {
        match write_ready(&mut sink, &mut mailbox, line).await {
            Ok(n) => written += n,
            Err(e) => {
                debug!(error = %e, written, "Write failed; writer stopping");
                return written;
            }
        }
    }

    if let Err(e) = SinkExt::<&str>::close(&mut sink).await {
        debug!(error = %e, "Close failed");
    }
    written
}

/// Buffer `first` plus whatever else is already queued, then flush once.
async fn write_ready(
    sink: &mut LineSink,
    mailbox: &mut Mailbox,
    first: Line,
) -> Result<usize, ProtocolError> {
    sink.feed(&*first).await?;
    let mut count = 1;
    while let Ok(line) = mailbox.try_recv() {
        sink.feed(&*line).await?;
        count += 1;
    }
    SinkExt::<&str>::flush(sink).await?;
    Ok(count)
}
