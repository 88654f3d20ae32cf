//! Connection - Handles an individual client connection.
//!
//! Each Connection is split into two tasks:
//!
//! ```text
//!   socket read half                          socket write half
//!         │                                          ▲
//!         ▼                                          │
//!   FramedRead<LineCodec> ──▶ Dispatcher      FramedWrite<LineCodec>
//!   (connection task)            │                   ▲
//!                                ├── reply ──▶ mailbox (this session)
//!                                └── broadcast ──▶ Broadcaster ──▶ every mailbox
//! ```
//!
//! The connection task owns the session's whole lifecycle: it registers the
//! session, runs the read loop, and on exit runs the single offline path.
//! The writer task ends once the last handle to the session is gone and the
//! mailbox is drained.

mod error_handling;
mod writer;

use error_handling::{
    HandlerErrorAction, ReadErrorAction, classify_handler_error, classify_read_error,
};

use crate::handlers::{Context, Dispatcher};
use crate::metrics;
use crate::network::limit::FloodLimiter;
use crate::state::{Broadcast, Matrix, Session, SessionId};
use futures_util::StreamExt;
use linechat_proto::{LineCodec, notice};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedReadHalf;
use tokio_util::codec::FramedRead;
use tracing::{Instrument, debug, error, info, instrument, warn};

/// How long the offline path waits for the writer to drain the mailbox.
const WRITER_GRACE: Duration = Duration::from_secs(5);

/// Why a session went offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Disconnect {
    /// Peer closed its side.
    Closed,
    /// Socket read failed.
    IoError,
    /// No line within `server.idle_timeout`.
    IdleTimeout,
    /// Token bucket exhausted.
    ExcessFlood,
    /// Broadcaster stopped; the server is shutting down.
    Shutdown,
}

impl Disconnect {
    fn as_str(self) -> &'static str {
        match self {
            Disconnect::Closed => "closed",
            Disconnect::IoError => "io_error",
            Disconnect::IdleTimeout => "idle_timeout",
            Disconnect::ExcessFlood => "excess_flood",
            Disconnect::Shutdown => "shutdown",
        }
    }
}

/// A client connection handler.
pub struct Connection {
    id: SessionId,
    addr: SocketAddr,
    stream: TcpStream,
    matrix: Arc<Matrix>,
    dispatcher: Arc<Dispatcher>,
}

impl Connection {
    /// Create a new connection handler.
    pub fn new(
        id: SessionId,
        stream: TcpStream,
        addr: SocketAddr,
        matrix: Arc<Matrix>,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        Self {
            id,
            addr,
            stream,
            matrix,
            dispatcher,
        }
    }

    /// Run the session from registration to teardown.
    #[instrument(skip(self), fields(id = %self.id, addr = %self.addr), name = "connection")]
    pub async fn run(self) {
        let Self {
            id,
            addr,
            stream,
            matrix,
            dispatcher,
        } = self;

        let (read_half, write_half) = stream.into_split();
        let (session, mailbox) = Session::new(id, addr);
        let mut writer = tokio::spawn(writer::run(write_half, mailbox).in_current_span());

        // Online: visible in the directory before anyone hears about it, so
        // the new session receives its own join notice.
        matrix.registry.register(Arc::clone(&session));
        metrics::inc_connected_sessions();
        info!(name = %session.name(), "Session online");
        if !matrix.broadcaster.send(Broadcast::Joined {
            name: session.name(),
            addr,
        }) {
            error!("Broadcaster closed before join");
        }

        let reason = read_loop(&session, &matrix, &dispatcher, read_half).await;

        // Offline. Renames only happen on this task, so the name read here
        // is the one the registry holds.
        let name = session.name();
        if !matrix.registry.unregister(&session) {
            warn!(%name, "Session was already displaced from the directory");
        }
        metrics::dec_connected_sessions();
        matrix.broadcaster.send(Broadcast::Left {
            name: name.clone(),
            addr,
        });
        info!(%name, reason = reason.as_str(), "Session offline");

        // Dropping the last handle closes the mailbox; the writer flushes
        // what is queued and exits.
        drop(session);
        match tokio::time::timeout(WRITER_GRACE, &mut writer).await {
            Ok(Ok(written)) => debug!(written, "Writer finished"),
            Ok(Err(e)) => error!(error = %e, "Writer task failed"),
            Err(_) => {
                warn!(grace_secs = WRITER_GRACE.as_secs(), "Writer did not drain in time");
                writer.abort();
            }
        }
    }
}

/// Read and dispatch lines until the session must go offline.
async fn read_loop(
    session: &Arc<Session>,
    matrix: &Matrix,
    dispatcher: &Dispatcher,
    read_half: OwnedReadHalf,
) -> Disconnect {
    let mut reader = FramedRead::new(
        read_half,
        LineCodec::with_max_len(matrix.limits.max_line_length),
    );
    let flood = FloodLimiter::from_limits(&matrix.limits);
    let ctx = Context::new(session, matrix);

    loop {
        // The writer stops on the first failed write; nothing we read
        // afterwards could be answered.
        if session.is_closed() {
            return Disconnect::IoError;
        }

        let next = match matrix.idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, reader.next()).await {
                Ok(next) => next,
                Err(_) => {
                    ctx.reply(notice::IDLE_TIMEOUT);
                    return Disconnect::IdleTimeout;
                }
            },
            None => reader.next().await,
        };

        let line = match next {
            None => return Disconnect::Closed,
            Some(Ok(Ok(line))) => line,
            Some(Ok(Err(e))) | Some(Err(e)) => match classify_read_error(&e) {
                ReadErrorAction::Reject { reply } => {
                    debug!(error = %e, "Line rejected");
                    ctx.reply(reply);
                    continue;
                }
                ReadErrorAction::IoError => {
                    debug!(error = %e, "Read failed");
                    return Disconnect::IoError;
                }
            },
        };

        if let Some(limiter) = &flood
            && !limiter.check()
        {
            warn!(name = %session.name(), "Excess flood");
            ctx.reply(notice::EXCESS_FLOOD);
            return Disconnect::ExcessFlood;
        }

        if let Err(e) = dispatcher.dispatch(&ctx, &line) {
            match classify_handler_error(&e) {
                HandlerErrorAction::Reply(reply) => ctx.reply(reply),
                HandlerErrorAction::Ignore => {}
                HandlerErrorAction::Disconnect => {
                    error!(error = %e, "Dropping session");
                    return Disconnect::Shutdown;
                }
            }
        }
    }
}
