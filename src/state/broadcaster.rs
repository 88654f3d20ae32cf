//! Ordered fan-out of broadcast messages.
//!
//! Producers (every connection's read loop) push [`Broadcast`] values into a
//! single unbounded intake. One consumer task drains it and, for each message,
//! copies the current session list out of the registry and pushes the
//! rendered line into every mailbox. Because there is exactly one consumer,
//! every session observes broadcasts in the same relative order.
//!
//! ```text
//!  read loop ─┐
//!  read loop ─┼──▶ intake (mpsc) ──▶ consumer ──▶ mailbox ──▶ writer
//!  read loop ─┘                         │    └──▶ mailbox ──▶ writer
//!                                       └─ Registry::sessions()
//! ```

use crate::state::{Line, Registry};
use linechat_proto::notice;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A message every online session receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Broadcast {
    /// Chat text attributed to its sender.
    Chat {
        name: String,
        addr: SocketAddr,
        body: String,
    },
    /// A session came online.
    Joined { name: String, addr: SocketAddr },
    /// A session went offline.
    Left { name: String, addr: SocketAddr },
    /// A session changed its display name.
    Renamed {
        old: String,
        new: String,
        addr: SocketAddr,
    },
}

impl Broadcast {
    /// Render the wire line, without terminator.
    pub fn render(&self) -> String {
        match self {
            Broadcast::Chat { name, addr, body } => notice::chat(addr, name, body),
            Broadcast::Joined { name, addr } => notice::chat(addr, name, notice::ONLINE),
            Broadcast::Left { name, addr } => notice::chat(addr, name, notice::OFFLINE),
            Broadcast::Renamed { old, new, addr } => {
                notice::chat(addr, new, &notice::renamed(old, new))
            }
        }
    }

    /// Static label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Broadcast::Chat { .. } => "chat",
            Broadcast::Joined { .. } => "joined",
            Broadcast::Left { .. } => "left",
            Broadcast::Renamed { .. } => "renamed",
        }
    }
}

/// Producer handle onto the broadcast intake. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    intake: mpsc::UnboundedSender<Broadcast>,
}

/// Consumer side of the intake; there is exactly one per [`Broadcaster`].
pub struct BroadcastQueue {
    intake: mpsc::UnboundedReceiver<Broadcast>,
}

impl Broadcaster {
    /// Create the intake. The queue must be started with
    /// [`BroadcastQueue::spawn`] for anything to be delivered.
    pub fn new() -> (Self, BroadcastQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { intake: tx }, BroadcastQueue { intake: rx })
    }

    /// Enqueue a broadcast. Never blocks.
    ///
    /// Returns `false` only if the consumer has shut down.
    pub fn send(&self, message: Broadcast) -> bool {
        self.intake.send(message).is_ok()
    }
}

impl BroadcastQueue {
    /// Run the consumer loop on its own task.
    pub fn spawn(self, registry: Arc<Registry>) -> JoinHandle<()> {
        tokio::spawn(self.run(registry))
    }

    /// Drain the intake until every producer handle is dropped.
    pub async fn run(mut self, registry: Arc<Registry>) {
        info!("Broadcaster started");
        while let Some(message) = self.intake.recv().await {
            let delivered = fan_out(&registry, &message);
            debug!(kind = message.kind(), recipients = delivered, "Broadcast delivered");
        }
        info!("Broadcaster stopped");
    }

    /// Pop the next queued message without running the consumer loop.
    #[cfg(test)]
    pub(crate) fn try_next(&mut self) -> Option<Broadcast> {
        self.intake.try_recv().ok()
    }
}

/// Push one message into every registered mailbox.
///
/// The registry lock is released before the first push. Returns the number of
/// mailboxes that accepted the line.
pub fn fan_out(registry: &Registry, message: &Broadcast) -> usize {
    if registry.is_empty() {
        crate::metrics::record_broadcast(message.kind(), 0);
        return 0;
    }
    let line: Line = Line::from(message.render());
    let sessions = registry.sessions();

    let mut delivered = 0;
    for session in &sessions {
        if session.deliver(Arc::clone(&line)) {
            delivered += 1;
        } else {
            crate::metrics::record_dropped_delivery();
        }
    }

    crate::metrics::record_broadcast(message.kind(), delivered);
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Mailbox, Session, SessionIdGenerator};
    use std::time::Duration;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], port))
    }

    fn drain(mailbox: &mut Mailbox) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = mailbox.try_recv() {
            lines.push(line.to_string());
        }
        lines
    }

    #[test]
    fn render_formats() {
        let chat = Broadcast::Chat {
            name: "alice".into(),
            addr: addr(1),
            body: "hi".into(),
        };
        assert_eq!(chat.render(), "[127.0.0.1:1]alice:hi");

        let joined = Broadcast::Joined {
            name: "127.0.0.1:1".into(),
            addr: addr(1),
        };
        assert_eq!(joined.render(), "[127.0.0.1:1]127.0.0.1:1:online");

        let renamed = Broadcast::Renamed {
            old: "127.0.0.1:1".into(),
            new: "alice".into(),
            addr: addr(1),
        };
        assert_eq!(
            renamed.render(),
            "[127.0.0.1:1]alice:[127.0.0.1:1] renamed to [alice]"
        );
    }

    #[test]
    fn fan_out_reaches_every_session() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (a, mut ma) = Session::new(ids.next(), addr(1));
        let (b, mut mb) = Session::new(ids.next(), addr(2));
        registry.register(a);
        registry.register(b);

        let message = Broadcast::Left {
            name: "gone".into(),
            addr: addr(3),
        };
        assert_eq!(fan_out(&registry, &message), 2);
        assert_eq!(drain(&mut ma), vec!["[127.0.0.1:3]gone:offline"]);
        assert_eq!(drain(&mut mb), vec!["[127.0.0.1:3]gone:offline"]);
    }

    #[test]
    fn fan_out_skips_closed_mailboxes() {
        let ids = SessionIdGenerator::new();
        let registry = Registry::new();
        let (a, ma) = Session::new(ids.next(), addr(1));
        let (b, mut mb) = Session::new(ids.next(), addr(2));
        registry.register(a);
        registry.register(b);
        drop(ma);

        let message = Broadcast::Joined {
            name: "x".into(),
            addr: addr(9),
        };
        assert_eq!(fan_out(&registry, &message), 1);
        assert_eq!(drain(&mut mb).len(), 1);
    }

    #[tokio::test]
    async fn every_mailbox_sees_the_same_order() {
        const PRODUCERS: usize = 8;
        const PER_PRODUCER: usize = 50;

        let ids = SessionIdGenerator::new();
        let registry = Arc::new(Registry::new());
        let mut mailboxes = Vec::new();
        for port in 0..4 {
            let (s, mb) = Session::new(ids.next(), addr(3000 + port));
            registry.register(s);
            mailboxes.push(mb);
        }

        let (broadcaster, queue) = Broadcaster::new();
        let consumer = queue.spawn(Arc::clone(&registry));

        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let broadcaster = broadcaster.clone();
                tokio::spawn(async move {
                    for i in 0..PER_PRODUCER {
                        broadcaster.send(Broadcast::Chat {
                            name: format!("p{p}"),
                            addr: addr(1),
                            body: i.to_string(),
                        });
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        drop(broadcaster);
        tokio::time::timeout(Duration::from_secs(5), consumer)
            .await
            .unwrap()
            .unwrap();

        let reference = drain(&mut mailboxes[0]);
        assert_eq!(reference.len(), PRODUCERS * PER_PRODUCER);
        for mailbox in &mut mailboxes[1..] {
            assert_eq!(drain(mailbox), reference);
        }

        // Each producer's own messages keep their submission order.
        for p in 0..PRODUCERS {
            let prefix = format!("[127.0.0.1:1]p{p}:");
            let bodies: Vec<usize> = reference
                .iter()
                .filter_map(|l| l.strip_prefix(&prefix))
                .map(|b| b.parse().unwrap())
                .collect();
            assert_eq!(bodies, (0..PER_PRODUCER).collect::<Vec<_>>());
        }
    }

    #[tokio::test]
    async fn sequential_sends_arrive_in_send_order() {
        let ids = SessionIdGenerator::new();
        let registry = Arc::new(Registry::new());
        let (s, mut mb) = Session::new(ids.next(), addr(1));
        registry.register(s);

        let (broadcaster, queue) = Broadcaster::new();
        let consumer = queue.spawn(Arc::clone(&registry));
        for body in ["a", "b", "c"] {
            assert!(broadcaster.send(Broadcast::Chat {
                name: "n".into(),
                addr: addr(1),
                body: body.into(),
            }));
        }
        drop(broadcaster);
        consumer.await.unwrap();

        assert_eq!(
            drain(&mut mb),
            vec!["[127.0.0.1:1]n:a", "[127.0.0.1:1]n:b", "[127.0.0.1:1]n:c"]
        );
    }
}
