//! Test chat client.
//!
//! A line-oriented TCP client that can send lines and assert on what the
//! server sends back.

use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
    local_addr: SocketAddr,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let local_addr = stream.local_addr()?;

        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
            local_addr,
        })
    }

    /// The address the server sees for this client, which is also its
    /// initial name.
    pub fn name(&self) -> String {
        self.local_addr.to_string()
    }

    /// Format a broadcast line attributed to this client.
    pub fn line(&self, rest: &str) -> String {
        format!("[{}]{}", self.local_addr, rest)
    }

    /// Send one line; the terminator is added.
    pub async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Write raw bytes in one call, without adding a terminator.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> anyhow::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line from the server.
    pub async fn recv(&mut self) -> anyhow::Result<String> {
        self.recv_timeout(RECV_TIMEOUT).await
    }

    /// Receive a line with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end_matches('\n').to_string())
    }

    /// Receive lines until the predicate matches, returning all of them.
    pub async fn recv_until<F>(&mut self, mut predicate: F) -> anyhow::Result<Vec<String>>
    where
        F: FnMut(&str) -> bool,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.recv().await?;
            let done = predicate(&line);
            lines.push(line);
            if done {
                return Ok(lines);
            }
        }
    }

    /// Skip lines until `expected` arrives.
    pub async fn expect_line(&mut self, expected: &str) -> anyhow::Result<()> {
        self.recv_until(|l| l == expected).await.map(|_| ())
    }

    /// Receive the `who` listing: one line per session, header stripped.
    pub async fn who(&mut self) -> anyhow::Result<Vec<String>> {
        self.send("who").await?;
        let count = loop {
            let line = self.recv().await?;
            if let Some(n) = line
                .strip_prefix("online users (")
                .and_then(|rest| rest.strip_suffix("):"))
            {
                break n.parse::<usize>()?;
            }
        };
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            entries.push(self.recv().await?);
        }
        Ok(entries)
    }

    /// Drain anything already sent, waiting at most `quiet` for each line.
    pub async fn drain(&mut self, quiet: Duration) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.recv_timeout(quiet).await {
            lines.push(line);
        }
        lines
    }

    /// Wait until the server closes the connection.
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        loop {
            let mut line = String::new();
            match timeout(RECV_TIMEOUT, self.reader.read_line(&mut line)).await? {
                Ok(0) => return Ok(()),
                Ok(_) => continue,
                Err(e) if e.kind() == std::io::ErrorKind::ConnectionReset => return Ok(()),
                Err(e) => return Err(e.into()),
            }
        }
    }
}
