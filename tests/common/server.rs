//! Test server management.
//!
//! Spawns and manages linechatd instances for integration testing.

use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Extra settings layered on the minimal test configuration.
#[derive(Debug, Default, Clone)]
pub struct TestConfig {
    pub idle_timeout: Option<u64>,
    pub max_line_length: Option<usize>,
    pub message_rate: Option<u32>,
    pub message_burst: Option<u32>,
}

impl TestConfig {
    fn render(&self, port: u16) -> String {
        let mut out = format!(
            "[server]\nname = \"test.linechat\"\nmetrics_port = 0\n{}\n[listen]\naddress = \"127.0.0.1:{}\"\n\n[limits]\n",
            self.idle_timeout
                .map(|t| format!("idle_timeout = {t}\n"))
                .unwrap_or_default(),
            port
        );
        if let Some(len) = self.max_line_length {
            out.push_str(&format!("max_line_length = {len}\n"));
        }
        if let Some(rate) = self.message_rate {
            out.push_str(&format!("message_rate = {rate}\n"));
        }
        if let Some(burst) = self.message_burst {
            out.push_str(&format!("message_burst = {burst}\n"));
        }
        out
    }
}

/// A test server instance.
pub struct TestServer {
    child: Child,
    port: u16,
    _data_dir: TempDir,
}

/// Ask the OS for a port nobody is listening on.
fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_linechatd"))
}

impl TestServer {
    /// Spawn a test server with default limits.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::spawn_with(TestConfig::default()).await
    }

    /// Spawn a test server with the given configuration.
    pub async fn spawn_with(config: TestConfig) -> anyhow::Result<Self> {
        let data_dir = tempfile::tempdir()?;
        let port = free_port()?;

        let config_path = data_dir.path().join("config.toml");
        std::fs::write(&config_path, config.render(port))?;

        let child = Command::new(binary_path())
            .arg(&config_path)
            .env("RUST_LOG", "warn")
            .stdout(Stdio::null())
            .spawn()?;

        let server = Self {
            child,
            port,
            _data_dir: data_dir,
        };

        server.wait_until_ready().await?;

        Ok(server)
    }

    /// Run the binary against raw config text and return how it exited.
    ///
    /// For configurations that must be rejected at startup.
    pub fn run_to_exit(config_text: &str) -> anyhow::Result<ExitStatus> {
        let data_dir = tempfile::tempdir()?;
        let config_path = data_dir.path().join("config.toml");
        std::fs::write(&config_path, config_text)?;

        let output = Command::new(binary_path())
            .arg(&config_path)
            .env("RUST_LOG", "error")
            .output()?;
        Ok(output.status)
    }

    /// Wait until the server is accepting connections.
    async fn wait_until_ready(&self) -> anyhow::Result<()> {
        for _ in 0..50 {
            if tokio::net::TcpStream::connect(("127.0.0.1", self.port))
                .await
                .is_ok()
            {
                return Ok(());
            }
            sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("Server failed to start within 5 seconds")
    }

    /// Get the server address.
    pub fn address(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    /// Connect a client and wait until it has seen its own join notice.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        let mut client = super::client::TestClient::connect(&self.address()).await?;
        let own_join = client.line(&format!("{}:online", client.name()));
        client.expect_line(&own_join).await?;
        Ok(client)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
