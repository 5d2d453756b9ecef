#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const TOKEN_HEADER: &str = "auth-token";

/// The server binary on a private port, backed by the memory store. Killed on drop.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}/aa-api", port);

        let child = Command::new(env!("CARGO_BIN_EXE_alt-apps-api"))
            .args(["--store", "memory", "--port", &port.to_string()])
            .env("TOKEN_SECRET", "integration-secret")
            .env("BCRYPT_COST", "4")
            .env("HOST", "127.0.0.1")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<reqwest::Response> {
        let resp = self
            .client
            .post(self.url("/user/register"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await?;
        Ok(resp)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<reqwest::Response> {
        let resp = self
            .client
            .post(self.url("/user/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        Ok(resp)
    }

    /// Registers a user and returns its token.
    pub async fn token(&self) -> Result<String> {
        self.register("Integration User", "integration@x.com", "secret1").await?;
        let body: Value = self.login("integration@x.com", "secret1").await?.json().await?;
        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response carried no token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}
