#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use ems_api::config::AppConfig;
use ems_api::database::Database;
use ems_api::server::{app, AppState};
use ems_api::services::seed_admin;

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "admin-password";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Serve the app on a free port with a fresh memory store and the bootstrap admin
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.api.port = port;
        config.bootstrap.admin_username = Some(USERNAME.into());
        config.bootstrap.admin_password = Some(PASSWORD.into());
        let db = Database::memory();
        seed_admin(&db, &config.bootstrap)
            .await?
            .context("bootstrap admin was not created")?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        let router = app(AppState::new(config, db));
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in as the seeded user and return the bearer token
    pub async fn token(&self) -> Result<String> {
        let body: Value = self
            .client
            .post(self.url("/api/token/create"))
            .json(&json!({ "username": USERNAME, "password": PASSWORD }))
            .send()
            .await?
            .json()
            .await?;
        body["data"]["accessToken"]
            .as_str()
            .map(str::to_string)
            .context("no accessToken in token response")
    }
}
