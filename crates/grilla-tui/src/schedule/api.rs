//! Guide API client.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use serde::de::DeserializeOwned;
use tracing::warn;

use grilla_core::config::ApiConfig;
use grilla_core::types::{Banner, Category, ChannelWithSchedules};

/// The read-only guide endpoints. Behind a trait so the engine runs
/// against a canned backend in tests; `ApiClient` is the real one.
/// All endpoints are idempotent GETs, safe to call repeatedly.
pub trait GuideBackend: Send + Sync + 'static {
    fn today_schedules(&self)
        -> impl Future<Output = Result<Vec<ChannelWithSchedules>>> + Send;
    fn week_schedules(&self)
        -> impl Future<Output = Result<Vec<ChannelWithSchedules>>> + Send;
    fn categories(&self) -> impl Future<Output = Result<Vec<Category>>> + Send;
    fn banners(&self) -> impl Future<Output = Result<Vec<Banner>>> + Send;
}

pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    device_id: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, device_id: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            device_id,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path_and_query: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Device-Id", &self.device_id)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned status {}", url, response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("failed to parse response from {}", url))
    }
}

impl GuideBackend for ApiClient {
    /// Fast today endpoint with batched live-status reads; only the
    /// current day, but its `is_live` flags are accurate.
    async fn today_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        self.get_json(&format!(
            "/channels/with-schedules/today/v2?live_status=true&deviceId={}",
            self.device_id
        ))
        .await
    }

    /// All seven days. Slow — an order of magnitude slower than today.
    async fn week_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        self.get_json(&format!(
            "/channels/with-schedules/week?live_status=true&deviceId={}",
            self.device_id
        ))
        .await
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        self.get_json("/categories").await
    }

    async fn banners(&self) -> Result<Vec<Banner>> {
        self.get_json("/banners/active").await
    }
}

const DEVICE_ID_FILE: &str = "device_id";

/// Stable per-install id sent with every request. Generated once and
/// persisted under the data dir.
pub fn load_or_create_device_id(data_dir: &Path) -> String {
    let path = data_dir.join(DEVICE_ID_FILE);
    if let Ok(id) = std::fs::read_to_string(&path) {
        let id = id.trim().to_string();
        if !id.is_empty() {
            return id;
        }
    }

    let id: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();

    if let Err(e) = std::fs::create_dir_all(data_dir)
        .and_then(|_| std::fs::write(&path, &id))
    {
        warn!("[api] could not persist device id: {}", e);
    }
    id
}
