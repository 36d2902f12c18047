mod action;
mod app;
mod app_state;
mod component;
mod components;
mod focus;
mod geometry;
mod schedule;
mod theme;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use grilla_core::config::Config;

use schedule::api::{load_or_create_device_id, ApiClient};
use schedule::cache::{CacheStore, FsStorage};
use schedule::live_events::LiveEventListener;
use schedule::loader::Loader;
use schedule::repository::ScheduleRepository;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = grilla_core::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let log_path = data_dir.join("grilla.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("grilla log: {}", log_path.display());

    tracing::info!("grilla starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = Config::load().unwrap_or_default();

    // ── Build services (constructed once, injected into consumers) ───────────
    let device_id = load_or_create_device_id(&data_dir);
    let api = ApiClient::new(&config.api, device_id)?;
    let storage = FsStorage::new(config.paths.cache_dir.clone());
    let repo = Arc::new(ScheduleRepository::new(api, CacheStore::new(storage)));

    let (load_tx, load_rx) = mpsc::channel(64);
    let loader = Loader::new(repo.clone(), load_tx);

    let (live_tx, live_rx) = mpsc::channel(64);
    let listener = LiveEventListener::spawn(
        config.events.url.clone(),
        Duration::from_secs(config.events.reconnect_secs),
        repo.clone(),
        live_tx,
    );

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(&config, repo, loader, listener);
    app.run(load_rx, live_rx).await?;

    Ok(())
}
