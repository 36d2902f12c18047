//! Two-phase load orchestration.
//!
//! Phase 1 reads the cache only and renders whatever is there. Phase 2
//! fires the network fetches concurrently; each one reports back as it
//! resolves, in whatever order the backend answers. Only the fast today
//! fetch is awaited — the week fetch never gates the loading flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use grilla_core::types::{Banner, Category, ChannelWithSchedules};

use super::api::GuideBackend;
use super::cache::Storage;
use super::repository::ScheduleRepository;

/// Incremental results of one load cycle, applied by
/// `AppState::apply_load` as they arrive.
#[derive(Debug, Clone)]
pub enum LoadUpdate {
    CachedWeek(Vec<ChannelWithSchedules>),
    CachedCategories(Vec<Category>),
    Banners(Vec<Banner>),
    Categories(Vec<Category>),
    Today(Vec<ChannelWithSchedules>),
    TodayFailed,
    Week(Vec<ChannelWithSchedules>),
}

pub struct Loader<B, S> {
    repo: Arc<ScheduleRepository<B, S>>,
    tx: mpsc::Sender<LoadUpdate>,
    alive: Arc<AtomicBool>,
}

impl<B, S> Clone for Loader<B, S> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tx: self.tx.clone(),
            alive: self.alive.clone(),
        }
    }
}

impl<B: GuideBackend, S: Storage> Loader<B, S> {
    pub fn new(repo: Arc<ScheduleRepository<B, S>>, tx: mpsc::Sender<LoadUpdate>) -> Self {
        Self {
            repo,
            tx,
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Stop reacting to in-flight results. Fetches are not aborted —
    /// late completions just get dropped.
    pub fn shutdown(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    /// Kick off one load cycle in the background.
    pub fn spawn_load(&self) {
        let repo = self.repo.clone();
        let tx = self.tx.clone();
        let alive = self.alive.clone();
        tokio::spawn(async move {
            run_load(repo, tx, alive).await;
        });
    }
}

async fn run_load<B: GuideBackend, S: Storage>(
    repo: Arc<ScheduleRepository<B, S>>,
    tx: mpsc::Sender<LoadUpdate>,
    alive: Arc<AtomicBool>,
) {
    // ── Phase 1: cache-only reads, no network ─────────────────────────────
    let (cached_week, cached_categories) =
        tokio::join!(repo.cached_week_schedules(), repo.cached_categories());

    if cached_week.from_cache {
        debug!("[load] cache hit: {} channels", cached_week.data.len());
        send(&tx, &alive, LoadUpdate::CachedWeek(cached_week.data)).await;
    }
    if cached_categories.from_cache {
        send(&tx, &alive, LoadUpdate::CachedCategories(cached_categories.data)).await;
    }

    // ── Phase 2: independent fetches, each reports as it resolves ─────────

    // Banners are decorative; failure is logged and swallowed.
    {
        let repo = repo.clone();
        let tx = tx.clone();
        let alive = alive.clone();
        tokio::spawn(async move {
            match repo.fetch_banners().await {
                Ok(banners) => send(&tx, &alive, LoadUpdate::Banners(banners)).await,
                Err(e) => warn!("[load] banner fetch failed: {}", e),
            }
        });
    }

    {
        let repo = repo.clone();
        let tx = tx.clone();
        let alive = alive.clone();
        tokio::spawn(async move {
            match repo.refresh_categories().await {
                Ok(categories) => send(&tx, &alive, LoadUpdate::Categories(categories)).await,
                Err(e) => warn!("[load] categories fetch failed: {}", e),
            }
        });
    }

    // Full week in the background: replaces channel state wholesale on
    // success; on failure the stale week data stays usable.
    {
        let repo = repo.clone();
        let tx = tx.clone();
        let alive = alive.clone();
        tokio::spawn(async move {
            match repo.refresh_week_schedules().await {
                Ok(week) => {
                    debug!("[load] week fetch: {} channels", week.len());
                    send(&tx, &alive, LoadUpdate::Week(week)).await;
                }
                Err(e) => warn!("[load] week fetch failed: {}", e),
            }
        });
    }

    // Today is the fast path with accurate live status — awaited so the
    // loading flag clears as soon as it lands.
    match repo.refresh_today_schedules().await {
        Ok(today) => {
            debug!("[load] today fetch: {} channels", today.len());
            send(&tx, &alive, LoadUpdate::Today(today)).await;
        }
        Err(e) => {
            warn!("[load] today fetch failed: {}", e);
            send(&tx, &alive, LoadUpdate::TodayFailed).await;
        }
    }
}

async fn send(tx: &mpsc::Sender<LoadUpdate>, alive: &AtomicBool, update: LoadUpdate) {
    if !alive.load(Ordering::Relaxed) {
        return;
    }
    let _ = tx.send(update).await;
}
