//! Typed accessors over the cache store plus the network refresh paths.
//!
//! `cached_*` reads never touch the network; `refresh_*` always does and
//! re-populates the cache. Stale entries are still returned — deciding
//! what to do with stale data is the caller's business.

use anyhow::Result;

use grilla_core::types::{Banner, Category, ChannelWithSchedules};

use super::api::GuideBackend;
use super::cache::{CacheStore, Storage};

const KEY_TODAY: &str = "today-schedules";
const KEY_WEEK: &str = "week-schedules";
const KEY_CATEGORIES: &str = "categories";

pub const TTL_SCHEDULES_MS: i64 = 5 * 60 * 1000;
pub const TTL_CATEGORIES_MS: i64 = 60 * 60 * 1000;

/// A cache-only read; `from_cache` is false on a miss (empty data).
#[derive(Debug, Clone, PartialEq)]
pub struct CachedResult<T> {
    pub data: T,
    pub from_cache: bool,
}

pub struct ScheduleRepository<B, S> {
    backend: B,
    cache: CacheStore<S>,
}

impl<B: GuideBackend, S: Storage> ScheduleRepository<B, S> {
    pub fn new(backend: B, cache: CacheStore<S>) -> Self {
        Self { backend, cache }
    }

    /// Week schedules from cache only. A miss returns empty data so the
    /// first load renders a loading state instead of blocking.
    pub async fn cached_week_schedules(&self) -> CachedResult<Vec<ChannelWithSchedules>> {
        match self.cache.get(KEY_WEEK).await {
            Some(hit) => CachedResult {
                data: hit.data,
                from_cache: true,
            },
            None => CachedResult {
                data: Vec::new(),
                from_cache: false,
            },
        }
    }

    pub async fn cached_categories(&self) -> CachedResult<Vec<Category>> {
        match self.cache.get(KEY_CATEGORIES).await {
            Some(hit) => CachedResult {
                data: hit.data,
                from_cache: true,
            },
            None => CachedResult {
                data: Vec::new(),
                from_cache: false,
            },
        }
    }

    /// Fetch fresh today schedules and update the cache.
    pub async fn refresh_today_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        let data = self.backend.today_schedules().await?;
        self.cache.set(KEY_TODAY, &data, TTL_SCHEDULES_MS).await;
        Ok(data)
    }

    /// Fetch fresh week schedules and update the cache.
    pub async fn refresh_week_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        let data = self.backend.week_schedules().await?;
        self.cache.set(KEY_WEEK, &data, TTL_SCHEDULES_MS).await;
        Ok(data)
    }

    pub async fn refresh_categories(&self) -> Result<Vec<Category>> {
        let data = self.backend.categories().await?;
        self.cache.set(KEY_CATEGORIES, &data, TTL_CATEGORIES_MS).await;
        Ok(data)
    }

    /// Banners are decorative and change rarely server-side; fetched
    /// uncached.
    pub async fn fetch_banners(&self) -> Result<Vec<Banner>> {
        self.backend.banners().await
    }

    /// Clears today + week entries (not categories). Called before a
    /// forced refresh and on qualifying push events.
    pub async fn invalidate_schedule_cache(&self) {
        self.cache.invalidate(KEY_TODAY).await;
        self.cache.invalidate(KEY_WEEK).await;
    }

    pub(crate) fn cache(&self) -> &CacheStore<S> {
        &self.cache
    }
}
