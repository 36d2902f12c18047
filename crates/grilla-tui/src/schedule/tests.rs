//! Engine-level tests: the full load cycle against a canned backend,
//! from cold start through the late week arrival.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use grilla_core::types::{
    Banner, Category, Channel, ChannelWithSchedules, Program, Schedule,
};

use super::api::GuideBackend;
use super::cache::mem::MemStorage;
use super::cache::CacheStore;
use super::loader::{LoadUpdate, Loader};
use super::merge::filter_day;
use super::repository::ScheduleRepository;
use crate::app_state::AppState;

const TODAY: &str = "wednesday";

fn schedule(id: i64, day: &str) -> Schedule {
    Schedule {
        id,
        day_of_week: day.to_string(),
        start_time: "10:00:00".to_string(),
        end_time: "11:00:00".to_string(),
        subscribed: false,
        program: Program {
            id,
            name: format!("program-{}", id),
            logo_url: None,
            description: None,
            stream_url: None,
            is_live: false,
            panelists: Vec::new(),
            channel: None,
            style_override: None,
        },
    }
}

fn cws(id: i64, schedules: Vec<Schedule>) -> ChannelWithSchedules {
    ChannelWithSchedules {
        channel: Channel {
            id,
            name: format!("channel-{}", id),
            logo_url: None,
            background_color: None,
            show_only_when_scheduled: false,
            handle: None,
            categories: Vec::new(),
        },
        schedules,
    }
}

/// Fast today endpoint, slow week endpoint — the latency asymmetry the
/// whole pipeline exists for.
struct FakeBackend;

impl GuideBackend for FakeBackend {
    async fn today_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        Ok((1..=3).map(|id| cws(id, vec![schedule(id * 10, TODAY)])).collect())
    }

    async fn week_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok((1..=5)
            .map(|id| {
                let schedules = grilla_core::timeutil::DAY_NAMES
                    .iter()
                    .enumerate()
                    .map(|(i, day)| schedule(id * 100 + i as i64, day))
                    .collect();
                cws(id, schedules)
            })
            .collect())
    }

    async fn categories(&self) -> Result<Vec<Category>> {
        Ok(vec![Category {
            id: 1,
            name: "deportes".to_string(),
            description: None,
            color: Some("#2196F3".to_string()),
            order: Some(1),
        }])
    }

    async fn banners(&self) -> Result<Vec<Banner>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_cold_start_today_then_week() {
    let backend = FakeBackend;
    let repo = Arc::new(ScheduleRepository::new(backend, CacheStore::new(MemStorage::new())));
    let (tx, mut rx) = mpsc::channel(32);
    let loader = Loader::new(repo.clone(), tx);
    let mut state = AppState::new(false);

    loader.spawn_load();

    // Cold cache: nothing renders until the network answers.
    assert!(state.loading);
    assert!(state.channels.is_empty());

    let mut saw_today = false;
    let mut saw_week = false;
    while !(saw_today && saw_week) {
        let update = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("load cycle stalled")
            .expect("loader channel closed");

        match &update {
            LoadUpdate::CachedWeek(_) | LoadUpdate::CachedCategories(_) => {
                panic!("cold cache must not produce phase-1 hits");
            }
            LoadUpdate::Today(_) => saw_today = true,
            LoadUpdate::Week(_) => {
                // The awaited today fetch always lands before the slow week.
                assert!(saw_today, "week resolved before today");
                saw_week = true;
            }
            _ => {}
        }
        state.apply_load(update, TODAY);

        if saw_today && !saw_week {
            // Today alone renders 3 rows and clears the loading flag.
            assert_eq!(state.channels.len(), 3);
            assert!(!state.loading);
        }
    }

    // Week replaces wholesale: 5 channels covering all 7 days.
    assert_eq!(state.channels.len(), 5);

    // Day switching is served from the in-memory week data.
    let friday = filter_day(&state.channels, "friday");
    assert_eq!(friday.len(), 5);
    assert!(friday.iter().all(|ch| !ch.schedules.is_empty()));

    assert!(repo.cached_week_schedules().await.from_cache);
}

#[tokio::test]
async fn test_warm_cache_renders_before_network() {
    let backend = FakeBackend;
    let repo = Arc::new(ScheduleRepository::new(backend, CacheStore::new(MemStorage::new())));

    // Seed the cache as a previous run would have.
    repo.refresh_week_schedules().await.unwrap();
    repo.refresh_categories().await.unwrap();

    let (tx, mut rx) = mpsc::channel(32);
    let loader = Loader::new(repo.clone(), tx);
    let mut state = AppState::new(false);

    loader.spawn_load();

    let update = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    // Phase 1 reports the cache hit first, before any fetch resolves.
    assert!(matches!(update, LoadUpdate::CachedWeek(_)));
    state.apply_load(update, TODAY);
    assert!(!state.loading);
    assert_eq!(state.channels.len(), 5);
}

#[tokio::test]
async fn test_shutdown_drops_late_results() {
    let backend = FakeBackend;
    let repo = Arc::new(ScheduleRepository::new(backend, CacheStore::new(MemStorage::new())));
    let (tx, mut rx) = mpsc::channel(32);
    let loader = Loader::new(repo, tx);

    loader.spawn_load();
    loader.shutdown();

    // Give every fetch time to finish; none of their results may land.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_today_merges_into_cached_week() {
    let backend = FakeBackend;
    let repo = Arc::new(ScheduleRepository::new(backend, CacheStore::new(MemStorage::new())));
    repo.refresh_week_schedules().await.unwrap();

    let (tx, mut rx) = mpsc::channel(32);
    let loader = Loader::new(repo, tx);
    let mut state = AppState::new(false);

    loader.spawn_load();

    loop {
        let update = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        let was_today = matches!(update, LoadUpdate::Today(_));
        state.apply_load(update, TODAY);
        if was_today {
            break;
        }
    }

    // The today merge keeps all five cached channels; only the
    // wednesday partition of channels 1-3 was replaced.
    assert_eq!(state.channels.len(), 5);
    let ch1 = state.channels.iter().find(|c| c.channel.id == 1).unwrap();
    assert!(ch1.schedules.iter().any(|s| s.id == 10)); // fresh today row
    assert!(ch1.schedules.iter().any(|s| s.day_of_week == "monday")); // untouched
    assert!(!ch1.schedules.iter().any(|s| s.id == 100 + 2)); // old wednesday gone
}
