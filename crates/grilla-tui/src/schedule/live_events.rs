//! Live event stream listener.
//!
//! One long-lived streaming connection to the backend's event endpoint.
//! Payloads arrive as `data:`-prefixed JSON lines; anything else on the
//! stream (heartbeats, comments, partial frames) is ignored without
//! fuss. Qualifying events invalidate the schedule cache and poke the
//! app to reload.
//!
//! The connection is torn down while the terminal is unfocused and
//! re-established on focus, mirroring how a silently dead stream after
//! a long background period would otherwise go unnoticed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::api::GuideBackend;
use super::cache::Storage;
use super::repository::ScheduleRepository;

/// Event types that justify a reload. Everything else is read and
/// dropped.
pub const REFRESH_EVENTS: &[&str] = &[
    "live_status_changed",
    "streamer_went_live",
    "streamer_went_offline",
    "live",
    "schedule_created",
    "schedule_updated",
    "schedule_deleted",
    "channel_updated",
    "program_updated",
];

pub fn is_refresh_event(event_type: &str) -> bool {
    REFRESH_EVENTS.contains(&event_type)
}

#[derive(Debug, Deserialize)]
pub struct LiveEvent {
    #[serde(rename = "type")]
    pub event_type: String,
}

/// Accumulates stream chunks and hands back completed lines. One per
/// connection — dropping it on reconnect is what resets the read cursor.
pub struct LineBuffer {
    buf: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buf.push_str(chunk);
        let mut lines = Vec::new();
        while let Some(idx) = self.buf.find('\n') {
            let line: String = self.buf.drain(..=idx).collect();
            lines.push(line.trim_end_matches(['\n', '\r']).to_string());
        }
        lines
    }
}

/// Parse one stream line. `None` for anything that isn't a well-formed
/// `data:` JSON payload — not an error condition.
pub fn parse_data_line(line: &str) -> Option<LiveEvent> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() {
        return None;
    }
    serde_json::from_str(payload).ok()
}

/// What the listener reports to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerEvent {
    /// The schedule cache was invalidated; reload.
    Refresh,
    /// Connection status for the header indicator.
    Connected(bool),
}

#[derive(Debug, Clone, Copy)]
enum ListenerCmd {
    Foreground,
    Background,
    Shutdown,
}

enum StreamEnd {
    Command(ListenerCmd),
    ChannelClosed,
    Disconnected,
}

pub struct LiveEventListener {
    cmd_tx: mpsc::Sender<ListenerCmd>,
    active: Arc<AtomicBool>,
}

impl LiveEventListener {
    /// Spawn the listener task. It owns the connection lifecycle; the
    /// returned handle only carries lifecycle commands.
    pub fn spawn<B: GuideBackend, S: Storage>(
        url: String,
        reconnect_delay: Duration,
        repo: Arc<ScheduleRepository<B, S>>,
        events_tx: mpsc::Sender<ListenerEvent>,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let task_active = active.clone();
        tokio::spawn(async move {
            run(url, reconnect_delay, repo, events_tx, task_active, cmd_rx).await;
        });
        Self { cmd_tx, active }
    }

    /// Terminal regained focus: force a reconnect (the stream may be
    /// silently dead after a long unfocused period).
    pub async fn foreground(&self) {
        let _ = self.cmd_tx.send(ListenerCmd::Foreground).await;
    }

    /// Terminal lost focus: abort the connection and cancel any pending
    /// reconnect. No connection is held while unfocused.
    pub async fn background(&self) {
        let _ = self.cmd_tx.send(ListenerCmd::Background).await;
    }

    pub async fn shutdown(&self) {
        self.active.store(false, Ordering::Relaxed);
        let _ = self.cmd_tx.send(ListenerCmd::Shutdown).await;
    }
}

async fn run<B: GuideBackend, S: Storage>(
    url: String,
    reconnect_delay: Duration,
    repo: Arc<ScheduleRepository<B, S>>,
    events_tx: mpsc::Sender<ListenerEvent>,
    active: Arc<AtomicBool>,
    mut cmd_rx: mpsc::Receiver<ListenerCmd>,
) {
    let client = reqwest::Client::new();
    let mut backgrounded = false;

    loop {
        if !active.load(Ordering::Relaxed) {
            break;
        }

        if backgrounded {
            match cmd_rx.recv().await {
                Some(ListenerCmd::Foreground) => backgrounded = false,
                Some(ListenerCmd::Background) => {}
                Some(ListenerCmd::Shutdown) | None => break,
            }
            continue;
        }

        let end = connect_and_read(&client, &url, &repo, &events_tx, &active, &mut cmd_rx).await;
        let _ = events_tx.send(ListenerEvent::Connected(false)).await;

        match end {
            // Reconnect immediately on a forced foreground refresh.
            StreamEnd::Command(ListenerCmd::Foreground) => {}
            StreamEnd::Command(ListenerCmd::Background) => backgrounded = true,
            StreamEnd::Command(ListenerCmd::Shutdown) | StreamEnd::ChannelClosed => break,
            StreamEnd::Disconnected => {
                debug!("[events] stream down, reconnecting in {:?}", reconnect_delay);
                // Fixed delay — never hot-loop against a downed server.
                // Any command lands here and replaces the pending
                // reconnect, so duplicate connections can't pile up.
                tokio::select! {
                    _ = tokio::time::sleep(reconnect_delay) => {}
                    cmd = cmd_rx.recv() => match cmd {
                        Some(ListenerCmd::Foreground) => {}
                        Some(ListenerCmd::Background) => backgrounded = true,
                        Some(ListenerCmd::Shutdown) | None => break,
                    }
                }
            }
        }
    }
    debug!("[events] listener stopped");
}

async fn connect_and_read<B: GuideBackend, S: Storage>(
    client: &reqwest::Client,
    url: &str,
    repo: &ScheduleRepository<B, S>,
    events_tx: &mpsc::Sender<ListenerEvent>,
    active: &AtomicBool,
    cmd_rx: &mut mpsc::Receiver<ListenerCmd>,
) -> StreamEnd {
    let response = match client
        .get(url)
        .header("Accept", "text/event-stream")
        .header("Cache-Control", "no-cache")
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => r,
        Ok(r) => {
            warn!("[events] {} returned status {}", url, r.status());
            return StreamEnd::Disconnected;
        }
        Err(e) => {
            warn!("[events] connect failed: {}", e);
            return StreamEnd::Disconnected;
        }
    };

    info!("[events] connected");
    let _ = events_tx.send(ListenerEvent::Connected(true)).await;

    let mut stream = response.bytes_stream();
    // Fresh buffer per connection — the read cursor starts at zero.
    let mut lines = LineBuffer::new();

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                return match cmd {
                    Some(cmd) => StreamEnd::Command(cmd),
                    None => StreamEnd::ChannelClosed,
                };
            }
            chunk = stream.next() => match chunk {
                Some(Ok(bytes)) => {
                    let text = String::from_utf8_lossy(&bytes);
                    for line in lines.push(&text) {
                        if let Some(event) = parse_data_line(&line) {
                            handle_event(&event, repo, events_tx, active).await;
                        }
                    }
                }
                Some(Err(e)) => {
                    warn!("[events] stream error: {}", e);
                    return StreamEnd::Disconnected;
                }
                None => {
                    debug!("[events] server closed the stream");
                    return StreamEnd::Disconnected;
                }
            }
        }
    }
}

async fn handle_event<B: GuideBackend, S: Storage>(
    event: &LiveEvent,
    repo: &ScheduleRepository<B, S>,
    events_tx: &mpsc::Sender<ListenerEvent>,
    active: &AtomicBool,
) {
    if !is_refresh_event(&event.event_type) {
        return;
    }
    if !active.load(Ordering::Relaxed) {
        return;
    }
    debug!("[events] refresh event: {}", event.event_type);
    // Invalidate first so the very next read misses, then reload.
    repo.invalidate_schedule_cache().await;
    let _ = events_tx.send(ListenerEvent::Refresh).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::cache::mem::MemStorage;
    use crate::schedule::cache::CacheStore;
    use anyhow::Result;
    use grilla_core::types::{Banner, Category, ChannelWithSchedules};

    struct NullBackend;

    impl GuideBackend for NullBackend {
        async fn today_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
            Ok(Vec::new())
        }
        async fn week_schedules(&self) -> Result<Vec<ChannelWithSchedules>> {
            Ok(Vec::new())
        }
        async fn categories(&self) -> Result<Vec<Category>> {
            Ok(Vec::new())
        }
        async fn banners(&self) -> Result<Vec<Banner>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_line_buffer_reassembles_split_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push("data: {\"ty").is_empty());
        let lines = buf.push("pe\":\"live\"}\nda");
        assert_eq!(lines, vec!["data: {\"type\":\"live\"}".to_string()]);
        let lines = buf.push("ta: x\r\n");
        assert_eq!(lines, vec!["data: x".to_string()]);
    }

    #[test]
    fn test_parse_data_line_ignores_noise() {
        assert!(parse_data_line(": heartbeat").is_none());
        assert!(parse_data_line("event: update").is_none());
        assert!(parse_data_line("data:").is_none());
        assert!(parse_data_line("data: not json").is_none());
        let event = parse_data_line("data: {\"type\":\"schedule_updated\"}").unwrap();
        assert_eq!(event.event_type, "schedule_updated");
    }

    #[test]
    fn test_refresh_allow_list() {
        assert!(is_refresh_event("schedule_updated"));
        assert!(is_refresh_event("streamer_went_live"));
        assert!(!is_refresh_event("heartbeat"));
        assert!(!is_refresh_event("viewer_count"));
    }

    #[tokio::test]
    async fn test_qualifying_event_invalidates_and_refreshes_once() {
        let repo = ScheduleRepository::new(NullBackend, CacheStore::new(MemStorage::new()));
        repo.cache().set("today-schedules", &vec![1], 60_000).await;
        repo.cache().set("week-schedules", &vec![2], 60_000).await;

        let (tx, mut rx) = mpsc::channel(8);
        let active = AtomicBool::new(true);

        let mut lines = LineBuffer::new();
        let chunk = concat!(
            ": heartbeat\n",
            "data: {\"type\":\"schedule_updated\"}\n",
            "data: {\"type\":\"viewer_count\"}\n",
            "garbage without prefix\n",
        );
        for line in lines.push(chunk) {
            if let Some(event) = parse_data_line(&line) {
                handle_event(&event, &repo, &tx, &active).await;
            }
        }

        // Exactly one refresh: the qualifying event; the rest are ignored.
        assert_eq!(rx.try_recv().ok(), Some(ListenerEvent::Refresh));
        assert!(rx.try_recv().is_err());

        let today: Option<crate::schedule::cache::Cached<Vec<i32>>> =
            repo.cache().get("today-schedules").await;
        assert!(today.is_none());
        let week: Option<crate::schedule::cache::Cached<Vec<i32>>> =
            repo.cache().get("week-schedules").await;
        assert!(week.is_none());
    }

    #[tokio::test]
    async fn test_inactive_listener_drops_events() {
        let repo = ScheduleRepository::new(NullBackend, CacheStore::new(MemStorage::new()));
        let (tx, mut rx) = mpsc::channel(8);
        let active = AtomicBool::new(false);

        let event = LiveEvent {
            event_type: "schedule_updated".to_string(),
        };
        handle_event(&event, &repo, &tx, &active).await;
        assert!(rx.try_recv().is_err());
    }
}
