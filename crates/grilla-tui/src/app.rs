//! App — the component-based event loop.
//!
//! Architecture:
//! - `App` owns all components and `AppState` (shared read-only data
//!   for components).
//! - A `tokio::mpsc` channel carries `AppMessage` events in from
//!   background tasks; load results and live-stream events are bridged
//!   onto it.
//! - The event loop draws each frame, then awaits the next message.
//! - Components return `Vec<Action>`; App dispatches each Action.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use grilla_core::config::Config;
use grilla_core::timeutil;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    components::{
        banner::{BannerCarousel, BANNER_HEIGHT},
        category_selector::CategorySelector,
        day_selector::DaySelector,
        grid::ScheduleGrid,
        header::Header,
    },
    focus::FocusRing,
    schedule::{
        api::ApiClient,
        cache::FsStorage,
        live_events::{ListenerEvent, LiveEventListener},
        loader::{LoadUpdate, Loader},
        repository::ScheduleRepository,
    },
    theme::{C_BG, C_MUTED},
};

type Repo = ScheduleRepository<ApiClient, FsStorage>;

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    Load(LoadUpdate),
    Live(ListenerEvent),
}

// ── Pane area tracking ────────────────────────────────────────────────────────

/// Last-drawn layout rects for the focusable panes, for mouse
/// hit-testing without recomputing the layout.
#[derive(Default, Clone, Copy)]
struct PaneAreas {
    day_selector: Rect,
    category_selector: Rect,
    grid: Rect,
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct App {
    // ── Shared state (passed read-only to components) ─────────────────────────
    state: AppState,

    // ── Services ──────────────────────────────────────────────────────────────
    repo: Arc<Repo>,
    loader: Loader<ApiClient, FsStorage>,
    listener: LiveEventListener,

    // ── Components ────────────────────────────────────────────────────────────
    header: Header,
    banner: BannerCarousel,
    day_selector: DaySelector,
    category_selector: CategorySelector,
    grid: ScheduleGrid,

    focus: FocusRing,
    pane_areas: PaneAreas,
    should_quit: bool,
}

impl App {
    pub fn new(
        config: &Config,
        repo: Arc<Repo>,
        loader: Loader<ApiClient, FsStorage>,
        listener: LiveEventListener,
    ) -> Self {
        Self {
            state: AppState::new(config.has_session()),
            repo,
            loader,
            listener,
            header: Header::new(),
            banner: BannerCarousel::new(),
            day_selector: DaySelector::new(),
            category_selector: CategorySelector::new(),
            grid: ScheduleGrid::new(),
            focus: FocusRing::new(vec![
                ComponentId::Grid,
                ComponentId::DaySelector,
                ComponentId::CategorySelector,
            ]),
            pane_areas: PaneAreas::default(),
            should_quit: false,
        }
    }

    // ── Main run loop ─────────────────────────────────────────────────────────

    pub async fn run(
        mut self,
        mut load_rx: mpsc::Receiver<LoadUpdate>,
        mut live_rx: mpsc::Receiver<ListenerEvent>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);

        // ── Background task: keyboard/mouse events ────────────────────────────
        let event_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // ── Background tasks: bridge loader + listener onto the bus ───────────
        let load_bridge = tx.clone();
        tokio::spawn(async move {
            while let Some(update) = load_rx.recv().await {
                if load_bridge.send(AppMessage::Load(update)).await.is_err() {
                    break;
                }
            }
        });
        let live_bridge = tx.clone();
        tokio::spawn(async move {
            while let Some(event) = live_rx.recv().await {
                if live_bridge.send(AppMessage::Live(event)).await.is_err() {
                    break;
                }
            }
        });

        // ── Initial load ──────────────────────────────────────────────────────
        info!("initial load");
        self.loader.spawn_load();

        // ── Periodic timers ───────────────────────────────────────────────────
        let mut minute_tick = tokio::time::interval(Duration::from_secs(60));
        minute_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // Banner rotation and other light maintenance.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(250));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    let mut redraw = self.handle_message(msg).await;
                    while let Ok(next) = rx.try_recv() {
                        redraw |= self.handle_message(next).await;
                    }
                    needs_redraw = redraw;
                }

                _ = minute_tick.tick() => {
                    self.dispatch(Action::MinuteTick);
                    needs_redraw = true;
                }

                _ = ui_tick.tick() => {
                    needs_redraw = self.banner.tick(&self.state);
                }
            }

            if self.should_quit {
                break;
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.listener.shutdown().await;
        self.loader.shutdown();
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture,
            DisableFocusChange
        )?;
        terminal.show_cursor()?;

        Ok(())
    }

    // ── Message handler ───────────────────────────────────────────────────────

    async fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(ev) => self.handle_event(ev).await,

            AppMessage::Load(update) => {
                self.state.apply_load(update, timeutil::current_day_name());
                true
            }

            AppMessage::Live(ListenerEvent::Refresh) => {
                // Cache was already invalidated by the listener; reload.
                debug!("[app] live event refresh");
                self.loader.spawn_load();
                false
            }

            AppMessage::Live(ListenerEvent::Connected(up)) => {
                let changed = self.state.stream_connected != up;
                self.state.stream_connected = up;
                changed
            }
        }
    }

    async fn handle_event(&mut self, ev: Event) -> bool {
        match ev {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusGained => {
                // The stream may be silently dead after a long unfocused
                // period; force a reconnect.
                debug!("[app] terminal focus gained");
                self.listener.foreground().await;
                false
            }
            Event::FocusLost => {
                debug!("[app] terminal focus lost");
                self.listener.background().await;
                false
            }
            Event::Resize(_, _) => true,
            _ => false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind == KeyEventKind::Release {
            return false;
        }

        // Global keys first.
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.dispatch(Action::Quit);
                return true;
            }
            KeyCode::Char('q') => {
                self.dispatch(Action::Quit);
                return true;
            }
            KeyCode::Tab => {
                self.focus.next();
                return true;
            }
            KeyCode::BackTab => {
                self.focus.prev();
                return true;
            }
            KeyCode::Char('r') => {
                self.dispatch(Action::Refresh);
                return true;
            }
            KeyCode::Char('n') => {
                self.dispatch(Action::JumpToNow);
                return true;
            }
            KeyCode::Char('t') => {
                self.dispatch(Action::SelectToday);
                return true;
            }
            _ => {}
        }

        let actions = match self.focus.current() {
            Some(ComponentId::Grid) => self.grid.handle_key(key, &self.state),
            Some(ComponentId::DaySelector) => self.day_selector.handle_key(key, &self.state),
            Some(ComponentId::CategorySelector) => {
                self.category_selector.handle_key(key, &self.state)
            }
            None => Vec::new(),
        };
        for action in actions {
            self.dispatch(action);
        }
        true
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> bool {
        let pos = Position::new(mouse.column, mouse.row);
        let areas = self.pane_areas;
        let actions = if areas.grid.contains(pos) {
            self.focus.set(self.grid.id());
            self.grid.handle_mouse(mouse, areas.grid, &self.state)
        } else if areas.day_selector.contains(pos) {
            self.focus.set(self.day_selector.id());
            self.day_selector
                .handle_mouse(mouse, areas.day_selector, &self.state)
        } else if areas.category_selector.contains(pos) {
            self.focus.set(self.category_selector.id());
            self.category_selector
                .handle_mouse(mouse, areas.category_selector, &self.state)
        } else {
            Vec::new()
        };
        for action in actions {
            self.dispatch(action);
        }
        true
    }

    // ── Action dispatch ───────────────────────────────────────────────────────

    fn dispatch(&mut self, action: Action) {
        match &action {
            Action::Quit => self.should_quit = true,
            Action::SelectDate(date) => self.state.selected_date = Some(*date),
            Action::SelectToday => self.state.selected_date = None,
            Action::SelectCategory(id) => self.state.selected_category = *id,
            Action::Refresh => {
                if !self.state.refreshing {
                    self.state.refreshing = true;
                    // With no week data yet the refresh is a first load;
                    // show the loading state.
                    if !self.state.week_loaded {
                        self.state.loading = true;
                    }
                    info!("[app] forced refresh");
                    let repo = self.repo.clone();
                    let loader = self.loader.clone();
                    tokio::spawn(async move {
                        // Invalidate first so the reload bypasses the cache.
                        repo.invalidate_schedule_cache().await;
                        loader.spawn_load();
                    });
                }
            }
            _ => {}
        }

        // Components observe actions even when unfocused.
        let mut follow_ups = Vec::new();
        follow_ups.extend(self.grid.on_action(&action, &self.state));
        follow_ups.extend(self.day_selector.on_action(&action, &self.state));
        follow_ups.extend(self.category_selector.on_action(&action, &self.state));
        for follow_up in follow_ups {
            self.dispatch(follow_up);
        }
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(Style::default().bg(C_BG)), area);

        // The banner area collapses to nothing once the grid scrolls —
        // sized here so the collapse lands in the same frame as the
        // scroll event that caused it.
        let banner_height = if self.state.banners.is_empty() || self.grid.banner_collapsed() {
            0
        } else {
            BANNER_HEIGHT
        };
        let categories_height = u16::from(!self.state.categories.is_empty());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(banner_height),
                Constraint::Length(1),
                Constraint::Length(categories_height),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.draw(frame, chunks[0], &self.state);
        self.banner.draw(frame, chunks[1], &self.state);
        self.day_selector.draw(
            frame,
            chunks[2],
            self.focus.is_focused(ComponentId::DaySelector),
            &self.state,
        );
        self.category_selector.draw(
            frame,
            chunks[3],
            self.focus.is_focused(ComponentId::CategorySelector),
            &self.state,
        );
        self.grid.draw(
            frame,
            chunks[4],
            self.focus.is_focused(ComponentId::Grid),
            &self.state,
        );

        frame.render_widget(
            Paragraph::new(Span::styled(
                " tab panel · h/l j/k desplazar · n ahora · t hoy · r actualizar · q salir",
                Style::default().fg(C_MUTED),
            )),
            chunks[5],
        );

        self.pane_areas = PaneAreas {
            day_selector: chunks[2],
            category_selector: chunks[3],
            grid: chunks[4],
        };
    }
}
