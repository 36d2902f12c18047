//! AppState — shared read-only data passed to all components during
//! render/event handling.
//!
//! Components read this but never mutate it; the App event loop is the
//! only writer. Load results land here through `apply_load`, one
//! message at a time, in whatever order the fetches resolve.

use chrono::NaiveDate;

use grilla_core::timeutil;
use grilla_core::types::{Banner, Category, ChannelWithSchedules};

use crate::schedule::loader::LoadUpdate;
use crate::schedule::merge::{filter_category, filter_day, merge_today_into_week};

pub struct AppState {
    /// Week-shaped channel data, merged. The single source the grid
    /// renders from.
    pub channels: Vec<ChannelWithSchedules>,
    pub categories: Vec<Category>,
    pub banners: Vec<Banner>,

    /// True until a cache hit or the today fetch resolves. The week
    /// fetch never gates this.
    pub loading: bool,
    /// Pull-to-refresh in flight.
    pub refreshing: bool,
    pub week_loaded: bool,

    /// Selected day; `None` means today.
    pub selected_date: Option<NaiveDate>,
    pub selected_category: Option<i64>,

    /// Live event stream connection status.
    pub stream_connected: bool,
    /// Whether a session token is configured (read-only affordance).
    pub has_session: bool,
}

impl AppState {
    pub fn new(has_session: bool) -> Self {
        Self {
            channels: Vec::new(),
            categories: Vec::new(),
            banners: Vec::new(),
            loading: true,
            refreshing: false,
            week_loaded: false,
            selected_date: None,
            selected_category: None,
            stream_connected: false,
            has_session,
        }
    }

    /// Fold one load result into the state. `today_day` is the current
    /// day name, passed in so the merge is clock-independent.
    pub fn apply_load(&mut self, update: LoadUpdate, today_day: &str) {
        match update {
            LoadUpdate::CachedWeek(channels) => {
                self.channels = channels;
                self.week_loaded = true;
                self.loading = false;
            }
            LoadUpdate::CachedCategories(categories) => {
                self.categories = categories;
                self.loading = false;
            }
            LoadUpdate::Banners(mut banners) => {
                banners.sort_by_key(|b| (b.display_order, b.id));
                self.banners = banners;
            }
            LoadUpdate::Categories(categories) => {
                self.categories = categories;
            }
            LoadUpdate::Today(today) => {
                // Merge into whatever is current, never replace — a week
                // response that already landed keeps its other days.
                self.channels = merge_today_into_week(&self.channels, &today, today_day);
                self.week_loaded = true;
                self.loading = false;
                self.refreshing = false;
            }
            LoadUpdate::TodayFailed => {
                // Stale data stays on screen; just stop the indicators.
                self.loading = false;
                self.refreshing = false;
            }
            LoadUpdate::Week(channels) => {
                self.channels = channels;
                self.week_loaded = true;
            }
        }
    }

    pub fn selected_day_name(&self, today: NaiveDate) -> &'static str {
        timeutil::day_name_for(self.selected_date.unwrap_or(today))
    }

    /// The channels the grid shows: selected day, selected category.
    /// Pure in-memory filtering — switching is instantaneous.
    pub fn visible_channels(&self, today: NaiveDate) -> Vec<ChannelWithSchedules> {
        let day = self.selected_day_name(today);
        filter_category(&filter_day(&self.channels, day), self.selected_category)
    }
}
