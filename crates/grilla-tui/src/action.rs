//! Action enum — all user-initiated intents and internal events.

use chrono::NaiveDate;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    Grid,
    DaySelector,
    CategorySelector,
}

/// All actions that can flow through the system.
/// Components produce Actions; the App dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Guide navigation ─────────────────────────────────────────────────────
    SelectDate(NaiveDate),
    SelectToday,
    SelectCategory(Option<i64>),
    JumpToNow,

    // ── Data ─────────────────────────────────────────────────────────────────
    /// Pull-to-refresh: invalidate the schedule cache, then reload.
    Refresh,
    /// Once-a-minute clock tick; the grid recomputes its now offset.
    MinuteTick,

    // ── System ───────────────────────────────────────────────────────────────
    Quit,
}
