//! DaySelector — the Monday-first week strip (L M X J V S D).
//!
//! Selecting a day only filters the in-memory week data; switching is
//! instantaneous and never fetches.

use chrono::{Datelike, Local, NaiveDate};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use grilla_core::timeutil::week_dates;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{C_MUTED, C_PANEL_BORDER_FOCUSED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG};

/// Single-letter labels, Monday-first (Spanish convention: X = miércoles).
const DAY_LABELS: [&str; 7] = ["L", "M", "X", "J", "V", "S", "D"];

pub struct DaySelector {
    /// Last-drawn chip columns for mouse hit-testing.
    chip_cols: Vec<(u16, u16, NaiveDate)>,
}

impl DaySelector {
    pub fn new() -> Self {
        Self { chip_cols: Vec::new() }
    }

    fn selected_index(state: &AppState, today: NaiveDate) -> usize {
        let selected = state.selected_date.unwrap_or(today);
        week_dates(today)
            .iter()
            .position(|d| *d == selected)
            .unwrap_or(0)
    }

    fn select_offset(state: &AppState, offset: i64) -> Action {
        let today = Local::now().date_naive();
        let week = week_dates(today);
        let idx = Self::selected_index(state, today) as i64 + offset;
        let idx = idx.rem_euclid(7) as usize;
        if week[idx] == today {
            Action::SelectToday
        } else {
            Action::SelectDate(week[idx])
        }
    }
}

impl Component for DaySelector {
    fn id(&self) -> ComponentId {
        ComponentId::DaySelector
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => vec![Self::select_offset(state, -1)],
            KeyCode::Right | KeyCode::Char('l') => vec![Self::select_offset(state, 1)],
            KeyCode::Char(c @ '1'..='7') => {
                let idx = c as usize - '1' as usize;
                let today = Local::now().date_naive();
                let date = week_dates(today)[idx];
                if date == today {
                    vec![Action::SelectToday]
                } else {
                    vec![Action::SelectDate(date)]
                }
            }
            _ => vec![],
        }
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, _state: &AppState) -> Vec<Action> {
        if let MouseEventKind::Down(_) = event.kind {
            let today = Local::now().date_naive();
            for (start, end, date) in &self.chip_cols {
                if event.column >= *start && event.column < *end {
                    return if *date == today {
                        vec![Action::SelectToday]
                    } else {
                        vec![Action::SelectDate(*date)]
                    };
                }
            }
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 {
            return;
        }
        let today = Local::now().date_naive();
        let week = week_dates(today);
        let selected = Self::selected_index(state, today);

        self.chip_cols.clear();
        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        let mut col = area.x + 1;
        for (i, date) in week.iter().enumerate() {
            let label = format!(" {} {:02} ", DAY_LABELS[i], date.day());
            let width = label.chars().count() as u16;
            let style = if i == selected {
                Style::default()
                    .fg(C_PRIMARY)
                    .bg(C_SELECTION_BG)
                    .add_modifier(Modifier::BOLD)
            } else if *date == today {
                Style::default().fg(if focused { C_PANEL_BORDER_FOCUSED } else { C_SECONDARY })
            } else {
                Style::default().fg(C_MUTED)
            };
            spans.push(Span::styled(label, style));
            spans.push(Span::raw(" "));
            self.chip_cols.push((col, col + width, *date));
            col += width + 1;
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
