//! ScheduleGrid component — the channels × time-of-day grid.
//!
//! Three coupled axes live here: the horizontal time offset (shared by
//! the hour header and the program rows — both are drawn from the same
//! `scroll_x` every frame, so they cannot drift apart), the vertical
//! row offset (drives the fixed channel column and the program rows
//! from the same `scroll_y`), and the binary banner-collapse flag
//! derived from the vertical offset.

use chrono::Local;
use ratatui::crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use grilla_core::timeutil::minutes_since_midnight;
use grilla_core::types::{ChannelWithSchedules, Schedule};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::geometry::{
    self, banner_collapsed, block_is_past, block_span, centered_offset, jump_affordance_visible,
    BANNER_COLLAPSE_ROWS, CELLS_PER_MINUTE, HOUR_WIDTH,
};
use crate::theme::{
    color_for_channel, override_color, style_for_block, C_ACCENT, C_LIVE, C_MUTED,
    C_PANEL_BORDER, C_PANEL_BORDER_FOCUSED, C_PRIMARY, C_SECONDARY, C_STARS,
};

pub const CHANNEL_COL_WIDTH: u16 = 18;
pub const ROW_HEIGHT: u16 = 3;
const TIME_HEADER_HEIGHT: u16 = 1;
/// One keypress pans half an hour.
const HSCROLL_STEP: u32 = 30 * CELLS_PER_MINUTE;

pub struct ScheduleGrid {
    scroll_x: u32,
    scroll_y: usize,
    /// Recomputed once per minute (MinuteTick), not per render.
    now_offset: u32,
    initial_scroll_done: bool,
    jump_visible: bool,
    collapsed: bool,
    /// Program-area width from the last draw, for clamping and
    /// centering between frames.
    visible_width: u32,
    visible_rows: usize,
}

impl ScheduleGrid {
    pub fn new() -> Self {
        let mut grid = Self {
            scroll_x: 0,
            scroll_y: 0,
            now_offset: 0,
            initial_scroll_done: false,
            jump_visible: false,
            collapsed: false,
            visible_width: 0,
            visible_rows: 0,
        };
        grid.recompute_now_offset();
        grid
    }

    /// Banner visibility is a function of the vertical offset; the App
    /// reads this when sizing the banner area each frame.
    pub fn banner_collapsed(&self) -> bool {
        self.collapsed
    }

    fn recompute_now_offset(&mut self) {
        let minutes = minutes_since_midnight(Local::now().time());
        self.now_offset = geometry::now_offset(minutes, CELLS_PER_MINUTE);
        self.after_hscroll();
    }

    fn now_minutes(&self) -> u32 {
        self.now_offset / CELLS_PER_MINUTE
    }

    /// Center the now line in the program area. The same formula serves
    /// the one-time initial scroll and manual jumps.
    fn scroll_to_now(&mut self) {
        self.scroll_x = centered_offset(self.now_offset, self.visible_width);
        self.after_hscroll();
    }

    fn after_hscroll(&mut self) {
        if self.visible_width > 0 {
            self.scroll_x = self.scroll_x.min(geometry::max_scroll_x(self.visible_width));
            self.jump_visible =
                jump_affordance_visible(self.scroll_x, self.now_offset, self.visible_width);
        }
    }

    fn after_vscroll(&mut self) {
        self.collapsed = banner_collapsed(self.scroll_y, BANNER_COLLAPSE_ROWS);
    }

    fn scroll_horizontal(&mut self, delta: i64) {
        let next = self.scroll_x as i64 + delta;
        self.scroll_x = next.max(0) as u32;
        self.after_hscroll();
    }

    fn scroll_vertical(&mut self, delta: i64, row_count: usize) {
        let max = row_count.saturating_sub(self.visible_rows.max(1));
        let next = (self.scroll_y as i64 + delta).max(0) as usize;
        self.scroll_y = next.min(max);
        self.after_vscroll();
    }

    fn draw_time_header(&self, frame: &mut Frame, area: Rect) {
        let buf = frame.buffer_mut();
        for hour in 0..24u32 {
            let x_axis = hour * HOUR_WIDTH;
            if x_axis < self.scroll_x {
                continue;
            }
            let col = x_axis - self.scroll_x;
            if col >= area.width as u32 {
                break;
            }
            let label = format!("│{:02}:00", hour);
            let max = (area.width as u32 - col) as usize;
            let label: String = label.chars().take(max).collect();
            buf.set_string(
                area.x + col as u16,
                area.y,
                label,
                Style::default().fg(C_SECONDARY),
            );
        }
    }

    fn draw_channel_cell(&self, frame: &mut Frame, area: Rect, ch: &ChannelWithSchedules, row: usize) {
        let color = color_for_channel(row);
        let name: String = ch
            .channel
            .name
            .chars()
            .take(area.width.saturating_sub(2) as usize)
            .collect();
        let name_y = if area.height >= 2 { area.y + 1 } else { area.y };
        let buf = frame.buffer_mut();
        buf.set_string(
            area.x + 1,
            name_y,
            name,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        );
        // Column separator along the full row height.
        for dy in 0..area.height {
            buf.set_string(
                area.x + area.width - 1,
                area.y + dy,
                "│",
                Style::default().fg(C_PANEL_BORDER),
            );
        }
    }

    fn draw_block(&self, frame: &mut Frame, area: Rect, schedule: &Schedule, channel_color: ratatui::style::Color) {
        let span = block_span(&schedule.start_time, &schedule.end_time, CELLS_PER_MINUTE);
        if span.width == 0 {
            // Malformed times render as nothing rather than crashing the row.
            return;
        }

        let window_end = self.scroll_x + area.width as u32;
        let block_end = span.left + span.width;
        if block_end <= self.scroll_x || span.left >= window_end {
            return;
        }
        let clip_start = span.left.max(self.scroll_x);
        let clip_end = block_end.min(window_end);
        let x = area.x + (clip_start - self.scroll_x) as u16;
        let width = (clip_end - clip_start) as u16;
        if width == 0 {
            return;
        }

        let is_past = block_is_past(&schedule.start_time, &schedule.end_time, self.now_minutes());
        let color = schedule
            .program
            .style_override
            .as_deref()
            .and_then(override_color)
            .unwrap_or(channel_color);
        let style = style_for_block(color, schedule.program.is_live, is_past);

        let rect = Rect::new(x, area.y, width, area.height.min(ROW_HEIGHT));
        let buf = frame.buffer_mut();
        buf.set_style(rect, style);

        let text_width = width.saturating_sub(1) as usize;
        if text_width == 0 {
            buf.set_string(x, area.y, "▏", style);
            return;
        }

        let marker = if schedule.subscribed { "★" } else { "▏" };
        let marker_style = if schedule.subscribed {
            Style::default().fg(C_STARS)
        } else {
            style
        };
        buf.set_string(x, area.y, marker, marker_style);

        let name: String = schedule
            .program
            .name
            .to_uppercase()
            .chars()
            .take(text_width)
            .collect();
        buf.set_string(x + 1, area.y, name, style);

        if area.height > 1 {
            let mut time_line = format!(
                "{}–{}",
                &schedule.start_time.get(..5).unwrap_or(""),
                &schedule.end_time.get(..5).unwrap_or(""),
            );
            if schedule.program.is_live {
                time_line.push_str("  LIVE");
            }
            let time_line: String = time_line.chars().take(text_width).collect();
            let time_style = if schedule.program.is_live {
                Style::default().fg(C_LIVE).add_modifier(Modifier::BOLD)
            } else {
                style
            };
            buf.set_string(x + 1, area.y + 1, time_line, time_style);
        }

        // Panelists only when the block is wide enough to read them.
        if area.height > 2 && text_width > 20 && !schedule.program.panelists.is_empty() {
            let names: Vec<&str> = schedule
                .program
                .panelists
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            let line: String = names.join(", ").chars().take(text_width).collect();
            buf.set_string(x + 1, area.y + 2, line, Style::default().fg(C_MUTED));
        }
    }

    fn draw_now_line(&self, frame: &mut Frame, area: Rect) {
        if self.now_offset < self.scroll_x {
            return;
        }
        let col = self.now_offset - self.scroll_x;
        if col >= area.width as u32 {
            return;
        }
        let x = area.x + col as u16;
        let buf = frame.buffer_mut();
        for dy in 0..area.height {
            buf.set_string(x, area.y + dy, "┃", Style::default().fg(C_LIVE));
        }
    }

    fn draw_jump_affordance(&self, frame: &mut Frame, area: Rect) {
        let label = " ● EN VIVO [n] ";
        let width = label.chars().count() as u16;
        if area.width <= width + 2 || area.height < 3 {
            return;
        }
        let rect = Rect::new(
            area.x + area.width - width - 2,
            area.y + area.height - 2,
            width,
            1,
        );
        frame.render_widget(
            Paragraph::new(label).style(
                Style::default()
                    .fg(C_PRIMARY)
                    .bg(C_ACCENT)
                    .add_modifier(Modifier::BOLD),
            ),
            rect,
        );
    }
}

impl Component for ScheduleGrid {
    fn id(&self) -> ComponentId {
        ComponentId::Grid
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let row_count = state.visible_channels(Local::now().date_naive()).len();
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => self.scroll_horizontal(-(HSCROLL_STEP as i64)),
            KeyCode::Right | KeyCode::Char('l') => self.scroll_horizontal(HSCROLL_STEP as i64),
            KeyCode::Up | KeyCode::Char('k') => self.scroll_vertical(-1, row_count),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_vertical(1, row_count),
            KeyCode::PageUp => self.scroll_vertical(-5, row_count),
            KeyCode::PageDown => self.scroll_vertical(5, row_count),
            KeyCode::Home | KeyCode::Char('g') => {
                self.scroll_y = 0;
                self.scroll_x = 0;
                self.after_vscroll();
                self.after_hscroll();
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.scroll_vertical(row_count as i64, row_count);
            }
            _ => {}
        }
        vec![]
    }

    fn handle_mouse(&mut self, event: MouseEvent, _area: Rect, state: &AppState) -> Vec<Action> {
        let row_count = state.visible_channels(Local::now().date_naive()).len();
        match event.kind {
            MouseEventKind::ScrollUp => {
                if event.modifiers.contains(KeyModifiers::SHIFT) {
                    self.scroll_horizontal(-(HSCROLL_STEP as i64));
                } else {
                    self.scroll_vertical(-1, row_count);
                }
            }
            MouseEventKind::ScrollDown => {
                if event.modifiers.contains(KeyModifiers::SHIFT) {
                    self.scroll_horizontal(HSCROLL_STEP as i64);
                } else {
                    self.scroll_vertical(1, row_count);
                }
            }
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        match action {
            Action::MinuteTick => self.recompute_now_offset(),
            Action::JumpToNow => self.scroll_to_now(),
            // A day or filter switch changes the row set; start from the top.
            Action::SelectDate(_) | Action::SelectToday | Action::SelectCategory(_) => {
                self.scroll_y = 0;
                self.after_vscroll();
            }
            _ => {}
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height < 3 {
            return;
        }

        let border_color = if focused {
            C_PANEL_BORDER_FOCUSED
        } else {
            C_PANEL_BORDER
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(Span::styled(" programación ", Style::default().fg(C_PRIMARY)));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width <= CHANNEL_COL_WIDTH + 2 || inner.height <= TIME_HEADER_HEIGHT {
            return;
        }

        let rows = state.visible_channels(Local::now().date_naive());

        if state.loading && rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  cargando programación…",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }
        if rows.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "  sin programación para este día",
                    Style::default().fg(C_MUTED),
                )),
                inner,
            );
            return;
        }

        let body_height = inner.height.saturating_sub(TIME_HEADER_HEIGHT);
        self.visible_rows = (body_height / ROW_HEIGHT).max(1) as usize;
        self.visible_width = inner.width.saturating_sub(CHANNEL_COL_WIDTH) as u32;

        // First draw with real data: place "now" centered, once.
        if !self.initial_scroll_done && !state.loading {
            self.scroll_to_now();
            self.initial_scroll_done = true;
        }

        // Clamp after data or layout changes.
        let max_y = rows.len().saturating_sub(self.visible_rows);
        if self.scroll_y > max_y {
            self.scroll_y = max_y;
            self.after_vscroll();
        }

        let programs_x = inner.x + CHANNEL_COL_WIDTH;
        let programs_width = inner.width - CHANNEL_COL_WIDTH;

        // "CANAL" corner + hour markers share the header row.
        frame.buffer_mut().set_string(
            inner.x + 1,
            inner.y,
            "CANAL",
            Style::default().fg(C_SECONDARY).add_modifier(Modifier::BOLD),
        );
        let header_area = Rect::new(programs_x, inner.y, programs_width, TIME_HEADER_HEIGHT);
        self.draw_time_header(frame, header_area);

        // Rows: the channel column and the program tracks are driven by
        // the same scroll_y in the same frame — they cannot diverge.
        let drawn_rows = rows.len().saturating_sub(self.scroll_y).min(self.visible_rows);
        for (slot, row) in (self.scroll_y..rows.len()).take(drawn_rows).enumerate() {
            let ch = &rows[row];
            let y = inner.y + TIME_HEADER_HEIGHT + slot as u16 * ROW_HEIGHT;
            let height = ROW_HEIGHT.min(inner.y + inner.height - y);

            let label_area = Rect::new(inner.x, y, CHANNEL_COL_WIDTH, height);
            self.draw_channel_cell(frame, label_area, ch, row);

            let track_area = Rect::new(programs_x, y, programs_width, height);
            frame
                .buffer_mut()
                .set_style(track_area, Style::default().fg(C_SECONDARY));
            let channel_color = color_for_channel(row);
            for schedule in &ch.schedules {
                self.draw_block(frame, track_area, schedule, channel_color);
            }
        }

        let tracks_area = Rect::new(
            programs_x,
            inner.y,
            programs_width,
            TIME_HEADER_HEIGHT + (drawn_rows as u16 * ROW_HEIGHT).min(body_height),
        );
        self.draw_now_line(frame, tracks_area);

        if self.jump_visible {
            self.draw_jump_affordance(frame, area);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_scroll_collapses_banner() {
        let mut grid = ScheduleGrid::new();
        grid.visible_rows = 4;
        assert!(!grid.banner_collapsed());
        grid.scroll_vertical(1, 10);
        assert!(grid.banner_collapsed());
        grid.scroll_vertical(-1, 10);
        assert!(!grid.banner_collapsed());
    }

    #[test]
    fn test_vertical_scroll_clamps_to_rows() {
        let mut grid = ScheduleGrid::new();
        grid.visible_rows = 4;
        grid.scroll_vertical(100, 10);
        assert_eq!(grid.scroll_y, 6);
        grid.scroll_vertical(-100, 10);
        assert_eq!(grid.scroll_y, 0);
    }

    #[test]
    fn test_jump_visibility_tracks_scroll() {
        let mut grid = ScheduleGrid::new();
        grid.visible_width = 400;
        grid.now_offset = 1690;
        grid.scroll_to_now();
        assert!(!grid.jump_visible);
        grid.scroll_horizontal(-400);
        assert!(grid.jump_visible);
        grid.scroll_to_now();
        assert!(!grid.jump_visible);
        assert_eq!(grid.scroll_x, 1490);
    }
}
