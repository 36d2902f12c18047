//! BannerCarousel — rotating promotional banners above the grid.
//!
//! Hidden entirely while the grid reports the collapsed state; rotation
//! advances on the UI tick, not per render.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use grilla_core::types::LinkType;

use crate::app_state::AppState;
use crate::theme::{C_MUTED, C_PANEL_BORDER, C_PRIMARY, C_SECONDARY};

pub const BANNER_HEIGHT: u16 = 4;

/// UI ticks between banner rotations (ticks fire every 250 ms).
const ROTATE_TICKS: u64 = 32;

pub struct BannerCarousel {
    current: usize,
    ticks: u64,
}

impl BannerCarousel {
    pub fn new() -> Self {
        Self { current: 0, ticks: 0 }
    }

    pub fn tick(&mut self, state: &AppState) -> bool {
        if state.banners.len() < 2 {
            return false;
        }
        self.ticks += 1;
        if self.ticks % ROTATE_TICKS == 0 {
            self.current = (self.current + 1) % state.banners.len();
            return true;
        }
        false
    }

    pub fn draw(&mut self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 || state.banners.is_empty() {
            return;
        }
        if self.current >= state.banners.len() {
            self.current = 0;
        }
        let banner = &state.banners[self.current];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_PANEL_BORDER));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![Line::from(Span::styled(
            banner.title.clone(),
            Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
        ))];

        if let Some(desc) = &banner.description {
            lines.push(Line::from(Span::styled(
                desc.clone(),
                Style::default().fg(C_SECONDARY),
            )));
        }

        // Page dots + external-link hint on the last line.
        if state.banners.len() > 1 || banner.link_url.is_some() {
            let mut spans: Vec<Span> = Vec::new();
            for i in 0..state.banners.len() {
                spans.push(Span::styled(
                    if i == self.current { "● " } else { "○ " },
                    Style::default().fg(C_MUTED),
                ));
            }
            if banner.link_type == LinkType::External {
                if let Some(url) = &banner.link_url {
                    spans.push(Span::styled(format!(" {}", url), Style::default().fg(C_MUTED)));
                }
            }
            lines.push(Line::from(spans));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
