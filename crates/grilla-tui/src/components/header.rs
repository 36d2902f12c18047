//! Header — app title, stream status dot, refresh indicator.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app_state::AppState;
use crate::theme::{C_CONNECTED, C_MUTED, C_PRIMARY, C_SECONDARY};

pub struct Header;

impl Header {
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, state: &AppState) {
        if area.height == 0 {
            return;
        }

        let mut spans = vec![
            Span::styled(
                " grilla ",
                Style::default().fg(C_PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled("· guía del streaming", Style::default().fg(C_MUTED)),
        ];

        if state.refreshing {
            spans.push(Span::styled("  actualizando…", Style::default().fg(C_SECONDARY)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);

        // Right-aligned: stream dot + session marker.
        let mut right = String::new();
        if state.has_session {
            right.push_str("sesión ");
        }
        right.push(if state.stream_connected { '●' } else { '○' });
        right.push(' ');
        let width = right.chars().count() as u16;
        if area.width > width {
            let rect = Rect::new(area.x + area.width - width, area.y, width, 1);
            let color = if state.stream_connected {
                C_CONNECTED
            } else {
                C_MUTED
            };
            frame.render_widget(
                Paragraph::new(Span::styled(right, Style::default().fg(color))),
                rect,
            );
        }
    }
}
