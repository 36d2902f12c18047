//! CategorySelector — cycles All + categories; filtering is client-side.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use grilla_core::types::Category;

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;
use crate::component::Component;
use crate::theme::{parse_hex_color, C_MUTED, C_PRIMARY, C_SECONDARY, C_SELECTION_BG};

pub struct CategorySelector;

impl CategorySelector {
    pub fn new() -> Self {
        Self
    }

    /// Display order: explicit ordering first, then id.
    fn sorted(state: &AppState) -> Vec<&Category> {
        let mut categories: Vec<&Category> = state.categories.iter().collect();
        categories.sort_by_key(|c| (c.order.unwrap_or(i32::MAX), c.id));
        categories
    }

    /// Position in the All-first chip row.
    fn selected_index(categories: &[&Category], state: &AppState) -> usize {
        match state.selected_category {
            None => 0,
            Some(id) => categories
                .iter()
                .position(|c| c.id == id)
                .map(|i| i + 1)
                .unwrap_or(0),
        }
    }

    fn select_offset(state: &AppState, offset: i64) -> Action {
        let categories = Self::sorted(state);
        let count = categories.len() as i64 + 1;
        let idx = (Self::selected_index(&categories, state) as i64 + offset).rem_euclid(count);
        if idx == 0 {
            Action::SelectCategory(None)
        } else {
            Action::SelectCategory(Some(categories[idx as usize - 1].id))
        }
    }
}

impl Component for CategorySelector {
    fn id(&self) -> ComponentId {
        ComponentId::CategorySelector
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => vec![Self::select_offset(state, -1)],
            KeyCode::Right | KeyCode::Char('l') => vec![Self::select_offset(state, 1)],
            KeyCode::Char('c') => vec![Action::SelectCategory(None)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        if area.height == 0 || state.categories.is_empty() {
            return;
        }
        let categories = Self::sorted(state);
        let selected = Self::selected_index(&categories, state);

        let chip_style = |active: bool, color: Option<ratatui::style::Color>| {
            let fg = color.unwrap_or(if active { C_PRIMARY } else { C_MUTED });
            let mut style = Style::default().fg(fg);
            if active {
                style = style.bg(C_SELECTION_BG).add_modifier(Modifier::BOLD);
            }
            style
        };

        let mut spans: Vec<Span> = vec![Span::raw(" ")];
        spans.push(Span::styled(" todas ", chip_style(selected == 0, None)));
        spans.push(Span::raw(" "));
        for (i, category) in categories.iter().enumerate() {
            let color = category.color.as_deref().and_then(parse_hex_color);
            spans.push(Span::styled(
                format!(" {} ", category.name),
                chip_style(selected == i + 1, color),
            ));
            spans.push(Span::raw(" "));
        }
        if focused {
            spans.push(Span::styled("‹h l›", Style::default().fg(C_SECONDARY)));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
