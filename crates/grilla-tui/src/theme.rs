//! Color palette and style constants for the guide TUI.

use ratatui::style::{Color, Modifier, Style};

// ── Color palette ─────────────────────────────────────────────────────────────

pub const C_BG: Color = Color::Rgb(18, 22, 32);
pub const C_ACCENT: Color = Color::Rgb(244, 67, 54);
pub const C_LIVE: Color = Color::Rgb(244, 67, 54);
pub const C_MUTED: Color = Color::Rgb(72, 78, 96);
pub const C_SECONDARY: Color = Color::Rgb(115, 122, 145);
pub const C_PRIMARY: Color = Color::Rgb(210, 214, 228);
pub const C_SELECTION_BG: Color = Color::Rgb(30, 41, 59);
pub const C_PANEL_BORDER: Color = Color::Rgb(40, 46, 60);
pub const C_PANEL_BORDER_FOCUSED: Color = Color::Rgb(59, 130, 246);
pub const C_CONNECTED: Color = Color::Rgb(80, 200, 120);
pub const C_STARS: Color = Color::Rgb(255, 210, 50);

/// Channel identity palette, assigned by row index modulo the palette
/// size — stable within a session, not across filter changes.
pub const CHANNEL_PALETTE: [Color; 8] = [
    Color::Rgb(33, 150, 243),  // blue
    Color::Rgb(0, 200, 83),    // green
    Color::Rgb(255, 23, 68),   // red
    Color::Rgb(213, 0, 249),   // purple
    Color::Rgb(255, 145, 0),   // orange
    Color::Rgb(0, 184, 212),   // cyan
    Color::Rgb(249, 30, 99),   // pink
    Color::Rgb(250, 128, 114), // salmon
];

pub fn color_for_channel(index: usize) -> Color {
    CHANNEL_PALETTE[index % CHANNEL_PALETTE.len()]
}

/// Tint for tagged special broadcasts.
pub fn override_color(tag: &str) -> Option<Color> {
    match tag {
        "boca" => Some(Color::Rgb(21, 101, 192)),
        "river" => Some(Color::Rgb(238, 19, 41)),
        _ => None,
    }
}

/// Parse `#RRGGBB` into a terminal color (category chips).
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

// ── Predefined styles ─────────────────────────────────────────────────────────

/// Three opacity tiers, at-a-glance distinguishable: live > normal > past.
pub fn style_for_block(channel_color: Color, is_live: bool, is_past: bool) -> Style {
    if is_live {
        Style::default()
            .fg(channel_color)
            .bg(C_SELECTION_BG)
            .add_modifier(Modifier::BOLD)
    } else if is_past {
        Style::default().fg(channel_color).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(channel_color)
    }
}
