//! Wire types for the guide backend.
//!
//! Shapes mirror the backend JSON: optional fields default rather than
//! fail, so a partially populated payload still deserializes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Hex color used to tint the category chip.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub order: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    #[serde(default)]
    pub show_only_when_scheduled: bool,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panelist {
    pub id: i64,
    pub name: String,
}

/// Owning-channel reference embedded in a program payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub panelists: Vec<Panelist>,
    #[serde(default)]
    pub channel: Option<ChannelRef>,
    /// Styling tag for special broadcasts (e.g. club colors).
    #[serde(default)]
    pub style_override: Option<String>,
}

/// One program occurrence on one channel on one day.
///
/// Times are `HH:MM:SS` strings; `end_time` textually smaller than
/// `start_time` means the program crosses midnight. Regenerated
/// nightly by the backend and replaced wholesale on each fetch — the
/// client never edits schedules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: i64,
    /// Lowercase English day name, `"monday"` … `"sunday"`.
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub subscribed: bool,
    pub program: Program,
}

/// The unit exchanged between repository, merge engine, and grid:
/// one channel plus its ordered schedule list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWithSchedules {
    pub channel: Channel,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
    None,
}

impl Default for LinkType {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerType {
    News,
    Promotional,
    Featured,
}

impl Default for BannerType {
    fn default() -> Self {
        Self::Promotional
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_type: LinkType,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub is_enabled: bool,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub banner_type: BannerType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_deserializes_with_minimal_program() {
        let json = r#"{
            "id": 7,
            "day_of_week": "monday",
            "start_time": "10:00:00",
            "end_time": "12:00:00",
            "program": { "id": 3, "name": "Morning Show" }
        }"#;
        let s: Schedule = serde_json::from_str(json).unwrap();
        assert_eq!(s.day_of_week, "monday");
        assert!(!s.subscribed);
        assert!(!s.program.is_live);
        assert!(s.program.panelists.is_empty());
    }

    #[test]
    fn test_banner_link_type_lowercase() {
        let json = r#"{ "id": 1, "title": "promo", "link_type": "external" }"#;
        let b: Banner = serde_json::from_str(json).unwrap();
        assert_eq!(b.link_type, LinkType::External);
        assert_eq!(b.banner_type, BannerType::Promotional);
    }
}
