//! Reconciles the two schedule shapes the backend serves.
//!
//! The week fetch is complete but slow; the today fetch is fast and
//! carries accurate live status for the current day only. The merge
//! replaces exactly the today partition of each channel's list, leaving
//! every other day untouched, so the two fetches compose correctly no
//! matter which resolves first.

use std::collections::HashMap;

use grilla_core::types::ChannelWithSchedules;

/// Merge fresh today data into week-shaped data.
///
/// Pure: neither input is mutated. `today_day` is the current day name
/// (`grilla_core::timeutil`), passed in so callers control the clock.
/// Duplicate channel ids within an input: the first occurrence wins.
pub fn merge_today_into_week(
    week: &[ChannelWithSchedules],
    today: &[ChannelWithSchedules],
    today_day: &str,
) -> Vec<ChannelWithSchedules> {
    // Bootstrap: nothing to merge into yet.
    if week.is_empty() {
        return dedupe_by_channel_id(today);
    }

    let mut today_by_id: HashMap<i64, &ChannelWithSchedules> = HashMap::new();
    for ch in today {
        today_by_id.entry(ch.channel.id).or_insert(ch);
    }

    let mut merged: Vec<ChannelWithSchedules> = Vec::with_capacity(week.len());
    let mut seen: HashMap<i64, ()> = HashMap::new();
    for week_ch in week {
        if seen.insert(week_ch.channel.id, ()).is_some() {
            continue;
        }
        match today_by_id.get(&week_ch.channel.id) {
            Some(today_ch) => {
                // Replace today's schedules with fresh data, keep other days.
                let mut schedules: Vec<_> = week_ch
                    .schedules
                    .iter()
                    .filter(|s| s.day_of_week != today_day)
                    .cloned()
                    .collect();
                schedules.extend(today_ch.schedules.iter().cloned());
                merged.push(ChannelWithSchedules {
                    channel: week_ch.channel.clone(),
                    schedules,
                });
            }
            None => merged.push(week_ch.clone()),
        }
    }

    // Channels the today fetch knows about but the week data doesn't
    // (e.g. a newly visible channel).
    for today_ch in today {
        if seen.insert(today_ch.channel.id, ()).is_none() {
            merged.push(today_ch.clone());
        }
    }

    merged
}

fn dedupe_by_channel_id(channels: &[ChannelWithSchedules]) -> Vec<ChannelWithSchedules> {
    let mut seen: HashMap<i64, ()> = HashMap::new();
    channels
        .iter()
        .filter(|ch| seen.insert(ch.channel.id, ()).is_none())
        .cloned()
        .collect()
}

/// Keep only one day's schedules per channel; channels with nothing on
/// that day drop out. In-memory only — day switching never fetches.
pub fn filter_day(channels: &[ChannelWithSchedules], day: &str) -> Vec<ChannelWithSchedules> {
    channels
        .iter()
        .map(|ch| ChannelWithSchedules {
            channel: ch.channel.clone(),
            schedules: ch
                .schedules
                .iter()
                .filter(|s| s.day_of_week == day)
                .cloned()
                .collect(),
        })
        .filter(|ch| !ch.schedules.is_empty())
        .collect()
}

pub fn filter_category(
    channels: &[ChannelWithSchedules],
    category_id: Option<i64>,
) -> Vec<ChannelWithSchedules> {
    match category_id {
        None => channels.to_vec(),
        Some(id) => channels
            .iter()
            .filter(|ch| ch.channel.categories.iter().any(|c| c.id == id))
            .cloned()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grilla_core::types::{Category, Channel, Program, Schedule};

    fn channel(id: i64, name: &str) -> Channel {
        Channel {
            id,
            name: name.to_string(),
            logo_url: None,
            background_color: None,
            show_only_when_scheduled: false,
            handle: None,
            categories: Vec::new(),
        }
    }

    fn schedule(id: i64, day: &str, start: &str, end: &str) -> Schedule {
        Schedule {
            id,
            day_of_week: day.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            subscribed: false,
            program: Program {
                id,
                name: format!("program-{}", id),
                logo_url: None,
                description: None,
                stream_url: None,
                is_live: false,
                panelists: Vec::new(),
                channel: None,
                style_override: None,
            },
        }
    }

    fn cws(id: i64, schedules: Vec<Schedule>) -> ChannelWithSchedules {
        ChannelWithSchedules {
            channel: channel(id, &format!("channel-{}", id)),
            schedules,
        }
    }

    #[test]
    fn test_empty_week_returns_today_unchanged() {
        let today = vec![cws(1, vec![schedule(1, "monday", "10:00:00", "11:00:00")])];
        let merged = merge_today_into_week(&[], &today, "monday");
        assert_eq!(merged, today);
    }

    #[test]
    fn test_day_isolation() {
        let week = vec![cws(
            1,
            vec![
                schedule(10, "monday", "10:00:00", "11:00:00"),
                schedule(11, "tuesday", "10:00:00", "11:00:00"),
                schedule(12, "wednesday", "09:00:00", "10:00:00"),
            ],
        )];
        let today = vec![cws(1, vec![schedule(99, "tuesday", "12:00:00", "13:00:00")])];

        let merged = merge_today_into_week(&week, &today, "tuesday");
        assert_eq!(merged.len(), 1);
        let schedules = &merged[0].schedules;
        // Monday and Wednesday pass through byte-identical.
        assert!(schedules.contains(&week[0].schedules[0]));
        assert!(schedules.contains(&week[0].schedules[2]));
        // Tuesday comes entirely from today.
        assert!(!schedules.iter().any(|s| s.id == 11));
        assert!(schedules.iter().any(|s| s.id == 99));
        assert_eq!(schedules.len(), 3);
    }

    #[test]
    fn test_purity_inputs_unchanged() {
        let week = vec![cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")])];
        let today = vec![
            cws(1, vec![schedule(99, "monday", "12:00:00", "13:00:00")]),
            cws(2, vec![schedule(50, "monday", "08:00:00", "09:00:00")]),
        ];
        let week_before = week.clone();
        let today_before = today.clone();

        let _ = merge_today_into_week(&week, &today, "monday");

        assert_eq!(week, week_before);
        assert_eq!(today, today_before);
    }

    #[test]
    fn test_additive_union() {
        let week = vec![cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")])];
        let today = vec![
            cws(1, vec![schedule(99, "monday", "12:00:00", "13:00:00")]),
            cws(2, vec![schedule(50, "monday", "08:00:00", "09:00:00")]),
        ];

        let merged = merge_today_into_week(&week, &today, "monday");
        let channel_two: Vec<_> = merged.iter().filter(|c| c.channel.id == 2).collect();
        assert_eq!(channel_two.len(), 1);
        assert_eq!(channel_two[0].schedules, today[1].schedules);
    }

    #[test]
    fn test_week_only_channels_keep_existing_data() {
        let week = vec![
            cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")]),
            cws(3, vec![schedule(30, "friday", "20:00:00", "22:00:00")]),
        ];
        let today = vec![cws(1, vec![schedule(99, "monday", "12:00:00", "13:00:00")])];

        let merged = merge_today_into_week(&week, &today, "monday");
        let three = merged.iter().find(|c| c.channel.id == 3).unwrap();
        assert_eq!(three.schedules, week[1].schedules);
    }

    #[test]
    fn test_duplicate_channel_ids_first_wins() {
        let week = vec![
            cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")]),
            cws(1, vec![schedule(11, "monday", "20:00:00", "21:00:00")]),
        ];
        let today = vec![
            cws(1, vec![schedule(99, "monday", "12:00:00", "13:00:00")]),
            cws(1, vec![schedule(98, "monday", "14:00:00", "15:00:00")]),
        ];

        let merged = merge_today_into_week(&week, &today, "monday");
        assert_eq!(merged.len(), 1);
        // First today occurrence (id 99) supplies the day's schedules.
        assert_eq!(merged[0].schedules.len(), 1);
        assert_eq!(merged[0].schedules[0].id, 99);
    }

    #[test]
    fn test_filter_day_drops_empty_channels() {
        let channels = vec![
            cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")]),
            cws(2, vec![schedule(20, "friday", "10:00:00", "11:00:00")]),
        ];
        let monday = filter_day(&channels, "monday");
        assert_eq!(monday.len(), 1);
        assert_eq!(monday[0].channel.id, 1);
    }

    #[test]
    fn test_filter_category() {
        let mut ch = cws(1, vec![schedule(10, "monday", "10:00:00", "11:00:00")]);
        ch.channel.categories.push(Category {
            id: 7,
            name: "deportes".to_string(),
            description: None,
            color: None,
            order: None,
        });
        let other = cws(2, vec![schedule(20, "monday", "10:00:00", "11:00:00")]);
        let channels = vec![ch, other];

        assert_eq!(filter_category(&channels, None).len(), 2);
        let filtered = filter_category(&channels, Some(7));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].channel.id, 1);
        assert!(filter_category(&channels, Some(8)).is_empty());
    }
}
