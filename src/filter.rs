//! Event filters: inclusive calendar-date range and case-insensitive model allow-list.
//!
//! Both filters are pure: they read the input slice and return a new vector,
//! so they can be applied in either order and any number of times.

use crate::models::{ReportOptions, UsageEvent};
use crate::timestamp_parser::TimestampParser;
use chrono::NaiveDate;
use std::collections::HashSet;

/// Keep events on or after `since` (from midnight UTC) and up to the end of
/// the `until` calendar day.
pub fn filter_by_date_range(
    events: &[UsageEvent],
    since: Option<NaiveDate>,
    until: Option<NaiveDate>,
) -> Vec<UsageEvent> {
    let lower = since.map(TimestampParser::start_of_day);
    let upper = until.map(TimestampParser::start_of_next_day);

    events
        .iter()
        .filter(|event| lower.map_or(true, |lower| event.timestamp >= lower))
        .filter(|event| upper.map_or(true, |upper| event.timestamp < upper))
        .cloned()
        .collect()
}

/// Keep events whose model matches an allow-list entry, ignoring case.
/// An empty list keeps everything.
pub fn filter_by_models(events: &[UsageEvent], models: &[String]) -> Vec<UsageEvent> {
    if models.is_empty() {
        return events.to_vec();
    }

    let allowed: HashSet<String> = models.iter().map(|m| m.to_lowercase()).collect();
    events
        .iter()
        .filter(|event| allowed.contains(&event.model.to_lowercase()))
        .cloned()
        .collect()
}

/// Both filters bundled for one report run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub models: Vec<String>,
}

impl EventFilter {
    pub fn from_options(options: &ReportOptions) -> Self {
        Self {
            since: options.since,
            until: options.until,
            models: options.models.clone(),
        }
    }

    pub fn is_identity(&self) -> bool {
        self.since.is_none() && self.until.is_none() && self.models.is_empty()
    }

    pub fn apply(&self, events: &[UsageEvent]) -> Vec<UsageEvent> {
        let in_range = filter_by_date_range(events, self.since, self.until);
        filter_by_models(&in_range, &self.models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TokenUsage;
    use chrono::{DateTime, TimeZone, Utc};

    fn event_at(timestamp: DateTime<Utc>, model: &str) -> UsageEvent {
        UsageEvent {
            session_id: "s".to_string(),
            timestamp,
            model: model.to_string(),
            tokens: TokenUsage::new(1, 1, 0, 0),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<UsageEvent> {
        vec![
            event_at(Utc.with_ymd_and_hms(2025, 1, 14, 23, 59, 59).unwrap(), "claude-opus-4-20250514"),
            event_at(Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(), "claude-sonnet-4-20250514"),
            event_at(Utc.with_ymd_and_hms(2025, 1, 16, 23, 59, 0).unwrap(), "claude-opus-4-20250514"),
            event_at(Utc.with_ymd_and_hms(2025, 1, 17, 0, 0, 0).unwrap(), "other"),
        ]
    }

    #[test]
    fn test_no_bounds_is_identity() {
        let events = sample();
        assert_eq!(filter_by_date_range(&events, None, None), events);
    }

    #[test]
    fn test_since_is_inclusive_from_midnight() {
        let kept = filter_by_date_range(&sample(), Some(date(2025, 1, 15)), None);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[0].model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_until_covers_whole_day() {
        let kept = filter_by_date_range(&sample(), None, Some(date(2025, 1, 16)));
        assert_eq!(kept.len(), 3);
        assert!(kept
            .iter()
            .any(|e| e.timestamp == Utc.with_ymd_and_hms(2025, 1, 16, 23, 59, 0).unwrap()));
        assert!(kept.iter().all(|e| e.model != "other"));
    }

    #[test]
    fn test_single_day_range() {
        let day = date(2025, 1, 15);
        let kept = filter_by_date_range(&sample(), Some(day), Some(day));
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].model, "claude-sonnet-4-20250514");
    }

    #[test]
    fn test_model_filter_is_case_insensitive_and_exact() {
        let events = sample();
        let kept = filter_by_models(&events, &["CLAUDE-OPUS-4-20250514".to_string()]);
        assert_eq!(kept.len(), 2);

        let partial = filter_by_models(&events, &["claude-opus".to_string()]);
        assert!(partial.is_empty());
    }

    #[test]
    fn test_empty_model_list_is_identity() {
        let events = sample();
        assert_eq!(filter_by_models(&events, &[]), events);
    }

    #[test]
    fn test_filters_are_idempotent_and_commute() {
        let events = sample();
        let filter = EventFilter {
            since: Some(date(2025, 1, 15)),
            until: Some(date(2025, 1, 16)),
            models: vec!["Claude-Opus-4-20250514".to_string()],
        };

        let once = filter.apply(&events);
        assert_eq!(filter.apply(&once), once);

        let models_first = filter_by_date_range(
            &filter_by_models(&events, &filter.models),
            filter.since,
            filter.until,
        );
        assert_eq!(models_first, once);
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_input_is_untouched() {
        let events = sample();
        let before = events.clone();
        let _ = EventFilter {
            since: Some(date(2030, 1, 1)),
            until: None,
            models: vec![],
        }
        .apply(&events);
        assert_eq!(events, before);
    }
}
