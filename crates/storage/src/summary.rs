//! Mood Summaries

use crate::repository::MoodEntry;
use chrono::{Duration, NaiveDate};
use feature_engine::round_half_even;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average reported when a user has no entries in the window
pub const NEUTRAL_MOOD: f64 = 5.0;

/// Number of daily buckets in the weekly view
const WEEK_DAYS: i64 = 7;

/// Average mood of one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMood {
    /// Abbreviated weekday name, e.g. `Mon`
    pub date: String,
    /// Mean rating rounded to 1 decimal, `None` for days without entries
    pub rating: Option<f64>,
}

/// Mean mood over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodAverage {
    pub average_mood: f64,
    pub total_entries: usize,
}

/// Daily averages for the seven days ending `today`, oldest first
pub fn weekly_summary(entries: &[MoodEntry], today: NaiveDate) -> Vec<DailyMood> {
    let mut by_day: BTreeMap<NaiveDate, Vec<i32>> = BTreeMap::new();
    for entry in entries {
        by_day.entry(entry.entry_date).or_default().push(entry.rating);
    }

    (0..WEEK_DAYS)
        .rev()
        .map(|days_ago| {
            let day = today - Duration::days(days_ago);
            let rating = by_day.get(&day).map(|ratings| {
                let sum: i32 = ratings.iter().sum();
                round_half_even(sum as f64 / ratings.len() as f64, 1)
            });
            DailyMood {
                date: day.format("%a").to_string(),
                rating,
            }
        })
        .collect()
}

/// Mean rating of the entries, or [`NEUTRAL_MOOD`] when there are none
pub fn average_mood(entries: &[MoodEntry]) -> MoodAverage {
    if entries.is_empty() {
        return MoodAverage {
            average_mood: NEUTRAL_MOOD,
            total_entries: 0,
        };
    }

    let sum: i64 = entries.iter().map(|e| e.rating as i64).sum();
    MoodAverage {
        average_mood: round_half_even(sum as f64 / entries.len() as f64, 1),
        total_entries: entries.len(),
    }
}
