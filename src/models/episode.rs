use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ShowStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeWatched {
    pub id: i64,
    pub user_id: String,
    pub show_id: i64,
    pub season: i64,
    pub episode: i64,
    pub watched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub watched: i64,
    pub total: i64,
    pub percentage: f64,
}

impl Progress {
    pub fn new(watched: i64, total: i64) -> Self {
        Self {
            watched,
            total,
            percentage: percentage(watched, total),
        }
    }
}

/// Per-show row of the all-shows progress overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowProgress {
    pub show_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
    pub status: ShowStatus,
    pub favorite: bool,
    pub total_episodes: i64,
    pub watched_episodes: i64,
    pub percentage: f64,
}

/// `watched / total * 100` rounded to one decimal; zero when there is no total.
pub(crate) fn percentage(watched: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let raw = watched as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}
