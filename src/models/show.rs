use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A show as cached locally from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<String>,
    pub total_episodes: Option<i64>,
    pub total_seasons: Option<i64>,
    pub genres: String,
    pub tmdb_rating: Option<f64>,
    pub cached_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowStatus {
    #[default]
    Watching,
    Completed,
    Dropped,
    Paused,
}

impl ShowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShowStatus::Watching => "watching",
            ShowStatus::Completed => "completed",
            ShowStatus::Dropped => "dropped",
            ShowStatus::Paused => "paused",
        }
    }
}

impl fmt::Display for ShowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShowStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watching" => Ok(ShowStatus::Watching),
            "completed" => Ok(ShowStatus::Completed),
            "dropped" => Ok(ShowStatus::Dropped),
            "paused" => Ok(ShowStatus::Paused),
            other => Err(AppError::InvalidArgument(format!(
                "unknown status '{}', expected watching, completed, dropped or paused",
                other
            ))),
        }
    }
}

/// A watchlist entry joined with its cached show.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedShow {
    pub id: i64,
    pub user_id: String,
    pub show_id: i64,
    pub status: ShowStatus,
    pub favorite: bool,
    pub added_at: DateTime<Utc>,
    pub title: String,
    pub poster_path: Option<String>,
    pub total_episodes: Option<i64>,
    pub total_seasons: Option<i64>,
    pub tmdb_rating: Option<f64>,
}

/// Genres arrive either as `{"id": .., "name": ..}` objects or as bare strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Genre {
    Plain(String),
    Tagged {
        #[serde(default)]
        name: String,
    },
}

impl Genre {
    pub fn name(&self) -> &str {
        match self {
            Genre::Plain(name) => name,
            Genre::Tagged { name } => name,
        }
    }
}

/// Show detail payload as returned by the catalog. Only `id` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogShow {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub number_of_episodes: Option<i64>,
    #[serde(default)]
    pub number_of_seasons: Option<i64>,
    #[serde(default)]
    pub genres: Option<Vec<Genre>>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

impl CatalogShow {
    /// Series name, then movie title, then "Unknown".
    pub fn display_title(&self) -> String {
        self.name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.title.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Unknown")
            .to_string()
    }

    pub fn joined_genres(&self) -> String {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(Genre::name)
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: i64,
    #[serde(default = "unknown_name")]
    pub name: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
}

fn unknown_name() -> String {
    "Unknown".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonEpisode {
    pub episode_number: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub season_number: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<SeasonEpisode>,
}
