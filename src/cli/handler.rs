use std::str::FromStr;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};

use crate::error::{AppError, Result};
use crate::models::ShowStatus;
use crate::services::TimeWindow;

#[derive(Parser, Debug)]
#[command(name = "show-tracker")]
#[command(about = "Track TV shows, watched episodes and progress against TMDb")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub action: AppAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum AppAction {
    // Catalog
    /// Search TMDb for TV shows
    Search {
        query: String,
        #[arg(default_value_t = 1)]
        page: u32,
    },

    /// Trending shows for the day or the week
    Trending {
        #[arg(value_parser = TimeWindow::from_str, default_value = "week")]
        window: TimeWindow,
    },

    /// Show details (cached, refreshed when stale)
    #[command(name = "show")]
    ShowDetails { show_id: i64 },

    /// Season details with episode list
    #[command(name = "season")]
    SeasonDetails { show_id: i64, season: i64 },

    /// IMDb/TVDB identifiers
    ExternalIds { show_id: i64 },

    // Watchlist
    /// Add a show to your list
    #[command(name = "add")]
    AddShow {
        show_id: i64,
        /// watching, completed, dropped or paused
        #[arg(value_parser = ShowStatus::from_str, default_value = "watching")]
        status: ShowStatus,
        #[arg(long)]
        favorite: bool,
    },

    /// Remove a show from your list
    #[command(name = "remove")]
    RemoveShow { show_id: i64 },

    /// Change the status of a tracked show
    #[command(name = "status")]
    SetStatus {
        show_id: i64,
        #[arg(value_parser = ShowStatus::from_str)]
        status: ShowStatus,
    },

    /// Flag or unflag a tracked show as favorite (on/off)
    #[command(name = "favorite")]
    SetFavorite {
        show_id: i64,
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        favorite: bool,
    },

    /// List tracked shows
    #[command(name = "list")]
    ListShows,

    // Watch state
    /// Mark one episode as watched
    #[command(name = "mark")]
    MarkEpisode { show_id: i64, season: i64, episode: i64 },

    /// Mark several episodes, given as 2x05 or S02E05
    MarkBatch {
        show_id: i64,
        #[arg(required = true, value_parser = parse_pair)]
        episodes: Vec<(i64, i64)>,
    },

    /// Mark a whole season; the episode count is looked up when omitted
    MarkSeason {
        show_id: i64,
        season: i64,
        episode_count: Option<i64>,
    },

    /// Unmark a watched episode
    #[command(name = "unmark")]
    UnmarkEpisode { show_id: i64, season: i64, episode: i64 },

    /// List watched episodes of a show
    #[command(name = "watched")]
    WatchedEpisodes { show_id: i64 },

    // Progress
    /// Progress for one show, or for every tracked show
    Progress {
        show_id: Option<i64>,
        /// Override the cached episode total
        #[arg(long, requires = "show_id")]
        total: Option<i64>,
    },
}

/// Parses `2x05` (also accepts `S02E05`).
fn parse_pair(pair: &str) -> Result<(i64, i64)> {
    let lower = pair.to_ascii_lowercase();
    let (season, episode) = lower
        .strip_prefix('s')
        .and_then(|s| s.split_once('e'))
        .or_else(|| lower.split_once('x'))
        .ok_or_else(|| {
            AppError::InvalidArgument(format!("expected <season>x<episode>, got '{}'", pair))
        })?;
    let number = |value: &str| {
        value
            .parse::<i64>()
            .map_err(|_| AppError::InvalidArgument(format!("'{}' is not a number", value)))
    };
    Ok((number(season)?, number(episode)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use clap::CommandFactory;

    fn parse(line: &str) -> std::result::Result<AppAction, clap::Error> {
        let args = std::iter::once("show-tracker").chain(line.split_whitespace());
        Cli::try_parse_from(args).map(|cli| cli.action)
    }

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn missing_command_is_an_error() {
        assert!(parse("").is_err());
        assert_eq!(parse("--help").unwrap_err().kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn parses_add_with_status_and_favorite() {
        assert_eq!(
            parse("add 1399 paused --favorite").unwrap(),
            AppAction::AddShow {
                show_id: 1399,
                status: ShowStatus::Paused,
                favorite: true
            }
        );
        assert_eq!(
            parse("add 1399").unwrap(),
            AppAction::AddShow {
                show_id: 1399,
                status: ShowStatus::Watching,
                favorite: false
            }
        );
    }

    #[test]
    fn parses_favorite_toggle() {
        assert_eq!(
            parse("favorite 7 off").unwrap(),
            AppAction::SetFavorite {
                show_id: 7,
                favorite: false
            }
        );
        assert_eq!(
            parse("favorite 7 on").unwrap(),
            AppAction::SetFavorite {
                show_id: 7,
                favorite: true
            }
        );
        assert!(parse("favorite 7 maybe").is_err());
    }

    #[test]
    fn parses_batch_pairs_in_both_notations() {
        assert_eq!(
            parse("mark-batch 1 1x1 S01E02 2x10").unwrap(),
            AppAction::MarkBatch {
                show_id: 1,
                episodes: vec![(1, 1), (1, 2), (2, 10)]
            }
        );
        assert!(parse("mark-batch 1 pilot").is_err());
        assert!(parse("mark-batch 1").is_err());
    }

    #[test]
    fn parses_progress_variants() {
        assert_eq!(
            parse("progress").unwrap(),
            AppAction::Progress {
                show_id: None,
                total: None
            }
        );
        assert_eq!(
            parse("progress 7 --total 20").unwrap(),
            AppAction::Progress {
                show_id: Some(7),
                total: Some(20)
            }
        );
        assert!(parse("progress --total 20").is_err());
    }

    #[test]
    fn mark_season_count_is_optional() {
        assert_eq!(
            parse("mark-season 5 2").unwrap(),
            AppAction::MarkSeason {
                show_id: 5,
                season: 2,
                episode_count: None
            }
        );
        assert_eq!(
            parse("mark-season 5 2 8").unwrap(),
            AppAction::MarkSeason {
                show_id: 5,
                season: 2,
                episode_count: Some(8)
            }
        );
    }

    #[test]
    fn trending_defaults_to_week() {
        assert_eq!(
            parse("trending").unwrap(),
            AppAction::Trending {
                window: TimeWindow::Week
            }
        );
        assert_eq!(
            parse("trending day").unwrap(),
            AppAction::Trending {
                window: TimeWindow::Day
            }
        );
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(
            parse("mark 1 one 2").unwrap_err().kind(),
            ErrorKind::ValueValidation
        );
        assert!(parse("status 1 binging").is_err());
        assert!(parse("frobnicate").is_err());
        assert!(parse("trending month").is_err());
    }
}
