use std::sync::Arc;

use crate::cli::{self, AppAction};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::{ShowCatalog, ShowService, TmdbClient};

/// Ties the store and the catalog to one signed-in user.
pub struct App<C = TmdbClient> {
    pub user: User,
    shows: ShowService<C>,
}

impl App<TmdbClient> {
    pub async fn new(config: &Config) -> Result<Self> {
        let identity = config.user.clone().ok_or_else(|| {
            AppError::Config(format!(
                "no [user] section in {}; add google_id and email",
                Config::config_path().display()
            ))
        })?;

        let repository = Arc::new(Repository::new(&config.db_path).await?);
        let catalog = TmdbClient::from_config(config)?;
        let user = repository.upsert_user(identity).await?;
        tracing::debug!("Signed in as {}", user.id);

        Ok(Self {
            user,
            shows: ShowService::new(repository, catalog, config.cache_max_age_days),
        })
    }
}

impl<C: ShowCatalog> App<C> {
    pub fn with_service(user: User, shows: ShowService<C>) -> Self {
        Self { user, shows }
    }

    /// Run one action and return the text to print.
    pub async fn handle_action(&self, action: AppAction) -> Result<String> {
        let user_id = self.user.id.as_str();
        let repository = self.shows.repository();

        let output = match action {
            AppAction::Search { query, page } => {
                let response = self.shows.search(&query, page).await?;
                format!(
                    "{}\n\nPage {}/{} ({} results)",
                    cli::render_search(&response.results),
                    response.page,
                    response.total_pages,
                    response.total_results
                )
            }

            AppAction::Trending { window } => {
                cli::render_search(&self.shows.trending(window).await?)
            }

            AppAction::ShowDetails { show_id } => {
                cli::render_show(&self.shows.show_details(show_id).await?)
            }

            AppAction::SeasonDetails { show_id, season } => {
                cli::render_season(&self.shows.season_details(show_id, season).await?)
            }

            AppAction::ExternalIds { show_id } => {
                let ids = self.shows.external_ids(show_id).await?;
                format!(
                    "IMDb: {}\nTVDB: {}\nWikidata: {}",
                    ids.imdb_id.as_deref().unwrap_or("-"),
                    ids.tvdb_id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string()),
                    ids.wikidata_id.as_deref().unwrap_or("-")
                )
            }

            AppAction::AddShow {
                show_id,
                status,
                favorite,
            } => {
                self.shows.add_show(user_id, show_id, status, favorite).await?;
                format!("Added show {} as {}", show_id, status)
            }

            AppAction::RemoveShow { show_id } => {
                if !repository.remove_show_from_user(user_id, show_id).await? {
                    return Err(not_in_list(show_id));
                }
                format!("Removed show {}", show_id)
            }

            AppAction::SetStatus { show_id, status } => {
                if !repository
                    .update_user_show_status(user_id, show_id, status)
                    .await?
                {
                    return Err(not_in_list(show_id));
                }
                format!("Show {} is now {}", show_id, status)
            }

            AppAction::SetFavorite { show_id, favorite } => {
                if !repository
                    .set_user_show_favorite(user_id, show_id, favorite)
                    .await?
                {
                    return Err(not_in_list(show_id));
                }
                if favorite {
                    format!("Show {} marked as favorite", show_id)
                } else {
                    format!("Show {} removed from favorites", show_id)
                }
            }

            AppAction::ListShows => cli::render_tracked(&repository.get_user_shows(user_id).await?),

            AppAction::MarkEpisode {
                show_id,
                season,
                episode,
            } => {
                repository
                    .mark_episode_watched(user_id, show_id, season, episode)
                    .await?;
                format!("Marked S{:02}E{:02} as watched", season, episode)
            }

            AppAction::MarkBatch { show_id, episodes } => {
                let count = repository
                    .mark_episodes_batch(user_id, show_id, episodes)
                    .await?;
                format!("{} episodes marked as watched", count)
            }

            AppAction::MarkSeason {
                show_id,
                season,
                episode_count,
            } => {
                let count = match episode_count {
                    Some(n) => {
                        repository
                            .mark_season_watched(user_id, show_id, season, n)
                            .await?
                    }
                    None => {
                        self.shows
                            .mark_season_from_catalog(user_id, show_id, season)
                            .await?
                    }
                };
                format!("Season {} marked as watched ({} new)", season, count)
            }

            AppAction::UnmarkEpisode {
                show_id,
                season,
                episode,
            } => {
                if !repository
                    .unmark_episode_watched(user_id, show_id, season, episode)
                    .await?
                {
                    return Err(AppError::NotFound(format!(
                        "S{:02}E{:02} was not marked as watched",
                        season, episode
                    )));
                }
                format!("Unmarked S{:02}E{:02}", season, episode)
            }

            AppAction::WatchedEpisodes { show_id } => {
                cli::render_watched(&repository.get_watched_episodes(user_id, show_id).await?)
            }

            AppAction::Progress {
                show_id: Some(show_id),
                total,
            } => {
                let progress = repository.calculate_progress(user_id, show_id, total).await?;
                cli::render_progress(show_id, &progress)
            }

            AppAction::Progress { show_id: None, .. } => {
                cli::render_all_progress(&repository.get_all_user_progress(user_id).await?)
            }
        };

        Ok(output)
    }
}

fn not_in_list(show_id: i64) -> AppError {
    AppError::NotFound(format!("show {} is not in your list", show_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{sample_show, test_repository};
    use crate::models::{Identity, ShowStatus};
    use crate::services::fake::FakeCatalog;

    async fn test_app(catalog: FakeCatalog) -> (App<FakeCatalog>, tempfile::TempDir) {
        let (repo, dir) = test_repository().await;
        let user = repo
            .upsert_user(Identity {
                google_id: "google-app".to_string(),
                email: "app@example.com".to_string(),
                name: None,
                picture_url: None,
            })
            .await
            .unwrap();
        let service = ShowService::new(Arc::new(repo), catalog, 7);
        (App::with_service(user, service), dir)
    }

    #[tokio::test]
    async fn add_mark_and_report_progress() {
        let (app, _dir) = test_app(FakeCatalog::with_show(sample_show(1399, 10))).await;

        app.handle_action(AppAction::AddShow {
            show_id: 1399,
            status: ShowStatus::Watching,
            favorite: false,
        })
        .await
        .unwrap();

        let out = app
            .handle_action(AppAction::MarkBatch {
                show_id: 1399,
                episodes: vec![(1, 1), (1, 2), (1, 3)],
            })
            .await
            .unwrap();
        assert_eq!(out, "3 episodes marked as watched");

        let out = app
            .handle_action(AppAction::Progress {
                show_id: Some(1399),
                total: None,
            })
            .await
            .unwrap();
        assert_eq!(out, "Show 1399: 3/10 episodes (30.0%)");

        let out = app
            .handle_action(AppAction::Progress {
                show_id: None,
                total: None,
            })
            .await
            .unwrap();
        assert!(out.contains("Show 1399"));
        assert!(out.contains("30.0%"));
    }

    #[tokio::test]
    async fn missing_rows_surface_as_not_found() {
        let (app, _dir) = test_app(FakeCatalog::default()).await;

        let err = app
            .handle_action(AppAction::UnmarkEpisode {
                show_id: 1,
                season: 1,
                episode: 1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = app
            .handle_action(AppAction::SetStatus {
                show_id: 1,
                status: ShowStatus::Dropped,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn season_without_count_asks_catalog() {
        let (app, _dir) = test_app(FakeCatalog::default()).await;

        let out = app
            .handle_action(AppAction::MarkSeason {
                show_id: 5,
                season: 1,
                episode_count: None,
            })
            .await
            .unwrap();
        assert_eq!(out, "Season 1 marked as watched (6 new)");

        let out = app
            .handle_action(AppAction::MarkSeason {
                show_id: 5,
                season: 1,
                episode_count: Some(8),
            })
            .await
            .unwrap();
        assert_eq!(out, "Season 1 marked as watched (2 new)");
    }
}
