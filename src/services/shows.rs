use std::sync::Arc;

use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{SearchResponse, SearchResult, SeasonDetails, Show, ShowStatus};

use super::tmdb::{ExternalIds, ShowCatalog, TimeWindow};

/// Show lookups backed by the local cache, refreshed lazily from the catalog.
pub struct ShowService<C> {
    repository: Arc<Repository>,
    catalog: C,
    max_age_days: i64,
}

impl<C: ShowCatalog> ShowService<C> {
    pub fn new(repository: Arc<Repository>, catalog: C, max_age_days: i64) -> Self {
        Self {
            repository,
            catalog,
            max_age_days,
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }

    /// Cached show if fresh, otherwise fetched and re-cached. When the
    /// catalog fails, a stale cache entry is served instead.
    pub async fn show_details(&self, show_id: i64) -> Result<Show> {
        let cached = self.repository.get_cached_show(show_id).await?;
        if let Some(show) = &cached {
            if !show.is_stale(self.max_age_days) {
                tracing::debug!("Cache hit for show {}", show_id);
                return Ok(show.clone());
            }
        }

        match self.refresh(show_id).await {
            Ok(show) => Ok(show),
            Err(e) if e.is_upstream() => match cached {
                Some(stale) => {
                    tracing::warn!("Serving stale cache for show {}: {}", show_id, e);
                    Ok(stale)
                }
                None => Err(e),
            },
            Err(e) => Err(e),
        }
    }

    /// Cached show, fetched only when there is no cache entry at all.
    pub async fn ensure_cached(&self, show_id: i64) -> Result<Show> {
        match self.repository.get_cached_show(show_id).await? {
            Some(show) => Ok(show),
            None => self.refresh(show_id).await,
        }
    }

    /// Add a show to the user's list, caching its metadata first if needed.
    pub async fn add_show(
        &self,
        user_id: &str,
        show_id: i64,
        status: ShowStatus,
        favorite: bool,
    ) -> Result<i64> {
        self.ensure_cached(show_id).await?;
        self.repository
            .add_show_to_user(user_id, show_id, status, favorite)
            .await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::InvalidArgument(
                "search query must not be empty".to_string(),
            ));
        }
        if page < 1 {
            return Err(AppError::InvalidArgument("page starts at 1".to_string()));
        }
        self.catalog.search_shows(query, page).await
    }

    pub async fn trending(&self, window: TimeWindow) -> Result<Vec<SearchResult>> {
        self.catalog.trending(window).await
    }

    pub async fn season_details(&self, show_id: i64, season: i64) -> Result<SeasonDetails> {
        self.catalog.season_details(show_id, season).await
    }

    pub async fn external_ids(&self, show_id: i64) -> Result<ExternalIds> {
        self.catalog.external_ids(show_id).await
    }

    /// Mark a whole season using the episode count the catalog reports for it.
    pub async fn mark_season_from_catalog(
        &self,
        user_id: &str,
        show_id: i64,
        season: i64,
    ) -> Result<usize> {
        let details = self.catalog.season_details(show_id, season).await?;
        let episode_count = details.episodes.len() as i64;
        if episode_count == 0 {
            return Err(AppError::NotFound(format!(
                "season {} of show {} has no episodes",
                season, show_id
            )));
        }
        self.repository
            .mark_season_watched(user_id, show_id, season, episode_count)
            .await
    }

    async fn refresh(&self, show_id: i64) -> Result<Show> {
        tracing::debug!("Fetching show {} from catalog", show_id);
        let payload = self.catalog.show_details(show_id).await?;
        let id = self.repository.cache_show(payload).await?;
        self.repository
            .get_cached_show(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("show {} missing right after caching", id).into())
    }
}
