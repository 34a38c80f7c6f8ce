//! In-memory catalog for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::tmdb::{ExternalIds, ShowCatalog, TimeWindow};
use crate::error::{AppError, Result};
use crate::models::{CatalogShow, SearchResponse, SearchResult, SeasonDetails, SeasonEpisode};

#[derive(Default)]
pub struct FakeCatalog {
    pub shows: HashMap<i64, CatalogShow>,
    pub failing: AtomicBool,
    pub detail_calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_show(show: CatalogShow) -> Self {
        let mut catalog = Self::default();
        catalog.shows.insert(show.id, show);
        catalog
    }

    fn fail(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Upstream("HTTP 503: unavailable".to_string()));
        }
        Ok(())
    }
}

impl ShowCatalog for FakeCatalog {
    async fn search_shows(&self, query: &str, page: u32) -> Result<SearchResponse> {
        self.fail()?;
        let results = self
            .shows
            .values()
            .filter(|s| s.display_title().contains(query))
            .map(|s| SearchResult {
                id: s.id,
                name: s.display_title(),
                overview: s.overview.clone(),
                poster_path: s.poster_path.clone(),
                first_air_date: s.first_air_date.clone(),
                vote_average: s.vote_average,
            })
            .collect::<Vec<_>>();
        Ok(SearchResponse {
            total_results: results.len() as u32,
            total_pages: 1,
            page,
            results,
        })
    }

    async fn show_details(&self, show_id: i64) -> Result<CatalogShow> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.fail()?;
        self.shows
            .get(&show_id)
            .cloned()
            .ok_or_else(|| AppError::Upstream("HTTP 404: not found".to_string()))
    }

    async fn season_details(&self, _show_id: i64, season: i64) -> Result<SeasonDetails> {
        self.fail()?;
        Ok(SeasonDetails {
            season_number: season,
            name: None,
            air_date: None,
            episodes: (1..=6)
                .map(|n| SeasonEpisode {
                    episode_number: n,
                    name: None,
                    air_date: None,
                    overview: None,
                })
                .collect(),
        })
    }

    async fn trending(&self, _window: TimeWindow) -> Result<Vec<SearchResult>> {
        self.fail()?;
        Ok(Vec::new())
    }

    async fn external_ids(&self, _show_id: i64) -> Result<ExternalIds> {
        self.fail()?;
        Ok(ExternalIds {
            imdb_id: Some("tt0944947".to_string()),
            ..Default::default()
        })
    }
}
