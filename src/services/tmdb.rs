use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{CatalogShow, SearchResponse, SearchResult, SeasonDetails};

pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";
const USER_AGENT: &str = concat!("show-tracker/", env!("CARGO_PKG_VERSION"));

/// Source of show metadata. Implemented by [`TmdbClient`]; tests substitute
/// their own.
pub trait ShowCatalog {
    fn search_shows(&self, query: &str, page: u32) -> impl Future<Output = Result<SearchResponse>> + Send;

    fn show_details(&self, show_id: i64) -> impl Future<Output = Result<CatalogShow>> + Send;

    fn season_details(
        &self,
        show_id: i64,
        season: i64,
    ) -> impl Future<Output = Result<SeasonDetails>> + Send;

    fn trending(&self, window: TimeWindow) -> impl Future<Output = Result<Vec<SearchResult>>> + Send;

    fn external_ids(&self, show_id: i64) -> impl Future<Output = Result<ExternalIds>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            other => Err(AppError::InvalidArgument(format!(
                "time window must be 'day' or 'week', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExternalIds {
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub tvdb_id: Option<i64>,
    #[serde(default)]
    pub wikidata_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl TmdbClient {
    pub fn new(api_key: String, base_url: &str, language: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .tmdb_api_key
            .clone()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                AppError::Config("tmdb_api_key is not set (config file or TMDB_API_KEY)".to_string())
            })?;
        Self::new(
            api_key,
            &config.tmdb_base_url,
            &config.language,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    Err(AppError::Upstream(format!("HTTP {}: {}", status, error_text)))
}

impl ShowCatalog for TmdbClient {
    async fn search_shows(&self, query: &str, page: u32) -> Result<SearchResponse> {
        self.get_json(
            "/search/tv",
            &[
                ("query", query.to_string()),
                ("page", page.to_string()),
                ("language", self.language.clone()),
            ],
        )
        .await
    }

    async fn show_details(&self, show_id: i64) -> Result<CatalogShow> {
        self.get_json(
            &format!("/tv/{}", show_id),
            &[("language", self.language.clone())],
        )
        .await
    }

    async fn season_details(&self, show_id: i64, season: i64) -> Result<SeasonDetails> {
        self.get_json(
            &format!("/tv/{}/season/{}", show_id, season),
            &[("language", self.language.clone())],
        )
        .await
    }

    async fn trending(&self, window: TimeWindow) -> Result<Vec<SearchResult>> {
        let response: TrendingResponse = self
            .get_json(&format!("/trending/tv/{}", window), &[])
            .await?;
        Ok(response.results)
    }

    async fn external_ids(&self, show_id: i64) -> Result<ExternalIds> {
        self.get_json(&format!("/tv/{}/external_ids", show_id), &[])
            .await
    }
}

/// Full poster URL for a stored `poster_path`.
pub fn poster_url(poster_path: Option<&str>, size: &str) -> Option<String> {
    image_url(poster_path, size)
}

pub fn backdrop_url(backdrop_path: Option<&str>, size: &str) -> Option<String> {
    image_url(backdrop_path, size)
}

fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}/{}{}", IMAGE_BASE_URL, size, p))
}
