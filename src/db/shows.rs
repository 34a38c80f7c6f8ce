use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{CatalogShow, Show};

use super::repository::{now_timestamp, parse_datetime};
use super::Repository;

pub const DEFAULT_MAX_AGE_DAYS: i64 = 7;

impl Repository {
    /// Normalize a catalog payload and upsert it into the show cache in a
    /// single statement. Returns the show id.
    pub async fn cache_show(&self, show: CatalogShow) -> Result<i64> {
        let id = show.id;
        let title = show.display_title();
        let genres = show.joined_genres();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO shows (id, title, overview, poster_path, backdrop_path, first_air_date,
                                          total_episodes, total_seasons, genres, tmdb_rating, cached_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                       ON CONFLICT(id) DO UPDATE SET
                           title = excluded.title,
                           overview = excluded.overview,
                           poster_path = excluded.poster_path,
                           backdrop_path = excluded.backdrop_path,
                           first_air_date = excluded.first_air_date,
                           total_episodes = excluded.total_episodes,
                           total_seasons = excluded.total_seasons,
                           genres = excluded.genres,
                           tmdb_rating = excluded.tmdb_rating,
                           cached_at = excluded.cached_at"#,
                    params![
                        show.id,
                        title,
                        show.overview.unwrap_or_default(),
                        show.poster_path,
                        show.backdrop_path,
                        show.first_air_date,
                        show.number_of_episodes,
                        show.number_of_seasons,
                        genres,
                        show.vote_average,
                        now_timestamp(),
                    ],
                )?;
                Ok(())
            })
            .await?;

        tracing::debug!("Cached show {}", id);
        Ok(id)
    }

    pub async fn get_cached_show(&self, show_id: i64) -> Result<Option<Show>> {
        let show = self
            .conn
            .call(move |conn| {
                let show = conn
                    .query_row(
                        r#"SELECT id, title, overview, poster_path, backdrop_path, first_air_date,
                                  total_episodes, total_seasons, genres, tmdb_rating, cached_at
                           FROM shows WHERE id = ?1"#,
                        params![show_id],
                        show_from_row,
                    )
                    .optional()?;
                Ok(show)
            })
            .await?;
        Ok(show)
    }
}

impl Show {
    pub fn is_stale(&self, max_age_days: i64) -> bool {
        is_stale_at(self.cached_at, max_age_days, Utc::now())
    }
}

/// Whether a raw `cached_at` value is too old to trust. Missing or
/// unparseable timestamps are always stale.
pub fn is_stale(cached_at: Option<&str>, max_age_days: i64) -> bool {
    is_stale_at(cached_at.and_then(parse_datetime), max_age_days, Utc::now())
}

/// Stale once the elapsed time exceeds `max_age_days` days, compared
/// exactly: 7 days and 1 second is stale at a 7 day limit, 7 days is not.
/// Timestamps in the future count as fresh, and a limit too large to
/// represent never expires.
pub fn is_stale_at(cached_at: Option<DateTime<Utc>>, max_age_days: i64, now: DateTime<Utc>) -> bool {
    let Some(cached_at) = cached_at else {
        return true;
    };
    match Duration::try_days(max_age_days) {
        Some(max_age) => now.signed_duration_since(cached_at) > max_age,
        None => false,
    }
}

fn show_from_row(row: &Row) -> rusqlite::Result<Show> {
    Ok(Show {
        id: row.get(0)?,
        title: row.get(1)?,
        overview: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        poster_path: row.get(3)?,
        backdrop_path: row.get(4)?,
        first_air_date: row.get(5)?,
        total_episodes: row.get(6)?,
        total_seasons: row.get(7)?,
        genres: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        tmdb_rating: row.get(9)?,
        cached_at: row
            .get::<_, Option<String>>(10)?
            .and_then(|s| parse_datetime(&s)),
    })
}
