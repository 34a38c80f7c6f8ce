use rusqlite::{params, OptionalExtension, Row};

use crate::error::Result;
use crate::models::{Progress, ShowProgress};

use super::repository::status_column;
use super::Repository;

impl Repository {
    /// Watched vs. total episodes for one show. `total_override` wins over
    /// the cached total; an uncached show without override has total 0.
    pub async fn calculate_progress(
        &self,
        user_id: &str,
        show_id: i64,
        total_override: Option<i64>,
    ) -> Result<Progress> {
        let user_id = user_id.to_string();
        let (watched, cached_total) = self
            .conn
            .call(move |conn| {
                let watched: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM episodes_watched WHERE user_id = ?1 AND show_id = ?2",
                    params![user_id, show_id],
                    |row| row.get(0),
                )?;
                let cached_total: Option<i64> = conn
                    .query_row(
                        "SELECT total_episodes FROM shows WHERE id = ?1",
                        params![show_id],
                        |row| row.get::<_, Option<i64>>(0),
                    )
                    .optional()?
                    .flatten();
                Ok((watched, cached_total))
            })
            .await?;

        let total = total_override.or(cached_total).unwrap_or(0);
        Ok(Progress::new(watched, total))
    }

    /// Progress across every tracked show, most recently added first,
    /// aggregated in a single query.
    pub async fn get_all_user_progress(&self, user_id: &str) -> Result<Vec<ShowProgress>> {
        let user_id = user_id.to_string();
        let progress = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT us.show_id, s.title, s.poster_path, us.status, us.favorite,
                              COALESCE(s.total_episodes, 0) AS total_episodes,
                              COUNT(ew.id) AS watched_episodes
                       FROM user_shows us
                       JOIN shows s ON us.show_id = s.id
                       LEFT JOIN episodes_watched ew
                              ON ew.user_id = us.user_id AND ew.show_id = us.show_id
                       WHERE us.user_id = ?1
                       GROUP BY us.id
                       ORDER BY us.added_at DESC, us.id DESC"#,
                )?;
                let progress = stmt
                    .query_map(params![user_id], show_progress_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(progress)
            })
            .await?;
        Ok(progress)
    }
}

fn show_progress_from_row(row: &Row) -> rusqlite::Result<ShowProgress> {
    let total_episodes: i64 = row.get(5)?;
    let watched_episodes: i64 = row.get(6)?;
    Ok(ShowProgress {
        show_id: row.get(0)?,
        title: row.get(1)?,
        poster_path: row.get(2)?,
        status: status_column(row, 3)?,
        favorite: row.get::<_, i64>(4)? != 0,
        total_episodes,
        watched_episodes,
        percentage: Progress::new(watched_episodes, total_episodes).percentage,
    })
}
