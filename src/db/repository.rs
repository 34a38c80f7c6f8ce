use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Identity, ShowStatus, TrackedShow, User};

use super::schema::SCHEMA;

/// Handle to the SQLite store. Every operation runs as a single closure on the
/// connection thread; multi-statement writes wrap themselves in a transaction.
pub struct Repository {
    pub(super) conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;

        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        tracing::debug!("Opened database at {}", db_path);
        Ok(Self { conn })
    }

    // User operations

    /// Create the user on first login, refresh name and picture afterwards.
    pub async fn upsert_user(&self, identity: Identity) -> Result<User> {
        let user = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let now = now_timestamp();

                let existing: Option<String> = tx
                    .query_row(
                        "SELECT id FROM users WHERE google_id = ?1",
                        params![identity.google_id],
                        |row| row.get(0),
                    )
                    .optional()?;

                let user_id = match existing {
                    Some(id) => {
                        tx.execute(
                            "UPDATE users SET name = ?1, picture_url = ?2, updated_at = ?3 WHERE id = ?4",
                            params![identity.name, identity.picture_url, now, id],
                        )?;
                        id
                    }
                    None => {
                        let id = Uuid::new_v4().to_string();
                        tx.execute(
                            r#"INSERT INTO users (id, google_id, email, name, picture_url, created_at, updated_at)
                               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)"#,
                            params![
                                id,
                                identity.google_id,
                                identity.email,
                                identity.name,
                                identity.picture_url,
                                now,
                            ],
                        )?;
                        id
                    }
                };

                let user = tx.query_row(
                    "SELECT id, google_id, email, name, picture_url, created_at, updated_at FROM users WHERE id = ?1",
                    params![user_id],
                    user_from_row,
                )?;
                tx.commit()?;
                Ok(user)
            })
            .await?;
        Ok(user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        let user_id = user_id.to_string();
        let user = self
            .conn
            .call(move |conn| {
                let user = conn
                    .query_row(
                        "SELECT id, google_id, email, name, picture_url, created_at, updated_at FROM users WHERE id = ?1",
                        params![user_id],
                        user_from_row,
                    )
                    .optional()?;
                Ok(user)
            })
            .await?;
        Ok(user)
    }

    // Watchlist operations

    /// Track a show for a user. Re-adding replaces the row, resetting status,
    /// favorite and `added_at`.
    pub async fn add_show_to_user(
        &self,
        user_id: &str,
        show_id: i64,
        status: ShowStatus,
        favorite: bool,
    ) -> Result<i64> {
        let user_id = user_id.to_string();
        let id = self
            .conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT OR REPLACE INTO user_shows (user_id, show_id, status, favorite, added_at)
                       VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    params![user_id, show_id, status.as_str(), favorite, now_timestamp()],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        tracing::info!("Added show {} to watchlist as {}", show_id, status);
        Ok(id)
    }

    pub async fn get_user_shows(&self, user_id: &str) -> Result<Vec<TrackedShow>> {
        let user_id = user_id.to_string();
        let shows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT us.id, us.user_id, us.show_id, us.status, us.favorite, us.added_at,
                              s.title, s.poster_path, s.total_episodes, s.total_seasons, s.tmdb_rating
                       FROM user_shows us
                       JOIN shows s ON us.show_id = s.id
                       WHERE us.user_id = ?1
                       ORDER BY us.added_at DESC, us.id DESC"#,
                )?;
                let shows = stmt
                    .query_map(params![user_id], tracked_show_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(shows)
            })
            .await?;
        Ok(shows)
    }

    pub async fn update_user_show_status(
        &self,
        user_id: &str,
        show_id: i64,
        status: ShowStatus,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE user_shows SET status = ?1 WHERE user_id = ?2 AND show_id = ?3",
                    params![status.as_str(), user_id, show_id],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn set_user_show_favorite(
        &self,
        user_id: &str,
        show_id: i64,
        favorite: bool,
    ) -> Result<bool> {
        let user_id = user_id.to_string();
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "UPDATE user_shows SET favorite = ?1 WHERE user_id = ?2 AND show_id = ?3",
                    params![favorite, user_id, show_id],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }

    pub async fn remove_show_from_user(&self, user_id: &str, show_id: i64) -> Result<bool> {
        let user_id = user_id.to_string();
        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    "DELETE FROM user_shows WHERE user_id = ?1 AND show_id = ?2",
                    params![user_id, show_id],
                )?;
                Ok(changed)
            })
            .await?;
        Ok(changed > 0)
    }
}

/// Timestamps are written with fixed microsecond precision so that text
/// ordering in SQL matches chronological ordering.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    // Try RFC3339 first (e.g., "2026-01-11T12:34:56.123456Z")
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Try SQLite datetime format (e.g., "2026-01-11 12:34:56")
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    None
}

pub(super) fn timestamp_column(row: &Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    parse_datetime(&raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("invalid timestamp '{}'", raw).into(),
        )
    })
}

pub(super) fn status_column(row: &Row, idx: usize) -> rusqlite::Result<ShowStatus> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e: crate::error::AppError| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, e.to_string().into())
    })
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        google_id: row.get(1)?,
        email: row.get(2)?,
        name: row.get(3)?,
        picture_url: row.get(4)?,
        created_at: timestamp_column(row, 5)?,
        updated_at: timestamp_column(row, 6)?,
    })
}

fn tracked_show_from_row(row: &Row) -> rusqlite::Result<TrackedShow> {
    Ok(TrackedShow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        show_id: row.get(2)?,
        status: status_column(row, 3)?,
        favorite: row.get::<_, i64>(4)? != 0,
        added_at: timestamp_column(row, 5)?,
        title: row.get(6)?,
        poster_path: row.get(7)?,
        total_episodes: row.get(8)?,
        total_seasons: row.get(9)?,
        tmdb_rating: row.get(10)?,
    })
}
