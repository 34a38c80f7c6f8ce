use std::collections::HashSet;

use rusqlite::{params, Row};

use crate::error::{AppError, Result};
use crate::models::EpisodeWatched;

use super::repository::{now_timestamp, timestamp_column};
use super::Repository;

/// Upper bound for a caller supplied season length.
pub const MAX_SEASON_EPISODES: i64 = u16::MAX as i64;

const INSERT_WATCHED: &str = r#"INSERT OR IGNORE INTO episodes_watched (user_id, show_id, season, episode, watched_at)
                                VALUES (?1, ?2, ?3, ?4, ?5)"#;

impl Repository {
    /// Mark one episode watched. Marking an already watched episode is a
    /// no-op; either way the id of the record marking it is returned.
    pub async fn mark_episode_watched(
        &self,
        user_id: &str,
        show_id: i64,
        season: i64,
        episode: i64,
    ) -> Result<i64> {
        validate_episode(season, episode)?;
        let user_id = user_id.to_string();

        let id = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute(
                    INSERT_WATCHED,
                    params![user_id, show_id, season, episode, now_timestamp()],
                )?;
                let id: i64 = tx.query_row(
                    r#"SELECT id FROM episodes_watched
                       WHERE user_id = ?1 AND show_id = ?2 AND season = ?3 AND episode = ?4"#,
                    params![user_id, show_id, season, episode],
                    |row| row.get(0),
                )?;
                tx.commit()?;
                Ok(id)
            })
            .await?;
        Ok(id)
    }

    /// Mark a list of `(season, episode)` pairs in one transaction. Returns
    /// how many pairs were not marked before.
    pub async fn mark_episodes_batch(
        &self,
        user_id: &str,
        show_id: i64,
        episodes: Vec<(i64, i64)>,
    ) -> Result<usize> {
        for &(season, episode) in &episodes {
            validate_episode(season, episode)?;
        }
        if episodes.is_empty() {
            return Ok(0);
        }
        let user_id = user_id.to_string();

        let inserted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                let mut inserted = 0;
                {
                    let mut stmt = tx.prepare(INSERT_WATCHED)?;
                    let watched_at = now_timestamp();
                    for (season, episode) in episodes {
                        inserted +=
                            stmt.execute(params![user_id, show_id, season, episode, watched_at])?;
                    }
                }
                tx.commit()?;
                Ok(inserted)
            })
            .await?;

        tracing::debug!("Marked {} new episodes of show {}", inserted, show_id);
        Ok(inserted)
    }

    /// Mark episodes `1..=episode_count` of a season. The count comes from
    /// the caller and is not checked against cached metadata, only against
    /// `MAX_SEASON_EPISODES`.
    pub async fn mark_season_watched(
        &self,
        user_id: &str,
        show_id: i64,
        season: i64,
        episode_count: i64,
    ) -> Result<usize> {
        if !(1..=MAX_SEASON_EPISODES).contains(&episode_count) {
            return Err(AppError::InvalidArgument(format!(
                "episode count must be between 1 and {}, got {}",
                MAX_SEASON_EPISODES, episode_count
            )));
        }
        let episodes = (1..=episode_count).map(|ep| (season, ep)).collect();
        self.mark_episodes_batch(user_id, show_id, episodes).await
    }

    /// Returns whether a record was removed.
    pub async fn unmark_episode_watched(
        &self,
        user_id: &str,
        show_id: i64,
        season: i64,
        episode: i64,
    ) -> Result<bool> {
        validate_episode(season, episode)?;
        let user_id = user_id.to_string();

        let removed = self
            .conn
            .call(move |conn| {
                let removed = conn.execute(
                    r#"DELETE FROM episodes_watched
                       WHERE user_id = ?1 AND show_id = ?2 AND season = ?3 AND episode = ?4"#,
                    params![user_id, show_id, season, episode],
                )?;
                Ok(removed)
            })
            .await?;
        Ok(removed > 0)
    }

    pub async fn get_watched_episodes(
        &self,
        user_id: &str,
        show_id: i64,
    ) -> Result<Vec<EpisodeWatched>> {
        let user_id = user_id.to_string();
        let episodes = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, user_id, show_id, season, episode, watched_at
                       FROM episodes_watched
                       WHERE user_id = ?1 AND show_id = ?2
                       ORDER BY season, episode"#,
                )?;
                let episodes = stmt
                    .query_map(params![user_id, show_id], episode_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(episodes)
            })
            .await?;
        Ok(episodes)
    }

    pub async fn get_watched_set(&self, user_id: &str, show_id: i64) -> Result<HashSet<(i64, i64)>> {
        let user_id = user_id.to_string();
        let set = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT season, episode FROM episodes_watched WHERE user_id = ?1 AND show_id = ?2",
                )?;
                let set = stmt
                    .query_map(params![user_id, show_id], |row| {
                        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
                    })?
                    .collect::<std::result::Result<HashSet<_>, _>>()?;
                Ok(set)
            })
            .await?;
        Ok(set)
    }

    pub async fn get_watched_count(&self, user_id: &str, show_id: i64) -> Result<i64> {
        let user_id = user_id.to_string();
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM episodes_watched WHERE user_id = ?1 AND show_id = ?2",
                    params![user_id, show_id],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }
}

fn validate_episode(season: i64, episode: i64) -> Result<()> {
    if season < 1 || episode < 1 {
        return Err(AppError::InvalidArgument(format!(
            "season and episode must be positive, got S{}E{}",
            season, episode
        )));
    }
    Ok(())
}

fn episode_from_row(row: &Row) -> rusqlite::Result<EpisodeWatched> {
    Ok(EpisodeWatched {
        id: row.get(0)?,
        user_id: row.get(1)?,
        show_id: row.get(2)?,
        season: row.get(3)?,
        episode: row.get(4)?,
        watched_at: timestamp_column(row, 5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::{seed_user, test_repository};
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn marking_twice_counts_once() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        let first = assert_ok!(repo.mark_episode_watched(&user, 1399, 1, 1).await);
        let second = assert_ok!(repo.mark_episode_watched(&user, 1399, 1, 1).await);

        assert_eq!(first, second);
        assert_eq!(repo.get_watched_count(&user, 1399).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn batch_counts_only_newly_marked() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        let first = repo
            .mark_episodes_batch(&user, 1399, vec![(1, 1), (1, 2), (1, 3)])
            .await
            .unwrap();
        let second = repo
            .mark_episodes_batch(&user, 1399, vec![(1, 2), (1, 4)])
            .await
            .unwrap();

        assert_eq!(first, 3);
        assert_eq!(second, 1);
        assert_eq!(repo.get_watched_count(&user, 1399).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn batch_ignores_duplicates_within_input() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        let count = repo
            .mark_episodes_batch(&user, 10, vec![(2, 5), (2, 5), (2, 6)])
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(repo.mark_episodes_batch(&user, 10, vec![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn invalid_pair_rejects_whole_batch() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        let err = repo
            .mark_episodes_batch(&user, 10, vec![(1, 1), (0, 2)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert_eq!(repo.get_watched_count(&user, 10).await.unwrap(), 0);

        assert!(matches!(
            repo.mark_episode_watched(&user, 10, 1, -3).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            repo.mark_season_watched(&user, 10, 1, 0).await,
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn season_marking_expands_episode_range() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        repo.mark_episode_watched(&user, 5, 2, 3).await.unwrap();
        let count = repo.mark_season_watched(&user, 5, 2, 8).await.unwrap();
        assert_eq!(count, 7);

        let set = repo.get_watched_set(&user, 5).await.unwrap();
        assert_eq!(set.len(), 8);
        assert!((1..=8).all(|ep| set.contains(&(2, ep))));
        assert!(!set.contains(&(1, 1)));
    }

    #[tokio::test]
    async fn oversized_season_count_is_rejected() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        let err = repo
            .mark_season_watched(&user, 5, 1, 1_000_000_000_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(matches!(
            repo.mark_season_watched(&user, 5, 1, MAX_SEASON_EPISODES + 1).await,
            Err(AppError::InvalidArgument(_))
        ));
        assert_eq!(repo.get_watched_count(&user, 5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unmark_reports_whether_anything_was_removed() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        assert!(!repo.unmark_episode_watched(&user, 1399, 3, 4).await.unwrap());

        repo.mark_episode_watched(&user, 1399, 3, 4).await.unwrap();
        assert!(repo.unmark_episode_watched(&user, 1399, 3, 4).await.unwrap());
        assert_eq!(repo.get_watched_count(&user, 1399).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn watched_episodes_are_ordered_by_season_then_episode() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;

        repo.mark_episodes_batch(&user, 1, vec![(2, 1), (1, 10), (1, 2), (3, 1)])
            .await
            .unwrap();

        let order: Vec<(i64, i64)> = repo
            .get_watched_episodes(&user, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|ep| (ep.season, ep.episode))
            .collect();
        assert_eq!(order, vec![(1, 2), (1, 10), (2, 1), (3, 1)]);
    }

    #[tokio::test]
    async fn corrupt_watched_at_is_an_error() {
        let (repo, _dir) = test_repository().await;
        let user = seed_user(&repo).await;
        repo.mark_episode_watched(&user, 1, 1, 1).await.unwrap();

        repo.conn
            .call(|conn| {
                conn.execute("UPDATE episodes_watched SET watched_at = 'yesterday'", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let err = repo.get_watched_episodes(&user, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[tokio::test]
    async fn watch_state_is_scoped_per_user_and_show() {
        let (repo, _dir) = test_repository().await;
        let alice = seed_user(&repo).await;
        let bob = crate::db::test_support::seed_named_user(&repo, "google-bob").await;

        repo.mark_episode_watched(&alice, 1, 1, 1).await.unwrap();
        repo.mark_episode_watched(&bob, 1, 1, 1).await.unwrap();
        repo.mark_episode_watched(&alice, 2, 1, 1).await.unwrap();

        assert_eq!(repo.get_watched_count(&alice, 1).await.unwrap(), 1);
        assert_eq!(repo.get_watched_count(&bob, 1).await.unwrap(), 1);
        assert_eq!(repo.get_watched_count(&bob, 2).await.unwrap(), 0);
    }
}
