use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use bullpen_types::FollowEntry;

use crate::db::columns::{count_at, summary_at, time_at, to_db_time, USER_SUMMARY_COLUMNS};
use crate::db::{insert_unique, DbPool};
use crate::pagination::{Page, PageRequest};

pub struct FollowRepository {
    pool: DbPool,
}

impl FollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Check if user A is following user B
    pub fn is_following(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ? AND following_id = ?",
                (follower_id.to_string(), following_id.to_string()),
                |row| row.get(0),
            )
            .context("Failed to check follow")?;
        Ok(count > 0)
    }

    /// Follow a user. Returns false when the edge already exists.
    pub fn follow(&self, follower_id: &Uuid, following_id: &Uuid, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?, ?, ?)",
            (follower_id.to_string(), following_id.to_string(), to_db_time(&at)),
        ))
        .context("Failed to follow user")?;
        Ok(inserted)
    }

    /// Unfollow a user. Returns whether an edge was removed.
    pub fn unfollow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM follows WHERE follower_id = ? AND following_id = ?",
                (follower_id.to_string(), following_id.to_string()),
            )
            .context("Failed to unfollow user")?;
        Ok(rows > 0)
    }

    /// Get follower count
    pub fn follower_count(&self, user_id: &Uuid) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM follows WHERE following_id = ?",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count followers")?;
        Ok(count)
    }

    /// Get following count
    pub fn following_count(&self, user_id: &Uuid) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM follows WHERE follower_id = ?",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count following")?;
        Ok(count)
    }

    /// Users that follow this user, most recent first
    pub fn followers(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<FollowEntry>> {
        self.list_edges("following_id", "follower_id", user_id, page)
    }

    /// Users this user follows, most recent first
    pub fn following(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<FollowEntry>> {
        self.list_edges("follower_id", "following_id", user_id, page)
    }

    fn list_edges(
        &self,
        key_column: &str,
        other_column: &str,
        user_id: &Uuid,
        page: PageRequest,
    ) -> Result<Page<FollowEntry>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM follows WHERE {key_column} = ?"),
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count follow edges")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_SUMMARY_COLUMNS}, f.created_at
             FROM follows f
             JOIN users u ON u.id = f.{other_column}
             WHERE f.{key_column} = ?1
             ORDER BY f.created_at DESC, f.rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![user_id.to_string(), page.limit(), page.offset()], |row| {
                Ok(FollowEntry {
                    user: summary_at(row, 0)?,
                    since: time_at(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load follow edges")?;

        Ok(Page { items, total })
    }
}
