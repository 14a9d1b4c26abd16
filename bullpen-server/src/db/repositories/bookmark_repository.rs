use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::db::columns::to_db_time;
use crate::db::{insert_unique, DbPool};

pub struct BookmarkRepository {
    pool: DbPool,
}

impl BookmarkRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns false when the post is already bookmarked
    pub fn add(&self, user_id: &Uuid, post_id: &Uuid, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO bookmarks (id, user_id, post_id, created_at) VALUES (?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                post_id.to_string(),
                to_db_time(&at),
            ],
        ))
        .context("Failed to add bookmark")?;
        Ok(inserted)
    }

    pub fn remove(&self, user_id: &Uuid, post_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM bookmarks WHERE user_id = ? AND post_id = ?",
                params![user_id.to_string(), post_id.to_string()],
            )
            .context("Failed to remove bookmark")?;
        Ok(rows > 0)
    }
}
