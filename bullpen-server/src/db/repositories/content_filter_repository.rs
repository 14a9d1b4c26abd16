use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use bullpen_types::{FilterType, FilteredUser};

use crate::db::columns::{summary_at, time_at, to_db_time, uuid_at, USER_SUMMARY_COLUMNS};
use crate::db::{insert_unique, DbPool};

pub struct ContentFilterRepository {
    pool: DbPool,
}

impl ContentFilterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Add a mute or block. Returns false when the same filter already exists.
    pub fn add(
        &self,
        user_id: &Uuid,
        filtered_user_id: &Uuid,
        filter_type: FilterType,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO content_filters (id, user_id, filtered_user_id, filter_type, created_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                filtered_user_id.to_string(),
                filter_type.as_str(),
                to_db_time(&at),
            ],
        ))
        .context("Failed to add content filter")?;
        Ok(inserted)
    }

    pub fn remove(&self, user_id: &Uuid, filtered_user_id: &Uuid, filter_type: FilterType) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM content_filters WHERE user_id = ? AND filtered_user_id = ? AND filter_type = ?",
                params![user_id.to_string(), filtered_user_id.to_string(), filter_type.as_str()],
            )
            .context("Failed to remove content filter")?;
        Ok(rows > 0)
    }

    pub fn has(&self, user_id: &Uuid, filtered_user_id: &Uuid, filter_type: FilterType) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM content_filters WHERE user_id = ? AND filtered_user_id = ? AND filter_type = ?",
                params![user_id.to_string(), filtered_user_id.to_string(), filter_type.as_str()],
                |row| row.get(0),
            )
            .context("Failed to check content filter")?;
        Ok(count > 0)
    }

    /// Every user this viewer muted or blocked
    pub fn filtered_ids(&self, user_id: &Uuid) -> Result<HashSet<Uuid>> {
        let conn = self.pool.get()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT filtered_user_id FROM content_filters WHERE user_id = ?")?;
        let ids = stmt
            .query_map([user_id.to_string()], |row| uuid_at(row, 0))?
            .collect::<Result<HashSet<_>, _>>()
            .context("Failed to load content filters")?;
        Ok(ids)
    }

    /// Filtered users of one type, most recent first
    pub fn list(&self, user_id: &Uuid, filter_type: FilterType) -> Result<Vec<FilteredUser>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_SUMMARY_COLUMNS}, cf.created_at
             FROM content_filters cf
             JOIN users u ON u.id = cf.filtered_user_id
             WHERE cf.user_id = ? AND cf.filter_type = ?
             ORDER BY cf.created_at DESC, cf.rowid DESC"
        ))?;
        let users = stmt
            .query_map(params![user_id.to_string(), filter_type.as_str()], |row| {
                Ok(FilteredUser {
                    user: summary_at(row, 0)?,
                    filtered_at: time_at(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list content filters")?;
        Ok(users)
    }
}
