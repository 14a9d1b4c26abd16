use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use bullpen_types::{RecentSearch, RecentSearchKind};

use crate::db::columns::{time_at, to_db_time, uuid_at};
use crate::db::DbPool;

const RECENT_SEARCH_COLUMNS: &str =
    "id, search_type, result_id, query, result_display_name, result_image_url, created_at";

fn map_recent_search(row: &Row) -> rusqlite::Result<RecentSearch> {
    let kind: String = row.get(1)?;
    Ok(RecentSearch {
        id: uuid_at(row, 0)?,
        kind: RecentSearchKind::parse(&kind).unwrap_or_default(),
        result_id: row.get(2)?,
        query: row.get(3)?,
        result_display_name: row.get(4)?,
        result_image_url: row.get(5)?,
        created_at: time_at(row, 6)?,
    })
}

pub struct RecentSearchRepository {
    pool: DbPool,
}

impl RecentSearchRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert an entry, replacing any earlier entry for the same result
    pub fn record(conn: &Connection, user_id: &Uuid, entry: &RecentSearch) -> Result<()> {
        conn.execute(
            "DELETE FROM recent_searches WHERE user_id = ? AND search_type = ? AND result_id = ?",
            params![user_id.to_string(), entry.kind.as_str(), entry.result_id],
        )
        .context("Failed to replace recent search")?;
        conn.execute(
            "INSERT INTO recent_searches
                 (id, user_id, search_type, result_id, query, result_display_name, result_image_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                entry.id.to_string(),
                user_id.to_string(),
                entry.kind.as_str(),
                entry.result_id,
                entry.query,
                entry.result_display_name,
                entry.result_image_url,
                to_db_time(&entry.created_at),
            ],
        )
        .context("Failed to record recent search")?;
        Ok(())
    }

    /// Drop everything but the `keep` newest entries. Returns the number removed.
    pub fn trim(conn: &Connection, user_id: &Uuid, keep: u32) -> Result<usize> {
        let removed = conn
            .execute(
                "DELETE FROM recent_searches
                 WHERE user_id = ?1 AND id NOT IN (
                     SELECT id FROM recent_searches WHERE user_id = ?1
                     ORDER BY created_at DESC, rowid DESC LIMIT ?2
                 )",
                params![user_id.to_string(), keep],
            )
            .context("Failed to trim recent searches")?;
        Ok(removed)
    }

    /// Newest first
    pub fn list(&self, user_id: &Uuid, limit: u32) -> Result<Vec<RecentSearch>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECENT_SEARCH_COLUMNS} FROM recent_searches
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2"
        ))?;
        let entries = stmt
            .query_map(params![user_id.to_string(), limit], map_recent_search)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load recent searches")?;
        Ok(entries)
    }

    pub fn remove(&self, user_id: &Uuid, search_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM recent_searches WHERE id = ? AND user_id = ?",
                params![search_id.to_string(), user_id.to_string()],
            )
            .context("Failed to remove recent search")?;
        Ok(rows > 0)
    }

    pub fn clear(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute("DELETE FROM recent_searches WHERE user_id = ?", [user_id.to_string()])
            .context("Failed to clear recent searches")?;
        Ok(rows)
    }
}
