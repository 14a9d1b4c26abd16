use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use bullpen_types::{TickerKind, WatchlistEntry};

use crate::db::columns::{count_at, time_at, to_db_time};
use crate::db::{insert_unique, DbPool};
use crate::pagination::{Page, PageRequest};

pub struct WatchlistRepository {
    pool: DbPool,
}

impl WatchlistRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Returns false when the ticker is already on the user's watchlist
    pub fn add(&self, user_id: &Uuid, ticker_id: &Uuid, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO watchlist_items (id, user_id, ticker_id, created_at) VALUES (?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                ticker_id.to_string(),
                to_db_time(&at),
            ],
        ))
        .context("Failed to add watchlist item")?;
        Ok(inserted)
    }

    pub fn remove(&self, user_id: &Uuid, symbol: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "DELETE FROM watchlist_items
                 WHERE user_id = ? AND ticker_id IN (SELECT id FROM tickers WHERE symbol = ?)",
                params![user_id.to_string(), symbol],
            )
            .context("Failed to remove watchlist item")?;
        Ok(rows > 0)
    }

    /// Newest additions first
    pub fn list(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<WatchlistEntry>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM watchlist_items WHERE user_id = ?",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count watchlist")?;

        let mut stmt = conn.prepare(
            "SELECT t.symbol, t.name, t.type, w.created_at
             FROM watchlist_items w
             JOIN tickers t ON t.id = w.ticker_id
             WHERE w.user_id = ?1
             ORDER BY w.created_at DESC, w.rowid DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        let items = stmt
            .query_map(params![user_id.to_string(), page.limit(), page.offset()], |row| {
                let kind: String = row.get(2)?;
                Ok(WatchlistEntry {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                    kind: TickerKind::parse(&kind).unwrap_or_default(),
                    added_at: time_at(row, 3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load watchlist")?;

        Ok(Page { items, total })
    }
}
