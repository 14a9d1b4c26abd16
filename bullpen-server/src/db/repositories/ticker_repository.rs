use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::{Ticker, TickerInfo, TickerKind, TickerSummary, TrendingTicker};

use crate::db::columns::{count_at, opt_time_at, to_db_time, uuid_at};
use crate::db::repositories::user_repository::like_pattern;
use crate::db::{placeholders, DbPool};
use crate::pagination::{Page, PageRequest};
use crate::ticker::detect_kind;

fn kind_at(row: &Row, idx: usize) -> rusqlite::Result<TickerKind> {
    let raw: String = row.get(idx)?;
    Ok(TickerKind::parse(&raw).unwrap_or_default())
}

pub struct TickerRepository {
    pool: DbPool,
}

impl TickerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the id of a ticker, creating the row on first mention
    pub fn ensure(conn: &Connection, symbol: &str, at: DateTime<Utc>) -> Result<Uuid> {
        conn.execute(
            "INSERT OR IGNORE INTO tickers (id, symbol, type, created_at) VALUES (?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                symbol,
                detect_kind(symbol).as_str(),
                to_db_time(&at),
            ],
        )
        .context("Failed to create ticker")?;

        let id = conn
            .query_row("SELECT id FROM tickers WHERE symbol = ?", [symbol], |row| uuid_at(row, 0))
            .context("Failed to load ticker id")?;
        Ok(id)
    }

    /// Link a post to each of its symbols (creates tickers if needed)
    pub fn link_post(conn: &Connection, post_id: &Uuid, symbols: &[String], at: DateTime<Utc>) -> Result<()> {
        for symbol in symbols {
            let ticker_id = Self::ensure(conn, symbol, at)?;
            conn.execute(
                "INSERT OR IGNORE INTO post_tickers (post_id, ticker_id, created_at) VALUES (?, ?, ?)",
                params![post_id.to_string(), ticker_id.to_string(), to_db_time(&at)],
            )
            .context("Failed to link post to ticker")?;
        }
        Ok(())
    }

    pub fn get_or_create(&self, symbol: &str) -> Result<Ticker> {
        let conn = self.pool.get()?;
        let id = Self::ensure(&conn, symbol, Utc::now())?;
        let ticker = conn
            .query_row(
                "SELECT id, symbol, name, type FROM tickers WHERE id = ?",
                [id.to_string()],
                |row| {
                    Ok(Ticker {
                        id: uuid_at(row, 0)?,
                        symbol: row.get(1)?,
                        name: row.get(2)?,
                        kind: kind_at(row, 3)?,
                    })
                },
            )
            .context("Failed to load ticker")?;
        Ok(ticker)
    }

    pub fn get_by_symbol(&self, symbol: &str) -> Result<Option<Ticker>> {
        let conn = self.pool.get()?;
        let ticker = conn
            .query_row(
                "SELECT id, symbol, name, type FROM tickers WHERE symbol = ?",
                [symbol],
                |row| {
                    Ok(Ticker {
                        id: uuid_at(row, 0)?,
                        symbol: row.get(1)?,
                        name: row.get(2)?,
                        kind: kind_at(row, 3)?,
                    })
                },
            )
            .optional()
            .context("Failed to load ticker")?;
        Ok(ticker)
    }

    /// Tickers mentioned by each post, in the order they were linked
    pub fn for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<TickerInfo>>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT pt.post_id, t.symbol, t.name
             FROM post_tickers pt
             JOIN tickers t ON t.id = pt.ticker_id
             WHERE pt.post_id IN ({})
             ORDER BY pt.rowid",
            placeholders(post_ids.len())
        ))?;
        let rows = stmt
            .query_map(params_from_iter(post_ids.iter().map(|id| id.to_string())), |row| {
                Ok((
                    uuid_at(row, 0)?,
                    TickerInfo {
                        symbol: row.get(1)?,
                        name: row.get(2)?,
                    },
                ))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load post tickers")?;

        let mut by_post: HashMap<Uuid, Vec<TickerInfo>> = HashMap::new();
        for (post_id, info) in rows {
            by_post.entry(post_id).or_default().push(info);
        }
        Ok(by_post)
    }

    /// Substring search over symbol and name, ordered by symbol
    pub fn search(&self, query: &str, page: PageRequest) -> Result<Page<TickerSummary>> {
        let conn = self.pool.get()?;
        let pattern = like_pattern(query);

        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM tickers
                 WHERE lower(symbol) LIKE ?1 ESCAPE '\\' OR lower(coalesce(name, '')) LIKE ?1 ESCAPE '\\'",
                [&pattern],
                |row| count_at(row, 0),
            )
            .context("Failed to count ticker search results")?;

        let mut stmt = conn.prepare(
            "SELECT symbol, name, type FROM tickers
             WHERE lower(symbol) LIKE ?1 ESCAPE '\\' OR lower(coalesce(name, '')) LIKE ?1 ESCAPE '\\'
             ORDER BY symbol ASC
             LIMIT ?2 OFFSET ?3",
        )?;
        let items = stmt
            .query_map(params![pattern, page.limit(), page.offset()], |row| {
                Ok(TickerSummary {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                    kind: kind_at(row, 2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to search tickers")?;

        Ok(Page { items, total })
    }

    /// Tickers with at least one mention on a live post, ranked by mentions
    /// since `since`, then by all-time mentions, then by symbol
    pub fn trending(&self, since: DateTime<Utc>, limit: u32) -> Result<Vec<TrendingTicker>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT t.symbol, t.name,
                    COUNT(*) AS mention_count,
                    SUM(CASE WHEN p.created_at >= ?1 THEN 1 ELSE 0 END) AS mentions_recent,
                    MAX(p.created_at) AS last_mentioned_at
             FROM tickers t
             JOIN post_tickers pt ON pt.ticker_id = t.id
             JOIN posts p ON p.id = pt.post_id
             WHERE p.deleted_at IS NULL
             GROUP BY t.id
             ORDER BY mentions_recent DESC, mention_count DESC, t.symbol ASC
             LIMIT ?2",
        )?;
        let tickers = stmt
            .query_map(params![to_db_time(&since), limit], |row| {
                Ok(TrendingTicker {
                    symbol: row.get(0)?,
                    name: row.get(1)?,
                    mention_count: count_at(row, 2)?,
                    mentions_24h: count_at(row, 3)?,
                    last_mentioned_at: opt_time_at(row, 4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load trending tickers")?;
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::db::Database;
    use chrono::Duration;

    fn setup_test_db() -> (Database, TickerRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        let repo = TickerRepository::new(db.pool.clone());
        (db, repo)
    }

    fn link(db: &Database, post_id: Uuid, symbols: &[&str]) {
        let symbols: Vec<String> = symbols.iter().map(|s| s.to_string()).collect();
        let conn = db.connection().unwrap();
        TickerRepository::link_post(&conn, &post_id, &symbols, Utc::now()).unwrap();
    }

    #[test]
    fn test_link_post_creates_tickers_once() {
        let (db, repo) = setup_test_db();
        let alice = insert_user(&db, "alice");
        let p1 = insert_post(&db, alice, "$AAPL $BTC");
        let p2 = insert_post(&db, alice, "$AAPL");
        link(&db, p1, &["AAPL", "BTC"]);
        link(&db, p2, &["AAPL"]);

        let aapl = repo.get_by_symbol("AAPL").unwrap().expect("ticker created");
        assert_eq!(aapl.kind, TickerKind::Other);
        assert_eq!(repo.get_by_symbol("BTC").unwrap().unwrap().kind, TickerKind::Crypto);
        assert_eq!(repo.get_or_create("AAPL").unwrap().id, aapl.id);

        let by_post = repo.for_posts(&[p1, p2]).unwrap();
        let symbols: Vec<_> = by_post[&p1].iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "BTC"]);
        assert_eq!(by_post[&p2].len(), 1);
    }

    #[test]
    fn test_search_tickers() {
        let (db, repo) = setup_test_db();
        let conn = db.connection().unwrap();
        for symbol in ["TSLA", "AAPL", "TSM"] {
            TickerRepository::ensure(&conn, symbol, Utc::now()).unwrap();
        }
        drop(conn);

        let page = repo.search("ts", PageRequest::default()).unwrap();
        assert_eq!(page.total, 2);
        let symbols: Vec<_> = page.items.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSLA", "TSM"]);
    }

    #[test]
    fn test_trending_ranks_recent_mentions_first() {
        let (db, repo) = setup_test_db();
        let alice = insert_user(&db, "alice");
        let now = Utc::now();
        let old = now - Duration::days(3);

        for _ in 0..3 {
            let p = insert_post_at(&db, alice, "$OLD", old);
            link(&db, p, &["OLD"]);
        }
        let fresh = insert_post_at(&db, alice, "$NEW", now - Duration::hours(1));
        link(&db, fresh, &["NEW"]);
        let deleted = insert_post_at(&db, alice, "$GONE", now);
        link(&db, deleted, &["GONE"]);
        soft_delete_post(&db, deleted);

        let trending = repo.trending(now - Duration::hours(24), 10).unwrap();
        let symbols: Vec<_> = trending.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NEW", "OLD"]);
        assert_eq!(trending[0].mentions_24h, 1);
        assert_eq!(trending[1].mention_count, 3);
        assert_eq!(trending[1].mentions_24h, 0);
    }
}
