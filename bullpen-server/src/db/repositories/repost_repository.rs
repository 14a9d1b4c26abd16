use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::{Repost, RepostType};

use crate::db::columns::{time_at, to_db_time, uuid_at};
use crate::db::{insert_unique, DbPool};

fn map_repost(row: &Row) -> rusqlite::Result<Repost> {
    let kind: String = row.get(3)?;
    Ok(Repost {
        id: uuid_at(row, 0)?,
        user_id: uuid_at(row, 1)?,
        post_id: uuid_at(row, 2)?,
        repost_type: RepostType::parse(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("unknown repost type {kind:?}").into(),
            )
        })?,
        quote_content: row.get(4)?,
        created_at: time_at(row, 5)?,
    })
}

pub struct RepostRepository {
    pool: DbPool,
}

impl RepostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a repost row. Returns false when the user already reposted the post.
    pub fn insert(conn: &Connection, repost: &Repost) -> Result<bool> {
        let inserted = insert_unique(conn.execute(
            "INSERT INTO reposts (id, user_id, post_id, repost_type, quote_content, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                repost.id.to_string(),
                repost.user_id.to_string(),
                repost.post_id.to_string(),
                repost.repost_type.as_str(),
                repost.quote_content,
                to_db_time(&repost.created_at),
            ],
        ))
        .context("Failed to create repost")?;
        Ok(inserted)
    }

    pub fn find(&self, user_id: &Uuid, post_id: &Uuid) -> Result<Option<Repost>> {
        let conn = self.pool.get()?;
        let repost = conn
            .query_row(
                "SELECT id, user_id, post_id, repost_type, quote_content, created_at
                 FROM reposts WHERE user_id = ? AND post_id = ?",
                params![user_id.to_string(), post_id.to_string()],
                map_repost,
            )
            .optional()
            .context("Failed to load repost")?;
        Ok(repost)
    }

    pub fn delete(conn: &Connection, repost_id: &Uuid) -> Result<bool> {
        let rows = conn
            .execute("DELETE FROM reposts WHERE id = ?", [repost_id.to_string()])
            .context("Failed to delete repost")?;
        Ok(rows > 0)
    }
}
