use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::{Post, PostSnapshot, RepostType, UserSummary};

use crate::db::columns::{
    count_at, json_list_at, opt_time_at, opt_uuid_at, summary_at, time_at, to_db_json, to_db_time,
    uuid_at,
};
use crate::db::{placeholders, DbPool};
use crate::pagination::{Page, PageRequest};

/// Post columns (alias `p`) followed by author summary columns (alias `u`)
const RECORD_COLUMNS: &str = "p.id, p.author_id, p.content, p.media_urls, p.gif_url, \
     p.original_post_id, p.repost_type, p.created_at, p.deleted_at, \
     u.id, u.username, u.display_name, u.profile_picture_url, u.badge";

const AUTHOR_OFFSET: usize = 9;

/// Owned posts plus normal reposts of other people's posts, keyed by the
/// instant each entry landed on the profile. `?1` is the profile user.
///
/// A quote repost only shows up on its own author's profile, and never when
/// it quotes one of that author's posts (deleted ones included).
const PROFILE_TIMELINE_CTE: &str = "
    WITH timeline AS (
        SELECT p.id AS post_id, p.created_at AS effective_at, NULL AS reposted_at, 0 AS kind, p.rowid AS seq
        FROM posts p
        WHERE p.author_id = ?1
          AND p.deleted_at IS NULL
          AND (p.repost_type IS NOT 'quote'
               OR p.original_post_id IS NULL
               OR p.original_post_id NOT IN (SELECT own.id FROM posts own WHERE own.author_id = ?1))
        UNION ALL
        SELECT r.post_id, r.created_at, r.created_at, 1, r.rowid
        FROM reposts r
        JOIN posts p ON p.id = r.post_id
        WHERE r.user_id = ?1
          AND r.repost_type = 'normal'
          AND p.deleted_at IS NULL
          AND p.author_id <> ?1
          AND p.repost_type IS NOT 'quote'
    )";

fn repost_type_at(row: &Row, idx: usize) -> rusqlite::Result<Option<RepostType>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        RepostType::parse(&s).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                Type::Text,
                format!("unknown repost type {s:?}").into(),
            )
        })
    })
    .transpose()
}

fn map_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: uuid_at(row, 0)?,
        author_id: uuid_at(row, 1)?,
        content: row.get(2)?,
        media_urls: json_list_at(row, 3)?,
        gif_url: row.get(4)?,
        original_post_id: opt_uuid_at(row, 5)?,
        repost_type: repost_type_at(row, 6)?,
        created_at: time_at(row, 7)?,
        deleted_at: opt_time_at(row, 8)?,
    })
}

fn map_record(row: &Row) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        post: map_post(row)?,
        author: summary_at(row, AUTHOR_OFFSET)?,
    })
}

/// A post joined with its author
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub author: UserSummary,
}

impl PostRecord {
    pub fn snapshot(&self) -> PostSnapshot {
        PostSnapshot {
            id: self.post.id,
            author: self.author.clone(),
            content: self.post.content.clone(),
            media_urls: self.post.media_urls.clone(),
            gif_url: self.post.gif_url.clone(),
            created_at: self.post.created_at,
        }
    }
}

/// One row of a profile timeline. `reposted_at` is set when the profile user
/// normally reposted someone else's post.
#[derive(Debug, Clone)]
pub struct TimelineEntry {
    pub record: PostRecord,
    pub reposted_at: Option<DateTime<Utc>>,
}

pub struct PostRepository {
    pool: DbPool,
}

impl PostRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a post on an existing connection or transaction
    pub fn insert(conn: &Connection, post: &Post) -> Result<()> {
        conn.execute(
            "INSERT INTO posts (id, author_id, content, media_urls, gif_url, original_post_id, repost_type, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                post.id.to_string(),
                post.author_id.to_string(),
                post.content,
                to_db_json(&post.media_urls),
                post.gif_url,
                post.original_post_id.map(|id| id.to_string()),
                post.repost_type.map(|t| t.as_str()),
                to_db_time(&post.created_at),
            ],
        )
        .context("Failed to create post")?;
        Ok(())
    }

    /// Get a post by id, soft-deleted or not
    pub fn get(&self, post_id: &Uuid) -> Result<Option<Post>> {
        let conn = self.pool.get()?;
        let post = conn
            .query_row(
                "SELECT p.id, p.author_id, p.content, p.media_urls, p.gif_url,
                        p.original_post_id, p.repost_type, p.created_at, p.deleted_at
                 FROM posts p WHERE p.id = ?",
                [post_id.to_string()],
                map_post,
            )
            .optional()
            .context("Failed to load post")?;
        Ok(post)
    }

    /// Get a non-deleted post together with its author
    pub fn get_visible(&self, post_id: &Uuid) -> Result<Option<PostRecord>> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {RECORD_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
                     WHERE p.id = ? AND p.deleted_at IS NULL"
                ),
                [post_id.to_string()],
                map_record,
            )
            .optional()
            .context("Failed to load post")?;
        Ok(record)
    }

    /// Soft delete a post. Returns false when it was already deleted or missing.
    pub fn soft_delete(conn: &Connection, post_id: &Uuid, at: DateTime<Utc>) -> Result<bool> {
        let rows = conn
            .execute(
                "UPDATE posts SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL",
                params![to_db_time(&at), post_id.to_string()],
            )
            .context("Failed to delete post")?;
        Ok(rows > 0)
    }

    /// Soft delete the live quote posts `author_id` made of `original_id`
    pub fn soft_delete_quotes(
        conn: &Connection,
        author_id: &Uuid,
        original_id: &Uuid,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        let rows = conn
            .execute(
                "UPDATE posts SET deleted_at = ?
                 WHERE author_id = ? AND original_post_id = ? AND repost_type = 'quote'
                   AND deleted_at IS NULL",
                params![to_db_time(&at), author_id.to_string(), original_id.to_string()],
            )
            .context("Failed to delete quote post")?;
        Ok(rows)
    }

    /// Count and fetch one window of post records.
    ///
    /// `from_where` starts at `FROM` and must join `posts p` and `users u`.
    fn fetch_records(
        &self,
        from_where: &str,
        order_by: &str,
        args: Vec<Value>,
        page: PageRequest,
    ) -> Result<Page<PostRecord>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                &format!("SELECT COUNT(*) {from_where}"),
                params_from_iter(args.iter()),
                |row| count_at(row, 0),
            )
            .context("Failed to count posts")?;

        let mut paged = args;
        paged.push(Value::Integer(page.limit()));
        paged.push(Value::Integer(page.offset()));

        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} {from_where} ORDER BY {order_by} LIMIT ? OFFSET ?"
        ))?;
        let items = stmt
            .query_map(params_from_iter(paged.iter()), map_record)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load posts")?;

        Ok(Page { items, total })
    }

    /// Non-deleted posts from everyone outside `excluded`, newest first
    pub fn home_feed(&self, excluded: &[Uuid], page: PageRequest) -> Result<Page<PostRecord>> {
        let mut args: Vec<Value> = Vec::new();
        let mut from_where = String::from(
            "FROM posts p JOIN users u ON u.id = p.author_id WHERE p.deleted_at IS NULL",
        );
        if !excluded.is_empty() {
            from_where.push_str(&format!(
                " AND p.author_id NOT IN ({})",
                placeholders(excluded.len())
            ));
            args.extend(excluded.iter().map(|id| Value::Text(id.to_string())));
        }
        self.fetch_records(&from_where, "p.created_at DESC, p.rowid DESC", args, page)
    }

    /// Posts linked to a ticker symbol, newest first
    pub fn ticker_timeline(
        &self,
        symbol: &str,
        excluded: &[Uuid],
        page: PageRequest,
    ) -> Result<Page<PostRecord>> {
        let mut args = vec![Value::Text(symbol.to_string())];
        let mut from_where = String::from(
            "FROM post_tickers pt
             JOIN tickers t ON t.id = pt.ticker_id
             JOIN posts p ON p.id = pt.post_id
             JOIN users u ON u.id = p.author_id
             WHERE t.symbol = ? AND p.deleted_at IS NULL",
        );
        if !excluded.is_empty() {
            from_where.push_str(&format!(
                " AND p.author_id NOT IN ({})",
                placeholders(excluded.len())
            ));
            args.extend(excluded.iter().map(|id| Value::Text(id.to_string())));
        }
        self.fetch_records(&from_where, "p.created_at DESC, p.rowid DESC", args, page)
    }

    /// Visible posts the user liked, most recent like first
    pub fn liked_by(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<PostRecord>> {
        self.fetch_records(
            "FROM reactions r
             JOIN posts p ON p.id = r.post_id
             JOIN users u ON u.id = p.author_id
             WHERE r.user_id = ? AND r.post_id IS NOT NULL AND p.deleted_at IS NULL",
            "r.created_at DESC, r.rowid DESC",
            vec![Value::Text(user_id.to_string())],
            page,
        )
    }

    /// Visible posts the user bookmarked, most recent bookmark first
    pub fn bookmarked_by(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<PostRecord>> {
        self.fetch_records(
            "FROM bookmarks b
             JOIN posts p ON p.id = b.post_id
             JOIN users u ON u.id = p.author_id
             WHERE b.user_id = ? AND p.deleted_at IS NULL",
            "b.created_at DESC, b.rowid DESC",
            vec![Value::Text(user_id.to_string())],
            page,
        )
    }

    /// Profile timeline: owned posts merged with normal reposts by effective time
    pub fn profile_timeline(
        &self,
        user_id: &Uuid,
        page: PageRequest,
    ) -> Result<Page<TimelineEntry>> {
        let conn = self.pool.get()?;
        let target = user_id.to_string();

        let total = conn
            .query_row(
                &format!(
                    "{PROFILE_TIMELINE_CTE}
                     SELECT COUNT(*) FROM timeline t
                     JOIN posts p ON p.id = t.post_id
                     JOIN users u ON u.id = p.author_id"
                ),
                [&target],
                |row| count_at(row, 0),
            )
            .context("Failed to count profile timeline")?;

        let mut stmt = conn.prepare(&format!(
            "{PROFILE_TIMELINE_CTE}
             SELECT {RECORD_COLUMNS}, t.reposted_at FROM timeline t
             JOIN posts p ON p.id = t.post_id
             JOIN users u ON u.id = p.author_id
             ORDER BY t.effective_at DESC, t.kind DESC, t.seq DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![target, page.limit(), page.offset()], |row| {
                Ok(TimelineEntry {
                    record: map_record(row)?,
                    reposted_at: opt_time_at(row, AUTHOR_OFFSET + 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load profile timeline")?;

        Ok(Page { items, total })
    }

    /// Fresh snapshots of visible posts, keyed by id. Deleted or missing ids are absent.
    pub fn snapshots(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, PostSnapshot>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM posts p JOIN users u ON u.id = p.author_id
             WHERE p.id IN ({}) AND p.deleted_at IS NULL",
            placeholders(post_ids.len())
        ))?;
        let snapshots = stmt
            .query_map(params_from_iter(post_ids.iter().map(|id| id.to_string())), map_record)?
            .map(|record| record.map(|r| (r.post.id, r.snapshot())))
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to load post snapshots")?;
        Ok(snapshots)
    }
}
