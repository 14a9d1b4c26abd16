use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::{Comment, PostSnapshot, UserSummary};

use crate::db::columns::{
    count_at, json_list_at, opt_time_at, summary_at, time_at, to_db_json, to_db_time, uuid_at,
    USER_SUMMARY_COLUMNS,
};
use crate::db::DbPool;
use crate::pagination::{Page, PageRequest};

const COMMENT_COLUMNS: &str = "c.id, c.post_id, c.author_id, c.content, c.media_urls, c.gif_url, \
     c.created_at, c.updated_at, c.deleted_at";

fn map_comment(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_at(row, 0)?,
        post_id: uuid_at(row, 1)?,
        author_id: uuid_at(row, 2)?,
        content: row.get(3)?,
        media_urls: json_list_at(row, 4)?,
        gif_url: row.get(5)?,
        created_at: time_at(row, 6)?,
        updated_at: time_at(row, 7)?,
        deleted_at: opt_time_at(row, 8)?,
    })
}

/// A comment joined with its author
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author: UserSummary,
}

/// A comment joined with the post it replies to
#[derive(Debug, Clone)]
pub struct ReplyRecord {
    pub comment: Comment,
    pub parent: PostSnapshot,
}

pub struct CommentRepository {
    pool: DbPool,
}

impl CommentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(conn: &Connection, comment: &Comment) -> Result<()> {
        conn.execute(
            "INSERT INTO comments (id, post_id, author_id, content, media_urls, gif_url, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                comment.id.to_string(),
                comment.post_id.to_string(),
                comment.author_id.to_string(),
                comment.content,
                to_db_json(&comment.media_urls),
                comment.gif_url,
                to_db_time(&comment.created_at),
                to_db_time(&comment.updated_at),
            ],
        )
        .context("Failed to create comment")?;
        Ok(())
    }

    /// Get a comment by id, soft-deleted or not
    pub fn get(&self, comment_id: &Uuid) -> Result<Option<Comment>> {
        let conn = self.pool.get()?;
        let comment = conn
            .query_row(
                &format!("SELECT {COMMENT_COLUMNS} FROM comments c WHERE c.id = ?"),
                [comment_id.to_string()],
                map_comment,
            )
            .optional()
            .context("Failed to load comment")?;
        Ok(comment)
    }

    /// A live comment on a live post, with its author
    pub fn get_visible(&self, comment_id: &Uuid) -> Result<Option<CommentRecord>> {
        let conn = self.pool.get()?;
        let record = conn
            .query_row(
                &format!(
                    "SELECT {COMMENT_COLUMNS}, {USER_SUMMARY_COLUMNS}
                     FROM comments c
                     JOIN posts p ON p.id = c.post_id
                     JOIN users u ON u.id = c.author_id
                     WHERE c.id = ? AND c.deleted_at IS NULL AND p.deleted_at IS NULL"
                ),
                [comment_id.to_string()],
                |row| {
                    Ok(CommentRecord {
                        comment: map_comment(row)?,
                        author: summary_at(row, 9)?,
                    })
                },
            )
            .optional()
            .context("Failed to load comment")?;
        Ok(record)
    }

    pub fn soft_delete(&self, comment_id: &Uuid, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let stamp = to_db_time(&at);
        let rows = conn
            .execute(
                "UPDATE comments SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
                params![stamp, stamp, comment_id.to_string()],
            )
            .context("Failed to delete comment")?;
        Ok(rows > 0)
    }

    /// Live comments on a post, newest first
    pub fn list_for_post(&self, post_id: &Uuid, page: PageRequest) -> Result<Page<CommentRecord>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM comments c WHERE c.post_id = ? AND c.deleted_at IS NULL",
                [post_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count comments")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS}, {USER_SUMMARY_COLUMNS}
             FROM comments c
             JOIN users u ON u.id = c.author_id
             WHERE c.post_id = ?1 AND c.deleted_at IS NULL
             ORDER BY c.created_at DESC, c.rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![post_id.to_string(), page.limit(), page.offset()], |row| {
                Ok(CommentRecord {
                    comment: map_comment(row)?,
                    author: summary_at(row, 9)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load comments")?;

        Ok(Page { items, total })
    }

    /// A user's live comments on live posts, newest first, with the parent post
    pub fn replies_by_user(&self, user_id: &Uuid, page: PageRequest) -> Result<Page<ReplyRecord>> {
        let conn = self.pool.get()?;
        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM comments c
                 JOIN posts p ON p.id = c.post_id
                 WHERE c.author_id = ? AND c.deleted_at IS NULL AND p.deleted_at IS NULL",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count replies")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COMMENT_COLUMNS},
                    p.id, p.content, p.media_urls, p.gif_url, p.created_at,
                    {USER_SUMMARY_COLUMNS}
             FROM comments c
             JOIN posts p ON p.id = c.post_id
             JOIN users u ON u.id = p.author_id
             WHERE c.author_id = ?1 AND c.deleted_at IS NULL AND p.deleted_at IS NULL
             ORDER BY c.created_at DESC, c.rowid DESC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![user_id.to_string(), page.limit(), page.offset()], |row| {
                Ok(ReplyRecord {
                    comment: map_comment(row)?,
                    parent: PostSnapshot {
                        id: uuid_at(row, 9)?,
                        content: row.get(10)?,
                        media_urls: json_list_at(row, 11)?,
                        gif_url: row.get(12)?,
                        created_at: time_at(row, 13)?,
                        author: summary_at(row, 14)?,
                    },
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load replies")?;

        Ok(Page { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::db::Database;

    fn setup_test_db() -> (Database, CommentRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        let repo = CommentRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_list_for_post_hides_deleted() {
        let (db, repo) = setup_test_db();
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");
        let first = insert_comment(&db, post, bob, "first");
        let second = insert_comment(&db, post, alice, "second");
        let gone = insert_comment(&db, post, bob, "gone");
        assert!(repo.soft_delete(&gone, Utc::now()).unwrap());
        assert!(!repo.soft_delete(&gone, Utc::now()).unwrap());

        let page = repo.list_for_post(&post, PageRequest::default()).unwrap();
        assert_eq!(page.total, 2);
        let ids: Vec<_> = page.items.iter().map(|c| c.comment.id).collect();
        assert_eq!(ids, vec![second, first]);
        assert_eq!(page.items[1].author.username, "bob");
    }

    #[test]
    fn test_replies_skip_deleted_parents() {
        let (db, repo) = setup_test_db();
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let live = insert_post(&db, alice, "live");
        let dead = insert_post(&db, alice, "dead");
        let reply = insert_comment(&db, live, bob, "nice");
        insert_comment(&db, dead, bob, "orphaned");
        soft_delete_post(&db, dead);

        let page = repo.replies_by_user(&bob, PageRequest::default()).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].comment.id, reply);
        assert_eq!(page.items[0].parent.id, live);
        assert_eq!(page.items[0].parent.author.username, "alice");
    }

    #[test]
    fn test_get_visible_requires_live_post() {
        let (db, repo) = setup_test_db();
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "gm");
        let comment = insert_comment(&db, post, alice, "self reply");
        assert!(repo.get_visible(&comment).unwrap().is_some());

        soft_delete_post(&db, post);
        assert!(repo.get_visible(&comment).unwrap().is_none());
        assert!(repo.get(&comment).unwrap().is_some());
    }
}
