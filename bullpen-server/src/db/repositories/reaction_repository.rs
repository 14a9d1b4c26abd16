use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use crate::db::columns::{count_at, to_db_time};
use crate::db::{insert_unique, DbPool};

/// What a reaction is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl ReactionTarget {
    fn column(&self) -> &'static str {
        match self {
            ReactionTarget::Post(_) => "post_id",
            ReactionTarget::Comment(_) => "comment_id",
        }
    }

    fn id(&self) -> String {
        match self {
            ReactionTarget::Post(id) | ReactionTarget::Comment(id) => id.to_string(),
        }
    }
}

pub struct ReactionRepository {
    pool: DbPool,
}

impl ReactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Add a like. Returns false when the user already reacted to the target.
    pub fn add(&self, user_id: &Uuid, target: ReactionTarget, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.pool.get()?;
        let (post_id, comment_id) = match target {
            ReactionTarget::Post(id) => (Some(id.to_string()), None),
            ReactionTarget::Comment(id) => (None, Some(id.to_string())),
        };
        let inserted = insert_unique(conn.execute(
            "INSERT INTO reactions (id, user_id, post_id, comment_id, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                user_id.to_string(),
                post_id,
                comment_id,
                to_db_time(&at),
            ],
        ))
        .context("Failed to add reaction")?;
        Ok(inserted)
    }

    /// Remove a like. Returns whether a row was deleted.
    pub fn remove(&self, user_id: &Uuid, target: ReactionTarget) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                &format!("DELETE FROM reactions WHERE user_id = ? AND {} = ?", target.column()),
                params![user_id.to_string(), target.id()],
            )
            .context("Failed to remove reaction")?;
        Ok(rows > 0)
    }

    pub fn exists(&self, user_id: &Uuid, target: ReactionTarget) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM reactions WHERE user_id = ? AND {} = ?", target.column()),
                params![user_id.to_string(), target.id()],
                |row| row.get(0),
            )
            .context("Failed to check reaction")?;
        Ok(count > 0)
    }

    pub fn count(&self, target: ReactionTarget) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn
            .query_row(
                &format!("SELECT COUNT(*) FROM reactions WHERE {} = ?", target.column()),
                [target.id()],
                |row| count_at(row, 0),
            )
            .context("Failed to count reactions")?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::db::Database;

    #[test]
    fn test_one_reaction_per_user_and_target() {
        let db = Database::in_memory().unwrap();
        let repo = ReactionRepository::new(db.pool.clone());
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");
        let comment = insert_comment(&db, post, alice, "gm back");

        let on_post = ReactionTarget::Post(post);
        assert!(repo.add(&bob, on_post, Utc::now()).unwrap());
        assert!(!repo.add(&bob, on_post, Utc::now()).unwrap());
        assert!(repo.add(&alice, on_post, Utc::now()).unwrap());
        assert_eq!(repo.count(on_post).unwrap(), 2);

        // Liking the comment is independent of liking its post
        let on_comment = ReactionTarget::Comment(comment);
        assert!(repo.add(&bob, on_comment, Utc::now()).unwrap());
        assert_eq!(repo.count(on_comment).unwrap(), 1);

        assert!(repo.remove(&bob, on_post).unwrap());
        assert!(!repo.remove(&bob, on_post).unwrap());
        assert!(!repo.exists(&bob, on_post).unwrap());
        assert!(repo.exists(&bob, on_comment).unwrap());
        assert_eq!(repo.count(on_post).unwrap(), 1);
    }
}
