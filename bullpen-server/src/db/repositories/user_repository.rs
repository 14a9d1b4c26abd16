use std::collections::HashMap;

use anyhow::{Context, Result};
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::{User, UserSummary};

use crate::db::columns::{count_at, summary_at, time_at, to_db_time, uuid_at, USER_SUMMARY_COLUMNS};
use crate::db::{insert_unique, placeholders, DbPool};
use crate::pagination::{Page, PageRequest};

const USER_COLUMNS: &str =
    "id, username, display_name, bio, profile_picture_url, badge, created_at";

fn map_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: uuid_at(row, 0)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        bio: row.get(3)?,
        profile_picture_url: row.get(4)?,
        badge: row.get(5)?,
        created_at: time_at(row, 6)?,
    })
}

/// Escape `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern
pub(crate) fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a user. Returns false when the id or username is already taken.
    pub fn create(&self, user: &User) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO users (id, username, display_name, bio, profile_picture_url, badge, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                user.id.to_string(),
                user.username,
                user.display_name,
                user.bio,
                user.profile_picture_url,
                user.badge,
                to_db_time(&user.created_at),
            ],
        ))
        .context("Failed to create user")?;
        Ok(inserted)
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [user_id.to_string()],
                map_user,
            )
            .optional()
            .context("Failed to load user")?;
        Ok(user)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                [username],
                map_user,
            )
            .optional()
            .context("Failed to load user by username")?;
        Ok(user)
    }

    /// Write the editable profile fields. Returns false when the user is gone.
    pub fn update_profile(&self, user: &User) -> Result<bool> {
        let conn = self.pool.get()?;
        let rows = conn
            .execute(
                "UPDATE users SET display_name = ?, bio = ?, profile_picture_url = ? WHERE id = ?",
                params![
                    user.display_name,
                    user.bio,
                    user.profile_picture_url,
                    user.id.to_string(),
                ],
            )
            .context("Failed to update user profile")?;
        Ok(rows > 0)
    }

    pub fn exists(&self, user_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM users WHERE id = ?",
                [user_id.to_string()],
                |row| row.get(0),
            )
            .context("Failed to check user")?;
        Ok(count > 0)
    }

    /// Batch-load author summaries
    pub fn summaries(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, UserSummary>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {USER_SUMMARY_COLUMNS} FROM users u WHERE u.id IN ({})",
            placeholders(user_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(user_ids.iter().map(|id| id.to_string())), |row| {
                summary_at(row, 0)
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load user summaries")?;
        Ok(rows.into_iter().map(|s| (s.id, s)).collect())
    }

    /// Count a user's visible posts (originals and quote reposts)
    pub fn post_count(&self, user_id: &Uuid) -> Result<u64> {
        let conn = self.pool.get()?;
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM posts WHERE author_id = ? AND deleted_at IS NULL",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )
            .context("Failed to count posts")?;
        Ok(count)
    }

    /// Case-insensitive substring search over username and display name
    pub fn search(&self, query: &str, page: PageRequest) -> Result<Page<UserSummary>> {
        let conn = self.pool.get()?;
        let pattern = like_pattern(query);

        let total = conn
            .query_row(
                "SELECT COUNT(*) FROM users u
                 WHERE lower(u.username) LIKE ?1 ESCAPE '\\' OR lower(u.display_name) LIKE ?1 ESCAPE '\\'",
                [&pattern],
                |row| count_at(row, 0),
            )
            .context("Failed to count user search results")?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_SUMMARY_COLUMNS} FROM users u
             WHERE lower(u.username) LIKE ?1 ESCAPE '\\' OR lower(u.display_name) LIKE ?1 ESCAPE '\\'
             ORDER BY u.username ASC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let items = stmt
            .query_map(params![pattern, page.limit(), page.offset()], |row| summary_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to search users")?;

        Ok(Page { items, total })
    }
}
