//! Row builders shared by repository and service unit tests.

use chrono::{DateTime, Utc};
use rusqlite::params;
use uuid::Uuid;

use super::columns::to_db_time;
use super::Database;

pub fn insert_user(db: &Database, username: &str) -> Uuid {
    let id = Uuid::new_v4();
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO users (id, username, display_name, created_at) VALUES (?, ?, ?, ?)",
        params![id.to_string(), username, username.to_uppercase(), to_db_time(&Utc::now())],
    )
    .unwrap();
    id
}

pub fn insert_post_at(db: &Database, author: Uuid, content: &str, at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO posts (id, author_id, content, created_at) VALUES (?, ?, ?, ?)",
        params![id.to_string(), author.to_string(), content, to_db_time(&at)],
    )
    .unwrap();
    id
}

pub fn insert_post(db: &Database, author: Uuid, content: &str) -> Uuid {
    insert_post_at(db, author, content, Utc::now())
}

pub fn insert_quote_at(
    db: &Database,
    author: Uuid,
    original: Uuid,
    content: &str,
    at: DateTime<Utc>,
) -> Uuid {
    let id = Uuid::new_v4();
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO posts (id, author_id, content, original_post_id, repost_type, created_at)
         VALUES (?, ?, ?, ?, 'quote', ?)",
        params![id.to_string(), author.to_string(), content, original.to_string(), to_db_time(&at)],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO reposts (id, user_id, post_id, repost_type, quote_content, created_at)
         VALUES (?, ?, ?, 'quote', ?, ?)",
        params![Uuid::new_v4().to_string(), author.to_string(), original.to_string(), content, to_db_time(&at)],
    )
    .unwrap();
    id
}

pub fn insert_normal_repost_at(db: &Database, user: Uuid, post: Uuid, at: DateTime<Utc>) {
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO reposts (id, user_id, post_id, repost_type, created_at) VALUES (?, ?, ?, 'normal', ?)",
        params![Uuid::new_v4().to_string(), user.to_string(), post.to_string(), to_db_time(&at)],
    )
    .unwrap();
}

pub fn insert_comment(db: &Database, post: Uuid, author: Uuid, content: &str) -> Uuid {
    let id = Uuid::new_v4();
    let now = to_db_time(&Utc::now());
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO comments (id, post_id, author_id, content, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        params![id.to_string(), post.to_string(), author.to_string(), content, now, now],
    )
    .unwrap();
    id
}

pub fn like_post_at(db: &Database, user: Uuid, post: Uuid, at: DateTime<Utc>) {
    let conn = db.connection().unwrap();
    conn.execute(
        "INSERT INTO reactions (id, user_id, post_id, created_at) VALUES (?, ?, ?, ?)",
        params![Uuid::new_v4().to_string(), user.to_string(), post.to_string(), to_db_time(&at)],
    )
    .unwrap();
}

pub fn like_post(db: &Database, user: Uuid, post: Uuid) {
    like_post_at(db, user, post, Utc::now());
}

pub fn soft_delete_post(db: &Database, post: Uuid) {
    let conn = db.connection().unwrap();
    conn.execute(
        "UPDATE posts SET deleted_at = ? WHERE id = ?",
        params![to_db_time(&Utc::now()), post.to_string()],
    )
    .unwrap();
}
