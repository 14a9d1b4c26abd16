#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_server::db::Database;
use bullpen_server::services::{PostService, UserService};
use bullpen_types::{CreatePostRequest, FeedPost, PollDraft};

pub fn database() -> Result<Database> {
    Database::in_memory()
}

pub fn user(db: &Database, username: &str) -> Result<Uuid> {
    let id = Uuid::new_v4();
    UserService::new(db).get_or_create(&id, username, "")?;
    Ok(id)
}

pub fn post(db: &Database, author: &Uuid, content: &str) -> Result<FeedPost> {
    let request = CreatePostRequest {
        content: content.to_string(),
        ..Default::default()
    };
    Ok(PostService::new(db).create_post(author, request)?)
}

pub fn post_at(db: &Database, author: &Uuid, content: &str, at: DateTime<Utc>) -> Result<FeedPost> {
    let request = CreatePostRequest {
        content: content.to_string(),
        ..Default::default()
    };
    Ok(PostService::new(db).create_post_at(author, request, at)?)
}

pub fn poll_post_at(
    db: &Database,
    author: &Uuid,
    options: &[&str],
    duration_days: u32,
    at: DateTime<Utc>,
) -> Result<FeedPost> {
    let request = CreatePostRequest {
        content: "poll time".to_string(),
        poll: Some(PollDraft {
            options: options.iter().map(|o| o.to_string()).collect(),
            duration_days,
        }),
        ..Default::default()
    };
    Ok(PostService::new(db).create_post_at(author, request, at)?)
}

pub fn t0() -> DateTime<Utc> {
    "2024-05-01T12:00:00Z".parse().expect("valid timestamp")
}
