//! Normal and quote reposts.
//!
//! Both kinds leave one row in `reposts` pointing at the original post, and
//! a user holds at most one such row per post. A quote additionally owns a
//! post row of its own that carries the commentary.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{CreateRepostRequest, Post, Repost, RepostOutcome, RepostType};

use crate::db::repositories::{PostRepository, RepostRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult};
use crate::services::feed::FeedAssembler;
use crate::services::post::write_post;
use crate::services::validation::validate_body;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepostKind {
    Normal,
    Quote {
        content: String,
        media_urls: Option<Vec<String>>,
        gif_url: Option<String>,
    },
}

impl From<CreateRepostRequest> for RepostKind {
    fn from(request: CreateRepostRequest) -> Self {
        match request.repost_type {
            RepostType::Normal => RepostKind::Normal,
            RepostType::Quote => RepostKind::Quote {
                content: request.quote_content.unwrap_or_default(),
                media_urls: request.media_urls,
                gif_url: request.gif_url,
            },
        }
    }
}

pub struct RepostService {
    db: Database,
    posts: PostRepository,
    reposts: RepostRepository,
    assembler: FeedAssembler,
}

impl RepostService {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            posts: PostRepository::new(db.pool.clone()),
            reposts: RepostRepository::new(db.pool.clone()),
            assembler: FeedAssembler::new(db),
        }
    }

    pub fn repost(&self, user_id: &Uuid, post_id: &Uuid, kind: RepostKind) -> CoreResult<RepostOutcome> {
        self.repost_at(user_id, post_id, kind, Utc::now())
    }

    pub fn repost_at(
        &self,
        user_id: &Uuid,
        post_id: &Uuid,
        kind: RepostKind,
        now: DateTime<Utc>,
    ) -> CoreResult<RepostOutcome> {
        let original = self.posts.get_visible(post_id)?.ok_or(CoreError::NotFound("post"))?;
        if self.reposts.find(user_id, post_id)?.is_some() {
            return Err(CoreError::Conflict(ConflictReason::AlreadyReposted));
        }

        let (repost_type, quote_post) = match kind {
            RepostKind::Normal => (RepostType::Normal, None),
            RepostKind::Quote {
                content,
                media_urls,
                gif_url,
            } => {
                let body = validate_body(&content, media_urls, gif_url)?;
                let post = Post {
                    id: Uuid::new_v4(),
                    author_id: *user_id,
                    content: body.content,
                    media_urls: body.media_urls,
                    gif_url: body.gif_url,
                    original_post_id: Some(*post_id),
                    repost_type: Some(RepostType::Quote),
                    created_at: now,
                    deleted_at: None,
                };
                (RepostType::Quote, Some(post))
            }
        };

        let repost = Repost {
            id: Uuid::new_v4(),
            user_id: *user_id,
            post_id: *post_id,
            repost_type,
            quote_content: quote_post.as_ref().map(|p| p.content.clone()),
            created_at: now,
        };

        {
            let mut conn = self.db.connection()?;
            let tx = conn.transaction()?;
            if let Some(post) = &quote_post {
                write_post(&tx, post, None)?;
            }
            if !RepostRepository::insert(&tx, &repost)? {
                return Err(CoreError::Conflict(ConflictReason::AlreadyReposted));
            }
            tx.commit()?;
        }
        tracing::info!(
            user_id = %user_id,
            post_id = %post_id,
            repost_type = repost_type.as_str(),
            "post reposted"
        );

        let quote_post = match quote_post {
            Some(post) => {
                let record = self
                    .posts
                    .get_visible(&post.id)?
                    .ok_or(CoreError::NotFound("post"))?;
                Some(self.assembler.assemble_one(record, Some(user_id), now)?)
            }
            None => None,
        };

        Ok(RepostOutcome {
            id: repost.id,
            repost_type,
            original_post: original.snapshot(),
            quote_content: repost.quote_content,
            created_at: repost.created_at,
            quote_post,
        })
    }

    /// Remove the user's repost of a post. A quote repost also loses its
    /// quote post. Returns false when there was nothing to undo.
    pub fn undo_repost(&self, user_id: &Uuid, post_id: &Uuid) -> CoreResult<bool> {
        let Some(repost) = self.reposts.find(user_id, post_id)? else {
            return Ok(false);
        };

        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        let removed = RepostRepository::delete(&tx, &repost.id)?;
        if repost.repost_type == RepostType::Quote {
            PostRepository::soft_delete_quotes(&tx, user_id, post_id, Utc::now())?;
        }
        tx.commit()?;

        tracing::info!(user_id = %user_id, post_id = %post_id, "repost undone");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::error::InvalidReason;

    fn quote(content: &str) -> RepostKind {
        RepostKind::Quote {
            content: content.to_string(),
            media_urls: None,
            gif_url: None,
        }
    }

    #[test]
    fn test_normal_repost_conflicts_with_any_existing_repost() {
        let db = Database::in_memory().unwrap();
        let service = RepostService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");

        let outcome = service.repost(&bob, &post, RepostKind::Normal).unwrap();
        assert_eq!(outcome.repost_type, RepostType::Normal);
        assert_eq!(outcome.original_post.id, post);
        assert!(outcome.quote_post.is_none());

        assert!(matches!(
            service.repost(&bob, &post, quote("actually")),
            Err(CoreError::Conflict(ConflictReason::AlreadyReposted))
        ));
    }

    #[test]
    fn test_quote_repost_creates_post_and_undo_removes_it() {
        let db = Database::in_memory().unwrap();
        let service = RepostService::new(&db);
        let posts = PostRepository::new(db.pool.clone());
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");

        let outcome = service.repost(&bob, &post, quote("interesting $BTC")).unwrap();
        let quote_post = outcome.quote_post.unwrap();
        assert_eq!(quote_post.original_post_id, Some(post));
        assert_eq!(quote_post.repost_type, Some(RepostType::Quote));
        assert_eq!(quote_post.tickers.len(), 1);
        assert_eq!(quote_post.original_post.map(|o| o.id), Some(post));

        assert!(service.undo_repost(&bob, &post).unwrap());
        assert!(posts.get_visible(&quote_post.id).unwrap().is_none());
        assert!(posts.get_visible(&post).unwrap().is_some());
        assert!(!service.undo_repost(&bob, &post).unwrap());
    }

    #[test]
    fn test_empty_quote_rejected_without_side_effects() {
        let db = Database::in_memory().unwrap();
        let service = RepostService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");

        assert!(matches!(
            service.repost(&bob, &post, quote("   ")),
            Err(CoreError::InvalidState(InvalidReason::EmptyContent))
        ));
        assert!(service.reposts.find(&bob, &post).unwrap().is_none());
    }

    #[test]
    fn test_repost_of_deleted_post_is_not_found() {
        let db = Database::in_memory().unwrap();
        let service = RepostService::new(&db);
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "gm");
        soft_delete_post(&db, post);
        assert!(matches!(
            service.repost(&alice, &post, RepostKind::Normal),
            Err(CoreError::NotFound("post"))
        ));
    }
}
