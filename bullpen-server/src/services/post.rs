use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use bullpen_types::{CreatePostRequest, FeedPost, Poll, PollDraft, Post, RepostType};

use crate::db::repositories::{PollRepository, PostRepository, RepostRepository, TickerRepository, UserRepository};
use crate::db::Database;
use crate::error::{CoreError, CoreResult};
use crate::services::feed::FeedAssembler;
use crate::services::validation::{validate_body, validate_poll};
use crate::ticker::extract_tickers;

/// Write a post row with its ticker links and optional poll.
///
/// Runs on the caller's transaction so the post never exists without them.
pub(crate) fn write_post(conn: &Connection, post: &Post, poll: Option<PollDraft>) -> anyhow::Result<Vec<String>> {
    PostRepository::insert(conn, post)?;

    let symbols = extract_tickers(&post.content);
    TickerRepository::link_post(conn, &post.id, &symbols, post.created_at)?;

    if let Some(draft) = poll {
        let poll = Poll {
            id: Uuid::new_v4(),
            post_id: Some(post.id),
            comment_id: None,
            options: draft.options,
            duration_days: draft.duration_days,
            created_at: post.created_at,
        };
        PollRepository::insert(conn, &poll)?;
    }
    Ok(symbols)
}

pub struct PostService {
    db: Database,
    posts: PostRepository,
    reposts: RepostRepository,
    users: UserRepository,
    assembler: FeedAssembler,
}

impl PostService {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            posts: PostRepository::new(db.pool.clone()),
            reposts: RepostRepository::new(db.pool.clone()),
            users: UserRepository::new(db.pool.clone()),
            assembler: FeedAssembler::new(db),
        }
    }

    pub fn create_post(&self, author_id: &Uuid, request: CreatePostRequest) -> CoreResult<FeedPost> {
        self.create_post_at(author_id, request, Utc::now())
    }

    /// Validate and store a post, its poll and its ticker links in one transaction
    pub fn create_post_at(
        &self,
        author_id: &Uuid,
        request: CreatePostRequest,
        now: DateTime<Utc>,
    ) -> CoreResult<FeedPost> {
        let body = validate_body(&request.content, request.media_urls, request.gif_url)?;
        let poll = request.poll.map(validate_poll).transpose()?;
        if !self.users.exists(author_id)? {
            return Err(CoreError::NotFound("user"));
        }

        let post = Post {
            id: Uuid::new_v4(),
            author_id: *author_id,
            content: body.content,
            media_urls: body.media_urls,
            gif_url: body.gif_url,
            original_post_id: None,
            repost_type: None,
            created_at: now,
            deleted_at: None,
        };

        let symbols = {
            let mut conn = self.db.connection()?;
            let tx = conn.transaction()?;
            let symbols = write_post(&tx, &post, poll)?;
            tx.commit()?;
            symbols
        };
        tracing::info!(post_id = %post.id, author_id = %author_id, tickers = ?symbols, "post created");

        self.get_post_at(&post.id, Some(author_id), now)
    }

    pub fn get_post(&self, post_id: &Uuid, viewer_id: Option<&Uuid>) -> CoreResult<FeedPost> {
        self.get_post_at(post_id, viewer_id, Utc::now())
    }

    fn get_post_at(&self, post_id: &Uuid, viewer_id: Option<&Uuid>, now: DateTime<Utc>) -> CoreResult<FeedPost> {
        let record = self.posts.get_visible(post_id)?.ok_or(CoreError::NotFound("post"))?;
        Ok(self.assembler.assemble_one(record, viewer_id, now)?)
    }

    /// Soft delete a post owned by `owner_id`.
    ///
    /// Deleting a quote post also drops the repost row it was created with.
    pub fn delete_post(&self, post_id: &Uuid, owner_id: &Uuid) -> CoreResult<()> {
        let post = self
            .posts
            .get(post_id)?
            .filter(|p| p.deleted_at.is_none())
            .ok_or(CoreError::NotFound("post"))?;
        if post.author_id != *owner_id {
            return Err(CoreError::PermissionDenied);
        }

        let quote_repost = match (post.repost_type, post.original_post_id) {
            (Some(RepostType::Quote), Some(original)) => self
                .reposts
                .find(owner_id, &original)?
                .filter(|r| r.repost_type == RepostType::Quote),
            _ => None,
        };

        let mut conn = self.db.connection()?;
        let tx = conn.transaction()?;
        PostRepository::soft_delete(&tx, post_id, Utc::now())?;
        if let Some(repost) = &quote_repost {
            RepostRepository::delete(&tx, &repost.id)?;
        }
        tx.commit()?;

        tracing::info!(post_id = %post_id, owner_id = %owner_id, "post deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::error::InvalidReason;

    fn request(content: &str) -> CreatePostRequest {
        CreatePostRequest {
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_post_links_tickers_in_order() {
        let db = Database::in_memory().unwrap();
        let service = PostService::new(&db);
        let alice = insert_user(&db, "alice");

        let post = service
            .create_post(&alice, request("Bullish on $AAPL and #TSLA! also $aapl"))
            .unwrap();
        let symbols: Vec<_> = post.tickers.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["AAPL", "TSLA"]);
        assert_eq!(post.stats, Default::default());
        assert!(post.poll.is_none());
    }

    #[test]
    fn test_create_post_with_poll() {
        let db = Database::in_memory().unwrap();
        let service = PostService::new(&db);
        let alice = insert_user(&db, "alice");
        let mut req = request("which way?");
        req.poll = Some(PollDraft {
            options: vec![" up ".to_string(), "down".to_string()],
            duration_days: 3,
        });

        let post = service.create_post(&alice, req).unwrap();
        let poll = post.poll.unwrap();
        assert_eq!(poll.options, vec!["up", "down"]);
        assert_eq!(poll.total_votes, 0);
        assert!(!poll.is_finished);
    }

    #[test]
    fn test_invalid_poll_writes_nothing() {
        let db = Database::in_memory().unwrap();
        let service = PostService::new(&db);
        let alice = insert_user(&db, "alice");
        let mut req = request("$NVDA which way?");
        req.poll = Some(PollDraft {
            options: vec!["only one".to_string()],
            duration_days: 3,
        });

        assert!(matches!(
            service.create_post(&alice, req),
            Err(CoreError::InvalidState(InvalidReason::InvalidPoll))
        ));
        let conn = db.connection().unwrap();
        let posts: i64 = conn.query_row("SELECT COUNT(*) FROM posts", [], |r| r.get(0)).unwrap();
        let tickers: i64 = conn.query_row("SELECT COUNT(*) FROM tickers", [], |r| r.get(0)).unwrap();
        assert_eq!((posts, tickers), (0, 0));
    }

    #[test]
    fn test_delete_requires_owner() {
        let db = Database::in_memory().unwrap();
        let service = PostService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = service.create_post(&alice, request("mine")).unwrap();

        assert!(matches!(service.delete_post(&post.id, &bob), Err(CoreError::PermissionDenied)));
        service.delete_post(&post.id, &alice).unwrap();
        assert!(matches!(service.get_post(&post.id, None), Err(CoreError::NotFound("post"))));
        assert!(matches!(service.delete_post(&post.id, &alice), Err(CoreError::NotFound("post"))));
    }

    #[test]
    fn test_deleting_quote_post_drops_its_repost_row() {
        let db = Database::in_memory().unwrap();
        let service = PostService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let original = insert_post(&db, alice, "original");
        let quote = insert_quote_at(&db, bob, original, "hmm", Utc::now());

        service.delete_post(&quote, &bob).unwrap();
        let reposts = RepostRepository::new(db.pool.clone());
        assert!(reposts.find(&bob, &original).unwrap().is_none());
        assert_eq!(service.get_post(&original, None).unwrap().stats.reposts, 0);
    }
}
