//! Feed and list assembly.
//!
//! Every list is fetched as one window of post rows, then enriched in
//! batches: stats and viewer flags keyed by logical id, tickers and polls
//! keyed by the row's own id, and fresh snapshots of quoted posts. Items
//! come back in the window's order.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{FeedPost, Paginated, ReplyItem};

use crate::db::repositories::{
    CommentRepository, ContentFilterRepository, InteractionRepository, PostRecord, PostRepository,
    TickerRepository, TimelineEntry, UserRepository,
};
use crate::db::Database;
use crate::error::{CoreError, CoreResult, InvalidReason};
use crate::pagination::{Page, PageRequest};
use crate::services::poll::PollService;
use crate::ticker::normalize_symbol;

pub struct FeedAssembler {
    posts: PostRepository,
    interactions: InteractionRepository,
    tickers: TickerRepository,
    polls: PollService,
}

impl FeedAssembler {
    pub fn new(db: &Database) -> Self {
        Self {
            posts: PostRepository::new(db.pool.clone()),
            interactions: InteractionRepository::new(db.pool.clone()),
            tickers: TickerRepository::new(db.pool.clone()),
            polls: PollService::new(db),
        }
    }

    pub fn assemble_records(
        &self,
        records: Vec<PostRecord>,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<FeedPost>> {
        let entries = records
            .into_iter()
            .map(|record| TimelineEntry {
                record,
                reposted_at: None,
            })
            .collect();
        self.assemble(entries, viewer_id, now)
    }

    pub fn assemble_one(
        &self,
        record: PostRecord,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<FeedPost> {
        let mut items = self.assemble_records(vec![record], viewer_id, now)?;
        items
            .pop()
            .ok_or_else(|| anyhow::anyhow!("assembled an empty page for one post"))
    }

    pub fn assemble(
        &self,
        entries: Vec<TimelineEntry>,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<FeedPost>> {
        if entries.is_empty() {
            return Ok(Vec::new());
        }

        let own_ids: Vec<Uuid> = entries.iter().map(|e| e.record.post.id).collect();
        let mut logical_ids: Vec<Uuid> = entries.iter().map(|e| e.record.post.logical_id()).collect();
        logical_ids.sort();
        logical_ids.dedup();
        let quoted_ids: Vec<Uuid> = entries
            .iter()
            .filter(|e| e.record.post.is_quote())
            .filter_map(|e| e.record.post.original_post_id)
            .collect();

        let stats = self.interactions.stats_for(&logical_ids)?;
        let flags = self.interactions.interactions_for(viewer_id, &logical_ids)?;
        let mut tickers = self.tickers.for_posts(&own_ids)?;
        let mut polls = self.polls.for_posts(&own_ids, viewer_id, now)?;
        let snapshots = self.posts.snapshots(&quoted_ids)?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let TimelineEntry { record, reposted_at } = entry;
                let PostRecord { post, author } = record;
                let logical_id = post.logical_id();
                let original_post = if post.is_quote() {
                    post.original_post_id.and_then(|id| snapshots.get(&id).cloned())
                } else {
                    None
                };
                FeedPost {
                    id: post.id,
                    author,
                    content: post.content,
                    media_urls: post.media_urls,
                    gif_url: post.gif_url,
                    stats: stats.get(&logical_id).copied().unwrap_or_default(),
                    user_interactions: flags.get(&logical_id).copied().unwrap_or_default(),
                    tickers: tickers.remove(&post.id).unwrap_or_default(),
                    created_at: post.created_at,
                    poll: polls.remove(&post.id),
                    original_post_id: post.original_post_id,
                    repost_type: post.repost_type,
                    original_post,
                    reposted_by_profile_user: reposted_at.is_some(),
                    reposted_at,
                }
            })
            .collect())
    }
}

/// Paginated read paths over posts and replies
pub struct FeedService {
    assembler: FeedAssembler,
    posts: PostRepository,
    comments: CommentRepository,
    interactions: InteractionRepository,
    filters: ContentFilterRepository,
    users: UserRepository,
}

impl FeedService {
    pub fn new(db: &Database) -> Self {
        Self {
            assembler: FeedAssembler::new(db),
            posts: PostRepository::new(db.pool.clone()),
            comments: CommentRepository::new(db.pool.clone()),
            interactions: InteractionRepository::new(db.pool.clone()),
            filters: ContentFilterRepository::new(db.pool.clone()),
            users: UserRepository::new(db.pool.clone()),
        }
    }

    fn require_user(&self, user_id: &Uuid) -> CoreResult<()> {
        if self.users.exists(user_id)? {
            Ok(())
        } else {
            Err(CoreError::NotFound("user"))
        }
    }

    fn excluded_for(&self, viewer_id: Option<&Uuid>) -> anyhow::Result<Vec<Uuid>> {
        match viewer_id {
            Some(viewer) => Ok(self.filters.filtered_ids(viewer)?.into_iter().collect()),
            None => Ok(Vec::new()),
        }
    }

    fn finish(
        &self,
        page: PageRequest,
        window: Page<PostRecord>,
        viewer_id: Option<&Uuid>,
    ) -> CoreResult<Paginated<FeedPost>> {
        let items = self.assembler.assemble_records(window.items, viewer_id, Utc::now())?;
        Ok(page.paginate(items, window.total))
    }

    /// Everyone's live posts except authors the viewer muted or blocked
    pub fn home_feed(&self, viewer_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<FeedPost>> {
        let excluded = self.excluded_for(Some(viewer_id))?;
        let window = self.posts.home_feed(&excluded, page)?;
        self.finish(page, window, Some(viewer_id))
    }

    /// A user's own posts merged with what they normally reposted.
    ///
    /// Muting does not hide a profile the viewer opens directly.
    pub fn profile_timeline(
        &self,
        user_id: &Uuid,
        viewer_id: Option<&Uuid>,
        page: PageRequest,
    ) -> CoreResult<Paginated<FeedPost>> {
        self.require_user(user_id)?;
        let window = self.posts.profile_timeline(user_id, page)?;
        let items = self.assembler.assemble(window.items, viewer_id, Utc::now())?;
        Ok(page.paginate(items, window.total))
    }

    pub fn ticker_timeline(
        &self,
        symbol: &str,
        viewer_id: Option<&Uuid>,
        page: PageRequest,
    ) -> CoreResult<Paginated<FeedPost>> {
        let symbol =
            normalize_symbol(symbol).ok_or(CoreError::InvalidState(InvalidReason::InvalidSymbol))?;
        let excluded = self.excluded_for(viewer_id)?;
        let window = self.posts.ticker_timeline(&symbol, &excluded, page)?;
        self.finish(page, window, viewer_id)
    }

    pub fn liked_posts(
        &self,
        user_id: &Uuid,
        viewer_id: Option<&Uuid>,
        page: PageRequest,
    ) -> CoreResult<Paginated<FeedPost>> {
        self.require_user(user_id)?;
        let window = self.posts.liked_by(user_id, page)?;
        self.finish(page, window, viewer_id)
    }

    pub fn bookmarks(&self, user_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<FeedPost>> {
        let window = self.posts.bookmarked_by(user_id, page)?;
        self.finish(page, window, Some(user_id))
    }

    /// Comments a user left on live posts, newest first
    pub fn replies_by_user(
        &self,
        user_id: &Uuid,
        viewer_id: Option<&Uuid>,
        page: PageRequest,
    ) -> CoreResult<Paginated<ReplyItem>> {
        self.require_user(user_id)?;
        let window = self.comments.replies_by_user(user_id, page)?;

        let ids: Vec<Uuid> = window.items.iter().map(|r| r.comment.id).collect();
        let likes: HashMap<Uuid, u64> = self.interactions.comment_likes(&ids)?;
        let liked = self.interactions.comments_liked_by(viewer_id, &ids)?;

        let items = window
            .items
            .into_iter()
            .map(|reply| ReplyItem {
                id: reply.comment.id,
                likes: likes.get(&reply.comment.id).copied().unwrap_or(0),
                liked: liked.contains(&reply.comment.id),
                content: reply.comment.content,
                media_urls: reply.comment.media_urls,
                gif_url: reply.comment.gif_url,
                created_at: reply.comment.created_at,
                parent_post: reply.parent,
            })
            .collect();
        Ok(page.paginate(items, window.total))
    }
}
