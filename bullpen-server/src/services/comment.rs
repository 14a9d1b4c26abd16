use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{Comment, CommentView, CreateCommentRequest, Paginated, Poll};

use crate::db::repositories::{
    CommentRecord, CommentRepository, InteractionRepository, PollRepository, PostRepository,
};
use crate::db::Database;
use crate::error::{CoreError, CoreResult};
use crate::pagination::PageRequest;
use crate::services::poll::PollService;
use crate::services::validation::{validate_body, validate_poll};

pub struct CommentService {
    db: Database,
    comments: CommentRepository,
    posts: PostRepository,
    interactions: InteractionRepository,
    polls: PollService,
}

impl CommentService {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            comments: CommentRepository::new(db.pool.clone()),
            posts: PostRepository::new(db.pool.clone()),
            interactions: InteractionRepository::new(db.pool.clone()),
            polls: PollService::new(db),
        }
    }

    fn views(
        &self,
        records: Vec<CommentRecord>,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CommentView>> {
        let ids: Vec<Uuid> = records.iter().map(|r| r.comment.id).collect();
        let likes = self.interactions.comment_likes(&ids)?;
        let liked = self.interactions.comments_liked_by(viewer_id, &ids)?;
        let mut polls = self.polls.for_comments(&ids, viewer_id, now)?;

        Ok(records
            .into_iter()
            .map(|CommentRecord { comment, author }| CommentView {
                id: comment.id,
                post_id: comment.post_id,
                author,
                likes: likes.get(&comment.id).copied().unwrap_or(0),
                liked: liked.contains(&comment.id),
                poll: polls.remove(&comment.id),
                content: comment.content,
                media_urls: comment.media_urls,
                gif_url: comment.gif_url,
                created_at: comment.created_at,
            })
            .collect())
    }

    pub fn create_comment(
        &self,
        post_id: &Uuid,
        author_id: &Uuid,
        request: CreateCommentRequest,
    ) -> CoreResult<CommentView> {
        let body = validate_body(&request.content, request.media_urls, request.gif_url)?;
        let poll = request.poll.map(validate_poll).transpose()?;
        if self.posts.get_visible(post_id)?.is_none() {
            return Err(CoreError::NotFound("post"));
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            post_id: *post_id,
            author_id: *author_id,
            content: body.content,
            media_urls: body.media_urls,
            gif_url: body.gif_url,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        {
            let mut conn = self.db.connection()?;
            let tx = conn.transaction()?;
            CommentRepository::insert(&tx, &comment)?;
            if let Some(draft) = poll {
                let poll = Poll {
                    id: Uuid::new_v4(),
                    post_id: None,
                    comment_id: Some(comment.id),
                    options: draft.options,
                    duration_days: draft.duration_days,
                    created_at: now,
                };
                PollRepository::insert(&tx, &poll)?;
            }
            tx.commit()?;
        }
        tracing::info!(comment_id = %comment.id, post_id = %post_id, author_id = %author_id, "comment created");

        let record = self
            .comments
            .get_visible(&comment.id)?
            .ok_or(CoreError::NotFound("comment"))?;
        let mut views = self.views(vec![record], Some(author_id), now)?;
        views.pop().ok_or(CoreError::NotFound("comment"))
    }

    /// Live comments on a live post, newest first
    pub fn list_comments(
        &self,
        post_id: &Uuid,
        viewer_id: Option<&Uuid>,
        page: PageRequest,
    ) -> CoreResult<Paginated<CommentView>> {
        if self.posts.get_visible(post_id)?.is_none() {
            return Err(CoreError::NotFound("post"));
        }
        let window = self.comments.list_for_post(post_id, page)?;
        let items = self.views(window.items, viewer_id, Utc::now())?;
        Ok(page.paginate(items, window.total))
    }

    pub fn delete_comment(&self, comment_id: &Uuid, owner_id: &Uuid) -> CoreResult<()> {
        let comment = self
            .comments
            .get(comment_id)?
            .filter(|c| c.deleted_at.is_none())
            .ok_or(CoreError::NotFound("comment"))?;
        if comment.author_id != *owner_id {
            return Err(CoreError::PermissionDenied);
        }
        self.comments.soft_delete(comment_id, Utc::now())?;
        tracing::info!(comment_id = %comment_id, owner_id = %owner_id, "comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::error::InvalidReason;
    use bullpen_types::PollDraft;

    fn request(content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_comment_on_deleted_post_is_not_found() {
        let db = Database::in_memory().unwrap();
        let service = CommentService::new(&db);
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "gm");
        soft_delete_post(&db, post);

        assert!(matches!(
            service.create_comment(&post, &alice, request("hello?")),
            Err(CoreError::NotFound("post"))
        ));
    }

    #[test]
    fn test_comment_with_poll_and_listing() {
        let db = Database::in_memory().unwrap();
        let service = CommentService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "thoughts?");

        let mut req = request("vote below");
        req.poll = Some(PollDraft {
            options: vec!["yes".to_string(), "no".to_string()],
            duration_days: 1,
        });
        let created = service.create_comment(&post, &bob, req).unwrap();
        assert_eq!(created.poll.as_ref().map(|p| p.options.len()), Some(2));
        service.create_comment(&post, &alice, request("second")).unwrap();

        let page = service.list_comments(&post, Some(&alice), PageRequest::default()).unwrap();
        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.data[1].id, created.id);
        assert!(page.data[1].poll.is_some());
        assert!(page.data[0].poll.is_none());
    }

    #[test]
    fn test_blank_comment_rejected() {
        let db = Database::in_memory().unwrap();
        let service = CommentService::new(&db);
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "gm");
        assert!(matches!(
            service.create_comment(&post, &alice, request("  ")),
            Err(CoreError::InvalidState(InvalidReason::EmptyContent))
        ));
    }

    #[test]
    fn test_delete_comment_ownership() {
        let db = Database::in_memory().unwrap();
        let service = CommentService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");
        let comment = insert_comment(&db, post, bob, "gn");

        assert!(matches!(service.delete_comment(&comment, &alice), Err(CoreError::PermissionDenied)));
        service.delete_comment(&comment, &bob).unwrap();
        assert!(matches!(service.delete_comment(&comment, &bob), Err(CoreError::NotFound("comment"))));
        let page = service.list_comments(&post, None, PageRequest::default()).unwrap();
        assert!(page.data.is_empty());
    }
}
