use chrono::Utc;
use uuid::Uuid;

use bullpen_types::ReactionOutcome;

use crate::db::repositories::{CommentRepository, PostRepository, ReactionRepository, ReactionTarget};
use crate::db::Database;
use crate::error::{CoreError, CoreResult};

/// Like toggles for posts and comments
pub struct ReactionService {
    reactions: ReactionRepository,
    posts: PostRepository,
    comments: CommentRepository,
}

impl ReactionService {
    pub fn new(db: &Database) -> Self {
        Self {
            reactions: ReactionRepository::new(db.pool.clone()),
            posts: PostRepository::new(db.pool.clone()),
            comments: CommentRepository::new(db.pool.clone()),
        }
    }

    /// Like or unlike a post. Likes land on the post's logical id.
    pub fn toggle_post_reaction(&self, user_id: &Uuid, post_id: &Uuid) -> CoreResult<ReactionOutcome> {
        let record = self.posts.get_visible(post_id)?.ok_or(CoreError::NotFound("post"))?;
        self.toggle(user_id, ReactionTarget::Post(record.post.logical_id()))
    }

    pub fn toggle_comment_reaction(&self, user_id: &Uuid, comment_id: &Uuid) -> CoreResult<ReactionOutcome> {
        if self.comments.get_visible(comment_id)?.is_none() {
            return Err(CoreError::NotFound("comment"));
        }
        self.toggle(user_id, ReactionTarget::Comment(*comment_id))
    }

    fn toggle(&self, user_id: &Uuid, target: ReactionTarget) -> CoreResult<ReactionOutcome> {
        let liked = self.reactions.exists(user_id, target)?;
        self.apply(user_id, target, liked)
    }

    /// Flip a like whose prior state was `liked`. Either way the row may already
    /// be in its final state because of a concurrent request for the same user.
    fn apply(&self, user_id: &Uuid, target: ReactionTarget, liked: bool) -> CoreResult<ReactionOutcome> {
        let reacted = if liked {
            self.reactions.remove(user_id, target)?;
            false
        } else {
            self.reactions.add(user_id, target, Utc::now())?;
            true
        };
        let count = self.reactions.count(target)?;
        tracing::debug!(user_id = %user_id, ?target, reacted, count, "reaction toggled");
        Ok(ReactionOutcome { reacted, count })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;

    #[test]
    fn test_like_unlike_like_restores_count() {
        let db = Database::in_memory().unwrap();
        let service = ReactionService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");
        like_post(&db, alice, post);

        let first = service.toggle_post_reaction(&bob, &post).unwrap();
        assert_eq!(first, ReactionOutcome { reacted: true, count: 2 });
        let second = service.toggle_post_reaction(&bob, &post).unwrap();
        assert_eq!(second, ReactionOutcome { reacted: false, count: 1 });
        let third = service.toggle_post_reaction(&bob, &post).unwrap();
        assert_eq!(third, first);
    }

    #[test]
    fn test_unlike_reports_unliked_when_row_already_gone() {
        let db = Database::in_memory().unwrap();
        let service = ReactionService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");
        let post = insert_post(&db, alice, "gm");
        like_post(&db, alice, post);

        // Bob saw his like, but another request removed it first
        let outcome = service.apply(&bob, ReactionTarget::Post(post), true).unwrap();
        assert_eq!(outcome, ReactionOutcome { reacted: false, count: 1 });

        // And a like that raced another like still reports liked
        like_post(&db, bob, post);
        let outcome = service.apply(&bob, ReactionTarget::Post(post), false).unwrap();
        assert_eq!(outcome, ReactionOutcome { reacted: true, count: 2 });
    }

    #[test]
    fn test_comment_reaction_needs_live_comment() {
        let db = Database::in_memory().unwrap();
        let service = ReactionService::new(&db);
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "gm");
        let comment = insert_comment(&db, post, alice, "self reply");

        let outcome = service.toggle_comment_reaction(&alice, &comment).unwrap();
        assert!(outcome.reacted);
        assert_eq!(outcome.count, 1);

        soft_delete_post(&db, post);
        assert!(matches!(
            service.toggle_comment_reaction(&alice, &comment),
            Err(CoreError::NotFound("comment"))
        ));
        assert!(matches!(
            service.toggle_post_reaction(&alice, &post),
            Err(CoreError::NotFound("post"))
        ));
    }
}
