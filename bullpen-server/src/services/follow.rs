use chrono::Utc;
use uuid::Uuid;

use bullpen_types::{FollowEntry, FollowOutcome, Paginated};

use crate::db::repositories::{FollowRepository, UserRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult, InvalidReason};
use crate::pagination::PageRequest;

pub struct FollowService {
    follows: FollowRepository,
    users: UserRepository,
}

impl FollowService {
    pub fn new(db: &Database) -> Self {
        Self {
            follows: FollowRepository::new(db.pool.clone()),
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

    /// Follow `target_id`, returning the target's new follower count
    pub fn follow(&self, follower_id: &Uuid, target_id: &Uuid) -> CoreResult<FollowOutcome> {
        if follower_id == target_id {
            return Err(CoreError::InvalidState(InvalidReason::SelfTarget));
        }
        self.require_user(target_id)?;
        if !self.follows.follow(follower_id, target_id, Utc::now())? {
            return Err(CoreError::Conflict(ConflictReason::AlreadyFollowing));
        }
        tracing::info!(follower_id = %follower_id, following_id = %target_id, "user followed");
        Ok(FollowOutcome {
            following: true,
            follower_count: self.follows.follower_count(target_id)?,
        })
    }

    /// Stop following. `None` when there was no follow to remove.
    pub fn unfollow(&self, follower_id: &Uuid, target_id: &Uuid) -> CoreResult<Option<u64>> {
        if !self.follows.unfollow(follower_id, target_id)? {
            return Ok(None);
        }
        tracing::info!(follower_id = %follower_id, following_id = %target_id, "user unfollowed");
        Ok(Some(self.follows.follower_count(target_id)?))
    }

    pub fn is_following(&self, follower_id: &Uuid, target_id: &Uuid) -> CoreResult<bool> {
        Ok(self.follows.is_following(follower_id, target_id)?)
    }

    pub fn followers(&self, user_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<FollowEntry>> {
        self.require_user(user_id)?;
        let window = self.follows.followers(user_id, page)?;
        Ok(page.paginate(window.items, window.total))
    }

    pub fn following(&self, user_id: &Uuid, page: PageRequest) -> CoreResult<Paginated<FollowEntry>> {
        self.require_user(user_id)?;
        let window = self.follows.following(user_id, page)?;
        Ok(page.paginate(window.items, window.total))
    }
}
