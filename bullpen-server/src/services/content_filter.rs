//! Mutes and blocks.
//!
//! Both kinds remove the filtered author from the user's home feed and
//! ticker timelines. Profiles opened directly stay visible.

use std::collections::HashSet;

use chrono::Utc;
use uuid::Uuid;

use bullpen_types::{ContentFilters, FilterType, FilteredUser};

use crate::db::repositories::{ContentFilterRepository, UserRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult, InvalidReason};

pub struct ContentFilterService {
    filters: ContentFilterRepository,
    users: UserRepository,
}

impl ContentFilterService {
    pub fn new(db: &Database) -> Self {
        Self {
            filters: ContentFilterRepository::new(db.pool.clone()),
            users: UserRepository::new(db.pool.clone()),
        }
    }

    fn add(&self, user_id: &Uuid, target_id: &Uuid, filter_type: FilterType) -> CoreResult<()> {
        if user_id == target_id {
            return Err(CoreError::InvalidState(InvalidReason::SelfTarget));
        }
        if !self.users.exists(target_id)? {
            return Err(CoreError::NotFound("user"));
        }
        if !self.filters.add(user_id, target_id, filter_type, Utc::now())? {
            let reason = match filter_type {
                FilterType::Mute => ConflictReason::AlreadyMuted,
                FilterType::Block => ConflictReason::AlreadyBlocked,
            };
            return Err(CoreError::Conflict(reason));
        }
        tracing::info!(
            user_id = %user_id,
            filtered_user_id = %target_id,
            filter_type = filter_type.as_str(),
            "content filter added"
        );
        Ok(())
    }

    pub fn mute(&self, user_id: &Uuid, target_id: &Uuid) -> CoreResult<()> {
        self.add(user_id, target_id, FilterType::Mute)
    }

    pub fn block(&self, user_id: &Uuid, target_id: &Uuid) -> CoreResult<()> {
        self.add(user_id, target_id, FilterType::Block)
    }

    pub fn unmute(&self, user_id: &Uuid, target_id: &Uuid) -> CoreResult<bool> {
        Ok(self.filters.remove(user_id, target_id, FilterType::Mute)?)
    }

    pub fn unblock(&self, user_id: &Uuid, target_id: &Uuid) -> CoreResult<bool> {
        Ok(self.filters.remove(user_id, target_id, FilterType::Block)?)
    }

    /// Authors hidden from the viewer, across mutes and blocks
    pub fn exclusion_set(&self, viewer_id: &Uuid) -> CoreResult<HashSet<Uuid>> {
        Ok(self.filters.filtered_ids(viewer_id)?)
    }

    pub fn list_muted(&self, user_id: &Uuid) -> CoreResult<Vec<FilteredUser>> {
        Ok(self.filters.list(user_id, FilterType::Mute)?)
    }

    pub fn list_blocked(&self, user_id: &Uuid) -> CoreResult<Vec<FilteredUser>> {
        Ok(self.filters.list(user_id, FilterType::Block)?)
    }

    pub fn filters(&self, user_id: &Uuid) -> CoreResult<ContentFilters> {
        Ok(ContentFilters {
            muted: self.list_muted(user_id)?,
            blocked: self.list_blocked(user_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;

    #[test]
    fn test_mute_and_block_are_independent() {
        let db = Database::in_memory().unwrap();
        let service = ContentFilterService::new(&db);
        let alice = insert_user(&db, "alice");
        let bob = insert_user(&db, "bob");

        service.mute(&alice, &bob).unwrap();
        assert!(matches!(
            service.mute(&alice, &bob),
            Err(CoreError::Conflict(ConflictReason::AlreadyMuted))
        ));
        service.block(&alice, &bob).unwrap();
        assert!(matches!(
            service.block(&alice, &bob),
            Err(CoreError::Conflict(ConflictReason::AlreadyBlocked))
        ));
        assert_eq!(service.exclusion_set(&alice).unwrap(), HashSet::from([bob]));

        assert!(service.unmute(&alice, &bob).unwrap());
        assert!(!service.unmute(&alice, &bob).unwrap());
        // still blocked
        assert_eq!(service.exclusion_set(&alice).unwrap().len(), 1);

        let filters = service.filters(&alice).unwrap();
        assert!(filters.muted.is_empty());
        assert_eq!(filters.blocked[0].user.id, bob);
    }

    #[test]
    fn test_self_filter_rejected() {
        let db = Database::in_memory().unwrap();
        let service = ContentFilterService::new(&db);
        let alice = insert_user(&db, "alice");
        assert!(matches!(
            service.block(&alice, &alice),
            Err(CoreError::InvalidState(InvalidReason::SelfTarget))
        ));
        assert!(service.exclusion_set(&alice).unwrap().is_empty());
    }
}
