use chrono::Utc;
use uuid::Uuid;

use crate::db::repositories::{BookmarkRepository, PostRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult};

pub struct BookmarkService {
    bookmarks: BookmarkRepository,
    posts: PostRepository,
}

impl BookmarkService {
    pub fn new(db: &Database) -> Self {
        Self {
            bookmarks: BookmarkRepository::new(db.pool.clone()),
            posts: PostRepository::new(db.pool.clone()),
        }
    }

    pub fn add(&self, user_id: &Uuid, post_id: &Uuid) -> CoreResult<()> {
        if self.posts.get_visible(post_id)?.is_none() {
            return Err(CoreError::NotFound("post"));
        }
        if !self.bookmarks.add(user_id, post_id, Utc::now())? {
            return Err(CoreError::Conflict(ConflictReason::AlreadyBookmarked));
        }
        tracing::debug!(user_id = %user_id, post_id = %post_id, "bookmark added");
        Ok(())
    }

    pub fn remove(&self, user_id: &Uuid, post_id: &Uuid) -> CoreResult<bool> {
        Ok(self.bookmarks.remove(user_id, post_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::*;
    use crate::pagination::PageRequest;
    use crate::services::feed::FeedService;

    #[test]
    fn test_bookmark_lifecycle() {
        let db = Database::in_memory().unwrap();
        let service = BookmarkService::new(&db);
        let alice = insert_user(&db, "alice");
        let post = insert_post(&db, alice, "save me");

        service.add(&alice, &post).unwrap();
        assert!(matches!(
            service.add(&alice, &post),
            Err(CoreError::Conflict(ConflictReason::AlreadyBookmarked))
        ));
        let page = FeedService::new(&db).bookmarks(&alice, PageRequest::default()).unwrap();
        assert_eq!(page.data[0].id, post);

        assert!(service.remove(&alice, &post).unwrap());
        assert!(!service.remove(&alice, &post).unwrap());
        assert!(matches!(
            service.add(&alice, &Uuid::new_v4()),
            Err(CoreError::NotFound("post"))
        ));
    }

    #[test]
    fn test_bookmarks_list_latest_bookmark_first() {
        let db = Database::in_memory().unwrap();
        let service = BookmarkService::new(&db);
        let alice = insert_user(&db, "alice");
        let t0 = Utc::now() - chrono::Duration::days(1);
        let old = insert_post_at(&db, alice, "old", t0);
        let new = insert_post_at(&db, alice, "new", t0 + chrono::Duration::hours(1));

        service.add(&alice, &new).unwrap();
        service.add(&alice, &old).unwrap();

        let page = FeedService::new(&db).bookmarks(&alice, PageRequest::default()).unwrap();
        let ids: Vec<Uuid> = page.data.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![old, new]);
    }
}
