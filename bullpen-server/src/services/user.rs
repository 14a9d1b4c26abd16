use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use bullpen_types::{FilterType, UpdateProfileRequest, User, UserProfile, ViewerRelationship};

use crate::db::repositories::{ContentFilterRepository, FollowRepository, UserRepository};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult, InvalidReason};

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]{1,30}$").expect("Invalid username regex")
});

const MAX_DISPLAY_NAME_CHARS: usize = 50;
const MAX_BIO_CHARS: usize = 500;

/// Trimmed value, or `None` when blank
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub struct UserService {
    users: UserRepository,
    follows: FollowRepository,
    filters: ContentFilterRepository,
}

impl UserService {
    pub fn new(db: &Database) -> Self {
        Self {
            users: UserRepository::new(db.pool.clone()),
            follows: FollowRepository::new(db.pool.clone()),
            filters: ContentFilterRepository::new(db.pool.clone()),
        }
    }

    /// Return the user row for `id`, creating it on first sight.
    ///
    /// An existing row is returned unchanged. A username already held by a
    /// different id is a conflict.
    pub fn get_or_create(&self, id: &Uuid, username: &str, display_name: &str) -> CoreResult<User> {
        if let Some(user) = self.users.get_by_id(id)? {
            return Ok(user);
        }

        let username = username.trim();
        if !USERNAME_REGEX.is_match(username) {
            return Err(CoreError::InvalidState(InvalidReason::InvalidUsername));
        }
        let display_name = match display_name.trim() {
            "" => username.to_string(),
            name => name.chars().take(MAX_DISPLAY_NAME_CHARS).collect(),
        };

        let user = User {
            id: *id,
            username: username.to_string(),
            display_name,
            bio: None,
            profile_picture_url: None,
            badge: None,
            created_at: Utc::now(),
        };
        if self.users.create(&user)? {
            tracing::info!(user_id = %user.id, username = %user.username, "user created");
            return Ok(user);
        }

        // Lost a race against the same id, or the username belongs to someone else
        match self.users.get_by_id(id)? {
            Some(existing) => Ok(existing),
            None => Err(CoreError::Conflict(ConflictReason::UsernameTaken)),
        }
    }

    /// Apply a partial profile update and return the stored user.
    ///
    /// A blank bio or picture url clears the field. A display name must stay
    /// non-blank and within 50 characters.
    pub fn update_profile(&self, id: &Uuid, request: UpdateProfileRequest) -> CoreResult<User> {
        let mut user = self.get(id)?;

        if let Some(display_name) = request.display_name {
            let display_name = non_blank(&display_name)
                .filter(|name| name.chars().count() <= MAX_DISPLAY_NAME_CHARS)
                .ok_or(CoreError::InvalidState(InvalidReason::InvalidDisplayName))?;
            user.display_name = display_name;
        }
        if let Some(bio) = request.bio {
            let bio = non_blank(&bio);
            if bio.as_ref().is_some_and(|b| b.chars().count() > MAX_BIO_CHARS) {
                return Err(CoreError::InvalidState(InvalidReason::BioTooLong));
            }
            user.bio = bio;
        }
        if let Some(url) = request.profile_picture_url {
            user.profile_picture_url = non_blank(&url);
        }

        if !self.users.update_profile(&user)? {
            return Err(CoreError::NotFound("user"));
        }
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user)
    }

    pub fn get(&self, id: &Uuid) -> CoreResult<User> {
        self.users.get_by_id(id)?.ok_or(CoreError::NotFound("user"))
    }

    pub fn profile(&self, id: &Uuid, viewer_id: Option<&Uuid>) -> CoreResult<UserProfile> {
        let user = self.get(id)?;

        let relationship = match viewer_id {
            Some(viewer) if viewer == id => ViewerRelationship {
                is_self: true,
                ..Default::default()
            },
            Some(viewer) => ViewerRelationship {
                is_self: false,
                following: self.follows.is_following(viewer, id)?,
                followed_by: self.follows.is_following(id, viewer)?,
                muted: self.filters.has(viewer, id, FilterType::Mute)?,
                blocked: self.filters.has(viewer, id, FilterType::Block)?,
            },
            None => ViewerRelationship::default(),
        };

        Ok(UserProfile {
            follower_count: self.follows.follower_count(id)?,
            following_count: self.follows.following_count(id)?,
            post_count: self.users.post_count(id)?,
            id: user.id,
            username: user.username,
            display_name: user.display_name,
            bio: user.bio,
            profile_picture_url: user.profile_picture_url,
            badge: user.badge,
            created_at: user.created_at,
            relationship,
        })
    }
}
