use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::enums::{RecentSearchKind, ReportStatus, RepostType, TickerKind};

// Custom serde module for DateTime to ensure RFC3339 string format
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Stored entities
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub badge: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub gif_url: Option<String>,
    /// Quoted post for quote reposts
    #[serde(default)]
    pub original_post_id: Option<Uuid>,
    #[serde(default)]
    pub repost_type: Option<RepostType>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Id that stats and viewer interactions are computed against.
    ///
    /// A normal repost points at the post it shares; everything else,
    /// quote reposts included, is its own first-class post.
    pub fn logical_id(&self) -> Uuid {
        match (self.repost_type, self.original_post_id) {
            (Some(RepostType::Normal), Some(original)) => original,
            _ => self.id,
        }
    }

    pub fn is_quote(&self) -> bool {
        self.repost_type == Some(RepostType::Quote)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub gif_url: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "datetime_format")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repost {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Always the original post, for both repost kinds
    pub post_id: Uuid,
    #[serde(rename = "type")]
    pub repost_type: RepostType,
    #[serde(default)]
    pub quote_content: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    #[serde(default)]
    pub post_id: Option<Uuid>,
    #[serde(default)]
    pub comment_id: Option<Uuid>,
    pub options: Vec<String>,
    pub duration_days: u32,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

impl Poll {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::days(i64::from(self.duration_days))
    }

    /// A poll is finished from its expiry instant onwards.
    pub fn is_finished_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticker {
    pub id: Uuid,
    pub symbol: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TickerKind,
}

// ============================================================================
// Read models
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub profile_picture_url: Option<String>,
    pub badge: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStats {
    pub likes: u64,
    pub comments: u64,
    pub reposts: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInteractions {
    pub liked: bool,
    pub reposted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    pub symbol: String,
    pub name: Option<String>,
}

/// Poll state as seen by one viewer at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollInfo {
    pub poll_id: Uuid,
    pub options: Vec<String>,
    /// Every option index is present, zero when nobody picked it
    pub results: BTreeMap<u32, u64>,
    pub total_votes: u64,
    pub user_vote: Option<u32>,
    pub is_finished: bool,
    #[serde(with = "datetime_format")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoteOutcome {
    pub voted: bool,
    pub option_index: u32,
    pub results: BTreeMap<u32, u64>,
    pub total_votes: u64,
}

/// Read-only copy of another post, embedded in quote reposts and replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub media_urls: Option<Vec<String>>,
    pub gif_url: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A post as rendered in any list (feed, profile, ticker, likes, bookmarks).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedPost {
    pub id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub media_urls: Option<Vec<String>>,
    pub gif_url: Option<String>,
    pub stats: PostStats,
    pub user_interactions: UserInteractions,
    pub tickers: Vec<TickerInfo>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub poll: Option<PollInfo>,
    pub original_post_id: Option<Uuid>,
    pub repost_type: Option<RepostType>,
    pub original_post: Option<PostSnapshot>,
    /// Set on profile timelines when the item is there because the profile user shared it
    #[serde(default)]
    pub reposted_by_profile_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reposted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: UserSummary,
    pub content: String,
    pub media_urls: Option<Vec<String>>,
    pub gif_url: Option<String>,
    pub likes: u64,
    pub liked: bool,
    pub poll: Option<PollInfo>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// A comment on someone's post, listed on its author's profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyItem {
    pub id: Uuid,
    pub content: String,
    pub media_urls: Option<Vec<String>>,
    pub gif_url: Option<String>,
    pub likes: u64,
    pub liked: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub parent_post: PostSnapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerRelationship {
    pub is_self: bool,
    pub following: bool,
    pub followed_by: bool,
    pub muted: bool,
    pub blocked: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub badge: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    pub follower_count: u64,
    pub following_count: u64,
    pub post_count: u64,
    pub relationship: ViewerRelationship,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowEntry {
    pub user: UserSummary,
    #[serde(with = "datetime_format")]
    pub since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilteredUser {
    pub user: UserSummary,
    #[serde(with = "datetime_format")]
    pub filtered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentFilters {
    pub muted: Vec<FilteredUser>,
    pub blocked: Vec<FilteredUser>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionOutcome {
    pub reacted: bool,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowOutcome {
    pub following: bool,
    pub follower_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepostOutcome {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub repost_type: RepostType,
    pub original_post: PostSnapshot,
    pub quote_content: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    /// The new post created for a quote repost
    pub quote_post: Option<FeedPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSummary {
    pub symbol: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TickerKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TickerKind,
    #[serde(with = "datetime_format")]
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTicker {
    pub symbol: String,
    pub name: Option<String>,
    pub mention_count: u64,
    pub mentions_24h: u64,
    pub last_mentioned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveUser {
    pub user: UserSummary,
    pub post_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementMetrics {
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_reactions: u64,
    pub total_reposts: u64,
    pub users_with_posts: u64,
    pub avg_posts_per_user: f64,
    pub avg_comments_per_post: f64,
    pub avg_reactions_per_post: f64,
    pub avg_reposts_per_post: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub reported_post_id: Option<Uuid>,
    pub reported_comment_id: Option<Uuid>,
    pub reported_user_id: Option<Uuid>,
    pub report_type: String,
    pub reason: Option<String>,
    pub status: ReportStatus,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

/// One entry in a user's recent-search history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: RecentSearchKind,
    /// Username or ticker symbol
    pub result_id: String,
    pub query: String,
    pub result_display_name: Option<String>,
    pub result_image_url: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Request/Response types for API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollDraft {
    pub options: Vec<String>,
    pub duration_days: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub gif_url: Option<String>,
    #[serde(default)]
    pub poll: Option<PollDraft>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub gif_url: Option<String>,
    #[serde(default)]
    pub poll: Option<PollDraft>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRepostRequest {
    #[serde(rename = "type")]
    pub repost_type: RepostType,
    #[serde(default)]
    pub quote_content: Option<String>,
    #[serde(default)]
    pub media_urls: Option<Vec<String>>,
    #[serde(default)]
    pub gif_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VoteRequest {
    pub option_index: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BootstrapUserRequest {
    pub username: String,
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddWatchlistRequest {
    pub symbol: String,
}

/// Partial profile update; absent fields are left unchanged
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub display_name: Option<String>,
    /// An empty bio clears it
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

/// Exactly one of the three targets must be set
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateReportRequest {
    #[serde(default)]
    pub reported_post_id: Option<Uuid>,
    #[serde(default)]
    pub reported_comment_id: Option<Uuid>,
    #[serde(default)]
    pub reported_user_id: Option<Uuid>,
    pub report_type: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddRecentSearchRequest {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub result_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub result_display_name: Option<String>,
    #[serde(default)]
    pub result_image_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
    /// Stable machine-readable reason for conflicts and rejected state changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(repost_type: Option<RepostType>, original_post_id: Option<Uuid>) -> Post {
        Post {
            id: Uuid::new_v4(),
            author_id: Uuid::new_v4(),
            content: "gm".to_string(),
            media_urls: None,
            gif_url: None,
            original_post_id,
            repost_type,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_logical_id_of_normal_repost_is_original() {
        let original = Uuid::new_v4();
        let p = post(Some(RepostType::Normal), Some(original));
        assert_eq!(p.logical_id(), original);
    }

    #[test]
    fn test_logical_id_of_quote_repost_is_own_id() {
        let p = post(Some(RepostType::Quote), Some(Uuid::new_v4()));
        assert_eq!(p.logical_id(), p.id);
    }

    #[test]
    fn test_logical_id_of_normal_repost_without_original_is_own_id() {
        let p = post(Some(RepostType::Normal), None);
        assert_eq!(p.logical_id(), p.id);
    }

    #[test]
    fn test_poll_expiry_boundary() {
        let created_at = "2024-03-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let poll = Poll {
            id: Uuid::new_v4(),
            post_id: Some(Uuid::new_v4()),
            comment_id: None,
            options: vec!["A".to_string(), "B".to_string()],
            duration_days: 2,
            created_at,
        };
        let expiry = "2024-03-03T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(poll.expires_at(), expiry);
        assert!(!poll.is_finished_at(expiry - Duration::seconds(1)));
        assert!(poll.is_finished_at(expiry));
    }
}
