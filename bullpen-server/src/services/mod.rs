pub mod bookmark;
pub mod comment;
pub mod content_filter;
pub mod feed;
pub mod follow;
pub mod metrics;
pub mod poll;
pub mod post;
pub mod reaction;
pub mod recent_search;
pub mod report;
pub mod repost;
pub mod search;
pub mod user;
pub mod validation;
pub mod watchlist;

pub use bookmark::BookmarkService;
pub use comment::CommentService;
pub use content_filter::ContentFilterService;
pub use feed::{FeedAssembler, FeedService};
pub use follow::FollowService;
pub use metrics::MetricsService;
pub use poll::PollService;
pub use post::PostService;
pub use reaction::ReactionService;
pub use recent_search::RecentSearchService;
pub use report::ReportService;
pub use repost::{RepostKind, RepostService};
pub use search::SearchService;
pub use user::UserService;
pub use watchlist::WatchlistService;
