mod bookmark_repository;
mod comment_repository;
mod content_filter_repository;
mod follow_repository;
mod interaction_repository;
mod metrics_repository;
mod poll_repository;
mod post_repository;
mod reaction_repository;
mod recent_search_repository;
mod report_repository;
mod repost_repository;
mod ticker_repository;
pub(crate) mod user_repository;
mod watchlist_repository;

pub use bookmark_repository::BookmarkRepository;
pub use comment_repository::{CommentRecord, CommentRepository, ReplyRecord};
pub use content_filter_repository::ContentFilterRepository;
pub use follow_repository::FollowRepository;
pub use interaction_repository::InteractionRepository;
pub use metrics_repository::MetricsRepository;
pub use poll_repository::{PollRepository, Tally};
pub use post_repository::{PostRecord, PostRepository, TimelineEntry};
pub use reaction_repository::{ReactionRepository, ReactionTarget};
pub use recent_search_repository::RecentSearchRepository;
pub use report_repository::ReportRepository;
pub use repost_repository::RepostRepository;
pub use ticker_repository::TickerRepository;
pub use user_repository::UserRepository;
pub use watchlist_repository::WatchlistRepository;
