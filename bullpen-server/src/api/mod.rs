pub mod auth;
pub mod comments;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod polls;
pub mod posts;
pub mod reports;
pub mod search;
pub mod tickers;
pub mod users;

pub use error::{ApiError, ApiResult};

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::pagination::PageRequest;
use crate::state::AppState;

/// `page` / `per_page` query parameters accepted by every list endpoint
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        PageRequest::new(query.page, query.per_page)
    }
}

/// Body returned by removals that succeed whether or not a row existed
#[derive(Debug, Serialize, Deserialize)]
pub struct RemovedResponse {
    pub removed: bool,
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        // Users
        .route("/users/me", post(auth::bootstrap_user).patch(users::update_me))
        .route("/users/:id", get(users::get_profile))
        .route("/users/:id/posts", get(users::get_posts))
        .route("/users/:id/replies", get(users::get_replies))
        .route("/users/:id/likes", get(users::get_likes))
        .route("/users/:id/follow", post(users::follow).delete(users::unfollow))
        .route("/users/:id/followers", get(users::get_followers))
        .route("/users/:id/following", get(users::get_following))
        .route("/users/:id/mute", post(users::mute).delete(users::unmute))
        .route("/users/:id/block", post(users::block).delete(users::unblock))
        .route("/me/filters", get(users::get_filters))
        .route("/me/bookmarks", get(users::get_bookmarks))
        .route(
            "/me/recent-searches",
            get(search::get_recent_searches)
                .post(search::add_recent_search)
                .delete(search::clear_recent_searches),
        )
        .route("/me/recent-searches/:id", delete(search::remove_recent_search))
        // Posts
        .route("/feed", get(feed::home_feed))
        .route("/posts", post(posts::create_post))
        .route("/posts/:id", get(posts::get_post).delete(posts::delete_post))
        .route("/posts/:id/reactions", post(posts::toggle_reaction))
        .route("/posts/:id/reposts", post(posts::repost).delete(posts::undo_repost))
        .route("/posts/:id/bookmark", post(posts::bookmark).delete(posts::unbookmark))
        .route("/posts/:id/comments", get(comments::list_comments).post(comments::create_comment))
        .route("/comments/:id", delete(comments::delete_comment))
        .route("/comments/:id/reactions", post(comments::toggle_reaction))
        // Polls
        .route("/polls/:id/votes", post(polls::vote))
        .route("/polls/:id/results", get(polls::get_results))
        // Tickers
        .route("/tickers/trending", get(tickers::get_trending))
        .route("/tickers/:symbol/posts", get(tickers::get_ticker_posts))
        .route("/watchlist", get(tickers::get_watchlist).post(tickers::add_to_watchlist))
        .route("/watchlist/:symbol", delete(tickers::remove_from_watchlist))
        // Search and metrics
        .route("/search/users", get(search::search_users))
        .route("/search/tickers", get(search::search_tickers))
        // Moderation
        .route("/reports", get(reports::list_reports).post(reports::create_report))
        .route("/metrics/engagement", get(metrics::get_engagement))
        .route("/metrics/active-users", get(metrics::get_active_users))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn health_check() -> &'static str {
    "OK"
}
