use chrono::{DateTime, Duration, Utc};

use bullpen_types::{ActiveUser, EngagementMetrics, TrendingTicker};

use crate::db::repositories::{MetricsRepository, TickerRepository};
use crate::db::Database;
use crate::error::CoreResult;
use crate::pagination::MAX_PER_PAGE;

/// Window used for the "recent mentions" ranking of trending tickers
pub const TRENDING_WINDOW_HOURS: i64 = 24;

fn clamp_limit(limit: Option<i64>, default: u32) -> u32 {
    limit
        .unwrap_or(i64::from(default))
        .clamp(1, i64::from(MAX_PER_PAGE)) as u32
}

pub struct MetricsService {
    metrics: MetricsRepository,
    tickers: TickerRepository,
}

impl MetricsService {
    pub fn new(db: &Database) -> Self {
        Self {
            metrics: MetricsRepository::new(db.pool.clone()),
            tickers: TickerRepository::new(db.pool.clone()),
        }
    }

    pub fn engagement(&self) -> CoreResult<EngagementMetrics> {
        Ok(self.metrics.engagement()?)
    }

    pub fn most_active_users(&self, limit: Option<i64>) -> CoreResult<Vec<ActiveUser>> {
        Ok(self.metrics.most_active_users(clamp_limit(limit, 10))?)
    }

    pub fn trending_tickers(&self, limit: Option<i64>) -> CoreResult<Vec<TrendingTicker>> {
        self.trending_tickers_at(limit, Utc::now())
    }

    pub fn trending_tickers_at(&self, limit: Option<i64>, now: DateTime<Utc>) -> CoreResult<Vec<TrendingTicker>> {
        let since = now - Duration::hours(TRENDING_WINDOW_HOURS);
        Ok(self.tickers.trending(since, clamp_limit(limit, 10))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::post::PostService;
    use crate::db::fixtures::*;
    use bullpen_types::CreatePostRequest;

    #[test]
    fn test_limit_clamping() {
        assert_eq!(clamp_limit(None, 10), 10);
        assert_eq!(clamp_limit(Some(0), 10), 1);
        assert_eq!(clamp_limit(Some(1000), 10), 50);
    }

    #[test]
    fn test_trending_prefers_recent_mentions() {
        let db = Database::in_memory().unwrap();
        let posts = PostService::new(&db);
        let metrics = MetricsService::new(&db);
        let alice = insert_user(&db, "alice");
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();
        let old = now - Duration::days(3);

        let post = |content: &str, at| {
            let request = CreatePostRequest {
                content: content.to_string(),
                ..Default::default()
            };
            posts.create_post_at(&alice, request, at).unwrap();
        };
        post("$AAPL", old);
        post("$AAPL again", old);
        post("$TSLA fresh", now - Duration::hours(1));

        let trending = metrics.trending_tickers_at(Some(5), now).unwrap();
        let symbols: Vec<_> = trending.iter().map(|t| t.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TSLA", "AAPL"]);
        assert_eq!(trending[0].mentions_24h, 1);
        assert_eq!(trending[1].mention_count, 2);
    }
}
