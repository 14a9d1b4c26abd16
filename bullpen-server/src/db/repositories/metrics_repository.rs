use anyhow::{Context, Result};

use bullpen_types::{ActiveUser, EngagementMetrics};

use crate::db::columns::{count_at, summary_at, USER_SUMMARY_COLUMNS};
use crate::db::DbPool;

pub struct MetricsRepository {
    pool: DbPool,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl MetricsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Platform-wide totals and per-post averages, computed live
    pub fn engagement(&self) -> Result<EngagementMetrics> {
        let conn = self.pool.get()?;
        let (total_posts, total_comments, total_reactions, total_reposts, users_with_posts) = conn
            .query_row(
                "SELECT
                    (SELECT COUNT(*) FROM posts WHERE deleted_at IS NULL),
                    (SELECT COUNT(*) FROM comments WHERE deleted_at IS NULL),
                    (SELECT COUNT(*) FROM reactions),
                    (SELECT COUNT(*) FROM reposts),
                    (SELECT COUNT(DISTINCT author_id) FROM posts WHERE deleted_at IS NULL)",
                [],
                |row| {
                    Ok((
                        count_at(row, 0)?,
                        count_at(row, 1)?,
                        count_at(row, 2)?,
                        count_at(row, 3)?,
                        count_at(row, 4)?,
                    ))
                },
            )
            .context("Failed to compute engagement metrics")?;

        Ok(EngagementMetrics {
            total_posts,
            total_comments,
            total_reactions,
            total_reposts,
            users_with_posts,
            avg_posts_per_user: ratio(total_posts, users_with_posts),
            avg_comments_per_post: ratio(total_comments, total_posts),
            avg_reactions_per_post: ratio(total_reactions, total_posts),
            avg_reposts_per_post: ratio(total_reposts, total_posts),
        })
    }

    /// Users ranked by live post count, ties broken by id
    pub fn most_active_users(&self, limit: u32) -> Result<Vec<ActiveUser>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_SUMMARY_COLUMNS}, COUNT(p.id) AS post_count
             FROM users u
             JOIN posts p ON p.author_id = u.id AND p.deleted_at IS NULL
             GROUP BY u.id
             ORDER BY post_count DESC, u.id ASC
             LIMIT ?"
        ))?;
        let users = stmt
            .query_map([limit], |row| {
                Ok(ActiveUser {
                    user: summary_at(row, 0)?,
                    post_count: count_at(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to rank active users")?;
        Ok(users)
    }
}
