//! Batch aggregation of per-post counts and per-viewer flags.
//!
//! Every method runs one grouped query per id set and never fails for ids
//! that have no rows. Post maps hold an entry for every requested id; the
//! comment helpers leave such ids out.

use std::collections::{HashMap, HashSet};

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::params_from_iter;
use uuid::Uuid;

use bullpen_types::{PostStats, UserInteractions};

use crate::db::columns::{count_at, uuid_at};
use crate::db::{placeholders, DbPool};

fn id_values(ids: &[Uuid]) -> Vec<Value> {
    ids.iter().map(|id| Value::Text(id.to_string())).collect()
}

pub struct InteractionRepository {
    pool: DbPool,
}

impl InteractionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn grouped_counts(&self, sql: &str, ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let counts = stmt
            .query_map(params_from_iter(id_values(ids)), |row| {
                Ok((uuid_at(row, 0)?, count_at(row, 1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to aggregate counts")?;
        Ok(counts)
    }

    fn viewer_hits(&self, sql: &str, viewer_id: &Uuid, ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let conn = self.pool.get()?;
        let mut args = vec![Value::Text(viewer_id.to_string())];
        args.extend(id_values(ids));
        let mut stmt = conn.prepare(sql)?;
        let hits = stmt
            .query_map(params_from_iter(args), |row| uuid_at(row, 0))?
            .collect::<Result<HashSet<_>, _>>()
            .context("Failed to load viewer interactions")?;
        Ok(hits)
    }

    /// Likes, live comments and reposts (both kinds) per post
    pub fn stats_for(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, PostStats>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let list = placeholders(post_ids.len());
        let likes = self.grouped_counts(
            &format!("SELECT post_id, COUNT(*) FROM reactions WHERE post_id IN ({list}) GROUP BY post_id"),
            post_ids,
        )?;
        let comments = self.grouped_counts(
            &format!(
                "SELECT post_id, COUNT(*) FROM comments
                 WHERE post_id IN ({list}) AND deleted_at IS NULL GROUP BY post_id"
            ),
            post_ids,
        )?;
        let reposts = self.grouped_counts(
            &format!("SELECT post_id, COUNT(*) FROM reposts WHERE post_id IN ({list}) GROUP BY post_id"),
            post_ids,
        )?;

        Ok(post_ids
            .iter()
            .map(|id| {
                let stats = PostStats {
                    likes: likes.get(id).copied().unwrap_or(0),
                    comments: comments.get(id).copied().unwrap_or(0),
                    reposts: reposts.get(id).copied().unwrap_or(0),
                };
                (*id, stats)
            })
            .collect())
    }

    /// Liked / reposted flags for one viewer. Anonymous viewers get all-false flags.
    pub fn interactions_for(
        &self,
        viewer_id: Option<&Uuid>,
        post_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, UserInteractions>> {
        let Some(viewer_id) = viewer_id else {
            return Ok(post_ids.iter().map(|id| (*id, UserInteractions::default())).collect());
        };
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let list = placeholders(post_ids.len());
        let liked = self.viewer_hits(
            &format!("SELECT DISTINCT post_id FROM reactions WHERE user_id = ? AND post_id IN ({list})"),
            viewer_id,
            post_ids,
        )?;
        let reposted = self.viewer_hits(
            &format!("SELECT DISTINCT post_id FROM reposts WHERE user_id = ? AND post_id IN ({list})"),
            viewer_id,
            post_ids,
        )?;

        Ok(post_ids
            .iter()
            .map(|id| {
                let flags = UserInteractions {
                    liked: liked.contains(id),
                    reposted: reposted.contains(id),
                };
                (*id, flags)
            })
            .collect())
    }

    /// Like counts per comment
    pub fn comment_likes(&self, comment_ids: &[Uuid]) -> Result<HashMap<Uuid, u64>> {
        if comment_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.grouped_counts(
            &format!(
                "SELECT comment_id, COUNT(*) FROM reactions WHERE comment_id IN ({}) GROUP BY comment_id",
                placeholders(comment_ids.len())
            ),
            comment_ids,
        )
    }

    /// Comments the viewer liked
    pub fn comments_liked_by(&self, viewer_id: Option<&Uuid>, comment_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        match viewer_id {
            Some(viewer_id) if !comment_ids.is_empty() => self.viewer_hits(
                &format!(
                    "SELECT DISTINCT comment_id FROM reactions WHERE user_id = ? AND comment_id IN ({})",
                    placeholders(comment_ids.len())
                ),
                viewer_id,
                comment_ids,
            ),
            _ => Ok(HashSet::new()),
        }
    }
}
