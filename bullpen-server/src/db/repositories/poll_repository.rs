use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use uuid::Uuid;

use bullpen_types::Poll;

use crate::db::columns::{count_at, opt_uuid_at, time_at, to_db_time, uuid_at};
use crate::db::{insert_unique, placeholders, DbPool};

/// Vote counts per option index
pub type Tally = HashMap<u32, u64>;

const POLL_COLUMNS: &str = "pl.id, pl.post_id, pl.comment_id, pl.options, pl.duration_days, pl.created_at";

fn map_poll(row: &Row) -> rusqlite::Result<Poll> {
    let options: String = row.get(3)?;
    Ok(Poll {
        id: uuid_at(row, 0)?,
        post_id: opt_uuid_at(row, 1)?,
        comment_id: opt_uuid_at(row, 2)?,
        options: serde_json::from_str(&options).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        duration_days: row.get(4)?,
        created_at: time_at(row, 5)?,
    })
}

pub struct PollRepository {
    pool: DbPool,
}

impl PollRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn insert(conn: &Connection, poll: &Poll) -> Result<()> {
        conn.execute(
            "INSERT INTO polls (id, post_id, comment_id, options, duration_days, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                poll.id.to_string(),
                poll.post_id.map(|id| id.to_string()),
                poll.comment_id.map(|id| id.to_string()),
                serde_json::Value::from(poll.options.clone()).to_string(),
                poll.duration_days,
                to_db_time(&poll.created_at),
            ],
        )
        .context("Failed to create poll")?;
        Ok(())
    }

    /// A poll whose parent post or comment is still live
    pub fn get_open_parent(&self, poll_id: &Uuid) -> Result<Option<Poll>> {
        let conn = self.pool.get()?;
        let poll = conn
            .query_row(
                &format!(
                    "SELECT {POLL_COLUMNS}
                     FROM polls pl
                     LEFT JOIN posts p ON p.id = pl.post_id
                     LEFT JOIN comments c ON c.id = pl.comment_id
                     WHERE pl.id = ?
                       AND (pl.post_id IS NULL OR p.deleted_at IS NULL)
                       AND (pl.comment_id IS NULL OR c.deleted_at IS NULL)"
                ),
                [poll_id.to_string()],
                map_poll,
            )
            .optional()
            .context("Failed to load poll")?;
        Ok(poll)
    }

    /// Polls attached to the given posts, keyed by post id
    pub fn for_posts(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Poll>> {
        self.for_parents("post_id", post_ids, |poll| poll.post_id)
    }

    /// Polls attached to the given comments, keyed by comment id
    pub fn for_comments(&self, comment_ids: &[Uuid]) -> Result<HashMap<Uuid, Poll>> {
        self.for_parents("comment_id", comment_ids, |poll| poll.comment_id)
    }

    fn for_parents(
        &self,
        column: &str,
        parent_ids: &[Uuid],
        key: impl Fn(&Poll) -> Option<Uuid>,
    ) -> Result<HashMap<Uuid, Poll>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POLL_COLUMNS} FROM polls pl WHERE pl.{column} IN ({})",
            placeholders(parent_ids.len())
        ))?;
        let polls = stmt
            .query_map(params_from_iter(parent_ids.iter().map(|id| id.to_string())), map_poll)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to load polls")?;
        Ok(polls
            .into_iter()
            .filter_map(|poll| key(&poll).map(|parent| (parent, poll)))
            .collect())
    }

    /// Record a vote. Returns false when the user already voted in this poll.
    pub fn insert_vote(
        &self,
        poll_id: &Uuid,
        user_id: &Uuid,
        option_index: u32,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let conn = self.pool.get()?;
        let inserted = insert_unique(conn.execute(
            "INSERT INTO poll_votes (id, poll_id, user_id, option_index, created_at) VALUES (?, ?, ?, ?, ?)",
            params![
                Uuid::new_v4().to_string(),
                poll_id.to_string(),
                user_id.to_string(),
                option_index,
                to_db_time(&at),
            ],
        ))
        .context("Failed to record poll vote")?;
        Ok(inserted)
    }

    /// Vote counts for each poll, one grouped query for the whole batch
    pub fn tallies(&self, poll_ids: &[Uuid]) -> Result<HashMap<Uuid, Tally>> {
        if poll_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT poll_id, option_index, COUNT(*) FROM poll_votes
             WHERE poll_id IN ({})
             GROUP BY poll_id, option_index",
            placeholders(poll_ids.len())
        ))?;
        let rows = stmt
            .query_map(params_from_iter(poll_ids.iter().map(|id| id.to_string())), |row| {
                Ok((uuid_at(row, 0)?, row.get::<_, u32>(1)?, count_at(row, 2)?))
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to tally poll votes")?;

        let mut tallies: HashMap<Uuid, Tally> = HashMap::new();
        for (poll_id, option_index, count) in rows {
            tallies.entry(poll_id).or_default().insert(option_index, count);
        }
        Ok(tallies)
    }

    /// The option each poll's viewer picked, for polls they voted in
    pub fn votes_by(&self, user_id: &Uuid, poll_ids: &[Uuid]) -> Result<HashMap<Uuid, u32>> {
        if poll_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.pool.get()?;
        let mut args = vec![Value::Text(user_id.to_string())];
        args.extend(poll_ids.iter().map(|id| Value::Text(id.to_string())));
        let mut stmt = conn.prepare(&format!(
            "SELECT poll_id, option_index FROM poll_votes WHERE user_id = ? AND poll_id IN ({})",
            placeholders(poll_ids.len())
        ))?;
        let votes = stmt
            .query_map(params_from_iter(args.iter()), |row| {
                Ok((uuid_at(row, 0)?, row.get::<_, u32>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()
            .context("Failed to load poll votes")?;
        Ok(votes)
    }
}
