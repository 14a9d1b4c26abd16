//! Poll engine: vote recording, expiry and tallies.
//!
//! A poll is open until `created_at + duration_days` and finished from that
//! instant on. Expiry is recomputed on every read, so state only ever moves
//! from open to finished.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bullpen_types::{Poll, PollInfo, VoteOutcome};

use crate::db::repositories::{PollRepository, Tally};
use crate::db::Database;
use crate::error::{ConflictReason, CoreError, CoreResult, InvalidReason};

/// Every option index present, zero when nobody picked it
fn results_by_option(poll: &Poll, tally: Option<&Tally>) -> (BTreeMap<u32, u64>, u64) {
    let mut results = BTreeMap::new();
    let mut total = 0;
    for index in 0..poll.options.len() as u32 {
        let count = tally.and_then(|t| t.get(&index)).copied().unwrap_or(0);
        total += count;
        results.insert(index, count);
    }
    (results, total)
}

pub(crate) fn poll_info(
    poll: &Poll,
    tally: Option<&Tally>,
    user_vote: Option<u32>,
    now: DateTime<Utc>,
) -> PollInfo {
    let (results, total_votes) = results_by_option(poll, tally);
    PollInfo {
        poll_id: poll.id,
        options: poll.options.clone(),
        results,
        total_votes,
        user_vote,
        is_finished: poll.is_finished_at(now),
        expires_at: poll.expires_at(),
    }
}

pub struct PollService {
    polls: PollRepository,
}

impl PollService {
    pub fn new(db: &Database) -> Self {
        Self {
            polls: PollRepository::new(db.pool.clone()),
        }
    }

    pub fn vote(&self, poll_id: &Uuid, user_id: &Uuid, option_index: i64) -> CoreResult<VoteOutcome> {
        self.vote_at(poll_id, user_id, option_index, Utc::now())
    }

    /// Cast a vote as of `now`
    pub fn vote_at(
        &self,
        poll_id: &Uuid,
        user_id: &Uuid,
        option_index: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<VoteOutcome> {
        let poll = self
            .polls
            .get_open_parent(poll_id)?
            .ok_or(CoreError::NotFound("poll"))?;

        if poll.is_finished_at(now) {
            return Err(CoreError::InvalidState(InvalidReason::PollExpired));
        }
        let option_index = u32::try_from(option_index)
            .ok()
            .filter(|i| (*i as usize) < poll.options.len())
            .ok_or(CoreError::InvalidState(InvalidReason::InvalidOption))?;

        if !self.polls.insert_vote(&poll.id, user_id, option_index, now)? {
            return Err(CoreError::Conflict(ConflictReason::AlreadyVoted));
        }
        tracing::info!(poll_id = %poll.id, user_id = %user_id, option_index, "poll vote recorded");

        let tallies = self.polls.tallies(&[poll.id])?;
        let (results, total_votes) = results_by_option(&poll, tallies.get(&poll.id));
        Ok(VoteOutcome {
            voted: true,
            option_index,
            results,
            total_votes,
        })
    }

    pub fn results(&self, poll_id: &Uuid, viewer_id: Option<&Uuid>) -> CoreResult<PollInfo> {
        self.results_at(poll_id, viewer_id, Utc::now())
    }

    /// Poll state for one viewer as of `now`
    pub fn results_at(
        &self,
        poll_id: &Uuid,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> CoreResult<PollInfo> {
        let poll = self
            .polls
            .get_open_parent(poll_id)?
            .ok_or(CoreError::NotFound("poll"))?;
        let infos = self.infos(HashMap::from([(poll.id, poll)]), viewer_id, now)?;
        infos
            .into_values()
            .next()
            .ok_or(CoreError::NotFound("poll"))
    }

    /// Poll state for a batch of polls keyed by parent id, with one tally
    /// query and one viewer-vote query for the whole batch
    pub fn infos(
        &self,
        polls: HashMap<Uuid, Poll>,
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<Uuid, PollInfo>> {
        if polls.is_empty() {
            return Ok(HashMap::new());
        }
        let poll_ids: Vec<Uuid> = polls.values().map(|p| p.id).collect();
        let tallies = self.polls.tallies(&poll_ids)?;
        let votes = match viewer_id {
            Some(viewer) => self.polls.votes_by(viewer, &poll_ids)?,
            None => HashMap::new(),
        };

        Ok(polls
            .into_iter()
            .map(|(parent, poll)| {
                let info = poll_info(
                    &poll,
                    tallies.get(&poll.id),
                    votes.get(&poll.id).copied(),
                    now,
                );
                (parent, info)
            })
            .collect())
    }

    pub fn for_posts(
        &self,
        post_ids: &[Uuid],
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<Uuid, PollInfo>> {
        let polls = self.polls.for_posts(post_ids)?;
        self.infos(polls, viewer_id, now)
    }

    pub fn for_comments(
        &self,
        comment_ids: &[Uuid],
        viewer_id: Option<&Uuid>,
        now: DateTime<Utc>,
    ) -> anyhow::Result<HashMap<Uuid, PollInfo>> {
        let polls = self.polls.for_comments(comment_ids)?;
        self.infos(polls, viewer_id, now)
    }
}
