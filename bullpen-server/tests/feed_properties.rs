mod common;

use anyhow::Result;
use chrono::Duration;
use uuid::Uuid;

use bullpen_server::error::{ConflictReason, CoreError, InvalidReason};
use bullpen_server::pagination::PageRequest;
use bullpen_server::services::{
    CommentService, ContentFilterService, FeedService, PollService, PostService, ReactionService,
    RepostKind, RepostService,
};
use bullpen_types::{CreateCommentRequest, FeedPost, Paginated};

use common::*;

/// Walk pages from 1 until one comes back empty
fn walk<T>(mut fetch: impl FnMut(PageRequest) -> Result<Paginated<T>>, per_page: i64) -> Result<(Vec<T>, u64)> {
    let mut items = Vec::new();
    let mut total = 0;
    let mut page = 1;
    loop {
        let env = fetch(PageRequest::new(Some(page), Some(per_page)))?;
        total = env.pagination.total;
        if env.data.is_empty() {
            assert!(!env.pagination.has_next);
            break;
        }
        let is_last = items.len() as u64 + env.data.len() as u64 == total;
        assert_eq!(env.pagination.has_next, !is_last, "has_next on page {page}");
        assert_eq!(env.pagination.has_prev, page > 1);
        items.extend(env.data);
        page += 1;
    }
    Ok((items, total))
}

#[tokio::test]
async fn test_excluded_authors_never_appear_in_home_feed() -> Result<()> {
    let db = database()?;
    let viewer = user(&db, "viewer")?;
    let muted = user(&db, "muted")?;
    let blocked = user(&db, "blocked")?;
    let friend = user(&db, "friend")?;

    for i in 0..7 {
        post(&db, &muted, &format!("muted {i}"))?;
        post(&db, &blocked, &format!("blocked {i}"))?;
        post(&db, &friend, &format!("friend {i}"))?;
    }
    let filters = ContentFilterService::new(&db);
    filters.mute(&viewer, &muted)?;
    filters.block(&viewer, &blocked)?;
    let excluded = filters.exclusion_set(&viewer)?;

    let feed = FeedService::new(&db);
    let (items, total) = walk(|page| Ok(feed.home_feed(&viewer, page)?), 4)?;
    assert_eq!(total, 7);
    assert!(items.iter().all(|p| !excluded.contains(&p.author.id)));
    Ok(())
}

#[tokio::test]
async fn test_normal_repost_item_matches_original_item() -> Result<()> {
    let db = database()?;
    let author = user(&db, "author")?;
    let sharer = user(&db, "sharer")?;
    let viewer = user(&db, "viewer")?;

    let original = post(&db, &author, "$NVDA to the moon")?;
    RepostService::new(&db).repost(&sharer, &original.id, RepostKind::Normal)?;
    ReactionService::new(&db).toggle_post_reaction(&viewer, &original.id)?;
    CommentService::new(&db).create_comment(
        &original.id,
        &viewer,
        CreateCommentRequest {
            content: "agreed".to_string(),
            ..Default::default()
        },
    )?;

    let canonical = PostService::new(&db).get_post(&original.id, Some(&viewer))?;
    let profile = FeedService::new(&db).profile_timeline(&sharer, Some(&viewer), PageRequest::default())?;
    let shared: &FeedPost = profile
        .data
        .iter()
        .find(|p| p.reposted_by_profile_user)
        .expect("repost on sharer's profile");

    assert_eq!(shared.id, canonical.id);
    assert_eq!(shared.stats, canonical.stats);
    assert_eq!(shared.user_interactions, canonical.user_interactions);
    assert_eq!(canonical.stats.likes, 1);
    assert_eq!(canonical.stats.comments, 1);
    assert_eq!(canonical.stats.reposts, 1);
    Ok(())
}

#[tokio::test]
async fn test_page_walks_sum_to_total() -> Result<()> {
    let db = database()?;
    let alice = user(&db, "alice")?;
    let bob = user(&db, "bob")?;
    let start = t0();

    let mut alice_posts = Vec::new();
    for i in 0..11 {
        let at = start + Duration::minutes(i);
        alice_posts.push(post_at(&db, &alice, &format!("post {i} $SPY"), at)?);
    }
    let reposts = RepostService::new(&db);
    for (i, p) in alice_posts.iter().take(4).enumerate() {
        let at = start + Duration::hours(1) + Duration::minutes(i as i64);
        reposts.repost_at(&bob, &p.id, RepostKind::Normal, at)?;
    }
    post_at(&db, &bob, "bob's own", start)?;

    let feed = FeedService::new(&db);
    for per_page in [1, 3, 5, 50] {
        let (home, total) = walk(|page| Ok(feed.home_feed(&alice, page)?), per_page)?;
        assert_eq!(home.len() as u64, total);
        assert_eq!(total, 12);

        let (profile, total) = walk(|page| Ok(feed.profile_timeline(&bob, None, page)?), per_page)?;
        assert_eq!(profile.len() as u64, total);
        assert_eq!(total, 5);
        // reposts happened after bob's own post
        assert!(profile[..4].iter().all(|p| p.reposted_by_profile_user));

        let (ticker, total) = walk(|page| Ok(feed.ticker_timeline("SPY", None, page)?), per_page)?;
        assert_eq!(ticker.len() as u64, total);
        assert_eq!(total, 11);
    }

    let ids: Vec<Uuid> = walk(|page| Ok(feed.home_feed(&alice, page)?), 2)?
        .0
        .into_iter()
        .map(|p| p.id)
        .collect();
    let mut unique = ids.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), ids.len(), "no item repeats across pages");
    Ok(())
}

#[tokio::test]
async fn test_like_toggle_returns_to_start() -> Result<()> {
    let db = database()?;
    let alice = user(&db, "alice")?;
    let bob = user(&db, "bob")?;
    let carol = user(&db, "carol")?;
    let p = post(&db, &alice, "gm")?;
    let reactions = ReactionService::new(&db);
    reactions.toggle_post_reaction(&carol, &p.id)?;
    let before = PostService::new(&db).get_post(&p.id, None)?.stats.likes;

    let liked = reactions.toggle_post_reaction(&bob, &p.id)?;
    let unliked = reactions.toggle_post_reaction(&bob, &p.id)?;
    let again = reactions.toggle_post_reaction(&bob, &p.id)?;

    assert!(liked.reacted && !unliked.reacted && again.reacted);
    assert_eq!(unliked.count, before);
    assert_eq!(again.count, liked.count);
    assert_eq!(again.count, before + 1);
    Ok(())
}

#[tokio::test]
async fn test_second_vote_conflicts_and_keeps_tally() -> Result<()> {
    let db = database()?;
    let alice = user(&db, "alice")?;
    let created = poll_post_at(&db, &alice, &["A", "B", "C"], 2, t0())?;
    let poll_id = created.poll.expect("poll").poll_id;
    let polls = PollService::new(&db);
    let at = t0() + Duration::hours(3);

    polls.vote_at(&poll_id, &alice, 1, at)?;
    let before = polls.results_at(&poll_id, Some(&alice), at)?;
    for option in [0, 1, 2] {
        let err = polls.vote_at(&poll_id, &alice, option, at).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(ConflictReason::AlreadyVoted)));
    }
    let after = polls.results_at(&poll_id, Some(&alice), at)?;
    assert_eq!(before, after);
    assert_eq!(after.total_votes, 1);
    Ok(())
}

#[tokio::test]
async fn test_poll_expiry_is_monotonic() -> Result<()> {
    let db = database()?;
    let alice = user(&db, "alice")?;
    let created = poll_post_at(&db, &alice, &["yes", "no"], 3, t0())?;
    let poll = created.poll.expect("poll");
    let polls = PollService::new(&db);
    let expiry = t0() + Duration::days(3);
    assert_eq!(poll.expires_at, expiry);

    let offsets = [-72 * 60, -60, -1, 0, 1, 60, 24 * 60];
    for minutes in offsets {
        let at = expiry + Duration::minutes(minutes);
        let info = polls.results_at(&poll.poll_id, None, at)?;
        assert_eq!(info.is_finished, at >= expiry, "at offset {minutes}m");
    }

    let err = polls.vote_at(&poll.poll_id, &alice, 0, expiry).unwrap_err();
    assert!(matches!(err, CoreError::InvalidState(InvalidReason::PollExpired)));
    Ok(())
}
