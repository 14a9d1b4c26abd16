mod common;

use anyhow::Result;
use chrono::Duration;

use bullpen_server::db::repositories::{PostRepository, RepostRepository};
use bullpen_server::error::{ConflictReason, CoreError, InvalidReason};
use bullpen_server::pagination::PageRequest;
use bullpen_server::services::{
    ContentFilterService, FeedService, PollService, PostService, RepostKind, RepostService,
};
use bullpen_types::RepostType;

use common::*;

#[tokio::test]
async fn test_tickers_extracted_and_linked_on_create() -> Result<()> {
    let db = database()?;
    let u1 = user(&db, "u1")?;

    let p = post(&db, &u1, "Bullish on $AAPL and #TSLA!")?;
    let symbols: Vec<_> = p.tickers.iter().map(|t| t.symbol.clone()).collect();
    assert_eq!(symbols, vec!["AAPL", "TSLA"]);

    let feed = FeedService::new(&db);
    for symbol in ["AAPL", "$tsla"] {
        let page = feed.ticker_timeline(symbol, None, PageRequest::default())?;
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, p.id);
    }
    Ok(())
}

#[tokio::test]
async fn test_normal_repost_shows_on_reposter_profile_only() -> Result<()> {
    let db = database()?;
    let u1 = user(&db, "u1")?;
    let u2 = user(&db, "u2")?;
    let p = post(&db, &u1, "original thought")?;

    RepostService::new(&db).repost(&u2, &p.id, RepostKind::Normal)?;

    let feed = FeedService::new(&db);
    let u2_profile = feed.profile_timeline(&u2, None, PageRequest::default())?;
    assert_eq!(u2_profile.data.len(), 1);
    assert_eq!(u2_profile.data[0].id, p.id);
    assert!(u2_profile.data[0].reposted_by_profile_user);
    assert!(u2_profile.data[0].reposted_at.is_some());

    let u1_profile = feed.profile_timeline(&u1, None, PageRequest::default())?;
    assert_eq!(u1_profile.pagination.total, 1);
    assert!(!u1_profile.data[0].reposted_by_profile_user);
    Ok(())
}

#[tokio::test]
async fn test_quote_repost_create_and_undo() -> Result<()> {
    let db = database()?;
    let u1 = user(&db, "u1")?;
    let u2 = user(&db, "u2")?;
    let p = post(&db, &u1, "original thought")?;
    let reposts = RepostService::new(&db);

    let outcome = reposts.repost(
        &u2,
        &p.id,
        RepostKind::Quote {
            content: "interesting".to_string(),
            media_urls: None,
            gif_url: None,
        },
    )?;
    let q = outcome.quote_post.expect("quote post");
    assert_eq!(q.original_post_id, Some(p.id));
    assert_eq!(q.repost_type, Some(RepostType::Quote));
    assert_eq!(q.content, "interesting");

    // The quote is a post on u2's profile, and not on u1's
    let feed = FeedService::new(&db);
    let u2_profile = feed.profile_timeline(&u2, None, PageRequest::default())?;
    assert_eq!(u2_profile.data[0].id, q.id);
    assert!(!u2_profile.data[0].reposted_by_profile_user);
    let u1_profile = feed.profile_timeline(&u1, None, PageRequest::default())?;
    assert!(u1_profile.data.iter().all(|item| item.id != q.id));

    assert!(reposts.undo_repost(&u2, &p.id)?);
    let posts = PostRepository::new(db.pool.clone());
    let quote_row = posts.get(&q.id)?.expect("quote row kept");
    assert!(quote_row.deleted_at.is_some());
    assert!(posts.get(&p.id)?.expect("original").deleted_at.is_none());
    assert!(RepostRepository::new(db.pool.clone()).find(&u2, &p.id)?.is_none());

    let original = PostService::new(&db).get_post(&p.id, None)?;
    assert_eq!(original.stats.reposts, 0);
    Ok(())
}

#[tokio::test]
async fn test_mute_hides_feed_but_not_profile() -> Result<()> {
    let db = database()?;
    let u1 = user(&db, "u1")?;
    let u2 = user(&db, "u2")?;
    let loud = post(&db, &u2, "LOUD OPINIONS")?;
    let feed = FeedService::new(&db);

    let before = feed.home_feed(&u1, PageRequest::default())?;
    assert!(before.data.iter().any(|p| p.id == loud.id));

    ContentFilterService::new(&db).mute(&u1, &u2)?;

    let after = feed.home_feed(&u1, PageRequest::default())?;
    assert!(after.data.iter().all(|p| p.author.id != u2));
    let profile = feed.profile_timeline(&u2, Some(&u1), PageRequest::default())?;
    assert_eq!(profile.data[0].id, loud.id);
    Ok(())
}

#[tokio::test]
async fn test_poll_lifecycle() -> Result<()> {
    let db = database()?;
    let u1 = user(&db, "u1")?;
    let u2 = user(&db, "u2")?;
    let created = poll_post_at(&db, &u1, &["A", "B"], 1, t0())?;
    let poll_id = created.poll.expect("poll").poll_id;
    let polls = PollService::new(&db);

    let outcome = polls.vote_at(&poll_id, &u1, 0, t0() + Duration::hours(1))?;
    assert_eq!(outcome.option_index, 0);
    assert_eq!(outcome.total_votes, 1);

    let again = polls.vote_at(&poll_id, &u1, 1, t0() + Duration::hours(2)).unwrap_err();
    assert!(matches!(again, CoreError::Conflict(ConflictReason::AlreadyVoted)));

    let late = t0() + Duration::hours(25);
    let expired = polls.vote_at(&poll_id, &u2, 1, late).unwrap_err();
    assert!(matches!(expired, CoreError::InvalidState(InvalidReason::PollExpired)));

    let results = polls.results_at(&poll_id, Some(&u1), late)?;
    assert!(results.is_finished);
    assert_eq!(results.user_vote, Some(0));
    assert_eq!(results.results.get(&0), Some(&1));
    assert_eq!(results.results.get(&1), Some(&0));
    Ok(())
}
