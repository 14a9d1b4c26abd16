/// SQL schema for the Bullpen database
/// Creates all tables with proper constraints, foreign keys, and indexes.
///
/// Timestamps are UTC RFC 3339 text with fixed microsecond precision, so text
/// ordering is chronological ordering. Uniqueness invariants live in unique
/// indexes so concurrent duplicate writes fail at the storage layer.
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    display_name TEXT NOT NULL,
    bio TEXT,
    profile_picture_url TEXT,
    badge TEXT CHECK(badge IN ('Verified', 'Public', 'admin') OR badge IS NULL),
    created_at TEXT NOT NULL
);

-- Posts table (quote reposts are posts with original_post_id set)
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL CHECK(length(content) <= 10000),
    media_urls TEXT,
    gif_url TEXT,
    original_post_id TEXT,
    repost_type TEXT CHECK(repost_type IN ('normal', 'quote') OR repost_type IS NULL),
    created_at TEXT NOT NULL,
    deleted_at TEXT,
    CHECK(length(trim(content)) > 0 OR media_urls IS NOT NULL OR gif_url IS NOT NULL),
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (original_post_id) REFERENCES posts(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC);
CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_posts_original ON posts(original_post_id);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL CHECK(length(content) <= 10000),
    media_urls TEXT,
    gif_url TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    deleted_at TEXT,
    CHECK(length(trim(content)) > 0 OR media_urls IS NOT NULL OR gif_url IS NOT NULL),
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_comments_author ON comments(author_id, created_at DESC);

-- Reactions (likes): exactly one target per row
CREATE TABLE IF NOT EXISTS reactions (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    post_id TEXT,
    comment_id TEXT,
    created_at TEXT NOT NULL,
    CHECK((post_id IS NOT NULL AND comment_id IS NULL) OR (post_id IS NULL AND comment_id IS NOT NULL)),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (comment_id) REFERENCES comments(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_user_post ON reactions(user_id, post_id) WHERE post_id IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS idx_reactions_user_comment ON reactions(user_id, comment_id) WHERE comment_id IS NOT NULL;
CREATE INDEX IF NOT EXISTS idx_reactions_post ON reactions(post_id);
CREATE INDEX IF NOT EXISTS idx_reactions_comment ON reactions(comment_id);

-- Reposts: post_id is always the original post
CREATE TABLE IF NOT EXISTS reposts (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    repost_type TEXT NOT NULL CHECK(repost_type IN ('normal', 'quote')),
    quote_content TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_reposts_user_post ON reposts(user_id, post_id);
CREATE INDEX IF NOT EXISTS idx_reposts_post ON reposts(post_id);

-- Follows table (one-way relationships)
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    following_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, following_id),
    CHECK(follower_id <> following_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (following_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_following ON follows(following_id);

-- Mutes and blocks
CREATE TABLE IF NOT EXISTS content_filters (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    filtered_user_id TEXT NOT NULL,
    filter_type TEXT NOT NULL CHECK(filter_type IN ('mute', 'block')),
    created_at TEXT NOT NULL,
    CHECK(user_id <> filtered_user_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (filtered_user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_content_filters_unique ON content_filters(user_id, filtered_user_id, filter_type);

-- Polls hang off exactly one post or comment
CREATE TABLE IF NOT EXISTS polls (
    id TEXT PRIMARY KEY,
    post_id TEXT UNIQUE,
    comment_id TEXT UNIQUE,
    options TEXT NOT NULL CHECK(json_array_length(options) BETWEEN 2 AND 4),
    duration_days INTEGER NOT NULL DEFAULT 1 CHECK(duration_days BETWEEN 1 AND 7),
    created_at TEXT NOT NULL,
    CHECK((post_id IS NOT NULL AND comment_id IS NULL) OR (post_id IS NULL AND comment_id IS NOT NULL)),
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (comment_id) REFERENCES comments(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS poll_votes (
    id TEXT PRIMARY KEY,
    poll_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    option_index INTEGER NOT NULL CHECK(option_index >= 0),
    created_at TEXT NOT NULL,
    FOREIGN KEY (poll_id) REFERENCES polls(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_poll_votes_unique ON poll_votes(poll_id, user_id);

-- Tickers (unique uppercase symbols, created on first mention)
CREATE TABLE IF NOT EXISTS tickers (
    id TEXT PRIMARY KEY,
    symbol TEXT UNIQUE NOT NULL CHECK(symbol = upper(symbol) AND length(symbol) BETWEEN 1 AND 20),
    name TEXT,
    type TEXT NOT NULL DEFAULT 'other' CHECK(type IN ('stock', 'crypto', 'etf', 'other')),
    created_at TEXT NOT NULL
);

-- Post-ticker junction table
CREATE TABLE IF NOT EXISTS post_tickers (
    post_id TEXT NOT NULL,
    ticker_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (post_id, ticker_id),
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (ticker_id) REFERENCES tickers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_post_tickers_ticker ON post_tickers(ticker_id);

-- Bookmarks
CREATE TABLE IF NOT EXISTS bookmarks (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_bookmarks_user_post ON bookmarks(user_id, post_id);

-- Watchlist
CREATE TABLE IF NOT EXISTS watchlist_items (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    ticker_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (ticker_id) REFERENCES tickers(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_watchlist_user_ticker ON watchlist_items(user_id, ticker_id);

-- Content reports: exactly one target per row
CREATE TABLE IF NOT EXISTS reports (
    id TEXT PRIMARY KEY,
    reporter_id TEXT NOT NULL,
    reported_post_id TEXT,
    reported_comment_id TEXT,
    reported_user_id TEXT,
    report_type TEXT NOT NULL CHECK(length(report_type) BETWEEN 1 AND 50),
    reason TEXT CHECK(reason IS NULL OR length(reason) <= 2000),
    status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'reviewed', 'resolved', 'dismissed')),
    created_at TEXT NOT NULL,
    CHECK((reported_post_id IS NOT NULL) + (reported_comment_id IS NOT NULL) + (reported_user_id IS NOT NULL) = 1),
    FOREIGN KEY (reporter_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (reported_post_id) REFERENCES posts(id) ON DELETE SET NULL,
    FOREIGN KEY (reported_comment_id) REFERENCES comments(id) ON DELETE SET NULL,
    FOREIGN KEY (reported_user_id) REFERENCES users(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_reporter ON reports(reporter_id, created_at DESC);
CREATE INDEX IF NOT EXISTS idx_reports_status ON reports(status);

-- Recent searches (accounts and tickers), newest first per user
CREATE TABLE IF NOT EXISTS recent_searches (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    search_type TEXT NOT NULL CHECK(search_type IN ('account', 'ticker')),
    result_id TEXT NOT NULL CHECK(length(result_id) BETWEEN 1 AND 255),
    query TEXT NOT NULL,
    result_display_name TEXT,
    result_image_url TEXT,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_recent_searches_unique ON recent_searches(user_id, search_type, result_id);
CREATE INDEX IF NOT EXISTS idx_recent_searches_user ON recent_searches(user_id, created_at DESC);
"#;

/// Demo data for local development
/// - 4 users (alice, bob, carol, dave)
/// - posts mentioning tickers, one quote repost, one normal repost
/// - likes, a comment, a follow and a poll
pub const DEMO_DATA: &str = r#"
INSERT OR IGNORE INTO users (id, username, display_name, bio, badge, created_at) VALUES
    ('550e8400-e29b-41d4-a716-446655440001', 'alice', 'Alice', 'Long-only, long-winded', 'Verified', '2024-01-01T00:00:00.000000Z'),
    ('550e8400-e29b-41d4-a716-446655440002', 'bob', 'Bob', 'Options degen', NULL, '2024-01-02T00:00:00.000000Z'),
    ('550e8400-e29b-41d4-a716-446655440003', 'carol', 'Carol', 'Crypto since 2013', 'Public', '2024-01-03T00:00:00.000000Z'),
    ('550e8400-e29b-41d4-a716-446655440004', 'dave', 'Dave', NULL, NULL, '2024-01-04T00:00:00.000000Z');

INSERT OR IGNORE INTO tickers (id, symbol, name, type, created_at) VALUES
    ('750e8400-e29b-41d4-a716-446655440001', 'AAPL', 'Apple Inc.', 'stock', '2024-01-05T00:00:00.000000Z'),
    ('750e8400-e29b-41d4-a716-446655440002', 'TSLA', 'Tesla, Inc.', 'stock', '2024-01-05T00:00:00.000000Z'),
    ('750e8400-e29b-41d4-a716-446655440003', 'BTC', 'Bitcoin', 'crypto', '2024-01-05T00:00:00.000000Z');

INSERT OR IGNORE INTO posts (id, author_id, content, media_urls, gif_url, original_post_id, repost_type, created_at) VALUES
    ('650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Bullish on $AAPL and #TSLA!', NULL, NULL, NULL, NULL, '2024-01-10T10:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440002', 'Selling covered calls on $TSLA again', NULL, NULL, NULL, NULL, '2024-01-10T11:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440003', '$BTC halving is priced in. Or is it?', NULL, NULL, NULL, NULL, '2024-01-10T12:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440002', 'interesting', NULL, NULL, '650e8400-e29b-41d4-a716-446655440001', 'quote', '2024-01-10T13:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440004', '', '["https://cdn.example.com/charts/spy.png"]', NULL, NULL, NULL, '2024-01-10T14:00:00.000000Z');

INSERT OR IGNORE INTO post_tickers (post_id, ticker_id, created_at) VALUES
    ('650e8400-e29b-41d4-a716-446655440001', '750e8400-e29b-41d4-a716-446655440001', '2024-01-10T10:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440001', '750e8400-e29b-41d4-a716-446655440002', '2024-01-10T10:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440002', '750e8400-e29b-41d4-a716-446655440002', '2024-01-10T11:00:00.000000Z'),
    ('650e8400-e29b-41d4-a716-446655440003', '750e8400-e29b-41d4-a716-446655440003', '2024-01-10T12:00:00.000000Z');

INSERT OR IGNORE INTO reposts (id, user_id, post_id, repost_type, quote_content, created_at) VALUES
    ('850e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', '650e8400-e29b-41d4-a716-446655440001', 'quote', 'interesting', '2024-01-10T13:00:00.000000Z'),
    ('850e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440003', '650e8400-e29b-41d4-a716-446655440001', 'normal', NULL, '2024-01-10T15:00:00.000000Z');

INSERT OR IGNORE INTO reactions (id, user_id, post_id, comment_id, created_at) VALUES
    ('950e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', '650e8400-e29b-41d4-a716-446655440001', NULL, '2024-01-10T10:30:00.000000Z'),
    ('950e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440003', '650e8400-e29b-41d4-a716-446655440001', NULL, '2024-01-10T10:45:00.000000Z'),
    ('950e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440001', '650e8400-e29b-41d4-a716-446655440003', NULL, '2024-01-10T12:30:00.000000Z');

INSERT OR IGNORE INTO comments (id, post_id, author_id, content, created_at, updated_at) VALUES
    ('a50e8400-e29b-41d4-a716-446655440001', '650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440004', 'What is your price target?', '2024-01-10T10:15:00.000000Z', '2024-01-10T10:15:00.000000Z');

INSERT OR IGNORE INTO follows (follower_id, following_id, created_at) VALUES
    ('550e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440001', '2024-01-06T00:00:00.000000Z'),
    ('550e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440001', '2024-01-06T00:00:00.000000Z');

INSERT OR IGNORE INTO polls (id, post_id, comment_id, options, duration_days, created_at) VALUES
    ('b50e8400-e29b-41d4-a716-446655440001', '650e8400-e29b-41d4-a716-446655440003', NULL, '["Priced in","Not priced in"]', 7, '2024-01-10T12:00:00.000000Z');
"#;
