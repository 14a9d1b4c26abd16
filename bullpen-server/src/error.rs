use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Failures surfaced by the service layer
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("conflict: {}", .0.as_str())]
    Conflict(ConflictReason),

    #[error("invalid state: {}", .0.as_str())]
    InvalidState(InvalidReason),

    /// Mutation attempted by someone other than the owner
    #[error("permission denied")]
    PermissionDenied,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// A duplicate action under a uniqueness invariant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    AlreadyMuted,
    AlreadyBlocked,
    AlreadyFollowing,
    AlreadyReposted,
    AlreadyVoted,
    AlreadyBookmarked,
    AlreadyInWatchlist,
    UsernameTaken,
}

impl ConflictReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictReason::AlreadyMuted => "already_muted",
            ConflictReason::AlreadyBlocked => "already_blocked",
            ConflictReason::AlreadyFollowing => "already_following",
            ConflictReason::AlreadyReposted => "already_reposted",
            ConflictReason::AlreadyVoted => "already_voted",
            ConflictReason::AlreadyBookmarked => "already_bookmarked",
            ConflictReason::AlreadyInWatchlist => "already_in_watchlist",
            ConflictReason::UsernameTaken => "username_taken",
        }
    }
}

/// A request that is well-formed but not allowed in the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    PollExpired,
    InvalidOption,
    SelfTarget,
    EmptyContent,
    ContentTooLong,
    InvalidPoll,
    InvalidSymbol,
    InvalidUsername,
    InvalidDisplayName,
    BioTooLong,
    InvalidReportTarget,
    InvalidReportType,
    ReasonTooLong,
    InvalidSearch,
}

impl InvalidReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidReason::PollExpired => "poll_expired",
            InvalidReason::InvalidOption => "invalid_option",
            InvalidReason::SelfTarget => "self_target",
            InvalidReason::EmptyContent => "empty_content",
            InvalidReason::ContentTooLong => "content_too_long",
            InvalidReason::InvalidPoll => "invalid_poll",
            InvalidReason::InvalidSymbol => "invalid_symbol",
            InvalidReason::InvalidUsername => "invalid_username",
            InvalidReason::InvalidDisplayName => "invalid_display_name",
            InvalidReason::BioTooLong => "bio_too_long",
            InvalidReason::InvalidReportTarget => "invalid_report_target",
            InvalidReason::InvalidReportType => "invalid_report_type",
            InvalidReason::ReasonTooLong => "reason_too_long",
            InvalidReason::InvalidSearch => "invalid_search",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_reason_strings() {
        assert_eq!(
            CoreError::Conflict(ConflictReason::AlreadyVoted).to_string(),
            "conflict: already_voted"
        );
        assert_eq!(
            CoreError::InvalidState(InvalidReason::PollExpired).to_string(),
            "invalid state: poll_expired"
        );
        assert_eq!(CoreError::NotFound("post").to_string(), "post not found");
    }
}
