use serde::{Deserialize, Serialize};

/// How a post was shared. Normal reposts never own a post row; quote reposts do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepostType {
    Normal,
    Quote,
}

impl RepostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepostType::Normal => "normal",
            RepostType::Quote => "quote",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(RepostType::Normal),
            "quote" => Some(RepostType::Quote),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Mute,
    Block,
}

impl FilterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterType::Mute => "mute",
            FilterType::Block => "block",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mute" => Some(FilterType::Mute),
            "block" => Some(FilterType::Block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TickerKind {
    Stock,
    Crypto,
    Etf,
    #[default]
    Other,
}

impl TickerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TickerKind::Stock => "stock",
            TickerKind::Crypto => "crypto",
            TickerKind::Etf => "etf",
            TickerKind::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "stock" => Some(TickerKind::Stock),
            "crypto" => Some(TickerKind::Crypto),
            "etf" => Some(TickerKind::Etf),
            "other" => Some(TickerKind::Other),
            _ => None,
        }
    }
}

/// Moderation state of a report. New reports are always pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Dismissed => "dismissed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ReportStatus::Pending),
            "reviewed" => Some(ReportStatus::Reviewed),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }
}

/// What a recent search points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecentSearchKind {
    Account,
    #[default]
    Ticker,
}

impl RecentSearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecentSearchKind::Account => "account",
            RecentSearchKind::Ticker => "ticker",
        }
    }

    /// Case-insensitive; anything unrecognised is treated as a ticker search
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "account" => RecentSearchKind::Account,
            _ => RecentSearchKind::Ticker,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "account" => Some(RecentSearchKind::Account),
            "ticker" => Some(RecentSearchKind::Ticker),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repost_type_parse_is_case_insensitive() {
        assert_eq!(RepostType::parse("Quote"), Some(RepostType::Quote));
        assert_eq!(RepostType::parse("NORMAL"), Some(RepostType::Normal));
        assert_eq!(RepostType::parse("boost"), None);
    }

    #[test]
    fn test_repost_type_serializes_lowercase() {
        let json = serde_json::to_string(&RepostType::Quote).unwrap();
        assert_eq!(json, "\"quote\"");
    }

    #[test]
    fn test_filter_type_round_trips_through_str() {
        for kind in [FilterType::Mute, FilterType::Block] {
            assert_eq!(FilterType::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_recent_search_kind_defaults_to_ticker() {
        assert_eq!(RecentSearchKind::parse_lenient(" Account "), RecentSearchKind::Account);
        assert_eq!(RecentSearchKind::parse_lenient("hashtag"), RecentSearchKind::Ticker);
        assert_eq!(RecentSearchKind::parse("hashtag"), None);
    }
}
