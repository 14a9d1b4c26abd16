use once_cell::sync::Lazy;
use regex::Regex;

use bullpen_types::TickerKind;

/// Regex pattern for matching ticker mentions
/// Matches: $SYMBOL or #SYMBOL with 1-10 letters, digits or dots, ending on a word boundary
static TICKER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[$#]([A-Za-z0-9.]{1,10})\b").expect("Failed to compile ticker regex")
});

const MAX_SYMBOL_LEN: usize = 20;

/// Symbols classified as crypto when a ticker row is first created
const KNOWN_CRYPTO: &[&str] = &[
    "BTC", "ETH", "SOL", "XRP", "ADA", "DOGE", "DOT", "LTC", "AVAX", "MATIC", "LINK", "BNB",
    "SHIB", "USDT", "USDC", "TRX", "ATOM", "XLM",
];

/// Normalize a raw symbol: uppercase, drop a leading `$`/`#` and a trailing `.US`.
///
/// Returns `None` for symbols that end up empty, too long, or contain
/// characters outside `[A-Z0-9.]`.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_start_matches(['$', '#']);
    let upper = trimmed.to_uppercase();
    let symbol = upper.strip_suffix(".US").unwrap_or(upper.as_str());

    if symbol.len() > MAX_SYMBOL_LEN || !symbol.chars().any(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if !symbol
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '.')
    {
        return None;
    }
    Some(symbol.to_string())
}

/// Extract ticker symbols from post content
///
/// Returns normalized symbols in order of first appearance, without duplicates.
///
/// # Examples
///
/// ```
/// use bullpen_server::ticker::extract_tickers;
/// let tickers = extract_tickers("Bullish on $AAPL and #TSLA! $aapl again");
/// assert_eq!(tickers, vec!["AAPL".to_string(), "TSLA".to_string()]);
/// ```
pub fn extract_tickers(content: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for cap in TICKER_REGEX.captures_iter(content) {
        if let Some(symbol) = normalize_symbol(&cap[1]) {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }
    symbols
}

/// Classify a normalized symbol
pub fn detect_kind(symbol: &str) -> TickerKind {
    if KNOWN_CRYPTO.contains(&symbol) {
        TickerKind::Crypto
    } else {
        TickerKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_dollar_and_hash() {
        let tickers = extract_tickers("Bullish on $AAPL and #TSLA!");
        assert_eq!(tickers, vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn test_extract_uppercases_and_dedups() {
        let tickers = extract_tickers("$nvda $NVDA #Nvda $amd");
        assert_eq!(tickers, vec!["NVDA", "AMD"]);
    }

    #[test]
    fn test_strips_us_suffix() {
        assert_eq!(extract_tickers("$AAPL.US vs $aapl"), vec!["AAPL"]);
    }

    #[test]
    fn test_strips_only_one_us_suffix() {
        assert_eq!(extract_tickers("$A.US.US"), vec!["A.US"]);
        assert_eq!(normalize_symbol("spy.us.us"), Some("SPY.US".to_string()));
    }

    #[test]
    fn test_keeps_inner_dot() {
        assert_eq!(extract_tickers("Buffett owns $BRK.B"), vec!["BRK.B"]);
    }

    #[test]
    fn test_trailing_period_is_not_part_of_symbol() {
        assert_eq!(extract_tickers("I sold $TSLA."), vec!["TSLA"]);
    }

    #[test]
    fn test_no_tickers() {
        assert!(extract_tickers("just vibes, no symbols").is_empty());
        assert!(extract_tickers("a lone $ sign").is_empty());
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" $msft "), Some("MSFT".to_string()));
        assert_eq!(normalize_symbol("#spy.us"), Some("SPY".to_string()));
        assert_eq!(normalize_symbol(".US"), None);
        assert_eq!(normalize_symbol("not a symbol"), None);
        assert_eq!(normalize_symbol(&"A".repeat(21)), None);
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("BTC"), TickerKind::Crypto);
        assert_eq!(detect_kind("AAPL"), TickerKind::Other);
    }

    proptest! {
        #[test]
        fn prop_extracted_symbols_are_normalized_and_unique(content in "[ a-zA-Z0-9$#.!,]{0,120}") {
            let tickers = extract_tickers(&content);
            for (i, symbol) in tickers.iter().enumerate() {
                prop_assert!(!symbol.is_empty() && symbol.len() <= 20);
                prop_assert_eq!(symbol.to_uppercase(), symbol.clone());
                prop_assert!(!tickers[i + 1..].contains(symbol));
            }
        }

        #[test]
        fn prop_mentioned_symbol_is_found(symbol in "[A-Z]{1,5}", prefix in "[ a-z]{0,20}") {
            let content = format!("{prefix} ${symbol} today");
            let tickers = extract_tickers(&content);
            prop_assert!(tickers.contains(&symbol));
        }
    }
}
