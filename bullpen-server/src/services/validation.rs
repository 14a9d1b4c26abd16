use bullpen_types::PollDraft;

use crate::error::{CoreError, CoreResult, InvalidReason};

pub const MAX_CONTENT_CHARS: usize = 10_000;
pub const MIN_POLL_OPTIONS: usize = 2;
pub const MAX_POLL_OPTIONS: usize = 4;
pub const MAX_POLL_DAYS: u32 = 7;

/// Post or comment body after trimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    pub content: String,
    pub media_urls: Option<Vec<String>>,
    pub gif_url: Option<String>,
}

/// Trim text and drop blank attachments. A body needs text, media or a gif.
pub fn validate_body(
    content: &str,
    media_urls: Option<Vec<String>>,
    gif_url: Option<String>,
) -> CoreResult<Body> {
    let content = content.trim().to_string();
    let media_urls = media_urls
        .map(|urls| {
            urls.into_iter()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .collect::<Vec<_>>()
        })
        .filter(|urls| !urls.is_empty());
    let gif_url = gif_url
        .map(|g| g.trim().to_string())
        .filter(|g| !g.is_empty());

    if content.is_empty() && media_urls.is_none() && gif_url.is_none() {
        return Err(CoreError::InvalidState(InvalidReason::EmptyContent));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(CoreError::InvalidState(InvalidReason::ContentTooLong));
    }
    Ok(Body {
        content,
        media_urls,
        gif_url,
    })
}

/// 2-4 non-blank options and a 1-7 day duration
pub fn validate_poll(draft: PollDraft) -> CoreResult<PollDraft> {
    let options: Vec<String> = draft
        .options
        .iter()
        .map(|o| o.trim().to_string())
        .collect();
    let valid = (MIN_POLL_OPTIONS..=MAX_POLL_OPTIONS).contains(&options.len())
        && options.iter().all(|o| !o.is_empty())
        && (1..=MAX_POLL_DAYS).contains(&draft.duration_days);
    if !valid {
        return Err(CoreError::InvalidState(InvalidReason::InvalidPoll));
    }
    Ok(PollDraft {
        options,
        duration_days: draft.duration_days,
    })
}
