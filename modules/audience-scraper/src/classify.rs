// Failure classification: turns page content and errors into a FailureReason
// before any extracted data is trusted.

use crate::error::ScrapeError;
use crate::types::{FailureReason, RawExtraction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockScope {
    /// A blocking phrase always wins, even over extracted metrics.
    Always,
    /// Only consulted when nothing was extracted. For sites whose public
    /// pages always show sign-in chrome.
    WhenEmpty,
}

/// Body text shown by login walls and restricted pages across platforms.
pub const LOGIN_PHRASES: &[&str] = &["Go back", "Log In", "Sign in", "Join now"];

/// Signatures of a login wall or restricted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPolicy {
    pub phrases: &'static [&'static str],
    pub url_markers: &'static [&'static str],
    pub scope: BlockScope,
}

impl BlockPolicy {
    pub const fn none() -> Self {
        Self {
            phrases: &[],
            url_markers: &[],
            scope: BlockScope::Always,
        }
    }

    /// The shared login-wall phrases, always blocking.
    pub const fn login_wall() -> Self {
        Self::always(LOGIN_PHRASES)
    }

    pub const fn always(phrases: &'static [&'static str]) -> Self {
        Self {
            phrases,
            url_markers: &[],
            scope: BlockScope::Always,
        }
    }

    pub const fn when_empty(phrases: &'static [&'static str]) -> Self {
        Self {
            phrases,
            url_markers: &[],
            scope: BlockScope::WhenEmpty,
        }
    }

    pub const fn with_url_markers(mut self, url_markers: &'static [&'static str]) -> Self {
        self.url_markers = url_markers;
        self
    }

    /// The first phrase in the body text or marker in the final URL.
    pub fn marker(&self, body_text: &str, final_url: &str) -> Option<&'static str> {
        self.url_markers
            .iter()
            .find(|m| final_url.contains(**m))
            .or_else(|| self.phrases.iter().find(|p| body_text.contains(**p)))
            .copied()
    }

    /// True when the page is blocked regardless of what extraction would
    /// find, so extraction can be skipped.
    pub fn blocks_unconditionally(&self, body_text: &str, final_url: &str) -> bool {
        self.scope == BlockScope::Always && self.marker(body_text, final_url).is_some()
    }
}

/// What the classifier gets to look at.
pub enum PageSignal<'a> {
    Loaded {
        body_text: &'a str,
        final_url: &'a str,
        extraction: &'a RawExtraction,
        policy: &'a BlockPolicy,
    },
    Failed(&'a ScrapeError),
}

/// `None` means the page looks healthy and its extraction can be used.
pub fn classify(signal: &PageSignal<'_>) -> Option<FailureReason> {
    match signal {
        PageSignal::Loaded {
            body_text,
            final_url,
            extraction,
            policy,
        } => {
            let blocked = policy.marker(body_text, final_url).is_some();
            let empty = extraction.is_empty();
            match policy.scope {
                BlockScope::Always if blocked => Some(FailureReason::AccessRestricted),
                BlockScope::WhenEmpty if blocked && empty => Some(FailureReason::AccessRestricted),
                _ if empty => Some(FailureReason::ElementNotFound),
                _ => None,
            }
        }
        PageSignal::Failed(err) => Some(reason_for_error(err)),
    }
}

fn reason_for_error(err: &ScrapeError) -> FailureReason {
    match err {
        ScrapeError::InvalidInput(_) => FailureReason::InvalidInput,
        ScrapeError::AccessRestricted(_) => FailureReason::AccessRestricted,
        ScrapeError::Timeout(_) => FailureReason::Timeout,
        ScrapeError::ElementNotFound(_) => FailureReason::ElementNotFound,
        ScrapeError::Http { status, .. } => match status {
            401 | 403 | 429 => FailureReason::AccessRestricted,
            404 => FailureReason::ElementNotFound,
            408 | 504 => FailureReason::Timeout,
            _ => FailureReason::UnexpectedError,
        },
        ScrapeError::Browser(e) if e.is_timeout() => FailureReason::Timeout,
        ScrapeError::Browser(_)
        | ScrapeError::Network(_)
        | ScrapeError::Pool(_)
        | ScrapeError::Panicked(_)
        | ScrapeError::Other(_) => FailureReason::UnexpectedError,
    }
}
