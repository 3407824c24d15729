// Per-platform extraction strategies. Each one knows where a profile lives,
// what to wait for, and where the counts sit in the DOM.

mod facebook;
mod instagram;
mod linkedin;
mod threads;
mod tiktok;
mod twitter;
mod youtube;

use std::time::Duration;

use crate::classify::BlockPolicy;
use crate::dom::PageSnapshot;
use crate::normalize::normalize_metric;
use crate::plan::{LoadPlan, Readiness, Transport, WaitUntil, DEFAULT_NAVIGATION_TIMEOUT};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

pub use facebook::{FacebookGroup, FacebookPage};
pub use instagram::Instagram;
pub use linkedin::LinkedIn;
pub use threads::Threads;
pub use tiktok::TikTok;
pub use twitter::Twitter;
pub use youtube::YouTube;

pub trait ExtractionStrategy: Send + Sync {
    fn platform(&self) -> PlatformKind;

    /// Profile URL for an already validated handle.
    fn build_url(&self, handle: &str) -> String;

    fn readiness(&self) -> Readiness;

    /// Pull raw metric text from a loaded page. Must not depend on anything
    /// but the snapshot, so identical pages give identical extractions.
    fn extract(&self, page: &PageSnapshot) -> RawExtraction;

    fn transport(&self) -> Transport {
        Transport::Browser
    }

    fn wait_until(&self) -> WaitUntil {
        WaitUntil::NetworkIdle2
    }

    fn navigation_timeout(&self) -> Duration {
        DEFAULT_NAVIGATION_TIMEOUT
    }

    /// Vertical scroll offset applied before waiting, for lazily loaded pages.
    fn scroll_to(&self) -> Option<i64> {
        None
    }

    fn incognito(&self) -> bool {
        false
    }

    fn block_policy(&self) -> BlockPolicy {
        BlockPolicy::login_wall()
    }

    /// Raw text → integer. Defaults to the shared metric normalizer.
    fn clean(&self, _metric: &str, raw: &str) -> Option<u64> {
        normalize_metric(raw)
    }

    fn load_plan(&self, handle: &str) -> LoadPlan {
        LoadPlan {
            url: self.build_url(handle),
            transport: self.transport(),
            wait_until: self.wait_until(),
            navigation_timeout: self.navigation_timeout(),
            scroll_to: self.scroll_to(),
            readiness: self.readiness(),
            incognito: self.incognito(),
        }
    }
}

/// The single strategy for a platform.
pub fn strategy_for(kind: PlatformKind) -> &'static dyn ExtractionStrategy {
    match kind {
        PlatformKind::VideoHost => &YouTube,
        PlatformKind::PhotoNetwork => &Instagram,
        PlatformKind::Microblog => &Twitter,
        PlatformKind::ShortVideo => &TikTok,
        PlatformKind::SocialPage => &FacebookPage,
        PlatformKind::SocialGroup => &FacebookGroup,
        PlatformKind::ProfessionalNetwork => &LinkedIn,
        PlatformKind::FederatedText => &Threads,
    }
}

/// Handle without a leading `@`, for platforms that add their own.
fn bare(handle: &str) -> &str {
    handle.trim_start_matches('@')
}
