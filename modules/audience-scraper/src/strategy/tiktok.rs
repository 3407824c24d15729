// TikTok profile: three counters tagged with data-e2e attributes.

use std::time::Duration;

use crate::dom::PageSnapshot;
use crate::plan::{Condition, Readiness, WaitUntil};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::{bare, ExtractionStrategy};

/// Any post tile means the profile finished rendering.
const POST_ITEM: &str = r#"[data-e2e="user-post-item"]"#;
const FOLLOWING: &str = r#"strong[data-e2e="following-count"]"#;
const FOLLOWERS: &str = r#"strong[data-e2e="followers-count"]"#;
const LIKES: &str = r#"strong[data-e2e="likes-count"]"#;

pub struct TikTok;

impl ExtractionStrategy for TikTok {
    fn platform(&self) -> PlatformKind {
        PlatformKind::ShortVideo
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.tiktok.com/@{}", bare(handle))
    }

    fn readiness(&self) -> Readiness {
        Readiness::required(Condition::Css(POST_ITEM), Duration::from_secs(10))
    }

    fn wait_until(&self) -> WaitUntil {
        WaitUntil::DomContentLoaded
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let mut raw = RawExtraction::new();
        raw.insert("following", page.text_of(FOLLOWING));
        raw.insert("followers", page.text_of(FOLLOWERS));
        raw.insert("likes", page.text_of(LIKES));
        raw
    }
}
