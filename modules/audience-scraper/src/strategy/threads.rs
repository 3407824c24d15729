// Threads profile. The follower count is only reachable by its label text.

use std::time::Duration;

use crate::dom::{element_text, PageSnapshot, TextQuery};
use crate::normalize::normalize;
use crate::plan::{Condition, Readiness, WaitUntil};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::{bare, ExtractionStrategy};

/// `//span[contains(text(), 'followers')]/..`
const FOLLOWERS: TextQuery = TextQuery {
    tag: "span",
    needles: &["followers"],
    ascend: 1,
};

pub struct Threads;

impl ExtractionStrategy for Threads {
    fn platform(&self) -> PlatformKind {
        PlatformKind::FederatedText
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.threads.net/@{}", bare(handle))
    }

    fn readiness(&self) -> Readiness {
        Readiness::required(Condition::Text(FOLLOWERS), Duration::from_secs(45))
    }

    fn wait_until(&self) -> WaitUntil {
        WaitUntil::DomContentLoaded
    }

    fn scroll_to(&self) -> Option<i64> {
        Some(150)
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let mut raw = RawExtraction::new();
        raw.insert("followers", page.find(&FOLLOWERS).map(element_text));
        raw
    }

    /// "1.7M followers" → the leading token only.
    fn clean(&self, _metric: &str, raw: &str) -> Option<u64> {
        raw.split_whitespace().next().and_then(normalize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_follower_label_parent() {
        let page = PageSnapshot::parse(
            r#"<html><body><div><span>1.7M followers</span></div></body></html>"#,
            "https://www.threads.net/@zuck",
        );
        let raw = Threads.extract(&page);
        assert_eq!(raw.get("followers"), Some("1.7M followers"));
        assert_eq!(Threads.clean("followers", "1.7M followers"), Some(1_700_000));
    }

    #[test]
    fn clean_uses_first_token_only() {
        assert_eq!(Threads.clean("followers", "3,210 followers"), Some(3_210));
        assert_eq!(Threads.clean("followers", "N/A"), None);
        assert_eq!(Threads.clean("followers", ""), None);
    }

    #[test]
    fn plan_scrolls_before_waiting() {
        let plan = Threads.load_plan("zuck");
        assert_eq!(plan.scroll_to, Some(150));
        assert_eq!(plan.wait_until, WaitUntil::DomContentLoaded);
        assert_eq!(plan.budget(), Duration::from_secs(30 + 45 + 5));
    }
}
