// Twitter/X profile: following and follower counts from the profile links.

use std::time::Duration;

use crate::dom::PageSnapshot;
use crate::plan::{Condition, Readiness};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::{bare, ExtractionStrategy};

const PRIMARY_COLUMN: &str = r#"[data-testid="primaryColumn"]"#;
const FOLLOWING: &str = r#"a[href*="/following"] > span:first-child span"#;
const FOLLOWERS: &str = r#"a[href*="/followers"] > span:first-child span"#;
const VERIFIED_FOLLOWERS: &str = r#"a[href*="/verified_followers"] > span:first-child span"#;

pub struct Twitter;

impl ExtractionStrategy for Twitter {
    fn platform(&self) -> PlatformKind {
        PlatformKind::Microblog
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://twitter.com/{}", bare(handle))
    }

    fn readiness(&self) -> Readiness {
        Readiness::required(Condition::Css(PRIMARY_COLUMN), Duration::from_secs(30))
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let followers = page
            .text_of(FOLLOWERS)
            .or_else(|| page.text_of(VERIFIED_FOLLOWERS));

        let mut raw = RawExtraction::new();
        raw.insert("following", page.text_of(FOLLOWING));
        raw.insert("followers", followers);
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(followers_href: &str) -> String {
        format!(
            r#"<html><body><div data-testid="primaryColumn">
                <a href="/NASA/following"><span><span>186</span></span><span>Following</span></a>
                <a href="{followers_href}"><span><span>84.2M</span></span><span>Followers</span></a>
            </div></body></html>"#
        )
    }

    #[test]
    fn reads_profile_link_counts() {
        let page = PageSnapshot::parse(&profile("/NASA/followers"), "https://twitter.com/NASA");
        let raw = Twitter.extract(&page);
        assert_eq!(raw.get("following"), Some("186"));
        assert_eq!(raw.get("followers"), Some("84.2M"));
    }

    #[test]
    fn falls_back_to_verified_followers() {
        let page = PageSnapshot::parse(
            &profile("/NASA/verified_followers"),
            "https://twitter.com/NASA",
        );
        let raw = Twitter.extract(&page);
        assert_eq!(raw.get("followers"), Some("84.2M"));
    }

    #[test]
    fn extraction_is_repeatable() {
        let html = profile("/NASA/followers");
        let first = Twitter.extract(&PageSnapshot::parse(&html, "https://twitter.com/NASA"));
        let second = Twitter.extract(&PageSnapshot::parse(&html, "https://twitter.com/NASA"));
        assert_eq!(first, second);
    }
}
