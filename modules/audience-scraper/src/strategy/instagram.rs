// Instagram profile: counts come from the server-rendered meta description,
// so a plain HTTP fetch is enough.
//
// "1,234 Followers, 56 Following, 78 Posts - See Instagram photos and videos from ..."

use crate::classify::BlockPolicy;
use crate::dom::PageSnapshot;
use crate::plan::{Readiness, Transport};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::{bare, ExtractionStrategy};

pub struct Instagram;

impl ExtractionStrategy for Instagram {
    fn platform(&self) -> PlatformKind {
        PlatformKind::PhotoNetwork
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.instagram.com/{}/", bare(handle))
    }

    fn readiness(&self) -> Readiness {
        Readiness::none()
    }

    fn transport(&self) -> Transport {
        Transport::Http
    }

    fn block_policy(&self) -> BlockPolicy {
        BlockPolicy::login_wall().with_url_markers(&["/accounts/login"])
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let description = page.meta_content("description").unwrap_or_default();
        let stats = description
            .split('·')
            .next()
            .and_then(|s| s.split('-').next())
            .map(str::trim)
            .unwrap_or_default();

        let parts: Vec<&str> = stats.split(", ").collect();
        let part = |i: usize, label: &str| {
            parts
                .get(i)
                .map(|p| p.replace(label, "").trim().to_string())
        };

        let mut raw = RawExtraction::new();
        raw.insert("followers", part(0, " Followers"));
        raw.insert("following", part(1, " Following"));
        if parts.len() > 2 {
            raw.insert("posts", part(2, " Posts"));
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(description: &str) -> PageSnapshot {
        PageSnapshot::parse(
            &format!(r#"<html><head><meta name="description" content="{description}"></head><body></body></html>"#),
            "https://www.instagram.com/nasa/",
        )
    }

    #[test]
    fn splits_meta_description() {
        let page = profile(
            "97M Followers, 81 Following, 4,290 Posts - See Instagram photos and videos from NASA (@nasa)",
        );
        let raw = Instagram.extract(&page);
        assert_eq!(raw.get("followers"), Some("97M"));
        assert_eq!(raw.get("following"), Some("81"));
        assert_eq!(raw.get("posts"), Some("4,290"));
        assert_eq!(Instagram.clean("followers", "97M"), Some(97_000_000));
    }

    #[test]
    fn middle_dot_prefix_is_cut_first() {
        let page = profile("1,234 Followers, 56 Following · Photographer - Berlin");
        let raw = Instagram.extract(&page);
        assert_eq!(raw.get("followers"), Some("1,234"));
        assert_eq!(raw.get("following"), Some("56"));
        assert_eq!(raw.get("posts"), None);
    }

    #[test]
    fn missing_description_is_empty() {
        let page = PageSnapshot::parse("<html><head></head></html>", "https://www.instagram.com/x/");
        let raw = Instagram.extract(&page);
        assert!(raw.is_empty());
    }
}
