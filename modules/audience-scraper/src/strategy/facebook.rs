// Facebook pages and groups. The same slug can resolve to either, so both
// strategies look for a member count (group) and a follower count (page)
// and report which one they found.

use std::time::Duration;

use crate::dom::{element_text, PageSnapshot, TextQuery};
use crate::plan::{Condition, OnTimeout, Readiness, ReadyStep};
use crate::platform::PlatformKind;
use crate::types::{EntityKind, RawExtraction};

use super::ExtractionStrategy;

const FOLLOWERS_COUNT: &str = r#"a[href*="/followers/"] strong"#;
/// Group headers render the member count inside a focusable button div.
const MEMBERS_BUTTON: &str = r#"div[role="button"][tabindex="0"]"#;
const MEMBERS_TEXT: TextQuery = TextQuery {
    tag: "div",
    needles: &["member", "members"],
    ascend: 0,
};

fn mentions_members(text: &str) -> bool {
    text.to_lowercase().contains("member")
}

fn page_followers(page: &PageSnapshot) -> Option<RawExtraction> {
    let el = page.select_first(FOLLOWERS_COUNT)?;
    let mut raw = RawExtraction::new().with_entity(EntityKind::Page);
    raw.insert("followers", Some(element_text(el)));
    Some(raw)
}

fn group_members(text: String) -> RawExtraction {
    let mut raw = RawExtraction::new().with_entity(EntityKind::Group);
    raw.insert("members", Some(text));
    raw
}

pub struct FacebookPage;

impl ExtractionStrategy for FacebookPage {
    fn platform(&self) -> PlatformKind {
        PlatformKind::SocialPage
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.facebook.com/{handle}/")
    }

    /// Page and group layouts raced; neither showing up is not fatal.
    fn readiness(&self) -> Readiness {
        Readiness {
            steps: vec![ReadyStep {
                any_of: vec![Condition::Css(FOLLOWERS_COUNT), Condition::Css(MEMBERS_BUTTON)],
                timeout: Duration::from_secs(10),
            }],
            on_timeout: OnTimeout::Continue,
        }
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let members = page
            .select_all(MEMBERS_BUTTON)
            .into_iter()
            .map(element_text)
            .find(|t| mentions_members(t));

        match members {
            Some(text) => group_members(text),
            None => page_followers(page).unwrap_or_default(),
        }
    }
}

pub struct FacebookGroup;

impl ExtractionStrategy for FacebookGroup {
    fn platform(&self) -> PlatformKind {
        PlatformKind::SocialGroup
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.facebook.com/groups/{handle}/")
    }

    fn readiness(&self) -> Readiness {
        Readiness {
            steps: vec![
                ReadyStep {
                    any_of: vec![Condition::Text(MEMBERS_TEXT)],
                    timeout: Duration::from_secs(15),
                },
                ReadyStep {
                    any_of: vec![Condition::Css(FOLLOWERS_COUNT)],
                    timeout: Duration::from_secs(5),
                },
            ],
            on_timeout: OnTimeout::Continue,
        }
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let members = page
            .find(&MEMBERS_TEXT)
            .map(element_text)
            .filter(|t| !t.is_empty());

        match members {
            Some(text) => group_members(text),
            None => page_followers(page).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
        <div role="button" tabindex="0">Follow</div>
        <a href="https://www.facebook.com/NASA/followers/"><strong>5.8M</strong> followers</a>
    </body></html>"#;

    const GROUP: &str = r#"<html><body>
        <div role="button" tabindex="0">Join group</div>
        <div role="button" tabindex="0">12K members</div>
    </body></html>"#;

    #[test]
    fn page_layout_reports_followers() {
        let page = PageSnapshot::parse(PAGE, "https://www.facebook.com/NASA/");
        let raw = FacebookPage.extract(&page);
        assert_eq!(raw.entity(), Some(EntityKind::Page));
        assert_eq!(raw.get("followers"), Some("5.8M"));
        assert_eq!(raw.get("members"), None);
    }

    #[test]
    fn group_layout_reports_members() {
        let page = PageSnapshot::parse(GROUP, "https://www.facebook.com/rustaceans/");
        let raw = FacebookPage.extract(&page);
        assert_eq!(raw.entity(), Some(EntityKind::Group));
        assert_eq!(raw.get("members"), Some("12K members"));
        assert_eq!(FacebookPage.clean("members", "12K members"), Some(12_000));
    }

    #[test]
    fn group_strategy_uses_text_query() {
        let page = PageSnapshot::parse(
            r#"<html><body><div><div>Public group · 48,210 members</div></div></body></html>"#,
            "https://www.facebook.com/groups/rustaceans/",
        );
        let raw = FacebookGroup.extract(&page);
        assert_eq!(raw.entity(), Some(EntityKind::Group));
        assert_eq!(FacebookGroup.clean("members", raw.get("members").unwrap()), Some(48_210));
    }

    #[test]
    fn group_strategy_falls_back_to_page_followers() {
        let page = PageSnapshot::parse(PAGE, "https://www.facebook.com/groups/NASA/");
        let raw = FacebookGroup.extract(&page);
        assert_eq!(raw.entity(), Some(EntityKind::Page));
        assert_eq!(raw.get("followers"), Some("5.8M"));
    }

    #[test]
    fn unknown_layout_is_empty() {
        let page = PageSnapshot::parse("<html><body><p>hi</p></body></html>", "https://www.facebook.com/x/");
        assert!(FacebookPage.extract(&page).is_empty());
        assert!(FacebookGroup.extract(&page).is_empty());
    }

    #[test]
    fn group_blocks_on_login_prompt() {
        let policy = FacebookGroup.block_policy();
        assert_eq!(policy.marker("Log In or sign up", ""), Some("Log In"));
        assert_eq!(FacebookPage.block_policy().marker("Go back", ""), Some("Go back"));
    }
}
