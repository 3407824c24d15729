// LinkedIn company page, public (logged-out) view.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::classify::{BlockPolicy, LOGIN_PHRASES};
use crate::dom::{element_text, PageSnapshot};
use crate::plan::{Condition, Readiness};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::ExtractionStrategy;

const ENTITY_INFO: &str = ".top-card-layout__entity-info-container";
const FIRST_SUBLINE: &str = ".top-card-layout__first-subline";
const FACE_PILE: &str = "p.face-pile__text";

static FOLLOWERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\d,]+)\s+followers").expect("valid regex"));
static EMPLOYEES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s+employees").expect("valid regex"));

pub struct LinkedIn;

impl LinkedIn {
    /// Run `re` over the element's text, or over the whole entity card when
    /// the element is missing.
    fn capture(page: &PageSnapshot, css: &str, re: &Regex) -> Option<String> {
        let text = page
            .select_first(css)
            .or_else(|| page.select_first(ENTITY_INFO))
            .map(element_text)?;
        re.captures(&text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl ExtractionStrategy for LinkedIn {
    fn platform(&self) -> PlatformKind {
        PlatformKind::ProfessionalNetwork
    }

    fn build_url(&self, handle: &str) -> String {
        format!("https://www.linkedin.com/company/{handle}/")
    }

    fn readiness(&self) -> Readiness {
        Readiness::required(Condition::Css(ENTITY_INFO), Duration::from_secs(15))
    }

    fn incognito(&self) -> bool {
        true
    }

    // The logged-out page always carries "Sign in" chrome, so the phrases only
    // count once nothing was found.
    fn block_policy(&self) -> BlockPolicy {
        BlockPolicy::when_empty(LOGIN_PHRASES)
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        let mut raw = RawExtraction::new();
        raw.insert("followers", Self::capture(page, FIRST_SUBLINE, &FOLLOWERS_RE));
        raw.insert("employees", Self::capture(page, FACE_PILE, &EMPLOYEES_RE));
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_subline_and_face_pile() {
        let page = PageSnapshot::parse(
            r#"<html><body>
                <div class="top-card-layout__entity-info-container">
                  <h1>Microsoft</h1>
                  <h3 class="top-card-layout__first-subline">Software Development Redmond, Washington 24,311,456 followers</h3>
                </div>
                <p class="face-pile__text">See all 228,104 employees</p>
            </body></html>"#,
            "https://www.linkedin.com/company/microsoft/",
        );
        let raw = LinkedIn.extract(&page);
        assert_eq!(raw.get("followers"), Some("24,311,456"));
        assert_eq!(raw.get("employees"), Some("228,104"));
        assert_eq!(LinkedIn.clean("followers", "24,311,456"), Some(24_311_456));
    }

    #[test]
    fn falls_back_to_entity_card_text() {
        let page = PageSnapshot::parse(
            r#"<div class="top-card-layout__entity-info-container">
                 Acme Corp <span>1,024 followers</span> <span>87 employees</span>
               </div>"#,
            "https://www.linkedin.com/company/acme/",
        );
        let raw = LinkedIn.extract(&page);
        assert_eq!(raw.get("followers"), Some("1,024"));
        assert_eq!(raw.get("employees"), Some("87"));
    }

    #[test]
    fn sign_in_wall_extracts_nothing() {
        let page = PageSnapshot::parse(
            "<html><body><h1>Sign in</h1><a>Join now</a></body></html>",
            "https://www.linkedin.com/authwall",
        );
        let raw = LinkedIn.extract(&page);
        assert!(raw.is_empty());
        assert_eq!(
            LinkedIn.block_policy().marker(&page.body_text(), page.url()),
            Some("Sign in")
        );
    }

    #[test]
    fn loads_incognito() {
        assert!(LinkedIn.load_plan("microsoft").incognito);
    }
}
