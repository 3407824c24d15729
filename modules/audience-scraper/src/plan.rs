// Load plans: everything a session needs to navigate to a profile and decide
// the page is ready for extraction.

use std::time::Duration;

use crate::dom::{PageSnapshot, TextQuery};

/// Added on top of navigation and readiness timeouts for the overall
/// session deadline.
pub const SESSION_GRACE: Duration = Duration::from_secs(5);

/// Puppeteer's default navigation timeout.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Rendered in a remote headless browser.
    Browser,
    /// Plain HTTP GET, no script execution.
    Http,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitUntil {
    NetworkIdle2,
    DomContentLoaded,
}

impl WaitUntil {
    pub fn as_puppeteer(&self) -> &'static str {
        match self {
            WaitUntil::NetworkIdle2 => "networkidle2",
            WaitUntil::DomContentLoaded => "domcontentloaded",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Css(&'static str),
    Text(TextQuery),
}

impl Condition {
    /// Selector string for `page.waitForSelector`.
    pub fn puppeteer_selector(&self) -> String {
        match self {
            Condition::Css(css) => css.to_string(),
            Condition::Text(query) => format!("xpath/{}", query.to_xpath()),
        }
    }

    /// Whether the condition already holds on a static snapshot.
    pub fn is_met(&self, page: &PageSnapshot) -> bool {
        match self {
            Condition::Css(css) => page.select_first(css).is_some(),
            Condition::Text(query) => page.find(query).is_some(),
        }
    }
}

/// Conditions raced against each other; the first to appear wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyStep {
    pub any_of: Vec<Condition>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnTimeout {
    /// No step matched: the scrape fails with a timeout.
    Fail,
    /// No step matched: extract anyway and let content checks decide.
    Continue,
}

/// Ordered fallback steps. The page is ready once any step matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Readiness {
    pub steps: Vec<ReadyStep>,
    pub on_timeout: OnTimeout,
}

impl Readiness {
    pub fn none() -> Self {
        Self {
            steps: Vec::new(),
            on_timeout: OnTimeout::Continue,
        }
    }

    pub fn required(condition: Condition, timeout: Duration) -> Self {
        Self {
            steps: vec![ReadyStep {
                any_of: vec![condition],
                timeout,
            }],
            on_timeout: OnTimeout::Fail,
        }
    }

    pub fn total_timeout(&self) -> Duration {
        self.steps.iter().map(|s| s.timeout).sum()
    }

    /// Index of the first step satisfied by a static snapshot.
    pub fn first_met(&self, page: &PageSnapshot) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.any_of.iter().any(|c| c.is_met(page)))
    }

    pub fn describe(&self) -> String {
        self.steps
            .iter()
            .map(|s| {
                s.any_of
                    .iter()
                    .map(Condition::puppeteer_selector)
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join(", then ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadPlan {
    pub url: String,
    pub transport: Transport,
    pub wait_until: WaitUntil,
    pub navigation_timeout: Duration,
    pub scroll_to: Option<i64>,
    pub readiness: Readiness,
    pub incognito: bool,
}

impl LoadPlan {
    /// Deadline for the whole session: navigation, every readiness step, and
    /// a little slack for the snapshot itself.
    pub fn budget(&self) -> Duration {
        self.navigation_timeout + self.readiness.total_timeout() + SESSION_GRACE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEMBERS: TextQuery = TextQuery {
        tag: "div",
        needles: &["member"],
        ascend: 0,
    };

    fn race() -> Readiness {
        Readiness {
            steps: vec![
                ReadyStep {
                    any_of: vec![Condition::Text(MEMBERS)],
                    timeout: Duration::from_secs(15),
                },
                ReadyStep {
                    any_of: vec![Condition::Css("a.followers"), Condition::Css("strong")],
                    timeout: Duration::from_secs(5),
                },
            ],
            on_timeout: OnTimeout::Continue,
        }
    }

    #[test]
    fn budget_sums_navigation_steps_and_grace() {
        let plan = LoadPlan {
            url: "https://example.com".into(),
            transport: Transport::Browser,
            wait_until: WaitUntil::NetworkIdle2,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            scroll_to: None,
            readiness: race(),
            incognito: false,
        };
        assert_eq!(plan.budget(), Duration::from_secs(30 + 15 + 5 + 5));
    }

    #[test]
    fn text_conditions_render_as_xpath_selectors() {
        assert_eq!(
            Condition::Text(MEMBERS).puppeteer_selector(),
            "xpath///div[contains(text(), 'member')]"
        );
        assert_eq!(Condition::Css("strong").puppeteer_selector(), "strong");
    }

    #[test]
    fn first_met_respects_step_order() {
        let page = PageSnapshot::parse("<strong>5</strong>", "https://example.com");
        assert_eq!(race().first_met(&page), Some(1));

        let page = PageSnapshot::parse("<div>9 members</div><strong>5</strong>", "https://example.com");
        assert_eq!(race().first_met(&page), Some(0));

        let page = PageSnapshot::parse("<p>empty</p>", "https://example.com");
        assert_eq!(race().first_met(&page), None);
    }

    #[test]
    fn describe_lists_steps() {
        assert_eq!(
            race().describe(),
            "xpath///div[contains(text(), 'member')], then a.followers | strong"
        );
    }
}
