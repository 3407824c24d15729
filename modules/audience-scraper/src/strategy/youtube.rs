// YouTube channel: subscriber and video counts from the page header.

use std::time::Duration;

use crate::dom::{element_text, select_within, PageSnapshot};
use crate::plan::{Condition, Readiness};
use crate::platform::PlatformKind;
use crate::types::RawExtraction;

use super::ExtractionStrategy;

const HEADLINE_INFO: &str = "div.yt-page-header-view-model__page-header-headline-info";
const METADATA: &str =
    "yt-content-metadata-view-model.yt-page-header-view-model__page-header-content-metadata";
const METADATA_ROW: &str = "div.yt-content-metadata-view-model__metadata-row";
const STAT_SPAN: &str = r#"span[role="text"]"#;

pub struct YouTube;

impl ExtractionStrategy for YouTube {
    fn platform(&self) -> PlatformKind {
        PlatformKind::VideoHost
    }

    fn build_url(&self, handle: &str) -> String {
        if handle.starts_with('@') {
            format!("https://www.youtube.com/{handle}")
        } else {
            format!("https://www.youtube.com/c/{handle}")
        }
    }

    fn readiness(&self) -> Readiness {
        Readiness::required(Condition::Css(HEADLINE_INFO), Duration::from_secs(30))
    }

    fn extract(&self, page: &PageSnapshot) -> RawExtraction {
        // Second metadata row holds "N subscribers" and "N videos".
        let stats: Vec<String> = page
            .select_first(METADATA)
            .and_then(|container| select_within(container, METADATA_ROW).into_iter().nth(1))
            .map(|row| {
                select_within(row, STAT_SPAN)
                    .into_iter()
                    .map(element_text)
                    .collect()
            })
            .unwrap_or_default();

        let mut raw = RawExtraction::new();
        raw.insert("subscribers", stats.first().cloned());
        raw.insert("videos", stats.get(1).cloned());
        raw
    }
}
