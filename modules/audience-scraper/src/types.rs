// Result types returned to callers of the scraper.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::platform::PlatformKind;

/// Sentinel for a metric whose element was not found on the page.
pub const NOT_AVAILABLE: &str = "N/A";

/// Whether a Facebook handle resolved to a page or a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Page,
    Group,
}

/// Raw metric text pulled from one page, keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    metrics: BTreeMap<String, String>,
    entity: Option<EntityKind>,
}

impl RawExtraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityKind) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Record a metric. Missing or blank text becomes the `N/A` sentinel.
    pub fn insert(&mut self, name: &str, text: Option<String>) {
        let value = text
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.metrics.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.metrics.get(name).map(String::as_str)
    }

    pub fn entity(&self) -> Option<EntityKind> {
        self.entity
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.metrics.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when nothing usable was found: no metrics, or all `N/A`.
    pub fn is_empty(&self) -> bool {
        self.metrics.values().all(|v| v == NOT_AVAILABLE)
    }
}

/// One metric as returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub raw: String,
    pub clean: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSet {
    pub platform: PlatformKind,
    pub handle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<EntityKind>,
    pub metrics: BTreeMap<String, Metric>,
    pub captured_at: DateTime<Utc>,
}

impl MetricSet {
    pub fn get(&self, name: &str) -> Option<&Metric> {
        self.metrics.get(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    AccessRestricted,
    Timeout,
    ElementNotFound,
    InvalidInput,
    UnexpectedError,
}

/// The only value handed back to callers: either a full metric set or a
/// classified failure, never a mix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScrapeResult {
    Success(MetricSet),
    Failure { reason: FailureReason, detail: String },
}

impl ScrapeResult {
    pub fn failure(reason: FailureReason, detail: impl Into<String>) -> Self {
        ScrapeResult::Failure {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Success(_))
    }

    pub fn metrics(&self) -> Option<&MetricSet> {
        match self {
            ScrapeResult::Success(set) => Some(set),
            ScrapeResult::Failure { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<FailureReason> {
        match self {
            ScrapeResult::Success(_) => None,
            ScrapeResult::Failure { reason, .. } => Some(*reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_becomes_sentinel() {
        let mut raw = RawExtraction::new();
        raw.insert("followers", Some("  ".into()));
        raw.insert("following", None);
        assert_eq!(raw.get("followers"), Some(NOT_AVAILABLE));
        assert_eq!(raw.get("following"), Some(NOT_AVAILABLE));
        assert!(raw.is_empty());
    }

    #[test]
    fn one_real_metric_is_not_empty() {
        let mut raw = RawExtraction::new();
        raw.insert("followers", Some(" 1.2K ".into()));
        raw.insert("following", None);
        assert_eq!(raw.get("followers"), Some("1.2K"));
        assert!(!raw.is_empty());
    }

    #[test]
    fn failure_serializes_with_status_tag() {
        let result = ScrapeResult::failure(FailureReason::InvalidInput, "empty handle");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["reason"], "invalid_input");
        assert_eq!(json["detail"], "empty handle");
    }

    #[test]
    fn success_serializes_metrics_inline() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "followers".to_string(),
            Metric {
                raw: "12.3M".into(),
                clean: Some(12_300_000),
            },
        );
        let result = ScrapeResult::Success(MetricSet {
            platform: PlatformKind::ShortVideo,
            handle: "nasa".into(),
            entity: None,
            metrics,
            captured_at: Utc::now(),
        });
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["platform"], "short_video");
        assert_eq!(json["metrics"]["followers"]["clean"], 12_300_000);
        assert!(json.get("entity").is_none());
    }
}
