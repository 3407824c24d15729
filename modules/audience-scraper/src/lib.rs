pub mod classify;
pub mod config;
pub mod dom;
pub mod error;
pub mod normalize;
mod orchestrator;
pub mod plan;
pub mod platform;
pub mod session;
pub mod strategy;
pub mod types;

pub use classify::{classify, BlockPolicy, BlockScope, PageSignal};
pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use normalize::{normalize, normalize_metric};
pub use orchestrator::Scraper;
pub use plan::{LoadPlan, Readiness, Transport};
pub use platform::{validate_handle, PlatformKind, ScrapeRequest};
pub use session::{
    BrowserlessProvider, FixtureProvider, LoadedPage, ReadyState, Session, SessionDriver,
    SessionProvider,
};
pub use strategy::{strategy_for, ExtractionStrategy};
pub use types::{EntityKind, FailureReason, Metric, MetricSet, RawExtraction, ScrapeResult};
