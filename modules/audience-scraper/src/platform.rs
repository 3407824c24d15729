// Platform selection and request validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScrapeError};

/// Every platform the scraper knows. Each variant maps to exactly one
/// extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlatformKind {
    VideoHost,
    PhotoNetwork,
    Microblog,
    ShortVideo,
    SocialPage,
    SocialGroup,
    ProfessionalNetwork,
    FederatedText,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 8] = [
        PlatformKind::VideoHost,
        PlatformKind::PhotoNetwork,
        PlatformKind::Microblog,
        PlatformKind::ShortVideo,
        PlatformKind::SocialPage,
        PlatformKind::SocialGroup,
        PlatformKind::ProfessionalNetwork,
        PlatformKind::FederatedText,
    ];

    /// Name used by the request layer's routes.
    pub fn route_name(&self) -> &'static str {
        match self {
            PlatformKind::VideoHost => "youtube",
            PlatformKind::PhotoNetwork => "instagram",
            PlatformKind::Microblog => "twitter",
            PlatformKind::ShortVideo => "tiktok",
            PlatformKind::SocialPage => "facebook",
            PlatformKind::SocialGroup => "facebook-group",
            PlatformKind::ProfessionalNetwork => "linkedin",
            PlatformKind::FederatedText => "threads",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.route_name())
    }
}

impl FromStr for PlatformKind {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();

        let kind = match key.as_str() {
            "youtube" | "videohost" => PlatformKind::VideoHost,
            "instagram" | "photonetwork" => PlatformKind::PhotoNetwork,
            "twitter" | "x" | "microblog" => PlatformKind::Microblog,
            "tiktok" | "shortvideo" => PlatformKind::ShortVideo,
            "facebook" | "facebookpage" | "socialpage" => PlatformKind::SocialPage,
            "facebookgroup" | "socialgroup" => PlatformKind::SocialGroup,
            "linkedin" | "professionalnetwork" => PlatformKind::ProfessionalNetwork,
            "threads" | "federatedtext" => PlatformKind::FederatedText,
            _ => {
                return Err(ScrapeError::InvalidInput(format!(
                    "unknown platform '{}'",
                    s.trim()
                )))
            }
        };
        Ok(kind)
    }
}

/// One scrape invocation. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub platform: PlatformKind,
    pub handle: String,
}

impl ScrapeRequest {
    pub fn new(platform: PlatformKind, handle: impl Into<String>) -> Self {
        Self {
            platform,
            handle: handle.into(),
        }
    }

    /// Build a request from the plain strings a route layer decodes.
    pub fn parse(platform: &str, handle: &str) -> Result<Self> {
        Ok(Self::new(platform.parse()?, handle))
    }
}

/// Trim and sanity-check a handle before any session is opened.
/// Handles end up in URL paths, so path and query delimiters are rejected.
pub fn validate_handle(handle: &str) -> Result<&str> {
    let trimmed = handle.trim();
    if trimmed.trim_start_matches('@').is_empty() {
        return Err(ScrapeError::InvalidInput(
            "handle is empty or missing".to_string(),
        ));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '&'))
    {
        return Err(ScrapeError::InvalidInput(format!(
            "handle '{trimmed}' contains '{bad}'"
        )));
    }
    Ok(trimmed)
}
