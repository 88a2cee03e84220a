//! # Portal extraction (`portal`)
//!
//! Pulls the "Topic description" section out of a funding-portal topic page
//! and segments it, producing the portal side of an alignment.
//!
//! A page yields nothing (never an error) when:
//!
//! - the URL is malformed or its host is not the portal (`ec.europa.eu` and
//!   subdomains by default)
//! - the fetch fails or the response is not 2xx
//! - no heading of any level mentions "Topic description"
//! - the section under that heading is empty
//!
//! [`extract`] logs the reason and returns `None`. [`try_extract`] returns
//! the failure to callers who want it. [`extract_from_html`] is the pure
//! part, for callers that already hold the page.
//!
//! Fetching goes through the [`PageFetcher`] trait; [`HttpFetcher`] is the
//! reqwest implementation.

mod config;
mod error;
mod fetch;
pub mod html;
mod url;

use serde::{Deserialize, Serialize};
use segment::Block;
use tracing::{info, warn};

pub use crate::config::PortalConfig;
pub use crate::error::PortalError;
pub use crate::fetch::{HttpFetcher, PageFetcher};
pub use crate::url::{check_portal_url, topic_portal_url, PORTAL_HOST};
pub use reqwest::Url;

/// The topic description found on a portal page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalTopic {
    pub url: String,
    /// Normalized text of the section, ready for segmentation.
    pub raw_text: String,
    pub blocks: Vec<Block>,
}

/// Extracts the topic description from an already fetched page.
pub fn extract_from_html(url: &str, page: &str) -> Option<PortalTopic> {
    let raw_text = html::topic_section_text(page)?;
    if raw_text.trim().is_empty() {
        return None;
    }
    let blocks = segment::segment(&raw_text);
    Some(PortalTopic {
        url: url.to_string(),
        raw_text,
        blocks,
    })
}

/// Fetches `url` and extracts its topic description.
///
/// `Ok(None)` means the page was fetched but has no usable section.
pub async fn try_extract(
    url: &str,
    fetcher: &dyn PageFetcher,
    config: &PortalConfig,
) -> Result<Option<PortalTopic>, PortalError> {
    let checked = check_portal_url(url, &config.allowed_host)?;
    let page = fetcher.fetch(&checked).await?;
    Ok(extract_from_html(checked.as_str(), &page))
}

/// Fetches `url` and extracts its topic description, or `None`.
pub async fn extract(
    url: &str,
    fetcher: &dyn PageFetcher,
    config: &PortalConfig,
) -> Option<PortalTopic> {
    match try_extract(url, fetcher, config).await {
        Ok(Some(topic)) => {
            info!(
                url = %topic.url,
                text_len = topic.raw_text.len(),
                blocks = topic.blocks.len(),
                "portal_extract_success"
            );
            Some(topic)
        }
        Ok(None) => {
            warn!(url, "portal_topic_description_missing");
            None
        }
        Err(err) => {
            warn!(url, error = %err, "portal_extract_failure");
            None
        }
    }
}
