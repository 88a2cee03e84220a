//! Portal URLs: building topic links and deciding which pages we accept.

use reqwest::Url;

use crate::error::PortalError;

pub const PORTAL_HOST: &str = "ec.europa.eu";

const TOPIC_DETAILS_BASE: &str =
    "https://ec.europa.eu/info/funding-tenders/opportunities/portal/screen/opportunities/topic-details/";

/// Public portal page for a topic id such as `HORIZON-CL5-2024-D1-01`.
///
/// Returns `None` for an empty or blank id.
pub fn topic_portal_url(topic_id: &str) -> Option<String> {
    let id = topic_id.trim();
    if id.is_empty() {
        return None;
    }
    Some(format!("{TOPIC_DETAILS_BASE}{id}"))
}

/// Parses `raw` and checks it points at `allowed_host` or a subdomain of it.
pub fn check_portal_url(raw: &str, allowed_host: &str) -> Result<Url, PortalError> {
    let url = Url::parse(raw.trim()).map_err(|e| PortalError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PortalError::InvalidUrl(format!(
            "{raw}: unsupported scheme {}",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| PortalError::InvalidUrl(format!("{raw}: missing host")))?
        .to_ascii_lowercase();
    let allowed = allowed_host.trim().to_ascii_lowercase();
    let on_portal = host == allowed || host.ends_with(&format!(".{allowed}"));
    if !on_portal {
        return Err(PortalError::ForeignHost(host));
    }
    Ok(url)
}
