use thiserror::Error;

/// Reasons a portal page could not be turned into a topic description.
///
/// [`crate::extract`] logs these and returns `None`; [`crate::try_extract`]
/// hands them to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PortalError {
    #[error("invalid portal url: {0}")]
    InvalidUrl(String),
    #[error("host {0} is not part of the funding portal")]
    ForeignHost(String),
    #[error("portal responded with status {0}")]
    Status(u16),
    #[error("portal request failed: {0}")]
    Transport(String),
    #[error("invalid portal config: {0}")]
    InvalidConfig(String),
}
