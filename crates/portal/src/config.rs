use serde::{Deserialize, Serialize};

use crate::error::PortalError;
use crate::url::PORTAL_HOST;

/// Settings for fetching portal pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "PortalConfig::default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "PortalConfig::default_user_agent")]
    pub user_agent: String,
    /// Accepted host; its subdomains are accepted too.
    #[serde(default = "PortalConfig::default_allowed_host")]
    pub allowed_host: String,
}

impl PortalConfig {
    pub(crate) fn default_timeout_secs() -> u64 {
        20
    }

    pub(crate) fn default_user_agent() -> String {
        concat!("topicdiff/", env!("CARGO_PKG_VERSION")).to_string()
    }

    pub(crate) fn default_allowed_host() -> String {
        PORTAL_HOST.to_string()
    }

    pub fn validate(&self) -> Result<(), PortalError> {
        if self.timeout_secs == 0 {
            return Err(PortalError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(PortalError::InvalidConfig(
                "user_agent must not be empty".into(),
            ));
        }
        let host = self.allowed_host.trim();
        if host.is_empty() || host.contains('/') || host.contains(':') {
            return Err(PortalError::InvalidConfig(
                "allowed_host must be a bare host name".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Self::default_timeout_secs(),
            user_agent: Self::default_user_agent(),
            allowed_host: Self::default_allowed_host(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = PortalConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.allowed_host, "ec.europa.eu");
        assert!(cfg.user_agent.starts_with("topicdiff/"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let cfg = PortalConfig {
            timeout_secs: 0,
            ..PortalConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PortalError::InvalidConfig(_))));
    }

    #[test]
    fn host_with_scheme_rejected() {
        let cfg = PortalConfig {
            allowed_host: "https://ec.europa.eu".into(),
            ..PortalConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
