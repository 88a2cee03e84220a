use thiserror::Error;

/// Errors produced by the alignment layer.
///
/// Alignment itself never fails; only a bad [`crate::AlignConfig`] is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AlignError {
    #[error("invalid align config: {0}")]
    InvalidConfig(String),
}
