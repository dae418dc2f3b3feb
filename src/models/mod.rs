pub mod application;
pub mod audit_log;
pub mod blockable;
pub mod candidate_profile;
pub mod fitment;
pub mod job;
pub mod organization;
pub mod resume;
pub mod user;

/// Raised when a stored or submitted string is outside a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} value: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
