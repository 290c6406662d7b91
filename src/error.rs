//! Errors raised while turning source text into a [`DiagramRequest`].
//!
//! Layout itself never fails; bad datums are dropped and degenerate inputs
//! produce an empty result.
//!
//! [`DiagramRequest`]: crate::ir::DiagramRequest

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("input is empty")]
    Empty,

    #[error("unknown diagram header `{0}`")]
    UnknownHeader(String),

    #[error("line {line}: {message}")]
    InvalidLine { line: usize, message: String },

    #[error("invalid request payload: {0}")]
    InvalidJson(String),

    #[error("invalid init directive: {0}")]
    InvalidInit(String),
}

impl RequestError {
    pub(crate) fn invalid_line(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidLine {
            line,
            message: message.into(),
        }
    }
}
