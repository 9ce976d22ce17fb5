use crate::token::Token;
use thiserror::Error;

/// The one error kind that actually unwinds as a `Result::Err`: a
/// runtime fault discovered mid-evaluation. Scan and parse failures
/// are reported straight through `Diagnostics` instead (see
/// `diagnostics.rs`), since they don't need to abort the surrounding
/// pass the way a runtime fault must abort the current statement.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            message: message.into(),
        }
    }
}

/// Recoverable sentinel thrown by the parser to unwind to the nearest
/// `declaration()` call, which then synchronizes on the next
/// statement boundary. Carries no data, since the diagnostic itself was
/// already reported through `Diagnostics` at the throw site.
#[derive(Debug, Error)]
#[error("parse error")]
pub struct ParseError;
