//! Failure channel of a submission.
//!
//! Every way a question can fail to produce an answer collapses into one
//! [`AskError`]. Its `Display` output is exactly the message the display
//! region shows after the `Error: ` prefix, so callers never need to match
//! on the variant just to render it.

use thiserror::Error;

/// Fallback used when the answer service fails without a usable `detail`.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Notice shown when the input is empty after trimming.
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

#[derive(Debug, Error)]
pub enum AskError {
    /// Input was empty or whitespace-only. Raised before any network call.
    #[error("{}", EMPTY_QUESTION_MESSAGE)]
    EmptyQuestion,

    /// The answer service responded with a non-2xx status.
    #[error("{detail}")]
    Service { status: u16, detail: String },

    /// The request could not be sent or the response body could not be read.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON shape we expect.
    #[error("{0}")]
    Decode(#[from] serde_json::Error),
}

impl AskError {
    /// HTTP status reported by the answer service, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AskError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}
