//! Core data types.
//!
//! A submission pairs one [`Question`] with one answer result. The wire
//! shapes of the answer service live here too:
//!
//! ```text
//! POST /ask   {"question": "..."}
//! 2xx         {"answer": "..."}
//! non-2xx     {"detail": "..."}      (detail optional)
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{AskError, UNKNOWN_ERROR_MESSAGE};

/// A question as submitted: surrounding whitespace removed, never empty.
///
/// The only constructor is [`Question::parse`], so holding a `Question`
/// proves the input passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Trims `input` and rejects it with [`AskError::EmptyQuestion`] if
    /// nothing is left.
    ///
    /// ```rust
    /// use persona_ask::models::Question;
    ///
    /// let q = Question::parse("  What is the capital of France?\n").unwrap();
    /// assert_eq!(q.as_str(), "What is the capital of France?");
    /// assert!(Question::parse(" \t ").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, AskError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AskError::EmptyQuestion);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Request body for `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskRequest {
    pub question: String,
}

impl From<&Question> for AskRequest {
    fn from(question: &Question) -> Self {
        Self {
            question: question.as_str().to_string(),
        }
    }
}

/// Success body from the answer service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    pub answer: String,
}

/// Extracts the human-readable message from a non-2xx response body.
///
/// A non-empty string `detail` is used verbatim. Any other non-null
/// `detail` (validation errors carry a list of objects) is rendered as
/// compact JSON. Everything else falls back to
/// [`UNKNOWN_ERROR_MESSAGE`].
pub fn error_detail(body: &Value) -> String {
    match body.get("detail") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => UNKNOWN_ERROR_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}
