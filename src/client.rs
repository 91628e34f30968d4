//! Answer service abstraction and the HTTP implementation.
//!
//! [`AnswerService`] is the seam between the submission handler and the
//! backend. [`HttpAnswerService`] talks to the real endpoint; tests and
//! embedders can supply their own implementation.
//!
//! # Error mapping
//!
//! | Outcome | Result |
//! |---------|--------|
//! | 2xx, `{"answer": "..."}` | `Ok(answer)` |
//! | 2xx, anything else | [`AskError::Decode`] |
//! | non-2xx, JSON body | [`AskError::Service`] with `detail` or the fallback |
//! | non-2xx, non-JSON body | [`AskError::Decode`] |
//! | connect/send/read failure | [`AskError::Transport`] |
//!
//! No retries and no client-side timeout.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::AskError;
use crate::models::{error_detail, AskRequest, AskResponse, Question};

/// Something that turns a question into an answer.
#[async_trait]
pub trait AnswerService: Send + Sync {
    async fn ask(&self, question: &Question) -> Result<String, AskError>;
}

/// Calls `POST <base_url><endpoint>` with `{"question": ...}`.
pub struct HttpAnswerService {
    client: reqwest::Client,
    url: Url,
}

impl HttpAnswerService {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let url = config.ask_url()?;
        let client = reqwest::Client::builder()
            .user_agent(concat!("persona-ask/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl AnswerService for HttpAnswerService {
    async fn ask(&self, question: &Question) -> Result<String, AskError> {
        debug!(url = %self.url, "posting question");

        let response = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .json(&AskRequest::from(question))
            .send()
            .await
            .inspect_err(|e| warn!(error = %e, "answer service unreachable"))?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "answer service responded");

        if status.is_success() {
            let parsed: AskResponse = serde_json::from_str(&body)
                .inspect_err(|e| warn!(error = %e, "malformed answer body"))?;
            return Ok(parsed.answer);
        }

        let json: serde_json::Value = serde_json::from_str(&body)
            .inspect_err(|e| warn!(status = status.as_u16(), error = %e, "malformed error body"))?;
        let detail = error_detail(&json);
        warn!(status = status.as_u16(), detail = %detail, "answer service reported failure");

        Err(AskError::Service {
            status: status.as_u16(),
            detail,
        })
    }
}
