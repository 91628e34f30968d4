//! Display region state machine.
//!
//! ```text
//!            submit (valid)            response resolves
//!   Idle ─────────────────▶ Pending ─────────────────────▶ Answered | Failed
//!    ▲                                                           │
//!    └────────────────────── next submit ◀───────────────────────┘
//! ```
//!
//! The region is plain data. It changes only through [`Display::render_idle`],
//! [`Display::render_pending`] and [`Display::render_result`], so any UI
//! binding (the `ask` CLI, a test, a GUI) can drive it and observe it.

use serde_json::json;

use crate::error::AskError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DisplayState {
    #[default]
    Idle,
    /// A request is in flight; content is cleared.
    Pending,
    /// Answer text, rendered verbatim.
    Answered(String),
    /// The full error line, `Error: <message>`.
    Failed(String),
}

impl DisplayState {
    /// Text content of the region.
    pub fn content(&self) -> &str {
        match self {
            DisplayState::Idle | DisplayState::Pending => "",
            DisplayState::Answered(text) | DisplayState::Failed(text) => text,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, DisplayState::Pending)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DisplayState::Failed(_))
    }

    fn label(&self) -> &'static str {
        match self {
            DisplayState::Idle => "idle",
            DisplayState::Pending => "pending",
            DisplayState::Answered(_) => "answered",
            DisplayState::Failed(_) => "error",
        }
    }

    /// Machine-readable snapshot used by `ask --json`.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "state": self.label(),
            "pending": self.is_pending(),
            "content": self.content(),
        })
    }
}

/// Formats a failure the way the display region shows it.
pub fn error_line(err: &AskError) -> String {
    format!("Error: {}", err)
}

#[derive(Debug, Default)]
pub struct Display {
    state: DisplayState,
}

impl Display {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn content(&self) -> &str {
        self.state.content()
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    /// Clears the pending flag without a result. Keeps rendered content.
    pub fn render_idle(&mut self) {
        if self.state.is_pending() {
            self.state = DisplayState::Idle;
        }
    }

    /// Clears prior content and marks the region pending.
    pub fn render_pending(&mut self) {
        self.state = DisplayState::Pending;
    }

    /// Renders a settled submission and clears the pending flag.
    pub fn render_result(&mut self, result: &Result<String, AskError>) {
        self.state = match result {
            Ok(answer) => DisplayState::Answered(answer.clone()),
            Err(err) => DisplayState::Failed(error_line(err)),
        };
    }
}
