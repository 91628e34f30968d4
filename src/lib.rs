//! # persona-ask
//!
//! Client for a question/answer service: submit a question, show the answer.
//!
//! The service (document ingestion, vector search, language model) is an
//! opaque collaborator behind one endpoint:
//!
//! ```text
//! ┌────────────┐  submit   ┌────────────┐  POST /ask   ┌────────────────┐
//! │ input/form │──────────▶│ Submitter  │─────────────▶│ answer service │
//! └────────────┘           └─────┬──────┘◀─────────────└────────────────┘
//!                                │ render_*
//!                                ▼
//!                          ┌────────────┐
//!                          │  Display   │  Idle / Pending / Answered / Failed
//!                          └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! ask "What is the capital of France?"
//! ask --url http://localhost:8000 --json "bad"
//! printf 'one\ntwo\n' | ask          # each line is one submission
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Question and wire types |
//! | [`error`] | Submission failure type |
//! | [`client`] | Answer service trait and HTTP client |
//! | [`display`] | Display region state machine |
//! | [`submit`] | Submission handler and overlap policy |
//! | [`notify`] | Empty-input notice and pending indicator |

pub mod client;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod notify;
pub mod submit;
