//! The submission handler.
//!
//! [`Submitter::submit`] is what a form's submit event calls: validate the
//! input, mark the display pending, ask the answer service, render the
//! outcome, clear pending.
//!
//! # Overlapping submissions
//!
//! Nothing stops a caller from submitting again while a request is in
//! flight. [`SubmissionPolicy`] decides what happens when the responses
//! come back:
//!
//! - [`SubmissionPolicy::LastResolved`]: every response is rendered as it
//!   arrives, so the last one to resolve wins even if it was submitted
//!   first. Each settlement clears the pending flag.
//! - [`SubmissionPolicy::LatestOnly`]: each submission takes a sequence
//!   number; a response whose number is not the latest issued is dropped
//!   without touching the display.

use serde::Deserialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

use crate::client::AnswerService;
use crate::display::{Display, DisplayState};
use crate::models::Question;
use crate::notify::{NoNotifier, Notice, Notifier};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionPolicy {
    #[default]
    LastResolved,
    LatestOnly,
}

/// What a call to [`Submitter::submit`] did to the display region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty input. No request was made and the display is unchanged.
    Rejected,
    /// The result was rendered; this is the display state it produced.
    Rendered(DisplayState),
    /// A newer submission superseded this one; its result was dropped.
    Discarded,
}

/// Submission handler bound to one display region.
///
/// Cloning is cheap and clones share the display, so a UI can hand a clone
/// to every event it spawns.
#[derive(Clone)]
pub struct Submitter {
    service: Arc<dyn AnswerService>,
    display: Arc<Mutex<Display>>,
    notifier: Arc<dyn Notifier>,
    policy: SubmissionPolicy,
    latest: Arc<AtomicU64>,
}

impl Submitter {
    pub fn new(service: Arc<dyn AnswerService>, policy: SubmissionPolicy) -> Self {
        Self {
            service,
            display: Arc::new(Mutex::new(Display::new())),
            notifier: Arc::new(NoNotifier),
            policy,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn policy(&self) -> SubmissionPolicy {
        self.policy
    }

    /// Snapshot of the display region.
    pub fn display(&self) -> DisplayState {
        self.lock_display().state().clone()
    }

    /// Handle one submission of `input`.
    ///
    /// Errors never escape: they are rendered as `Error: <message>`. If the
    /// returned future is dropped before it settles, the pending flag is
    /// still cleared.
    pub async fn submit(&self, input: &str) -> SubmitOutcome {
        let question = match Question::parse(input) {
            Ok(q) => q,
            Err(_) => {
                debug!("rejected empty question");
                self.notifier.notify(Notice::EmptyQuestion);
                return SubmitOutcome::Rejected;
            }
        };

        // Sequence numbers are only issued under the display lock, together
        // with the pending render.
        let seq = {
            let mut display = self.lock_display();
            let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            display.render_pending();
            seq
        };
        self.notifier.notify(Notice::Pending { seq });
        info!(seq, question = %question, "submitting question");

        let mut guard = PendingGuard {
            submitter: self,
            seq,
            armed: true,
        };

        let result = self.service.ask(&question).await;
        guard.armed = false;

        let mut display = self.lock_display();
        if !self.is_current(seq) {
            debug!(seq, "discarding superseded response");
            return SubmitOutcome::Discarded;
        }

        display.render_result(&result);
        let state = display.state().clone();
        drop(display);

        match &result {
            Ok(answer) => info!(seq, bytes = answer.len(), "answer rendered"),
            Err(err) => info!(seq, status = ?err.status(), error = %err, "error rendered"),
        }
        self.notifier.notify(Notice::Settled {
            seq,
            failed: result.is_err(),
        });

        SubmitOutcome::Rendered(state)
    }

    fn is_current(&self, seq: u64) -> bool {
        match self.policy {
            SubmissionPolicy::LastResolved => true,
            SubmissionPolicy::LatestOnly => self.latest.load(Ordering::SeqCst) == seq,
        }
    }

    fn lock_display(&self) -> MutexGuard<'_, Display> {
        self.display.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears the pending flag if a submission is dropped mid-flight.
struct PendingGuard<'a> {
    submitter: &'a Submitter,
    seq: u64,
    armed: bool,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut display = self.submitter.lock_display();
        if self.submitter.is_current(self.seq) {
            display.render_idle();
        }
    }
}
