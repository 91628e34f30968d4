//! User notifications and the pending indicator.
//!
//! The display region carries the answer; everything else the user should
//! see (the empty-question notice, the "waiting" indicator) goes through a
//! [`Notifier`]. Notices are written to **stderr** so stdout stays limited
//! to rendered content.

use std::io::Write;

use crate::error::EMPTY_QUESTION_MESSAGE;

/// A side-channel event raised by the submission handler.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Notice {
    /// Input was empty after trimming; nothing was sent.
    EmptyQuestion,
    /// Submission `seq` is in flight; show the loading indicator.
    Pending { seq: u64 },
    /// Submission `seq` settled and its result was rendered.
    Settled { seq: u64, failed: bool },
}

/// Receives notices. Called synchronously, so an implementation that
/// writes before returning is a blocking notification.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Human-friendly notices on stderr.
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        let line = match notice {
            Notice::EmptyQuestion => format!("{}\n", EMPTY_QUESTION_MESSAGE),
            Notice::Pending { .. } => "waiting for answer...\n".to_string(),
            Notice::Settled { .. } => return,
        };
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }
}

/// Only the notices the user must see; no pending indicator.
pub struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn notify(&self, notice: Notice) {
        if notice == Notice::EmptyQuestion {
            StderrNotifier.notify(notice);
        }
    }
}

/// Machine-readable notices: one JSON object per line on stderr.
pub struct JsonNotifier;

impl Notifier for JsonNotifier {
    fn notify(&self, notice: Notice) {
        let obj = match notice {
            Notice::EmptyQuestion => serde_json::json!({
                "event": "rejected",
                "message": EMPTY_QUESTION_MESSAGE,
            }),
            Notice::Pending { seq } => serde_json::json!({
                "event": "pending",
                "seq": seq,
            }),
            Notice::Settled { seq, failed } => serde_json::json!({
                "event": "settled",
                "seq": seq,
                "failed": failed,
            }),
        };
        if let Ok(line) = serde_json::to_string(&obj) {
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }
}

/// Discards everything. Default for library use.
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Notification mode for the CLI.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotifyMode {
    Quiet,
    Human,
    Json,
}

impl NotifyMode {
    /// Human notices when stderr is a TTY, otherwise only required ones.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            NotifyMode::Human
        } else {
            NotifyMode::Quiet
        }
    }

    pub fn notifier(&self) -> Box<dyn Notifier> {
        match self {
            NotifyMode::Quiet => Box::new(QuietNotifier),
            NotifyMode::Human => Box::new(StderrNotifier),
            NotifyMode::Json => Box::new(JsonNotifier),
        }
    }
}
