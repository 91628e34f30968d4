//! Overlapping submissions and pending-flag cleanup.
//!
//! Most tests use an in-memory answer service whose responses are released
//! by the test through oneshot channels, so resolution order is fully
//! controlled. The contention tests instead fire bursts of instantly
//! answered submissions across worker threads.

use async_trait::async_trait;
use persona_ask::client::AnswerService;
use persona_ask::display::DisplayState;
use persona_ask::error::AskError;
use persona_ask::models::Question;
use persona_ask::notify::{Notice, Notifier};
use persona_ask::submit::{SubmissionPolicy, SubmitOutcome, Submitter};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

// ─── Test doubles ───────────────────────────────────────────────────

/// Answers each question only when the test releases its gate.
#[derive(Default)]
struct GatedService {
    gates: Mutex<HashMap<String, oneshot::Receiver<Result<String, AskError>>>>,
    calls: AtomicUsize,
}

impl GatedService {
    fn gate(&self, question: &str) -> oneshot::Sender<Result<String, AskError>> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(question.to_string(), rx);
        tx
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerService for GatedService {
    async fn ask(&self, question: &Question) -> Result<String, AskError> {
        let rx = self
            .gates
            .lock()
            .unwrap()
            .remove(question.as_str())
            .expect("no gate for question");
        self.calls.fetch_add(1, Ordering::SeqCst);
        rx.await.expect("gate dropped")
    }
}

/// Answers immediately with the question text.
struct EchoService;

#[async_trait]
impl AnswerService for EchoService {
    async fn ask(&self, question: &Question) -> Result<String, AskError> {
        Ok(question.as_str().to_string())
    }
}

/// Records every notice.
#[derive(Default)]
struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

fn spawn_submit(submitter: &Submitter, input: &'static str) -> JoinHandle<SubmitOutcome> {
    let submitter = submitter.clone();
    tokio::spawn(async move { submitter.submit(input).await })
}

async fn wait_for_calls(service: &GatedService, n: usize) {
    for _ in 0..200 {
        if service.calls() >= n {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("expected {} calls, saw {}", n, service.calls());
}

fn answered(text: &str) -> DisplayState {
    DisplayState::Answered(text.to_string())
}

// ─── Last response to resolve wins ─────────────────────────────────

#[tokio::test]
async fn test_last_resolved_overwrites_newer_submission() {
    let service = Arc::new(GatedService::default());
    let first = service.gate("first");
    let second = service.gate("second");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LastResolved);

    let a = spawn_submit(&submitter, "first");
    wait_for_calls(&service, 1).await;
    let b = spawn_submit(&submitter, "second");
    wait_for_calls(&service, 2).await;
    assert!(submitter.display().is_pending());

    second.send(Ok("two".to_string())).unwrap();
    assert_eq!(b.await.unwrap(), SubmitOutcome::Rendered(answered("two")));
    assert_eq!(submitter.display(), answered("two"));

    // The older request resolves last and wins.
    first.send(Ok("one".to_string())).unwrap();
    assert_eq!(a.await.unwrap(), SubmitOutcome::Rendered(answered("one")));
    assert_eq!(submitter.display(), answered("one"));
}

#[tokio::test]
async fn test_last_resolved_clears_pending_while_other_in_flight() {
    let service = Arc::new(GatedService::default());
    let first = service.gate("first");
    let second = service.gate("second");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LastResolved);

    let a = spawn_submit(&submitter, "first");
    let b = spawn_submit(&submitter, "second");
    wait_for_calls(&service, 2).await;

    first
        .send(Err(AskError::Service {
            status: 500,
            detail: "model unavailable".to_string(),
        }))
        .unwrap();
    a.await.unwrap();

    let state = submitter.display();
    assert_eq!(state.content(), "Error: model unavailable");
    assert!(!state.is_pending());

    second.send(Ok("two".to_string())).unwrap();
    b.await.unwrap();
    assert_eq!(submitter.display(), answered("two"));
}

// ─── Only the latest submission renders ─────────────────────────────

#[tokio::test]
async fn test_latest_only_discards_stale_response() {
    let service = Arc::new(GatedService::default());
    let first = service.gate("first");
    let second = service.gate("second");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LatestOnly);

    let a = spawn_submit(&submitter, "first");
    wait_for_calls(&service, 1).await;
    let b = spawn_submit(&submitter, "second");
    wait_for_calls(&service, 2).await;

    second.send(Ok("two".to_string())).unwrap();
    assert_eq!(b.await.unwrap(), SubmitOutcome::Rendered(answered("two")));

    first.send(Ok("one".to_string())).unwrap();
    assert_eq!(a.await.unwrap(), SubmitOutcome::Discarded);
    assert_eq!(submitter.display(), answered("two"));
}

#[tokio::test]
async fn test_latest_only_stale_response_keeps_pending() {
    let service = Arc::new(GatedService::default());
    let first = service.gate("first");
    let second = service.gate("second");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LatestOnly);

    let a = spawn_submit(&submitter, "first");
    wait_for_calls(&service, 1).await;
    let b = spawn_submit(&submitter, "second");
    wait_for_calls(&service, 2).await;

    first.send(Ok("one".to_string())).unwrap();
    assert_eq!(a.await.unwrap(), SubmitOutcome::Discarded);
    assert_eq!(submitter.display(), DisplayState::Pending);

    second.send(Ok("two".to_string())).unwrap();
    assert_eq!(b.await.unwrap(), SubmitOutcome::Rendered(answered("two")));
    assert!(!submitter.display().is_pending());
}

#[tokio::test]
async fn test_rejected_input_does_not_supersede() {
    let service = Arc::new(GatedService::default());
    let first = service.gate("first");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LatestOnly);

    let a = spawn_submit(&submitter, "first");
    wait_for_calls(&service, 1).await;
    assert_eq!(submitter.submit("  ").await, SubmitOutcome::Rejected);

    first.send(Ok("one".to_string())).unwrap();
    assert_eq!(a.await.unwrap(), SubmitOutcome::Rendered(answered("one")));
}

// ─── Worker-thread interleavings ────────────────────────────────────

/// Fires `submissions` concurrent submits on worker threads, released
/// together by a barrier, and returns the display once all have settled.
async fn settle_burst(policy: SubmissionPolicy, submissions: usize) -> DisplayState {
    let submitter = Submitter::new(Arc::new(EchoService), policy);
    let barrier = Arc::new(tokio::sync::Barrier::new(submissions));

    let handles: Vec<_> = (0..submissions)
        .map(|i| {
            let submitter = submitter.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                submitter.submit(&format!("question {}", i)).await
            })
        })
        .collect();

    let mut rendered = 0;
    for handle in handles {
        if let SubmitOutcome::Rendered(_) = handle.await.unwrap() {
            rendered += 1;
        }
    }
    assert!(rendered >= 1, "at least the latest submission must render");

    submitter.display()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_latest_only_never_left_pending_under_contention() {
    for trial in 0..500 {
        let state = settle_burst(SubmissionPolicy::LatestOnly, 16).await;
        assert!(
            !state.is_pending(),
            "trial {}: display stuck pending after all submissions settled",
            trial
        );
        assert!(
            state.content().starts_with("question "),
            "trial {}: latest answer missing, got {:?}",
            trial,
            state
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_last_resolved_never_left_pending_under_contention() {
    for trial in 0..500 {
        let state = settle_burst(SubmissionPolicy::LastResolved, 16).await;
        assert!(
            !state.is_pending(),
            "trial {}: display stuck pending after all submissions settled",
            trial
        );
    }
}

// ─── Pending cleanup and notices ────────────────────────────────────

#[tokio::test]
async fn test_dropped_submission_clears_pending() {
    let service = Arc::new(GatedService::default());
    let _gate = service.gate("never answered");
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LastResolved);

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        submitter.submit("never answered"),
    )
    .await;

    assert!(result.is_err(), "submission should still be in flight");
    assert_eq!(service.calls(), 1);
    assert_eq!(submitter.display(), DisplayState::Idle);
}

#[tokio::test]
async fn test_notices_follow_submission_lifecycle() {
    let service = Arc::new(GatedService::default());
    let gate = service.gate("q");
    let notifier = Arc::new(RecordingNotifier::default());
    let submitter = Submitter::new(service.clone(), SubmissionPolicy::LastResolved)
        .with_notifier(notifier.clone());

    submitter.submit("").await;
    gate.send(Ok("a".to_string())).unwrap();
    submitter.submit("q").await;

    assert_eq!(
        *notifier.notices.lock().unwrap(),
        vec![
            Notice::EmptyQuestion,
            Notice::Pending { seq: 1 },
            Notice::Settled {
                seq: 1,
                failed: false
            },
        ]
    );
}
