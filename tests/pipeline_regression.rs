//! Pipeline Regression Tests
//!
//! End-to-end frame submission through `ExerciseService` with a counting
//! text backend, covering caching, fallback and validation paths.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use physio_pulse::feedback::{FeedbackCache, FeedbackGenerator};
use physio_pulse::llm::LlmBackend;
use physio_pulse::storage::{InMemoryStore, SledStore, Store};
use physio_pulse::{CoreError, ExerciseService, ExerciseType, FeedbackSource, FrameInput, Identity};

/// Returns a numbered reply per call and counts invocations
struct CountingBackend {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: false,
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            fail: true,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for CountingBackend {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            anyhow::bail!("service unavailable");
        }
        Ok(format!("  Nice depth, keep your chest up ({n}).  "))
    }

    fn backend_name(&self) -> &'static str {
        "Counting"
    }
}

fn service_with(store: Arc<dyn Store>, backend: Arc<CountingBackend>) -> ExerciseService {
    let generator = FeedbackGenerator::new(
        backend,
        Arc::new(FeedbackCache::new(Some(16))),
        Duration::from_secs(2),
    );
    ExerciseService::new(store, generator, 30)
}

fn frame(knee: f64, stage: &str, rep_count: i64) -> FrameInput {
    let mut angles = BTreeMap::new();
    angles.insert("knee".to_string(), knee);
    FrameInput {
        angles: Some(angles),
        stage: stage.to_string(),
        rep_count,
        timestamp: 0.0,
        side: None,
    }
}

#[tokio::test]
async fn squat_frames_with_same_stage_and_rep_share_feedback() {
    let backend = CountingBackend::new();
    let svc = service_with(Arc::new(InMemoryStore::new()), Arc::clone(&backend));
    let alice = Identity::patient("alice");
    let session = svc.start_session(&alice, ExerciseType::Squat).await.unwrap();

    let first = svc.submit_frame(&alice, session.id, &frame(90.0, "down", 1)).await.unwrap();
    assert!(first.frame_saved);
    assert_eq!(first.rep_count, 1);
    assert_eq!(first.stage, "down");
    assert_eq!(first.feedback, "Nice depth, keep your chest up (1).");
    assert_eq!(first.feedback_source, FeedbackSource::Generated);

    let second = svc.submit_frame(&alice, session.id, &frame(75.0, "down", 1)).await.unwrap();
    assert_eq!(second.feedback, first.feedback);
    assert_eq!(second.feedback_source, FeedbackSource::Cached);
    assert_eq!(backend.calls(), 1);

    let frames = svc.store().frames_for_session(session.id).await.unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].angles.get("knee"), Some(&90.0));
    assert_eq!(frames[1].angles.get("knee"), Some(&75.0));
}

#[tokio::test]
async fn negative_rep_count_persists_nothing() {
    let backend = CountingBackend::new();
    let svc = service_with(Arc::new(InMemoryStore::new()), Arc::clone(&backend));
    let alice = Identity::patient("alice");
    let session = svc.start_session(&alice, ExerciseType::Squat).await.unwrap();

    let err = svc
        .submit_frame(&alice, session.id, &frame(90.0, "down", -1))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(err.code(), "VALIDATION_ERROR");

    assert!(svc.store().frames_for_session(session.id).await.unwrap().is_empty());
    assert!(svc.store().feedback_for_session(session.id).await.unwrap().is_empty());
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn failing_service_falls_back_and_retries_next_time() {
    let backend = CountingBackend::failing();
    let svc = service_with(Arc::new(InMemoryStore::new()), Arc::clone(&backend));
    let alice = Identity::patient("alice");
    let session = svc.start_session(&alice, ExerciseType::Pushup).await.unwrap();

    for _ in 0..2 {
        let ack = svc.submit_frame(&alice, session.id, &frame(90.0, "down", 1)).await.unwrap();
        assert_eq!(ack.feedback, "Keep going! You're doing great with your pushup exercise.");
        assert!(matches!(ack.feedback_source, FeedbackSource::Fallback(_)));
    }

    // Fallback text is never cached, so each frame reaches the service.
    assert_eq!(backend.calls(), 2);
    assert_eq!(svc.generator().cache().len(), 0);

    let feedback = svc.store().feedback_for_session(session.id).await.unwrap();
    assert_eq!(feedback.len(), 2);
}

#[tokio::test]
async fn summary_reflects_max_rep_and_latest_feedback() {
    let backend = CountingBackend::new();
    let svc = service_with(Arc::new(InMemoryStore::new()), Arc::clone(&backend));
    let alice = Identity::patient("alice");
    let session = svc.start_session(&alice, ExerciseType::ShoulderRaise).await.unwrap();

    for (stage, rep) in [("up", 1), ("down", 1), ("up", 2), ("down", 2), ("up", 3)] {
        svc.submit_frame(&alice, session.id, &frame(45.0, stage, rep)).await.unwrap();
    }

    let summary = svc.session_summary(&alice, session.id).await.unwrap();
    assert_eq!(summary.total_reps, 3);
    assert_eq!(summary.total_frames, 5);
    assert_eq!(summary.feedback_count, 5);
    assert_eq!(summary.latest_feedback.len(), 3);
    assert_eq!(summary.latest_feedback[2], "Nice depth, keep your chest up (5).");
}

#[tokio::test]
async fn sled_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pulse.db");
    let alice = Identity::patient("alice");

    let session_id = {
        let store = Arc::new(SledStore::open(&path).unwrap());
        let svc = service_with(store.clone(), CountingBackend::new());
        let session = svc.start_session(&alice, ExerciseType::KneeBend).await.unwrap();
        svc.submit_frame(&alice, session.id, &frame(120.0, "down", 1)).await.unwrap();
        svc.end_session(&alice, session.id).await.unwrap();
        store.flush().unwrap();
        session.id
    };

    let store = Arc::new(SledStore::open(&path).unwrap());
    let svc = service_with(store, CountingBackend::new());
    let summary = svc.session_summary(&alice, session_id).await.unwrap();
    assert_eq!(summary.total_frames, 1);
    assert_eq!(summary.total_reps, 1);
    assert!(summary.session.end_time.is_some());

    let report = svc.progress(&alice, "alice", None).await.unwrap();
    assert_eq!(report.len(), 1);
}
