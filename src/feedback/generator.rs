//! Feedback generation
//!
//! Cache first, then the generative text service under a timeout, then a
//! canned fallback. Never returns an error: feedback is advisory and the
//! frame-submission path must not block or fail on it.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::cache::{FeedbackCache, FeedbackKey};
use super::prompt::build_prompt;
use crate::llm::LlmBackend;
use crate::types::{ExerciseType, FallbackReason, Feedback, FeedbackSource, Frame};

/// Canned message used whenever generation fails
pub fn fallback_message(exercise: ExerciseType) -> String {
    format!("Keep going! You're doing great with your {exercise} exercise.")
}

/// Produces coaching feedback for a frame
pub struct FeedbackGenerator {
    backend: Arc<dyn LlmBackend>,
    cache: Arc<FeedbackCache>,
    timeout: Duration,
}

impl FeedbackGenerator {
    pub fn new(backend: Arc<dyn LlmBackend>, cache: Arc<FeedbackCache>, timeout: Duration) -> Self {
        Self {
            backend,
            cache,
            timeout,
        }
    }

    pub fn cache(&self) -> &FeedbackCache {
        &self.cache
    }

    /// Generate feedback for `frame`, using `history` (arrival order) as context.
    pub async fn generate(
        &self,
        exercise: ExerciseType,
        frame: &Frame,
        history: &[Frame],
    ) -> Feedback {
        let key = FeedbackKey::new(exercise, frame.stage.clone(), frame.rep_count);

        if let Some(text) = self.cache.lookup(&key) {
            debug!(signature = %key.signature(), "Feedback cache hit");
            return Feedback {
                text,
                source: FeedbackSource::Cached,
            };
        }
        debug!(signature = %key.signature(), "Feedback cache miss");

        let prompt = build_prompt(exercise, frame, history);

        let outcome = tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await;
        let reason = match outcome {
            Ok(Ok(raw)) => {
                let text = raw.trim();
                if text.is_empty() {
                    FallbackReason::EmptyResponse
                } else {
                    self.cache.store(key, text);
                    return Feedback {
                        text: text.to_string(),
                        source: FeedbackSource::Generated,
                    };
                }
            }
            Ok(Err(e)) => FallbackReason::ServiceError(e.to_string()),
            Err(_) => FallbackReason::Timeout,
        };

        warn!(
            backend = self.backend.backend_name(),
            exercise = %exercise,
            reason = ?reason,
            "Feedback generation failed, using fallback"
        );

        Feedback {
            text: fallback_message(exercise),
            source: FeedbackSource::Fallback(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Scripted backend that counts calls
    struct ScriptedBackend {
        reply: Option<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                delay: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmBackend for ScriptedBackend {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match &self.reply {
                Some(text) => Ok(text.clone()),
                None => anyhow::bail!("service unavailable"),
            }
        }

        fn backend_name(&self) -> &'static str {
            "Scripted"
        }
    }

    fn frame(stage: &str, rep: u32, knee: f64) -> Frame {
        let mut angles = BTreeMap::new();
        angles.insert("knee".to_string(), knee);
        Frame {
            session_id: Uuid::new_v4(),
            angles,
            stage: stage.to_string(),
            rep_count: rep,
            timestamp: 0.0,
            side: None,
            created_at: Utc::now(),
        }
    }

    fn generator(backend: Arc<ScriptedBackend>, timeout: Duration) -> FeedbackGenerator {
        FeedbackGenerator::new(backend, Arc::new(FeedbackCache::unbounded()), timeout)
    }

    #[tokio::test]
    async fn test_generated_text_is_trimmed_and_cached() {
        let backend = Arc::new(ScriptedBackend::replying("  Nice and deep!\n"));
        let gen = generator(Arc::clone(&backend), Duration::from_secs(5));

        let fb = gen.generate(ExerciseType::Squat, &frame("down", 1, 90.0), &[]).await;
        assert_eq!(fb.text, "Nice and deep!");
        assert_eq!(fb.source, FeedbackSource::Generated);
        assert_eq!(
            gen.cache().lookup(&FeedbackKey::new(ExerciseType::Squat, "down", 1)).as_deref(),
            Some("Nice and deep!")
        );
    }

    #[tokio::test]
    async fn test_cache_hit_skips_service_even_with_different_angles() {
        let backend = Arc::new(ScriptedBackend::replying("Keep your back straight"));
        let gen = generator(Arc::clone(&backend), Duration::from_secs(5));

        let first = gen.generate(ExerciseType::Squat, &frame("down", 1, 90.0), &[]).await;
        let second = gen.generate(ExerciseType::Squat, &frame("down", 1, 75.0), &[]).await;

        assert_eq!(first.text, second.text);
        assert_eq!(second.source, FeedbackSource::Cached);
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_service_failure_returns_exact_fallback_without_caching() {
        let backend = Arc::new(ScriptedBackend::failing());
        let gen = generator(Arc::clone(&backend), Duration::from_secs(5));

        let fb = gen.generate(ExerciseType::Pushup, &frame("up", 2, 160.0), &[]).await;
        assert_eq!(fb.text, "Keep going! You're doing great with your pushup exercise.");
        assert!(matches!(fb.source, FeedbackSource::Fallback(FallbackReason::ServiceError(_))));
        assert!(gen.cache().is_empty());

        // Not cached, so the next identical frame retries the service
        gen.generate(ExerciseType::Pushup, &frame("up", 2, 160.0), &[]).await;
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_fallback() {
        let backend = Arc::new(ScriptedBackend {
            reply: Some("too late".to_string()),
            delay: Some(Duration::from_millis(500)),
            calls: AtomicUsize::new(0),
        });
        let gen = generator(backend, Duration::from_millis(20));

        let fb = gen.generate(ExerciseType::KneeBend, &frame("down", 0, 45.0), &[]).await;
        assert_eq!(fb.source, FeedbackSource::Fallback(FallbackReason::Timeout));
        assert_eq!(fb.text, fallback_message(ExerciseType::KneeBend));
        assert!(gen.cache().is_empty());
    }

    #[tokio::test]
    async fn test_blank_response_is_treated_as_failure() {
        let backend = Arc::new(ScriptedBackend::replying("   "));
        let gen = generator(backend, Duration::from_secs(5));

        let fb = gen.generate(ExerciseType::ShoulderRaise, &frame("up", 3, 170.0), &[]).await;
        assert_eq!(fb.source, FeedbackSource::Fallback(FallbackReason::EmptyResponse));
        assert_eq!(fb.text, "Keep going! You're doing great with your shoulder_raise exercise.");
    }
}
