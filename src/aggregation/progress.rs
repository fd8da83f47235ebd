//! Longitudinal progress over a trailing window

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::{CoreError, CoreResult};
use crate::storage::Store;
use crate::types::{ProgressEntry, ProgressReport};

/// Window used when the caller does not pass one
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Filters a user's sessions by start time
#[derive(Clone)]
pub struct ProgressAggregator {
    store: Arc<dyn Store>,
}

impl ProgressAggregator {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Sessions of `user_id` that started within `window_days` of now
    pub async fn progress(&self, user_id: &str, window_days: i64) -> CoreResult<ProgressReport> {
        self.progress_at(user_id, window_days, Utc::now()).await
    }

    /// Same as [`progress`](Self::progress) with an explicit reference time.
    ///
    /// The lower bound is inclusive: `start_time >= now - window_days`.
    pub async fn progress_at(
        &self,
        user_id: &str,
        window_days: i64,
        now: DateTime<Utc>,
    ) -> CoreResult<ProgressReport> {
        if window_days <= 0 {
            return Err(CoreError::InvalidRange(format!(
                "window_days must be a positive integer, got {window_days}"
            )));
        }

        let too_large =
            || CoreError::InvalidRange(format!("window_days {window_days} is too large"));
        let window = Duration::try_days(window_days).ok_or_else(too_large)?;
        let since = now.checked_sub_signed(window).ok_or_else(too_large)?;

        let sessions = self
            .store
            .sessions_for_user(user_id)
            .await?
            .iter()
            .filter(|s| s.start_time >= since)
            .map(ProgressEntry::from)
            .collect();

        Ok(ProgressReport {
            user_id: user_id.to_string(),
            window_days,
            since,
            sessions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;
    use crate::types::{ExerciseType, Session};

    async fn store_with(starts: &[DateTime<Utc>]) -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        for start in starts {
            store
                .insert_session(&Session::new("alice", ExerciseType::Squat, *start))
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_window_includes_29_days_excludes_31() {
        let now = Utc::now();
        let store = store_with(&[now - Duration::days(31), now - Duration::days(29)]).await;
        let agg = ProgressAggregator::new(store);

        let report = agg.progress_at("alice", 30, now).await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.sessions[0].start_time, now - Duration::days(29));
    }

    #[tokio::test]
    async fn test_lower_bound_is_inclusive() {
        let now = Utc::now();
        let store = store_with(&[now - Duration::days(7)]).await;
        let agg = ProgressAggregator::new(store);

        assert_eq!(agg.progress_at("alice", 7, now).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_positive_window_rejected() {
        let agg = ProgressAggregator::new(store_with(&[]).await);
        for days in [0, -5] {
            let err = agg.progress("alice", days).await.unwrap_err();
            assert!(matches!(err, CoreError::InvalidRange(_)));
        }
    }

    #[tokio::test]
    async fn test_requery_is_repeatable() {
        let now = Utc::now();
        let store = store_with(&[now - Duration::days(1), now - Duration::days(2)]).await;
        let agg = ProgressAggregator::new(store);

        let first = agg.progress_at("alice", 30, now).await.unwrap();
        let second = agg.progress_at("alice", 30, now).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.iter().count(), 2);
        assert!(agg.progress_at("bob", 30, now).await.unwrap().is_empty());
    }
}
