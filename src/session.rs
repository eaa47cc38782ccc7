use crate::classifier::MockClassifier;
use crate::error::ClassifyError;
use crate::models::ClassificationResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Tracks analyses started by one user so only the newest result is kept.
///
/// Each call to [`submit`](Self::submit) takes a sequence number. When it
/// resolves after a newer submission has started, its result is dropped.
#[derive(Debug)]
pub struct AnalysisSession {
    classifier: Arc<MockClassifier>,
    latest: AtomicU64,
}

impl AnalysisSession {
    pub fn new(classifier: Arc<MockClassifier>) -> Self {
        Self {
            classifier,
            latest: AtomicU64::new(0),
        }
    }

    /// Returns `Ok(None)` when the submission was superseded, whether it succeeded or failed.
    pub async fn submit(
        &self,
        image: &[u8],
    ) -> Result<Option<ClassificationResult>, ClassifyError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.classifier.classify(image).await;
        let current = self.latest.load(Ordering::SeqCst);
        if current != ticket {
            debug!(ticket, current, failed = result.is_err(), "discarding superseded analysis");
            return Ok(None);
        }
        result.map(Some)
    }

    /// Sequence number of the most recent submission.
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::ClassifierConfig;
    use futures_util::future::join;
    use std::time::Duration;

    fn session(latency: Duration) -> AnalysisSession {
        let classifier =
            MockClassifier::new(ClassifierConfig::default().with_latency(latency)).unwrap();
        AnalysisSession::new(Arc::new(classifier))
    }

    #[actix_rt::test]
    async fn single_submission_is_kept() {
        let session = session(Duration::ZERO);
        let result = session.submit(b"img").await.unwrap();
        assert!(result.is_some());
        assert_eq!(session.current(), 1);
    }

    #[actix_rt::test]
    async fn older_submission_is_discarded() {
        let session = session(Duration::from_millis(20));
        let (first, second) = join(session.submit(b"first"), session.submit(b"second")).await;
        assert!(first.unwrap().is_none());
        assert!(second.unwrap().is_some());
        assert_eq!(session.current(), 2);
    }

    #[actix_rt::test]
    async fn superseded_failure_is_discarded() {
        // NaN bounds make every call fail during normalization
        let config = ClassifierConfig::default()
            .with_confidence_range(f64::NAN, f64::NAN)
            .with_latency(Duration::from_millis(20));
        let session = AnalysisSession::new(Arc::new(MockClassifier::unchecked(config)));

        let (first, second) = join(session.submit(b"first"), session.submit(b"second")).await;
        assert!(matches!(first, Ok(None)));
        assert!(matches!(second, Err(ClassifyError::ClassificationFailed(_))));
    }

    #[actix_rt::test]
    async fn sequential_submissions_are_all_kept() {
        let session = session(Duration::ZERO);
        for _ in 0..3 {
            assert!(session.submit(&[]).await.unwrap().is_some());
        }
        assert_eq!(session.current(), 3);
    }
}
