use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use exam_core::model::{AttemptId, StudentId, TestId, TestResult};

use crate::error::GatewayError;

/// Provenance of one submitted attempt, handed along with its result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptContext {
    pub attempt_id: AttemptId,
    pub test_id: TestId,
    pub student_id: StudentId,
    pub submitted_at: DateTime<Utc>,
}

/// Long-term home for scored results.
///
/// Called exactly once per session, after the terminal transition; the
/// engine never transitions based on the outcome of this call.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Record the result of one attempt.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError` if the result cannot be stored.
    async fn record_result(
        &self,
        result: &TestResult,
        context: &AttemptContext,
    ) -> Result<(), GatewayError>;
}

/// In-memory gateway that records every delivered result.
///
/// `fail_next` makes the next delivery fail once, for exercising the
/// persistence-failure path.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    recorded: Arc<Mutex<Vec<(AttemptContext, TestResult)>>>,
    fail_next: Arc<AtomicBool>,
}

impl RecordingGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `record_result` call fail with a connection error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    /// Snapshot of everything recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the internal lock is poisoned.
    pub fn recorded(&self) -> Result<Vec<(AttemptContext, TestResult)>, GatewayError> {
        let guard = self
            .recorded
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    /// Number of results delivered so far.
    #[must_use]
    pub fn recorded_count(&self) -> usize {
        self.recorded.lock().map(|g| g.len()).unwrap_or(0)
    }
}

#[async_trait]
impl PersistenceGateway for RecordingGateway {
    async fn record_result(
        &self,
        result: &TestResult,
        context: &AttemptContext,
    ) -> Result<(), GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Connection("injected failure".to_owned()));
        }
        let mut guard = self
            .recorded
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        guard.push((context.clone(), result.clone()));
        Ok(())
    }
}
