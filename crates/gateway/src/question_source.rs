use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use exam_core::model::{TestId, TestPaper};

use crate::error::GatewayError;

/// Source of test material for an attempt.
///
/// The production implementation sits in front of whatever store hosts the
/// question bank; the engine only depends on this contract.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the paper for a test.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::NotFound` if the test does not exist, or other
    /// gateway errors.
    async fn fetch_paper(&self, test_id: &TestId) -> Result<TestPaper, GatewayError>;
}

/// In-memory question source for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryQuestionSource {
    papers: Arc<Mutex<HashMap<TestId, TestPaper>>>,
}

impl InMemoryQuestionSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            papers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Registers a paper under its own test id.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Connection` if the internal lock is poisoned.
    pub fn insert(&self, paper: TestPaper) -> Result<(), GatewayError> {
        let mut guard = self
            .papers
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        guard.insert(paper.test_id().clone(), paper);
        Ok(())
    }
}

#[async_trait]
impl QuestionSource for InMemoryQuestionSource {
    async fn fetch_paper(&self, test_id: &TestId) -> Result<TestPaper, GatewayError> {
        let guard = self
            .papers
            .lock()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        guard.get(test_id).cloned().ok_or(GatewayError::NotFound)
    }
}
