use std::collections::BTreeSet;

use exam_core::model::{AnswerStore, Subject};

/// Lifecycle of one attempt. Exactly one status is active at any instant;
/// `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    NotStarted,
    FullscreenGate,
    InProgress,
    Paused,
    Submitted,
}

/// Mutable state of one attempt, owned exclusively by its controller.
///
/// `visited` and `marked` only grow while the attempt is live; clearing an
/// answer never removes visited/marked membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub status: SessionStatus,
    pub time_remaining_seconds: u32,
    pub current_index: usize,
    pub subject_filter: Option<Subject>,
    pub visited: BTreeSet<usize>,
    pub marked: BTreeSet<usize>,
    pub answers: AnswerStore,
}

impl SessionState {
    /// Fresh state for a paper with `question_count` questions.
    #[must_use]
    pub fn new(question_count: usize, duration_seconds: u32) -> Self {
        Self {
            status: SessionStatus::NotStarted,
            time_remaining_seconds: duration_seconds,
            current_index: 0,
            subject_filter: None,
            visited: BTreeSet::new(),
            marked: BTreeSet::new(),
            answers: AnswerStore::new(question_count),
        }
    }
}
