use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::subject::Subject;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResultError {
    #[error("score ({score}) exceeds total ({total})")]
    ScoreExceedsTotal { score: u32, total: u32 },

    #[error("classified questions ({classified}) do not cover total ({total})")]
    ClassificationMismatch { classified: usize, total: u32 },

    #[error("subject totals ({sum}) do not add up to total ({total})")]
    SubjectTotalMismatch { sum: u32, total: u32 },
}

//
// ─── SUBJECT BREAKDOWN ─────────────────────────────────────────────────────────
//

/// Per-subject rollup of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubjectBreakdown {
    pub score: u32,
    pub total: u32,
    pub answered: u32,
    pub unanswered: u32,
    pub correct: u32,
    pub wrong: u32,
    pub marked: u32,
}

//
// ─── TEST RESULT ───────────────────────────────────────────────────────────────
//

/// Scored outcome of one attempt. Created exactly once, at submission,
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    score: u32,
    total: u32,
    correct_indices: Vec<usize>,
    wrong_indices: Vec<usize>,
    unattempted_indices: Vec<usize>,
    subject_wise: BTreeMap<Subject, SubjectBreakdown>,
    time_taken_seconds: u32,
}

impl TestResult {
    /// Assembles a result, checking the cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns `ResultError` if `score > total`, the three index buckets do
    /// not cover every question exactly once, or the subject totals do not
    /// add up to `total`.
    pub fn from_parts(
        score: u32,
        total: u32,
        correct_indices: Vec<usize>,
        wrong_indices: Vec<usize>,
        unattempted_indices: Vec<usize>,
        subject_wise: BTreeMap<Subject, SubjectBreakdown>,
        time_taken_seconds: u32,
    ) -> Result<Self, ResultError> {
        if score > total {
            return Err(ResultError::ScoreExceedsTotal { score, total });
        }
        let classified =
            correct_indices.len() + wrong_indices.len() + unattempted_indices.len();
        if classified != total as usize {
            return Err(ResultError::ClassificationMismatch { classified, total });
        }
        let sum: u32 = subject_wise.values().map(|b| b.total).sum();
        if sum != total {
            return Err(ResultError::SubjectTotalMismatch { sum, total });
        }

        Ok(Self {
            score,
            total,
            correct_indices,
            wrong_indices,
            unattempted_indices,
            subject_wise,
            time_taken_seconds,
        })
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn correct_indices(&self) -> &[usize] {
        &self.correct_indices
    }

    #[must_use]
    pub fn wrong_indices(&self) -> &[usize] {
        &self.wrong_indices
    }

    #[must_use]
    pub fn unattempted_indices(&self) -> &[usize] {
        &self.unattempted_indices
    }

    #[must_use]
    pub fn subject_wise(&self) -> &BTreeMap<Subject, SubjectBreakdown> {
        &self.subject_wise
    }

    #[must_use]
    pub fn time_taken_seconds(&self) -> u32 {
        self.time_taken_seconds
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
