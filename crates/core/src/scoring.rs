use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::{
    AnswerSlot, AnswerStore, Question, ResultError, SubjectBreakdown, TestResult,
};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ScoringError {
    #[error("answer store length ({answers}) does not match question count ({questions})")]
    LengthMismatch { answers: usize, questions: usize },

    #[error("answer slot variant does not match the question kind at index {0}")]
    VariantMismatch(usize),

    #[error("remaining time ({remaining}s) exceeds test duration ({duration}s)")]
    RemainingExceedsDuration { remaining: u32, duration: u32 },

    #[error(transparent)]
    Result(#[from] ResultError),
}

//
// ─── CLASSIFICATION ────────────────────────────────────────────────────────────
//

/// How one question scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Correct,
    Wrong,
    Unattempted,
}

fn classify(question: &Question, slot: &AnswerSlot, index: usize) -> Result<Verdict, ScoringError> {
    if slot.is_unset() {
        return Ok(Verdict::Unattempted);
    }

    let correct = match (slot, question.is_multiple()) {
        (AnswerSlot::Single(selected), false) => {
            question.single_correct_answer() == Some(*selected)
        }
        // Set equality is order-independent and requires equal cardinality.
        (AnswerSlot::Multiple(selected), true) => selected == question.correct_answers(),
        _ => return Err(ScoringError::VariantMismatch(index)),
    };

    Ok(if correct { Verdict::Correct } else { Verdict::Wrong })
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Scores a finished attempt.
///
/// Pure and deterministic: identical `(questions, answers, marked)` always
/// yields an identical result. Invoked exactly once per session, at the
/// submitted transition.
///
/// # Errors
///
/// Returns `ScoringError` when the answer store does not line up with the
/// question list, a slot variant contradicts its question kind, or the
/// remaining time exceeds the duration. The session controller makes these
/// unreachable; they guard direct callers.
pub fn score_attempt(
    questions: &[Question],
    answers: &AnswerStore,
    marked: &BTreeSet<usize>,
    duration_seconds: u32,
    remaining_seconds: u32,
) -> Result<TestResult, ScoringError> {
    if answers.len() != questions.len() {
        return Err(ScoringError::LengthMismatch {
            answers: answers.len(),
            questions: questions.len(),
        });
    }
    if remaining_seconds > duration_seconds {
        return Err(ScoringError::RemainingExceedsDuration {
            remaining: remaining_seconds,
            duration: duration_seconds,
        });
    }

    let mut score = 0_u32;
    let mut correct_indices = Vec::new();
    let mut wrong_indices = Vec::new();
    let mut unattempted_indices = Vec::new();
    let mut subject_wise: BTreeMap<_, SubjectBreakdown> = BTreeMap::new();

    for (index, (question, slot)) in questions.iter().zip(answers.iter()).enumerate() {
        let verdict = classify(question, slot, index)?;
        let bucket = subject_wise.entry(question.subject().clone()).or_default();

        bucket.total += 1;
        if marked.contains(&index) {
            bucket.marked += 1;
        }

        match verdict {
            Verdict::Unattempted => {
                bucket.unanswered += 1;
                unattempted_indices.push(index);
            }
            Verdict::Correct => {
                bucket.answered += 1;
                bucket.correct += 1;
                bucket.score += 1;
                score += 1;
                correct_indices.push(index);
            }
            Verdict::Wrong => {
                bucket.answered += 1;
                bucket.wrong += 1;
                wrong_indices.push(index);
            }
        }
    }

    let total = u32::try_from(questions.len()).unwrap_or(u32::MAX);
    let result = TestResult::from_parts(
        score,
        total,
        correct_indices,
        wrong_indices,
        unattempted_indices,
        subject_wise,
        duration_seconds - remaining_seconds,
    )?;
    Ok(result)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
