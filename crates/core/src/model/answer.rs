use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question index {index} is out of range for {len} questions")]
    QuestionOutOfRange { index: usize, len: usize },

    #[error("option index {index} is out of range for {options} options")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("answer slot variant does not match the question kind at index {0}")]
    VariantMismatch(usize),
}

//
// ─── ANSWER SLOT ───────────────────────────────────────────────────────────────
//

/// The captured response for one question.
///
/// The variant always matches the question kind: single-answer questions
/// hold `Single`, multiple-answer questions hold `Multiple`. Absence of a
/// response is `Unset`, never a missing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnswerSlot {
    #[default]
    Unset,
    Single(usize),
    Multiple(BTreeSet<usize>),
}

impl AnswerSlot {
    /// True when no response is captured. An empty `Multiple` set counts
    /// as unanswered.
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            AnswerSlot::Unset => true,
            AnswerSlot::Single(_) => false,
            AnswerSlot::Multiple(set) => set.is_empty(),
        }
    }

    /// Selected option indices, in ascending order.
    #[must_use]
    pub fn selected(&self) -> Vec<usize> {
        match self {
            AnswerSlot::Unset => Vec::new(),
            AnswerSlot::Single(index) => vec![*index],
            AnswerSlot::Multiple(set) => set.iter().copied().collect(),
        }
    }
}

//
// ─── ANSWER STORE ──────────────────────────────────────────────────────────────
//

/// One answer slot per question, with length fixed at construction.
///
/// There is no API that grows or shrinks the store, so
/// `store.len() == questions.len()` holds for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerStore {
    slots: Vec<AnswerSlot>,
}

impl AnswerStore {
    /// Creates a store with `len` unset slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![AnswerSlot::Unset; len],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Reads the slot for a question.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an invalid index.
    pub fn slot(&self, index: usize) -> Result<&AnswerSlot, AnswerError> {
        self.slots.get(index).ok_or(AnswerError::QuestionOutOfRange {
            index,
            len: self.slots.len(),
        })
    }

    /// True when the question has a captured response.
    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| !slot.is_unset())
    }

    /// Number of questions with a captured response.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_unset()).count()
    }

    /// Records a selection for a question.
    ///
    /// Single-answer questions replace the slot; multiple-answer questions
    /// toggle membership of `option` in the set. Toggling the last member
    /// off collapses the slot back to `Unset`.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` / `OptionOutOfRange` for
    /// invalid indices, and `VariantMismatch` when the existing slot variant
    /// contradicts `is_multiple`.
    pub fn select(
        &mut self,
        index: usize,
        option: usize,
        option_count: usize,
        is_multiple: bool,
    ) -> Result<(), AnswerError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AnswerError::QuestionOutOfRange { index, len })?;
        if option >= option_count {
            return Err(AnswerError::OptionOutOfRange {
                index: option,
                options: option_count,
            });
        }

        match (&mut *slot, is_multiple) {
            (AnswerSlot::Unset, false) | (AnswerSlot::Single(_), false) => {
                *slot = AnswerSlot::Single(option);
            }
            (AnswerSlot::Unset, true) => {
                *slot = AnswerSlot::Multiple(BTreeSet::from([option]));
            }
            (AnswerSlot::Multiple(set), true) => {
                if !set.insert(option) {
                    set.remove(&option);
                }
                if set.is_empty() {
                    *slot = AnswerSlot::Unset;
                }
            }
            (AnswerSlot::Single(_), true) | (AnswerSlot::Multiple(_), false) => {
                return Err(AnswerError::VariantMismatch(index));
            }
        }
        Ok(())
    }

    /// Resets the slot for a question back to `Unset`. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::QuestionOutOfRange` for an invalid index.
    pub fn clear(&mut self, index: usize) -> Result<(), AnswerError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AnswerError::QuestionOutOfRange { index, len })?;
        *slot = AnswerSlot::Unset;
        Ok(())
    }

    /// Iterates over all slots in question order.
    pub fn iter(&self) -> impl Iterator<Item = &AnswerSlot> {
        self.slots.iter()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
