use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use url::Url;

use crate::model::ids::{QuestionId, TestId};
use crate::model::subject::Subject;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("question needs at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("question needs at least one correct answer")]
    NoCorrectAnswer,

    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectIndexOutOfRange { index: usize, options: usize },

    #[error("single-answer question must have exactly one correct index, got {0}")]
    AmbiguousSingleAnswer(usize),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PaperError {
    #[error("test paper contains no questions")]
    NoQuestions,

    #[error("test duration must be > 0 seconds")]
    ZeroDuration,

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// One selectable option of a question. The label may be supplemented (or
/// replaced) by a hosted image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub label: String,
    pub image_url: Option<Url>,
}

impl QuestionOption {
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            image_url: None,
        }
    }

    #[must_use]
    pub fn with_image(label: impl Into<String>, image_url: Url) -> Self {
        Self {
            label: label.into(),
            image_url: Some(image_url),
        }
    }
}

/// A single question of a test paper. Immutable for the duration of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    text: String,
    image_url: Option<Url>,
    options: Vec<QuestionOption>,
    correct_answers: BTreeSet<usize>,
    is_multiple: bool,
    subject: Subject,
}

impl Question {
    /// Builds a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text is blank, fewer than two options
    /// are given, any correct index is out of range, no correct answer is
    /// given, or a single-answer question carries more than one correct index.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        image_url: Option<Url>,
        options: Vec<QuestionOption>,
        correct_answers: BTreeSet<usize>,
        is_multiple: bool,
        subject: Subject,
    ) -> Result<Self, QuestionError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuestionError::EmptyText);
        }
        if options.len() < 2 {
            return Err(QuestionError::TooFewOptions(options.len()));
        }
        if correct_answers.is_empty() {
            return Err(QuestionError::NoCorrectAnswer);
        }
        if let Some(&index) = correct_answers.iter().find(|&&i| i >= options.len()) {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index,
                options: options.len(),
            });
        }
        if !is_multiple && correct_answers.len() != 1 {
            return Err(QuestionError::AmbiguousSingleAnswer(correct_answers.len()));
        }

        Ok(Self {
            id,
            text,
            image_url,
            options,
            correct_answers,
            is_multiple,
            subject,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&Url> {
        self.image_url.as_ref()
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn correct_answers(&self) -> &BTreeSet<usize> {
        &self.correct_answers
    }

    /// The sole correct index of a single-answer question.
    ///
    /// Single-answer questions are validated to carry exactly one correct
    /// index, so this is only `None` for multiple-answer questions.
    #[must_use]
    pub fn single_correct_answer(&self) -> Option<usize> {
        if self.is_multiple {
            None
        } else {
            self.correct_answers.first().copied()
        }
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.is_multiple
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }
}

//
// ─── TEST PAPER ────────────────────────────────────────────────────────────────
//

/// The material for one attempt, as returned by a question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestPaper {
    test_id: TestId,
    title: String,
    duration_seconds: u32,
    questions: Vec<Question>,
}

impl TestPaper {
    /// Builds a validated paper.
    ///
    /// # Errors
    ///
    /// Returns `PaperError::NoQuestions` for an empty question list and
    /// `PaperError::ZeroDuration` for a zero duration.
    pub fn new(
        test_id: TestId,
        title: impl Into<String>,
        duration_seconds: u32,
        questions: Vec<Question>,
    ) -> Result<Self, PaperError> {
        if questions.is_empty() {
            return Err(PaperError::NoQuestions);
        }
        if duration_seconds == 0 {
            return Err(PaperError::ZeroDuration);
        }

        Ok(Self {
            test_id,
            title: title.into(),
            duration_seconds,
            questions,
        })
    }

    #[must_use]
    pub fn test_id(&self) -> &TestId {
        &self.test_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_seconds(&self) -> u32 {
        self.duration_seconds
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Number of questions on this paper.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Distinct subjects in paper order of first appearance.
    #[must_use]
    pub fn subjects(&self) -> Vec<Subject> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        for question in &self.questions {
            if seen.insert(question.subject().clone()) {
                ordered.push(question.subject().clone());
            }
        }
        ordered
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
