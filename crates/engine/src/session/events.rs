use exam_core::model::{Subject, TestResult};

/// Everything that can mutate a session, user intents and platform signals
/// alike. The reducer in `SessionController` is the only code path that
/// applies them to session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The student asked to begin the attempt.
    StartRequested,
    /// The student asked to resume a paused attempt.
    ResumeRequested,
    /// The platform reported a fullscreen change (true = fullscreen active).
    FullscreenChanged(bool),
    /// One second elapsed on the wall clock.
    TimerTick,
    /// The student picked an option for a question.
    AnswerSelected { question: usize, option: usize },
    /// The student cleared their response for a question.
    AnswerCleared { question: usize },
    /// The student flipped the mark-for-review flag on a question.
    MarkToggled { question: usize },
    /// The student moved to another question.
    NavigatedTo { question: usize },
    /// The student changed the subject filter.
    SubjectFilterChanged(Option<Subject>),
    /// The student asked to submit the attempt.
    SubmitRequested,
}

impl SessionEvent {
    /// Stable name for diagnostics and error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::StartRequested => "start",
            SessionEvent::ResumeRequested => "resume",
            SessionEvent::FullscreenChanged(_) => "fullscreen change",
            SessionEvent::TimerTick => "timer tick",
            SessionEvent::AnswerSelected { .. } => "answer selection",
            SessionEvent::AnswerCleared { .. } => "answer clearing",
            SessionEvent::MarkToggled { .. } => "mark toggle",
            SessionEvent::NavigatedTo { .. } => "navigation",
            SessionEvent::SubjectFilterChanged(_) => "subject filter change",
            SessionEvent::SubmitRequested => "submit",
        }
    }
}

/// Side effects requested by the reducer, to be executed outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Ask the platform for fullscreen; the outcome comes back as
    /// `SessionEvent::FullscreenChanged`.
    RequestFullscreen,
    /// Leave fullscreen on teardown.
    ExitFullscreen,
    /// Hand the scored result to the persistence gateway.
    Persist(TestResult),
}
