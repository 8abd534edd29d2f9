use std::fmt;
use tracing::{debug, warn};

use exam_core::model::{
    palette_state, AnswerError, PaletteState, Question, Subject, TestPaper, TestResult,
};
use exam_core::scoring::score_attempt;

use crate::error::SessionError;
use crate::session::events::{Effect, SessionEvent};
use crate::session::progress::SessionProgress;
use crate::session::state::{SessionState, SessionStatus};
use crate::timer::{Countdown, TickOutcome};

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// State machine for one timed attempt.
///
/// Owns the session state exclusively; `apply` is the only code path that
/// mutates it, which serializes the racing event sources (timer ticks,
/// fullscreen changes, user input) into one transition function.
///
/// User intents invoked while the status does not permit them fail with
/// `InvalidTransition` and leave state untouched. Platform events (ticks,
/// fullscreen changes) that arrive in a status that does not accept them are
/// silently dropped. Once submitted, every event is a no-op, which is the
/// idempotence guard against a manual submit racing timer expiry.
pub struct SessionController {
    paper: TestPaper,
    state: SessionState,
    timer: Countdown,
    result: Option<TestResult>,
}

impl SessionController {
    /// Builds a controller for a validated paper, in `NotStarted`.
    #[must_use]
    pub fn new(paper: TestPaper) -> Self {
        let state = SessionState::new(paper.len(), paper.duration_seconds());
        let timer = Countdown::new(paper.duration_seconds());
        Self {
            paper,
            state,
            timer,
            result: None,
        }
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn paper(&self) -> &TestPaper {
        &self.paper
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    #[must_use]
    pub fn time_remaining_seconds(&self) -> u32 {
        self.state.time_remaining_seconds
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.paper.questions().get(self.state.current_index)
    }

    #[must_use]
    pub fn subject_filter(&self) -> Option<&Subject> {
        self.state.subject_filter.as_ref()
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.state.status == SessionStatus::Submitted
    }

    /// The scored outcome, available once submitted. Created exactly once
    /// and frozen afterwards.
    #[must_use]
    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Palette state of one question, `None` for an out-of-range index.
    #[must_use]
    pub fn palette_state_of(&self, index: usize) -> Option<PaletteState> {
        if index >= self.paper.len() {
            return None;
        }
        Some(palette_state(
            self.state.visited.contains(&index),
            self.state.marked.contains(&index),
            self.state.answers.is_answered(index),
        ))
    }

    /// Absolute question indices matching the active subject filter, in
    /// paper order. Without a filter this is every index.
    ///
    /// All session state is keyed by absolute index; this mapping is how
    /// filtered positions resolve, and it is derived fresh on every call so
    /// it can never go stale when the filter changes.
    #[must_use]
    pub fn filtered_indices(&self) -> Vec<usize> {
        match &self.state.subject_filter {
            None => (0..self.paper.len()).collect(),
            Some(subject) => self
                .paper
                .questions()
                .iter()
                .enumerate()
                .filter(|(_, q)| q.subject() == subject)
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Aggregate progress counts for display.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.paper.len();
        let answered = self.state.answers.answered_count();
        let visited = self.state.visited.len();
        SessionProgress {
            total,
            answered,
            unanswered: visited.saturating_sub(answered),
            marked: self.state.marked.len(),
            not_visited: total.saturating_sub(visited),
            is_submitted: self.is_submitted(),
        }
    }

    //
    // ─── OPERATIONS ────────────────────────────────────────────────────────────
    //

    /// Requests the start of the attempt. See `apply`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `NotStarted`.
    pub fn start(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.apply(SessionEvent::StartRequested)
    }

    /// Requests resumption of a paused attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is `Paused`.
    pub fn resume(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.apply(SessionEvent::ResumeRequested)
    }

    /// Records a selection and marks the question visited.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress` and `Answer` errors
    /// for invalid indices.
    pub fn select_answer(&mut self, question: usize, option: usize) -> Result<(), SessionError> {
        self.apply(SessionEvent::AnswerSelected { question, option })
            .map(drop)
    }

    /// Clears the response for a question. Idempotent; visited and marked
    /// membership are untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress` and `Answer` errors
    /// for an invalid index.
    pub fn unanswer(&mut self, question: usize) -> Result<(), SessionError> {
        self.apply(SessionEvent::AnswerCleared { question }).map(drop)
    }

    /// Flips mark-for-review membership for a question.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress` and `Answer` errors
    /// for an invalid index.
    pub fn toggle_mark(&mut self, question: usize) -> Result<(), SessionError> {
        self.apply(SessionEvent::MarkToggled { question }).map(drop)
    }

    /// Moves to a question by absolute index, marking it visited. Answers
    /// are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress` and `Answer` errors
    /// for an invalid index.
    pub fn navigate_to(&mut self, question: usize) -> Result<(), SessionError> {
        self.apply(SessionEvent::NavigatedTo { question }).map(drop)
    }

    /// Moves to a question by its position in the filtered view.
    ///
    /// # Errors
    ///
    /// Same failure shape as `navigate_to`; an out-of-range filtered
    /// position maps to an out-of-range absolute index error.
    pub fn navigate_filtered(&mut self, position: usize) -> Result<(), SessionError> {
        let absolute = self
            .filtered_indices()
            .get(position)
            .copied()
            .unwrap_or(self.paper.len());
        self.navigate_to(absolute)
    }

    /// Replaces the subject filter. When the current question falls outside
    /// the new view, navigation moves to the first filtered question.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress`.
    pub fn set_subject_filter(&mut self, filter: Option<Subject>) -> Result<(), SessionError> {
        self.apply(SessionEvent::SubjectFilterChanged(filter)).map(drop)
    }

    /// Submits the attempt manually.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress`; a repeat submit on
    /// an already-submitted session is a silent no-op.
    pub fn submit(&mut self) -> Result<Vec<Effect>, SessionError> {
        self.apply(SessionEvent::SubmitRequested)
    }

    //
    // ─── REDUCER ───────────────────────────────────────────────────────────────
    //

    /// Applies one event to the session, returning the effects to execute.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for user intents the current status does
    /// not permit, and `Answer`/`Scoring` errors for invalid indices. State
    /// is never left partially mutated on error.
    pub fn apply(&mut self, event: SessionEvent) -> Result<Vec<Effect>, SessionError> {
        use SessionStatus::{FullscreenGate, InProgress, NotStarted, Paused, Submitted};

        // Terminal: late ticks, stray fullscreen events, and repeat submits
        // all land here and must not observe or mutate anything.
        if self.state.status == Submitted {
            return Ok(Vec::new());
        }

        match event {
            SessionEvent::StartRequested => match self.state.status {
                NotStarted => {
                    self.transition(FullscreenGate);
                    Ok(vec![Effect::RequestFullscreen])
                }
                from => Err(self.rejected(from, &event)),
            },

            SessionEvent::ResumeRequested => match self.state.status {
                Paused => Ok(vec![Effect::RequestFullscreen]),
                from => Err(self.rejected(from, &event)),
            },

            SessionEvent::FullscreenChanged(true) => {
                match self.state.status {
                    FullscreenGate => {
                        self.transition(InProgress);
                        // The opening question counts as visited immediately.
                        self.state.visited.insert(self.state.current_index);
                    }
                    Paused => self.transition(InProgress),
                    NotStarted | InProgress => {}
                    Submitted => unreachable!("terminal status handled above"),
                }
                Ok(Vec::new())
            }

            SessionEvent::FullscreenChanged(false) => {
                match self.state.status {
                    // Permission denied at the gate: back to square one.
                    FullscreenGate => self.transition(NotStarted),
                    InProgress => {
                        warn!(
                            remaining = self.state.time_remaining_seconds,
                            "fullscreen lost, pausing attempt"
                        );
                        self.transition(Paused);
                    }
                    NotStarted | Paused => {}
                    Submitted => unreachable!("terminal status handled above"),
                }
                Ok(Vec::new())
            }

            SessionEvent::TimerTick => {
                if self.state.status != InProgress {
                    return Ok(Vec::new());
                }
                match self.timer.tick() {
                    TickOutcome::Running(remaining) => {
                        self.state.time_remaining_seconds = remaining;
                        Ok(Vec::new())
                    }
                    TickOutcome::Expired => {
                        self.state.time_remaining_seconds = 0;
                        debug!("countdown expired, auto-submitting");
                        self.finish()
                    }
                    TickOutcome::Idle => Ok(Vec::new()),
                }
            }

            SessionEvent::AnswerSelected { question, option } => {
                self.require_in_progress(&event)?;
                let q = self.question(question)?;
                let (option_count, is_multiple) = (q.options().len(), q.is_multiple());
                self.state
                    .answers
                    .select(question, option, option_count, is_multiple)?;
                self.state.visited.insert(question);
                Ok(Vec::new())
            }

            SessionEvent::AnswerCleared { question } => {
                self.require_in_progress(&event)?;
                self.question(question)?;
                self.state.answers.clear(question)?;
                Ok(Vec::new())
            }

            SessionEvent::MarkToggled { question } => {
                self.require_in_progress(&event)?;
                self.question(question)?;
                if !self.state.marked.remove(&question) {
                    self.state.marked.insert(question);
                }
                Ok(Vec::new())
            }

            SessionEvent::NavigatedTo { question } => {
                self.require_in_progress(&event)?;
                self.question(question)?;
                self.state.current_index = question;
                self.state.visited.insert(question);
                Ok(Vec::new())
            }

            SessionEvent::SubjectFilterChanged(ref filter) => {
                self.require_in_progress(&event)?;
                self.state.subject_filter = filter.clone();
                let view = self.filtered_indices();
                if !view.contains(&self.state.current_index) {
                    if let Some(&first) = view.first() {
                        self.state.current_index = first;
                        self.state.visited.insert(first);
                    }
                }
                Ok(Vec::new())
            }

            SessionEvent::SubmitRequested => match self.state.status {
                InProgress => self.finish(),
                from => Err(self.rejected(from, &event)),
            },
        }
    }

    //
    // ─── INTERNALS ─────────────────────────────────────────────────────────────
    //

    /// Scores the attempt and moves to `Submitted`. Reached from exactly two
    /// places (manual submit, timer expiry); the terminal guard in `apply`
    /// keeps it from running twice.
    fn finish(&mut self) -> Result<Vec<Effect>, SessionError> {
        let result = score_attempt(
            self.paper.questions(),
            &self.state.answers,
            &self.state.marked,
            self.paper.duration_seconds(),
            self.state.time_remaining_seconds,
        )?;
        self.transition(SessionStatus::Submitted);
        self.result = Some(result.clone());
        debug!(
            score = result.score(),
            total = result.total(),
            time_taken = result.time_taken_seconds(),
            "attempt submitted"
        );
        Ok(vec![Effect::ExitFullscreen, Effect::Persist(result)])
    }

    fn transition(&mut self, to: SessionStatus) {
        debug!(from = ?self.state.status, ?to, "session transition");
        self.state.status = to;
    }

    fn require_in_progress(&self, event: &SessionEvent) -> Result<(), SessionError> {
        if self.state.status == SessionStatus::InProgress {
            Ok(())
        } else {
            Err(self.rejected(self.state.status, event))
        }
    }

    fn rejected(&self, from: SessionStatus, event: &SessionEvent) -> SessionError {
        SessionError::InvalidTransition {
            from,
            event: event.kind(),
        }
    }

    fn question(&self, index: usize) -> Result<&Question, SessionError> {
        self.paper
            .questions()
            .get(index)
            .ok_or(SessionError::Answer(AnswerError::QuestionOutOfRange {
                index,
                len: self.paper.len(),
            }))
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("test_id", self.paper.test_id())
            .field("status", &self.state.status)
            .field("questions", &self.paper.len())
            .field("current_index", &self.state.current_index)
            .field("time_remaining_seconds", &self.state.time_remaining_seconds)
            .field("submitted", &self.result.is_some())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
