use std::sync::Arc;
use tracing::{debug, warn};

use exam_core::Clock;
use exam_core::model::{AttemptId, StudentId, TestId, TestResult};
use exam_gateway::{AttemptContext, PersistenceGateway, QuestionSource};

use crate::error::SessionError;
use crate::integrity::{FullscreenSurface, IntegrityAction, IntegrityMonitor, IntegritySignal};
use crate::session::controller::SessionController;
use crate::session::events::{Effect, SessionEvent};

/// Terminal outcome of one attempt: the scored result plus its delivery
/// status. `persisted` is false when the gateway rejected the recording;
/// the session itself is already terminal either way.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub result: TestResult,
    pub context: AttemptContext,
    pub persisted: bool,
}

/// Orchestrates one attempt across the controller and the external seams.
///
/// The workflow executes the effects the reducer requests (fullscreen
/// requests, teardown, result delivery) and feeds platform outcomes back in
/// as events. It holds no session state of its own.
#[derive(Clone)]
pub struct SessionWorkflow {
    clock: Clock,
    source: Arc<dyn QuestionSource>,
    gateway: Arc<dyn PersistenceGateway>,
    surface: Arc<dyn FullscreenSurface>,
}

impl SessionWorkflow {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: Arc<dyn QuestionSource>,
        gateway: Arc<dyn PersistenceGateway>,
        surface: Arc<dyn FullscreenSurface>,
    ) -> Self {
        Self {
            clock,
            source,
            gateway,
            surface,
        }
    }

    /// Fetches the paper for a test and builds a controller in `NotStarted`.
    ///
    /// Paper validation happens at the source boundary, so a test with no
    /// questions can never reach the fullscreen gate.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Gateway` for fetch failures.
    pub async fn open(&self, test_id: &TestId) -> Result<SessionController, SessionError> {
        let paper = self.source.fetch_paper(test_id).await?;
        debug!(test_id = %paper.test_id(), questions = paper.len(), "attempt opened");
        Ok(SessionController::new(paper))
    }

    /// Starts the attempt, driving the fullscreen request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the session is not `NotStarted`,
    /// `PermissionDenied` if the platform refuses fullscreen (the session
    /// returns to `NotStarted` and the call can be retried), or `Gateway`
    /// for surface failures.
    pub async fn start(&self, controller: &mut SessionController) -> Result<(), SessionError> {
        let effects = controller.start()?;
        self.drive_gate(controller, effects).await
    }

    /// Resumes a paused attempt, driving the fullscreen request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the session is not `Paused`, or
    /// `PermissionDenied` if the platform refuses (the session stays
    /// `Paused` with everything intact).
    pub async fn resume(&self, controller: &mut SessionController) -> Result<(), SessionError> {
        let effects = controller.resume()?;
        self.drive_gate(controller, effects).await
    }

    /// Routes an integrity signal: fullscreen changes reach the reducer,
    /// everything else is classification only. Returns the action so the
    /// platform layer can suppress the input where it is able to.
    ///
    /// # Errors
    ///
    /// Propagates reducer errors for forwarded events.
    pub fn observe(
        &self,
        controller: &mut SessionController,
        monitor: &mut IntegrityMonitor,
        signal: IntegritySignal,
    ) -> Result<IntegrityAction, SessionError> {
        let action = monitor.observe(signal);
        if let IntegrityAction::Forward(event) = &action {
            controller.apply(event.clone())?;
        }
        Ok(action)
    }

    /// Advances the countdown by one second. When the tick expires the
    /// timer, the attempt auto-submits and the outcome is returned.
    ///
    /// # Errors
    ///
    /// Returns `Scoring` errors from the terminal transition.
    pub async fn tick(
        &self,
        controller: &mut SessionController,
        student: &StudentId,
    ) -> Result<Option<SubmitOutcome>, SessionError> {
        let effects = controller.apply(SessionEvent::TimerTick)?;
        self.finish(controller, effects, student).await
    }

    /// Submits the attempt manually. Returns `None` when the session was
    /// already submitted (the silent double-submit guard).
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` outside `InProgress` and `Scoring`
    /// errors from the terminal transition.
    pub async fn submit(
        &self,
        controller: &mut SessionController,
        student: &StudentId,
    ) -> Result<Option<SubmitOutcome>, SessionError> {
        let effects = controller.submit()?;
        self.finish(controller, effects, student).await
    }

    /// Re-delivers a result whose first recording failed. Delivery policy
    /// is caller-driven; the engine never retries on its own.
    ///
    /// # Errors
    ///
    /// Returns `Gateway` if the re-delivery fails as well.
    pub async fn retry_persist(&self, outcome: &mut SubmitOutcome) -> Result<(), SessionError> {
        if outcome.persisted {
            return Ok(());
        }
        self.gateway
            .record_result(&outcome.result, &outcome.context)
            .await?;
        outcome.persisted = true;
        Ok(())
    }

    async fn drive_gate(
        &self,
        controller: &mut SessionController,
        effects: Vec<Effect>,
    ) -> Result<(), SessionError> {
        for effect in effects {
            if matches!(effect, Effect::RequestFullscreen) {
                let granted = self.surface.request_fullscreen().await?;
                controller.apply(SessionEvent::FullscreenChanged(granted))?;
                if !granted {
                    warn!("fullscreen request denied by the platform");
                    return Err(SessionError::PermissionDenied);
                }
            }
        }
        Ok(())
    }

    /// Executes terminal effects. The reducer emits `Persist` exactly once
    /// per session, so `record_result` is called exactly once no matter how
    /// submission was triggered.
    async fn finish(
        &self,
        controller: &SessionController,
        effects: Vec<Effect>,
        student: &StudentId,
    ) -> Result<Option<SubmitOutcome>, SessionError> {
        let mut outcome = None;
        for effect in effects {
            match effect {
                Effect::ExitFullscreen => {
                    if let Err(error) = self.surface.exit_fullscreen().await {
                        warn!(%error, "failed to exit fullscreen on teardown");
                    }
                }
                Effect::Persist(result) => {
                    let context = AttemptContext {
                        attempt_id: AttemptId::generate(),
                        test_id: controller.paper().test_id().clone(),
                        student_id: student.clone(),
                        submitted_at: self.clock.now(),
                    };
                    let persisted = match self.gateway.record_result(&result, &context).await {
                        Ok(()) => true,
                        Err(error) => {
                            // The session is already terminal; delivery failure
                            // is reported, never rolled back.
                            warn!(%error, attempt_id = %context.attempt_id, "result persistence failed");
                            false
                        }
                    };
                    outcome = Some(SubmitOutcome {
                        result,
                        context,
                        persisted,
                    });
                }
                Effect::RequestFullscreen => {}
            }
        }
        Ok(outcome)
    }
}
