use std::collections::BTreeSet;
use std::sync::Arc;

use exam_core::model::{
    Question, QuestionId, QuestionOption, StudentId, Subject, TestId, TestPaper,
};
use exam_core::time::fixed_clock;
use exam_engine::{
    DenyingSurface, GrantingSurface, IntegrityMonitor, IntegritySignal, SessionError,
    SessionStatus, SessionWorkflow,
};
use exam_gateway::{InMemoryQuestionSource, RecordingGateway};

fn options() -> Vec<QuestionOption> {
    (0..4)
        .map(|i| QuestionOption::text(format!("Option {i}")))
        .collect()
}

fn single(id: u64, correct: usize, subject: &str) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Q{id}"),
        None,
        options(),
        BTreeSet::from([correct]),
        false,
        Subject::from(subject),
    )
    .unwrap()
}

fn multi(id: u64, correct: BTreeSet<usize>) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Q{id}"),
        None,
        options(),
        correct,
        true,
        Subject::general(),
    )
    .unwrap()
}

fn workflow(
    paper: TestPaper,
) -> (SessionWorkflow, RecordingGateway, GrantingSurface) {
    let source = InMemoryQuestionSource::new();
    source.insert(paper).unwrap();
    let gateway = RecordingGateway::new();
    let surface = GrantingSurface::new();
    let flow = SessionWorkflow::new(
        fixed_clock(),
        Arc::new(source),
        Arc::new(gateway.clone()),
        Arc::new(surface.clone()),
    );
    (flow, gateway, surface)
}

fn student() -> StudentId {
    StudentId::new("student-1")
}

#[tokio::test]
async fn full_attempt_scores_and_persists_once() {
    // 5 single-answer questions: Q1/Q3 answered correctly, Q2 wrong,
    // Q4/Q5 untouched.
    let paper = TestPaper::new(
        TestId::new("mock-1"),
        "Mock 1",
        600,
        (1..=5).map(|i| single(i, 1, "")).collect(),
    )
    .unwrap();
    let (flow, gateway, surface) = workflow(paper);

    let mut session = flow.open(&TestId::new("mock-1")).await.unwrap();
    flow.start(&mut session).await.unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);

    session.select_answer(0, 1).unwrap();
    session.select_answer(1, 2).unwrap();
    session.select_answer(2, 1).unwrap();
    for _ in 0..150 {
        flow.tick(&mut session, &student()).await.unwrap();
    }

    let outcome = flow
        .submit(&mut session, &student())
        .await
        .unwrap()
        .expect("first submit yields an outcome");

    assert!(outcome.persisted);
    assert_eq!(outcome.result.score(), 2);
    assert_eq!(outcome.result.total(), 5);
    assert_eq!(outcome.result.correct_indices(), &[0, 2]);
    assert_eq!(outcome.result.wrong_indices(), &[1]);
    assert_eq!(outcome.result.unattempted_indices(), &[3, 4]);
    assert_eq!(outcome.result.time_taken_seconds(), 150);

    assert_eq!(gateway.recorded_count(), 1);
    assert_eq!(surface.exit_count(), 1);

    // answers captured before submission are all in the recorded result
    let recorded = gateway.recorded().unwrap();
    assert_eq!(recorded[0].1, outcome.result);
    assert_eq!(recorded[0].0.student_id, student());
}

#[tokio::test]
async fn double_submit_records_exactly_one_result() {
    let paper = TestPaper::new(
        TestId::new("mock-2"),
        "Mock 2",
        60,
        vec![single(1, 0, "")],
    )
    .unwrap();
    let (flow, gateway, _surface) = workflow(paper);

    let mut session = flow.open(&TestId::new("mock-2")).await.unwrap();
    flow.start(&mut session).await.unwrap();

    let first = flow.submit(&mut session, &student()).await.unwrap();
    assert!(first.is_some());

    // a racing second submit and late ticks are silent no-ops
    let second = flow.submit(&mut session, &student()).await.unwrap();
    assert!(second.is_none());
    let late_tick = flow.tick(&mut session, &student()).await.unwrap();
    assert!(late_tick.is_none());

    assert_eq!(gateway.recorded_count(), 1);
}

#[tokio::test]
async fn timer_expiry_auto_submits_without_losing_answers() {
    // one-minute paper: the 60th tick expires the countdown and submits
    let paper = TestPaper::new(
        TestId::new("mock-3"),
        "Mock 3",
        60,
        vec![single(1, 2, ""), single(2, 2, "")],
    )
    .unwrap();
    let (flow, gateway, _surface) = workflow(paper);

    let mut session = flow.open(&TestId::new("mock-3")).await.unwrap();
    flow.start(&mut session).await.unwrap();
    session.select_answer(0, 2).unwrap();

    let mut outcome = None;
    for _ in 0..59 {
        assert!(flow.tick(&mut session, &student()).await.unwrap().is_none());
    }
    if let Some(o) = flow.tick(&mut session, &student()).await.unwrap() {
        outcome = Some(o);
    }

    let outcome = outcome.expect("60th tick auto-submits");
    assert_eq!(session.status(), SessionStatus::Submitted);
    assert_eq!(session.time_remaining_seconds(), 0);
    assert_eq!(outcome.result.score(), 1);
    assert_eq!(outcome.result.time_taken_seconds(), 60);
    assert_eq!(gateway.recorded_count(), 1);
}

#[tokio::test]
async fn fullscreen_loss_pauses_and_resume_continues_from_frozen_time() {
    let paper = TestPaper::new(
        TestId::new("mock-4"),
        "Mock 4",
        60,
        vec![single(1, 0, "")],
    )
    .unwrap();
    let (flow, _gateway, _surface) = workflow(paper);
    let mut monitor = IntegrityMonitor::new();

    let mut session = flow.open(&TestId::new("mock-4")).await.unwrap();
    flow.start(&mut session).await.unwrap();

    for _ in 0..30 {
        flow.tick(&mut session, &student()).await.unwrap();
    }
    assert_eq!(session.time_remaining_seconds(), 30);

    flow.observe(&mut session, &mut monitor, IntegritySignal::FullscreenChanged(false))
        .unwrap();
    assert_eq!(session.status(), SessionStatus::Paused);

    // ticks while paused leave the countdown frozen
    for _ in 0..45 {
        flow.tick(&mut session, &student()).await.unwrap();
    }
    assert_eq!(session.time_remaining_seconds(), 30);

    flow.resume(&mut session).await.unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);
    flow.tick(&mut session, &student()).await.unwrap();
    assert_eq!(session.time_remaining_seconds(), 29);
}

#[tokio::test]
async fn fullscreen_denied_is_retryable_permission_error() {
    let paper = TestPaper::new(
        TestId::new("mock-5"),
        "Mock 5",
        60,
        vec![single(1, 0, "")],
    )
    .unwrap();
    let source = InMemoryQuestionSource::new();
    source.insert(paper).unwrap();
    let surface = DenyingSurface::new();
    let flow = SessionWorkflow::new(
        fixed_clock(),
        Arc::new(source),
        Arc::new(RecordingGateway::new()),
        Arc::new(surface.clone()),
    );

    let mut session = flow.open(&TestId::new("mock-5")).await.unwrap();
    let err = flow.start(&mut session).await.unwrap_err();
    assert!(matches!(err, SessionError::PermissionDenied));
    assert_eq!(session.status(), SessionStatus::NotStarted);

    // user grants permission on retry
    surface.grant();
    flow.start(&mut session).await.unwrap();
    assert_eq!(session.status(), SessionStatus::InProgress);
}

#[tokio::test]
async fn persistence_failure_keeps_session_terminal_and_retry_delivers() {
    let paper = TestPaper::new(
        TestId::new("mock-6"),
        "Mock 6",
        60,
        vec![single(1, 0, "")],
    )
    .unwrap();
    let (flow, gateway, _surface) = workflow(paper);
    gateway.fail_next();

    let mut session = flow.open(&TestId::new("mock-6")).await.unwrap();
    flow.start(&mut session).await.unwrap();
    session.select_answer(0, 0).unwrap();

    let mut outcome = flow
        .submit(&mut session, &student())
        .await
        .unwrap()
        .expect("submission completes despite gateway failure");

    assert!(!outcome.persisted);
    assert_eq!(session.status(), SessionStatus::Submitted);
    assert_eq!(session.result().unwrap().score(), 1);
    assert_eq!(gateway.recorded_count(), 0);

    flow.retry_persist(&mut outcome).await.unwrap();
    assert!(outcome.persisted);
    assert_eq!(gateway.recorded_count(), 1);

    // retry on a delivered outcome is a no-op
    flow.retry_persist(&mut outcome).await.unwrap();
    assert_eq!(gateway.recorded_count(), 1);
}

#[tokio::test]
async fn subject_wise_breakdown_is_reported_per_subject() {
    let paper = TestPaper::new(
        TestId::new("mock-7"),
        "Mock 7",
        300,
        vec![
            single(1, 1, "Physics"),
            single(2, 1, "Physics"),
            single(3, 1, "Math"),
        ],
    )
    .unwrap();
    let (flow, _gateway, _surface) = workflow(paper);

    let mut session = flow.open(&TestId::new("mock-7")).await.unwrap();
    flow.start(&mut session).await.unwrap();
    session.select_answer(0, 1).unwrap(); // Physics correct
    session.select_answer(1, 3).unwrap(); // Physics wrong
    session.select_answer(2, 1).unwrap(); // Math correct

    let outcome = flow
        .submit(&mut session, &student())
        .await
        .unwrap()
        .unwrap();

    let physics = &outcome.result.subject_wise()[&Subject::from("Physics")];
    assert_eq!((physics.score, physics.total), (1, 2));
    assert_eq!((physics.correct, physics.wrong), (1, 1));
    assert_eq!((physics.answered, physics.unanswered), (2, 0));

    let math = &outcome.result.subject_wise()[&Subject::from("Math")];
    assert_eq!((math.score, math.total), (1, 1));
    assert_eq!((math.correct, math.wrong), (1, 0));
    assert_eq!((math.answered, math.unanswered), (1, 0));
}

#[tokio::test]
async fn multi_answer_selection_scores_order_independently() {
    let paper = TestPaper::new(
        TestId::new("mock-8"),
        "Mock 8",
        60,
        vec![multi(1, BTreeSet::from([0, 2]))],
    )
    .unwrap();
    let (flow, _gateway, _surface) = workflow(paper);

    let mut session = flow.open(&TestId::new("mock-8")).await.unwrap();
    flow.start(&mut session).await.unwrap();
    // selected as {2, 0}
    session.select_answer(0, 2).unwrap();
    session.select_answer(0, 0).unwrap();

    let outcome = flow
        .submit(&mut session, &student())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.result.score(), 1);
    assert_eq!(outcome.result.correct_indices(), &[0]);
}

#[tokio::test]
async fn blocked_keys_are_suppressed_without_touching_session_state() {
    use exam_engine::{IntegrityAction, KeyPress, ViolationKind};

    let paper = TestPaper::new(
        TestId::new("mock-9"),
        "Mock 9",
        60,
        vec![single(1, 0, "")],
    )
    .unwrap();
    let (flow, _gateway, _surface) = workflow(paper);
    let mut monitor = IntegrityMonitor::new();

    let mut session = flow.open(&TestId::new("mock-9")).await.unwrap();
    flow.start(&mut session).await.unwrap();

    let action = flow
        .observe(
            &mut session,
            &mut monitor,
            IntegritySignal::KeyPressed(KeyPress::ctrl("v")),
        )
        .unwrap();
    assert_eq!(
        action,
        IntegrityAction::Suppress(ViolationKind::ClipboardAttempt)
    );
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert_eq!(monitor.total_violations(), 1);
}
