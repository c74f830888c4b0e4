use quiz_proctor::{
    models::domain::{Question, QuizAttempt},
    session::{
        QuestionStatus, QuizSession, SessionPhase, SessionPolicy, SubmitReason, TabSwitchOutcome,
    },
};

fn abc() -> Vec<Question> {
    vec![
        Question::new("First?", ["A", "B", "C", "D"], "A"),
        Question::new("Second?", ["B", "X", "Y", "Z"], "B"),
        Question::new("Third?", ["C", "D", "E", "F"], "C"),
    ]
}

fn assert_partition(session: &QuizSession) {
    let stats = session.stats();
    assert_eq!(stats.total(), session.questions().len());
    assert_eq!(session.tracker().len(), session.questions().len());
}

#[actix_rt::test]
async fn test_manual_submission_scenario() {
    let mut session = QuizSession::start(abc(), 10).unwrap();

    session.select_answer(0, "A").unwrap();
    session.select_answer(1, "X").unwrap();
    session.navigate_to(2).unwrap();
    assert_partition(&session);

    let submission = session.submit(SubmitReason::Manual);
    assert!(submission.is_accepted());

    let result = submission.into_result();
    assert_eq!(result.score, 1);
    assert_eq!(result.answers.len(), 2);
    assert_eq!(result.answers.get(&0).map(String::as_str), Some("A"));
    assert_eq!(result.answers.get(&1).map(String::as_str), Some("X"));
    assert!([0, 1, 2].iter().all(|i| session.visited().contains(i)));
    assert_partition(&session);

    let attempt = QuizAttempt::from_submission("session-1", None, session.questions(), &result, 0);
    assert_eq!(attempt.score, 1);
    assert_eq!(attempt.total_questions, 3);
    assert!(attempt.answers.iter().any(|a| a.question_index == 1 && !a.correct));
}

#[actix_rt::test]
async fn test_countdown_scenario() {
    let mut session = QuizSession::start(abc(), 5).unwrap();

    let mut expiries = 0;
    for _ in 0..8 {
        if let Some(result) = session.tick() {
            assert_eq!(result.reason, SubmitReason::TimeExpired);
            expiries += 1;
        }
    }

    assert_eq!(expiries, 1);
    assert_eq!(session.remaining_seconds(), 0);
    assert_eq!(session.phase(), SessionPhase::Submitted);
}

#[actix_rt::test]
async fn test_tab_switch_scenario() {
    let mut session = QuizSession::start(abc(), 100).unwrap();

    assert_eq!(session.report_tab_hidden(), TabSwitchOutcome::Warned { count: 1 });
    assert_eq!(session.phase(), SessionPhase::InProgress);
    assert_eq!(session.tab_switch_count(), 1);

    match session.report_tab_hidden() {
        TabSwitchOutcome::ForcedSubmit(result) => {
            assert_eq!(result.reason, SubmitReason::TabSwitch)
        }
        other => panic!("expected forced submission, got {:?}", other),
    }
    assert_eq!(session.phase(), SessionPhase::Submitted);
    assert_eq!(session.report_tab_hidden(), TabSwitchOutcome::Ignored);
}

#[actix_rt::test]
async fn test_configured_tab_switch_limit() {
    let policy = SessionPolicy::default()
        .with_duration(100)
        .with_tab_switch_limit(3);
    let mut session = QuizSession::start_with_policy(abc(), policy).unwrap();

    assert!(matches!(session.report_tab_hidden(), TabSwitchOutcome::Warned { .. }));
    assert!(matches!(session.report_tab_hidden(), TabSwitchOutcome::Warned { .. }));
    assert!(matches!(session.report_tab_hidden(), TabSwitchOutcome::ForcedSubmit(_)));
}

#[actix_rt::test]
async fn test_first_submission_wins_race() {
    let mut session = QuizSession::start(abc(), 1).unwrap();
    session.select_answer(2, "C").unwrap();

    let manual = session.submit(SubmitReason::Manual);
    assert!(session.tick().is_none());
    let again = session.submit(SubmitReason::TabSwitch);

    assert!(!again.is_accepted());
    assert_eq!(manual.result(), again.result());
    assert_eq!(again.result().reason, SubmitReason::Manual);
    assert_eq!(session.remaining_seconds(), 1);
}

#[actix_rt::test]
async fn test_select_then_clear_keeps_visit() {
    let mut session = QuizSession::start(abc(), 10).unwrap();

    session.navigate_to(1).unwrap();
    session.select_answer(1, "Y").unwrap();
    session.clear_answer(1).unwrap();

    assert!(!session.answers().contains_key(&1));
    assert!(session.visited().contains(&1));
    assert_eq!(session.status_of(1), QuestionStatus::NotAnswered);
    assert_eq!(session.status_of(2), QuestionStatus::NotVisited);
}

#[actix_rt::test]
async fn test_review_navigation_after_submit() {
    let mut session = QuizSession::start(abc(), 10).unwrap();
    session.submit(SubmitReason::Manual);

    session.navigate_to(2).unwrap();
    let snapshot = session.snapshot();

    assert_eq!(snapshot.current_index, 2);
    assert_eq!(snapshot.question.correct_answer.as_deref(), Some("C"));
    assert!(!session.visited().contains(&2));
}

#[cfg(test)]
mod sync_tests {
    use quiz_proctor::session::format_remaining;

    #[test]
    fn test_default_duration_renders_as_ninety_minutes() {
        assert_eq!(format_remaining(5400), "01:30:00");
    }
}
