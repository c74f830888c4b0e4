use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::Question;
use crate::session::{SubmissionResult, SubmitReason};

/// Persisted record of a submitted session.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuizAttempt {
    pub id: String,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub answers: Vec<AttemptAnswer>,
    pub score: u32,
    pub total_questions: u32,
    pub reason: SubmitReason,
    pub tab_switch_count: u32,
    pub remaining_seconds: u32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttemptAnswer {
    pub question_index: u32,
    pub selected: String,
    pub correct: bool,
}

impl QuizAttempt {
    /// Builds the record for a submission; `questions` must be the session's question set.
    pub fn from_submission(
        session_id: &str,
        topic: Option<String>,
        questions: &[Question],
        result: &SubmissionResult,
        tab_switch_count: u32,
    ) -> Self {
        let answers = result
            .answers
            .iter()
            .map(|(index, selected)| AttemptAnswer {
                question_index: *index as u32,
                selected: selected.clone(),
                correct: questions
                    .get(*index)
                    .map(|q| q.is_correct(selected))
                    .unwrap_or(false),
            })
            .collect();

        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            topic,
            answers,
            score: result.score as u32,
            total_questions: result.total_questions as u32,
            reason: result.reason,
            tab_switch_count,
            remaining_seconds: result.remaining_seconds,
            submitted_at: Utc::now(),
        }
    }

    pub fn percentage(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.score) * 100.0 / f64::from(self.total_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{QuizSession, SubmitReason};
    use crate::test_utils::fixtures::abc_questions;

    #[test]
    fn attempt_from_submission_flags_correct_answers() {
        let mut session = QuizSession::start(abc_questions(), 60).unwrap();
        session.select_answer(0, "A").unwrap();
        session.select_answer(1, "X").unwrap();
        let result = session.submit(SubmitReason::Manual).into_result();

        let attempt = QuizAttempt::from_submission(
            "session-1",
            Some("letters".to_string()),
            session.questions(),
            &result,
            1,
        );

        assert_eq!(attempt.score, 1);
        assert_eq!(attempt.total_questions, 3);
        assert_eq!(attempt.answers.len(), 2);
        assert!(attempt.answers[0].correct);
        assert!(!attempt.answers[1].correct);
        assert_eq!(attempt.tab_switch_count, 1);
    }

    #[test]
    fn quiz_attempt_round_trip_serialization_preserves_grading_fields() {
        let mut session = QuizSession::start(abc_questions(), 60).unwrap();
        session.select_answer(2, "C").unwrap();
        let result = session.submit(SubmitReason::TabSwitch).into_result();
        let attempt =
            QuizAttempt::from_submission("session-2", None, session.questions(), &result, 2);

        let json = serde_json::to_string(&attempt).expect("attempt should serialize");
        let parsed: QuizAttempt = serde_json::from_str(&json).expect("attempt should deserialize");

        assert_eq!(parsed, attempt);
        assert_eq!(parsed.reason, SubmitReason::TabSwitch);
        assert!((parsed.percentage() - 100.0 / 3.0).abs() < f64::EPSILON * 100.0);
    }
}
