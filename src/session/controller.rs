use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::errors::SessionError;
use crate::models::domain::Question;
use crate::session::policy::SessionPolicy;
use crate::session::stats::{QuestionStatus, SessionStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    InProgress,
    Submitted,
}

/// What ended the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    Manual,
    TimeExpired,
    TabSwitch,
}

impl std::fmt::Display for SubmitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmitReason::Manual => write!(f, "manual"),
            SubmitReason::TimeExpired => write!(f, "time_expired"),
            SubmitReason::TabSwitch => write!(f, "tab_switch"),
        }
    }
}

/// Frozen outcome of a session, computed once at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub answers: BTreeMap<usize, String>,
    pub score: usize,
    pub total_questions: usize,
    pub reason: SubmitReason,
    pub remaining_seconds: u32,
}

/// Return value of [`QuizSession::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// This call moved the session to `Submitted`.
    Accepted(SubmissionResult),
    /// The session was already submitted; carries the first result.
    AlreadySubmitted(SubmissionResult),
}

impl Submission {
    pub fn result(&self) -> &SubmissionResult {
        match self {
            Submission::Accepted(result) | Submission::AlreadySubmitted(result) => result,
        }
    }

    pub fn into_result(self) -> SubmissionResult {
        match self {
            Submission::Accepted(result) | Submission::AlreadySubmitted(result) => result,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabSwitchOutcome {
    /// Session no longer in progress; nothing counted.
    Ignored,
    /// Counted, below the limit. The host should show a warning.
    Warned { count: u32 },
    /// Counted and the limit was reached.
    ForcedSubmit(SubmissionResult),
}

/// Advisory answer to a user asking to submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitCheck {
    pub unanswered: usize,
    pub marked_for_review: usize,
    pub all_answered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub text: String,
    pub options: Vec<String>,
    pub selected: Option<String>,
    pub marked_for_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_answer: Option<String>,
}

/// Read-only view handed to the presentation layer after each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: QuestionView,
    pub remaining_seconds: u32,
    pub time_left: String,
    pub final_countdown: bool,
    pub tab_switch_count: u32,
    pub tab_switch_warning: bool,
    pub stats: SessionStats,
    pub tracker: Vec<QuestionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SubmissionResult>,
}

/// State machine for one timed multiple-choice attempt.
///
/// The session never schedules anything itself: the host calls [`tick`](Self::tick)
/// once per elapsed second and [`report_tab_hidden`](Self::report_tab_hidden) on
/// every visibility loss. Once submitted, only navigation and reads are honoured.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    policy: SessionPolicy,
    answers: BTreeMap<usize, String>,
    visited: BTreeSet<usize>,
    marked_for_review: BTreeSet<usize>,
    current_index: usize,
    remaining_seconds: u32,
    phase: SessionPhase,
    tab_switch_count: u32,
    result: Option<SubmissionResult>,
}

impl QuizSession {
    /// Starts a session with the default tab-switch and countdown rules.
    pub fn start(questions: Vec<Question>, duration_seconds: u32) -> Result<Self, SessionError> {
        Self::start_with_policy(
            questions,
            SessionPolicy::default().with_duration(duration_seconds),
        )
    }

    pub fn start_with_policy(
        questions: Vec<Question>,
        policy: SessionPolicy,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::InvalidQuestionSet(
                "question set is empty".to_string(),
            ));
        }
        for (index, question) in questions.iter().enumerate() {
            question.check().map_err(|reason| {
                SessionError::InvalidQuestionSet(format!("question {}: {}", index, reason))
            })?;
        }
        policy.validate()?;

        Ok(Self {
            questions,
            policy,
            answers: BTreeMap::new(),
            visited: BTreeSet::from([0]),
            marked_for_review: BTreeSet::new(),
            current_index: 0,
            remaining_seconds: policy.duration_seconds,
            phase: SessionPhase::InProgress,
            tab_switch_count: 0,
            result: None,
        })
    }

    pub fn select_answer(&mut self, index: usize, option: &str) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        let question = self.question(index)?;
        if !question.has_option(option) {
            return Err(SessionError::UnknownOption {
                index,
                option: option.to_string(),
            });
        }

        self.visited.insert(index);
        self.answers.insert(index, option.to_string());
        Ok(())
    }

    pub fn clear_answer(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;
        self.question(index)?;
        self.answers.remove(&index);
        Ok(())
    }

    /// Flips the review flag and returns whether the question is now marked.
    pub fn toggle_review_mark(&mut self, index: usize) -> Result<bool, SessionError> {
        self.ensure_in_progress()?;
        self.question(index)?;
        self.visited.insert(index);

        if self.marked_for_review.remove(&index) {
            Ok(false)
        } else {
            self.marked_for_review.insert(index);
            Ok(true)
        }
    }

    /// Moves to a question. Allowed after submission for review.
    pub fn navigate_to(&mut self, index: usize) -> Result<(), SessionError> {
        self.question(index)?;
        self.current_index = index;
        if self.phase == SessionPhase::InProgress {
            self.visited.insert(index);
        }
        Ok(())
    }

    /// Advances the countdown by one second.
    ///
    /// Returns the result only on the tick that expired the session.
    pub fn tick(&mut self) -> Option<SubmissionResult> {
        if self.phase != SessionPhase::InProgress {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return Some(self.submit(SubmitReason::TimeExpired).into_result());
        }
        None
    }

    pub fn report_tab_hidden(&mut self) -> TabSwitchOutcome {
        if self.phase != SessionPhase::InProgress {
            return TabSwitchOutcome::Ignored;
        }

        self.tab_switch_count += 1;
        if self.tab_switch_count >= self.policy.tab_switch_limit {
            return TabSwitchOutcome::ForcedSubmit(
                self.submit(SubmitReason::TabSwitch).into_result(),
            );
        }
        TabSwitchOutcome::Warned {
            count: self.tab_switch_count,
        }
    }

    /// Tells the caller what a manual submission would leave behind.
    /// Never blocks submission.
    pub fn request_submit(&self) -> SubmitCheck {
        let unanswered = self.questions.len() - self.answers.len();
        SubmitCheck {
            unanswered,
            marked_for_review: self.marked_for_review.len(),
            all_answered: unanswered == 0,
        }
    }

    /// Ends the session. Idempotent: later calls return the first result unchanged.
    pub fn submit(&mut self, reason: SubmitReason) -> Submission {
        if let Some(result) = &self.result {
            return Submission::AlreadySubmitted(result.clone());
        }

        let score = self
            .answers
            .iter()
            .filter(|(index, option)| self.questions[**index].is_correct(option))
            .count();

        let result = SubmissionResult {
            answers: self.answers.clone(),
            score,
            total_questions: self.questions.len(),
            reason,
            remaining_seconds: self.remaining_seconds,
        };

        self.phase = SessionPhase::Submitted;
        self.result = Some(result.clone());
        Submission::Accepted(result)
    }

    pub fn stats(&self) -> SessionStats {
        SessionStats::from_statuses(self.tracker())
    }

    pub fn tracker(&self) -> Vec<QuestionStatus> {
        (0..self.questions.len()).map(|i| self.status_of(i)).collect()
    }

    pub fn status_of(&self, index: usize) -> QuestionStatus {
        QuestionStatus::classify(
            self.visited.contains(&index),
            self.answers.contains_key(&index),
            self.marked_for_review.contains(&index),
        )
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let index = self.current_index;
        let question = &self.questions[index];
        let submitted = self.phase == SessionPhase::Submitted;

        SessionSnapshot {
            phase: self.phase,
            current_index: index,
            total_questions: self.questions.len(),
            question: QuestionView {
                index,
                text: question.text.clone(),
                options: question.options.clone(),
                selected: self.answers.get(&index).cloned(),
                marked_for_review: self.marked_for_review.contains(&index),
                correct_answer: submitted.then(|| question.correct_answer.clone()),
            },
            remaining_seconds: self.remaining_seconds,
            time_left: format_remaining(self.remaining_seconds),
            final_countdown: self.is_final_countdown(),
            tab_switch_count: self.tab_switch_count,
            tab_switch_warning: self.tab_switch_warning(),
            stats: self.stats(),
            tracker: self.tracker(),
            result: self.result.clone(),
        }
    }

    pub fn is_final_countdown(&self) -> bool {
        self.phase == SessionPhase::InProgress
            && self.remaining_seconds > 0
            && self.remaining_seconds <= self.policy.final_countdown_seconds
    }

    pub fn tab_switch_warning(&self) -> bool {
        self.phase == SessionPhase::InProgress && self.tab_switch_count > 0
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<usize, String> {
        &self.answers
    }

    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    pub fn marked_for_review(&self) -> &BTreeSet<usize> {
        &self.marked_for_review
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn tab_switch_count(&self) -> u32 {
        self.tab_switch_count
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.phase {
            SessionPhase::InProgress => Ok(()),
            SessionPhase::Submitted => Err(SessionError::SessionClosed),
        }
    }

    fn question(&self, index: usize) -> Result<&Question, SessionError> {
        self.questions.get(index).ok_or(SessionError::IndexOutOfRange {
            index,
            len: self.questions.len(),
        })
    }
}

/// Formats seconds as `hh:mm:ss`.
pub fn format_remaining(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
