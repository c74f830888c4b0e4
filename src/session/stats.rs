use serde::Serialize;

/// Tracker bucket a question falls into. Every question is in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    NotVisited,
    NotAnswered,
    Answered,
    MarkedForReview,
    AnsweredAndMarked,
}

impl QuestionStatus {
    pub fn classify(visited: bool, answered: bool, marked: bool) -> Self {
        match (marked, answered, visited) {
            (true, true, _) => QuestionStatus::AnsweredAndMarked,
            (true, false, _) => QuestionStatus::MarkedForReview,
            (false, true, _) => QuestionStatus::Answered,
            (false, false, true) => QuestionStatus::NotAnswered,
            (false, false, false) => QuestionStatus::NotVisited,
        }
    }
}

/// Bucket counts for the question tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub not_visited: usize,
    pub not_answered: usize,
    pub answered_only: usize,
    pub marked_only: usize,
    pub answered_and_marked: usize,
}

impl SessionStats {
    pub fn from_statuses(statuses: impl IntoIterator<Item = QuestionStatus>) -> Self {
        let mut stats = SessionStats::default();
        for status in statuses {
            match status {
                QuestionStatus::NotVisited => stats.not_visited += 1,
                QuestionStatus::NotAnswered => stats.not_answered += 1,
                QuestionStatus::Answered => stats.answered_only += 1,
                QuestionStatus::MarkedForReview => stats.marked_only += 1,
                QuestionStatus::AnsweredAndMarked => stats.answered_and_marked += 1,
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.not_visited
            + self.not_answered
            + self.answered_only
            + self.marked_only
            + self.answered_and_marked
    }
}
