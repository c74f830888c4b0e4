#[cfg(test)]
pub mod fixtures {
    use crate::models::domain::Question;

    /// `n` well-formed questions; the correct answer of question `i` is `"{i}-a"`.
    pub fn sample_questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| {
                let options = [
                    format!("{}-a", i),
                    format!("{}-b", i),
                    format!("{}-c", i),
                    format!("{}-d", i),
                ];
                Question {
                    text: format!("Question {}?", i + 1),
                    options: options.to_vec(),
                    correct_answer: options[0].clone(),
                }
            })
            .collect()
    }

    /// Three questions with correct answers A, B, C. Question 1 also offers "X".
    pub fn abc_questions() -> Vec<Question> {
        vec![
            Question::new("First?", ["A", "B", "C", "D"], "A"),
            Question::new("Second?", ["B", "X", "Y", "Z"], "B"),
            Question::new("Third?", ["C", "D", "E", "F"], "C"),
        ]
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_sample_questions_are_valid() {
        let questions = sample_questions(4);
        assert_eq!(questions.len(), 4);
        assert!(questions.iter().all(|q| q.check().is_ok()));
        assert_eq!(questions[2].correct_answer, "2-a");
    }

    #[test]
    fn test_abc_questions_offer_x_on_second() {
        let questions = abc_questions();
        assert!(questions[1].has_option("X"));
        assert!(questions.iter().all(|q| q.check().is_ok()));
    }
}
