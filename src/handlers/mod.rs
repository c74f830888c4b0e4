pub mod health_handler;
pub mod quiz_handler;
pub mod session_handler;

use actix_web::{error::JsonPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use health_handler::{health_check, health_check_ready};
pub use quiz_handler::generate_quiz;
pub use session_handler::{
    clear_answer, discard_session, get_attempt, get_session, get_session_attempt, list_attempts,
    navigate, report_visibility, select_answer, start_session, submit_check, submit_session,
    toggle_review_mark,
};

/// Turns malformed JSON bodies into the same error shape as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, req: &HttpRequest| {
        log::debug!("Rejected JSON body for {}: {}", req.path(), err);
        let message = if req.path() == "/quiz" {
            "Prompt is required and must be a string.".to_string()
        } else {
            format!("Invalid request body: {}", err)
        };
        AppError::ValidationError(message).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(health_check)
        .service(health_check_ready)
        .service(generate_quiz)
        .service(start_session)
        .service(get_session)
        .service(discard_session)
        .service(select_answer)
        .service(clear_answer)
        .service(toggle_review_mark)
        .service(navigate)
        .service(report_visibility)
        .service(submit_check)
        .service(submit_session)
        .service(list_attempts)
        .service(get_attempt)
        .service(get_session_attempt);
}
