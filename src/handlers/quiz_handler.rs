use actix_web::{post, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::request_id,
    models::dto::{request::GenerateQuizRequest, response::GeneratedQuizResponse},
};

#[post("/quiz")]
pub async fn generate_quiz(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let request = request.into_inner();
    if request.validate().is_err() {
        return Err(AppError::ValidationError(
            "Prompt is required and must be a string.".to_string(),
        ));
    }

    log::info!("[{}] Received quiz prompt: {}", request_id(&req), request.prompt);
    let questions = state.generation_service.generate_quiz(&request.prompt).await?;
    Ok(HttpResponse::Ok().json(GeneratedQuizResponse::from(questions)))
}
