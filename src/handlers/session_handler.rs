use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::request_id,
    models::dto::{
        request::{
            NavigateRequest, PaginationParams, SelectAnswerRequest, StartSessionRequest,
            VisibilityRequest,
        },
        response::MessageResponse,
    },
};

#[post("/api/sessions")]
pub async fn start_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    request: web::Json<StartSessionRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .session_service
        .start_session(request.into_inner())
        .await?;
    log::info!("[{}] Started session {}", request_id(&req), response.session_id);
    Ok(HttpResponse::Created().json(response))
}

#[get("/api/sessions/{id}")]
pub async fn get_session(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let response = state.session_service.get_session(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[delete("/api/sessions/{id}")]
pub async fn discard_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    log::info!("[{}] Discarding session {}", request_id(&req), id);
    state.session_service.discard_session(&id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: format!("Session '{}' discarded", id),
    }))
}

#[put("/api/sessions/{id}/answers/{index}")]
pub async fn select_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
    request: web::Json<SelectAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    request.validate()?;

    let snapshot = state
        .session_service
        .select_answer(&id, index, &request.option)
        .await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[delete("/api/sessions/{id}/answers/{index}")]
pub async fn clear_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    let snapshot = state.session_service.clear_answer(&id, index).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/marks/{index}")]
pub async fn toggle_review_mark(
    state: web::Data<AppState>,
    path: web::Path<(String, usize)>,
) -> Result<HttpResponse, AppError> {
    let (id, index) = path.into_inner();
    let snapshot = state.session_service.toggle_review_mark(&id, index).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/navigate")]
pub async fn navigate(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<NavigateRequest>,
) -> Result<HttpResponse, AppError> {
    let snapshot = state.session_service.navigate(&id, request.index).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[post("/api/sessions/{id}/visibility")]
pub async fn report_visibility(
    state: web::Data<AppState>,
    id: web::Path<String>,
    request: web::Json<VisibilityRequest>,
) -> Result<HttpResponse, AppError> {
    let response = state
        .session_service
        .report_visibility(&id, request.hidden)
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/sessions/{id}/submit-check")]
pub async fn submit_check(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let response = state.session_service.submit_check(&id).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/api/sessions/{id}/submit")]
pub async fn submit_session(
    req: HttpRequest,
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let response = state.session_service.submit(&id).await?;
    log::info!(
        "[{}] Session {} submitted ({}/{})",
        request_id(&req),
        id,
        response.result.score,
        response.result.total_questions
    );
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/sessions/{id}/attempt")]
pub async fn get_session_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let attempt = state.session_service.get_session_attempt(&id).await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[get("/api/attempts")]
pub async fn list_attempts(
    state: web::Data<AppState>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse, AppError> {
    let pagination = query.into_inner();
    pagination.validate()?;

    let response = state
        .session_service
        .list_attempts(pagination.offset(), pagination.limit())
        .await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/api/attempts/{id}")]
pub async fn get_attempt(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let attempt = state.session_service.get_attempt(&id).await?;
    Ok(HttpResponse::Ok().json(attempt))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::Config,
        handlers::configure,
        middleware::{RequestIdMiddleware, REQUEST_ID_HEADER},
        models::domain::QuizAttempt,
        repositories::MockQuizAttemptRepository,
        services::MockQuestionGenerator,
        test_utils::{fixtures::abc_questions, test_helpers::assert_success_status},
    };
    use actix_web::{http::StatusCode, test, App};

    fn state(repo: MockQuizAttemptRepository) -> AppState {
        AppState::from_parts(
            Config::test_config(),
            Arc::new(MockQuestionGenerator::new()),
            Arc::new(repo),
        )
    }

    fn start_body() -> serde_json::Value {
        serde_json::json!({ "questions": abc_questions(), "duration_seconds": 120 })
    }

    #[actix_web::test]
    async fn test_full_session_flow() {
        let mut repo = MockQuizAttemptRepository::new();
        repo.expect_create().times(1).returning(|attempt| Ok(attempt));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(start_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let started: serde_json::Value = test::read_body_json(resp).await;
        let id = started["session_id"].as_str().unwrap().to_string();
        assert_eq!(started["session"]["time_left"], "00:02:00");

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/answers/0", id))
            .set_json(serde_json::json!({ "option": "A" }))
            .to_request();
        let snapshot: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot["question"]["selected"], "A");
        assert!(snapshot["question"].get("correct_answer").is_none());

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/marks/1", id))
            .to_request();
        let snapshot: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot["stats"]["marked_only"], 1);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/navigate", id))
            .set_json(serde_json::json!({ "index": 2 }))
            .to_request();
        let snapshot: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(snapshot["current_index"], 2);

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}/submit-check", id))
            .to_request();
        let check: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(check["unanswered"], 2);
        assert_eq!(check["marked_for_review"], 1);
        assert_eq!(check["all_answered"], false);

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/submit", id))
            .to_request();
        let submitted: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(submitted["result"]["score"], 1);
        assert_eq!(submitted["result"]["reason"], "manual");
        assert!(submitted["attempt_id"].is_string());

        let req = test::TestRequest::put()
            .uri(&format!("/api/sessions/{}/answers/1", id))
            .set_json(serde_json::json!({ "option": "B" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[actix_web::test]
    async fn test_visibility_warns_then_forces_submit() {
        let mut repo = MockQuizAttemptRepository::new();
        repo.expect_create().times(1).returning(|attempt| Ok(attempt));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(start_body())
            .to_request();
        let started: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = started["session_id"].as_str().unwrap().to_string();

        let hidden = || {
            test::TestRequest::post()
                .uri(&format!("/api/sessions/{}/visibility", id))
                .set_json(serde_json::json!({ "hidden": true }))
                .to_request()
        };

        let first: serde_json::Value = test::call_and_read_body_json(&app, hidden()).await;
        assert_eq!(first["outcome"], "warned");
        assert_eq!(first["session"]["tab_switch_warning"], true);

        let second: serde_json::Value = test::call_and_read_body_json(&app, hidden()).await;
        assert_eq!(second["outcome"], "forced_submit");
        assert_eq!(second["session"]["phase"], "submitted");
        assert_eq!(second["session"]["result"]["reason"], "tab_switch");
    }

    #[actix_web::test]
    async fn test_session_requests_carry_request_id() {
        let mut repo = MockQuizAttemptRepository::new();
        repo.expect_create().times(1).returning(|attempt| Ok(attempt));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo)))
                .wrap(RequestIdMiddleware)
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .insert_header((REQUEST_ID_HEADER, "quiz-7"))
            .set_json(start_body())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(resp.headers().get(REQUEST_ID_HEADER).unwrap(), "quiz-7");
        let started: serde_json::Value = test::read_body_json(resp).await;
        let id = started["session_id"].as_str().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/submit", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());
        assert!(resp.headers().contains_key(REQUEST_ID_HEADER));
    }

    #[actix_web::test]
    async fn test_unknown_session_is_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(MockQuizAttemptRepository::new())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/sessions/does-not-exist")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_out_of_range_index_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(MockQuizAttemptRepository::new())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(start_body())
            .to_request();
        let started: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = started["session_id"].as_str().unwrap();

        let req = test::TestRequest::post()
            .uri(&format!("/api/sessions/{}/navigate", id))
            .set_json(serde_json::json!({ "index": 7 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_start_without_source_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(MockQuizAttemptRepository::new())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(serde_json::json!({ "duration_seconds": 60 }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_discard_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(MockQuizAttemptRepository::new())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/sessions")
            .set_json(start_body())
            .to_request();
        let started: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let id = started["session_id"].as_str().unwrap();

        let req = test::TestRequest::delete()
            .uri(&format!("/api/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());

        let req = test::TestRequest::get()
            .uri(&format!("/api/sessions/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_list_attempts_uses_pagination() {
        let mut repo = MockQuizAttemptRepository::new();
        repo.expect_list_recent()
            .withf(|offset, limit| *offset == 10 && *limit == 5)
            .returning(|_, _| Ok((Vec::<QuizAttempt>::new(), 12)));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/attempts?offset=10&limit=5")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["total"], 12);
        assert_eq!(body["limit"], 5);
    }

    #[actix_web::test]
    async fn test_missing_attempt_is_not_found() {
        let mut repo = MockQuizAttemptRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state(repo)))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/attempts/abc")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
