use std::env;
use std::time::Duration;

use secrecy::SecretString;

use crate::{
    errors::{AppError, AppResult},
    session::SessionPolicy,
};

const DEV_LLM_API_KEY: &str = "dev_llm_api_key";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub attempts_collection: String,
    pub mongo_max_pool_size: u32,
    pub mongo_min_pool_size: u32,
    pub mongo_connect_timeout_seconds: u64,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub cors_allowed_origin: String,
    pub llm_api_key: SecretString,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub quiz_question_count: usize,
    pub quiz_min_question_count: usize,
    pub quiz_generation_attempts: u32,
    pub session_duration_seconds: u32,
    pub tab_switch_limit: u32,
    pub final_countdown_seconds: u32,
    pub submitted_session_retention_seconds: u64,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let policy = SessionPolicy::default();
        Self {
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME").unwrap_or_else(|_| "quiz-proctor".to_string()),
            attempts_collection: env::var("ATTEMPTS_COLLECTION")
                .unwrap_or_else(|_| "quiz_attempts".to_string()),
            mongo_max_pool_size: env_or("MONGO_MAX_POOL_SIZE", 10),
            mongo_min_pool_size: env_or("MONGO_MIN_POOL_SIZE", 2),
            mongo_connect_timeout_seconds: env_or("MONGO_CONNECT_TIMEOUT_SECONDS", 5),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env_or("WEB_SERVER_PORT", 5000),
            cors_allowed_origin: env::var("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            llm_api_key: SecretString::from(
                env::var("LLM_API_KEY").unwrap_or_else(|_| DEV_LLM_API_KEY.to_string()),
            ),
            llm_api_base_url: env::var("LLM_API_BASE_URL").unwrap_or_else(|_| {
                "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
            }),
            llm_model_name: env::var("LLM_MODEL_NAME")
                .unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            quiz_question_count: env_or("QUIZ_QUESTION_COUNT", 30),
            quiz_min_question_count: env_or("QUIZ_MIN_QUESTION_COUNT", 25),
            quiz_generation_attempts: env_or("QUIZ_GENERATION_ATTEMPTS", 3),
            session_duration_seconds: env_or("SESSION_DURATION_SECONDS", policy.duration_seconds),
            tab_switch_limit: env_or("TAB_SWITCH_LIMIT", policy.tab_switch_limit),
            final_countdown_seconds: env_or(
                "FINAL_COUNTDOWN_SECONDS",
                policy.final_countdown_seconds,
            ),
            submitted_session_retention_seconds: env_or(
                "SUBMITTED_SESSION_RETENTION_SECONDS",
                600,
            ),
        }
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy::default()
            .with_duration(self.session_duration_seconds)
            .with_tab_switch_limit(self.tab_switch_limit)
            .with_final_countdown(self.final_countdown_seconds)
    }

    pub fn mongo_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.mongo_connect_timeout_seconds)
    }

    /// How long a submitted session stays readable before it is evicted.
    pub fn submitted_session_retention(&self) -> Duration {
        Duration::from_secs(self.submitted_session_retention_seconds)
    }

    /// Rejects settings that would make every session or generation request fail.
    pub fn validate(&self) -> AppResult<()> {
        self.session_policy().validate()?;

        if self.quiz_min_question_count > self.quiz_question_count {
            return Err(AppError::ValidationError(format!(
                "QUIZ_MIN_QUESTION_COUNT ({}) exceeds QUIZ_QUESTION_COUNT ({})",
                self.quiz_min_question_count, self.quiz_question_count
            )));
        }

        if self.mongo_min_pool_size > self.mongo_max_pool_size {
            return Err(AppError::ValidationError(format!(
                "MONGO_MIN_POOL_SIZE ({}) exceeds MONGO_MAX_POOL_SIZE ({})",
                self.mongo_min_pool_size, self.mongo_max_pool_size
            )));
        }

        Ok(())
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        if self.llm_api_key.expose_secret() == DEV_LLM_API_KEY {
            panic!(
                "FATAL: LLM_API_KEY is using default value! Set LLM_API_KEY environment variable."
            );
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "quiz-proctor-test".to_string(),
            attempts_collection: "quiz_attempts".to_string(),
            mongo_max_pool_size: 4,
            mongo_min_pool_size: 1,
            mongo_connect_timeout_seconds: 2,
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 5000,
            cors_allowed_origin: "http://localhost:5173".to_string(),
            llm_api_key: SecretString::from("test_llm_api_key".to_string()),
            llm_api_base_url: "http://localhost:9999/v1".to_string(),
            llm_model_name: "test-model".to_string(),
            quiz_question_count: 5,
            quiz_min_question_count: 3,
            quiz_generation_attempts: 3,
            session_duration_seconds: 600,
            tab_switch_limit: 2,
            final_countdown_seconds: 10,
            submitted_session_retention_seconds: 600,
        }
    }
}
