use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use secrecy::ExposeSecret;
use serde::Deserialize;

use crate::{
    config::Config,
    constants::quiz_prompt::{quiz_user_prompt, FILLER_PROMPT_PREFIX, QUIZ_GENERATOR_SYSTEM_PROMPT},
    errors::{AppError, AppResult},
    models::domain::Question,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// A complete quiz.
    Full,
    /// Extra questions to top up a short quiz.
    Filler,
}

/// Source of raw quiz questions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        count: usize,
        kind: GenerationKind,
    ) -> AppResult<Vec<Question>>;
}

/// Shape requested from the model through structured output.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GeneratedQuiz {
    pub questions: Vec<Question>,
}

/// Talks to any OpenAI-compatible chat completion endpoint.
pub struct OpenAiQuestionGenerator {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiQuestionGenerator {
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(config.llm_api_key.expose_secret())
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: config.llm_model_name.clone(),
        }
    }

    fn response_format() -> AppResult<ResponseFormat> {
        let schema = serde_json::to_value(schemars::schema_for!(GeneratedQuiz))
            .map_err(|e| AppError::InternalError(format!("Failed to build quiz schema: {}", e)))?;

        Ok(ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: Some("A list of multiple-choice questions".to_string()),
                name: "generated_quiz".to_string(),
                schema: Some(schema),
                strict: None,
            },
        })
    }

    fn messages(
        topic: &str,
        count: usize,
        kind: GenerationKind,
    ) -> AppResult<Vec<ChatCompletionRequestMessage>> {
        let user_prompt = match kind {
            GenerationKind::Full => quiz_user_prompt(topic, count),
            GenerationKind::Filler => {
                format!("{}\n\n{}", FILLER_PROMPT_PREFIX, quiz_user_prompt(topic, count))
            }
        };

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(QUIZ_GENERATOR_SYSTEM_PROMPT)
            .build()?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(user_prompt)
            .build()?;

        Ok(vec![
            ChatCompletionRequestMessage::System(system),
            ChatCompletionRequestMessage::User(user),
        ])
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiQuestionGenerator {
    async fn generate(
        &self,
        topic: &str,
        count: usize,
        kind: GenerationKind,
    ) -> AppResult<Vec<Question>> {
        log::debug!(
            "Requesting {} questions ({:?}) from model {}",
            count,
            kind,
            self.model_name
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(Self::messages(topic, count, kind)?)
            .response_format(Self::response_format()?)
            .temperature(0.7)
            .build()?;

        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::GenerationError("Model returned no content".to_string()))?;

        parse_generated_quiz(&content)
    }
}

pub fn parse_generated_quiz(content: &str) -> AppResult<Vec<Question>> {
    let quiz: GeneratedQuiz = serde_json::from_str(content.trim()).map_err(|e| {
        AppError::GenerationError(format!("Model output did not match quiz schema: {}", e))
    })?;
    Ok(quiz.questions)
}
