//! Language-model question generation over HTTP.
//!
//! Speaks the Anthropic Messages API or the OpenAI Chat Completions API
//! with a blocking client. The reply text is decoded by
//! [`parse_variants`](super::parse::parse_variants).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::parse::parse_variants;
use super::QuestionGenerator;
use crate::error::{GeneratorError, ValidationError};
use crate::item::{KnowledgeItem, QuestionVariant};
use crate::storage::GeneratorConfig;

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const OPENAI_TEMPERATURE: f32 = 0.7;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Hosted model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    OpenAi,
}

impl Provider {
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4-turbo-preview",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => ANTHROPIC_API_BASE,
            Provider::OpenAi => OPENAI_API_BASE,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAi => "openai",
        })
    }
}

impl FromStr for Provider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Ok(Provider::Anthropic),
            "openai" => Ok(Provider::OpenAi),
            other => Err(ValidationError::InvalidValue {
                field: "provider".into(),
                message: format!("'{other}' is not anthropic or openai"),
            }),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Prompt asking for one question of each type as a JSON array.
pub fn build_prompt(item: &KnowledgeItem) -> String {
    let tags = item.tags.iter().cloned().collect::<Vec<_>>().join(", ");
    indoc::formatdoc! {r#"
        You are a learning assistant that creates quiz questions. Given the following knowledge item, generate exactly 3 questions:

        1. One multiple choice question (MCQ) with 4 options
        2. One short answer question with 2-3 acceptable answers
        3. One flashcard (front: question, back: answer)

        Title: {title}
        Content: {content}
        Tags: {tags}
        Difficulty: {difficulty}/5

        Please respond ONLY with a valid JSON array in this exact format:
        [
          {{
            "type": "mcq",
            "prompt": "question text",
            "choices": [
              {{"text": "option 1", "isCorrect": true}},
              {{"text": "option 2", "isCorrect": false}},
              {{"text": "option 3", "isCorrect": false}},
              {{"text": "option 4", "isCorrect": false}}
            ]
          }},
          {{
            "type": "short",
            "prompt": "question text",
            "acceptedAnswers": ["answer1", "answer2"],
            "answerGuidance": "hint text"
          }},
          {{
            "type": "flashcard",
            "front": "question",
            "back": "answer"
          }}
        ]"#,
        title = item.title,
        content = item.content,
        tags = tags,
        difficulty = item.difficulty,
    }
}

/// Hosted-model question generator.
pub struct LlmGenerator {
    client: reqwest::blocking::Client,
    provider: Provider,
    model: String,
    base_url: String,
    api_key: String,
    max_tokens: u32,
}

impl fmt::Debug for LlmGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmGenerator")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

impl LlmGenerator {
    /// Create a generator with the provider's default model and endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Result<Self, GeneratorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: api_key.into(),
            max_tokens: 1024,
        })
    }

    /// Build from the `[generator]` config section, reading the API key from
    /// the configured environment variable.
    ///
    /// # Errors
    /// [`GeneratorError::Disabled`] when switched off,
    /// [`GeneratorError::MissingApiKey`] when the variable is unset or blank.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        if !config.enabled {
            return Err(GeneratorError::Disabled);
        }

        let var = config.api_key_var();
        let api_key = std::env::var(&var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeneratorError::MissingApiKey { var })?;

        let mut generator = Self::new(config.provider, api_key)?;
        if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
            generator.model = model.to_string();
        }
        if let Some(url) = config.base_url.as_deref().filter(|u| !u.is_empty()) {
            generator = generator.with_base_url(url);
        }
        generator.max_tokens = config.max_tokens;
        Ok(generator)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn send<B: Serialize>(
        &self,
        request: reqwest::blocking::RequestBuilder,
        body: &B,
    ) -> Result<reqwest::blocking::Response, GeneratorError> {
        let response = request.json(body).send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeneratorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn complete_anthropic(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION);
        let body = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let reply: AnthropicResponse = self.send(request, &body)?.json()?;
        Ok(reply
            .content
            .into_iter()
            .find_map(|c| match c {
                AnthropicContent::Text { text } => Some(text),
                AnthropicContent::Other => None,
            })
            .unwrap_or_default())
    }

    fn complete_openai(&self, prompt: &str) -> Result<String, GeneratorError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key);
        let body = OpenAiRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: OPENAI_TEMPERATURE,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let reply: OpenAiResponse = self.send(request, &body)?.json()?;
        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }

    /// Send `prompt` and return the reply text.
    pub fn complete(&self, prompt: &str) -> Result<String, GeneratorError> {
        match self.provider {
            Provider::Anthropic => self.complete_anthropic(prompt),
            Provider::OpenAi => self.complete_openai(prompt),
        }
    }
}

impl QuestionGenerator for LlmGenerator {
    fn generate(&self, item: &KnowledgeItem) -> Result<Vec<QuestionVariant>, GeneratorError> {
        tracing::debug!(provider = %self.provider, model = %self.model, item_id = %item.id, "requesting questions");
        let reply = self.complete(&build_prompt(item))?;
        parse_variants(&reply)
    }
}
