use async_trait::async_trait;
use dotenv::dotenv;
use reqwest::Client;
use std::env;
use thiserror::Error;
use tracing::debug;

use super::endpoints::{
    AvailableModel, ChatCompletionRequest, ChatCompletionResponse, Provider, GROQ_CHAT_URL,
    GROQ_MODELS, OPENROUTER_CHAT_URL, OPENROUTER_MODELS,
};

#[derive(Debug, Error)]
pub enum ApiConnectionError {
    #[error("API key not found in environment: {0}")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("API error {status}: {error_body}")]
    ApiError {
        status: reqwest::StatusCode,
        error_body: String,
    },
    #[error("Backend returned no choices")]
    EmptyResponse,
}

/// The generation backend as seen by the recommendation pipeline.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier placed into requests.
    fn model_name(&self) -> String;

    /// Fails with `MissingApiKey` when no credential is configured.
    fn ensure_credentials(&self) -> Result<(), ApiConnectionError>;

    async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError>;
}

impl Provider {
    pub fn groq(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::Groq {
            api_key: api_key_env_var_name.to_string(),
            available_models: GROQ_MODELS.to_vec(),
        }
    }

    pub fn openrouter(api_key_env_var_name: &str) -> Self {
        dotenv().ok();
        Self::OpenRouter {
            api_key: api_key_env_var_name.to_string(),
            available_models: OPENROUTER_MODELS.to_vec(),
        }
    }

    pub fn get_available_models(&self) -> Vec<AvailableModel> {
        match self {
            Provider::Groq { available_models, .. } | Provider::OpenRouter { available_models, .. } => {
                available_models.clone()
            }
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Groq { .. } => GROQ_MODELS[0].model_name,
            Provider::OpenRouter { .. } => OPENROUTER_MODELS[0].model_name,
        }
    }

    fn api_key_env_var(&self) -> &str {
        match self {
            Provider::Groq { api_key, .. } | Provider::OpenRouter { api_key, .. } => api_key,
        }
    }

    fn chat_url(&self) -> &'static str {
        match self {
            Provider::Groq { .. } => GROQ_CHAT_URL,
            Provider::OpenRouter { .. } => OPENROUTER_CHAT_URL,
        }
    }

    fn read_api_key(&self) -> Result<String, ApiConnectionError> {
        dotenv().ok();
        let name = self.api_key_env_var();
        match env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ApiConnectionError::MissingApiKey(name.to_string())),
        }
    }
}

/// A provider bound to a specific model.
#[derive(Clone, Debug)]
pub struct ChatClient {
    provider: Provider,
    model: String,
    http: Client,
}

impl ChatClient {
    pub fn new(provider: Provider, model: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| provider.default_model().to_string());
        Self {
            provider,
            model,
            http: Client::new(),
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }
}

#[async_trait]
impl ChatBackend for ChatClient {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    fn ensure_credentials(&self) -> Result<(), ApiConnectionError> {
        self.provider.read_api_key().map(|_| ())
    }

    async fn call_chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ApiConnectionError> {
        let actual_api_key = self.provider.read_api_key()?;
        let url = self.provider.chat_url();
        debug!(url, model = %request.model, "sending chat completion request");

        let mut builder = self
            .http
            .post(url)
            .bearer_auth(actual_api_key)
            .header("Content-Type", "application/json");

        if let Provider::OpenRouter { .. } = self.provider {
            let site_url = env::var("SITE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
            let app_name = env::var("APP_NAME").unwrap_or_else(|_| "MealPlanner".to_string());
            builder = builder.header("HTTP-Referer", site_url).header("X-Title", app_name);
        }

        let response = builder.json(&request).send().await?;

        if response.status().is_success() {
            let chat_response = response.json::<ChatCompletionResponse>().await?;
            if chat_response.choices.is_empty() {
                return Err(ApiConnectionError::EmptyResponse);
            }
            Ok(chat_response)
        } else {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            Err(ApiConnectionError::ApiError { status, error_body })
        }
    }
}
