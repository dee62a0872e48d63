use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize)]
pub struct AvailableModel {
    pub model_name: &'static str,
    pub model_source: &'static str,
}

/// OpenAI-compatible chat completion backends. `api_key` holds the *name* of
/// the environment variable; the secret itself is read at call time.
#[derive(Clone, Debug, Serialize)]
pub enum Provider {
    Groq {
        api_key: String,
        available_models: Vec<AvailableModel>,
    },
    OpenRouter {
        api_key: String,
        available_models: Vec<AvailableModel>,
    },
}

pub const GROQ_API_KEY_ENV_VAR: &str = "GROQ_API_KEY";
pub const OPENROUTER_API_KEY_ENV_VAR: &str = "OPENROUTER_API_KEY";

pub const GROQ_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

pub const GROQ_MODELS: &[AvailableModel] = &[
    AvailableModel {
        model_name: "llama3-8b-8192",
        model_source: "groq",
    },
    AvailableModel {
        model_name: "llama-3.1-8b-instant",
        model_source: "groq",
    },
];

pub const OPENROUTER_MODELS: &[AvailableModel] = &[AvailableModel {
    model_name: "meta-llama/llama-3-8b-instruct",
    model_source: "openrouter",
}];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponseMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionChoice {
    pub message: ChatCompletionResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
    pub index: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: Option<u32>,
    pub total_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionResponse {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    pub created: u64,
    pub model: String,
    pub choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    pub usage: Option<ChatCompletionUsage>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if the backend returned any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_unset_options() {
        let request = ChatCompletionRequest {
            model: "llama3-8b-8192".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: None,
            max_tokens: Some(64),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("temperature").is_none());
        assert_eq!(value["max_tokens"], 64);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn response_parses_openai_shape() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "llama3-8b-8192",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Plan"}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.first_content(), Some("Plan"));
        assert_eq!(response.usage.unwrap().total_tokens, 12);
    }
}
