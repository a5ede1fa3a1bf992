use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use url::Url;

use super::VisionProvider;
use crate::model::ScenePrompt;

// Enough for a one-word verdict.
const MAX_COMPLETION_TOKENS: u32 = 5;

#[derive(Error, Debug)]
pub enum VisionError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("OpenAI API error: {0}")]
    ApiError(String),
    #[error("OpenAI response contained no completion")]
    EmptyCompletion,
}

#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl VisionConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Clone)]
pub struct OpenAiVisionService {
    http_client: HttpClient,
    api_key: String,
    model: String,
    chat_url: Url,
}

impl OpenAiVisionService {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let chat_url = Url::parse(&format!(
            "{}/v1/chat/completions",
            config.base_url.trim_end_matches('/')
        ))?;

        info!(
            "Vision provider configured: model={}, endpoint={}",
            config.model, chat_url
        );

        Ok(Self {
            http_client: HttpClient::new(),
            api_key: config.api_key,
            model: config.model,
            chat_url,
        })
    }

    fn build_request(&self, prompt: &ScenePrompt) -> ChatRequest {
        let mut content = vec![serde_json::json!({
            "type": "text",
            "text": prompt.instruction,
        })];
        for image_url in &prompt.image_urls {
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": { "url": image_url },
            }));
        }

        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: serde_json::Value::Array(content),
            }],
            max_tokens: MAX_COMPLETION_TOKENS,
        }
    }
}

#[async_trait]
impl VisionProvider for OpenAiVisionService {
    async fn classify(&self, prompt: &ScenePrompt) -> Result<String, VisionError> {
        let request = self.build_request(prompt);

        let response = self
            .http_client
            .post(self.chat_url.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(VisionError::ApiError(format!(
                "Chat completion failed: {}",
                error_text
            )));
        }

        let chat_response: ChatResponse = response.json().await?;
        let choice = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(VisionError::EmptyCompletion)?;
        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> OpenAiVisionService {
        OpenAiVisionService::new(VisionConfig {
            api_key: "test-key".to_string(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn trailing_slash_in_base_url_is_tolerated() {
        assert_eq!(
            service().chat_url.as_str(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn request_puts_instruction_first_then_images_in_order() {
        let images: [&[u8]; 3] = [b"a", b"b", b"c"];
        let prompt = ScenePrompt::tri_camera(&images, "1", "2", "3", "now");
        let request = serde_json::to_value(service().build_request(&prompt)).unwrap();

        assert_eq!(request["model"], "gpt-4o");
        assert_eq!(request["max_tokens"], 5);

        let content = request["messages"][0]["content"].as_array().unwrap();
        assert_eq!(content.len(), 4);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], prompt.instruction);
        for (block, image_url) in content[1..].iter().zip(&prompt.image_urls) {
            assert_eq!(block["type"], "image_url");
            assert_eq!(block["image_url"]["url"], image_url.as_str());
        }
    }

    #[test]
    fn first_choice_content_is_extracted() {
        let body = r#"{"choices":[{"message":{"content":"Suspicious"}},{"message":{"content":"ignored"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Suspicious");
    }
}
