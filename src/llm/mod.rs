//! LLM answer generation
//!
//! Supports Ollama's generate API and OpenAI-compatible chat completions,
//! selected by the configured key: the literal key "ollama" routes to the
//! Ollama endpoint, anything else is treated as an OpenAI-compatible
//! bearer token.

pub mod prompts;

pub use prompts::build_fallback_answer;
pub use prompts::build_qa_prompt;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::errors::DocRagError;
use crate::errors::Result;

/// LLM provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LlmProvider {
    OpenAICompatible,
    Ollama,
}

/// Generation options for the Ollama API
///
/// Ollama calls the output token limit `num_predict`.
#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: usize,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

/// Service for generating answers from an LLM
#[derive(Clone)]
pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl LlmService {
    /// Create a new LLM service from configuration
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = if config.llm_key() == "ollama" {
            LlmProvider::Ollama
        } else {
            LlmProvider::OpenAICompatible
        };

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300)) // LLM responses can be slow
            .build()
            .map_err(|e| DocRagError::Http(e.to_string()))?;

        Ok(Self {
            provider,
            endpoint: config.llm_endpoint().to_string(),
            api_key: config.llm_key().to_string(),
            model: config.llm_model().to_string(),
            client,
        })
    }

    /// Model name in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a completion with default parameters
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_params(prompt, 0.0, 2000, None).await
    }

    /// Generate a completion with explicit parameters
    ///
    /// `model_override` replaces the configured model for this call only;
    /// the original system exposed per-request model selection.
    pub async fn generate_with_params(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: usize,
        model_override: Option<&str>,
    ) -> Result<String> {
        let model = model_override.unwrap_or(&self.model);
        match self.provider {
            LlmProvider::Ollama => {
                self.generate_ollama(prompt, model, temperature, max_tokens)
                    .await
            }
            LlmProvider::OpenAICompatible => {
                self.generate_openai(prompt, model, temperature, max_tokens)
                    .await
            }
        }
    }

    async fn generate_ollama(
        &self,
        prompt: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        #[derive(Deserialize)]
        struct OllamaResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate API: {} (model {})", url, model);

        let request = OllamaRequest {
            model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature,
                num_predict: max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DocRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocRagError::Llm(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response
            .json()
            .await
            .map_err(|e| DocRagError::Llm(format!("Failed to parse response: {e}")))?;

        Ok(result.response)
    }

    async fn generate_openai(
        &self,
        prompt: &str,
        model: &str,
        temperature: f32,
        max_tokens: usize,
    ) -> Result<String> {
        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
            max_tokens: usize,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: String,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {} (model {})", url, model);

        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| DocRagError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(DocRagError::Llm(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| DocRagError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| DocRagError::Llm("No completion in response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ollama_request_carries_token_limit() {
        let request = OllamaRequest {
            model: "llama3.2",
            prompt: "question",
            stream: false,
            options: OllamaOptions {
                temperature: 0.0,
                num_predict: 2000,
            },
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["options"]["num_predict"], 2000);
        assert_eq!(body["options"]["temperature"], 0.0);
        assert_eq!(body["stream"], false);
    }
}
