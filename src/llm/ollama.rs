use anyhow::{Context, Result};
use musli::json;
use musli::{Decode, Encode};
use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::LlmError;

use super::{LlmClient, PromptPair, Sampling, truncate};

const BACKEND: &str = "ollama";

#[derive(Debug, Encode, Decode)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Decode)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Debug, Encode)]
struct ChatOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Encode)]
struct ChatRequest {
    model: String,
    stream: bool,
    messages: Vec<OllamaMessage>,
    options: ChatOptions,
}

/// Synchronous Ollama client using /api/chat.
///
/// Local inference can take minutes on CPU, so the timeout should be generous.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }
}

fn encode_request(model: &str, prompt: &PromptPair, sampling: &Sampling) -> Result<String, LlmError> {
    let req_body = ChatRequest {
        model: model.to_string(),
        stream: false,
        messages: vec![
            OllamaMessage {
                role: "system".to_string(),
                content: prompt.system.clone(),
            },
            OllamaMessage {
                role: "user".to_string(),
                content: prompt.user.clone(),
            },
        ],
        options: ChatOptions {
            num_predict: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
        },
    };

    json::to_string(&req_body).map_err(|e| LlmError::Decode {
        backend: BACKEND,
        message: format!("failed to encode request: {e}"),
    })
}

fn decode_response(body: &str) -> Result<String, LlmError> {
    let parsed: OllamaChatResponse = json::from_str(body).map_err(|e| LlmError::Decode {
        backend: BACKEND,
        message: e.to_string(),
    })?;

    let content = parsed.message.content.trim().to_string();
    if content.is_empty() {
        return Err(LlmError::Empty { backend: BACKEND });
    }
    Ok(content)
}

impl LlmClient for OllamaClient {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn complete(&self, prompt: &PromptPair, sampling: &Sampling) -> Result<String, LlmError> {
        let body_str = encode_request(&self.model, prompt, sampling)?;
        log::trace!("Ollama request body: {}", truncate(&body_str, 3000));

        let url = self.chat_url();
        log::info!("Calling Ollama model {:?}", self.model);

        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()
            .map_err(|source| LlmError::Transport {
                backend: BACKEND,
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(LlmError::Status {
                backend: BACKEND,
                status,
                body: truncate(&body, 500),
            });
        }

        let resp_text = resp.text().map_err(|e| LlmError::Decode {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        log::trace!("Ollama raw JSON response: {}", truncate(&resp_text, 2000));

        decode_response(&resp_text)
    }
}
