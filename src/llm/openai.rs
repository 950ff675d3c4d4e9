use super::{LlmClient, PromptPair, Sampling, truncate};
use crate::error::LlmError;
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BACKEND: &str = "openai";

/// Minimal request/response structs for the Chat Completions API.
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Client for OpenAI and any server speaking the same
/// `/v1/chat/completions` protocol.
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    api_base_url: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: Option<String>,
        model: String,
        api_base_url: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(OpenAiClient {
            client,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }
}

impl LlmClient for OpenAiClient {
    fn name(&self) -> &'static str {
        BACKEND
    }

    fn complete(&self, prompt: &PromptPair, sampling: &Sampling) -> Result<String, LlmError> {
        let url = self.chat_url();

        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            stream: false,
        };

        log::info!("Calling OpenAI model {:?}", self.model);
        log::trace!("OpenAI prompt:\n{}", truncate(&prompt.user, 3000));

        let mut request = self.client.post(&url).json(&req);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let resp = request.send().map_err(|source| LlmError::Transport {
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

        let chat_resp: ChatResponse = resp.json().map_err(|e| LlmError::Decode {
            backend: BACKEND,
            message: e.to_string(),
        })?;

        if let Some(usage) = &chat_resp.usage {
            log::debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        let content = chat_resp
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::Empty { backend: BACKEND })?;

        log::trace!("OpenAI response:\n{}", truncate(&content, 2000));

        Ok(content)
    }
}
