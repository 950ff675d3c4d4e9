use anyhow::{Context, Result};
use log::debug;
use std::sync::Arc;

use crate::config::{Backend, Config};
use crate::llm::ollama::OllamaClient;
use crate::llm::openai::OpenAiClient;
use crate::llm::{DisabledClient, LlmClient};

/// Build the LLM client based on CLI + config.
pub fn build_llm_client(cfg: &Config) -> Result<Arc<dyn LlmClient>> {
    let client: Arc<dyn LlmClient> = match cfg.backend {
        Backend::None => {
            debug!("Model calls disabled; every stage uses its fallback");
            Arc::new(DisabledClient)
        }
        Backend::Ollama => {
            debug!("Using OllamaClient with model {} at {}", cfg.model, cfg.base_url);
            Arc::new(
                OllamaClient::new(cfg.base_url.clone(), cfg.model.clone(), cfg.timeout)
                    .context("failed to set up Ollama client")?,
            )
        }
        Backend::OpenAi => {
            debug!("Using OpenAiClient with model {} at {}", cfg.model, cfg.base_url);
            Arc::new(
                OpenAiClient::new(
                    cfg.api_key.clone(),
                    cfg.model.clone(),
                    cfg.base_url.clone(),
                    cfg.timeout,
                )
                .context("failed to set up OpenAI client")?,
            )
        }
    };

    Ok(client)
}
