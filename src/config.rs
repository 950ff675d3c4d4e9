use anyhow::{Context, Result, anyhow, bail};
use clap::ValueEnum;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::cli_args::Cli;
use crate::commit::CommitStyle;
use crate::summary::DEFAULT_MAX_SUMMARY_CHARS;

const DEFAULT_OLLAMA_MODEL: &str = "openchat:7b";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
const DEFAULT_TOP_P: f32 = 0.9;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Which completion service to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Local Ollama server
    #[default]
    Ollama,
    /// OpenAI or any compatible /v1/chat/completions endpoint
    #[value(name = "openai")]
    OpenAi,
    /// No model calls; every stage uses its deterministic fallback
    None,
}

/// Final resolved configuration for commitsmith.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend: Backend,
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub commit_style: CommitStyle,
    pub top_p: f32,
    pub timeout: Duration,
    pub llm_bullets: bool,
    pub max_summary_length: usize,
}

/// One configuration layer. Every field is optional; unset fields fall
/// through to the next layer.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub backend: Option<Backend>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub commit_style: Option<CommitStyle>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
    pub llm_bullets: Option<bool>,
    pub max_summary_length: Option<usize>,
}

impl Settings {
    /// Fill every unset field of `self` from `lower`.
    fn or(self, lower: Settings) -> Settings {
        Settings {
            backend: self.backend.or(lower.backend),
            model: self.model.or(lower.model),
            base_url: self.base_url.or(lower.base_url),
            api_key: self.api_key.or(lower.api_key),
            commit_style: self.commit_style.or(lower.commit_style),
            top_p: self.top_p.or(lower.top_p),
            timeout_secs: self.timeout_secs.or(lower.timeout_secs),
            llm_bullets: self.llm_bullets.or(lower.llm_bullets),
            max_summary_length: self.max_summary_length.or(lower.max_summary_length),
        }
    }

    pub fn from_cli(cli: &Cli) -> Settings {
        Settings {
            backend: if cli.no_model { Some(Backend::None) } else { cli.backend },
            model: cli.model.clone(),
            base_url: cli.base_url.clone(),
            api_key: cli.api_key.clone(),
            commit_style: cli.style,
            top_p: cli.top_p,
            timeout_secs: cli.timeout,
            llm_bullets: cli.llm_bullets.then_some(true),
            max_summary_length: cli.max_summary_length,
        }
    }

    /// Read `COMMITSMITH_*` variables through `lookup`.
    pub fn from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Settings> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Settings {
            backend: var("COMMITSMITH_BACKEND")
                .map(|v| parse_choice("COMMITSMITH_BACKEND", &v))
                .transpose()?,
            model: var("COMMITSMITH_MODEL"),
            base_url: var("COMMITSMITH_BASE_URL"),
            api_key: var("COMMITSMITH_API_KEY"),
            commit_style: var("COMMITSMITH_STYLE")
                .map(|v| parse_choice("COMMITSMITH_STYLE", &v))
                .transpose()?,
            top_p: var("COMMITSMITH_TOP_P")
                .map(|v| parse_value("COMMITSMITH_TOP_P", &v))
                .transpose()?,
            timeout_secs: var("COMMITSMITH_TIMEOUT")
                .map(|v| parse_value("COMMITSMITH_TIMEOUT", &v))
                .transpose()?,
            llm_bullets: var("COMMITSMITH_LLM_BULLETS")
                .map(|v| parse_flag("COMMITSMITH_LLM_BULLETS", &v))
                .transpose()?,
            max_summary_length: None,
        })
    }

    pub fn from_toml(data: &str) -> Result<Settings> {
        toml::from_str(data).context("invalid configuration file")
    }
}

fn parse_choice<T: ValueEnum>(name: &str, value: &str) -> Result<T> {
    <T as ValueEnum>::from_str(value.trim(), true).map_err(|e| anyhow!("invalid {name} {value:?}: {e}"))
}

fn parse_value<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("invalid {name} {value:?}"))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("invalid {name} {other:?}: expected true or false"),
    }
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (`--backend`, `--model`, ...)
    ///   2. Env vars `COMMITSMITH_*` (and `OPENAI_API_KEY` through `--api-key`)
    ///   3. TOML `~/.config/commitsmith.toml`
    ///   4. Hardcoded defaults (local Ollama with openchat:7b)
    pub fn from_sources(cli: &Cli) -> Result<Self> {
        let file = match config_path() {
            Some(path) => load_file_config(&path)?,
            None => None,
        };
        let env = Settings::from_env(|name| env::var(name).ok())?;

        Config::resolve(Settings::from_cli(cli), env, file.unwrap_or_default())
    }

    /// Merge three layers, highest precedence first, and validate the result.
    pub fn resolve(cli: Settings, env: Settings, file: Settings) -> Result<Self> {
        let merged = cli.or(env).or(file);

        let mut backend = merged.backend.unwrap_or_default();
        if merged
            .model
            .as_deref()
            .is_some_and(|m| m.trim().eq_ignore_ascii_case("none"))
        {
            backend = Backend::None;
        }

        let (default_model, default_url) = match backend {
            Backend::Ollama => (DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL),
            Backend::OpenAi => (DEFAULT_OPENAI_MODEL, DEFAULT_OPENAI_URL),
            Backend::None => ("none", ""),
        };

        let model = merged
            .model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| default_model.to_string());
        let base_url = merged
            .base_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_url.to_string());
        let api_key = merged.api_key.filter(|k| !k.trim().is_empty());

        let top_p = merged.top_p.unwrap_or(DEFAULT_TOP_P);
        if !(top_p > 0.0 && top_p <= 1.0) {
            bail!("top_p must be in (0, 1], got {top_p}");
        }

        let timeout_secs = merged.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            bail!("timeout must be at least one second");
        }

        let max_summary_length = merged
            .max_summary_length
            .unwrap_or(DEFAULT_MAX_SUMMARY_CHARS);
        if max_summary_length == 0 {
            bail!("max summary length must be positive");
        }

        if backend == Backend::OpenAi && api_key.is_none() {
            bail!(
                "OPENAI_API_KEY (or --api-key) is required for the openai backend unless --no-model or model=none is used"
            );
        }

        Ok(Config {
            backend,
            model,
            base_url,
            api_key,
            commit_style: merged.commit_style.unwrap_or_default(),
            top_p,
            timeout: Duration::from_secs(timeout_secs),
            llm_bullets: merged.llm_bullets.unwrap_or(false),
            max_summary_length,
        })
    }
}

/// Return `~/.config/commitsmith.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("commitsmith.toml"))
}

fn load_file_config(path: &Path) -> Result<Option<Settings>> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let settings =
        Settings::from_toml(&data).with_context(|| format!("in {}", path.display()))?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some(settings))
}
