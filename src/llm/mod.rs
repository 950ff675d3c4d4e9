pub mod ollama;
pub mod openai;
pub mod prompt_builder;
mod prompts;

use crate::error::LlmError;

pub use prompt_builder::PromptPair;

/// Sampling knobs passed with every completion request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// A text-completion backend.
///
/// Implementations hold no per-run state, so one client is shared by every
/// stage of a run.
pub trait LlmClient: Send + Sync {
    /// Short backend name for log lines.
    fn name(&self) -> &'static str;

    /// Complete `prompt`. Any failure (network, timeout, non-2xx, bad body)
    /// comes back as an [`LlmError`] for the caller to fall back on.
    fn complete(&self, prompt: &PromptPair, sampling: &Sampling) -> Result<String, LlmError>;
}

/// Client used with `--no-model`: every call fails, so every stage takes its
/// rule-based path.
#[derive(Debug, Default)]
pub struct DisabledClient;

impl LlmClient for DisabledClient {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn complete(&self, _prompt: &PromptPair, _sampling: &Sampling) -> Result<String, LlmError> {
        Err(LlmError::Disabled)
    }
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!(
            "{}...\n[truncated {} chars]",
            &s[..idx],
            s[idx..].chars().count()
        ),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted clients for exercising fallback paths without a network.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order; `None` entries become transport errors.
    /// Once the script runs out every call fails.
    #[derive(Debug, Default)]
    pub struct ScriptedClient {
        replies: Mutex<VecDeque<Option<String>>>,
        pub prompts: Mutex<Vec<PromptPair>>,
    }

    impl ScriptedClient {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = Option<S>>,
            S: Into<String>,
        {
            ScriptedClient {
                replies: Mutex::new(replies.into_iter().map(|r| r.map(Into::into)).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    impl LlmClient for ScriptedClient {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn complete(&self, prompt: &PromptPair, _sampling: &Sampling) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.clone());
            match self.replies.lock().unwrap().pop_front() {
                Some(Some(reply)) => Ok(reply),
                _ => Err(LlmError::Empty { backend: "scripted" }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let out = truncate("ééééé", 2);
        assert!(out.starts_with("éé..."));
        assert!(out.ends_with("[truncated 3 chars]"));
    }

    #[test]
    fn disabled_client_always_fails() {
        let prompt = PromptPair {
            system: String::new(),
            user: "hi".into(),
        };
        let sampling = Sampling {
            max_tokens: 10,
            temperature: 0.1,
            top_p: 0.9,
        };
        assert!(matches!(
            DisabledClient.complete(&prompt, &sampling),
            Err(LlmError::Disabled)
        ));
    }
}
