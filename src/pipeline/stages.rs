use std::sync::Arc;

use crate::bullets::{llm_bullets, rule_based_bullets};
use crate::commit::{CommitStyle, write_commit_message};
use crate::diff::segment;
use crate::error::StageError;
use crate::git::ChangeSource;
use crate::grouping::prepare;
use crate::llm::LlmClient;
use crate::state::RunState;
use crate::summary::compose_summary;

use super::Stage;

/// Reads the staged diff and turns it into bullet points.
pub struct DiffStage {
    source: Box<dyn ChangeSource>,
    llm: Arc<dyn LlmClient>,
    use_llm: bool,
    top_p: f32,
}

impl DiffStage {
    pub fn new(
        source: Box<dyn ChangeSource>,
        llm: Arc<dyn LlmClient>,
        use_llm: bool,
        top_p: f32,
    ) -> Self {
        DiffStage {
            source,
            llm,
            use_llm,
            top_p,
        }
    }

    fn model_bullets(&self, diff: &str) -> Option<Vec<String>> {
        match llm_bullets(diff, self.llm.as_ref(), self.top_p) {
            Ok(Some(bullets)) => Some(bullets),
            Ok(None) => {
                log::warn!("Model reply had no bullet lines, using rule-based bullets");
                None
            }
            Err(e) => {
                log::warn!("Bullet extraction via {} failed: {e}; using rule-based bullets", self.llm.name());
                None
            }
        }
    }
}

impl Stage for DiffStage {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn process(&self, mut state: RunState) -> RunState {
        if state.has_errors() {
            return state;
        }

        let diff = match self.source.staged_diff() {
            Ok(diff) => diff,
            Err(e) => {
                state.add_error(self.name(), StageError::Source(format!("{e:#}")));
                return state;
            }
        };

        state.set_meta("diff_length", diff.chars().count());
        let files = segment(&diff);
        state.set_meta("file_count", files.len());
        state.staged_diff = Some(diff);

        if files.is_empty() {
            state.add_error(self.name(), StageError::NoStagedChanges);
            return state;
        }
        log::info!("Found {} changed file(s)", files.len());

        let model = if self.use_llm {
            state
                .staged_diff
                .as_deref()
                .and_then(|diff| self.model_bullets(diff))
        } else {
            None
        };

        let (bullets, source) = match model {
            Some(bullets) => (bullets, "model"),
            None => (rule_based_bullets(&files), "rules"),
        };

        log::info!("Generated {} bullet point(s) from {source}", bullets.len());
        state.set_meta("bullet_count", bullets.len());
        state.set_meta("bullet_source", source);
        state.bullet_points = Some(bullets);
        state
    }
}

/// Filters and groups the bullets, then writes a prose summary.
pub struct SummaryStage {
    llm: Arc<dyn LlmClient>,
    max_chars: usize,
    top_p: f32,
}

impl SummaryStage {
    pub fn new(llm: Arc<dyn LlmClient>, max_chars: usize, top_p: f32) -> Self {
        SummaryStage {
            llm,
            max_chars,
            top_p,
        }
    }
}

impl Stage for SummaryStage {
    fn name(&self) -> &'static str {
        "summary"
    }

    fn process(&self, mut state: RunState) -> RunState {
        if state.has_errors() {
            return state;
        }

        let Some(bullets) = state.usable_bullets() else {
            state.add_error(self.name(), StageError::MissingInput("bullet points"));
            return state;
        };

        let original = bullets.len();
        let (kept, groups) = prepare(bullets);
        log::info!(
            "Summarizing {} of {original} bullet point(s) across {} group(s)",
            kept.len(),
            groups.len()
        );

        let (summary, source) =
            compose_summary(&groups, self.llm.as_ref(), self.max_chars, self.top_p);

        state.set_meta("original_bullet_count", original);
        state.set_meta("filtered_bullet_count", kept.len());
        state.set_meta("summary_length", summary.chars().count());
        state.set_meta("summary_source", source.as_str());
        state.summary = Some(summary);
        state
    }
}

/// Drafts the commit message from the summary.
pub struct CommitStage {
    llm: Arc<dyn LlmClient>,
    style: CommitStyle,
    top_p: f32,
}

impl CommitStage {
    pub fn new(llm: Arc<dyn LlmClient>, style: CommitStyle, top_p: f32) -> Self {
        CommitStage { llm, style, top_p }
    }
}

impl Stage for CommitStage {
    fn name(&self) -> &'static str {
        "commit"
    }

    fn process(&self, mut state: RunState) -> RunState {
        if state.has_errors() {
            return state;
        }

        let Some(summary) = state.usable_summary() else {
            state.add_error(self.name(), StageError::MissingInput("summary"));
            return state;
        };

        let bullets = state.bullet_points.as_deref().unwrap_or_default();
        let result = write_commit_message(summary, bullets, self.style, self.llm.as_ref(), self.top_p);

        match result {
            Ok((message, source)) => {
                let text = message.to_string();
                log::info!("Commit message ready ({}): {}", source.as_str(), message.header());
                state.set_meta("commit_message_length", text.chars().count());
                state.set_meta("commit_style", self.style.as_str());
                state.set_meta("commit_source", source.as_str());
                state.commit_message = Some(text);
            }
            Err(e) => state.add_error(self.name(), e),
        }
        state
    }
}
