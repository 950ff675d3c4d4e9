//! The linear diff → summary → commit pipeline.

mod stages;

use std::sync::Arc;

use crate::config::Config;
use crate::git::ChangeSource;
use crate::llm::LlmClient;
use crate::state::RunState;

pub use stages::{CommitStage, DiffStage, SummaryStage};

/// One step of a run. A stage takes the state by value, fills in its own
/// output (or records an error) and hands it back.
pub trait Stage {
    fn name(&self) -> &'static str;

    fn process(&self, state: RunState) -> RunState;
}

/// Stages run in order; the run stops at the first recorded error.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Pipeline { stages }
    }

    /// The standard three-stage pipeline wired from `cfg`.
    pub fn from_config(
        cfg: &Config,
        llm: Arc<dyn LlmClient>,
        source: Box<dyn ChangeSource>,
    ) -> Self {
        Pipeline::new(vec![
            Box::new(DiffStage::new(source, llm.clone(), cfg.llm_bullets, cfg.top_p)),
            Box::new(SummaryStage::new(llm.clone(), cfg.max_summary_length, cfg.top_p)),
            Box::new(CommitStage::new(llm, cfg.commit_style, cfg.top_p)),
        ])
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, state: RunState) -> RunState {
        self.run_with(state, |_| {})
    }

    /// Like [`Pipeline::run`], calling `on_stage` with each stage's name just
    /// before it starts.
    pub fn run_with(&self, mut state: RunState, mut on_stage: impl FnMut(&str)) -> RunState {
        for stage in &self.stages {
            if state.has_errors() {
                log::info!("Skipping {} stage after earlier errors", stage.name());
                break;
            }

            on_stage(stage.name());
            log::debug!("Running {} stage", stage.name());
            state = stage.process(state);
        }

        if state.has_errors() {
            log::warn!("Run finished with {} error(s)", state.errors.len());
        } else {
            log::info!("Run finished");
        }
        state
    }
}
