use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use commitsmith::commit::message::validate;
use commitsmith::config::{Backend, Config, Settings};
use commitsmith::error::LlmError;
use commitsmith::git::StaticDiff;
use commitsmith::llm::{LlmClient, PromptPair, Sampling};
use commitsmith::pipeline::Pipeline;
use commitsmith::state::RunState;

/// Replays replies in order and remembers what it was sent.
struct Replay {
    replies: Mutex<VecDeque<Result<String, ()>>>,
    seen: Mutex<Vec<(PromptPair, Sampling)>>,
}

impl Replay {
    fn new(replies: Vec<Result<&str, ()>>) -> Arc<Self> {
        Arc::new(Replay {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl LlmClient for Replay {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn complete(&self, prompt: &PromptPair, sampling: &Sampling) -> Result<String, LlmError> {
        self.seen.lock().unwrap().push((prompt.clone(), *sampling));
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(reply)) => Ok(reply),
            _ => Err(LlmError::Empty { backend: "replay" }),
        }
    }
}

fn scenario() -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/two_features.diff");
    fs::read_to_string(path).unwrap()
}

fn config(layer: Settings) -> Config {
    Config::resolve(layer, Settings::default(), Settings::default()).unwrap()
}

fn offline() -> Config {
    config(Settings {
        backend: Some(Backend::None),
        ..Settings::default()
    })
}

fn run(cfg: &Config, llm: Arc<dyn LlmClient>, diff: &str) -> RunState {
    Pipeline::from_config(cfg, llm, Box::new(StaticDiff(diff.to_string()))).run(RunState::new())
}

#[test]
fn offline_scenario_end_to_end() {
    let state = run(&offline(), Replay::new(vec![]), &scenario());

    assert!(state.errors.is_empty(), "{:?}", state.errors);
    assert_eq!(
        state.bullet_points.unwrap(),
        vec![
            "• Added new file `utils.py` (+12 lines)".to_string(),
            "• Added function `foo()` in `main.py`".to_string(),
        ]
    );
    assert_eq!(state.summary.as_deref(), Some("This commit implemented 2 new features."));
    assert_eq!(state.commit_message.as_deref(), Some("feat: implemented 2 new features"));
}

#[test]
fn empty_diff_halts_before_summary() {
    let llm = Replay::new(vec![Ok("never used")]);
    let state = run(&offline(), llm.clone(), "");

    assert_eq!(state.errors.len(), 1);
    assert_eq!(state.errors[0].message, "No staged changes found");
    assert!(state.summary.is_none());
    assert!(state.commit_message.is_none());
    assert!(llm.seen.lock().unwrap().is_empty());
}

#[test]
fn model_replies_flow_through_each_stage() {
    let llm = Replay::new(vec![
        Ok("Added a utils module with config and env helpers, and a foo entry point."),
        Ok("feat(utils): add config and env helpers\n\nAlso adds foo() to main."),
    ]);
    let cfg = config(Settings {
        top_p: Some(0.7),
        ..Settings::default()
    });
    let state = run(&cfg, llm.clone(), &scenario());

    assert_eq!(
        state.commit_message.as_deref(),
        Some("feat(utils): add config and env helpers\n\nAlso adds foo() to main.")
    );

    let seen = llm.seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert!(seen.iter().all(|(_, sampling)| sampling.top_p == 0.7));
    // summary request, then commit request
    assert_eq!(seen[0].1.max_tokens, 256);
    assert_eq!(seen[1].1.max_tokens, 300);
    assert!(seen[1].0.user.contains("Added a utils module"));
}

#[test]
fn malformed_draft_is_repaired() {
    let llm = Replay::new(vec![
        Ok("Fixed a crash when the config file is missing."),
        Ok("Fix: Handle missing config file"),
    ]);
    let state = run(&config(Settings::default()), llm, &scenario());

    let message = state.commit_message.unwrap();
    assert!(validate(&message).is_ok());
    assert_eq!(message, "fix: handle missing config file");
    assert_eq!(state.metadata["commit_source"], "repaired");
}

#[test]
fn llm_bullets_replace_rule_bullets() {
    let llm = Replay::new(vec![
        Ok("• Introduced utils helpers\n• Added foo entry point"),
        Err(()),
        Err(()),
    ]);
    let cfg = config(Settings {
        llm_bullets: Some(true),
        ..Settings::default()
    });
    let state = run(&cfg, llm.clone(), &scenario());

    assert_eq!(
        state.bullet_points.unwrap(),
        vec![
            "• Introduced utils helpers".to_string(),
            "• Added foo entry point".to_string(),
        ]
    );
    assert!(validate(state.commit_message.as_deref().unwrap()).is_ok());
    assert_eq!(llm.seen.lock().unwrap()[0].1.max_tokens, 512);
}

#[test]
fn huge_diff_keeps_forty_priority_and_ten_other_bullets() {
    let mut diff = String::new();
    let paths = (0..60)
        .map(|i| format!("src/mod{i}.rs"))
        .chain((0..20).map(|i| format!("tests/case{i}.rs")));
    for path in paths {
        diff.push_str(&format!(
            "diff --git a/{path} b/{path}\nnew file mode 100644\n+fn f() {{}}\n"
        ));
    }

    let state = run(&offline(), Replay::new(vec![]), &diff);
    assert_eq!(state.metadata["original_bullet_count"], 80);
    assert_eq!(state.metadata["filtered_bullet_count"], 50);
    assert!(validate(state.commit_message.as_deref().unwrap()).is_ok());
}
