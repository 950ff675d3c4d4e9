use clap::{ArgAction, ArgGroup, Parser};
use std::path::PathBuf;

use crate::commit::CommitStyle;
use crate::config::Backend;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "commitsmith",
    version,
    about = "Turns staged Git changes into a conventional commit message"
)]
#[command(group(
    ArgGroup::new("model_group")
        .args(["model", "no_model"])
        .multiple(false)
))]
pub struct Cli {
    /// Repository to read staged changes from (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,

    /// Read the diff from a file instead of `git diff --cached` ('-' for stdin)
    #[arg(long, value_name = "PATH")]
    pub diff_file: Option<PathBuf>,

    /// Generate and print the message but never commit
    #[arg(long)]
    pub dry_run: bool,

    /// Commit without asking for confirmation
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Write the generated message into .git/COMMIT_EDITMSG (no commit is created)
    #[arg(long)]
    pub apply: bool,

    /// Also write the commit message to this file
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Save the full run state as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub save_state: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Completion backend
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// Model name to use (e.g. openchat:7b). If 'none', acts like --no-model.
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the completion service
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// API key (otherwise uses OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Commit message style the model is asked for
    #[arg(long, value_enum)]
    pub style: Option<CommitStyle>,

    /// Nucleus sampling parameter passed to the model
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Seconds to wait for each model response
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Ask the model for bullet points instead of the rule-based extractor
    #[arg(long)]
    pub llm_bullets: bool,

    /// Character budget for the summary
    #[arg(long, value_name = "CHARS")]
    pub max_summary_length: Option<usize>,

    /// Disable model calls; every stage uses its deterministic fallback
    #[arg(long)]
    pub no_model: bool,
}
