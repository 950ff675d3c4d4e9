pub mod message;
pub mod writer;

use serde::Deserialize;
use std::fmt;

pub use message::{CommitMessage, CommitType};
pub use writer::{CommitSource, write_commit_message};

/// Prompt template used when asking the model for a commit message.
///
/// Only the prompt changes between styles; validation and repair always
/// follow the conventional grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CommitStyle {
    #[default]
    Conventional,
    Angular,
    Gitmoji,
}

impl CommitStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitStyle::Conventional => "conventional",
            CommitStyle::Angular => "angular",
            CommitStyle::Gitmoji => "gitmoji",
        }
    }
}

impl fmt::Display for CommitStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
