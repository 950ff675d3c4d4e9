//! Error types shared by the pipeline stages.

use thiserror::Error;

/// Failures talking to a text-completion backend.
///
/// These never end a run on their own: the stage that issued the call falls
/// back to its deterministic path.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("model calls are disabled")]
    Disabled,

    #[error("failed to reach {backend} at {url}: {source}")]
    Transport {
        backend: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{backend} returned HTTP {status}: {body}")]
    Status {
        backend: &'static str,
        status: u16,
        body: String,
    },

    #[error("failed to decode {backend} response: {message}")]
    Decode {
        backend: &'static str,
        message: String,
    },

    #[error("{backend} returned no completion")]
    Empty { backend: &'static str },
}

/// Conditions that stop a run. Recorded on the [`RunState`](crate::state::RunState)
/// by the stage that detected them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StageError {
    #[error("No staged changes found")]
    NoStagedChanges,

    #[error("failed to read staged changes: {0}")]
    Source(String),

    #[error("missing {0}; the previous stage produced nothing to work with")]
    MissingInput(&'static str),
}

/// A drafted commit message whose first line does not follow the
/// `type(scope): description` grammar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("commit message is empty")]
    Empty,

    #[error("first line {0:?} is not `type(scope): description`")]
    Header(String),
}
