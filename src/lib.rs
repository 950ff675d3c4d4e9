//! Staged Git changes in, conventional commit message out.
//!
//! A run passes one [`state::RunState`] through three stages: the diff stage
//! turns `git diff --cached` into bullet points, the summary stage condenses
//! them into a sentence or two, and the commit stage drafts the message. Each
//! model-backed step has a deterministic fallback, so a run with no model at
//! all still produces a valid message.

pub mod bullets;
pub mod cli_args;
pub mod commit;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod git;
pub mod grouping;
pub mod llm;
pub mod logging;
pub mod pipeline;
pub mod setup;
pub mod state;
pub mod summary;
