//! Draft, clean, validate and repair a commit message.

use crate::error::StageError;
use crate::llm::prompt_builder::commit_prompt;
use crate::llm::{LlmClient, Sampling};

use super::message::{CommitMessage, CommitType};
use super::CommitStyle;

/// Sampling for the commit-message request.
pub const COMMIT_SAMPLING: Sampling = Sampling {
    max_tokens: 300,
    temperature: 0.4,
    top_p: 0.9,
};

/// Characters of summary used for the fallback draft's description.
const FALLBACK_DESCRIPTION_CHARS: usize = 72;
/// Characters of summary used when a repaired draft has no description left.
const REPAIR_DESCRIPTION_CHARS: usize = 50;

const FENCE: &str = "```";
const LABEL: &str = "commit message:";

/// How the final message was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitSource {
    /// The model's draft passed validation.
    Model,
    /// The model's draft failed validation and was repaired.
    Repaired,
    /// The model call failed; the message was built from the summary alone.
    Fallback,
}

impl CommitSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitSource::Model => "model",
            CommitSource::Repaired => "repaired",
            CommitSource::Fallback => "fallback",
        }
    }
}

/// Strip code fences, a leading `Commit message:` label and wrapping quotes;
/// normalize line endings and trailing whitespace.
pub fn clean_draft(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = text
        .lines()
        .filter(|line| !line.trim_start().starts_with(FENCE))
        .collect::<Vec<_>>()
        .join("\n")
        .replace(FENCE, "");

    let mut text = text.trim();
    if text
        .get(..LABEL.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(LABEL))
    {
        text = text[LABEL.len()..].trim();
    }
    let text = text.trim_matches(['"', '\'']);

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Score every type by keyword hits in the lowercased summary.
///
/// The highest score wins; ties go to the type declared first. No hits at
/// all means `chore`.
pub fn infer_commit_type(summary: &str) -> CommitType {
    let lower = summary.to_lowercase();

    let mut best = CommitType::Chore;
    let mut best_score = 0;
    for commit_type in CommitType::ALL {
        let score = commit_type
            .keywords()
            .iter()
            .filter(|kw| lower.contains(*kw))
            .count();
        if score > best_score {
            best = commit_type;
            best_score = score;
        }
    }
    best
}

/// Lowercase and collapse whitespace of the first `max_chars` characters.
fn summary_head(summary: &str, max_chars: usize) -> String {
    let head: String = summary.chars().take(max_chars).collect();
    let head = head.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ");
    if head.is_empty() {
        "update codebase".to_string()
    } else {
        head
    }
}

/// Drop a type name the model put at the start of its line, plus any
/// `(scope)`, `!` and `:` that follow it. Only whole tokens count, so
/// `fixed the parser` keeps its `fix`.
fn strip_type_token(line: &str) -> &str {
    for commit_type in CommitType::ALL {
        let name = commit_type.as_str();
        let Some(head) = line.get(..name.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(name) {
            continue;
        }

        let rest = &line[name.len()..];
        if rest.chars().next().is_some_and(char::is_alphanumeric) {
            continue;
        }

        let mut rest = rest.trim_start();
        if rest.starts_with('(') {
            if let Some(close) = rest.find(')') {
                rest = &rest[close + 1..];
            }
        }
        return rest.trim_start_matches(|c: char| c == '!' || c == ':' || c.is_whitespace());
    }
    line
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Rebuild a draft that failed validation.
///
/// The type comes from the summary; the description from the draft's first
/// line with any duplicated type token removed. The draft's remaining lines
/// are kept as the body.
pub fn repair(draft: &str, summary: &str) -> CommitMessage {
    let commit_type = infer_commit_type(summary);

    let mut lines = draft.lines();
    let first = lines.next().unwrap_or("").trim();

    let description = lowercase_first(strip_type_token(first).trim());
    let description = description.trim_end_matches('.').trim_end();
    let description = if description.is_empty() {
        summary_head(summary, REPAIR_DESCRIPTION_CHARS)
    } else {
        description.to_string()
    };

    let body = lines.collect::<Vec<_>>().join("\n");
    CommitMessage::new(commit_type, description).with_body(Some(body.trim().to_string()))
}

/// Build a message from the summary alone, for when the model is unreachable.
///
/// The description is the summary's first sentence (within 72 characters),
/// lowercased, without the `this commit` opener the fallback summary uses.
pub fn fallback_draft(summary: &str) -> CommitMessage {
    let commit_type = infer_commit_type(summary);

    let head: String = summary
        .chars()
        .take(FALLBACK_DESCRIPTION_CHARS)
        .collect::<String>()
        .to_lowercase();
    let sentence = head.split('.').next().unwrap_or("");
    let sentence = sentence.split_whitespace().collect::<Vec<_>>().join(" ");
    let sentence = sentence.strip_prefix("this commit ").unwrap_or(&sentence);
    let description = sentence.trim().trim_end_matches('.');

    let description = if description.is_empty() {
        summary_head(summary, REPAIR_DESCRIPTION_CHARS)
    } else {
        description.to_string()
    };

    CommitMessage::new(commit_type, description)
}

/// Produce a commit message for `summary`.
///
/// A failed model call falls back to [`fallback_draft`]; a malformed reply is
/// [`repair`]ed. Only a blank summary is an error.
pub fn write_commit_message(
    summary: &str,
    bullets: &[String],
    style: CommitStyle,
    llm: &dyn LlmClient,
    top_p: f32,
) -> Result<(CommitMessage, CommitSource), StageError> {
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(StageError::MissingInput("summary"));
    }

    let prompt = commit_prompt(style, summary, bullets);
    let sampling = Sampling {
        top_p,
        ..COMMIT_SAMPLING
    };

    let raw = match llm.complete(&prompt, &sampling) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Commit generation via {} failed: {e}; using fallback", llm.name());
            return Ok((fallback_draft(summary), CommitSource::Fallback));
        }
    };

    let draft = clean_draft(&raw);
    match CommitMessage::parse(&draft) {
        Ok(message) => Ok((message, CommitSource::Model)),
        Err(e) => {
            log::warn!("Drafted commit message is malformed ({e}), repairing");
            Ok((repair(&draft, summary), CommitSource::Repaired))
        }
    }
}
