//! Turning file records into human-readable bullet points.

use crate::diff::{ChangeKind, FileChange};
use crate::error::LlmError;
use crate::extract::extract_fragments;
use crate::llm::prompt_builder::bullet_extraction_prompt;
use crate::llm::{LlmClient, Sampling};

pub const BULLET_GLYPH: &str = "•";

/// Sampling for the model-written bullet path.
pub const BULLET_SAMPLING: Sampling = Sampling {
    max_tokens: 512,
    temperature: 0.3,
    top_p: 0.9,
};

/// Bullets for one file record. Always at least one, never empty.
pub fn format_bullets(file: &FileChange, fragments: &[String]) -> Vec<String> {
    let path = &file.new_path;

    match file.kind {
        ChangeKind::Added => vec![format!(
            "{BULLET_GLYPH} Added new file `{path}` (+{} lines)",
            file.additions
        )],
        ChangeKind::Deleted => vec![format!(
            "{BULLET_GLYPH} Deleted file `{path}` (-{} lines)",
            file.deletions
        )],
        ChangeKind::Renamed => vec![format!(
            "{BULLET_GLYPH} Renamed `{}` to `{path}`",
            file.old_path
        )],
        ChangeKind::Modified if !fragments.is_empty() => fragments
            .iter()
            .map(|fragment| format!("{BULLET_GLYPH} {fragment} in `{path}`"))
            .collect(),
        ChangeKind::Modified => vec![format!(
            "{BULLET_GLYPH} Modified `{path}` (+{} -{} lines)",
            file.additions, file.deletions
        )],
    }
}

/// Rule-based bullets for every file record, in diff order.
pub fn rule_based_bullets(files: &[FileChange]) -> Vec<String> {
    files
        .iter()
        .flat_map(|file| {
            let fragments = match file.kind {
                ChangeKind::Modified => extract_fragments(file),
                _ => Vec::new(),
            };
            format_bullets(file, &fragments)
        })
        .collect()
}

/// Keep the bullet-looking lines of a model reply, normalized to `• text`.
pub fn parse_bullet_lines(response: &str) -> Vec<String> {
    response
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            if line.starts_with(BULLET_GLYPH) {
                Some(line.to_string())
            } else if line.starts_with('-') || line.starts_with('*') {
                let text = line.trim_start_matches(['-', '*']).trim();
                Some(format!("{BULLET_GLYPH} {text}"))
            } else {
                None
            }
        })
        .collect()
}

/// Ask the model to write bullets from the raw diff.
///
/// `Ok(None)` when the reply contains no bullet lines; callers fall back to
/// [`rule_based_bullets`] in that case and on error.
pub fn llm_bullets(
    diff: &str,
    llm: &dyn LlmClient,
    top_p: f32,
) -> Result<Option<Vec<String>>, LlmError> {
    let prompt = bullet_extraction_prompt(diff);
    let sampling = Sampling {
        top_p,
        ..BULLET_SAMPLING
    };

    let reply = llm.complete(&prompt, &sampling)?;
    let bullets = parse_bullet_lines(&reply);

    Ok(if bullets.is_empty() { None } else { Some(bullets) })
}
