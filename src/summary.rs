//! Turning grouped bullets into a short prose summary.

use crate::grouping::{Category, GroupedBullets};
use crate::llm::prompt_builder::summary_prompt;
use crate::llm::{LlmClient, Sampling};

/// Default character budget for a summary.
pub const DEFAULT_MAX_SUMMARY_CHARS: usize = 500;

/// Model summaries shorter than this are treated as unusable.
const MIN_SUMMARY_CHARS: usize = 20;

/// Sampling for the summary request.
pub const SUMMARY_SAMPLING: Sampling = Sampling {
    max_tokens: 256,
    temperature: 0.5,
    top_p: 0.9,
};

const EMPTY_SUMMARY: &str = "Updated codebase with various improvements.";

/// Where a summary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummarySource {
    Model,
    Fallback,
}

impl SummarySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummarySource::Model => "model",
            SummarySource::Fallback => "fallback",
        }
    }
}

/// Order the fallback mentions categories in. Differs from the grouping order.
const FALLBACK_ORDER: [Category; 7] = [
    Category::Features,
    Category::Fixes,
    Category::Refactoring,
    Category::Configuration,
    Category::Dependencies,
    Category::Tests,
    Category::Documentation,
];

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

fn clause(category: Category, count: usize) -> Option<String> {
    let text = match category {
        Category::Features => format!("implemented {}", plural(count, "new feature")),
        Category::Fixes => format!("fixed {}", plural(count, "bug")),
        Category::Refactoring => "refactored code structure".to_string(),
        Category::Configuration => "updated configuration".to_string(),
        Category::Dependencies => "updated dependencies".to_string(),
        Category::Tests => "added tests".to_string(),
        Category::Documentation => "updated documentation".to_string(),
        Category::Other => return None,
    };
    Some(text)
}

/// Deterministic summary built only from category counts.
pub fn fallback_summary(groups: &GroupedBullets) -> String {
    let parts: Vec<String> = FALLBACK_ORDER
        .iter()
        .filter_map(|category| {
            groups
                .get(category)
                .filter(|bullets| !bullets.is_empty())
                .and_then(|bullets| clause(*category, bullets.len()))
        })
        .collect();

    match parts.as_slice() {
        [] => EMPTY_SUMMARY.to_string(),
        [only] => format!("This commit {only}."),
        [first, second] => format!("This commit {first} and {second}."),
        [init @ .., last] => format!("This commit {}, and {last}.", init.join(", ")),
    }
}

/// Trim a model summary and bring it under `max_chars`.
///
/// Over-long text is cut at the budget, then back to its last period; a
/// period is always appended after cutting.
pub fn clamp_summary(raw: &str, max_chars: usize) -> String {
    let summary = raw.trim();
    if summary.chars().count() <= max_chars {
        return summary.to_string();
    }

    let head: String = summary.chars().take(max_chars).collect();
    let sentence = match head.rfind('.') {
        Some(idx) => &head[..idx],
        None => head.as_str(),
    };
    format!("{sentence}.")
}

/// Summarize the groups, asking the model first and falling back to
/// [`fallback_summary`] when the call fails or the reply is too short.
pub fn compose_summary(
    groups: &GroupedBullets,
    llm: &dyn LlmClient,
    max_chars: usize,
    top_p: f32,
) -> (String, SummarySource) {
    let prompt = summary_prompt(groups, max_chars);
    let sampling = Sampling {
        top_p,
        ..SUMMARY_SAMPLING
    };

    match llm.complete(&prompt, &sampling) {
        Ok(reply) => {
            let summary = clamp_summary(&reply, max_chars);
            if summary.chars().count() >= MIN_SUMMARY_CHARS {
                return (summary, SummarySource::Model);
            }
            log::warn!("Model summary too short ({summary:?}), using fallback");
        }
        Err(e) => {
            log::warn!("Summary generation via {} failed: {e}; using fallback", llm.name());
        }
    }

    (fallback_summary(groups), SummarySource::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_bullets;
    use crate::llm::testing::ScriptedClient;

    fn groups(items: &[(Category, usize)]) -> GroupedBullets {
        items
            .iter()
            .map(|(category, n)| (*category, (0..*n).map(|i| format!("• item {i}")).collect()))
            .collect()
    }

    #[test]
    fn no_clauses_gives_placeholder() {
        assert_eq!(fallback_summary(&GroupedBullets::new()), EMPTY_SUMMARY);
        assert_eq!(fallback_summary(&groups(&[(Category::Other, 3)])), EMPTY_SUMMARY);
    }

    #[test]
    fn single_clause_with_counts() {
        assert_eq!(
            fallback_summary(&groups(&[(Category::Features, 2)])),
            "This commit implemented 2 new features."
        );
        assert_eq!(
            fallback_summary(&groups(&[(Category::Fixes, 1)])),
            "This commit fixed 1 bug."
        );
        assert_eq!(
            fallback_summary(&groups(&[(Category::Features, 1)])),
            "This commit implemented 1 new feature."
        );
    }

    #[test]
    fn two_clauses_join_with_and() {
        assert_eq!(
            fallback_summary(&groups(&[(Category::Fixes, 3), (Category::Tests, 1)])),
            "This commit fixed 3 bugs and added tests."
        );
    }

    #[test]
    fn many_clauses_use_oxford_comma_in_fallback_order() {
        let g = groups(&[
            (Category::Documentation, 1),
            (Category::Dependencies, 2),
            (Category::Configuration, 1),
            (Category::Refactoring, 4),
            (Category::Features, 1),
        ]);
        assert_eq!(
            fallback_summary(&g),
            "This commit implemented 1 new feature, refactored code structure, \
             updated configuration, updated dependencies, and updated documentation."
        );
    }

    #[test]
    fn fallback_is_stable() {
        let g = group_bullets(&[
            "• Added new file `a.rs` (+3 lines)".to_string(),
            "• Fixed crash".to_string(),
        ]);
        assert_eq!(fallback_summary(&g), fallback_summary(&g.clone()));
    }

    #[test]
    fn clamp_cuts_at_last_period() {
        let text = "First sentence here. Second sentence is much longer than the budget";
        assert_eq!(clamp_summary(text, 30), "First sentence here.");
    }

    #[test]
    fn clamp_without_period_appends_one() {
        assert_eq!(clamp_summary("abcdefghij", 4), "abcd.");
        assert_eq!(clamp_summary("  short  ", 100), "short");
    }

    #[test]
    fn model_summary_is_used_when_long_enough() {
        let llm = ScriptedClient::new([Some("  Added a parser and fixed the lexer.  ")]);
        let (summary, source) = compose_summary(&groups(&[(Category::Features, 1)]), &llm, 500, 0.9);
        assert_eq!(summary, "Added a parser and fixed the lexer.");
        assert_eq!(source, SummarySource::Model);
    }

    #[test]
    fn short_model_summary_falls_back() {
        let llm = ScriptedClient::new([Some("ok.")]);
        let (summary, source) = compose_summary(&groups(&[(Category::Features, 2)]), &llm, 500, 0.9);
        assert_eq!(summary, "This commit implemented 2 new features.");
        assert_eq!(source, SummarySource::Fallback);
    }

    #[test]
    fn failed_call_falls_back() {
        let llm = ScriptedClient::new([None::<&str>]);
        let (summary, source) = compose_summary(&groups(&[(Category::Tests, 2)]), &llm, 500, 0.9);
        assert_eq!(summary, "This commit added tests.");
        assert_eq!(source, SummarySource::Fallback);
    }
}
