use crate::commit::CommitStyle;
use crate::grouping::GroupedBullets;
use crate::llm::prompts;

/// Characters of raw diff handed to the model when it writes the bullets.
pub const BULLET_DIFF_CHARS: usize = 4000;

/// Bullets passed along as context for the commit message.
pub const COMMIT_CONTEXT_BULLETS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

pub fn bullet_extraction_prompt(diff: &str) -> PromptPair {
    let head: String = diff.chars().take(BULLET_DIFF_CHARS).collect();

    let user = format!("Git diff:\n```diff\n{head}\n```\n\nBullet points:");

    PromptPair {
        system: prompts::BULLET_EXTRACTION.to_owned(),
        user,
    }
}

pub fn summary_prompt(groups: &GroupedBullets, max_chars: usize) -> PromptPair {
    let mut system = prompts::SUMMARY.to_owned();
    system.push_str(&format!(
        "\nKeep the summary under {max_chars} characters."
    ));

    let user = format!(
        "Changes by category:\n\n{sections}\n\n\
         Write a 2-3 sentence summary that captures the essence of these changes:",
        sections = render_groups(groups)
    );

    PromptPair { system, user }
}

pub fn commit_prompt(style: CommitStyle, summary: &str, bullets: &[String]) -> PromptPair {
    let system = match style {
        CommitStyle::Conventional => prompts::COMMIT_CONVENTIONAL,
        CommitStyle::Angular => prompts::COMMIT_ANGULAR,
        CommitStyle::Gitmoji => prompts::COMMIT_GITMOJI,
    }
    .to_owned();

    let mut user = format!("Summary: {summary}");
    if !bullets.is_empty() {
        user.push_str("\n\nDetailed changes:\n");
        let context: Vec<&str> = bullets
            .iter()
            .take(COMMIT_CONTEXT_BULLETS)
            .map(String::as_str)
            .collect();
        user.push_str(&context.join("\n"));
    }
    user.push_str("\n\nCommit message:");

    PromptPair { system, user }
}

/// Render groups as labelled sections, in category order.
fn render_groups(groups: &GroupedBullets) -> String {
    groups
        .iter()
        .map(|(category, bullets)| format!("{}:\n{}", category.label(), bullets.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_bullets;

    #[test]
    fn bullet_prompt_caps_the_diff() {
        let diff = "x".repeat(BULLET_DIFF_CHARS + 500);
        let prompt = bullet_extraction_prompt(&diff);
        let xs = prompt.user.chars().filter(|c| *c == 'x').count();
        assert_eq!(xs, BULLET_DIFF_CHARS);
    }

    #[test]
    fn summary_prompt_has_budget_and_sections() {
        let groups = group_bullets(&[
            "• Added new file `a.rs` (+3 lines)".to_string(),
            "• Fixed crash in parser".to_string(),
        ]);
        let prompt = summary_prompt(&groups, 500);

        assert!(prompt.system.contains("under 500 characters"));
        let features = prompt.user.find("New Features:").unwrap();
        let fixes = prompt.user.find("Bug Fixes:").unwrap();
        assert!(features < fixes);
    }

    #[test]
    fn commit_prompt_limits_context_bullets() {
        let bullets: Vec<String> = (0..15).map(|i| format!("• change {i}")).collect();
        let prompt = commit_prompt(CommitStyle::Conventional, "Did things.", &bullets);

        assert!(prompt.user.starts_with("Summary: Did things."));
        assert!(prompt.user.contains("• change 9"));
        assert!(!prompt.user.contains("• change 10"));
    }

    #[test]
    fn style_selects_template() {
        let angular = commit_prompt(CommitStyle::Angular, "s", &[]);
        let gitmoji = commit_prompt(CommitStyle::Gitmoji, "s", &[]);
        assert!(angular.system.contains("Angular"));
        assert!(gitmoji.system.contains("gitmoji"));
        assert!(!angular.user.contains("Detailed changes"));
    }
}
