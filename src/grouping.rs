//! Filtering, capping and categorizing bullet points before summarization.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

/// Most bullets handed to the summarizer.
pub const MAX_BULLETS: usize = 50;
/// Share of [`MAX_BULLETS`] reserved for bullets without a deprioritized keyword.
pub const PRIORITY_SLOTS: usize = 40;
/// Share of [`MAX_BULLETS`] left for test/docs/config bullets.
pub const NON_PRIORITY_SLOTS: usize = 10;

/// Bullets at or under this many characters (trimmed) carry no information.
const MIN_BULLET_CHARS: usize = 5;

static NOISE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"whitespace",
        r"formatting",
        r"typo",
        r"comment.*updated",
        r"indentation",
        r"\.history/",
    ]
    .into_iter()
    .map(|p| Regex::new(p).expect("invalid noise pattern"))
    .collect()
});

const DEPRIORITIZED: &[&str] = &["test", ".md", ".txt", ".json", ".yml", "config"];

/// Semantic bucket for a bullet. Declaration order is the matching order and
/// the iteration order of [`GroupedBullets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Features,
    Fixes,
    Refactoring,
    Dependencies,
    Configuration,
    Documentation,
    Tests,
    Other,
}

impl Category {
    /// Categories with keyword rules, in priority order. [`Category::Other`]
    /// catches everything else.
    const RULES: [(Category, &'static [&'static str]); 7] = [
        (Category::Features, &["add", "new", "implement", "create"]),
        (Category::Fixes, &["fix", "bug", "issue", "error"]),
        (Category::Refactoring, &["refactor", "restructure", "reorganize", "rename"]),
        (Category::Dependencies, &["dependency", "package", "requirement", "version"]),
        (Category::Configuration, &["config", "setting", ".env", "yml", "json"]),
        (Category::Documentation, &["doc", "readme", "comment"]),
        (Category::Tests, &["test", "spec", "mock"]),
    ];

    /// Pick the category for one bullet: first rule with a keyword contained
    /// in the lowercased text wins.
    pub fn classify(bullet: &str) -> Category {
        let lower = bullet.to_lowercase();
        Self::RULES
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| lower.contains(kw)))
            .map_or(Category::Other, |(category, _)| *category)
    }

    /// Section heading used when rendering groups for the model.
    pub fn label(self) -> &'static str {
        match self {
            Category::Features => "New Features",
            Category::Fixes => "Bug Fixes",
            Category::Refactoring => "Refactoring",
            Category::Dependencies => "Dependencies",
            Category::Configuration => "Configuration",
            Category::Documentation => "Documentation",
            Category::Tests => "Tests",
            Category::Other => "Other Changes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Non-empty categories and their bullets, iterated in [`Category`] order.
pub type GroupedBullets = BTreeMap<Category, Vec<String>>;

fn is_noise(bullet: &str) -> bool {
    let lower = bullet.to_lowercase();
    NOISE_PATTERNS.iter().any(|re| re.is_match(&lower))
        || bullet.trim().chars().count() <= MIN_BULLET_CHARS
}

fn is_deprioritized(bullet: &str) -> bool {
    let lower = bullet.to_lowercase();
    DEPRIORITIZED.iter().any(|kw| lower.contains(kw))
}

/// Drop whitespace/formatting/typo noise and near-empty bullets.
pub fn filter_bullets(bullets: &[String]) -> Vec<String> {
    bullets.iter().filter(|b| !is_noise(b)).cloned().collect()
}

/// Bound the list at [`MAX_BULLETS`].
///
/// Over the limit, keep the first [`PRIORITY_SLOTS`] bullets free of
/// test/docs/config keywords and the first [`NON_PRIORITY_SLOTS`] with one,
/// each in original order. Everything else is dropped.
pub fn cap_bullets(bullets: Vec<String>) -> Vec<String> {
    if bullets.len() <= MAX_BULLETS {
        return bullets;
    }

    let total = bullets.len();
    let (non_priority, priority): (Vec<String>, Vec<String>) =
        bullets.into_iter().partition(|b| is_deprioritized(b));

    let mut capped: Vec<String> = priority.into_iter().take(PRIORITY_SLOTS).collect();
    capped.extend(non_priority.into_iter().take(NON_PRIORITY_SLOTS));

    log::info!(
        "Limiting {total} bullets to {} to keep the prompt small",
        capped.len()
    );

    capped
}

/// Bucket bullets by [`Category::classify`]; empty categories are left out.
pub fn group_bullets(bullets: &[String]) -> GroupedBullets {
    let mut groups = GroupedBullets::new();
    for bullet in bullets {
        groups
            .entry(Category::classify(bullet))
            .or_default()
            .push(bullet.clone());
    }
    groups
}

/// Filter, cap, then group. Returns the surviving bullets alongside the groups.
pub fn prepare(bullets: &[String]) -> (Vec<String>, GroupedBullets) {
    let kept = cap_bullets(filter_bullets(bullets));
    let groups = group_bullets(&kept);
    (kept, groups)
}
