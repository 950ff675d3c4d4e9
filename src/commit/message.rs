use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::FormatError;

static RE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(feat|fix|docs|style|refactor|perf|test|build|ci|chore|revert)(\(([a-z-]+)\))?: (.+)",
    )
    .expect("invalid RE_HEADER regex")
});

/// Conventional commit types. Declaration order breaks ties when inferring a
/// type from keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommitType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
}

impl CommitType {
    pub const ALL: [CommitType; 11] = [
        CommitType::Feat,
        CommitType::Fix,
        CommitType::Docs,
        CommitType::Style,
        CommitType::Refactor,
        CommitType::Perf,
        CommitType::Test,
        CommitType::Build,
        CommitType::Ci,
        CommitType::Chore,
        CommitType::Revert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommitType::Feat => "feat",
            CommitType::Fix => "fix",
            CommitType::Docs => "docs",
            CommitType::Style => "style",
            CommitType::Refactor => "refactor",
            CommitType::Perf => "perf",
            CommitType::Test => "test",
            CommitType::Build => "build",
            CommitType::Ci => "ci",
            CommitType::Chore => "chore",
            CommitType::Revert => "revert",
        }
    }

    /// Words in a summary that hint at this type.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            CommitType::Feat => &["add", "new", "implement", "create", "feature"],
            CommitType::Fix => &["fix", "bug", "issue", "error", "resolve"],
            CommitType::Docs => &["document", "readme", "comment", "docs"],
            CommitType::Style => &["format", "style", "whitespace"],
            CommitType::Refactor => &["refactor", "restructure", "reorganize", "rename"],
            CommitType::Perf => &["performance", "optimize", "faster", "speed"],
            CommitType::Test => &["test", "spec", "coverage"],
            CommitType::Build => &["build", "dependency", "package", "npm", "pip"],
            CommitType::Ci => &["ci", "pipeline", "github actions", "travis"],
            CommitType::Chore => &["chore", "update", "maintain"],
            CommitType::Revert => &["revert"],
        }
    }
}

impl fmt::Display for CommitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommitType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommitType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown commit type {s:?}"))
    }
}

/// A commit message in `type(scope): description` form with optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub commit_type: CommitType,
    pub scope: Option<String>,
    pub description: String,
    pub body: Option<String>,
}

impl CommitMessage {
    pub fn new(commit_type: CommitType, description: impl Into<String>) -> Self {
        CommitMessage {
            commit_type,
            scope: None,
            description: description.into(),
            body: None,
        }
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body.filter(|b| !b.trim().is_empty());
        self
    }

    /// Parse a message whose first line follows the header grammar.
    ///
    /// Everything after the first line (minus surrounding blank lines) is the
    /// body.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut lines = text.lines();
        let header = lines.next().map(str::trim_end).unwrap_or("");
        if header.trim().is_empty() {
            return Err(FormatError::Empty);
        }

        let caps = RE_HEADER
            .captures(header)
            .ok_or_else(|| FormatError::Header(header.to_string()))?;

        let commit_type = caps[1]
            .parse()
            .map_err(|_| FormatError::Header(header.to_string()))?;
        let scope = caps.get(3).map(|m| m.as_str().to_string());
        let description = caps[4].to_string();

        let body = lines.collect::<Vec<_>>().join("\n");

        Ok(CommitMessage {
            commit_type,
            scope,
            description,
            body: None,
        }
        .with_body(Some(body.trim().to_string())))
    }

    /// First line of the serialized message.
    pub fn header(&self) -> String {
        match &self.scope {
            Some(scope) => format!("{}({scope}): {}", self.commit_type, self.description),
            None => format!("{}: {}", self.commit_type, self.description),
        }
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())?;
        if let Some(body) = &self.body {
            write!(f, "\n\n{body}")?;
        }
        Ok(())
    }
}

/// Check that the first line of `text` follows the header grammar.
pub fn validate(text: &str) -> Result<(), FormatError> {
    CommitMessage::parse(text).map(|_| ())
}
