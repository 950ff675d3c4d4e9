use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// An error recorded by a stage, tagged with the stage's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedError {
    pub stage: String,
    pub message: String,
}

impl fmt::Display for RecordedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.stage, self.message)
    }
}

/// Everything one pipeline run has produced so far.
///
/// Each stage fills in its own output field and may append errors. Nothing is
/// ever rolled back; once an error is recorded the run is over and later
/// stages leave the state untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub staged_diff: Option<String>,
    pub bullet_points: Option<Vec<String>>,
    pub summary: Option<String>,
    pub commit_message: Option<String>,
    #[serde(default)]
    pub errors: Vec<RecordedError>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(
            "created_at".to_string(),
            Value::String(chrono::Local::now().to_rfc3339()),
        );

        RunState {
            staged_diff: None,
            bullet_points: None,
            summary: None,
            commit_message: None,
            errors: Vec::new(),
            metadata,
        }
    }

    pub fn add_error(&mut self, stage: &str, error: impl fmt::Display) {
        let message = error.to_string();
        log::error!("[{stage}] {message}");

        self.errors.push(RecordedError {
            stage: stage.to_string(),
            message,
        });
        self.set_meta("error_count", self.errors.len());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn set_meta(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn meta(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Bullets usable by the summary stage: present, non-empty, and with no
    /// blank entries.
    pub fn usable_bullets(&self) -> Option<&[String]> {
        self.bullet_points
            .as_deref()
            .filter(|bullets| !bullets.is_empty() && bullets.iter().all(|b| !b.trim().is_empty()))
    }

    /// The summary, trimmed, if it has any content.
    pub fn usable_summary(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether the stage called `stage` has the upstream data it needs.
    /// Unknown stage names are never ready.
    pub fn is_ready_for(&self, stage: &str) -> bool {
        match stage {
            "diff" => true,
            "summary" => self.usable_bullets().is_some(),
            "commit" => self.usable_summary().is_some(),
            _ => false,
        }
    }

    /// Text produced by a stage, by output name: `diff`, `bullet_points`,
    /// `summary` or `commit`. Bullets come back one per line.
    pub fn stage_output(&self, stage: &str) -> Option<String> {
        match stage {
            "diff" => self.staged_diff.clone(),
            "bullet_points" => self.bullet_points.as_ref().map(|b| b.join("\n")),
            "summary" => self.summary.clone(),
            "commit" => self.commit_message.clone(),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialize run state")
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("failed to parse run state JSON")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)
            .with_context(|| format!("failed to write run state to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read run state from {}", path.display()))?;
        Self::from_json(&data)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mark(present: bool) -> &'static str {
            if present { "yes" } else { "no" }
        }

        writeln!(f, "RunState")?;
        writeln!(f, "  staged_diff:    {}", mark(self.staged_diff.is_some()))?;
        writeln!(
            f,
            "  bullet_points:  {} items",
            self.bullet_points.as_ref().map_or(0, Vec::len)
        )?;
        writeln!(f, "  summary:        {}", mark(self.summary.is_some()))?;
        writeln!(f, "  commit_message: {}", mark(self.commit_message.is_some()))?;
        write!(f, "  errors:         {}", self.errors.len())
    }
}
