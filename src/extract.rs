//! Spotting functions and classes introduced by added lines.
//!
//! The patterns are plain regex heuristics that work across several
//! languages at once. They do miss things and they do over-match (a Java-ish
//! `word word(` shape also catches calls like `return helper(x)`); the set and
//! its order are kept as-is so results stay stable between releases.

use regex::Regex;
use std::sync::LazyLock;

use crate::diff::{FileChange, LineOrigin};

/// Function shapes tried in order, with the capture group holding the name.
static FUNCTION_PATTERNS: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
    [
        // python
        (r"def\s+(\w+)\s*\(", 1),
        // javascript
        (r"function\s+(\w+)\s*\(", 1),
        // java / c# / c++
        (r"(public|private|protected)?\s*\w+\s+(\w+)\s*\(", 2),
        // arrow function assignment
        (r"const\s+(\w+)\s*=\s*\(", 1),
    ]
    .into_iter()
    .map(|(pattern, group)| {
        (
            Regex::new(pattern).expect("invalid function pattern"),
            group,
        )
    })
    .collect()
});

static RE_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"class\s+(\w+)").expect("invalid RE_CLASS regex"));

fn function_name(line: &str) -> Option<&str> {
    FUNCTION_PATTERNS.iter().find_map(|(re, group)| {
        re.captures(line)
            .and_then(|caps| caps.get(*group))
            .map(|m| m.as_str())
    })
}

fn class_name(line: &str) -> Option<&str> {
    RE_CLASS
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Describe the structural additions in one added line.
///
/// At most one function fragment (first matching pattern wins) followed by
/// at most one class fragment.
pub fn fragments_for_line(line: &str) -> Vec<String> {
    let mut out = Vec::new();

    if let Some(name) = function_name(line) {
        out.push(format!("Added function `{name}()`"));
    }
    if let Some(name) = class_name(line) {
        out.push(format!("Added class `{name}`"));
    }

    out
}

/// Describe every function/class an added line in `file` introduces, in
/// line order. Removed and context lines are never looked at.
pub fn extract_fragments(file: &FileChange) -> Vec<String> {
    file.lines
        .iter()
        .filter(|(origin, _)| *origin == LineOrigin::Added)
        .flat_map(|(_, text)| fragments_for_line(text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::ChangeKind;

    fn modified(lines: Vec<(LineOrigin, &str)>) -> FileChange {
        FileChange {
            old_path: "f".into(),
            new_path: "f".into(),
            kind: ChangeKind::Modified,
            additions: 0,
            deletions: 0,
            lines: lines.into_iter().map(|(o, t)| (o, t.to_string())).collect(),
        }
    }

    #[test]
    fn python_def() {
        assert_eq!(fragments_for_line("def foo():"), vec!["Added function `foo()`"]);
        assert_eq!(
            fragments_for_line("    def  parse_args (self, argv):"),
            vec!["Added function `parse_args()`"]
        );
    }

    #[test]
    fn javascript_function_and_arrow() {
        assert_eq!(
            fragments_for_line("function render(props) {"),
            vec!["Added function `render()`"]
        );
        // The java-ish pattern is tried before the arrow pattern, and `const x = (`
        // has no `word word(` shape, so the arrow pattern is what matches here.
        assert_eq!(
            fragments_for_line("const handler = (event) => {"),
            vec!["Added function `handler()`"]
        );
    }

    #[test]
    fn java_method_uses_second_group() {
        assert_eq!(
            fragments_for_line("    public void run() {"),
            vec!["Added function `run()`"]
        );
        assert_eq!(
            fragments_for_line("int count(String s) {"),
            vec!["Added function `count()`"]
        );
    }

    #[test]
    fn class_is_reported_alongside_function() {
        assert_eq!(fragments_for_line("class Parser:"), vec!["Added class `Parser`"]);
        assert_eq!(
            fragments_for_line("export class Widget extends Base(Mixin) {"),
            vec!["Added function `Base()`", "Added class `Widget`"]
        );
    }

    #[test]
    fn plain_lines_yield_nothing() {
        assert!(fragments_for_line("x = 1").is_empty());
        assert!(fragments_for_line("").is_empty());
    }

    #[test]
    fn only_added_lines_are_scanned() {
        let file = modified(vec![
            (LineOrigin::Removed, "def gone():"),
            (LineOrigin::Context, "def kept():"),
            (LineOrigin::Added, "def fresh():"),
            (LineOrigin::Added, "class Fresh:"),
        ]);
        assert_eq!(
            extract_fragments(&file),
            vec!["Added function `fresh()`", "Added class `Fresh`"]
        );
    }
}
