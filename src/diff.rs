//! Splitting a unified diff into per-file records.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RE_FILE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^diff --git a/(.*?) b/(.*?)$").expect("invalid RE_FILE_HEADER regex")
});

const FILE_MARKER: &str = "diff --git";

/// How a file changed. Decided by the first marker line seen for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Deleted,
    Renamed,
    Modified,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Added => "added",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
            ChangeKind::Modified => "modified",
        };
        f.write_str(s)
    }
}

/// Where a line inside a file record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOrigin {
    Added,
    Removed,
    Context,
}

/// One file's delta within a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub old_path: String,
    pub new_path: String,
    pub kind: ChangeKind,
    pub additions: usize,
    pub deletions: usize,
    /// Lines in diff order. Added/removed lines have their marker stripped.
    pub lines: Vec<(LineOrigin, String)>,
}

impl FileChange {
    fn open(old_path: String, new_path: String) -> Self {
        FileChange {
            old_path,
            new_path,
            kind: ChangeKind::Modified,
            additions: 0,
            deletions: 0,
            lines: Vec::new(),
        }
    }

    /// Lines introduced by this change, in order.
    pub fn added_lines(&self) -> impl Iterator<Item = &str> {
        self.lines
            .iter()
            .filter(|(origin, _)| *origin == LineOrigin::Added)
            .map(|(_, text)| text.as_str())
    }

    fn push_line(&mut self, line: &str) {
        if line.starts_with("new file") {
            self.kind = ChangeKind::Added;
        } else if line.starts_with("deleted file") {
            self.kind = ChangeKind::Deleted;
        } else if line.starts_with("rename from") {
            self.kind = ChangeKind::Renamed;
        } else if let Some(text) = line.strip_prefix('+').filter(|_| !line.starts_with("+++")) {
            self.additions += 1;
            self.lines.push((LineOrigin::Added, text.to_string()));
        } else if let Some(text) = line.strip_prefix('-').filter(|_| !line.starts_with("---")) {
            self.deletions += 1;
            self.lines.push((LineOrigin::Removed, text.to_string()));
        } else {
            self.lines.push((LineOrigin::Context, line.to_string()));
        }
    }
}

/// Pull `(old, new)` out of a `diff --git a/X b/Y` line.
///
/// Headers that don't fit the `a/`/`b/` shape (quoted paths, custom
/// prefixes) still open a record; the raw remainder stands in for both paths.
fn parse_header(line: &str) -> (String, String) {
    if let Some(caps) = RE_FILE_HEADER.captures(line) {
        return (caps[1].to_string(), caps[2].to_string());
    }

    let rest = line[FILE_MARKER.len()..].trim().to_string();
    (rest.clone(), rest)
}

/// Split raw unified-diff text into one [`FileChange`] per `diff --git` line.
///
/// Text before the first file header is ignored. Empty input gives an empty
/// list, which callers treat as "nothing staged".
pub fn segment(diff: &str) -> Vec<FileChange> {
    let mut files = Vec::new();
    let mut current: Option<FileChange> = None;

    for line in diff.lines() {
        if line.starts_with(FILE_MARKER) {
            if let Some(done) = current.take() {
                files.push(done);
            }
            let (old_path, new_path) = parse_header(line);
            current = Some(FileChange::open(old_path, new_path));
        } else if let Some(file) = current.as_mut() {
            file.push_line(line);
        }
    }

    if let Some(done) = current {
        files.push(done);
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_FILES: &str = "\
diff --git a/utils.py b/utils.py
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/utils.py
@@ -0,0 +1,2 @@
+import os
+VALUE = 1
diff --git a/main.py b/main.py
index 1111111..2222222 100644
--- a/main.py
+++ b/main.py
@@ -1,3 +1,3 @@
 import sys
-print('old')
+def foo():
";

    #[test]
    fn empty_input_has_no_files() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n").is_empty());
    }

    #[test]
    fn splits_on_file_headers() {
        let files = segment(TWO_FILES);
        assert_eq!(files.len(), 2);

        assert_eq!(files[0].new_path, "utils.py");
        assert_eq!(files[0].kind, ChangeKind::Added);
        assert_eq!(files[0].additions, 2);
        assert_eq!(files[0].deletions, 0);

        assert_eq!(files[1].old_path, "main.py");
        assert_eq!(files[1].kind, ChangeKind::Modified);
        assert_eq!(files[1].additions, 1);
        assert_eq!(files[1].deletions, 1);
    }

    #[test]
    fn header_markers_are_not_counted() {
        let files = segment(TWO_FILES);
        let added: Vec<&str> = files[1].added_lines().collect();
        assert_eq!(added, vec!["def foo():"]);
        assert!(files[1]
            .lines
            .contains(&(LineOrigin::Context, "+++ b/main.py".to_string())));
        assert!(files[1]
            .lines
            .contains(&(LineOrigin::Removed, "print('old')".to_string())));
    }

    #[test]
    fn counts_match_a_direct_line_scan() {
        for file in segment(TWO_FILES) {
            let adds = file.lines.iter().filter(|(o, _)| *o == LineOrigin::Added).count();
            let dels = file.lines.iter().filter(|(o, _)| *o == LineOrigin::Removed).count();
            assert_eq!(file.additions, adds);
            assert_eq!(file.deletions, dels);
        }
    }

    #[test]
    fn detects_deletes_and_renames() {
        let diff = "\
diff --git a/gone.txt b/gone.txt
deleted file mode 100644
--- a/gone.txt
+++ /dev/null
@@ -1,2 +0,0 @@
-one
-two
diff --git a/old_name.rs b/new_name.rs
similarity index 100%
rename from old_name.rs
rename to new_name.rs
";
        let files = segment(diff);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].kind, ChangeKind::Deleted);
        assert_eq!(files[0].deletions, 2);
        assert_eq!(files[1].kind, ChangeKind::Renamed);
        assert_eq!(files[1].old_path, "old_name.rs");
        assert_eq!(files[1].new_path, "new_name.rs");
    }

    #[test]
    fn text_before_first_header_is_ignored() {
        let diff = "+stray\n-stray\ndiff --git a/a b/a\n+x\n";
        let files = segment(diff);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].additions, 1);
        assert_eq!(files[0].deletions, 0);
    }

    #[test]
    fn odd_header_still_opens_a_record() {
        let diff = "diff --git \"a/with space\" \"b/with space\"\n+x\ndiff --git a/b b/b\n";
        let files = segment(diff);
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].new_path, "\"a/with space\" \"b/with space\"");
        assert_eq!(files[0].additions, 1);
    }
}
