use anyhow::{Context, Result, anyhow};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command as GitCommand, Stdio};

/// Where the diff of staged changes comes from.
pub trait ChangeSource {
    fn staged_diff(&self) -> Result<String>;
}

/// Something that can record a commit with a message.
pub trait CommitRecorder {
    fn commit(&self, message: &str) -> Result<()>;
}

/// A git work tree driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        GitRepo { root: root.into() }
    }

    fn command(&self) -> GitCommand {
        let mut cmd = GitCommand::new("git");
        cmd.arg("-C").arg(&self.root);
        cmd
    }

    /// Run a git command and capture stdout as String.
    pub fn output(&self, args: &[&str]) -> Result<String> {
        let output = self
            .command()
            .args(args)
            .output()
            .with_context(|| format!("failed to run git {:?}", args))?;

        if !output.status.success() {
            return Err(anyhow!(
                "git {:?} exited with status {:?}: {}",
                args,
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Get the path to the Git directory (e.g. .git)
    pub fn git_dir(&self) -> Result<PathBuf> {
        let dir = self.output(&["rev-parse", "--git-dir"])?.trim().to_string();
        let path = PathBuf::from(dir);
        if path.is_absolute() {
            Ok(path)
        } else {
            Ok(self.root.join(path))
        }
    }

    /// Write the commit message into .git/COMMIT_EDITMSG so the next `git commit`
    /// will use it as the default message in the editor.
    pub fn write_commit_editmsg(&self, message: &str) -> Result<PathBuf> {
        let path = self.git_dir()?.join("COMMIT_EDITMSG");
        fs::write(&path, message)
            .with_context(|| format!("failed to write commit message to {:?}", path))?;
        Ok(path)
    }
}

impl ChangeSource for GitRepo {
    fn staged_diff(&self) -> Result<String> {
        self.output(&["diff", "--cached"])
    }
}

impl CommitRecorder for GitRepo {
    fn commit(&self, message: &str) -> Result<()> {
        log::info!("Recording commit in {}", self.root.display());

        let mut child = self
            .command()
            .args(["commit", "-F", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("failed to run git commit")?;

        child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("git commit stdin unavailable"))?
            .write_all(message.as_bytes())
            .context("failed to pass commit message to git")?;

        let output = child
            .wait_with_output()
            .context("failed to wait for git commit")?;

        if !output.status.success() {
            return Err(anyhow!(
                "git commit exited with status {:?}: {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        Ok(())
    }
}

/// A diff read from a file, or from stdin when the path is `-`.
#[derive(Debug, Clone)]
pub struct DiffFile {
    path: PathBuf,
}

impl DiffFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DiffFile { path: path.into() }
    }

    fn is_stdin(&self) -> bool {
        self.path == Path::new("-")
    }
}

impl ChangeSource for DiffFile {
    fn staged_diff(&self) -> Result<String> {
        if self.is_stdin() {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read diff from stdin")?;
            return Ok(buf);
        }

        fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read diff from {}", self.path.display()))
    }
}

/// A diff already held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticDiff(pub String);

impl ChangeSource for StaticDiff {
    fn staged_diff(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
