use anyhow::{Context, Result, anyhow};
use clap::Parser;
use colored::Colorize;
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

use commitsmith::cli_args::Cli;
use commitsmith::config::Config;
use commitsmith::error::StageError;
use commitsmith::git::{ChangeSource, CommitRecorder, DiffFile, GitRepo};
use commitsmith::logging::init_logger;
use commitsmith::pipeline::Pipeline;
use commitsmith::setup::build_llm_client;
use commitsmith::state::RunState;

fn spinner() -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Draw `text` inside a light box, one row per line.
fn boxed(text: &str) -> String {
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let rule = "─".repeat(width + 2);

    let mut out = format!("┌{rule}┐\n");
    for line in text.lines() {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("└{rule}┘"));
    out
}

fn prompt_input(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut buf = String::new();
    io::stdin().read_line(&mut buf)?;
    Ok(buf.trim().to_string())
}

fn print_errors(state: &RunState) {
    eprintln!("{}", "Could not generate a commit message:".red().bold());
    for error in &state.errors {
        eprintln!("  {} {error}", "✗".red());
    }

    let nothing_staged = StageError::NoStagedChanges.to_string();
    if state.errors.iter().any(|e| e.message == nothing_staged) {
        eprintln!();
        eprintln!("Stage changes first, for example: {}", "git add <files>".cyan());
    }
}

fn print_results(state: &RunState, message: &str) {
    if let Some(bullets) = &state.bullet_points {
        println!("{}", "Changes".bold());
        for bullet in bullets {
            println!("  {bullet}");
        }
        println!();
    }

    if let Some(summary) = &state.summary {
        println!("{}", "Summary".bold());
        println!("  {}", summary.italic());
        println!();
    }

    println!("{}", "Commit message".bold());
    println!("{}", boxed(message).green());
}

/// Decide whether to commit: `--yes` always does; otherwise ask, but only
/// when both ends of the terminal are interactive.
fn confirm_commit(cli: &Cli) -> Result<bool> {
    if cli.yes {
        return Ok(true);
    }

    if !io::stdin().is_tty() || !io::stdout().is_tty() {
        println!(
            "{}",
            "Not committing: no terminal to confirm on (pass --yes to commit).".yellow()
        );
        return Ok(false);
    }

    let answer = prompt_input("Commit with this message? [y/N] ")?;
    Ok(matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let cfg = Config::from_sources(&cli)?;
    log::debug!("Resolved config: backend={:?} model={} style={}", cfg.backend, cfg.model, cfg.commit_style);

    let llm = build_llm_client(&cfg)?;
    let repo = GitRepo::new(&cli.repo);
    let source: Box<dyn ChangeSource> = match &cli.diff_file {
        Some(path) => Box::new(DiffFile::new(path)),
        None => Box::new(repo.clone()),
    };

    let pipeline = Pipeline::from_config(&cfg, llm, source);

    let bar = spinner();
    let state = pipeline.run_with(RunState::new(), |stage| {
        bar.set_message(format!("Running {stage} stage..."));
    });
    bar.finish_and_clear();

    if let Some(path) = &cli.save_state {
        state.save(path)?;
        log::info!("Saved run state to {}", path.display());
    }

    if state.has_errors() {
        print_errors(&state);
        return Ok(ExitCode::FAILURE);
    }

    let message = state
        .commit_message
        .clone()
        .ok_or_else(|| anyhow!("run finished without a commit message"))?;

    print_results(&state, &message);

    if let Some(path) = &cli.output {
        fs::write(path, format!("{message}\n"))
            .with_context(|| format!("failed to write commit message to {}", path.display()))?;
        println!("Wrote commit message to {}", path.display());
    }

    if cli.apply {
        let path = repo.write_commit_editmsg(&message)?;
        println!("Wrote commit message to {}", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    if cli.dry_run {
        return Ok(ExitCode::SUCCESS);
    }

    if cli.diff_file.is_some() {
        println!("Diff came from --diff-file; not committing.");
        return Ok(ExitCode::SUCCESS);
    }

    if confirm_commit(&cli)? {
        repo.commit(&message)?;
        println!("{}", "Committed.".green().bold());
    } else {
        println!("Commit cancelled.");
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_pads_every_line() {
        let out = boxed("feat: add x\n\nlonger body line");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "│ feat: add x      │");
        assert_eq!(lines[2], "│                  │");
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }
}
