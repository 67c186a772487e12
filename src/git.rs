//! Thin wrapper over the `git` CLI for repository discovery and status queries.

use std::{
    io,
    path::{Path, PathBuf},
    process::Command,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("not a git repository")]
    NotRepo,
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("git {args} failed: {stderr}")]
    Command { args: String, stderr: String },
    #[error("unexpected git output: {0:?}")]
    Parse(String),
}

/// The git executable to invoke.
#[derive(Debug, Clone)]
pub struct Git {
    program: String,
}

impl Default for Git {
    fn default() -> Self {
        Self::new("git")
    }
}

impl Git {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|source| GitError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(GitError::Command {
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn current_branch(&self, root: &Path) -> Result<String, GitError> {
        Ok(self
            .run(root, &["rev-parse", "--abbrev-ref", "HEAD"])?
            .trim()
            .to_string())
    }

    /// Whether `git status --porcelain` reports anything.
    pub fn has_local_changes(&self, root: &Path) -> Result<bool, GitError> {
        Ok(!self.run(root, &["status", "--porcelain"])?.trim().is_empty())
    }

    /// Commits ahead of and behind the upstream branch.
    pub fn ahead_behind(&self, root: &Path) -> Result<(u32, u32), GitError> {
        let out = self.run(
            root,
            &["rev-list", "--left-right", "--count", "HEAD...@{upstream}"],
        )?;
        parse_ahead_behind(&out).ok_or(GitError::Parse(out))
    }

    /// Working tree diff against HEAD; empty when there is nothing to show.
    pub fn diff_head(&self, root: &Path) -> Result<String, GitError> {
        self.run(root, &["diff", "HEAD"])
    }
}

fn parse_ahead_behind(out: &str) -> Option<(u32, u32)> {
    let mut parts = out.split_whitespace();
    let ahead = parts.next()?.parse().ok()?;
    let behind = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((ahead, behind))
}

/// Walk from `start` up to the filesystem root looking for a `.git` entry
/// (a directory, or a file for worktrees and submodules).
pub fn find_repo_root(start: &Path) -> Result<PathBuf, GitError> {
    start
        .ancestors()
        .find(|dir| {
            let marker = dir.join(".git");
            marker.is_dir() || marker.is_file()
        })
        .map(Path::to_path_buf)
        .ok_or(GitError::NotRepo)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    pub root: PathBuf,
    pub name: String,
    pub branch: String,
}

impl Repo {
    /// Locate the repository containing `start`. The branch falls back to
    /// `unknown` when git cannot report it (for example before the first commit).
    pub fn discover(start: &Path, git: &Git) -> Result<Self, GitError> {
        let root = find_repo_root(start)?;
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());
        let branch = git
            .current_branch(&root)
            .ok()
            .filter(|branch| !branch.is_empty())
            .unwrap_or_else(|| "unknown".to_string());
        Ok(Self { root, name, branch })
    }

    pub fn root_str(&self) -> String {
        self.root.to_string_lossy().into_owned()
    }
}
