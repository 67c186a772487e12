use super::{AppConfig, MAX_MAX_LINES, MAX_TICK_MS, MIN_MAX_LINES, MIN_TICK_MS};
use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::{fs, path::Path};

/// Characters that would change meaning if a binary name reached a shell.
const FORBIDDEN_BINARY_CHARS: &[char] = &[
    ';', '&', '|', '$', '`', '<', '>', '(', ')', '{', '}', '*', '?', '!', '\'', '"', '\\',
];

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize binary paths.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_TICK_MS..=MAX_TICK_MS).contains(&self.tick_ms) {
            bail!(
                "--tick-ms must be between {MIN_TICK_MS} and {MAX_TICK_MS}, got {}",
                self.tick_ms
            );
        }
        if !(MIN_MAX_LINES..=MAX_MAX_LINES).contains(&self.max_lines) {
            bail!(
                "--max-lines must be between {MIN_MAX_LINES} and {MAX_MAX_LINES}, got {}",
                self.max_lines
            );
        }

        self.claude_cmd = sanitize_binary(&self.claude_cmd, "--claude-cmd")?;
        self.git_cmd = sanitize_binary(&self.git_cmd, "--git-cmd")?;
        self.shell_cmd = sanitize_binary(&self.shell_cmd, "--shell-cmd")?;

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                bail!("--data-dir cannot be empty");
            }
            if dir.exists() && !dir.is_dir() {
                bail!("--data-dir '{}' is not a directory", dir.display());
            }
        }
        Ok(())
    }
}

/// Accept a bare command name resolved through `PATH`, or an existing
/// executable path which is returned canonicalized.
pub(super) fn sanitize_binary(value: &str, flag: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{flag} cannot be empty");
    }
    if trimmed.chars().any(char::is_whitespace) {
        bail!("{flag} must be a single program name without arguments, got '{trimmed}'");
    }
    if let Some(bad) = trimmed.chars().find(|c| FORBIDDEN_BINARY_CHARS.contains(c)) {
        bail!("{flag} contains forbidden character '{bad}'");
    }

    let path = Path::new(trimmed);
    if !(path.is_absolute() || trimmed.contains(std::path::MAIN_SEPARATOR)) {
        return Ok(trimmed.to_string());
    }

    let canonical = path
        .canonicalize()
        .with_context(|| format!("failed to canonicalize {flag} '{trimmed}'"))?;
    let metadata = fs::metadata(&canonical)
        .with_context(|| format!("failed to inspect {flag} '{}'", canonical.display()))?;
    if !metadata.is_file() {
        bail!("{flag} '{}' is not a file", canonical.display());
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = metadata.permissions().mode();
        if mode & 0o111 == 0 {
            bail!(
                "{flag} '{}' exists but is not executable (mode {:o})",
                canonical.display(),
                mode
            );
        }
    }
    canonical
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("{flag} must be valid UTF-8"))
}
