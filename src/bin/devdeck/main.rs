//! devdeck entrypoint: parse flags, open the data store, discover the
//! current repository and hand off to the full-screen UI.

use std::{env, sync::Arc};

use anyhow::{bail, Context, Result};
use crossterm::terminal::size as terminal_size;
use devdeck::{
    config::{AppConfig, Keybindings, StartView},
    git::{Git, GitError, Repo},
    init_logging,
    process::SystemLauncher,
    store::Store,
    terminal_restore::install_terminal_panic_hook,
    ui::{run_app, App, RepoInfo, Services},
};

const FALLBACK_SCREEN: (u16, u16) = (80, 24);

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    install_terminal_panic_hook();
    if let Some(path) = init_logging(&config) {
        tracing::info!(path = %path.display(), view = ?config.view, "devdeck started");
    }

    let data_dir = config
        .resolved_data_dir()
        .context("failed to resolve data directory")?;
    let store = Store::open(&data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    let keys = Keybindings::load(&store).context("failed to load keybindings")?;

    let git = Git::new(config.git_cmd.clone());
    let cwd = env::current_dir().context("failed to read current directory")?;
    let repo = match Repo::discover(&cwd, &git) {
        Ok(repo) => Some(repo),
        Err(GitError::NotRepo) => None,
        Err(err) => return Err(err).context("failed to inspect repository"),
    };
    if config.view == StartView::Todo && repo.is_none() {
        bail!("the todo view needs a git repository; run devdeck inside one");
    }
    let repo_info = repo.map(|repo| RepoInfo::gather(repo, &store, &git));
    if let Some(info) = &repo_info {
        tracing::info!(
            repo = %info.repo.name,
            branch = %info.repo.branch,
            ahead = info.ahead,
            behind = info.behind,
            "repository"
        );
    }

    let services = Services {
        keys,
        store,
        git,
        launcher: Arc::new(SystemLauncher),
        settings: config.modal_settings(),
        claude_cmd: config.claude_cmd.clone(),
        shell_cmd: config.shell_cmd.clone(),
    };
    let screen = terminal_size().unwrap_or(FALLBACK_SCREEN);
    let mut app = App::new(services, repo_info, config.view, screen);
    run_app(&mut app)?;
    tracing::info!("devdeck exited");
    Ok(())
}
