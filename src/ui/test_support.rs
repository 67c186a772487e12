//! Shared fixtures for the screen tests: a temp store, a fake repo and a
//! launcher whose processes are fed by the test.

use std::sync::{Arc, Mutex};

use tempfile::TempDir;

use super::app::{RepoInfo, Runtime, Services};
use crate::config::Keybindings;
use crate::git::{Git, Repo};
use crate::modal::ModalSettings;
use crate::process::{
    build_test_process, CommandInvocation, ProcessLauncher, RunningProcess, SinkWriter,
    SpawnError,
};
use crate::store::Store;

pub const SCREEN: (u16, u16) = (100, 40);

#[derive(Default)]
pub struct ScriptedLauncher {
    started: Mutex<Vec<(CommandInvocation, SinkWriter)>>,
}

impl ScriptedLauncher {
    pub fn writer(&self, index: usize) -> SinkWriter {
        self.started.lock().unwrap()[index].1.clone()
    }

    pub fn invocation(&self, index: usize) -> CommandInvocation {
        self.started.lock().unwrap()[index].0.clone()
    }

    pub fn count(&self) -> usize {
        self.started.lock().unwrap().len()
    }
}

impl ProcessLauncher for ScriptedLauncher {
    fn start(&self, invocation: CommandInvocation) -> Result<RunningProcess, SpawnError> {
        let (process, writer) = build_test_process(invocation.clone());
        self.started.lock().unwrap().push((invocation, writer));
        Ok(process)
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub launcher: Arc<ScriptedLauncher>,
    pub services: Services,
    pub runtime: Runtime,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path().join("data")).unwrap();
        let launcher = Arc::new(ScriptedLauncher::default());
        let services = build_services(store, launcher.clone());
        Self {
            dir,
            launcher,
            services,
            runtime: Runtime::new(SCREEN),
        }
    }

    /// A second set of services over the same store and launcher.
    pub fn services(&self) -> Services {
        build_services(self.services.store.clone(), self.launcher.clone())
    }

    pub fn repo(&self) -> Repo {
        Repo {
            root: self.dir.path().join("project"),
            name: "project".into(),
            branch: "main".into(),
        }
    }

    pub fn repo_info(&self) -> RepoInfo {
        RepoInfo {
            repo: self.repo(),
            last_opened: None,
            ahead: 0,
            behind: 0,
            has_changes: false,
        }
    }
}

fn build_services(store: Store, launcher: Arc<ScriptedLauncher>) -> Services {
    Services {
        keys: Keybindings::default(),
        store,
        git: Git::default(),
        launcher,
        settings: ModalSettings::default(),
        claude_cmd: "claude".into(),
        shell_cmd: "bash".into(),
    }
}
