use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{path_id, Store, StoreError};

const REPOS_DIR: &str = "repos";

/// Persisted state for a git repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoState {
    pub path: String,
    pub name: String,
    pub last_opened_at: DateTime<Utc>,
}

impl Store {
    pub fn get_repo_state(&self, repo_path: &str) -> Result<RepoState, StoreError> {
        let repos = self.sub_dir(REPOS_DIR)?;
        repos.read_json(&format!("{}.json", path_id(repo_path)))
    }

    pub fn save_repo_state(&self, state: &RepoState) -> Result<(), StoreError> {
        let repos = self.sub_dir(REPOS_DIR)?;
        repos.write_json(&format!("{}.json", path_id(&state.path)), state)
    }

    /// Record that the repository was opened now, creating its state if needed.
    ///
    /// Returns the state as it was before this call (so the caller can show
    /// when it was last opened) alongside the updated state.
    pub fn touch_repo(
        &self,
        repo_path: &str,
        repo_name: &str,
    ) -> Result<(Option<RepoState>, RepoState), StoreError> {
        let previous = match self.get_repo_state(repo_path) {
            Ok(state) => Some(state),
            Err(StoreError::NotFound) => None,
            Err(err) => return Err(err),
        };
        let mut state = previous.clone().unwrap_or_else(|| RepoState {
            path: repo_path.to_string(),
            name: repo_name.to_string(),
            last_opened_at: Utc::now(),
        });
        state.last_opened_at = Utc::now();
        self.save_repo_state(&state)?;
        Ok((previous, state))
    }
}
