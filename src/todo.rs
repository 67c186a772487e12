use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// A unit of planned work on a branch, with the prompts to hand to the assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub branch: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub prompts: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// All todos recorded for one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    pub repo_path: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
}

impl TodoList {
    pub fn empty(repo_path: impl Into<String>) -> Self {
        Self {
            repo_path: repo_path.into(),
            todos: Vec::new(),
        }
    }
}

impl Todo {
    pub fn new(
        branch: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        prompts: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            branch: branch.into(),
            name: name.into(),
            description: description.into(),
            prompts,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn add_prompt(&mut self, prompt: impl Into<String>) {
        self.prompts.push(prompt.into());
        self.touch();
    }

    /// Out-of-range indexes are ignored.
    pub fn remove_prompt(&mut self, index: usize) {
        if index < self.prompts.len() {
            self.prompts.remove(index);
            self.touch();
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.branch.trim().is_empty()
    }

    pub fn first_description_line(&self) -> &str {
        self.description.lines().next().unwrap_or("")
    }
}

fn generate_id() -> String {
    let mut bytes = [0u8; 8];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
