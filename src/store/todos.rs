use super::{path_id, Store, StoreError};
use crate::todo::{Todo, TodoList};

const TODOS_DIR: &str = "todos";

impl Store {
    /// Todos for a repository; an empty list when none were saved yet.
    pub fn get_todos(&self, repo_path: &str) -> Result<TodoList, StoreError> {
        let todos = self.sub_dir(TODOS_DIR)?;
        match todos.read_json(&format!("{}.json", path_id(repo_path))) {
            Ok(list) => Ok(list),
            Err(StoreError::NotFound) => Ok(TodoList::empty(repo_path)),
            Err(err) => Err(err),
        }
    }

    pub fn save_todos(&self, list: &TodoList) -> Result<(), StoreError> {
        let todos = self.sub_dir(TODOS_DIR)?;
        todos.write_json(&format!("{}.json", path_id(&list.repo_path)), list)
    }

    pub fn add_todo(&self, repo_path: &str, todo: &Todo) -> Result<(), StoreError> {
        let mut list = self.get_todos(repo_path)?;
        list.todos.push(todo.clone());
        self.save_todos(&list)
    }

    /// Replace the todo with the same id. `NotFound` when the id is unknown.
    pub fn update_todo(&self, repo_path: &str, todo: &Todo) -> Result<(), StoreError> {
        let mut list = self.get_todos(repo_path)?;
        let slot = list
            .todos
            .iter_mut()
            .find(|existing| existing.id == todo.id)
            .ok_or(StoreError::NotFound)?;
        *slot = todo.clone();
        self.save_todos(&list)
    }

    pub fn delete_todo(&self, repo_path: &str, todo_id: &str) -> Result<(), StoreError> {
        let mut list = self.get_todos(repo_path)?;
        let index = list
            .todos
            .iter()
            .position(|existing| existing.id == todo_id)
            .ok_or(StoreError::NotFound)?;
        list.todos.remove(index);
        self.save_todos(&list)
    }
}
