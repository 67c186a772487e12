//! Todo management for the current repository: list, detail, form, prompt
//! editor and delete confirmation.

mod detail;
mod editor;
mod form;
mod list;

use std::path::PathBuf;

use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

use super::app::{Runtime, Services, Transition};
use super::theme;
use crate::git::Repo;
use crate::modal::{render::draw_modal, KeyOutcome, ModalRequest, TerminalModal, Tick, TickOutcome};
use crate::process::CommandInvocation;
use crate::store::{Store, StoreError};
use crate::todo::Todo;

pub use editor::{EditorOutcome, PromptEditor};
pub use form::{FormCommand, TodoForm};

const IMPROVE_SYSTEM_PROMPT: &str = "You are a prompt rewriter. Rewrite the user's prompt to be clearer and more effective for LLMs.

CRITICAL: Output ONLY the rewritten prompt. No introductions, no explanations, no \"Here is...\", no markdown formatting, no quotes around it. Just the raw improved prompt text and nothing else.

Guidelines for rewriting:
- Keep the original intent
- Be more specific and explicit
- Use clear structure if helpful
- Remove vague language";

/// Invocation that asks the assistant to rewrite `prompt`.
pub fn improve_invocation(claude_cmd: &str, prompt: &str, dir: PathBuf) -> CommandInvocation {
    CommandInvocation::new(
        claude_cmd,
        ["-p", prompt, "--system-prompt", IMPROVE_SYSTEM_PROMPT],
    )
    .in_dir(dir)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct ListState {
    pub cursor: usize,
    pub scroll: usize,
}

pub(super) enum Overlay {
    None,
    Editor(PromptEditor),
    Improve(TerminalModal<TodoForm>),
}

pub(super) struct FormPage {
    pub form: TodoForm,
    pub overlay: Overlay,
}

pub(super) enum Page {
    List,
    Detail { todo: Todo, scroll: usize },
    Form(Box<FormPage>),
    DeleteConfirm { target: Todo },
}

pub struct TodoScreen {
    repo_path: String,
    repo_root: PathBuf,
    branch: String,
    todos: Vec<Todo>,
    list: ListState,
    page: Page,
    error: Option<String>,
}

impl TodoScreen {
    pub fn open(repo: &Repo, store: &Store) -> Self {
        let mut screen = Self {
            repo_path: repo.root_str(),
            repo_root: repo.root.clone(),
            branch: repo.branch.clone(),
            todos: Vec::new(),
            list: ListState::default(),
            page: Page::List,
            error: None,
        };
        screen.reload(store);
        screen
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn page_name(&self) -> &'static str {
        match &self.page {
            Page::List => "list",
            Page::Detail { .. } => "detail",
            Page::Form(page) => match page.overlay {
                Overlay::None => "form",
                Overlay::Editor(_) => "editor",
                Overlay::Improve(_) => "improve",
            },
            Page::DeleteConfirm { .. } => "delete_confirm",
        }
    }

    pub fn form(&self) -> Option<&TodoForm> {
        match &self.page {
            Page::Form(page) => Some(&page.form),
            _ => None,
        }
    }

    fn reload(&mut self, store: &Store) {
        match store.get_todos(&self.repo_path) {
            Ok(list) => {
                self.todos = list.todos;
                let last = self.todos.len().saturating_sub(1);
                self.list.cursor = self.list.cursor.min(last);
                self.list.scroll = self.list.scroll.min(self.list.cursor);
            }
            Err(err) => self.error = Some(err.to_string()),
        }
    }

    fn show_list(&mut self, store: &Store) -> Page {
        self.reload(store);
        Page::List
    }

    fn save_form(&self, form: &TodoForm, store: &Store) -> Result<(), StoreError> {
        let todo = form.to_todo();
        if form.is_edit() {
            store.update_todo(&self.repo_path, &todo)
        } else {
            store.add_todo(&self.repo_path, &todo)
        }
    }

    fn delete(&mut self, target: &Todo, store: &Store) -> Page {
        if let Err(err) = store.delete_todo(&self.repo_path, &target.id) {
            self.error = Some(err.to_string());
        }
        self.show_list(store)
    }

    pub fn handle_key(&mut self, key: &str, services: &Services, runtime: &mut Runtime) -> Transition {
        self.error = None;
        let page = std::mem::replace(&mut self.page, Page::List);
        let height = runtime.screen().1;
        let (page, transition) = match page {
            Page::List => self.list_key(key, &services.keys, height),
            Page::Detail { todo, scroll } => (
                self.detail_key(todo, scroll, key, &services.keys, height),
                Transition::Stay,
            ),
            Page::DeleteConfirm { target } => (
                self.delete_key(target, key, &services.store),
                Transition::Stay,
            ),
            Page::Form(page) => (self.form_key(page, key, services, runtime), Transition::Stay),
        };
        self.page = page;
        transition
    }

    fn delete_key(&mut self, target: Todo, key: &str, store: &Store) -> Page {
        match key {
            "y" | "Y" => self.delete(&target, store),
            "n" | "N" | "esc" => Page::List,
            _ => Page::DeleteConfirm { target },
        }
    }

    fn form_key(
        &mut self,
        mut page: Box<FormPage>,
        key: &str,
        services: &Services,
        runtime: &mut Runtime,
    ) -> Page {
        let keys = &services.keys;
        match std::mem::replace(&mut page.overlay, Overlay::None) {
            Overlay::Editor(mut editor) => {
                match editor.handle_key(key, keys) {
                    EditorOutcome::Continue => page.overlay = Overlay::Editor(editor),
                    EditorOutcome::Cancel => {}
                    EditorOutcome::Save(text) => page.form.set_prompt(editor.index(), text),
                }
                return Page::Form(page);
            }
            Overlay::Improve(mut modal) => {
                if modal.handle_key(key, keys) == KeyOutcome::CloseRequested {
                    let closed = modal.close();
                    if let Some(err) = &closed.exit_error {
                        tracing::warn!(error = %err, "improve prompt finished with error");
                    }
                    closed.deliver(&mut page.form);
                } else {
                    page.overlay = Overlay::Improve(modal);
                }
                return Page::Form(page);
            }
            Overlay::None => {}
        }

        match page.form.handle_key(key, keys) {
            FormCommand::None => Page::Form(page),
            FormCommand::Cancel => self.show_list(&services.store),
            FormCommand::Submit => {
                if let Err(message) = page.form.validate() {
                    self.error = Some(message.to_string());
                    return Page::Form(page);
                }
                match self.save_form(&page.form, &services.store) {
                    Ok(()) => self.show_list(&services.store),
                    Err(err) => {
                        self.error = Some(err.to_string());
                        Page::Form(page)
                    }
                }
            }
            FormCommand::EditPrompt(index) => {
                let text = page.form.prompt(index).unwrap_or_default().to_string();
                page.overlay = Overlay::Editor(PromptEditor::new(index, &text));
                Page::Form(page)
            }
            FormCommand::ImprovePrompt(index) => {
                let prompt = page.form.prompt(index).unwrap_or_default().to_string();
                let invocation =
                    improve_invocation(&services.claude_cmd, &prompt, self.repo_root.clone());
                let request = ModalRequest::new("Improve Prompt", invocation).on_close(
                    move |form: &mut TodoForm, output: String| form.apply_improved(index, &output),
                );
                match runtime.open_modal(services, request) {
                    Ok(modal) => {
                        page.form.begin_improving(index);
                        page.overlay = Overlay::Improve(modal);
                    }
                    Err(err) => self.error = Some(format!("Failed to improve prompt: {err}")),
                }
                Page::Form(page)
            }
        }
    }

    pub fn handle_tick(&mut self, tick: Tick, runtime: &mut Runtime) -> bool {
        let Page::Form(page) = &mut self.page else {
            return false;
        };
        let Overlay::Improve(modal) = &mut page.overlay else {
            return false;
        };
        let outcome: TickOutcome = modal.handle_tick(tick);
        runtime.follow(outcome)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if let Page::Form(page) = &mut self.page {
            if let Overlay::Improve(modal) = &mut page.overlay {
                modal.resize(width, height);
            }
        }
    }

    /// Leave the screen. An open improve modal is closed and its callback
    /// delivered to the form being discarded.
    pub fn dispose(self) {
        if let Page::Form(mut page) = self.page {
            if let Overlay::Improve(modal) = std::mem::replace(&mut page.overlay, Overlay::None) {
                modal.close().deliver(&mut page.form);
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame<'_>, area: Rect, keys: &crate::config::Keybindings) {
        let inner = Rect {
            x: area.x + 2.min(area.width),
            y: area.y + 1.min(area.height),
            width: area.width.saturating_sub(4),
            height: area.height.saturating_sub(2),
        };
        let body = Rect {
            height: inner.height.saturating_sub(2),
            ..inner
        };
        match &self.page {
            Page::List => self.draw_list(frame, body, keys),
            Page::Detail { todo, scroll } => detail::draw_detail(frame, body, todo, *scroll, keys),
            Page::DeleteConfirm { target } => detail::draw_delete_confirm(frame, body, target),
            Page::Form(page) => match &page.overlay {
                Overlay::Editor(editor) => editor.draw(frame, area, keys),
                Overlay::Improve(modal) => {
                    form::draw_form(frame, body, &page.form, keys);
                    draw_modal(frame, modal, &keys.modal_hint());
                }
                Overlay::None => form::draw_form(frame, body, &page.form, keys),
            },
        }
        if let Some(error) = &self.error {
            let row = Rect {
                y: inner.y + inner.height.saturating_sub(1),
                height: 1.min(inner.height),
                ..inner
            };
            frame.render_widget(
                Paragraph::new(Line::styled(format!("Error: {error}"), theme::error())),
                row,
            );
        }
    }
}
