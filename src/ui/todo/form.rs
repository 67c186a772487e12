//! Create/edit form. Navigation and inline editing are separate modes so
//! single-letter bindings never fire while the user is typing.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::{matches, matches_any, Keybindings};
use crate::todo::Todo;
use crate::ui::{text_input::TextBuffer, theme};
use crate::utf8_safe::ellipsize;

const PROMPT_PREVIEW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Branch,
    Name,
    Description,
    Prompts,
}

impl FormField {
    fn next(self) -> Self {
        match self {
            FormField::Branch => FormField::Name,
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Prompts,
            FormField::Prompts => FormField::Branch,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormField::Branch => FormField::Prompts,
            FormField::Name => FormField::Branch,
            FormField::Description => FormField::Name,
            FormField::Prompts => FormField::Description,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Navigate,
    Edit,
}

/// What the owning screen should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormCommand {
    None,
    Cancel,
    Submit,
    EditPrompt(usize),
    ImprovePrompt(usize),
}

#[derive(Debug, Clone)]
pub struct TodoForm {
    editing: Option<Todo>,
    pub(super) branch: TextBuffer,
    pub(super) name: TextBuffer,
    pub(super) description: TextBuffer,
    pub(super) prompts: Vec<String>,
    pub(super) field: FormField,
    pub(super) prompt_index: usize,
    pub(super) mode: FormMode,
    pub(super) improving: Option<usize>,
}

impl TodoForm {
    pub fn create(branch: &str) -> Self {
        Self::build(None, branch, "", "", Vec::new())
    }

    pub fn edit(todo: &Todo) -> Self {
        Self::build(
            Some(todo.clone()),
            &todo.branch,
            &todo.name,
            &todo.description,
            todo.prompts.clone(),
        )
    }

    fn build(
        editing: Option<Todo>,
        branch: &str,
        name: &str,
        description: &str,
        mut prompts: Vec<String>,
    ) -> Self {
        if prompts.is_empty() {
            prompts.push(String::new());
        }
        Self {
            editing,
            branch: TextBuffer::single_line(branch),
            name: TextBuffer::single_line(name),
            description: TextBuffer::multiline(description),
            prompts,
            field: FormField::Branch,
            prompt_index: 0,
            mode: FormMode::Navigate,
            improving: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.editing.is_some()
    }

    pub fn field(&self) -> FormField {
        self.field
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn prompt_index(&self) -> usize {
        self.prompt_index
    }

    pub fn improving(&self) -> Option<usize> {
        self.improving
    }

    pub fn prompt(&self, index: usize) -> Option<&str> {
        self.prompts.get(index).map(String::as_str)
    }

    pub fn set_prompt(&mut self, index: usize, text: String) {
        if let Some(slot) = self.prompts.get_mut(index) {
            *slot = text;
        }
    }

    pub fn begin_improving(&mut self, index: usize) {
        self.improving = Some(index);
    }

    /// Close callback target for the improve-prompt modal.
    pub fn apply_improved(&mut self, index: usize, output: &str) {
        self.improving = None;
        let improved = output.trim();
        if !improved.is_empty() {
            self.set_prompt(index, improved.to_string());
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextBuffer> {
        match self.field {
            FormField::Branch => Some(&mut self.branch),
            FormField::Name => Some(&mut self.name),
            FormField::Description => Some(&mut self.description),
            FormField::Prompts => None,
        }
    }

    pub fn handle_key(&mut self, key: &str, keys: &Keybindings) -> FormCommand {
        match self.mode {
            FormMode::Navigate => self.navigate_key(key, keys),
            FormMode::Edit => {
                self.edit_key(key, keys);
                FormCommand::None
            }
        }
    }

    fn edit_key(&mut self, key: &str, keys: &Keybindings) {
        if matches_any(key, &[keys.form.cancel.as_str(), keys.editor.new_line.as_str()]) {
            self.mode = FormMode::Navigate;
            return;
        }
        if let Some(input) = self.focused_input() {
            input.apply_key(key);
        }
    }

    fn navigate_key(&mut self, key: &str, keys: &Keybindings) -> FormCommand {
        if matches(key, &keys.form.cancel) {
            return FormCommand::Cancel;
        }
        if matches(key, &keys.form.submit) {
            return FormCommand::Submit;
        }
        if keys.is_move_up(key) {
            if self.field == FormField::Prompts && self.prompt_index > 0 {
                self.prompt_index -= 1;
            } else if self.field != FormField::Branch {
                self.field = self.field.prev();
            }
            return FormCommand::None;
        }
        if keys.is_move_down(key) {
            if self.field == FormField::Prompts {
                if self.prompt_index + 1 < self.prompts.len() {
                    self.prompt_index += 1;
                }
            } else {
                self.field = self.field.next();
                if self.field == FormField::Prompts {
                    self.prompt_index = 0;
                }
            }
            return FormCommand::None;
        }
        if matches(key, &keys.form.next_field) {
            self.field = self.field.next();
            if self.field == FormField::Prompts {
                self.prompt_index = 0;
            }
            return FormCommand::None;
        }
        if matches(key, &keys.form.prev_field) {
            self.field = self.field.prev();
            if self.field == FormField::Prompts {
                self.prompt_index = self.prompts.len() - 1;
            }
            return FormCommand::None;
        }
        if matches_any(key, &[keys.form.edit_prompt.as_str(), keys.editor.new_line.as_str()]) {
            if self.field == FormField::Prompts {
                return FormCommand::EditPrompt(self.prompt_index);
            }
            self.mode = FormMode::Edit;
            return FormCommand::None;
        }
        if self.field != FormField::Prompts {
            return FormCommand::None;
        }

        if matches(key, &keys.form.add_prompt) {
            self.prompts.push(String::new());
            self.prompt_index = self.prompts.len() - 1;
        } else if matches(key, &keys.form.delete_prompt) {
            if self.prompts.len() > 1 && self.improving.is_none() {
                self.prompts.remove(self.prompt_index);
                self.prompt_index = self.prompt_index.min(self.prompts.len() - 1);
            }
        } else if matches(key, &keys.form.improve_prompt) {
            let has_text = !self.prompts[self.prompt_index].trim().is_empty();
            if self.improving.is_none() && has_text {
                return FormCommand::ImprovePrompt(self.prompt_index);
            }
        }
        FormCommand::None
    }

    /// Check required fields. The name is checked first.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.text().trim().is_empty() {
            return Err("Name is required");
        }
        if self.branch.text().trim().is_empty() {
            return Err("Branch is required");
        }
        Ok(())
    }

    /// The todo to persist: the edited one updated in place, or a new one.
    /// Blank prompts are dropped.
    pub fn to_todo(&self) -> Todo {
        let prompts: Vec<String> = self
            .prompts
            .iter()
            .filter(|prompt| !prompt.trim().is_empty())
            .cloned()
            .collect();
        let branch = self.branch.text().trim();
        let name = self.name.text().trim();
        let description = self.description.text();
        match &self.editing {
            Some(existing) => {
                let mut todo = existing.clone();
                todo.branch = branch.to_string();
                todo.name = name.to_string();
                todo.description = description.to_string();
                todo.prompts = prompts;
                todo.touch();
                todo
            }
            None => Todo::new(branch, name, description, prompts),
        }
    }
}

fn field_label(form: &TodoForm, field: FormField, label: &str) -> Line<'static> {
    if form.field == field {
        Line::styled(format!("▸ {label}:"), theme::selected())
    } else {
        Line::styled(format!("  {label}:"), theme::label())
    }
}

fn input_lines(form: &TodoForm, field: FormField, input: &TextBuffer) -> Vec<Line<'static>> {
    let editing = form.field == field && form.mode == FormMode::Edit;
    let mut lines = input.styled_lines(theme::input(), theme::cursor(), editing);
    for line in &mut lines {
        line.spans.insert(0, Span::raw("    "));
    }
    lines
}

fn form_help(form: &TodoForm, keys: &Keybindings) -> String {
    let form_keys = &keys.form;
    match (form.mode, form.field) {
        (FormMode::Edit, _) => format!(
            "typing • {}/{} done",
            keys.editor.new_line, form_keys.cancel
        ),
        (FormMode::Navigate, FormField::Prompts) => format!(
            "{} edit • {} add • {} delete • {} improve • {} save • {} cancel",
            form_keys.edit_prompt,
            form_keys.add_prompt,
            form_keys.delete_prompt,
            form_keys.improve_prompt,
            form_keys.submit,
            form_keys.cancel
        ),
        (FormMode::Navigate, _) => format!(
            "{} edit field • {}/{} field • {} save • {} cancel",
            keys.editor.new_line,
            form_keys.next_field,
            form_keys.prev_field,
            form_keys.submit,
            form_keys.cancel
        ),
    }
}

pub(super) fn draw_form(frame: &mut Frame<'_>, area: Rect, form: &TodoForm, keys: &Keybindings) {
    let mut title = vec![Span::styled(
        if form.is_edit() { "Edit TODO" } else { "Create TODO" },
        theme::title(),
    )];
    if form.mode == FormMode::Edit {
        title.push(Span::styled(" [EDITING]", theme::prompt()));
    }
    let mut lines = vec![
        Line::from(title),
        Line::styled("─".repeat(41), theme::help()),
        Line::from(""),
    ];

    lines.push(field_label(form, FormField::Branch, "Branch"));
    lines.extend(input_lines(form, FormField::Branch, &form.branch));
    lines.push(Line::from(""));
    lines.push(field_label(form, FormField::Name, "Name"));
    lines.extend(input_lines(form, FormField::Name, &form.name));
    lines.push(Line::from(""));
    lines.push(field_label(form, FormField::Description, "Description"));
    lines.extend(input_lines(form, FormField::Description, &form.description));
    lines.push(Line::from(""));
    lines.push(field_label(form, FormField::Prompts, "Prompts"));

    let prompts_focused = form.field == FormField::Prompts;
    for (index, prompt) in form.prompts.iter().enumerate() {
        let flattened = prompt.replace('\n', " ");
        let preview = if flattened.trim().is_empty() {
            "(empty)".to_string()
        } else {
            ellipsize(&flattened, PROMPT_PREVIEW)
        };
        let current = prompts_focused && index == form.prompt_index;
        let marker = if current { "  ▸ " } else { "    " };
        let style = if current { theme::selected() } else { theme::item() };
        let mut spans = vec![
            Span::styled(marker, theme::cursor()),
            Span::styled(format!("{}. {preview}", index + 1), style),
        ];
        if form.improving == Some(index) {
            spans.push(Span::styled(" improving...", theme::prompt()));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(form_help(form, keys), theme::help()));
    frame.render_widget(Paragraph::new(lines), area);
}
