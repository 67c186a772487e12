//! User-configurable keybindings stored as `keybindings.json` in the data dir.
//!
//! Bindings are key strings such as `esc`, `ctrl+u`, `shift+tab` or `G`
//! (see [`crate::ui::keys::key_string`] for how key events are rendered).

use serde::{Deserialize, Serialize};

use crate::modal::ModalAction;
use crate::store::{Store, StoreError};

pub const KEYBINDINGS_FILE: &str = "keybindings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keybindings {
    pub global: GlobalKeys,
    pub list: ListKeys,
    pub form: FormKeys,
    pub editor: EditorKeys,
    pub detail: DetailKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeys {
    pub quit: String,
    pub quit_alt: String,
    pub help: String,
    pub move_up: String,
    pub move_down: String,
    pub move_up_alt: String,
    pub move_down_alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListKeys {
    pub select: String,
    pub new: String,
    pub delete: String,
    pub edit: String,
    pub top: String,
    pub bottom: String,
    pub page_up: String,
    pub page_down: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormKeys {
    pub submit: String,
    pub cancel: String,
    pub next_field: String,
    pub prev_field: String,
    pub add_prompt: String,
    pub delete_prompt: String,
    pub edit_prompt: String,
    pub improve_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorKeys {
    pub save: String,
    pub cancel: String,
    pub line_start: String,
    pub line_end: String,
    pub delete_line: String,
    pub new_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailKeys {
    pub back: String,
    pub edit: String,
    pub delete: String,
    pub scroll_up: String,
    pub scroll_down: String,
}

impl Default for GlobalKeys {
    fn default() -> Self {
        Self {
            quit: "esc".into(),
            quit_alt: "q".into(),
            help: "?".into(),
            move_up: "k".into(),
            move_down: "j".into(),
            move_up_alt: "up".into(),
            move_down_alt: "down".into(),
        }
    }
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            select: "enter".into(),
            new: "n".into(),
            delete: "d".into(),
            edit: "e".into(),
            top: "g".into(),
            bottom: "G".into(),
            page_up: "ctrl+u".into(),
            page_down: "ctrl+d".into(),
        }
    }
}

impl Default for FormKeys {
    fn default() -> Self {
        Self {
            submit: "ctrl+s".into(),
            cancel: "esc".into(),
            next_field: "tab".into(),
            prev_field: "shift+tab".into(),
            add_prompt: "ctrl+a".into(),
            delete_prompt: "ctrl+d".into(),
            edit_prompt: "ctrl+e".into(),
            // ctrl+i arrives as tab on most terminals.
            improve_prompt: "ctrl+r".into(),
        }
    }
}

impl Default for EditorKeys {
    fn default() -> Self {
        Self {
            save: "ctrl+s".into(),
            cancel: "esc".into(),
            line_start: "ctrl+a".into(),
            line_end: "ctrl+e".into(),
            delete_line: "ctrl+k".into(),
            new_line: "enter".into(),
        }
    }
}

impl Default for DetailKeys {
    fn default() -> Self {
        Self {
            back: "esc".into(),
            edit: "e".into(),
            delete: "d".into(),
            scroll_up: "k".into(),
            scroll_down: "j".into(),
        }
    }
}

/// Replace empty fields of `$target` with the matching field of `$defaults`.
macro_rules! fill_empty {
    ($target:expr, $defaults:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if $target.$field.trim().is_empty() {
                $target.$field = $defaults.$field.clone();
            }
        )+
    };
}

impl Keybindings {
    /// Load from the store, writing defaults when the file does not exist yet.
    pub fn load(store: &Store) -> Result<Self, StoreError> {
        match store.read_json::<Keybindings>(KEYBINDINGS_FILE) {
            Ok(bindings) => Ok(bindings.merged_with_defaults()),
            Err(StoreError::NotFound) => {
                let bindings = Keybindings::default();
                bindings.save(store)?;
                Ok(bindings)
            }
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, store: &Store) -> Result<(), StoreError> {
        store.write_json(KEYBINDINGS_FILE, self)
    }

    /// Fill every empty binding from the defaults.
    pub fn merged_with_defaults(mut self) -> Self {
        let defaults = Keybindings::default();
        fill_empty!(
            self.global,
            defaults.global,
            [quit, quit_alt, help, move_up, move_down, move_up_alt, move_down_alt]
        );
        fill_empty!(
            self.list,
            defaults.list,
            [select, new, delete, edit, top, bottom, page_up, page_down]
        );
        fill_empty!(
            self.form,
            defaults.form,
            [
                submit,
                cancel,
                next_field,
                prev_field,
                add_prompt,
                delete_prompt,
                edit_prompt,
                improve_prompt
            ]
        );
        fill_empty!(
            self.editor,
            defaults.editor,
            [save, cancel, line_start, line_end, delete_line, new_line]
        );
        fill_empty!(
            self.detail,
            defaults.detail,
            [back, edit, delete, scroll_up, scroll_down]
        );
        self
    }

    pub fn is_quit(&self, key: &str) -> bool {
        matches_any(key, &[self.global.quit.as_str(), self.global.quit_alt.as_str()])
    }

    pub fn is_move_up(&self, key: &str) -> bool {
        matches_any(key, &[self.global.move_up.as_str(), self.global.move_up_alt.as_str()])
    }

    pub fn is_move_down(&self, key: &str) -> bool {
        matches_any(key, &[self.global.move_down.as_str(), self.global.move_down_alt.as_str()])
    }

    /// Resolve a key string to a modal command.
    pub fn modal_action(&self, key: &str) -> Option<ModalAction> {
        if self.is_quit(key) {
            Some(ModalAction::Close)
        } else if self.is_move_up(key) {
            Some(ModalAction::ScrollUp)
        } else if self.is_move_down(key) {
            Some(ModalAction::ScrollDown)
        } else if matches_any(key, &[self.list.page_up.as_str(), "pgup"]) {
            Some(ModalAction::PageUp)
        } else if matches_any(key, &[self.list.page_down.as_str(), "pgdown"]) {
            Some(ModalAction::PageDown)
        } else if matches_any(key, &[self.list.top.as_str(), "home"]) {
            Some(ModalAction::Top)
        } else if matches_any(key, &[self.list.bottom.as_str(), "end"]) {
            Some(ModalAction::Bottom)
        } else {
            None
        }
    }

    /// One-line key hint for the modal footer.
    pub fn modal_hint(&self) -> String {
        format!(
            "{}/{} scroll • {}/{} page • {}/{} top/bottom • {} close",
            self.global.move_up,
            self.global.move_down,
            self.list.page_up,
            self.list.page_down,
            self.list.top,
            self.list.bottom,
            self.global.quit
        )
    }
}

/// `shift+<lowercase letter>` is the same key as the uppercase letter.
pub fn normalize_binding(binding: &str) -> String {
    if let Some(rest) = binding.strip_prefix("shift+") {
        let mut chars = rest.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_lowercase() {
                return ch.to_ascii_uppercase().to_string();
            }
        }
    }
    binding.to_string()
}

pub fn matches(key: &str, binding: &str) -> bool {
    !binding.is_empty() && (key == binding || normalize_binding(key) == normalize_binding(binding))
}

pub fn matches_any(key: &str, bindings: &[&str]) -> bool {
    bindings.iter().any(|binding| matches(key, binding))
}
