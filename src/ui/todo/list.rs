use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::{FormPage, ListState, Overlay, Page, TodoForm, TodoScreen};
use crate::config::{matches, Keybindings};
use crate::ui::{app::Transition, theme};
use crate::utf8_safe::ellipsize;

/// Rows taken by a card including its trailing gap.
const CARD_ROWS: usize = 5;
/// Rows of header, help and padding around the cards.
const LIST_CHROME_ROWS: usize = 10;
const DESCRIPTION_PREVIEW: usize = 40;

/// Cards that fit on a screen of `height` rows; at least one.
pub(super) fn visible_cards(height: u16) -> usize {
    (usize::from(height).saturating_sub(LIST_CHROME_ROWS) / CARD_ROWS).max(1)
}

impl ListState {
    fn last(len: usize) -> usize {
        len.saturating_sub(1)
    }

    fn follow_cursor(&mut self, visible: usize) {
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        } else if self.cursor >= self.scroll + visible {
            self.scroll = self.cursor + 1 - visible;
        }
    }

    pub fn up(&mut self, visible: usize) {
        self.cursor = self.cursor.saturating_sub(1);
        self.follow_cursor(visible);
    }

    pub fn down(&mut self, len: usize, visible: usize) {
        self.cursor = (self.cursor + 1).min(Self::last(len));
        self.follow_cursor(visible);
    }

    pub fn top(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
    }

    pub fn bottom(&mut self, len: usize, visible: usize) {
        self.cursor = Self::last(len);
        self.follow_cursor(visible);
    }

    pub fn page_up(&mut self, visible: usize) {
        self.cursor = self.cursor.saturating_sub(visible);
        self.scroll = self.scroll.saturating_sub(visible);
        self.follow_cursor(visible);
    }

    pub fn page_down(&mut self, len: usize, visible: usize) {
        self.cursor = (self.cursor + visible).min(Self::last(len));
        self.follow_cursor(visible);
    }
}

impl TodoScreen {
    pub(super) fn list_key(&mut self, key: &str, keys: &Keybindings, height: u16) -> (Page, Transition) {
        let visible = visible_cards(height);
        let len = self.todos.len();
        if keys.is_quit(key) {
            return (Page::List, Transition::ToMenu);
        }
        if keys.is_move_up(key) {
            self.list.up(visible);
        } else if keys.is_move_down(key) {
            self.list.down(len, visible);
        } else if matches(key, &keys.list.top) {
            self.list.top();
        } else if matches(key, &keys.list.bottom) {
            self.list.bottom(len, visible);
        } else if matches(key, &keys.list.page_up) {
            self.list.page_up(visible);
        } else if matches(key, &keys.list.page_down) {
            self.list.page_down(len, visible);
        } else if matches(key, &keys.list.new) {
            return (form_page(TodoForm::create(&self.branch)), Transition::Stay);
        } else if let Some(todo) = self.todos.get(self.list.cursor) {
            if matches(key, &keys.list.select) {
                let page = Page::Detail {
                    todo: todo.clone(),
                    scroll: 0,
                };
                return (page, Transition::Stay);
            }
            if matches(key, &keys.list.edit) {
                return (form_page(TodoForm::edit(todo)), Transition::Stay);
            }
            if matches(key, &keys.list.delete) {
                let page = Page::DeleteConfirm {
                    target: todo.clone(),
                };
                return (page, Transition::Stay);
            }
        }
        (Page::List, Transition::Stay)
    }

    pub(super) fn draw_list(&self, frame: &mut Frame<'_>, area: Rect, keys: &Keybindings) {
        let mut lines = Vec::new();
        let mut header = vec![Span::styled("TODOs", theme::title())];
        if !self.todos.is_empty() {
            header.push(Span::styled(format!(" ({})", self.todos.len()), theme::help()));
        }
        lines.push(Line::from(header));
        lines.push(Line::styled("─".repeat(41), theme::help()));
        lines.push(Line::from(""));

        if self.todos.is_empty() {
            lines.extend(empty_state(keys));
        } else {
            lines.extend(self.cards(visible_cards(frame.size().height)));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!(
                "↑/{} ↓/{} navigate • {}/{} top/bottom • {}/{} page",
                keys.global.move_up,
                keys.global.move_down,
                keys.list.top,
                keys.list.bottom,
                keys.list.page_up,
                keys.list.page_down
            ),
            theme::help(),
        ));
        lines.push(Line::styled(
            format!(
                "{} open • {} edit • {} new • {} delete • {} back",
                keys.list.select, keys.list.edit, keys.list.new, keys.list.delete, keys.global.quit
            ),
            theme::help(),
        ));
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn cards(&self, visible: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let start = self.list.scroll.min(self.todos.len());
        let end = (start + visible).min(self.todos.len());
        if start > 0 {
            lines.push(Line::styled("  ↑ more above", theme::help()));
            lines.push(Line::from(""));
        }
        for (index, todo) in self.todos[start..end].iter().enumerate().map(|(i, t)| (start + i, t)) {
            let selected = index == self.list.cursor;
            let title = if selected {
                Line::from(vec![
                    Span::styled("▸ ", theme::cursor()),
                    Span::styled(format!("┌─ {}", todo.name), theme::selected()),
                ])
            } else {
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled("┌─ ", theme::help()),
                    Span::styled(todo.name.clone(), theme::item()),
                ])
            };
            lines.push(title);

            let count = todo.prompts.len();
            let noun = if count == 1 { "prompt" } else { "prompts" };
            lines.push(Line::from(vec![
                Span::styled("  │  ", theme::help()),
                Span::styled(format!(" {}", todo.branch), theme::branch()),
                Span::styled(format!("  •  {count} {noun}"), theme::help()),
            ]));
            let description = todo.first_description_line();
            if !description.is_empty() {
                lines.push(Line::styled(
                    format!("  │  {}", ellipsize(description, DESCRIPTION_PREVIEW)),
                    theme::help(),
                ));
            }
            lines.push(Line::styled("  └───", theme::help()));
            if index + 1 < end {
                lines.push(Line::from(""));
            }
        }
        if end < self.todos.len() {
            lines.push(Line::from(""));
            lines.push(Line::styled("  ↓ more below", theme::help()));
        }
        lines
    }
}

fn form_page(form: TodoForm) -> Page {
    Page::Form(Box::new(FormPage {
        form,
        overlay: Overlay::None,
    }))
}

fn empty_state(keys: &Keybindings) -> Vec<Line<'static>> {
    vec![
        Line::styled("  ┌─────────────────────────────────┐", theme::help()),
        Line::from(vec![
            Span::styled("  │  ", theme::help()),
            Span::styled("No TODOs yet!", theme::item()),
        ]),
        Line::from(vec![
            Span::styled("  │  Press ", theme::help()),
            Span::styled(keys.list.new.clone(), theme::selected()),
            Span::styled(" to create your first", theme::help()),
        ]),
        Line::styled("  └─────────────────────────────────┘", theme::help()),
    ]
}
