//! Read-only view of one todo and the delete confirmation dialog.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use super::{FormPage, Overlay, Page, TodoForm, TodoScreen};
use crate::config::{matches, matches_any, Keybindings};
use crate::modal::render::centered;
use crate::todo::Todo;
use crate::ui::theme;

const DETAIL_CHROME_ROWS: usize = 8;
const MIN_VISIBLE_ROWS: usize = 5;
const PAGE_ROWS: usize = 10;

pub(super) fn detail_lines(todo: &Todo) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Name:        ", theme::label()),
            Span::styled(todo.name.clone(), theme::item()),
        ]),
        Line::from(vec![
            Span::styled("Branch:      ", theme::label()),
            Span::styled(todo.branch.clone(), theme::branch()),
        ]),
        Line::from(""),
        Line::styled("Description:", theme::label()),
    ];
    if todo.description.trim().is_empty() {
        lines.push(Line::styled("  (no description)", theme::help()));
    } else {
        lines.extend(
            todo.description
                .lines()
                .map(|line| Line::styled(format!("  {line}"), theme::item())),
        );
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!("Prompts ({}):", todo.prompts.len()),
        theme::label(),
    ));
    for (index, prompt) in todo.prompts.iter().enumerate() {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("─── Prompt {} ───", index + 1),
            theme::prompt(),
        ));
        lines.extend(
            prompt
                .lines()
                .map(|line| Line::styled(format!("  {line}"), theme::item())),
        );
    }
    lines
}

fn max_scroll(todo: &Todo, height: u16) -> usize {
    let visible = usize::from(height)
        .saturating_sub(DETAIL_CHROME_ROWS)
        .max(MIN_VISIBLE_ROWS);
    detail_lines(todo).len().saturating_sub(visible)
}

impl TodoScreen {
    pub(super) fn detail_key(
        &mut self,
        todo: Todo,
        scroll: usize,
        key: &str,
        keys: &Keybindings,
        height: u16,
    ) -> Page {
        if keys.is_quit(key) || matches(key, &keys.detail.back) {
            return Page::List;
        }
        if matches(key, &keys.detail.edit) {
            return Page::Form(Box::new(FormPage {
                form: TodoForm::edit(&todo),
                overlay: Overlay::None,
            }));
        }
        if matches(key, &keys.detail.delete) {
            return Page::DeleteConfirm { target: todo };
        }

        let max = max_scroll(&todo, height);
        let scroll = if matches(key, &keys.detail.scroll_up) || keys.is_move_up(key) {
            scroll.saturating_sub(1)
        } else if matches(key, &keys.detail.scroll_down) || keys.is_move_down(key) {
            scroll + 1
        } else if matches_any(key, &[keys.list.top.as_str(), "home"]) {
            0
        } else if matches_any(key, &[keys.list.bottom.as_str(), "end"]) {
            max
        } else if matches_any(key, &[keys.list.page_up.as_str(), "pgup"]) {
            scroll.saturating_sub(PAGE_ROWS)
        } else if matches_any(key, &[keys.list.page_down.as_str(), "pgdown"]) {
            scroll + PAGE_ROWS
        } else {
            scroll
        };
        Page::Detail {
            todo,
            scroll: scroll.min(max),
        }
    }
}

pub(super) fn draw_detail(
    frame: &mut Frame<'_>,
    area: Rect,
    todo: &Todo,
    scroll: usize,
    keys: &Keybindings,
) {
    let header = vec![
        Line::styled("TODO Details", theme::title()),
        Line::styled("─".repeat(41), theme::help()),
    ];
    let header_rows = header.len() as u16 + 1;
    frame.render_widget(Paragraph::new(header), Rect { height: header_rows.min(area.height), ..area });

    let body = Rect {
        y: area.y + header_rows.min(area.height),
        height: area.height.saturating_sub(header_rows + 2),
        ..area
    };
    frame.render_widget(
        Paragraph::new(detail_lines(todo)).scroll((scroll.min(usize::from(u16::MAX)) as u16, 0)),
        body,
    );

    let help = format!(
        "{}/{} scroll • {} edit • {} delete • {} back",
        keys.detail.scroll_up, keys.detail.scroll_down, keys.detail.edit, keys.detail.delete,
        keys.detail.back
    );
    if area.height > 0 {
        let row = Rect {
            y: area.y + area.height - 1,
            height: 1,
            ..area
        };
        frame.render_widget(Paragraph::new(Line::styled(help, theme::help())), row);
    }
}

pub(super) fn draw_delete_confirm(frame: &mut Frame<'_>, area: Rect, target: &Todo) {
    let dialog = centered(area, 50, 9);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::RED));
    let lines = vec![
        Line::styled("Delete TODO?", theme::error()),
        Line::from(""),
        Line::styled(target.name.clone(), theme::item()),
        Line::styled(format!("on {}", target.branch), theme::branch()),
        Line::from(""),
        Line::styled("y confirm • n cancel", theme::confirm()),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}
