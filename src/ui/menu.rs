//! Main menu: entry points into the other views plus the repository summary.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::app::RepoInfo;
use super::theme;
use crate::config::{matches_any, Keybindings};
use crate::modal::render::centered;

const BANNER: [&str; 3] = [
    "┌┬┐┌─┐┬  ┬┌┬┐┌─┐┌─┐┬┌─",
    " ││├┤ └┐┌┘ ││├┤ │  ├┴┐",
    "─┴┘└─┘ └┘ ─┴┘└─┘└─┘┴ ┴",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Branches,
    PullRequests,
    ClaudeSessions,
    Todos,
    SmartCommit,
    TerminalTest,
    Settings,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 8] = [
        MenuItem::Branches,
        MenuItem::PullRequests,
        MenuItem::ClaudeSessions,
        MenuItem::Todos,
        MenuItem::SmartCommit,
        MenuItem::TerminalTest,
        MenuItem::Settings,
        MenuItem::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Branches => "Branches",
            MenuItem::PullRequests => "Pull Requests",
            MenuItem::ClaudeSessions => "Claude Sessions",
            MenuItem::Todos => "TODOs",
            MenuItem::SmartCommit => "Smart Commit",
            MenuItem::TerminalTest => "Terminal Test",
            MenuItem::Settings => "Settings",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn needs_repo(self) -> bool {
        matches!(
            self,
            MenuItem::Todos | MenuItem::SmartCommit | MenuItem::TerminalTest
        )
    }

    pub fn is_placeholder(self) -> bool {
        matches!(
            self,
            MenuItem::Branches
                | MenuItem::PullRequests
                | MenuItem::ClaudeSessions
                | MenuItem::Settings
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    None,
    Open(MenuItem),
    Quit,
}

#[derive(Debug, Default)]
pub struct MainMenu {
    cursor: usize,
    notice: Option<String>,
}

impl MainMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> MenuItem {
        MenuItem::ALL[self.cursor]
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn handle_key(&mut self, key: &str, keys: &Keybindings) -> MenuOutcome {
        self.notice = None;
        if key == "ctrl+c" || keys.is_quit(key) {
            return MenuOutcome::Quit;
        }
        if keys.is_move_up(key) {
            self.cursor = self.cursor.saturating_sub(1);
        } else if keys.is_move_down(key) {
            self.cursor = (self.cursor + 1).min(MenuItem::ALL.len() - 1);
        } else if matches_any(key, &[keys.list.select.as_str(), "space"]) {
            return match self.selected() {
                MenuItem::Quit => MenuOutcome::Quit,
                item => MenuOutcome::Open(item),
            };
        }
        MenuOutcome::None
    }
}

/// `just now`, `N minutes ago`, `N hours ago`, `yesterday`, `N days ago`,
/// then the calendar date.
pub fn format_time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();
    if minutes < 1 {
        "just now".to_string()
    } else if hours < 1 {
        plural(minutes, "minute")
    } else if days < 1 {
        plural(hours, "hour")
    } else if days == 1 {
        "yesterday".to_string()
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        then.format("%b %-d, %Y").to_string()
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

fn repo_lines(repo: Option<&RepoInfo>, now: DateTime<Utc>) -> Vec<Line<'static>> {
    let Some(info) = repo else {
        return vec![
            Line::styled("Not in a git repository", theme::help()),
            Line::from(""),
        ];
    };
    let mut first = vec![
        Span::styled(info.repo.name.clone(), theme::title()),
        Span::styled(format!("  {}", info.repo.branch), theme::branch()),
    ];
    let mut status = Vec::new();
    if info.behind > 0 {
        status.push(format!("↓{}", info.behind));
    }
    if info.ahead > 0 {
        status.push(format!("↑{}", info.ahead));
    }
    if info.has_changes {
        status.push("●".to_string());
    }
    if !status.is_empty() {
        first.push(Span::styled(format!("  {}", status.join(" ")), theme::status()));
    }
    let mut lines = vec![Line::from(first)];
    if let Some(state) = &info.last_opened {
        lines.push(Line::styled(
            format!(
                "Last opened: {}",
                format_time_ago(state.last_opened_at, now)
            ),
            theme::help(),
        ));
    }
    lines.push(Line::from(""));
    lines
}

pub fn draw_menu(
    frame: &mut Frame<'_>,
    area: Rect,
    menu: &MainMenu,
    repo: Option<&RepoInfo>,
    keys: &Keybindings,
) {
    let mut lines: Vec<Line> = BANNER
        .iter()
        .map(|row| Line::styled(*row, theme::banner()))
        .collect();
    lines.push(Line::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        theme::help(),
    ));
    lines.push(Line::from(""));
    lines.extend(repo_lines(repo, Utc::now()));
    lines.push(Line::styled("What would you like to do?", theme::title()));
    lines.push(Line::from(""));

    for (index, item) in MenuItem::ALL.iter().enumerate() {
        let line = if index == menu.cursor() {
            Line::from(vec![
                Span::styled("▸ ", theme::cursor()),
                Span::styled(item.label(), theme::selected()),
            ])
        } else {
            Line::styled(format!("  {}", item.label()), theme::item())
        };
        lines.push(line);
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!(
            "↑/{} up • ↓/{} down • {} select • {} quit",
            keys.global.move_up, keys.global.move_down, keys.list.select, keys.global.quit_alt
        ),
        theme::help(),
    ));
    if let Some(notice) = menu.notice() {
        lines.push(Line::from(""));
        lines.push(Line::styled(notice.to_string(), theme::confirm()));
    }

    let width = lines.iter().map(Line::width).max().unwrap_or(0) as u16;
    let height = lines.len() as u16;
    let target = centered(area, width.max(1), height);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), target);
}
