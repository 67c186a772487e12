use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph},
    Frame,
};

use super::{LineKind, ModalGeometry, TerminalModal};
use crate::ui::theme;
use crate::utf8_safe::truncate_to_width;

/// Center a rect of the given size inside `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn line_style(kind: LineKind) -> Style {
    match kind {
        LineKind::Command => Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
        LineKind::Output | LineKind::Blank => Style::default().fg(theme::WHITE),
        LineKind::Success => Style::default().fg(theme::GREEN),
        LineKind::Failure => Style::default().fg(theme::RED),
    }
}

fn status_span<S>(modal: &TerminalModal<S>) -> Span<'static> {
    if modal.is_running() {
        Span::styled("● Running...", Style::default().fg(theme::ORANGE))
    } else if modal.exit_error().is_some() {
        Span::styled("✗ Failed", Style::default().fg(theme::RED))
    } else {
        Span::styled("✓ Done", Style::default().fg(theme::GREEN))
    }
}

/// Draw the modal centered over whatever is already in the frame.
pub fn draw_modal<S>(frame: &mut Frame<'_>, modal: &TerminalModal<S>, hint: &str) {
    let screen = frame.size();
    let ModalGeometry { width, height } = modal.geometry();
    let area = centered(screen, width, height);
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::PURPLE))
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);
    let content_width = usize::from(inner.width);
    let rule = Line::styled("─".repeat(content_width), theme::help());

    let header = Line::from(vec![
        Span::styled(
            truncate_to_width(modal.title(), content_width.saturating_sub(16)),
            theme::banner(),
        ),
        Span::raw("  "),
        status_span(modal),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);
    frame.render_widget(Paragraph::new(rule.clone()), rows[1]);

    let viewport = modal.viewport();
    let body: Vec<Line> = modal
        .display()
        .window(viewport.offset(), usize::from(rows[2].height))
        .iter()
        .map(|line| {
            Line::styled(
                truncate_to_width(&line.text.replace('\t', "    "), content_width),
                line_style(line.kind),
            )
        })
        .collect();
    frame.render_widget(Paragraph::new(body), rows[2]);
    frame.render_widget(Paragraph::new(rule), rows[3]);

    let total = viewport.line_count();
    let position = if total == 0 {
        "0/0".to_string()
    } else {
        format!("{}/{}", viewport.offset() + 1, total)
    };
    let mut footer = vec![Span::styled(position, theme::help())];
    if !viewport.auto_scroll() && modal.is_running() {
        footer.push(Span::styled("  (paused)", theme::status()));
    }
    footer.push(Span::styled(format!("  │  {hint}"), theme::help()));
    frame.render_widget(Paragraph::new(Line::from(footer)), rows[4]);
}
