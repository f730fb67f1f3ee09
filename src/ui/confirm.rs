use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::ui::help::centered_rect;
use crate::ui::theme::Theme;

pub fn prompt(pid: u32, name: &str) -> String {
    format!("Are you sure you want to terminate process: {name} (PID: {pid})?")
}

/// Centered y/n prompt shown before a kill is queued.
pub fn render(frame: &mut Frame, area: Rect, pid: u32, name: &str, theme: &Theme) {
    let width = 72u16.min(area.width.saturating_sub(4));
    let height = 6u16.min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);

    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.status_err))
        .title(Span::styled(
            " Confirm Kill ",
            Style::default()
                .fg(theme.status_err)
                .add_modifier(Modifier::BOLD),
        ));

    let key_style = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::styled(prompt(pid, name), Style::default().fg(theme.text_primary)),
        Line::default(),
        Line::from(vec![
            Span::styled(" y ", key_style),
            Span::styled(" Yes   ", Style::default().fg(theme.pill_desc_fg)),
            Span::styled(" n ", key_style),
            Span::styled(" No", Style::default().fg(theme.pill_desc_fg)),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(theme.surface_bg)),
        overlay,
    );
}
