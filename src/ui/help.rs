use ratatui::Frame;
use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::{HelpSection, Tab};
use crate::ui::theme::Theme;

const KEY_WIDTH: usize = 8;

/// Keybind overlay, one group per section. The group for the tab the user
/// is on is marked so its keys are easy to find.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    sections: &[HelpSection],
    current: Tab,
    theme: &Theme,
) {
    let lines = help_lines(sections, current, theme);

    let width = 48u16.min(area.width.saturating_sub(4));
    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let overlay = centered_rect(width, height, area);
    frame.render_widget(Clear, overlay);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Keybinds ",
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(
            Line::styled(" Esc to close ", Style::default().fg(theme.text_secondary))
                .right_aligned(),
        );
    let inner = block.inner(overlay);

    frame.render_widget(block, overlay);
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.surface_bg)),
        inner,
    );
}

fn help_lines<'a>(sections: &'a [HelpSection], current: Tab, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        let active = section.title == current.title();
        let (marker, color) = if active {
            ("\u{25b8} ", theme.accent)
        } else {
            ("  ", theme.text_secondary)
        };
        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(theme.accent)),
            Span::styled(
                section.title,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ]));

        for (key, desc) in &section.entries {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    format!(" {key:>KEY_WIDTH$} "),
                    Style::default()
                        .fg(theme.pill_key_fg)
                        .bg(theme.pill_key_bg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {desc}"), Style::default().fg(theme.pill_desc_fg)),
            ]));
        }
    }
    lines
}

pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let [vert] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [horiz] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(vert);
    horiz
}
