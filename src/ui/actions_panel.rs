use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::app::{ActionLog, ResolvedKeybinds, key_label};
use crate::system::maintenance::PowerMode;
use crate::ui::theme::Theme;

pub struct ActionsView<'a> {
    pub power_mode: PowerMode,
    pub keybinds: &'a ResolvedKeybinds,
    pub log: &'a ActionLog,
    pub power_pending: bool,
    pub ram_pending: bool,
    pub storage_pending: bool,
}

pub fn render(frame: &mut Frame, area: Rect, view: &ActionsView<'_>, theme: &Theme) {
    let [controls, log_area] =
        Layout::horizontal([Constraint::Length(36), Constraint::Min(20)]).areas(area);
    let [power_area, cache_area] =
        Layout::vertical([Constraint::Length(7), Constraint::Min(4)]).areas(controls);

    render_power(frame, power_area, view, theme);
    render_cache(frame, cache_area, view, theme);
    render_log(frame, log_area, view.log, theme);
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            title,
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ))
}

fn pending_span(pending: bool, theme: &Theme) -> Span<'static> {
    if pending {
        Span::styled(" (running)", Style::default().fg(theme.accent))
    } else {
        Span::raw("")
    }
}

fn render_power(frame: &mut Frame, area: Rect, view: &ActionsView<'_>, theme: &Theme) {
    let mut lines: Vec<Line> = PowerMode::ALL
        .iter()
        .map(|&mode| {
            if mode == view.power_mode {
                Line::from(Span::styled(
                    format!("\u{25b6} {mode}"),
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::styled(format!("  {mode}"), Style::default().fg(theme.text_primary))
            }
        })
        .collect();
    lines.push(Line::default());
    lines.push(Line::from(vec![
        Span::styled(
            format!("[{}] Apply", key_label(view.keybinds.apply)),
            Style::default().fg(theme.text_secondary),
        ),
        pending_span(view.power_pending, theme),
    ]));

    frame.render_widget(Paragraph::new(lines).block(panel(" Power Mode ", theme)), area);
}

fn render_cache(frame: &mut Frame, area: Rect, view: &ActionsView<'_>, theme: &Theme) {
    let key_style = Style::default()
        .fg(theme.pill_key_fg)
        .bg(theme.pill_key_bg)
        .add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(theme.text_primary);
    let lines = vec![
        Line::from(vec![
            Span::styled(format!(" {} ", key_label(view.keybinds.clear_ram)), key_style),
            Span::styled(" Clear RAM cache", text_style),
            pending_span(view.ram_pending, theme),
        ]),
        Line::from(vec![
            Span::styled(format!(" {} ", key_label(view.keybinds.clear_storage)), key_style),
            Span::styled(" Clear storage cache", text_style),
            pending_span(view.storage_pending, theme),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel(" Cache ", theme)), area);
}

fn render_log(frame: &mut Frame, area: Rect, log: &ActionLog, theme: &Theme) {
    let block = panel(" Action Log ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if log.is_empty() {
        frame.render_widget(
            Paragraph::new("No actions yet").style(Style::default().fg(theme.text_secondary)),
            inner,
        );
        return;
    }

    // newest stays visible at the bottom
    let visible = inner.height as usize;
    let lines: Vec<Line> = log
        .iter()
        .skip(log.len().saturating_sub(visible))
        .map(|entry| Line::styled(entry.to_string(), Style::default().fg(theme.text_primary)))
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}
