use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{InputMode, ResolvedKeybinds, StatusMessage, Tab, key_label};
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    tab: Tab,
    input_mode: &InputMode,
    status_message: Option<&StatusMessage>,
    keybinds: &ResolvedKeybinds,
    theme: &Theme,
) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    // Status message takes priority
    if let Some(status) = status_message {
        let color = if status.ok {
            theme.status_ok
        } else {
            theme.status_err
        };
        let line = Line::from(Span::styled(
            format!(" {}", status.text),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(Paragraph::new(line).style(bg_style), area);
        return;
    }

    let mut spans = Vec::new();
    match input_mode {
        InputMode::ConfirmKill { .. } => {
            spans.extend(pill_spans("y".to_string(), "Confirm", theme));
            spans.extend(pill_spans("n".to_string(), "Cancel", theme));
        }
        InputMode::Help => {
            spans.extend(pill_spans("Esc".to_string(), "Close help", theme));
        }
        InputMode::Normal => {
            spans.extend(pill_spans(key_label(keybinds.quit), "Quit", theme));
            spans.extend(pill_spans(key_label(keybinds.next_tab), "Tab", theme));
            match tab {
                Tab::Overview => {}
                Tab::Processes => {
                    spans.extend(pill_spans(key_label(keybinds.sort), "Sort", theme));
                    spans.extend(pill_spans(key_label(keybinds.reverse_sort), "Reverse", theme));
                    spans.extend(pill_spans(key_label(keybinds.kill), "Kill", theme));
                }
                Tab::Actions => {
                    spans.extend(pill_spans(key_label(keybinds.apply), "Apply", theme));
                    spans.extend(pill_spans(key_label(keybinds.clear_ram), "RAM", theme));
                    spans.extend(pill_spans(key_label(keybinds.clear_storage), "Storage", theme));
                }
            }
            spans.extend(pill_spans(key_label(keybinds.help), "Help", theme));
        }
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: String, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
