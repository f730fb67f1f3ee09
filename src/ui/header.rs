use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Tabs};

use crate::app::Tab;
use crate::format::format_uptime;
use crate::ui::theme::Theme;

/// Branding pill, tab strip and uptime on a single row.
pub fn render(frame: &mut Frame, area: Rect, active: Tab, uptime_secs: u64, theme: &Theme) {
    let [brand_area, tabs_area, uptime_area] = Layout::horizontal([
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(16),
    ])
    .areas(area);

    let brand = Span::styled(
        " lonitor ",
        Style::default()
            .fg(theme.tab_active_fg)
            .bg(theme.tab_active_bg)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Paragraph::new(Line::from(brand)), brand_area);

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(active.index())
        .style(Style::default().fg(theme.text_secondary))
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
        .divider(Span::styled("\u{2502}", Style::default().fg(theme.overlay_border)));
    frame.render_widget(tabs, tabs_area);

    let uptime = Line::from(vec![
        Span::styled("up ", Style::default().fg(theme.text_secondary)),
        Span::styled(
            format_uptime(uptime_secs),
            Style::default().fg(theme.text_primary),
        ),
    ])
    .right_aligned();
    frame.render_widget(Paragraph::new(uptime), uptime_area);
}
