use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Axis, Block, BorderType, Borders, Chart, Dataset, Gauge, GraphType, Paragraph};

use crate::format::{format_uptime, format_used_total_gb};
use crate::sampler::{BatteryView, Dashboard, GaugeView};
use crate::system::history::RollingSeries;
use crate::ui::theme::Theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    dashboard: &Dashboard,
    cpu_history: &RollingSeries,
    ram_history: &RollingSeries,
    theme: &Theme,
) {
    let [charts, cards] = Layout::vertical([Constraint::Min(8), Constraint::Length(5)]).areas(area);
    let [cpu_area, ram_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(charts);

    let cpu_title = format!(" CPU \u{00b7} {:.1}\u{00b0}C ", dashboard.cpu_temp_c);
    render_metric_card(
        frame,
        cpu_area,
        &cpu_title,
        dashboard.cpu,
        format!("{:.1}%", dashboard.cpu.percent),
        cpu_history,
        theme.cpu_line,
        theme,
    );
    render_metric_card(
        frame,
        ram_area,
        " RAM ",
        dashboard.memory,
        format!(
            "{} ({:.1}%)",
            format_used_total_gb(dashboard.memory_used, dashboard.memory_total),
            dashboard.memory.percent
        ),
        ram_history,
        theme.ram_line,
        theme,
    );

    let [disk_area, net_area, battery_area, uptime_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .areas(cards);

    render_disk(frame, disk_area, dashboard, theme);
    render_network(frame, net_area, dashboard, theme);
    render_battery(frame, battery_area, dashboard.battery.as_ref(), theme);
    render_uptime(frame, uptime_area, dashboard, theme);
}

fn card<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
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

fn band_gauge<'a>(view: GaugeView, label: String, theme: &Theme) -> Gauge<'a> {
    Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.band_color(view.band))
                .bg(theme.gauge_unfilled),
        )
        .ratio((view.percent / 100.0).clamp(0.0, 1.0))
        .label(label)
}

#[allow(clippy::too_many_arguments)]
fn render_metric_card(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    view: GaugeView,
    label: String,
    history: &RollingSeries,
    line_color: ratatui::style::Color,
    theme: &Theme,
) {
    let block = card(title, theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [gauge_area, chart_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(inner);
    frame.render_widget(band_gauge(view, label, theme), gauge_area);
    if chart_area.height < 3 || chart_area.width < 12 {
        return;
    }

    let points = history.chart_points();
    let [x_min, x_max] = history.x_bounds();
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(line_color))
        .data(&points);
    let axis_style = Style::default().fg(theme.text_secondary);
    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels([format!("{x_min:.0}"), format!("{x_max:.0}")]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([0.0, 100.0])
                .labels(["0", "50", "100"]),
        );
    frame.render_widget(chart, chart_area);
}

fn render_disk(frame: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let block = card(" Disk ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [usage, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(format_used_total_gb(dashboard.disk_used, dashboard.disk_total))
            .style(Style::default().fg(theme.text_primary)),
        usage,
    );
    frame.render_widget(
        band_gauge(dashboard.disk, format!("{:.1}%", dashboard.disk.percent), theme),
        gauge_area,
    );
}

fn render_network(frame: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let block = card(" Network ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_style = Style::default().fg(theme.text_primary);
    let mut lines = vec![
        Line::styled(format!("Sent: {:.2} MB", dashboard.network.sent_mb()), text_style),
        Line::styled(
            format!("Received: {:.2} MB", dashboard.network.received_mb()),
            text_style,
        ),
    ];
    if dashboard.network.counter_reset {
        lines.push(Line::styled(
            "counters reset",
            Style::default().fg(theme.status_err),
        ));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_battery(frame: &mut Frame, area: Rect, battery: Option<&BatteryView>, theme: &Theme) {
    let block = card(" Battery ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(battery) = battery else {
        frame.render_widget(
            Paragraph::new("No battery detected").style(Style::default().fg(theme.text_secondary)),
            inner,
        );
        return;
    };

    let [status, gauge_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(inner);
    frame.render_widget(
        Paragraph::new(format!("{} \u{00b7} {}", battery.status.label(), battery.time_label))
            .style(Style::default().fg(theme.text_primary)),
        status,
    );
    // Bar length is the charge; color is the depletion urgency.
    let gauge = Gauge::default()
        .gauge_style(
            Style::default()
                .fg(theme.band_color(battery.band))
                .bg(theme.gauge_unfilled),
        )
        .ratio((battery.percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{:.0}%", battery.percent));
    frame.render_widget(gauge, gauge_area);
}

fn render_uptime(frame: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
    let block = card(" System ", theme);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Uptime: ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                format_uptime(dashboard.uptime_secs),
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Samples: ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                dashboard.samples.to_string(),
                Style::default().fg(theme.text_primary),
            ),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}
