use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::format::truncate_unicode;
use crate::system::process::{ProcessRow, SortColumn, TableSort};
use crate::ui::theme::Theme;

const COLUMNS: [SortColumn; 4] = [
    SortColumn::Pid,
    SortColumn::Name,
    SortColumn::Cpu,
    SortColumn::Memory,
];

const NAME_WIDTH: usize = 40;

/// Column title with the sort arrow on the active column.
pub fn header_label(column: SortColumn, sort: TableSort) -> String {
    if column != sort.column {
        return column.label().to_string();
    }
    let arrow = if sort.descending { '\u{25bc}' } else { '\u{25b2}' };
    format!("{} {arrow}", column.label())
}

pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: &[ProcessRow],
    selected: Option<usize>,
    sort: TableSort,
    theme: &Theme,
) {
    let header = Row::new(COLUMNS.map(|column| {
        let style = if column == sort.column {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_secondary)
        };
        Cell::from(header_label(column, sort)).style(style)
    }));

    let body = rows.iter().map(|row| {
        Row::new([
            Cell::from(row.pid.to_string()),
            Cell::from(truncate_unicode(&row.name, NAME_WIDTH)),
            Cell::from(format!("{:.1}", row.cpu_percent)),
            Cell::from(format!("{:.1}", row.mem_percent)),
        ])
        .style(Style::default().fg(theme.text_primary))
    });

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            format!(" Top {} processes ", rows.len()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let table = Table::new(
        body,
        [
            Constraint::Length(9),
            Constraint::Min(16),
            Constraint::Length(9),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("\u{25b6} ");

    let mut state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut state);
}
