pub mod actions_panel;
pub mod confirm;
pub mod header;
pub mod help;
pub mod overview;
pub mod processes;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::{App, InputMode, Tab};
use crate::sampler::MetricsSource;
use crate::system::maintenance::TaskSlot;

pub fn draw<S: MetricsSource>(frame: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let dashboard = app.dashboard();
    header::render(frame, chunks[0], app.tab, dashboard.uptime_secs, &app.theme);

    match app.tab {
        Tab::Overview => overview::render(
            frame,
            chunks[1],
            dashboard,
            app.sampler.cpu_history(),
            app.sampler.ram_history(),
            &app.theme,
        ),
        Tab::Processes => processes::render(
            frame,
            chunks[1],
            &app.rows,
            app.selected_index(),
            app.table_sort,
            &app.theme,
        ),
        Tab::Actions => {
            let view = actions_panel::ActionsView {
                power_mode: app.power_mode,
                keybinds: &app.keybinds,
                log: &app.action_log,
                power_pending: app.is_pending(TaskSlot::PowerMode),
                ram_pending: app.is_pending(TaskSlot::RamCache),
                storage_pending: app.is_pending(TaskSlot::StorageCache),
            };
            actions_panel::render(frame, chunks[1], &view, &app.theme);
        }
    }

    statusbar::render(
        frame,
        chunks[2],
        app.tab,
        &app.input_mode,
        app.status_message.as_ref(),
        &app.keybinds,
        &app.theme,
    );

    // Overlays last so they sit on top
    match &app.input_mode {
        InputMode::Help => help::render(
            frame,
            frame.area(),
            &app.help_sections(),
            app.tab,
            &app.theme,
        ),
        InputMode::ConfirmKill { pid, name } => {
            confirm::render(frame, frame.area(), *pid, name, &app.theme)
        }
        InputMode::Normal => {}
    }
}
