use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, info};

use crate::action::{Action, Direction};
use crate::config::{Config, KeybindsConfig, parse_key};
use crate::sampler::{Dashboard, MetricsSource, Sampler};
use crate::system::collector::Collector;
use crate::system::maintenance::{MaintenanceTask, PowerMode, TaskOutcome, TaskSlot};
use crate::system::process::{ProcessRow, SortColumn, TableSort, sort_rows};
use crate::ui::theme::{BandOverrides, Theme, resolve_color_support};

const STATUS_TTL_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Processes,
    Actions,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Overview, Tab::Processes, Tab::Actions];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Processes => "Processes",
            Tab::Actions => "Actions",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Overview => 0,
            Tab::Processes => 1,
            Tab::Actions => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Overview => Tab::Processes,
            Tab::Processes => Tab::Actions,
            Tab::Actions => Tab::Overview,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Tab::Overview => Tab::Actions,
            Tab::Processes => Tab::Overview,
            Tab::Actions => Tab::Processes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Help,
    ConfirmKill { pid: u32, name: String },
}

#[derive(Debug, Clone)]
pub struct ResolvedKeybinds {
    pub quit: KeyCode,
    pub next_tab: KeyCode,
    pub prev_tab: KeyCode,
    pub kill: KeyCode,
    pub sort: KeyCode,
    pub reverse_sort: KeyCode,
    pub apply: KeyCode,
    pub clear_ram: KeyCode,
    pub clear_storage: KeyCode,
    pub refresh: KeyCode,
    pub help: KeyCode,
}

impl ResolvedKeybinds {
    pub fn from_config(kb: &KeybindsConfig) -> Self {
        Self {
            quit: parse_key(&kb.quit).unwrap_or(KeyCode::Char('q')),
            next_tab: parse_key(&kb.next_tab).unwrap_or(KeyCode::Tab),
            prev_tab: parse_key(&kb.prev_tab).unwrap_or(KeyCode::BackTab),
            kill: parse_key(&kb.kill).unwrap_or(KeyCode::Char('k')),
            sort: parse_key(&kb.sort).unwrap_or(KeyCode::Char('s')),
            reverse_sort: parse_key(&kb.reverse_sort).unwrap_or(KeyCode::Char('r')),
            apply: parse_key(&kb.apply).unwrap_or(KeyCode::Enter),
            clear_ram: parse_key(&kb.clear_ram).unwrap_or(KeyCode::Char('m')),
            clear_storage: parse_key(&kb.clear_storage).unwrap_or(KeyCode::Char('x')),
            refresh: parse_key(&kb.refresh).unwrap_or(KeyCode::F(5)),
            help: parse_key(&kb.help).unwrap_or(KeyCode::Char('?')),
        }
    }

    /// Keybinds grouped by where they apply: everywhere, then one group per
    /// tab that has keys of its own.
    pub fn help_sections(&self) -> Vec<HelpSection> {
        vec![
            HelpSection {
                title: "Global",
                entries: vec![
                    (key_label(self.next_tab), "Next tab"),
                    (key_label(self.prev_tab), "Previous tab"),
                    (key_label(self.refresh), "Redraw from last sample"),
                    (key_label(self.help), "Toggle help"),
                    (key_label(self.quit), "Quit"),
                    ("Ctrl+C".to_string(), "Quit (always)"),
                ],
            },
            HelpSection {
                title: Tab::Processes.title(),
                entries: vec![
                    ("↑↓".to_string(), "Select process"),
                    (key_label(self.sort), "Cycle sort column"),
                    (key_label(self.reverse_sort), "Reverse sort order"),
                    (key_label(self.kill), "Kill selected process"),
                ],
            },
            HelpSection {
                title: Tab::Actions.title(),
                entries: vec![
                    ("↑↓".to_string(), "Select power mode"),
                    (key_label(self.apply), "Apply power mode"),
                    (key_label(self.clear_ram), "Clear RAM cache"),
                    (key_label(self.clear_storage), "Clear storage cache"),
                ],
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<(String, &'static str)>,
}

pub fn key_label(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::F(n) => format!("F{n}"),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "S-Tab".to_string(),
        KeyCode::Backspace => "Bksp".to_string(),
        KeyCode::Delete => "Del".to_string(),
        _ => "?".to_string(),
    }
}

/// Timestamped outcome lines, newest last. Oldest lines fall off once the
/// capacity is reached.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ActionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, message: &str) {
        let stamp = Local::now().format("%H:%M:%S").to_string();
        self.push_stamped(&stamp, message);
    }

    fn push_stamped(&mut self, stamp: &str, message: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(format!("[{stamp}] {message}"));
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub ok: bool,
    pub created: Instant,
}

pub struct App<S = Collector> {
    pub running: bool,
    pub tab: Tab,
    pub input_mode: InputMode,
    pub sampler: Sampler<S>,
    pub table_sort: TableSort,
    /// Process rows in display order.
    pub rows: Vec<ProcessRow>,
    pub selected_pid: Option<u32>,
    pub power_mode: PowerMode,
    pub action_log: ActionLog,
    pub status_message: Option<StatusMessage>,
    pub theme: Theme,
    pub keybinds: ResolvedKeybinds,
    pending: HashSet<TaskSlot>,
    requests: Vec<MaintenanceTask>,
}

impl<S: MetricsSource> App<S> {
    pub fn new(config: &Config, source: S) -> Self {
        let color_support = resolve_color_support(&config.colors.color_support);
        let bands = BandOverrides::from_config(&config.colors);
        let theme = Theme::from_config(&config.colors.theme, &bands, color_support);
        let sampler = Sampler::new(source, config.general.history_length, config.thresholds);

        App {
            running: true,
            tab: Tab::default(),
            input_mode: InputMode::Normal,
            sampler,
            table_sort: TableSort {
                column: SortColumn::from_str_config(&config.general.default_sort),
                descending: true,
            },
            rows: Vec::new(),
            selected_pid: None,
            power_mode: PowerMode::from_str_config(&config.general.default_power_mode),
            action_log: ActionLog::new(config.general.log_capacity),
            status_message: None,
            theme,
            keybinds: ResolvedKeybinds::from_config(&config.keybinds),
            pending: HashSet::new(),
            requests: Vec::new(),
        }
    }

    /// Takes one sample. Only the scheduler's timer should drive this, so the
    /// history window stays one point per period.
    pub fn on_tick(&mut self) {
        self.sampler.tick();
        self.refresh_view();
    }

    /// Rebuilds the table from the latest sample without taking a new one.
    fn refresh_view(&mut self) {
        let previous_index = self.selected_index();
        self.rows = self.sampler.dashboard().processes.clone();
        self.resort(previous_index);

        if let Some(status) = &self.status_message
            && status.created.elapsed().as_secs() >= STATUS_TTL_SECS
        {
            self.status_message = None;
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        self.sampler.dashboard()
    }

    /// Re-sorts the rows and keeps the selection on the same pid. A pid that
    /// is gone hands the selection to whatever now sits at its old position.
    fn resort(&mut self, previous_index: Option<usize>) {
        sort_rows(&mut self.rows, self.table_sort);
        let still_present = self
            .selected_pid
            .is_some_and(|pid| self.rows.iter().any(|r| r.pid == pid));
        if !still_present {
            let index = previous_index
                .unwrap_or(0)
                .min(self.rows.len().saturating_sub(1));
            self.selected_pid = self.rows.get(index).map(|r| r.pid);
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        let pid = self.selected_pid?;
        self.rows.iter().position(|r| r.pid == pid)
    }

    pub fn selected_row(&self) -> Option<&ProcessRow> {
        self.selected_index().map(|i| &self.rows[i])
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.map_key_normal(key),
            InputMode::Help => self.map_key_help(key),
            InputMode::ConfirmKill { .. } => map_key_confirm(key),
        }
    }

    fn map_key_normal(&self, key: KeyEvent) -> Action {
        let code = key.code;
        let kb = &self.keybinds;

        match code {
            KeyCode::Up => return Action::Navigate(Direction::Up),
            KeyCode::Down => return Action::Navigate(Direction::Down),
            _ => {}
        }

        if code == kb.quit {
            return Action::Quit;
        }
        if code == kb.next_tab {
            return Action::NextTab;
        }
        if code == kb.prev_tab {
            return Action::PrevTab;
        }
        if code == kb.help {
            return Action::ToggleHelp;
        }
        if code == kb.refresh {
            return Action::Refresh;
        }

        match self.tab {
            Tab::Overview => Action::None,
            Tab::Processes => {
                if code == kb.kill {
                    Action::RequestKill
                } else if code == kb.sort {
                    Action::CycleSort
                } else if code == kb.reverse_sort {
                    Action::ReverseSort
                } else {
                    Action::None
                }
            }
            Tab::Actions => {
                if code == kb.apply {
                    Action::ApplyPowerMode
                } else if code == kb.clear_ram {
                    Action::ClearRamCache
                } else if code == kb.clear_storage {
                    Action::ClearStorageCache
                } else {
                    Action::None
                }
            }
        }
    }

    fn map_key_help(&self, key: KeyEvent) -> Action {
        if key.code == self.keybinds.help || key.code == KeyCode::Esc {
            return Action::ToggleHelp;
        }
        Action::None
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NextTab => self.tab = self.tab.next(),
            Action::PrevTab => self.tab = self.tab.prev(),
            Action::Navigate(dir) => self.navigate(dir),
            Action::CycleSort => {
                self.table_sort.column = self.table_sort.column.next();
                self.resort(self.selected_index());
            }
            Action::ReverseSort => {
                self.table_sort.descending = !self.table_sort.descending;
                self.resort(self.selected_index());
            }
            Action::RequestKill => {
                if let Some(row) = self.selected_row() {
                    self.input_mode = InputMode::ConfirmKill {
                        pid: row.pid,
                        name: row.name.clone(),
                    };
                }
            }
            Action::ConfirmKill => {
                let mode = std::mem::replace(&mut self.input_mode, InputMode::Normal);
                if let InputMode::ConfirmKill { pid, .. } = mode {
                    self.request(MaintenanceTask::KillProcess(pid));
                }
            }
            Action::CancelConfirm => self.input_mode = InputMode::Normal,
            Action::ApplyPowerMode => self.request(MaintenanceTask::SetPowerMode(self.power_mode)),
            Action::ClearRamCache => self.request(MaintenanceTask::ClearRamCache),
            Action::ClearStorageCache => self.request(MaintenanceTask::ClearStorageCache),
            Action::ToggleHelp => {
                self.input_mode = if self.input_mode == InputMode::Help {
                    InputMode::Normal
                } else {
                    InputMode::Help
                };
            }
            Action::Refresh => self.refresh_view(),
            Action::None => {}
        }
    }

    fn navigate(&mut self, direction: Direction) {
        match self.tab {
            Tab::Overview => {}
            Tab::Processes => {
                if self.rows.is_empty() {
                    return;
                }
                let last = self.rows.len() - 1;
                let index = match (self.selected_index(), direction) {
                    (None, _) => 0,
                    (Some(i), Direction::Up) => i.saturating_sub(1),
                    (Some(i), Direction::Down) => (i + 1).min(last),
                };
                self.selected_pid = Some(self.rows[index].pid);
            }
            Tab::Actions => {
                self.power_mode = match direction {
                    Direction::Up => self.power_mode.prev(),
                    Direction::Down => self.power_mode.next(),
                };
            }
        }
    }
}

impl<S> App<S> {
    /// Queues a task for the runner unless one for the same slot is still in
    /// flight.
    fn request(&mut self, task: MaintenanceTask) {
        if !self.pending.insert(task.slot()) {
            debug!(task = ?task, "duplicate request rejected");
            self.set_status(format!("{} already in progress", task.label()), false);
            return;
        }
        info!(task = ?task, "maintenance task requested");
        self.set_status(format!("{} started", task.label()), true);
        self.requests.push(task);
    }

    /// Drains the tasks queued since the last call.
    pub fn take_requests(&mut self) -> Vec<MaintenanceTask> {
        std::mem::take(&mut self.requests)
    }

    pub fn on_task_finished(&mut self, outcome: TaskOutcome) {
        self.pending.remove(&outcome.task.slot());
        self.action_log.push(&outcome.message);
        self.set_status(outcome.message, outcome.ok);
    }

    pub fn is_pending(&self, slot: TaskSlot) -> bool {
        self.pending.contains(&slot)
    }

    fn set_status(&mut self, text: String, ok: bool) {
        self.status_message = Some(StatusMessage {
            text,
            ok,
            created: Instant::now(),
        });
    }

    pub fn show_help(&self) -> bool {
        self.input_mode == InputMode::Help
    }

    pub fn help_sections(&self) -> Vec<HelpSection> {
        self.keybinds.help_sections()
    }
}

fn map_key_confirm(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::ConfirmKill,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Action::CancelConfirm,
        _ => Action::None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sampler::tests::{ScriptedSource, snapshot};

    fn row(pid: u32, name: &str, cpu: f32, mem: f32) -> ProcessRow {
        ProcessRow {
            pid,
            name: name.to_string(),
            cpu_percent: cpu,
            mem_percent: mem,
        }
    }

    pub(crate) fn sample_rows() -> Vec<ProcessRow> {
        vec![
            row(101, "firefox", 42.0, 12.5),
            row(202, "cargo", 17.5, 3.0),
            row(303, "Xorg", 5.0, 2.2),
        ]
    }

    pub(crate) fn make_app() -> App<ScriptedSource> {
        let mut snap = snapshot(35.0, 450);
        snap.processes = sample_rows();
        let mut app = App::new(&Config::default(), ScriptedSource::steady(snap));
        app.on_tick();
        app
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn construction_does_not_sample() {
        let mut snap = snapshot(35.0, 450);
        snap.processes = sample_rows();
        let app = App::new(&Config::default(), ScriptedSource::steady(snap));
        assert_eq!(app.dashboard().samples, 0);
        assert!(app.sampler.cpu_history().is_empty());
        assert!(app.rows.is_empty());
        assert_eq!(app.selected_pid, None);
    }

    #[test]
    fn starts_on_overview_after_first_tick() {
        let app = make_app();
        assert_eq!(app.tab, Tab::Overview);
        assert_eq!(app.dashboard().samples, 1);
        assert_eq!(app.sampler.cpu_history().len(), 1);
        assert_eq!(app.power_mode, PowerMode::Balanced);
        assert_eq!(app.selected_pid, Some(101));
    }

    #[test]
    fn default_keybinds() {
        let app = make_app();
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(app.map_key(key(KeyCode::Tab)), Action::NextTab);
        assert_eq!(app.map_key(key(KeyCode::BackTab)), Action::PrevTab);
        assert_eq!(app.map_key(key(KeyCode::Char('?'))), Action::ToggleHelp);
        assert_eq!(app.map_key(key(KeyCode::F(5))), Action::Refresh);
        assert_eq!(
            app.map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn tab_specific_keys_only_fire_on_their_tab() {
        let mut app = make_app();
        assert_eq!(app.map_key(key(KeyCode::Char('k'))), Action::None);
        assert_eq!(app.map_key(key(KeyCode::Char('m'))), Action::None);

        app.dispatch(Action::NextTab);
        assert_eq!(app.tab, Tab::Processes);
        assert_eq!(app.map_key(key(KeyCode::Char('k'))), Action::RequestKill);
        assert_eq!(app.map_key(key(KeyCode::Char('s'))), Action::CycleSort);
        assert_eq!(app.map_key(key(KeyCode::Char('m'))), Action::None);

        app.dispatch(Action::NextTab);
        assert_eq!(app.tab, Tab::Actions);
        assert_eq!(app.map_key(key(KeyCode::Enter)), Action::ApplyPowerMode);
        assert_eq!(app.map_key(key(KeyCode::Char('m'))), Action::ClearRamCache);
        assert_eq!(app.map_key(key(KeyCode::Char('x'))), Action::ClearStorageCache);

        app.dispatch(Action::NextTab);
        assert_eq!(app.tab, Tab::Overview);
        app.dispatch(Action::PrevTab);
        assert_eq!(app.tab, Tab::Actions);
    }

    #[test]
    fn kill_needs_confirmation() {
        let mut app = make_app();
        app.tab = Tab::Processes;
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid, Some(202));

        app.dispatch(Action::RequestKill);
        assert_eq!(
            app.input_mode,
            InputMode::ConfirmKill {
                pid: 202,
                name: "cargo".to_string()
            }
        );
        assert!(app.take_requests().is_empty());
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(key(KeyCode::Char('y'))), Action::ConfirmKill);

        app.dispatch(Action::ConfirmKill);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.take_requests(), vec![MaintenanceTask::KillProcess(202)]);
        assert!(app.is_pending(TaskSlot::Kill(202)));
    }

    #[test]
    fn declined_kill_queues_nothing() {
        let mut app = make_app();
        app.tab = Tab::Processes;
        app.dispatch(Action::RequestKill);
        assert_eq!(app.map_key(key(KeyCode::Esc)), Action::CancelConfirm);
        app.dispatch(Action::CancelConfirm);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.take_requests().is_empty());
    }

    #[test]
    fn duplicate_request_is_rejected_until_finished() {
        let mut app = make_app();
        app.dispatch(Action::ClearRamCache);
        app.dispatch(Action::ClearRamCache);
        assert_eq!(app.take_requests(), vec![MaintenanceTask::ClearRamCache]);
        let status = app.status_message.clone().unwrap();
        assert_eq!(status.text, "RAM cache clear already in progress");
        assert!(!status.ok);

        app.on_task_finished(TaskOutcome {
            task: MaintenanceTask::ClearRamCache,
            ok: true,
            message: "RAM cache cleared successfully!".to_string(),
        });
        assert!(!app.is_pending(TaskSlot::RamCache));
        assert_eq!(app.action_log.len(), 1);
        let line = app.action_log.iter().next().unwrap();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] RAM cache cleared successfully!"));

        app.dispatch(Action::ClearRamCache);
        assert_eq!(app.take_requests(), vec![MaintenanceTask::ClearRamCache]);
    }

    #[test]
    fn different_slots_run_side_by_side() {
        let mut app = make_app();
        app.dispatch(Action::ClearRamCache);
        app.dispatch(Action::ClearStorageCache);
        app.dispatch(Action::ApplyPowerMode);
        assert_eq!(
            app.take_requests(),
            vec![
                MaintenanceTask::ClearRamCache,
                MaintenanceTask::ClearStorageCache,
                MaintenanceTask::SetPowerMode(PowerMode::Balanced),
            ]
        );
    }

    #[test]
    fn power_selector_moves_on_actions_tab() {
        let mut app = make_app();
        app.tab = Tab::Actions;
        app.dispatch(Action::Navigate(Direction::Up));
        assert_eq!(app.power_mode, PowerMode::Performance);
        app.dispatch(Action::Navigate(Direction::Up));
        assert_eq!(app.power_mode, PowerMode::PowerSaver);
        app.dispatch(Action::ApplyPowerMode);
        assert_eq!(
            app.take_requests(),
            vec![MaintenanceTask::SetPowerMode(PowerMode::PowerSaver)]
        );
    }

    #[test]
    fn selection_follows_pid_across_resort() {
        let mut app = make_app();
        app.tab = Tab::Processes;
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid, Some(202));

        app.dispatch(Action::ReverseSort);
        let pids: Vec<u32> = app.rows.iter().map(|r| r.pid).collect();
        assert_eq!(pids, vec![303, 202, 101]);
        assert_eq!(app.selected_pid, Some(202));

        app.dispatch(Action::CycleSort);
        assert_eq!(app.table_sort.column, SortColumn::Memory);
        app.on_tick();
        assert_eq!(app.selected_pid, Some(202));
    }

    #[test]
    fn vanished_selection_moves_to_same_position() {
        let mut snap = snapshot(35.0, 450);
        snap.processes = sample_rows();
        let mut source = ScriptedSource::steady(snap.clone());
        let mut shrunk = snap.clone();
        shrunk.processes.retain(|r| r.pid != 202);
        source.queue.extend([snap, shrunk]);

        let mut app = App::new(&Config::default(), source);
        app.on_tick();
        app.tab = Tab::Processes;
        app.dispatch(Action::Navigate(Direction::Down));
        assert_eq!(app.selected_pid, Some(202));
        app.on_tick();
        assert_eq!(app.selected_pid, Some(303));
    }

    #[test]
    fn refresh_redraws_without_sampling() {
        let mut app = make_app();
        app.tab = Tab::Processes;
        app.dispatch(Action::Navigate(Direction::Down));
        let ticks = app.sampler.cpu_history().ticks();
        let samples = app.dashboard().samples;

        for _ in 0..5 {
            app.dispatch(Action::Refresh);
        }

        assert_eq!(app.sampler.cpu_history().ticks(), ticks);
        assert_eq!(app.sampler.ram_history().ticks(), ticks);
        assert_eq!(app.dashboard().samples, samples);
        assert_eq!(app.rows.len(), 3);
        assert_eq!(app.selected_pid, Some(202));
    }

    #[test]
    fn help_sections_group_keys_by_tab() {
        let app = make_app();
        let sections = app.help_sections();
        let titles: Vec<&str> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Global", "Processes", "Actions"]);

        let has = |title: &str, desc: &str| {
            sections
                .iter()
                .find(|s| s.title == title)
                .is_some_and(|s| s.entries.iter().any(|(_, d)| *d == desc))
        };
        assert!(has("Processes", "Kill selected process"));
        assert!(has("Actions", "Clear storage cache"));
        assert!(has("Global", "Redraw from last sample"));
        assert!(!has("Global", "Kill selected process"));
    }

    #[test]
    fn help_mode_blocks_other_keys() {
        let mut app = make_app();
        app.dispatch(Action::ToggleHelp);
        assert!(app.show_help());
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::None);
        assert_eq!(app.map_key(key(KeyCode::Esc)), Action::ToggleHelp);
        app.dispatch(Action::ToggleHelp);
        assert!(!app.show_help());
    }

    #[test]
    fn action_log_is_bounded() {
        let mut log = ActionLog::new(3);
        for i in 0..5 {
            log.push_stamped("12:00:00", &format!("entry {i}"));
        }
        let lines: Vec<&str> = log.iter().collect();
        assert_eq!(
            lines,
            vec![
                "[12:00:00] entry 2",
                "[12:00:00] entry 3",
                "[12:00:00] entry 4"
            ]
        );
    }

    #[test]
    fn custom_keybind_remap_works() {
        let mut app = make_app();
        app.keybinds.quit = KeyCode::Char('z');
        assert_eq!(app.map_key(key(KeyCode::Char('z'))), Action::Quit);
        assert_eq!(app.map_key(key(KeyCode::Char('q'))), Action::None);
    }
}
