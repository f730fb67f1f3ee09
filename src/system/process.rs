use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub name: String,
    pub cpu_percent: f32,
    pub mem_percent: f32,
}

/// Keeps the `limit` heaviest CPU consumers, highest first. Ties fall back to
/// pid so the table does not flicker between equal rows.
pub fn top_by_cpu(mut rows: Vec<ProcessRow>, limit: usize) -> Vec<ProcessRow> {
    rows.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(Ordering::Equal)
            .then(a.pid.cmp(&b.pid))
    });
    rows.truncate(limit);
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    Pid,
    Name,
    #[default]
    Cpu,
    Memory,
}

impl SortColumn {
    pub fn next(self) -> Self {
        match self {
            SortColumn::Pid => SortColumn::Name,
            SortColumn::Name => SortColumn::Cpu,
            SortColumn::Cpu => SortColumn::Memory,
            SortColumn::Memory => SortColumn::Pid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::Name => "Name",
            SortColumn::Cpu => "CPU %",
            SortColumn::Memory => "Memory %",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pid" => SortColumn::Pid,
            "name" => SortColumn::Name,
            "memory" | "mem" => SortColumn::Memory,
            _ => SortColumn::Cpu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSort {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for TableSort {
    fn default() -> Self {
        TableSort {
            column: SortColumn::Cpu,
            descending: true,
        }
    }
}

pub fn sort_rows(rows: &mut [ProcessRow], sort: TableSort) {
    rows.sort_by(|a, b| {
        let ord = match sort.column {
            SortColumn::Pid => a.pid.cmp(&b.pid),
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::Cpu => a
                .cpu_percent
                .partial_cmp(&b.cpu_percent)
                .unwrap_or(Ordering::Equal),
            SortColumn::Memory => a
                .mem_percent
                .partial_cmp(&b.mem_percent)
                .unwrap_or(Ordering::Equal),
        };
        let ord = if sort.descending { ord.reverse() } else { ord };
        ord.then(a.pid.cmp(&b.pid))
    });
}
