use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::kill;
use super::platform::{self, CommandSpec};
use crate::error::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerMode {
    Performance,
    #[default]
    Balanced,
    PowerSaver,
}

impl PowerMode {
    pub const ALL: [PowerMode; 3] = [
        PowerMode::Performance,
        PowerMode::Balanced,
        PowerMode::PowerSaver,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PowerMode::Performance => "performance",
            PowerMode::Balanced => "balanced",
            PowerMode::PowerSaver => "power-saver",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PowerMode::Performance => PowerMode::Balanced,
            PowerMode::Balanced => PowerMode::PowerSaver,
            PowerMode::PowerSaver => PowerMode::Performance,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            PowerMode::Performance => PowerMode::PowerSaver,
            PowerMode::Balanced => PowerMode::Performance,
            PowerMode::PowerSaver => PowerMode::Balanced,
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "performance" => PowerMode::Performance,
            "power-saver" | "powersaver" | "power_saver" => PowerMode::PowerSaver,
            _ => PowerMode::Balanced,
        }
    }
}

impl fmt::Display for PowerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaintenanceTask {
    ClearRamCache,
    ClearStorageCache,
    SetPowerMode(PowerMode),
    KillProcess(u32),
}

/// Tasks sharing a slot never run concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSlot {
    RamCache,
    StorageCache,
    PowerMode,
    Kill(u32),
}

impl MaintenanceTask {
    pub fn slot(self) -> TaskSlot {
        match self {
            MaintenanceTask::ClearRamCache => TaskSlot::RamCache,
            MaintenanceTask::ClearStorageCache => TaskSlot::StorageCache,
            MaintenanceTask::SetPowerMode(_) => TaskSlot::PowerMode,
            MaintenanceTask::KillProcess(pid) => TaskSlot::Kill(pid),
        }
    }

    pub fn label(self) -> String {
        match self {
            MaintenanceTask::ClearRamCache => "RAM cache clear".to_string(),
            MaintenanceTask::ClearStorageCache => "Storage cache clear".to_string(),
            MaintenanceTask::SetPowerMode(mode) => format!("Power mode change to {mode}"),
            MaintenanceTask::KillProcess(pid) => format!("Termination of process {pid}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub task: MaintenanceTask,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct MaintenanceSettings {
    pub use_sudo: bool,
    pub timeout: Duration,
    pub storage_dirs: Vec<PathBuf>,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        MaintenanceSettings {
            use_sudo: true,
            timeout: Duration::from_secs(30),
            storage_dirs: default_storage_dirs(),
        }
    }
}

pub fn default_storage_dirs() -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Some(cache) = dirs::cache_dir() {
        out.push(cache);
    }
    out.push(std::env::temp_dir());
    out
}

/// Runs one task to completion or until the configured timeout expires.
/// Never fails: every error is folded into the returned message.
pub async fn run(task: MaintenanceTask, settings: &MaintenanceSettings) -> TaskOutcome {
    let outcome = settle(task, execute(task, settings).await);
    if outcome.ok {
        info!(task = ?task, message = %outcome.message, "maintenance task succeeded");
    } else {
        warn!(task = ?task, message = %outcome.message, "maintenance task failed");
    }
    outcome
}

async fn execute(task: MaintenanceTask, settings: &MaintenanceSettings) -> Result<String, ActionError> {
    let limit = settings.timeout;
    match task {
        MaintenanceTask::ClearRamCache => {
            let spec = platform::drop_caches_command()
                .ok_or(ActionError::Unsupported("RAM cache clearing"))?;
            bounded(limit, run_command(elevate(spec, settings.use_sudo))).await?;
            Ok("RAM cache cleared successfully!".to_string())
        }
        MaintenanceTask::ClearStorageCache => {
            let dirs = settings.storage_dirs.clone();
            let report = run_blocking(limit, move |cancel| clear_dirs(&dirs, cancel)).await?;
            if report.skipped > 0 {
                info!(skipped = report.skipped, "left entries that are in use or owned by another user");
            }
            report.into_result()?;
            Ok("Storage caches cleared successfully!".to_string())
        }
        MaintenanceTask::SetPowerMode(mode) => {
            let spec = platform::power_profile_command(mode.as_str())
                .ok_or(ActionError::Unsupported("Power profile switching"))?;
            bounded(limit, run_command(elevate(spec, settings.use_sudo))).await?;
            Ok(format!("Power mode set to {mode}"))
        }
        MaintenanceTask::KillProcess(pid) => {
            run_blocking(limit, move |_| kill::terminate(pid))
                .await?
                .into_result()?;
            Ok(format!("Process {pid} terminated successfully"))
        }
    }
}

/// Bounds async work by the task timeout. Expiry drops the future, which
/// kills any child it spawned.
async fn bounded<T>(
    limit: Duration,
    work: impl Future<Output = Result<T, ActionError>>,
) -> Result<T, ActionError> {
    tokio::time::timeout(limit, work)
        .await
        .map_err(|_| ActionError::TimedOut(limit))?
}

/// Runs blocking work under the task timeout. A blocking thread cannot be
/// aborted, so on expiry the cancel flag is raised and the worker is awaited:
/// the task is reported, and its slot freed, only once the work has stopped.
async fn run_blocking<T, F>(limit: Duration, work: F) -> Result<T, ActionError>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> T + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let mut handle = tokio::task::spawn_blocking(move || work(&flag));

    match tokio::time::timeout(limit, &mut handle).await {
        Ok(joined) => joined.map_err(|e| ActionError::Worker(e.to_string())),
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            if let Err(e) = handle.await {
                warn!(error = %e, "worker failed after cancellation");
            }
            Err(ActionError::TimedOut(limit))
        }
    }
}

/// Maps a task result onto the message shown in the action log.
pub fn settle(task: MaintenanceTask, result: Result<String, ActionError>) -> TaskOutcome {
    let message = match result {
        Ok(message) => {
            return TaskOutcome {
                task,
                ok: true,
                message,
            };
        }
        Err(ActionError::TimedOut(after)) => {
            format!("{} timed out after {}s", task.label(), after.as_secs())
        }
        Err(err) => match task {
            MaintenanceTask::ClearRamCache => format!("Failed to clear RAM cache: {err}"),
            MaintenanceTask::ClearStorageCache => match err {
                ActionError::Partial { .. } => format!("Storage caches partially cleared: {err}"),
                _ => format!("Failed to clear storage cache: {err}"),
            },
            MaintenanceTask::SetPowerMode(_) => format!("Failed to set power mode: {err}"),
            MaintenanceTask::KillProcess(_) => match err {
                ActionError::ProcessNotFound(_) | ActionError::KillDenied(_) => err.to_string(),
                _ => format!("Failed to kill process: {err}"),
            },
        },
    };
    TaskOutcome {
        task,
        ok: false,
        message,
    }
}

fn elevate(spec: CommandSpec, use_sudo: bool) -> CommandSpec {
    if use_sudo { spec.elevated() } else { spec }
}

async fn run_command(spec: CommandSpec) -> Result<(), ActionError> {
    let command = spec.display();
    debug!(%command, "running maintenance command");
    // kill_on_drop reaps the child when the timeout drops this future
    let output = tokio::process::Command::new(&spec.program)
        .args(&spec.args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ActionError::Spawn {
            command: command.clone(),
            source,
        })?;
    if output.status.success() {
        Ok(())
    } else {
        Err(ActionError::CommandFailed {
            command,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

#[derive(Debug, Default)]
pub struct ClearReport {
    pub removed: usize,
    /// Sockets, entries owned by another user, and directories holding either.
    pub skipped: usize,
    pub failures: Vec<(PathBuf, std::io::Error)>,
    /// The cancel flag stopped the walk before every entry was visited.
    pub cancelled: bool,
}

impl ClearReport {
    pub fn into_result(self) -> Result<usize, ActionError> {
        match self.failures.first() {
            None => Ok(self.removed),
            Some((path, err)) => Err(ActionError::Partial {
                failed: self.failures.len(),
                total: self.removed + self.failures.len(),
                first: format!("{}: {err}", path.display()),
            }),
        }
    }
}

/// Removes every entry inside each directory, keeping the directories
/// themselves. Every entry is attempted; an entry that disappears while we
/// work counts as removed. Live sockets and anything the current user does
/// not own are left in place and counted as skipped. `cancel` is checked
/// before every entry.
pub fn clear_dirs(dirs: &[PathBuf], cancel: &AtomicBool) -> ClearReport {
    clear_dirs_owned_by(dirs, current_uid(), cancel)
}

fn clear_dirs_owned_by(dirs: &[PathBuf], owner: Option<u32>, cancel: &AtomicBool) -> ClearReport {
    let mut report = ClearReport::default();
    for dir in dirs {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                report.failures.push((dir.clone(), e));
                continue;
            }
        };
        for entry in entries {
            if cancel.load(Ordering::Relaxed) {
                report.cancelled = true;
                return report;
            }
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(e) => {
                    report.failures.push((dir.clone(), e));
                    continue;
                }
            };
            match remove_entry(&path, owner, cancel) {
                Ok(Removal::Removed) => report.removed += 1,
                Ok(Removal::Kept) => report.skipped += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => report.removed += 1,
                Err(_) if cancel.load(Ordering::Relaxed) => {
                    report.cancelled = true;
                    return report;
                }
                Err(e) => report.failures.push((path, e)),
            }
        }
    }
    debug!(
        removed = report.removed,
        skipped = report.skipped,
        failed = report.failures.len(),
        "storage directories cleared"
    );
    report
}

enum Removal {
    Removed,
    Kept,
}

fn remove_entry(path: &Path, owner: Option<u32>, cancel: &AtomicBool) -> std::io::Result<Removal> {
    // symlink_metadata so a link to a directory is unlinked, not followed
    let meta = fs::symlink_metadata(path)?;
    if !removable(&meta, owner) {
        return Ok(Removal::Kept);
    }

    if meta.is_dir() {
        let mut kept = false;
        for child in fs::read_dir(path)? {
            if cancel.load(Ordering::Relaxed) {
                return Err(std::io::Error::new(ErrorKind::Interrupted, "cancelled"));
            }
            match remove_entry(&child?.path(), owner, cancel) {
                Ok(Removal::Removed) => {}
                Ok(Removal::Kept) => kept = true,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        if kept {
            return Ok(Removal::Kept);
        }
        fs::remove_dir(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(Removal::Removed)
}

#[cfg(unix)]
fn removable(meta: &fs::Metadata, owner: Option<u32>) -> bool {
    use std::os::unix::fs::{FileTypeExt, MetadataExt};
    // sockets belong to live sessions (tmux, ssh-agent, X)
    !meta.file_type().is_socket() && owner.is_none_or(|uid| meta.uid() == uid)
}

#[cfg(not(unix))]
fn removable(_meta: &fs::Metadata, _owner: Option<u32>) -> bool {
    true
}

#[cfg(unix)]
fn current_uid() -> Option<u32> {
    Some(unsafe { libc::geteuid() })
}

#[cfg(not(unix))]
fn current_uid() -> Option<u32> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("lonitor_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn power_mode_strings_match_powerprofilesctl() {
        let names: Vec<&str> = PowerMode::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["performance", "balanced", "power-saver"]);
        assert_eq!(PowerMode::from_str_config("Power-Saver"), PowerMode::PowerSaver);
        assert_eq!(PowerMode::from_str_config("bogus"), PowerMode::Balanced);
    }

    #[test]
    fn power_mode_next_and_prev_are_inverse() {
        for mode in PowerMode::ALL {
            assert_eq!(mode.next().prev(), mode);
        }
    }

    #[test]
    fn clear_dirs_removes_files_and_subdirs_but_keeps_root() {
        let dir = scratch_dir("clear_ok");
        fs::write(dir.join("a.bin"), b"x").unwrap();
        fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        fs::write(dir.join("nested/deeper/b.bin"), b"y").unwrap();

        let report = clear_dirs(std::slice::from_ref(&dir), &AtomicBool::new(false));
        assert_eq!(report.removed, 2);
        assert!(report.failures.is_empty());
        assert!(dir.exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn clear_dirs_skips_missing_directories() {
        let report = clear_dirs(
            &[PathBuf::from("/nonexistent/lonitor/cache")],
            &AtomicBool::new(false),
        );
        assert_eq!(report.removed, 0);
        assert!(report.failures.is_empty());
        assert_eq!(report.into_result().unwrap(), 0);
    }

    #[test]
    fn partial_failure_is_reported_consistently() {
        let report = ClearReport {
            removed: 3,
            failures: vec![(
                PathBuf::from("/tmp/locked"),
                std::io::Error::new(ErrorKind::PermissionDenied, "Permission denied"),
            )],
            ..ClearReport::default()
        };
        let outcome = settle(MaintenanceTask::ClearStorageCache, report.into_result().map(|_| String::new()));
        assert!(!outcome.ok);
        assert_eq!(
            outcome.message,
            "Storage caches partially cleared: 1 of 4 entries could not be removed (/tmp/locked: Permission denied)"
        );
    }

    #[test]
    fn raised_cancel_flag_leaves_entries_in_place() {
        let dir = scratch_dir("clear_cancelled");
        for i in 0..5 {
            fs::write(dir.join(format!("f{i}")), b"x").unwrap();
        }

        let report = clear_dirs(std::slice::from_ref(&dir), &AtomicBool::new(true));
        assert!(report.cancelled);
        assert_eq!(report.removed, 0);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 5);
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn sockets_are_skipped_not_failed() {
        use std::os::unix::net::UnixListener;

        let dir = scratch_dir("clear_sockets");
        fs::write(dir.join("stale.log"), b"x").unwrap();
        let _agent = UnixListener::bind(dir.join("agent.sock")).unwrap();
        fs::create_dir(dir.join("tmux-1000")).unwrap();
        let _tmux = UnixListener::bind(dir.join("tmux-1000/default")).unwrap();

        let report = clear_dirs(std::slice::from_ref(&dir), &AtomicBool::new(false));
        assert_eq!(report.removed, 1);
        assert_eq!(report.skipped, 2);
        assert!(report.failures.is_empty());
        assert!(dir.join("agent.sock").exists());
        assert!(dir.join("tmux-1000/default").exists());
        assert!(!dir.join("stale.log").exists());
        assert_eq!(report.into_result().unwrap(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[cfg(unix)]
    #[test]
    fn entries_of_other_users_are_skipped() {
        let dir = scratch_dir("clear_foreign");
        fs::write(dir.join("a.bin"), b"x").unwrap();
        fs::create_dir(dir.join("session")).unwrap();

        let someone_else = current_uid().map(|uid| uid.wrapping_add(1));
        let report = clear_dirs_owned_by(
            std::slice::from_ref(&dir),
            someone_else,
            &AtomicBool::new(false),
        );
        assert_eq!(report.removed, 0);
        assert_eq!(report.skipped, 2);
        assert!(report.failures.is_empty());
        assert!(dir.join("a.bin").exists());
        assert!(dir.join("session").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn timed_out_worker_has_stopped_when_reported() {
        let stopped = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&stopped);
        let result = run_blocking(Duration::from_millis(20), move |cancel| {
            while !cancel.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(5));
            }
            seen.store(true, Ordering::Relaxed);
        })
        .await;

        assert!(matches!(result, Err(ActionError::TimedOut(_))));
        assert!(stopped.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn storage_clear_does_not_outlive_its_report() {
        let dir = scratch_dir("clear_timeout");
        for i in 0..2000 {
            fs::write(dir.join(format!("f{i}")), b"x").unwrap();
        }
        let settings = MaintenanceSettings {
            use_sudo: false,
            timeout: Duration::from_millis(1),
            storage_dirs: vec![dir.clone()],
        };

        let outcome = run(MaintenanceTask::ClearStorageCache, &settings).await;
        let left_at_report = fs::read_dir(&dir).unwrap().count();
        tokio::time::sleep(Duration::from_millis(200)).await;
        let left_later = fs::read_dir(&dir).unwrap().count();

        assert_eq!(left_at_report, left_later, "{}", outcome.message);
        if !outcome.ok {
            assert!(outcome.message.contains("timed out"), "{}", outcome.message);
        }
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn kill_messages_name_the_pid() {
        let task = MaintenanceTask::KillProcess(77);
        let outcome = settle(task, Err(ActionError::ProcessNotFound(77)));
        assert_eq!(outcome.message, "Process 77 not found");
        assert!(!outcome.ok);

        let outcome = settle(task, Err(ActionError::KillDenied(77)));
        assert_eq!(outcome.message, "Permission denied to kill process 77");

        let outcome = settle(task, Err(ActionError::Worker("panicked".to_string())));
        assert_eq!(
            outcome.message,
            "Failed to kill process: worker stopped before reporting: panicked"
        );
    }

    #[test]
    fn timeout_message_names_the_task() {
        let outcome = settle(
            MaintenanceTask::SetPowerMode(PowerMode::Performance),
            Err(ActionError::TimedOut(Duration::from_secs(30))),
        );
        assert_eq!(
            outcome.message,
            "Power mode change to performance timed out after 30s"
        );
    }

    #[tokio::test]
    async fn kill_of_vanished_pid_reports_not_found() {
        let settings = MaintenanceSettings {
            use_sudo: false,
            timeout: Duration::from_secs(5),
            storage_dirs: Vec::new(),
        };
        let pid = i32::MAX as u32;
        let outcome = run(MaintenanceTask::KillProcess(pid), &settings).await;
        assert!(!outcome.ok);
        assert_eq!(outcome.message, format!("Process {pid} not found"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn hanging_command_is_cut_off_by_timeout() {
        let started = std::time::Instant::now();
        let result = tokio::time::timeout(
            Duration::from_millis(200),
            run_command(CommandSpec::new("sleep", &["5"])),
        )
        .await;
        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_reports_exit_status() {
        let err = run_command(CommandSpec::new("sh", &["-c", "echo nope >&2; exit 3"]))
            .await
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("exit status: 3"), "{text}");
        assert!(text.ends_with(": nope"), "{text}");
    }
}
