use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillResult {
    Success(u32),
    NotFound(u32),
    Denied(u32),
    Failed(u32, String),
}

impl KillResult {
    pub fn into_result(self) -> Result<u32, ActionError> {
        match self {
            KillResult::Success(pid) => Ok(pid),
            KillResult::NotFound(pid) => Err(ActionError::ProcessNotFound(pid)),
            KillResult::Denied(pid) => Err(ActionError::KillDenied(pid)),
            KillResult::Failed(_, reason) => Err(ActionError::Io(std::io::Error::other(reason))),
        }
    }
}

/// Sends SIGTERM (or the platform's closest equivalent) to `pid`.
pub fn terminate(pid: u32) -> KillResult {
    // pid 0 and negative pids address process groups with kill(2)
    if pid == 0 || pid > i32::MAX as u32 {
        return KillResult::NotFound(pid);
    }
    send_term(pid)
}

#[cfg(unix)]
fn send_term(pid: u32) -> KillResult {
    let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
    if rc == 0 {
        return KillResult::Success(pid);
    }
    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(libc::ESRCH) => KillResult::NotFound(pid),
        Some(libc::EPERM) => KillResult::Denied(pid),
        _ => KillResult::Failed(pid, err.to_string()),
    }
}

#[cfg(not(unix))]
fn send_term(pid: u32) -> KillResult {
    use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System};

    let sys_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sys_pid]),
        true,
        ProcessRefreshKind::nothing(),
    );
    match sys.process(sys_pid) {
        Some(process) => {
            // Signal not supported on this platform, fall back to kill()
            let sent = process.kill_with(Signal::Term).unwrap_or_else(|| process.kill());
            if sent {
                KillResult::Success(pid)
            } else {
                KillResult::Denied(pid)
            }
        }
        None => KillResult::NotFound(pid),
    }
}
