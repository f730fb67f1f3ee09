use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// A single metric source could not be read this tick.
#[derive(Debug, Error)]
pub enum MetricError {
    #[error("sensor path {path} is unreadable: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("sensor path {path} holds unparsable value {value:?}")]
    Parse { path: PathBuf, value: String },
    #[error("{0} is not available on this platform")]
    Unsupported(&'static str),
}

/// A user-triggered privileged action did not complete.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Process {0} not found")]
    ProcessNotFound(u32),
    #[error("Permission denied to kill process {0}")]
    KillDenied(u32),
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{failed} of {total} entries could not be removed ({first})")]
    Partial {
        failed: usize,
        total: usize,
        first: String,
    },
    #[error("timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("worker stopped before reporting: {0}")]
    Worker(String),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failure_includes_trimmed_stderr() {
        let err = ActionError::CommandFailed {
            command: "sudo -n powerprofilesctl set balanced".to_string(),
            status: "exit status: 1".to_string(),
            stderr: "sudo: a password is required\n".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "`sudo -n powerprofilesctl set balanced` exited with exit status: 1: sudo: a password is required"
        );
    }

    #[test]
    fn command_failure_without_stderr_has_no_suffix() {
        let err = ActionError::CommandFailed {
            command: "true".to_string(),
            status: "exit status: 2".to_string(),
            stderr: "  \n".to_string(),
        };
        assert_eq!(err.to_string(), "`true` exited with exit status: 2");
    }

    #[test]
    fn timeout_reports_whole_seconds() {
        let err = ActionError::TimedOut(Duration::from_millis(30_400));
        assert_eq!(err.to_string(), "timed out after 30s");
    }
}
