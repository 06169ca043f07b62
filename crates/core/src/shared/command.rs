use std::ffi::OsStr;
use std::process::{Command, Stdio};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {status}: {stderr}")]
    Status {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("`{program}` produced non-UTF-8 output")]
    Encoding { program: String },
}

impl CommandError {
    /// True when the program itself could not be found on `PATH`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CommandError::Spawn { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

/// Run an external program to completion and return its stdout.
pub fn run_capture<I, S>(program: &str, args: I) -> Result<String, CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CommandError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if !output.status.success() {
        return Err(CommandError::Status {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| CommandError::Encoding {
        program: program.to_string(),
    })
}

/// Run an external program to completion, discarding its stdout.
pub fn run_status<I, S>(program: &str, args: I) -> Result<(), CommandError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .output()
        .map_err(|e| CommandError::Spawn {
            program: program.to_string(),
            source: e,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(CommandError::Status {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_not_found() {
        let err = run_status("blurwal-definitely-not-a-program", ["--help"]).unwrap_err();
        assert!(err.is_not_found());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_capture_returns_stdout() {
        let out = run_capture("echo", ["hello"]).unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_status_is_reported() {
        let err = run_status("false", std::iter::empty::<&str>()).unwrap_err();
        assert!(matches!(err, CommandError::Status { .. }));
        assert!(!err.is_not_found());
    }
}
