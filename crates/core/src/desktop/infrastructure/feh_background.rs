use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::desktop::domain::background::{Background, DesktopError};
use crate::shared::command::run_status;

pub const FEH_PROGRAM: &str = "feh";

#[derive(Error, Debug)]
pub enum FehError {
    #[error("could not open {path}: {source}")]
    ReadFehbg {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not extract current wallpaper from {0}")]
    NoWallpaper(PathBuf),
}

/// Sets the background with `feh --bg-fill` and reads the current one from
/// the `.fehbg` script feh maintains.
pub struct FehBackground {
    fehbg_file: PathBuf,
    program: String,
}

impl FehBackground {
    pub fn new(fehbg_file: impl Into<PathBuf>) -> Self {
        Self {
            fehbg_file: fehbg_file.into(),
            program: FEH_PROGRAM.to_string(),
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Background for FehBackground {
    fn apply(&self, image: &Path) -> Result<(), DesktopError> {
        run_status(&self.program, [OsStr::new("--bg-fill"), image.as_os_str()])?;
        Ok(())
    }

    fn current(&self) -> Result<PathBuf, DesktopError> {
        let script = fs::read_to_string(&self.fehbg_file).map_err(|e| FehError::ReadFehbg {
            path: self.fehbg_file.clone(),
            source: e,
        })?;
        parse_fehbg(&script)
            .ok_or_else(|| FehError::NoWallpaper(self.fehbg_file.clone()).into())
    }
}

/// Wallpaper path from a `.fehbg` script: the last single-quoted argument of
/// the first line that has one.
pub fn parse_fehbg(script: &str) -> Option<PathBuf> {
    script.lines().find_map(|line| {
        let quoted: Vec<&str> = line.split('\'').skip(1).step_by(2).collect();
        // An unterminated quote leaves a trailing segment without a closing quote.
        let closed = if line.matches('\'').count() % 2 == 0 {
            quoted.len()
        } else {
            quoted.len().saturating_sub(1)
        };
        quoted[..closed]
            .iter()
            .rev()
            .find(|s| !s.is_empty())
            .map(PathBuf::from)
    })
}
