use std::borrow::Cow;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::desktop::domain::background::Background;
use crate::shared::paths::is_frame_stem;

#[derive(Error, Debug)]
pub enum WallpaperError {
    #[error("failed to read original wallpaper from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to save original wallpaper to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} does not name a wallpaper")]
    Empty(PathBuf),
    #[error("failed to query the current wallpaper: {0}")]
    Current(String),
    #[error("failed to set wallpaper {path}: {message}")]
    Apply { path: PathBuf, message: String },
}

/// What startup did with the wallpaper found on the desktop.
#[derive(Debug, Clone, PartialEq)]
pub enum StartupAction {
    /// A transition frame was showing, so the stored original was put back.
    Restored(PathBuf),
    /// The current wallpaper was recorded as the original.
    Recorded(PathBuf),
}

/// The wallpaper that was set before any blurring began.
///
/// Stored as a single line in a file inside the cache directory so that a
/// later run can put it back if this one dies mid-transition.
#[derive(Debug, Clone)]
pub struct OriginalWallpaper {
    file: PathBuf,
    cache_dir: PathBuf,
}

impl OriginalWallpaper {
    pub fn new(file: impl Into<PathBuf>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            cache_dir: cache_dir.into(),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn read(&self) -> Result<PathBuf, WallpaperError> {
        let content = fs::read(&self.file).map_err(|e| WallpaperError::Read {
            path: self.file.clone(),
            source: e,
        })?;
        let line = content.split(|&b| b == b'\n').next().unwrap_or_default();
        let line = trim_ascii_whitespace(line);
        if line.is_empty() {
            return Err(WallpaperError::Empty(self.file.clone()));
        }
        Ok(path_from_bytes(line))
    }

    pub fn write(&self, wallpaper: &Path) -> Result<(), WallpaperError> {
        if let Some(parent) = self.file.parent() {
            fs::create_dir_all(parent).map_err(|e| WallpaperError::Write {
                path: self.file.clone(),
                source: e,
            })?;
        }
        fs::write(&self.file, path_to_bytes(wallpaper)).map_err(|e| {
            WallpaperError::Write {
                path: self.file.clone(),
                source: e,
            }
        })
    }

    /// Whether `wallpaper` is one of our cached frames rather than a real wallpaper.
    pub fn is_transition_frame(&self, wallpaper: &Path) -> bool {
        let Some(parent) = wallpaper.parent() else {
            return false;
        };
        if resolve(parent) != resolve(&self.cache_dir) {
            return false;
        }
        wallpaper
            .file_name()
            .and_then(|n| n.to_str())
            .map(is_frame_stem)
            .unwrap_or(false)
    }

    /// True when someone else set a new wallpaper since it was recorded.
    pub fn changed_externally(&self, current: &Path) -> Result<bool, WallpaperError> {
        if self.is_transition_frame(current) {
            return Ok(false);
        }
        Ok(self.read()? != current)
    }

    /// Put the recorded wallpaper back on the desktop.
    pub fn restore(&self, background: &dyn Background) -> Result<PathBuf, WallpaperError> {
        let original = self.read()?;
        log::info!("Restoring original wallpaper: {}", original.display());
        background
            .apply(&original)
            .map_err(|e| WallpaperError::Apply {
                path: original.clone(),
                message: e.to_string(),
            })?;
        Ok(original)
    }

    /// Startup bookkeeping: recover from a previous crash mid-transition,
    /// or remember the wallpaper that is showing now.
    pub fn restore_or_record(
        &self,
        background: &dyn Background,
    ) -> Result<StartupAction, WallpaperError> {
        let current = background
            .current()
            .map_err(|e| WallpaperError::Current(e.to_string()))?;

        if self.is_transition_frame(&current) {
            log::info!("A transition frame is still set, restoring the original");
            Ok(StartupAction::Restored(self.restore(background)?))
        } else {
            self.write(&current)?;
            Ok(StartupAction::Recorded(current))
        }
    }
}

fn resolve(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

// Paths are stored as raw bytes so names that are not UTF-8 survive.
#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    use std::os::unix::ffi::OsStrExt;
    Cow::Borrowed(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Cow<'_, [u8]> {
    match path.to_string_lossy() {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}
