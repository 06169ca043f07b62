use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{
    APP_DIR_NAME, FEHBG_FILE_NAME, FRAME_EXTENSION, FRAME_PREFIX, ORIGINAL_PATH_FILE_NAME,
};

#[derive(Error, Debug)]
pub enum PathsError {
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Filesystem locations used during a run.
///
/// Built once at startup and passed to whoever needs them.
#[derive(Debug, Clone, PartialEq)]
pub struct Paths {
    /// Where the transition frames are cached between runs.
    pub cache_dir: PathBuf,
    /// Scratch space for comparison frames.
    pub temp_dir: PathBuf,
    /// Single-line file holding the pre-blur wallpaper path.
    pub original_path_file: PathBuf,
    /// feh's background script naming the current wallpaper.
    pub fehbg_file: PathBuf,
}

impl Paths {
    /// Platform default locations.
    ///
    /// - cache: `$XDG_CACHE_HOME/blurwal/` or `~/.cache/blurwal/`
    /// - temp: `<system temp>/blurwal/`
    /// - fehbg: `~/.fehbg`
    pub fn discover() -> Result<Self, PathsError> {
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join(APP_DIR_NAME))
            .ok_or(PathsError::NoCacheDir)?;
        let home = dirs::home_dir().ok_or(PathsError::NoHomeDir)?;
        Ok(Self::with_dirs(
            cache_dir,
            std::env::temp_dir().join(APP_DIR_NAME),
            home.join(FEHBG_FILE_NAME),
        ))
    }

    pub fn with_dirs(cache_dir: PathBuf, temp_dir: PathBuf, fehbg_file: PathBuf) -> Self {
        let original_path_file = cache_dir.join(ORIGINAL_PATH_FILE_NAME);
        Self {
            cache_dir,
            temp_dir,
            original_path_file,
            fehbg_file,
        }
    }

    /// Create the cache and temp directories if missing.
    pub fn prepare(&self) -> Result<(), PathsError> {
        for dir in [&self.cache_dir, &self.temp_dir] {
            fs::create_dir_all(dir).map_err(|e| PathsError::CreateDir {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

/// File name of the frame for `level`, e.g. `frame-4.jpg`.
pub fn frame_file_name(level: u32) -> String {
    format!("{FRAME_PREFIX}{level}.{FRAME_EXTENSION}")
}

pub fn frame_path(dir: &Path, level: u32) -> PathBuf {
    dir.join(frame_file_name(level))
}

/// Level encoded in a `frame-<N>.<ext>` file name, if it is one.
///
/// The whole name must match, so leftovers such as `frame-3.jpg.bak` or
/// `frame-3.tar.gz` are not counted as frames.
pub fn parse_frame_level(file_name: &str) -> Option<u32> {
    let rest = file_name.strip_prefix(FRAME_PREFIX)?;
    let (digits, ext) = rest.split_once('.')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if ext.is_empty() || !ext.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    digits.parse().ok()
}

/// Whether a file stem looks like `frame-<N>` regardless of extension.
pub fn is_frame_stem(file_name: &str) -> bool {
    file_name
        .strip_prefix(FRAME_PREFIX)
        .map(|rest| rest.bytes().next().is_some_and(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}
