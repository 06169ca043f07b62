use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::frames::domain::frame_generator::FrameGenerator;
use crate::frames::domain::frame_store::FrameStore;
use crate::shared::constants::SENTINEL_LEVEL;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("failed to list cached frames in {path}: {source}")]
    ListCache {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read frame {path}: {source}")]
    ReadFrame {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Verdict on the cached frame set.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheStatus {
    UpToDate,
    /// These levels have no frame on disk.
    MissingFrames(Vec<u32>),
    /// The sentinel frame no longer matches a fresh render.
    SourceChanged,
    /// The sentinel could not be rendered for comparison.
    ReferenceUnavailable(String),
}

impl CacheStatus {
    pub fn is_outdated(&self) -> bool {
        !matches!(self, CacheStatus::UpToDate)
    }
}

/// Decides whether the cached frames still match the current wallpaper.
///
/// The cache is always regenerated as a whole, so it is assumed to be
/// internally consistent: re-rendering the single sentinel level and
/// comparing bytes is enough to detect a changed source or strength.
pub struct FrameCacheValidator<'a> {
    generator: &'a FrameGenerator,
    store: &'a FrameStore,
    temp_dir: &'a Path,
}

impl<'a> FrameCacheValidator<'a> {
    pub fn new(generator: &'a FrameGenerator, store: &'a FrameStore, temp_dir: &'a Path) -> Self {
        Self {
            generator,
            store,
            temp_dir,
        }
    }

    pub fn check(
        &self,
        source: &Path,
        steps: u32,
        max_strength: f64,
    ) -> Result<CacheStatus, FrameError> {
        let missing = self
            .store
            .missing_levels(steps)
            .map_err(|e| FrameError::ListCache {
                path: self.store.dir().to_path_buf(),
                source: e,
            })?;
        if !missing.is_empty() {
            log::info!("One or more frames are missing: {missing:?}");
            return Ok(CacheStatus::MissingFrames(missing));
        }

        // Any extension counts as present above; the comparison needs the exact file.
        let cached = self.store.frame_path(SENTINEL_LEVEL);
        if !cached.is_file() {
            log::info!("Reference frame {} is missing", cached.display());
            return Ok(CacheStatus::MissingFrames(vec![SENTINEL_LEVEL]));
        }

        if let Err(e) = fs::create_dir_all(self.temp_dir) {
            log::warn!("Could not create {}: {e}", self.temp_dir.display());
        }
        let reference = match self.generator.generate_level(
            source,
            self.temp_dir,
            SENTINEL_LEVEL,
            steps,
            max_strength,
        ) {
            Ok(path) => path,
            Err(e) => {
                log::warn!("Could not render reference frame: {e}");
                return Ok(CacheStatus::ReferenceUnavailable(e.to_string()));
            }
        };

        if files_equal(&reference, &cached)? {
            Ok(CacheStatus::UpToDate)
        } else {
            log::info!("Wallpaper appears to have changed.");
            Ok(CacheStatus::SourceChanged)
        }
    }

    pub fn frames_are_outdated(
        &self,
        source: &Path,
        steps: u32,
        max_strength: f64,
    ) -> Result<bool, FrameError> {
        Ok(self.check(source, steps, max_strength)?.is_outdated())
    }
}

fn files_equal(a: &Path, b: &Path) -> Result<bool, FrameError> {
    let len_a = file_len(a)?;
    let len_b = file_len(b)?;
    if len_a != len_b {
        return Ok(false);
    }
    Ok(read(a)? == read(b)?)
}

fn file_len(path: &Path) -> Result<u64, FrameError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| FrameError::ReadFrame {
            path: path.to_path_buf(),
            source: e,
        })
}

fn read(path: &Path) -> Result<Vec<u8>, FrameError> {
    fs::read(path).map_err(|e| FrameError::ReadFrame {
        path: path.to_path_buf(),
        source: e,
    })
}
