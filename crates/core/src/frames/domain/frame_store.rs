use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::shared::paths::{frame_path, parse_frame_level};

/// The directory of cached `frame-<N>.<ext>` files, addressed by level.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, level: u32) -> PathBuf {
        frame_path(&self.dir, level)
    }

    /// Levels that have a frame file on disk. A missing directory has none.
    pub fn discovered_levels(&self) -> io::Result<BTreeSet<u32>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeSet::new()),
            Err(e) => return Err(e),
        };

        let mut levels = BTreeSet::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(level) = entry.file_name().to_str().and_then(parse_frame_level) {
                levels.insert(level);
            }
        }
        Ok(levels)
    }

    /// Levels in `0..=steps` without a frame, in ascending order.
    pub fn missing_levels(&self, steps: u32) -> io::Result<Vec<u32>> {
        let found = self.discovered_levels()?;
        Ok((0..=steps).filter(|l| !found.contains(l)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn test_discovers_frame_levels_only() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "frame-0.jpg");
        touch(tmp.path(), "frame-3.jpg");
        touch(tmp.path(), "frame-12.png");
        touch(tmp.path(), "original-path");
        touch(tmp.path(), "notes.txt");
        fs::create_dir(tmp.path().join("frame-5.jpg")).unwrap();

        let store = FrameStore::new(tmp.path());
        let levels: Vec<u32> = store.discovered_levels().unwrap().into_iter().collect();
        assert_eq!(levels, vec![0, 3, 12]);
    }

    #[test]
    fn test_missing_directory_has_no_levels() {
        let tmp = TempDir::new().unwrap();
        let store = FrameStore::new(tmp.path().join("absent"));
        assert!(store.discovered_levels().unwrap().is_empty());
        assert_eq!(store.missing_levels(2).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_missing_levels() {
        let tmp = TempDir::new().unwrap();
        for level in [0, 1, 3] {
            touch(tmp.path(), &format!("frame-{level}.jpg"));
        }
        let store = FrameStore::new(tmp.path());
        assert_eq!(store.missing_levels(4).unwrap(), vec![2, 4]);
        assert!(store.missing_levels(1).unwrap().is_empty());
    }

    #[test]
    fn test_frame_path() {
        let store = FrameStore::new("/cache/blurwal");
        assert_eq!(
            store.frame_path(7),
            PathBuf::from("/cache/blurwal/frame-7.jpg")
        );
    }
}
