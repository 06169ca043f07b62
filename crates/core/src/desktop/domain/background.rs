use std::path::{Path, PathBuf};

/// Error type for desktop collaborators; must cross transition threads.
pub type DesktopError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for the desktop background.
pub trait Background: Send + Sync {
    /// Show the given image as the background.
    fn apply(&self, image: &Path) -> Result<(), DesktopError>;

    /// Path of the image currently shown as the background.
    fn current(&self) -> Result<PathBuf, DesktopError>;
}
