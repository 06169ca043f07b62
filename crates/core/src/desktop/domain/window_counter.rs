use crate::desktop::domain::background::DesktopError;

/// Counts the visible windows on the focused workspace.
pub trait WindowCounter: Send {
    /// Windows whose class is in `ignored_classes`, and windows that cannot
    /// be queried, are not counted.
    fn count_open_windows(&self, ignored_classes: &[String]) -> Result<usize, DesktopError>;
}
