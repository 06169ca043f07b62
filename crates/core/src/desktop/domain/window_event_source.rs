use crate::desktop::domain::background::DesktopError;

/// Something happened that may have changed the number of visible windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowEvent {
    /// A window was created or destroyed.
    WindowsChanged,
    /// A different workspace was focused.
    WorkspaceChanged,
    /// A window was sent to another workspace.
    WindowMoved,
}

/// Blocking source of window events.
pub trait WindowEventSource: Send {
    /// Wait for the next event. `Ok(None)` means the source is exhausted.
    fn next_event(&mut self) -> Result<Option<WindowEvent>, DesktopError>;
}
