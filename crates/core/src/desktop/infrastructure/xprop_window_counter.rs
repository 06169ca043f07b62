use crate::desktop::domain::background::DesktopError;
use crate::desktop::domain::window_counter::WindowCounter;
use crate::shared::command::run_capture;

use super::xprop::{
    count_on_desktop, parse_cardinal, parse_window_ids, WindowInfo, XpropError, CLIENT_LIST,
    CURRENT_DESKTOP, WM_CLASS, WM_DESKTOP, XPROP_PROGRAM,
};

/// Counts windows through the EWMH properties exposed by the window manager.
pub struct XpropWindowCounter {
    program: String,
}

impl XpropWindowCounter {
    pub fn new() -> Self {
        Self {
            program: XPROP_PROGRAM.to_string(),
        }
    }

    fn window_info(&self, id: &str) -> Option<WindowInfo> {
        match run_capture(&self.program, ["-id", id, WM_DESKTOP, WM_CLASS]) {
            Ok(output) => Some(WindowInfo::parse(id, &output)),
            Err(e) => {
                // Windows may disappear between listing and querying.
                log::info!("Bad window (id: {id}): {e}");
                None
            }
        }
    }
}

impl Default for XpropWindowCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowCounter for XpropWindowCounter {
    fn count_open_windows(&self, ignored_classes: &[String]) -> Result<usize, DesktopError> {
        let root = run_capture(&self.program, ["-root", CURRENT_DESKTOP, CLIENT_LIST])?;
        let current = parse_cardinal(&root, CURRENT_DESKTOP)
            .ok_or(XpropError::MissingProperty(CURRENT_DESKTOP))?;

        let windows: Vec<WindowInfo> = parse_window_ids(&root)
            .iter()
            .filter_map(|id| self.window_info(id))
            .collect();

        let count = count_on_desktop(current, &windows, ignored_classes);
        log::debug!("{count} window(s) open on workspace {current}");
        Ok(count)
    }
}
