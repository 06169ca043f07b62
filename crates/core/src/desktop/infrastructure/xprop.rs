//! Parsing of `xprop` output for EWMH window properties.

use thiserror::Error;

pub const XPROP_PROGRAM: &str = "xprop";

pub const CURRENT_DESKTOP: &str = "_NET_CURRENT_DESKTOP";
pub const CLIENT_LIST: &str = "_NET_CLIENT_LIST";
pub const WM_DESKTOP: &str = "_NET_WM_DESKTOP";
pub const WM_CLASS: &str = "WM_CLASS";

#[derive(Error, Debug)]
pub enum XpropError {
    #[error("the window manager does not expose {0}")]
    MissingProperty(&'static str),
    #[error("failed to start `xprop -spy`: {0}")]
    Spy(#[source] std::io::Error),
    #[error("failed to read window events: {0}")]
    Read(#[source] std::io::Error),
}

/// Value line for `property`, e.g. `_NET_WM_DESKTOP(CARDINAL) = 0`.
fn property_line<'a>(output: &'a str, property: &str) -> Option<&'a str> {
    output.lines().map(str::trim).find(|line| {
        line.strip_prefix(property)
            .map(|rest| rest.starts_with('(') || rest.starts_with(':'))
            .unwrap_or(false)
    })
}

/// Numeric value of a `CARDINAL` property; `None` if absent ("not found.").
pub fn parse_cardinal(output: &str, property: &str) -> Option<u64> {
    let line = property_line(output, property)?;
    let (_, value) = line.split_once('=')?;
    value.split(',').next()?.trim().parse().ok()
}

/// Window ids listed in `_NET_CLIENT_LIST`.
pub fn parse_window_ids(output: &str) -> Vec<String> {
    property_line(output, CLIENT_LIST)
        .and_then(|line| line.split_once('#'))
        .map(|(_, ids)| {
            ids.split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Class part (the second string) of `WM_CLASS`.
pub fn parse_wm_class(output: &str) -> Option<String> {
    let line = property_line(output, WM_CLASS)?;
    let (_, value) = line.split_once('=')?;
    let parts: Vec<&str> = value
        .split(',')
        .map(|s| s.trim().trim_matches('"'))
        .collect();
    parts.get(1).map(|s| s.to_string())
}

/// What one window looks like to the counter.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowInfo {
    pub id: String,
    pub desktop: Option<u64>,
    pub class: Option<String>,
}

impl WindowInfo {
    pub fn parse(id: &str, output: &str) -> Self {
        Self {
            id: id.to_string(),
            desktop: parse_cardinal(output, WM_DESKTOP),
            class: parse_wm_class(output),
        }
    }
}

/// Windows on `current_desktop` whose class is not ignored.
///
/// Windows without a desktop number cannot be placed and are skipped.
pub fn count_on_desktop(current_desktop: u64, windows: &[WindowInfo], ignored: &[String]) -> usize {
    let mut count = 0;
    for window in windows {
        match window.desktop {
            None => {
                log::warn!("Window (id: {}) has no workspace number.", window.id);
                continue;
            }
            Some(desktop) if desktop != current_desktop => continue,
            Some(_) => {}
        }

        if let Some(class) = &window.class {
            if ignored.iter().any(|c| c == class) {
                log::info!("Ignoring window with class '{class}'.");
                continue;
            }
        }
        count += 1;
    }
    count
}
