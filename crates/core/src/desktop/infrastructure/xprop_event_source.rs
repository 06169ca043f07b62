use std::collections::{HashMap, HashSet};
use std::io::{self, BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::desktop::domain::background::DesktopError;
use crate::desktop::domain::window_event_source::{WindowEvent, WindowEventSource};

use super::xprop::{
    parse_cardinal, parse_window_ids, XpropError, CLIENT_LIST, CURRENT_DESKTOP, WM_DESKTOP,
    XPROP_PROGRAM,
};

/// Output of one `xprop -spy` reader thread. `window` is `None` for the
/// root spy.
#[derive(Debug)]
pub enum SpyMessage {
    Line { window: Option<String>, line: String },
    Eof { window: Option<String> },
    Failed { window: Option<String>, error: io::Error },
}

/// Window events read from `xprop -spy`.
///
/// A root spy prints a line every time the client list or the focused
/// workspace changes. Moving a window to another workspace touches neither
/// root property, so every listed client also gets its own spy on
/// `_NET_WM_DESKTOP`. Those spies follow the client list as it changes.
///
/// The initial property values are printed on start-up too, so the first
/// root events reflect the state at launch. The initial desktop of a window
/// is only remembered.
pub struct XpropEventSource {
    messages: Receiver<SpyMessage>,
    sender: Option<Sender<SpyMessage>>,
    root: Option<Child>,
    spies: HashMap<String, Child>,
    desktops: HashMap<String, Option<u64>>,
}

impl XpropEventSource {
    pub fn spawn() -> Result<Self, XpropError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let root = spawn_spy(&["-root", "-spy", CLIENT_LIST, CURRENT_DESKTOP], None, &tx)?;
        let mut source = Self::from_messages(rx);
        source.sender = Some(tx);
        source.root = Some(root);
        Ok(source)
    }

    /// Root spy output read from `reader`. No window spies are started.
    pub fn from_reader<R: BufRead + Send + 'static>(reader: R) -> Result<Self, XpropError> {
        let (tx, rx) = crossbeam_channel::unbounded();
        forward_lines(reader, None, tx).map_err(XpropError::Spy)?;
        Ok(Self::from_messages(rx))
    }

    /// Spy output delivered by someone else. No window spies are started,
    /// but window lines are still tracked against the client list.
    pub fn from_messages(messages: Receiver<SpyMessage>) -> Self {
        Self {
            messages,
            sender: None,
            root: None,
            spies: HashMap::new(),
            desktops: HashMap::new(),
        }
    }

    fn root_line(&mut self, line: &str) -> Option<WindowEvent> {
        let event = classify_line(line);
        match event {
            Some(WindowEvent::WindowsChanged) => self.track_windows(&parse_window_ids(line)),
            Some(_) => {}
            None => log::debug!("Ignoring xprop output: {}", line.trim_end()),
        }
        event
    }

    /// A window counts as moved only when its desktop differs from the last
    /// one seen for it.
    fn window_line(&mut self, id: &str, line: &str) -> Option<WindowEvent> {
        if classify_line(line) != Some(WindowEvent::WindowMoved) {
            return None;
        }
        let desktop = parse_cardinal(line, WM_DESKTOP)?;
        let last = self.desktops.get_mut(id)?;
        match last.replace(desktop) {
            Some(previous) if previous != desktop => {
                log::debug!("Window {id} moved from workspace {previous} to {desktop}");
                Some(WindowEvent::WindowMoved)
            }
            _ => None,
        }
    }

    fn track_windows(&mut self, ids: &[String]) {
        let listed: HashSet<&str> = ids.iter().map(String::as_str).collect();
        self.desktops.retain(|id, _| listed.contains(id.as_str()));
        self.spies.retain(|id, child| {
            let keep = listed.contains(id.as_str());
            if !keep {
                stop(child);
            }
            keep
        });

        for id in ids {
            self.desktops.entry(id.clone()).or_insert(None);
            let Some(sender) = &self.sender else {
                continue;
            };
            if self.spies.contains_key(id) {
                continue;
            }
            let args = ["-spy", "-id", id.as_str(), WM_DESKTOP];
            match spawn_spy(&args, Some(id.as_str()), sender) {
                Ok(child) => {
                    self.spies.insert(id.clone(), child);
                }
                Err(e) => log::warn!("Cannot watch window (id: {id}): {e}"),
            }
        }
    }
}

/// Event announced by one line of spy output, if any.
pub fn classify_line(line: &str) -> Option<WindowEvent> {
    let line = line.trim_start();
    let property = line.split(['(', ':']).next()?.trim();
    match property {
        CLIENT_LIST => Some(WindowEvent::WindowsChanged),
        CURRENT_DESKTOP => Some(WindowEvent::WorkspaceChanged),
        WM_DESKTOP => Some(WindowEvent::WindowMoved),
        _ => None,
    }
}

impl WindowEventSource for XpropEventSource {
    fn next_event(&mut self) -> Result<Option<WindowEvent>, DesktopError> {
        loop {
            let Ok(message) = self.messages.recv() else {
                return Ok(None);
            };
            let event = match message {
                SpyMessage::Line { window: None, line } => self.root_line(&line),
                SpyMessage::Line {
                    window: Some(id),
                    line,
                } => self.window_line(&id, &line),
                SpyMessage::Eof { window: None } => return Ok(None),
                SpyMessage::Failed {
                    window: None,
                    error,
                } => return Err(XpropError::Read(error).into()),
                SpyMessage::Eof { window: Some(id) } => {
                    log::debug!("Stopped watching window {id}");
                    None
                }
                SpyMessage::Failed {
                    window: Some(id),
                    error,
                } => {
                    log::debug!("Lost window {id}: {error}");
                    None
                }
            };
            if let Some(event) = event {
                return Ok(Some(event));
            }
        }
    }
}

impl Drop for XpropEventSource {
    fn drop(&mut self) {
        if let Some(mut root) = self.root.take() {
            stop(&mut root);
        }
        for child in self.spies.values_mut() {
            stop(child);
        }
    }
}

fn spawn_spy(
    args: &[&str],
    window: Option<&str>,
    sender: &Sender<SpyMessage>,
) -> Result<Child, XpropError> {
    // Window spies complain on stderr when their window goes away.
    let stderr = if window.is_some() {
        Stdio::null()
    } else {
        Stdio::inherit()
    };
    let mut child = Command::new(XPROP_PROGRAM)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(stderr)
        .spawn()
        .map_err(XpropError::Spy)?;

    let Some(stdout) = child.stdout.take() else {
        stop(&mut child);
        return Err(XpropError::Spy(io::Error::other("xprop stdout was not captured")));
    };
    if let Err(e) = forward_lines(
        BufReader::new(stdout),
        window.map(str::to_string),
        sender.clone(),
    ) {
        stop(&mut child);
        return Err(XpropError::Spy(e));
    }
    Ok(child)
}

/// Send every line of `reader` on a named thread until EOF or a failure.
fn forward_lines<R: BufRead + Send + 'static>(
    mut reader: R,
    window: Option<String>,
    sender: Sender<SpyMessage>,
) -> io::Result<()> {
    let name = match &window {
        Some(id) => format!("xprop-{id}"),
        None => "xprop-root".to_string(),
    };
    thread::Builder::new().name(name).spawn(move || loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                let _ = sender.send(SpyMessage::Eof { window });
                break;
            }
            Ok(_) => {
                let message = SpyMessage::Line {
                    window: window.clone(),
                    line,
                };
                if sender.send(message).is_err() {
                    break;
                }
            }
            Err(error) => {
                let _ = sender.send(SpyMessage::Failed { window, error });
                break;
            }
        }
    })?;
    Ok(())
}

fn stop(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
