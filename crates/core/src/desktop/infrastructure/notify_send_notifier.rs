use crate::desktop::domain::notifier::Notifier;
use crate::shared::command::run_status;

pub const NOTIFY_SEND_PROGRAM: &str = "notify-send";

/// Desktop notifications through libnotify's `notify-send`.
pub struct NotifySendNotifier {
    program: String,
}

impl NotifySendNotifier {
    pub fn new() -> Self {
        Self {
            program: NOTIFY_SEND_PROGRAM.to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for NotifySendNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for NotifySendNotifier {
    fn notify(&self, title: &str, body: &str) {
        match run_status(&self.program, [title, body]) {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                log::info!("libnotify not installed, cannot show notification.");
            }
            Err(e) => log::debug!("Notification failed: {e}"),
        }
    }
}
