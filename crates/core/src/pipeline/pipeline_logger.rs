use std::io::{self, Stdout, Write};

/// How a reported step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome<'a> {
    Good(&'a str),
    Bad(&'a str),
}

/// Cross-cutting reporter for user-facing progress of the use cases.
///
/// Decouples use cases from where the progress ends up, so the CLI can
/// print status lines while tests stay silent.
pub trait PipelineLogger: Send {
    /// A step has started. Its outcome follows through [`Self::outcome`].
    fn step(&mut self, task: &str);

    /// The step announced last has finished.
    fn outcome(&mut self, outcome: StepOutcome<'_>);

    /// A standalone status message.
    fn info(&mut self, message: &str);
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn step(&mut self, _task: &str) {}
    fn outcome(&mut self, _outcome: StepOutcome<'_>) {}
    fn info(&mut self, _message: &str) {}
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// CLI logger printing `:: Task... Outcome` lines.
///
/// The step and its outcome share a line, so the step is flushed before
/// the (possibly slow) work begins.
pub struct StdoutPipelineLogger<W = Stdout> {
    out: W,
    colored: bool,
}

impl StdoutPipelineLogger<Stdout> {
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            colored: true,
        }
    }
}

impl Default for StdoutPipelineLogger<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> StdoutPipelineLogger<W> {
    /// Uncolored logger writing into `out`.
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            colored: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        // Progress output is best-effort; a closed stdout must not stop blurring.
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            log::debug!("Could not write progress: {e}");
        }
    }
}

impl<W: Write + Send> PipelineLogger for StdoutPipelineLogger<W> {
    fn step(&mut self, task: &str) {
        log::debug!("Step started: {task}");
        self.write(&format!(":: {task}... "));
    }

    fn outcome(&mut self, outcome: StepOutcome<'_>) {
        let (color, text) = match outcome {
            StepOutcome::Good(text) => (GREEN, text),
            StepOutcome::Bad(text) => (RED, text),
        };
        let line = if self.colored {
            format!("{color}{text}{RESET}\n")
        } else {
            format!("{text}\n")
        };
        self.write(&line);
    }

    fn info(&mut self, message: &str) {
        self.write(&format!(":: {message}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.step("Validating transition frames");
        logger.outcome(StepOutcome::Good("Up-to-date"));
        logger.info("hello");
    }

    #[test]
    fn test_step_and_outcome_share_a_line() {
        let mut logger = StdoutPipelineLogger::with_writer(Vec::new());
        logger.step("Validating transition frames");
        logger.outcome(StepOutcome::Bad("Outdated"));
        logger.info("Ready and waiting for window events...");

        let text = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(
            text,
            ":: Validating transition frames... Outdated\n\
             :: Ready and waiting for window events...\n"
        );
    }

    #[test]
    fn test_colored_outcome_wraps_text() {
        let mut logger = StdoutPipelineLogger {
            out: Vec::new(),
            colored: true,
        };
        logger.outcome(StepOutcome::Good("Done"));
        let text = String::from_utf8(logger.into_inner()).unwrap();
        assert_eq!(text, "\x1b[32mDone\x1b[0m\n");
    }
}
