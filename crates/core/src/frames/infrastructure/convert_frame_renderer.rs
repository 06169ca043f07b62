use std::ffi::OsString;
use std::path::Path;

use crate::frames::domain::frame_renderer::{FrameRenderer, RenderError};
use crate::shared::command::run_status;

pub const CONVERT_PROGRAM: &str = "convert";

/// Blurs frames with ImageMagick's `convert -blur 0x<sigma>`.
///
/// A radius of 0 lets ImageMagick pick one that suits the sigma.
pub struct ConvertFrameRenderer {
    program: String,
}

impl ConvertFrameRenderer {
    pub fn new() -> Self {
        Self {
            program: CONVERT_PROGRAM.to_string(),
        }
    }

    /// Use a different executable, e.g. `magick` on ImageMagick 7.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn args(source: &Path, strength: f64, output: &Path) -> Vec<OsString> {
        vec![
            source.as_os_str().to_owned(),
            OsString::from("-blur"),
            OsString::from(format!("0x{strength}")),
            output.as_os_str().to_owned(),
        ]
    }
}

impl Default for ConvertFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for ConvertFrameRenderer {
    fn render(&self, source: &Path, strength: f64, output: &Path) -> Result<(), RenderError> {
        run_status(&self.program, Self::args(source, strength, output))?;
        Ok(())
    }
}
