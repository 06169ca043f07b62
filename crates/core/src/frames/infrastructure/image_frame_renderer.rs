use std::path::Path;

use crate::frames::domain::frame_renderer::{FrameRenderer, RenderError};

/// Blurs frames in-process with the `image` crate's Gaussian blur.
///
/// The output format follows the output file's extension. Alpha is
/// dropped since frames are stored as JPEG.
pub struct ImageFrameRenderer;

impl ImageFrameRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRenderer for ImageFrameRenderer {
    fn render(&self, source: &Path, strength: f64, output: &Path) -> Result<(), RenderError> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = image::open(source)?.to_rgb8();
        let img = if strength > 0.0 {
            image::imageops::blur(&img, strength as f32)
        } else {
            img
        };

        img.save(output)?;
        Ok(())
    }
}
