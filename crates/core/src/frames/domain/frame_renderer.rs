use std::path::Path;

/// Error type shared by renderers; must cross worker threads.
pub type RenderError = Box<dyn std::error::Error + Send + Sync>;

/// Domain interface for producing a blurred copy of an image on disk.
///
/// Implementations must be deterministic: rendering the same source with
/// the same strength twice has to produce byte-identical files, otherwise
/// the cache validator sees every frame as outdated.
pub trait FrameRenderer: Send + Sync {
    fn render(&self, source: &Path, strength: f64, output: &Path) -> Result<(), RenderError>;
}
