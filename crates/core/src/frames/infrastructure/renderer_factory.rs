use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::frames::domain::frame_renderer::FrameRenderer;

use super::convert_frame_renderer::ConvertFrameRenderer;
use super::image_frame_renderer::ImageFrameRenderer;

/// Which tool renders the blurred frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RendererKind {
    /// In-process Gaussian blur.
    Builtin,
    /// ImageMagick's `convert`.
    ImageMagick,
}

impl RendererKind {
    pub const ALL: &[RendererKind] = &[RendererKind::Builtin, RendererKind::ImageMagick];
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RendererKind::Builtin => write!(f, "builtin"),
            RendererKind::ImageMagick => write!(f, "imagemagick"),
        }
    }
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "builtin" => Ok(RendererKind::Builtin),
            "imagemagick" | "convert" => Ok(RendererKind::ImageMagick),
            other => Err(format!(
                "renderer must be 'builtin' or 'imagemagick', got '{other}'"
            )),
        }
    }
}

pub fn create_renderer(kind: RendererKind) -> Arc<dyn FrameRenderer> {
    log::info!("Using {kind} frame renderer");
    match kind {
        RendererKind::Builtin => Arc::new(ImageFrameRenderer::new()),
        RendererKind::ImageMagick => Arc::new(ConvertFrameRenderer::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::builtin("builtin", RendererKind::Builtin)]
    #[case::imagemagick("imagemagick", RendererKind::ImageMagick)]
    #[case::convert_alias("convert", RendererKind::ImageMagick)]
    #[case::uppercase("BUILTIN", RendererKind::Builtin)]
    fn test_parse_renderer_kind(#[case] input: &str, #[case] expected: RendererKind) {
        assert_eq!(input.parse::<RendererKind>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_renderer_is_rejected() {
        assert!("gimp".parse::<RendererKind>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for kind in RendererKind::ALL {
            assert_eq!(kind.to_string().parse::<RendererKind>().unwrap(), *kind);
        }
    }

    #[test]
    fn test_create_renderer_for_each_kind() {
        for kind in RendererKind::ALL {
            let _ = create_renderer(*kind);
        }
    }
}
