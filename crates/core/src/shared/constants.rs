pub const APP_DIR_NAME: &str = "blurwal";

pub const FRAME_PREFIX: &str = "frame-";
pub const FRAME_EXTENSION: &str = "jpg";

/// Level re-rendered to check whether cached frames still match the wallpaper.
pub const SENTINEL_LEVEL: u32 = 1;

pub const DEFAULT_WINDOW_THRESHOLD: usize = 2;
pub const DEFAULT_STEPS: u32 = 10;
pub const DEFAULT_MAX_STRENGTH: f64 = 10.0;

/// Fewer steps would leave no intermediate frame between sharp and blurred.
pub const MIN_STEPS: u32 = 2;

pub const ORIGINAL_PATH_FILE_NAME: &str = "original-path";
pub const FEHBG_FILE_NAME: &str = ".fehbg";
