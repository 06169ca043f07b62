use thiserror::Error;

use crate::shared::constants::{
    DEFAULT_MAX_STRENGTH, DEFAULT_STEPS, DEFAULT_WINDOW_THRESHOLD, MIN_STEPS,
};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("the transition must have at least {MIN_STEPS} steps, got {0}")]
    TooFewSteps(u32),
    #[error("blur strength must be a finite non-negative number, got {0}")]
    InvalidStrength(f64),
}

/// Settings that stay fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BlurConfig {
    /// Minimum number of windows on the workspace to blur the wallpaper.
    pub window_threshold: usize,
    /// Number of levels between sharp and fully blurred.
    pub steps: u32,
    /// Blur sigma used at the last level.
    pub max_strength: f64,
    /// Window classes excluded when counting windows.
    pub ignored_classes: Vec<String>,
}

impl BlurConfig {
    pub fn new(
        window_threshold: usize,
        steps: u32,
        max_strength: f64,
        ignored_classes: Vec<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            window_threshold,
            steps,
            max_strength,
            ignored_classes,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps < MIN_STEPS {
            return Err(ConfigError::TooFewSteps(self.steps));
        }
        if !self.max_strength.is_finite() || self.max_strength < 0.0 {
            return Err(ConfigError::InvalidStrength(self.max_strength));
        }
        Ok(())
    }
}

impl Default for BlurConfig {
    fn default() -> Self {
        Self {
            window_threshold: DEFAULT_WINDOW_THRESHOLD,
            steps: DEFAULT_STEPS,
            max_strength: DEFAULT_MAX_STRENGTH,
            ignored_classes: Vec::new(),
        }
    }
}
