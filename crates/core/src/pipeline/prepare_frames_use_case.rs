use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::desktop::domain::notifier::Notifier;
use crate::frames::domain::frame_cache_validator::{FrameCacheValidator, FrameError};
use crate::frames::domain::frame_generator::{FrameGenerator, GenerationReport};
use crate::frames::domain::frame_store::FrameStore;
use crate::pipeline::pipeline_logger::{PipelineLogger, StepOutcome};
use crate::shared::blur_config::BlurConfig;

/// Makes sure the cached transition frames match the given wallpaper:
/// validate → (regenerate if outdated).
pub struct PrepareFramesUseCase {
    generator: FrameGenerator,
    store: FrameStore,
    temp_dir: PathBuf,
    notifier: Arc<dyn Notifier>,
    steps: u32,
    max_strength: f64,
}

impl PrepareFramesUseCase {
    pub fn new(
        generator: FrameGenerator,
        store: FrameStore,
        temp_dir: impl Into<PathBuf>,
        notifier: Arc<dyn Notifier>,
        config: &BlurConfig,
    ) -> Self {
        Self {
            generator,
            store,
            temp_dir: temp_dir.into(),
            notifier,
            steps: config.steps,
            max_strength: config.max_strength,
        }
    }

    pub fn store(&self) -> &FrameStore {
        &self.store
    }

    pub fn frames_are_outdated(
        &self,
        source: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<bool, FrameError> {
        logger.step("Validating transition frames");
        let validator = FrameCacheValidator::new(&self.generator, &self.store, &self.temp_dir);
        match validator.check(source, self.steps, self.max_strength) {
            Ok(status) if status.is_outdated() => {
                logger.outcome(StepOutcome::Bad("Outdated"));
                Ok(true)
            }
            Ok(_) => {
                logger.outcome(StepOutcome::Good("Up-to-date"));
                Ok(false)
            }
            Err(e) => {
                logger.outcome(StepOutcome::Bad("Failed"));
                Err(e)
            }
        }
    }

    /// Render every frame from `source`, announcing it on the desktop since
    /// it can take a few seconds.
    pub fn generate_transition_frames(
        &self,
        source: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> GenerationReport {
        log::info!("Cache path for frames: {}", self.store.dir().display());

        logger.step("Generating transition frames");
        self.notifier
            .notify("Generating transition frames", "This may take a few seconds.");

        let report =
            self.generator
                .generate_all(source, self.store.dir(), self.steps, self.max_strength);

        if report.is_complete() {
            logger.outcome(StepOutcome::Good("Done"));
            self.notifier
                .notify("Transition frames generated", "Ready for fancy blurring!");
        } else {
            logger.outcome(StepOutcome::Bad("Incomplete"));
            log::warn!(
                "{} of {} frames could not be generated",
                report.failed.len(),
                self.steps + 1
            );
        }
        report
    }

    /// Validate the cache and regenerate it when outdated. Returns whether
    /// frames were regenerated.
    pub fn execute(
        &self,
        source: &Path,
        logger: &mut dyn PipelineLogger,
    ) -> Result<bool, FrameError> {
        if !self.frames_are_outdated(source, logger)? {
            return Ok(false);
        }
        self.generate_transition_frames(source, logger);
        Ok(true)
    }
}
