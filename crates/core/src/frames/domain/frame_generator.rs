use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crate::frames::domain::frame_renderer::{FrameRenderer, RenderError};
use crate::shared::paths::frame_path;
use crate::shared::range::level_strength;

/// Outcome of regenerating a full set of frames.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenerationReport {
    /// Levels written successfully, ascending.
    pub generated: Vec<u32>,
    /// Levels whose render failed with the error message, ascending.
    pub failed: Vec<(u32, String)>,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

struct FrameJob {
    level: u32,
    strength: f64,
    output: PathBuf,
}

/// Renders transition frames from the original wallpaper.
///
/// Frame `level` is blurred with `level / steps * max_strength`, so the last
/// frame carries the full configured strength and frame 0 none at all.
pub struct FrameGenerator {
    renderer: Arc<dyn FrameRenderer>,
    workers: usize,
}

impl FrameGenerator {
    /// Generator whose pool matches the available CPU parallelism.
    pub fn new(renderer: Arc<dyn FrameRenderer>) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { renderer, workers }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Render one level into `output_dir` and return the written path.
    pub fn generate_level(
        &self,
        source: &Path,
        output_dir: &Path,
        level: u32,
        steps: u32,
        max_strength: f64,
    ) -> Result<PathBuf, RenderError> {
        let output = frame_path(output_dir, level);
        let strength = level_strength(level, steps, max_strength);
        log::debug!("Rendering frame {level} with strength {strength:.3}");
        self.renderer.render(source, strength, &output)?;
        Ok(output)
    }

    /// Render every level in `0..=steps` into `output_dir` on the worker pool.
    ///
    /// Jobs are independent; a failed level is logged and reported, and
    /// never stops the remaining jobs.
    pub fn generate_all(
        &self,
        source: &Path,
        output_dir: &Path,
        steps: u32,
        max_strength: f64,
    ) -> GenerationReport {
        if let Err(e) = fs::create_dir_all(output_dir) {
            log::error!("Could not create {}: {e}", output_dir.display());
            return GenerationReport {
                generated: Vec::new(),
                failed: (0..=steps).map(|l| (l, e.to_string())).collect(),
            };
        }

        let jobs: Vec<FrameJob> = (0..=steps)
            .map(|level| FrameJob {
                level,
                strength: level_strength(level, steps, max_strength),
                output: frame_path(output_dir, level),
            })
            .collect();

        let workers = self.workers.min(jobs.len()).max(1);
        let (job_tx, job_rx) = crossbeam_channel::bounded::<FrameJob>(workers);
        let (result_tx, result_rx) =
            crossbeam_channel::unbounded::<(u32, Result<(), String>)>();

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let renderer = &*self.renderer;
                scope.spawn(move || {
                    for job in job_rx {
                        let result = renderer
                            .render(source, job.strength, &job.output)
                            .map_err(|e| e.to_string());
                        if result_tx.send((job.level, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            for job in jobs {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
            drop(job_tx);
        });

        let mut report = GenerationReport::default();
        for (level, result) in result_rx {
            match result {
                Ok(()) => report.generated.push(level),
                Err(message) => {
                    log::warn!("Failed to render frame {level}: {message}");
                    report.failed.push((level, message));
                }
            }
        }
        report.generated.sort_unstable();
        report.failed.sort_by_key(|(level, _)| *level);
        report
    }
}
