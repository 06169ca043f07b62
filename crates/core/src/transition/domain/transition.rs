use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::desktop::domain::background::Background;
use crate::frames::domain::frame_store::FrameStore;

/// Lifecycle of a transition: `Created → Running → {Completed | Cancelled}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Created,
    Running,
    Completed,
    Cancelled,
}

impl TransitionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => TransitionState::Created,
            1 => TransitionState::Running,
            2 => TransitionState::Completed,
            _ => TransitionState::Cancelled,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            TransitionState::Created => 0,
            TransitionState::Running => 1,
            TransitionState::Completed => 2,
            TransitionState::Cancelled => 3,
        }
    }

    pub fn is_finished(self) -> bool {
        matches!(self, TransitionState::Completed | TransitionState::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards higher levels.
    Blur,
    /// Towards lower levels.
    Unblur,
    /// Start equals target; nothing to do.
    Stay,
}

/// State shared between a transition's owner and the thread running it.
///
/// The running thread is the only writer of `current_level`.
#[derive(Debug)]
struct Progress {
    current_level: AtomicU32,
    cancelled: AtomicBool,
    state: AtomicU8,
}

/// Clonable handle that can request cancellation from anywhere.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    progress: Arc<Progress>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.progress.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.cancelled.load(Ordering::Relaxed)
    }

    pub fn current_level(&self) -> u32 {
        self.progress.current_level.load(Ordering::Acquire)
    }
}

/// Levels visited when moving from `start` to `target`, in visiting order.
///
/// Blurring visits `start+1 ..= target` ascending; unblurring visits
/// `start-1` down to `target`. The start level itself is never revisited.
pub fn level_sequence(start: u32, target: u32) -> Vec<u32> {
    if start > target {
        (target..start).rev().collect()
    } else {
        (start + 1..=target).collect()
    }
}

/// One directional walk across blur levels, applying each level's frame
/// as the background.
///
/// Cancellation is cooperative: it is checked before each level, so a
/// background update that is already in flight always finishes. The
/// current level is recorded before its background update is issued, and
/// after cancellation it names the last level actually applied.
#[derive(Debug)]
pub struct Transition {
    start: u32,
    target: u32,
    progress: Arc<Progress>,
    handle: Option<JoinHandle<()>>,
}

impl Transition {
    pub fn new(start: u32, target: u32) -> Self {
        Self {
            start,
            target,
            progress: Arc::new(Progress {
                current_level: AtomicU32::new(start),
                cancelled: AtomicBool::new(false),
                state: AtomicU8::new(TransitionState::Created.as_u8()),
            }),
            handle: None,
        }
    }

    /// A transition resting at `level` that never moves.
    pub fn idle(level: u32) -> Self {
        Self::new(level, level)
    }

    pub fn start_level(&self) -> u32 {
        self.start
    }

    pub fn target_level(&self) -> u32 {
        self.target
    }

    pub fn direction(&self) -> Direction {
        match self.start.cmp(&self.target) {
            std::cmp::Ordering::Less => Direction::Blur,
            std::cmp::Ordering::Greater => Direction::Unblur,
            std::cmp::Ordering::Equal => Direction::Stay,
        }
    }

    pub fn current_level(&self) -> u32 {
        self.progress.current_level.load(Ordering::Acquire)
    }

    pub fn state(&self) -> TransitionState {
        TransitionState::from_u8(self.progress.state.load(Ordering::Acquire))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            progress: self.progress.clone(),
        }
    }

    /// Request cancellation. A no-op on a finished transition's level.
    pub fn cancel(&self) {
        self.progress.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.cancelled.load(Ordering::Relaxed)
    }

    /// Walk the levels on the calling thread. Returns the final state.
    ///
    /// Only the first call does any work; later calls return the state
    /// reached so far.
    pub fn run(&self, background: &dyn Background, frames: &FrameStore) -> TransitionState {
        run_levels(&self.progress, self.start, self.target, background, frames)
    }

    /// Walk the levels on a dedicated thread and return immediately.
    pub fn spawn(&mut self, background: Arc<dyn Background>, frames: FrameStore) -> io::Result<()> {
        if self.handle.is_some() || self.state() != TransitionState::Created {
            log::warn!(
                "Transition {} -> {} was already started",
                self.start,
                self.target
            );
            return Ok(());
        }

        let progress = self.progress.clone();
        let (start, target) = (self.start, self.target);
        let handle = thread::Builder::new()
            .name(format!("transition-{start}-{target}"))
            .spawn(move || {
                run_levels(&progress, start, target, &*background, &frames);
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Wait for a spawned run to stop. Returns immediately if none was spawned.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Transition {} -> {} panicked", self.start, self.target);
            }
        }
    }

    /// Cancel, wait until the level stops changing, and return it.
    pub fn cancel_and_join(&mut self) -> u32 {
        self.cancel();
        self.join();
        self.current_level()
    }
}

impl Drop for Transition {
    fn drop(&mut self) {
        // An unreachable transition must not keep changing the wallpaper.
        self.cancel();
    }
}

fn run_levels(
    progress: &Progress,
    start: u32,
    target: u32,
    background: &dyn Background,
    frames: &FrameStore,
) -> TransitionState {
    let claimed = progress.state.compare_exchange(
        TransitionState::Created.as_u8(),
        TransitionState::Running.as_u8(),
        Ordering::AcqRel,
        Ordering::Acquire,
    );
    if let Err(state) = claimed {
        return TransitionState::from_u8(state);
    }

    if start > target {
        log::info!("Unblurring from blur level {start} to {target}.");
    } else if start < target {
        log::info!("Blurring from blur level {start} to {target}.");
    }

    for level in level_sequence(start, target) {
        if progress.cancelled.load(Ordering::Relaxed) {
            log::debug!(
                "Transition {start} -> {target} cancelled at level {}",
                progress.current_level.load(Ordering::Acquire)
            );
            progress
                .state
                .store(TransitionState::Cancelled.as_u8(), Ordering::Release);
            return TransitionState::Cancelled;
        }

        progress.current_level.store(level, Ordering::Release);

        let frame = frames.frame_path(level);
        log::debug!("Setting wallpaper to: {}", frame.display());
        if let Err(e) = background.apply(&frame) {
            log::warn!("Failed to set wallpaper to {}: {e}", frame.display());
        }
    }

    progress
        .state
        .store(TransitionState::Completed.as_u8(), Ordering::Release);
    TransitionState::Completed
}
