use std::sync::Arc;

use crate::desktop::domain::background::Background;
use crate::frames::domain::frame_store::FrameStore;
use crate::shared::blur_config::BlurConfig;
use crate::transition::domain::transition::Transition;

/// Decides when blurring starts and stops as the window count changes.
///
/// Transitions only alternate: a blur may start only while an unblur slot
/// is occupied and vice versa, whether or not that previous transition has
/// finished. The new transition resumes from the level the superseded one
/// actually reached, which is read only after it has been cancelled and
/// joined.
///
/// Once [`shutdown`](Self::shutdown) has run, no further transition is
/// launched.
pub struct BlurCoordinator {
    window_threshold: usize,
    steps: u32,
    background: Arc<dyn Background>,
    frames: FrameStore,
    blur: Option<Transition>,
    unblur: Option<Transition>,
    started: usize,
    stopped: bool,
}

impl BlurCoordinator {
    /// Both slots start out holding idle transitions at level 0, so the
    /// first window event always settles on a direction.
    pub fn new(config: &BlurConfig, background: Arc<dyn Background>, frames: FrameStore) -> Self {
        Self {
            window_threshold: config.window_threshold,
            steps: config.steps,
            background,
            frames,
            blur: Some(Transition::idle(0)),
            unblur: Some(Transition::idle(0)),
            started: 0,
            stopped: false,
        }
    }

    /// Start at most one transition for `window_count` and return the
    /// updated `(blur, unblur)` slots.
    pub fn init_transition(
        &mut self,
        window_count: usize,
        mut blur: Option<Transition>,
        mut unblur: Option<Transition>,
    ) -> (Option<Transition>, Option<Transition>) {
        if self.stopped {
            log::debug!("Ignoring window count {window_count} after shutdown");
            return (blur, unblur);
        }

        if window_count >= self.window_threshold {
            if let Some(mut previous) = unblur.take() {
                let level = previous.cancel_and_join();
                blur = Some(self.launch(level, self.steps));
            }
        }

        if window_count < self.window_threshold {
            if let Some(mut previous) = blur.take() {
                let level = previous.cancel_and_join();
                unblur = Some(self.launch(level, 0));
            }
        }

        (blur, unblur)
    }

    /// Handle one window-count-changing event.
    pub fn on_window_count(&mut self, window_count: usize) {
        let blur = self.blur.take();
        let unblur = self.unblur.take();
        let (blur, unblur) = self.init_transition(window_count, blur, unblur);
        self.blur = blur;
        self.unblur = unblur;
    }

    pub fn blur(&self) -> Option<&Transition> {
        self.blur.as_ref()
    }

    pub fn unblur(&self) -> Option<&Transition> {
        self.unblur.as_ref()
    }

    /// Number of transitions launched so far.
    pub fn transitions_started(&self) -> usize {
        self.started
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Cancel whatever is running and wait for it to stop. Later window
    /// counts still start transitions.
    pub fn halt(&mut self) {
        for transition in [self.blur.as_mut(), self.unblur.as_mut()].into_iter().flatten() {
            transition.cancel_and_join();
        }
    }

    /// Halt and refuse every later window count.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.halt();
    }

    /// Wait for running transitions to finish on their own.
    pub fn wait(&mut self) {
        for transition in [self.blur.as_mut(), self.unblur.as_mut()].into_iter().flatten() {
            transition.join();
        }
    }

    fn launch(&mut self, from: u32, to: u32) -> Transition {
        let mut transition = Transition::new(from, to);
        if let Err(e) = transition.spawn(self.background.clone(), self.frames.clone()) {
            log::error!("Could not start transition {from} -> {to}: {e}");
        }
        self.started += 1;
        transition
    }
}

impl Drop for BlurCoordinator {
    fn drop(&mut self) {
        self.halt();
    }
}
