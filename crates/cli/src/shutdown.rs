use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};

use blurwal_core::desktop::domain::background::Background;
use blurwal_core::desktop::domain::original_wallpaper::OriginalWallpaper;
use blurwal_core::transition::domain::blur_coordinator::BlurCoordinator;

/// Everything needed to leave the desktop as it was found.
#[derive(Clone)]
pub struct Cleanup {
    coordinator: Arc<Mutex<BlurCoordinator>>,
    background: Arc<dyn Background>,
    original: OriginalWallpaper,
}

impl Cleanup {
    pub fn new(
        coordinator: Arc<Mutex<BlurCoordinator>>,
        background: Arc<dyn Background>,
        original: OriginalWallpaper,
    ) -> Self {
        Self {
            coordinator,
            background,
            original,
        }
    }

    /// Stop transitions for good, then put the original wallpaper back.
    pub fn run(&self) {
        self.coordinator
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .shutdown();
        if let Err(e) = self.original.restore(&*self.background) {
            log::error!("Could not restore the original wallpaper: {e}");
        }
    }
}

/// Restores the original wallpaper when SIGINT or SIGTERM arrives.
pub struct SignalGuard {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalGuard {
    pub fn install(cleanup: Cleanup) -> io::Result<Self> {
        let mut signals = Signals::new([SIGINT, SIGTERM])?;
        let handle = signals.handle();
        let thread = std::thread::Builder::new()
            .name("blurwal-signals".to_string())
            .spawn(move || {
                if let Some(signal) = signals.forever().next() {
                    log::info!("Received signal {signal}, cleaning up");
                    cleanup.run();
                    println!("\nBye!");
                    std::process::exit(0);
                }
            })?;
        Ok(Self {
            handle,
            thread: Some(thread),
        })
    }
}

impl Drop for SignalGuard {
    fn drop(&mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
