//! Blur-on-hide controller.
//!
//! `Visible -> Blurred` when the surface is hidden or loses focus: blur is
//! applied, the attempt counter is bumped once, and the callback runs.
//! `Blurred -> Visible` when it comes back, but only after the unblur delay;
//! hiding again before the delay elapses cancels the pending unblur.
//!
//! The unblur timer is a spawned task tagged with a generation number. Every
//! transition bumps the generation, so a timer that lost a race never acts.

use crate::config::CaptureConfig;
use crate::surface::{CapturePhase, ReadingSurface, SurfaceEvent};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Invoked with the running total after each new capture attempt.
pub type AttemptCallback = Arc<dyn Fn(u32) + Send + Sync>;

/// Shared count of suspected capture attempts in one reading session.
#[derive(Debug, Clone, Default)]
pub struct AttemptCounter(Arc<AtomicU32>);

impl AttemptCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one and returns the new total.
    pub fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

struct State {
    phase: CapturePhase,
    generation: u64,
    pending_unblur: Option<JoinHandle<()>>,
    active: bool,
    attempts: AttemptCounter,
    on_attempt: Option<AttemptCallback>,
}

struct Inner {
    surface: Arc<dyn ReadingSurface>,
    state: Mutex<State>,
    unblur_delay: Duration,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // The state is plain data; a panicked holder cannot leave it torn.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Drives one reading surface between visible and blurred.
///
/// Cloning yields another handle to the same controller.
#[derive(Clone)]
pub struct CaptureController {
    inner: Arc<Inner>,
}

impl CaptureController {
    pub fn new(surface: Arc<dyn ReadingSurface>, config: &CaptureConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                surface,
                state: Mutex::new(State {
                    phase: CapturePhase::Visible,
                    generation: 0,
                    pending_unblur: None,
                    active: true,
                    attempts: AttemptCounter::new(),
                    on_attempt: None,
                }),
                unblur_delay: config.unblur_delay(),
            }),
        }
    }

    /// Sets the callback invoked on each new attempt.
    pub fn with_on_attempt(self, on_attempt: AttemptCallback) -> Self {
        self.inner.lock().on_attempt = Some(on_attempt);
        self
    }

    /// Counts attempts on `counter`, e.g. one owned by a reading session.
    pub fn with_counter(self, counter: AttemptCounter) -> Self {
        self.inner.lock().attempts = counter;
        self
    }

    pub fn phase(&self) -> CapturePhase {
        self.inner.lock().phase
    }

    pub fn attempts(&self) -> u32 {
        self.inner.lock().attempts.get()
    }

    pub fn counter(&self) -> AttemptCounter {
        self.inner.lock().attempts.clone()
    }

    /// Applies one surface event.
    ///
    /// Outside a tokio runtime there is no timer and the unblur is immediate.
    pub fn handle_event(&self, event: SurfaceEvent) {
        if event.conceals() {
            self.conceal();
        } else {
            self.reveal();
        }
    }

    fn conceal(&self) {
        let (total, on_attempt) = {
            let mut state = self.inner.lock();
            if !state.active {
                return;
            }
            state.generation += 1;
            if let Some(pending) = state.pending_unblur.take() {
                pending.abort();
                debug!("Cancelled pending unblur");
            }
            if state.phase == CapturePhase::Blurred {
                return;
            }
            state.phase = CapturePhase::Blurred;
            self.inner.surface.apply_blur();
            (state.attempts.increment(), state.on_attempt.clone())
        };

        info!("Surface concealed, capture attempt {total}");
        if let Some(on_attempt) = on_attempt {
            on_attempt(total);
        }
    }

    fn reveal(&self) {
        let mut state = self.inner.lock();
        if !state.active || state.phase == CapturePhase::Visible || state.pending_unblur.is_some()
        {
            return;
        }

        state.generation += 1;
        let generation = state.generation;
        let delay = self.inner.unblur_delay;
        let inner = Arc::clone(&self.inner);

        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                state.pending_unblur = Some(runtime.spawn(async move {
                    tokio::time::sleep(delay).await;
                    let mut state = inner.lock();
                    if state.active
                        && state.generation == generation
                        && state.phase == CapturePhase::Blurred
                    {
                        state.phase = CapturePhase::Visible;
                        state.pending_unblur = None;
                        inner.surface.remove_blur();
                        debug!("Surface unblurred");
                    }
                }));
            }
            Err(_) => {
                warn!("No async runtime for unblur timer; unblurring immediately");
                state.phase = CapturePhase::Visible;
                self.inner.surface.remove_blur();
            }
        }
    }

    /// Resets the attempt counter, e.g. when a new session begins.
    pub fn reset_attempts(&self) {
        self.inner.lock().attempts.reset();
    }

    /// Cancels timers, stops reacting to events and forces `Visible`.
    pub fn shutdown(&self) {
        let mut state = self.inner.lock();
        if !state.active {
            return;
        }
        state.active = false;
        state.generation += 1;
        if let Some(pending) = state.pending_unblur.take() {
            pending.abort();
        }
        if state.phase == CapturePhase::Blurred {
            state.phase = CapturePhase::Visible;
            self.inner.surface.remove_blur();
        }
        debug!("Capture controller shut down");
    }

    /// Spawns the event pump feeding `events` into this controller.
    pub fn attach(self, mut events: mpsc::Receiver<SurfaceEvent>) -> CaptureHandle {
        let controller = self.clone();
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                controller.handle_event(event);
            }
            debug!("Surface event stream closed");
        });
        CaptureHandle {
            controller: self,
            pump: Some(pump),
        }
    }
}

/// Installs capture resistance on `surface` with default settings.
///
/// Must be called inside a tokio runtime. Dropping the handle, or calling
/// [`CaptureHandle::cleanup`], tears everything down.
pub fn setup_anti_screenshot(
    surface: Arc<dyn ReadingSurface>,
    events: mpsc::Receiver<SurfaceEvent>,
    on_attempt: Option<AttemptCallback>,
) -> CaptureHandle {
    let mut controller = CaptureController::new(surface, &CaptureConfig::default());
    if let Some(on_attempt) = on_attempt {
        controller = controller.with_on_attempt(on_attempt);
    }
    controller.attach(events)
}

/// Owns the event pump of an attached controller.
pub struct CaptureHandle {
    controller: CaptureController,
    pump: Option<JoinHandle<()>>,
}

impl CaptureHandle {
    pub fn controller(&self) -> &CaptureController {
        &self.controller
    }

    pub fn phase(&self) -> CapturePhase {
        self.controller.phase()
    }

    pub fn attempts(&self) -> u32 {
        self.controller.attempts()
    }

    pub fn cleanup(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.controller.shutdown();
    }
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}
