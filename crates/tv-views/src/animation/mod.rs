//! Frame-rate independent animation scheduling
//!
//! The scheduler never reads a clock. The host passes the current time to
//! [`AnimationScheduler::tick`], which makes every animation reproducible
//! under a virtual clock.

mod easing;
mod progress;
mod timer;

pub use easing::Easing;
pub use progress::ProgressCell;
pub use timer::RefreshTimer;

use tracing::trace;
use tv_core::{ConfigError, ConfigResult};

/// Identifier of a scheduled animation, unique per scheduler
pub type AnimationId = u64;

/// Callback receiving the eased progress of every tick
pub type FrameCallback = Box<dyn FnMut(f64) + Send + Sync>;

/// Lifecycle of an animation handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Registered, start time not latched yet
    Idle,
    Running,
    Completed,
    Cancelled,
}

impl AnimationState {
    pub fn is_finished(&self) -> bool {
        matches!(self, AnimationState::Completed | AnimationState::Cancelled)
    }
}

/// Timing parameters of an animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSpec {
    duration_ms: f64,
    delay_ms: f64,
    easing: Easing,
    repeat: bool,
}

impl AnimationSpec {
    /// One-shot linear animation; the duration must be finite and positive
    pub fn new(duration_ms: f64) -> ConfigResult<Self> {
        if !(duration_ms.is_finite() && duration_ms > 0.0) {
            return Err(ConfigError::InvalidDuration(duration_ms));
        }
        Ok(Self {
            duration_ms,
            delay_ms: 0.0,
            easing: Easing::Linear,
            repeat: false,
        })
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Hold progress at zero for `delay_ms` after the start time
    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = if delay_ms.is_finite() { delay_ms.max(0.0) } else { 0.0 };
        self
    }

    /// Loop forever, wrapping progress modulo 1
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn is_repeating(&self) -> bool {
        self.repeat
    }

    /// Raw progress `elapsed` milliseconds after the start time
    pub fn progress_at(&self, elapsed: f64) -> f64 {
        let active = elapsed - self.delay_ms;
        if active <= 0.0 {
            return 0.0;
        }
        let raw = active / self.duration_ms;
        if self.repeat {
            raw.fract()
        } else {
            raw.min(1.0)
        }
    }
}

struct AnimationHandle {
    id: AnimationId,
    spec: AnimationSpec,
    state: AnimationState,
    start_time: Option<f64>,
    progress: f64,
    on_frame: FrameCallback,
}

/// Owns every animation of one widget
#[derive(Default)]
pub struct AnimationScheduler {
    handles: Vec<AnimationHandle>,
    next_id: AnimationId,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an animation; it starts on the next tick
    pub fn start(&mut self, spec: AnimationSpec, on_frame: FrameCallback) -> AnimationId {
        let id = self.next_id;
        self.next_id += 1;
        self.handles.push(AnimationHandle {
            id,
            spec,
            state: AnimationState::Idle,
            start_time: None,
            progress: 0.0,
            on_frame,
        });
        trace!("Animation {} registered ({} ms)", id, spec.duration_ms);
        id
    }

    /// Advance every live animation to `now_ms`
    ///
    /// Returns the number of frame callbacks invoked.
    pub fn tick(&mut self, now_ms: f64) -> usize {
        let mut invoked = 0;
        for handle in self.handles.iter_mut().filter(|h| !h.state.is_finished()) {
            let start = *handle.start_time.get_or_insert(now_ms);
            handle.state = AnimationState::Running;

            let progress = handle.spec.progress_at((now_ms - start).max(0.0));
            handle.progress = progress;
            (handle.on_frame)(handle.spec.easing.apply(progress));
            invoked += 1;

            if !handle.spec.repeat && progress >= 1.0 {
                handle.state = AnimationState::Completed;
                trace!("Animation {} completed", handle.id);
            }
        }
        invoked
    }

    /// Stop an animation; its callback is never invoked again
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        match self.handles.iter_mut().find(|h| h.id == id) {
            Some(handle) if !handle.state.is_finished() => {
                handle.state = AnimationState::Cancelled;
                true
            }
            _ => false,
        }
    }

    pub fn cancel_all(&mut self) {
        for handle in self.handles.iter_mut().filter(|h| !h.state.is_finished()) {
            handle.state = AnimationState::Cancelled;
        }
    }

    pub fn state(&self, id: AnimationId) -> Option<AnimationState> {
        self.handles.iter().find(|h| h.id == id).map(|h| h.state)
    }

    /// Un-eased progress as of the last tick
    pub fn progress(&self, id: AnimationId) -> Option<f64> {
        self.handles.iter().find(|h| h.id == id).map(|h| h.progress)
    }

    /// Number of animations still waiting for or receiving ticks
    pub fn active_count(&self) -> usize {
        self.handles.iter().filter(|h| !h.state.is_finished()).count()
    }

    /// Handles held, finished ones included until pruned
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn is_animating(&self) -> bool {
        self.active_count() > 0
    }

    /// Forget completed and cancelled handles
    pub fn prune(&mut self) {
        self.handles.retain(|h| !h.state.is_finished());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (ProgressCell, FrameCallback) {
        let cell = ProgressCell::new(-1.0);
        let callback = cell.setter();
        (cell, callback)
    }

    #[test]
    fn test_invalid_durations() {
        assert_eq!(AnimationSpec::new(0.0).unwrap_err(), ConfigError::InvalidDuration(0.0));
        assert!(AnimationSpec::new(-10.0).is_err());
        assert!(AnimationSpec::new(f64::NAN).is_err());
        assert!(AnimationSpec::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_linear_progress_and_completion() {
        let mut scheduler = AnimationScheduler::new();
        let (cell, callback) = recorder();
        let id = scheduler.start(AnimationSpec::new(1000.0).unwrap(), callback);
        assert_eq!(scheduler.state(id), Some(AnimationState::Idle));

        // Start time latches on the first tick
        scheduler.tick(5000.0);
        assert_eq!(cell.get(), 0.0);
        assert_eq!(scheduler.state(id), Some(AnimationState::Running));

        scheduler.tick(5500.0);
        assert!((cell.get() - 0.5).abs() < 1e-12);

        scheduler.tick(7000.0);
        assert_eq!(cell.get(), 1.0);
        assert_eq!(scheduler.state(id), Some(AnimationState::Completed));

        cell.set(-1.0);
        assert_eq!(scheduler.tick(8000.0), 0);
        assert_eq!(cell.get(), -1.0);
    }

    #[test]
    fn test_frame_rate_independence() {
        let sample = |steps: usize| {
            let mut scheduler = AnimationScheduler::new();
            let (cell, callback) = recorder();
            let spec = AnimationSpec::new(1500.0).unwrap().with_easing(Easing::EaseOutCubic);
            scheduler.start(spec, callback);
            scheduler.tick(0.0);
            for i in 1..=steps {
                scheduler.tick(900.0 * i as f64 / steps as f64);
            }
            cell.get()
        };
        let coarse = sample(3);
        let fine = sample(90);
        assert!((coarse - fine).abs() < 1e-12);
        assert!((coarse - Easing::EaseOutCubic.apply(0.6)).abs() < 1e-12);
    }

    #[test]
    fn test_cancel_stops_callbacks() {
        let mut scheduler = AnimationScheduler::new();
        let (cell, callback) = recorder();
        let id = scheduler.start(AnimationSpec::new(100.0).unwrap(), callback);
        scheduler.tick(0.0);
        assert!(scheduler.cancel(id));
        assert!(!scheduler.cancel(id));

        cell.set(-1.0);
        scheduler.tick(50.0);
        assert_eq!(cell.get(), -1.0);
        assert_eq!(scheduler.state(id), Some(AnimationState::Cancelled));
    }

    #[test]
    fn test_repeat_wraps() {
        let mut scheduler = AnimationScheduler::new();
        let (cell, callback) = recorder();
        let id = scheduler.start(AnimationSpec::new(200.0).unwrap().repeating(), callback);
        scheduler.tick(0.0);
        scheduler.tick(250.0);
        assert!((cell.get() - 0.25).abs() < 1e-12);
        scheduler.tick(10_100.0);
        assert!((cell.get() - 0.5).abs() < 1e-9);
        assert_eq!(scheduler.state(id), Some(AnimationState::Running));
    }

    #[test]
    fn test_delay_holds_at_zero() {
        let spec = AnimationSpec::new(100.0).unwrap().with_delay(300.0);
        assert_eq!(spec.progress_at(299.0), 0.0);
        assert!((spec.progress_at(350.0) - 0.5).abs() < 1e-12);
        assert_eq!(spec.progress_at(1000.0), 1.0);
    }

    #[test]
    fn test_handles_coexist_and_cancel_all() {
        let mut scheduler = AnimationScheduler::new();
        let (a, cb_a) = recorder();
        let (b, cb_b) = recorder();
        scheduler.start(AnimationSpec::new(100.0).unwrap(), cb_a);
        scheduler.start(AnimationSpec::new(400.0).unwrap(), cb_b);
        scheduler.tick(0.0);
        assert_eq!(scheduler.tick(100.0), 2);
        assert_eq!(a.get(), 1.0);
        assert!((b.get() - 0.25).abs() < 1e-12);
        assert_eq!(scheduler.active_count(), 1);

        scheduler.cancel_all();
        assert!(!scheduler.is_animating());
        scheduler.prune();
        assert_eq!(scheduler.tick(200.0), 0);
    }
}
