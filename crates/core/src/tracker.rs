use std::rc::Rc;

use scrollstage_protocol::{ScrollMetrics, ScrollSample, ScrollState};
use tracing::{debug, warn};

use crate::state::{self, Committed, StateReader, StateWriter};

/// Source of scroll geometry and time.
///
/// Returns `None` when the host APIs are unavailable (no window, detached
/// document, non-interactive render). The tracker then publishes the default
/// state instead of failing.
pub trait ScrollHost {
    fn sample(&self) -> Option<ScrollSample>;
}

impl<H: ScrollHost + ?Sized> ScrollHost for Rc<H> {
    fn sample(&self) -> Option<ScrollSample> {
        (**self).sample()
    }
}

impl<H: ScrollHost + ?Sized> ScrollHost for &H {
    fn sample(&self) -> Option<ScrollSample> {
        (**self).sample()
    }
}

/// Handle of a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(pub u64);

/// Per-display-refresh callback scheduling (`requestAnimationFrame` and
/// friends). The host invokes [`SamplingLoop::on_frame`] when a requested
/// frame fires.
pub trait FrameScheduler {
    /// Ask for one callback on the next frame. `None` if the host cannot
    /// provide frame callbacks.
    fn request_frame(&mut self) -> Option<FrameId>;

    fn cancel_frame(&mut self, id: FrameId);
}

/// Velocity in px/ms between two samples. Zero for non-positive elapsed time.
pub fn velocity(previous: &ScrollSample, current: &ScrollSample) -> f64 {
    let dt = current.time_ms - previous.time_ms;
    if dt > 0.0 {
        let v = (current.metrics.offset - previous.metrics.offset) / dt;
        if v.is_finite() { v } else { 0.0 }
    } else {
        0.0
    }
}

fn usable(sample: ScrollSample) -> Option<ScrollSample> {
    (sample.time_ms.is_finite() && sample.metrics.offset.is_finite()).then_some(sample)
}

/// Derives `(progress, velocity)` from successive host samples.
///
/// The tracker is the only writer of the published state.
pub struct ScrollTracker<H> {
    host: H,
    writer: StateWriter,
    previous: Option<ScrollSample>,
}

impl<H: ScrollHost> ScrollTracker<H> {
    /// Activate the tracker.
    ///
    /// Reads the host once, synchronously, so a page restored mid-scroll
    /// publishes its real progress before the first frame.
    pub fn new(host: H) -> Self {
        let previous = host.sample().and_then(usable);
        let metrics = previous.map(|s| s.metrics).unwrap_or_default();
        let (writer, _) = state::channel(Committed {
            tick: 0,
            state: ScrollState::new(metrics.progress(), 0.0),
            metrics,
        });
        if previous.is_none() {
            debug!("scroll host unavailable at activation, starting from defaults");
        }
        Self {
            host,
            writer,
            previous,
        }
    }

    /// One sampling step: read, differentiate, normalize, commit.
    pub fn tick(&mut self) -> Committed {
        let Some(sample) = self.host.sample().and_then(usable) else {
            self.previous = None;
            return self
                .writer
                .commit(ScrollState::default(), ScrollMetrics::default());
        };

        let velocity = self
            .previous
            .as_ref()
            .map_or(0.0, |previous| velocity(previous, &sample));
        // Document height is re-read every tick; content loads change it.
        let progress = sample.metrics.progress();
        self.previous = Some(sample);

        self.writer
            .commit(ScrollState::new(progress, velocity), sample.metrics)
    }

    pub fn reader(&self) -> StateReader {
        self.writer.reader()
    }

    pub fn current(&self) -> Committed {
        self.writer.current()
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running { pending: FrameId },
    Stopped,
}

/// Drives a [`ScrollTracker`] once per frame until torn down.
///
/// The loop never listens to scroll events; frame pacing coalesces bursts of
/// input into one commit per refresh. Dropping the loop cancels its pending
/// frame.
pub struct SamplingLoop<H: ScrollHost, S: FrameScheduler> {
    tracker: ScrollTracker<H>,
    scheduler: S,
    state: LoopState,
}

impl<H: ScrollHost, S: FrameScheduler> SamplingLoop<H, S> {
    pub fn new(tracker: ScrollTracker<H>, scheduler: S) -> Self {
        Self {
            tracker,
            scheduler,
            state: LoopState::Idle,
        }
    }

    /// Request the first frame. Returns whether the loop is running.
    /// Restarting a stopped loop is not supported.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Idle {
            self.state = match self.scheduler.request_frame() {
                Some(pending) => {
                    debug!("scroll sampling started");
                    LoopState::Running { pending }
                }
                None => {
                    warn!("no frame source, scroll sampling disabled");
                    LoopState::Stopped
                }
            };
        }
        self.is_running()
    }

    /// Frame callback. Ticks and schedules the next frame only if `id` is the
    /// frame this loop is waiting for.
    pub fn on_frame(&mut self, id: FrameId) -> Option<Committed> {
        if self.state != (LoopState::Running { pending: id }) {
            return None;
        }

        let committed = self.tracker.tick();
        self.state = match self.scheduler.request_frame() {
            Some(pending) => LoopState::Running { pending },
            None => {
                warn!("frame source went away, scroll sampling stopped");
                LoopState::Stopped
            }
        };
        Some(committed)
    }

    /// Tear down: cancel the pending frame and never request another.
    pub fn stop(&mut self) {
        if let LoopState::Running { pending } = self.state {
            self.scheduler.cancel_frame(pending);
            debug!("scroll sampling stopped");
        }
        self.state = LoopState::Stopped;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running { .. })
    }

    /// The frame the loop is currently waiting for.
    pub fn pending_frame(&self) -> Option<FrameId> {
        match self.state {
            LoopState::Running { pending } => Some(pending),
            LoopState::Idle | LoopState::Stopped => None,
        }
    }

    pub fn reader(&self) -> StateReader {
        self.tracker.reader()
    }

    pub fn tracker(&self) -> &ScrollTracker<H> {
        &self.tracker
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

impl<H: ScrollHost, S: FrameScheduler> Drop for SamplingLoop<H, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scheduler for hosts that pump frames themselves (terminal preview,
/// trace replay, tests). Hands out increasing ids and counts requests.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameId>,
    requested: u64,
    cancelled: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameId> {
        self.pending
    }

    pub fn requested(&self) -> u64 {
        self.requested
    }

    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        self.next_id += 1;
        self.requested += 1;
        let id = FrameId(self.next_id);
        self.pending = Some(id);
        Some(id)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        if self.pending == Some(id) {
            self.pending = None;
            self.cancelled += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;

    /// Host whose next reading is set by the test.
    struct FakeHost {
        reading: Cell<Option<ScrollSample>>,
    }

    impl FakeHost {
        fn at(offset: f64, document_height: f64, viewport_height: f64, time_ms: f64) -> Rc<Self> {
            Rc::new(Self {
                reading: Cell::new(Some(ScrollSample::new(
                    ScrollMetrics::new(offset, document_height, viewport_height),
                    time_ms,
                ))),
            })
        }

        fn set(&self, offset: f64, time_ms: f64) {
            let mut sample = self.reading.get().unwrap_or(ScrollSample::new(
                ScrollMetrics::new(0.0, 3000.0, 1000.0),
                0.0,
            ));
            sample.metrics.offset = offset;
            sample.time_ms = time_ms;
            self.reading.set(Some(sample));
        }

        fn resize(&self, document_height: f64) {
            if let Some(mut sample) = self.reading.get() {
                sample.metrics.document_height = document_height;
                self.reading.set(Some(sample));
            }
        }

        fn detach(&self) {
            self.reading.set(None);
        }
    }

    impl ScrollHost for FakeHost {
        fn sample(&self) -> Option<ScrollSample> {
            self.reading.get()
        }
    }

    /// Scheduler that records every request and cancellation.
    #[derive(Default)]
    struct SpyScheduler {
        requests: Rc<Cell<u64>>,
        cancels: Rc<RefCell<Vec<FrameId>>>,
    }

    impl FrameScheduler for SpyScheduler {
        fn request_frame(&mut self) -> Option<FrameId> {
            let n = self.requests.get() + 1;
            self.requests.set(n);
            Some(FrameId(n))
        }

        fn cancel_frame(&mut self, id: FrameId) {
            self.cancels.borrow_mut().push(id);
        }
    }

    struct NoFrames;

    impl FrameScheduler for NoFrames {
        fn request_frame(&mut self) -> Option<FrameId> {
            None
        }

        fn cancel_frame(&mut self, _id: FrameId) {}
    }

    #[test]
    fn activation_reads_restored_scroll_position() {
        let host = FakeHost::at(1000.0, 3000.0, 1000.0, 5.0);
        let tracker = ScrollTracker::new(host);
        let current = tracker.current();
        assert_eq!(current.tick, 0);
        assert!((current.state.progress - 0.5).abs() < f64::EPSILON);
        assert_eq!(current.state.velocity, 0.0);
    }

    #[test]
    fn velocity_from_consecutive_samples() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(host.clone());
        host.set(16.0, 16.0);
        let committed = tracker.tick();
        assert!((committed.state.velocity - 1.0).abs() < 1e-12);
        assert!((committed.state.progress - 0.008).abs() < 1e-12);
    }

    #[test]
    fn duplicate_timestamp_gives_zero_velocity() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 10.0);
        let mut tracker = ScrollTracker::new(host.clone());
        host.set(200.0, 10.0);
        let committed = tracker.tick();
        assert_eq!(committed.state.velocity, 0.0);
        assert!((committed.state.progress - 0.1).abs() < 1e-12);
    }

    #[test]
    fn stationary_page_gives_zero_velocity() {
        let host = FakeHost::at(400.0, 3000.0, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(host.clone());
        for t in 1..5 {
            host.set(400.0, f64::from(t) * 16.0);
            assert_eq!(tracker.tick().state.velocity, 0.0);
        }
    }

    #[test]
    fn document_height_is_reread_every_tick() {
        let host = FakeHost::at(1000.0, 3000.0, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(host.clone());
        host.resize(5000.0);
        host.set(1000.0, 16.0);
        let committed = tracker.tick();
        assert!((committed.state.progress - 0.25).abs() < 1e-12);
    }

    #[test]
    fn detached_host_degrades_to_defaults() {
        let host = FakeHost::at(1000.0, 3000.0, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(host.clone());
        host.detach();
        let committed = tracker.tick();
        assert_eq!(committed.state, ScrollState::default());

        // Re-attached host has no previous sample, so no velocity spike.
        host.set(2000.0, 32.0);
        let committed = tracker.tick();
        assert_eq!(committed.state.velocity, 0.0);
    }

    #[test]
    fn host_without_window_starts_at_zero() {
        let host = Rc::new(FakeHost {
            reading: Cell::new(None),
        });
        let tracker = ScrollTracker::new(host);
        assert_eq!(tracker.current().state, ScrollState::default());
    }

    #[test]
    fn nan_offset_is_treated_as_unavailable() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(host.clone());
        host.set(f64::NAN, 16.0);
        let committed = tracker.tick();
        assert!(committed.state.progress.is_finite());
        assert!(committed.state.velocity.is_finite());
    }

    #[test]
    fn loop_ticks_once_per_frame() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let mut sampling = SamplingLoop::new(ScrollTracker::new(host.clone()), ManualScheduler::new());
        assert!(sampling.start());
        assert!(sampling.start());
        assert_eq!(sampling.scheduler().requested(), 1);

        for frame in 1..=3 {
            host.set(f64::from(frame) * 32.0, f64::from(frame) * 16.0);
            let id = sampling.pending_frame();
            assert!(id.is_some());
            let committed = id.and_then(|id| sampling.on_frame(id));
            assert!(committed.is_some_and(|c| (c.state.velocity - 2.0).abs() < 1e-12));
        }
        assert_eq!(sampling.reader().get().tick, 3);
    }

    #[test]
    fn stale_frame_is_ignored() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let mut sampling = SamplingLoop::new(ScrollTracker::new(host), ManualScheduler::new());
        sampling.start();
        assert!(sampling.on_frame(FrameId(999)).is_none());
        assert_eq!(sampling.scheduler().requested(), 1);
    }

    #[test]
    fn teardown_stops_scheduling() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let spy = SpyScheduler::default();
        let requests = spy.requests.clone();
        let cancels = spy.cancels.clone();

        let mut sampling = SamplingLoop::new(ScrollTracker::new(host), spy);
        sampling.start();
        let first = sampling.pending_frame();
        if let Some(id) = first {
            sampling.on_frame(id);
        }
        let pending = sampling.pending_frame();
        sampling.stop();

        let after_stop = requests.get();
        assert_eq!(cancels.borrow().as_slice(), pending.as_slice());

        // A callback that was already in flight must not revive the loop.
        if let Some(id) = pending {
            assert!(sampling.on_frame(id).is_none());
        }
        assert!(!sampling.start());
        assert_eq!(requests.get(), after_stop);
        assert!(!sampling.is_running());
    }

    #[test]
    fn drop_cancels_pending_frame() {
        let host = FakeHost::at(0.0, 3000.0, 1000.0, 0.0);
        let spy = SpyScheduler::default();
        let cancels = spy.cancels.clone();
        {
            let mut sampling = SamplingLoop::new(ScrollTracker::new(host), spy);
            sampling.start();
        }
        assert_eq!(cancels.borrow().len(), 1);
    }

    #[test]
    fn missing_frame_source_keeps_default_state() {
        let host = FakeHost::at(1000.0, 3000.0, 1000.0, 0.0);
        let mut sampling = SamplingLoop::new(ScrollTracker::new(host), NoFrames);
        assert!(!sampling.start());
        assert!(sampling.pending_frame().is_none());
    }
}
