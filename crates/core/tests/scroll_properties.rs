//! Property tests for the progress and velocity formulas, driven through the
//! public tracker API.

use std::cell::Cell;

use proptest::prelude::*;
use scrollstage_core::tracker::velocity;
use scrollstage_core::{ScrollHost, ScrollTracker};
use scrollstage_protocol::{ScrollMetrics, ScrollSample};

struct Scripted {
    sample: Cell<Option<ScrollSample>>,
}

impl Scripted {
    fn at(offset: f64, document_height: f64, viewport_height: f64, time_ms: f64) -> Self {
        let host = Self {
            sample: Cell::new(None),
        };
        host.set(offset, document_height, viewport_height, time_ms);
        host
    }

    fn set(&self, offset: f64, document_height: f64, viewport_height: f64, time_ms: f64) {
        self.sample.set(Some(ScrollSample::new(
            ScrollMetrics::new(offset, document_height, viewport_height),
            time_ms,
        )));
    }
}

impl ScrollHost for Scripted {
    fn sample(&self) -> Option<ScrollSample> {
        self.sample.get()
    }
}

proptest! {
    #[test]
    fn progress_is_offset_over_scroll_range(
        offset in -1.0e4f64..1.0e5,
        document_height in 0.0f64..1.0e5,
        viewport_height in 0.0f64..1.0e5,
    ) {
        let tracker = ScrollTracker::new(Scripted::at(offset, document_height, viewport_height, 0.0));
        let progress = tracker.current().state.progress;
        let range = document_height - viewport_height;
        if range > 0.0 {
            prop_assert_eq!(progress, offset / range);
        } else {
            prop_assert_eq!(progress, 0.0);
        }
    }

    #[test]
    fn page_shorter_than_viewport_reads_zero(
        offset in -1.0e4f64..1.0e4,
        viewport_height in 1.0f64..1.0e4,
        shortfall in 0.0f64..1.0,
    ) {
        let document_height = viewport_height * shortfall;
        let tracker = ScrollTracker::new(Scripted::at(offset, document_height, viewport_height, 0.0));
        prop_assert_eq!(tracker.current().state.progress, 0.0);
    }

    #[test]
    fn equal_timestamps_give_zero_velocity(
        a in -1.0e4f64..1.0e4,
        b in -1.0e4f64..1.0e4,
        time_ms in 0.0f64..1.0e7,
    ) {
        let metrics = |offset| ScrollMetrics::new(offset, 5000.0, 1000.0);
        let prev = ScrollSample::new(metrics(a), time_ms);
        let cur = ScrollSample::new(metrics(b), time_ms);
        prop_assert_eq!(velocity(&prev, &cur), 0.0);
    }

    #[test]
    fn constant_speed_gives_constant_velocity(
        speed in -20.0f64..20.0,
        frame_ms in 1.0f64..50.0,
        frames in 2usize..30,
    ) {
        let host = Scripted::at(0.0, 1.0e6, 1000.0, 0.0);
        let mut tracker = ScrollTracker::new(&host);
        for i in 1..=frames {
            let t = frame_ms * i as f64;
            host.set(speed * t, 1.0e6, 1000.0, t);
            let committed = tracker.tick();
            prop_assert!((committed.state.velocity - speed).abs() < 1e-6);
        }
    }

    #[test]
    fn outputs_stay_finite_for_any_reading(
        offset in proptest::num::f64::ANY,
        document_height in proptest::num::f64::ANY,
        viewport_height in proptest::num::f64::ANY,
        time_ms in proptest::num::f64::ANY,
        next_offset in proptest::num::f64::ANY,
        next_time in proptest::num::f64::ANY,
    ) {
        let host = Scripted::at(offset, document_height, viewport_height, time_ms);
        let mut tracker = ScrollTracker::new(&host);
        host.set(next_offset, document_height, viewport_height, next_time);
        let state = tracker.tick().state;
        prop_assert!(state.progress.is_finite());
        prop_assert!(state.velocity.is_finite());
    }
}
