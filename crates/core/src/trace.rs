//! Scripted scroll traces: a recorded or synthetic sequence of host readings
//! that can be fed through the tracker without a browser.

use std::cell::Cell;

use rand::Rng;
use scrollstage_protocol::{ScrollMetrics, ScrollSample, StyleCommand};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::stage::Stage;
use crate::state::Committed;
use crate::tracker::{ManualScheduler, SamplingLoop, ScrollHost, ScrollTracker};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("invalid trace JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("trace has no samples")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub time_ms: f64,
    pub offset: f64,
    /// Overrides the trace-wide height from this sample on (late content).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTrace {
    pub document_height: f64,
    pub viewport_height: f64,
    pub samples: Vec<TracePoint>,
}

impl ScrollTrace {
    pub fn from_json(data: &[u8]) -> Result<Self, TraceError> {
        let trace: ScrollTrace = serde_json::from_slice(data)?;
        if trace.samples.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(trace)
    }
}

/// Host that replays a trace, one sample per [`advance`](TraceHost::advance).
pub struct TraceHost {
    trace: ScrollTrace,
    cursor: Cell<usize>,
    document_height: Cell<f64>,
}

impl TraceHost {
    pub fn new(trace: ScrollTrace) -> Self {
        let document_height = trace
            .samples
            .first()
            .and_then(|s| s.document_height)
            .unwrap_or(trace.document_height);
        Self {
            document_height: Cell::new(document_height),
            trace,
            cursor: Cell::new(0),
        }
    }

    /// Move to the next sample. Returns `false` past the end.
    pub fn advance(&self) -> bool {
        let next = self.cursor.get() + 1;
        let Some(point) = self.trace.samples.get(next) else {
            return false;
        };
        if let Some(height) = point.document_height {
            self.document_height.set(height);
        }
        self.cursor.set(next);
        true
    }

    pub fn time_ms(&self) -> f64 {
        self.trace
            .samples
            .get(self.cursor.get())
            .map_or(0.0, |p| p.time_ms)
    }
}

impl ScrollHost for TraceHost {
    fn sample(&self) -> Option<ScrollSample> {
        let point = self.trace.samples.get(self.cursor.get())?;
        Some(ScrollSample::new(
            ScrollMetrics::new(
                point.offset,
                self.document_height.get(),
                self.trace.viewport_height,
            ),
            point.time_ms,
        ))
    }
}

/// One replayed frame.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub time_ms: f64,
    pub progress: f64,
    pub velocity: f64,
    pub commands: Vec<StyleCommand>,
}

/// Feed every sample through a sampling loop and the stage, one frame per
/// sample. The first frame is the activation read.
pub fn replay<R: Rng + ?Sized>(
    trace: ScrollTrace,
    stage: &mut Stage,
    rng: &mut R,
) -> Vec<ReplayFrame> {
    let mut sampling = SamplingLoop::new(
        ScrollTracker::new(TraceHost::new(trace)),
        ManualScheduler::new(),
    );

    let mut frames = Vec::new();
    let mut emit = |committed: Committed, time_ms: f64, stage: &mut Stage| {
        frames.push(ReplayFrame {
            tick: committed.tick,
            time_ms,
            progress: committed.state.progress,
            velocity: committed.state.velocity,
            commands: stage.frame(&committed, time_ms, rng),
        });
    };

    emit(sampling.reader().get(), sampling.tracker().host().time_ms(), stage);
    sampling.start();
    while sampling.tracker().host().advance() {
        let Some(id) = sampling.pending_frame() else {
            break;
        };
        let Some(committed) = sampling.on_frame(id) else {
            break;
        };
        emit(committed, sampling.tracker().host().time_ms(), stage);
    }
    sampling.stop();
    frames
}
