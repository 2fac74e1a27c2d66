use serde::{Deserialize, Serialize};

/// The committed `(progress, velocity)` pair.
///
/// `progress` is `offset / max_offset` and is deliberately left unclamped:
/// it may briefly leave `[0, 1]` during programmatic scroll or layout shift.
/// `velocity` is pixels per millisecond, signed (positive = scrolling down).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollState {
    pub progress: f64,
    pub velocity: f64,
}

impl ScrollState {
    pub fn new(progress: f64, velocity: f64) -> Self {
        Self { progress, velocity }
    }
}

/// Scroll geometry as read from the host, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub offset: f64,
    pub document_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(offset: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            offset,
            document_height,
            viewport_height,
        }
    }

    /// Largest reachable scroll offset. Non-positive for pages shorter than
    /// the viewport.
    pub fn max_offset(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    /// Normalized scroll progress; `0.0` whenever the page cannot scroll or
    /// the geometry is not finite.
    pub fn progress(&self) -> f64 {
        let max = self.max_offset();
        if !max.is_finite() || !self.offset.is_finite() || max <= 0.0 {
            return 0.0;
        }
        let progress = self.offset / max;
        if progress.is_finite() { progress } else { 0.0 }
    }
}

/// One reading of the host: geometry plus a high-resolution timestamp (ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollSample {
    pub metrics: ScrollMetrics,
    pub time_ms: f64,
}

impl ScrollSample {
    pub fn new(metrics: ScrollMetrics, time_ms: f64) -> Self {
        Self { metrics, time_ms }
    }
}
