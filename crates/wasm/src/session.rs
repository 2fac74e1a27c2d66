use std::cell::RefCell;

use rand::rngs::SmallRng;
use scrollstage_core::{FrameScheduler, SamplingLoop, ScrollHost, Stage};
use scrollstage_protocol::StyleCommand;

/// Stage plus its sampling loop, without any DOM. `sampling` is `None` when
/// the page has no window or document to track.
pub struct Session<H: ScrollHost, S: FrameScheduler> {
    stage: Stage,
    rng: SmallRng,
    sampling: Option<SamplingLoop<H, S>>,
    last_commands: Vec<StyleCommand>,
}

impl<H: ScrollHost, S: FrameScheduler> Session<H, S> {
    pub fn new(stage: Stage, rng: SmallRng, sampling: Option<SamplingLoop<H, S>>) -> Self {
        Self {
            stage,
            rng,
            sampling,
            last_commands: Vec::new(),
        }
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    pub fn is_running(&self) -> bool {
        self.sampling.as_ref().is_some_and(SamplingLoop::is_running)
    }

    pub fn last_commands(&self) -> &[StyleCommand] {
        &self.last_commands
    }

    /// Frame callback body. `None` when nothing is tracked or the loop is not
    /// waiting for a frame (stopped, or a callback that outlived `stop`).
    pub fn frame(&mut self, now_ms: f64) -> Option<&[StyleCommand]> {
        let sampling = self.sampling.as_mut()?;
        let id = sampling.pending_frame()?;
        let committed = sampling.on_frame(id)?;
        self.last_commands = self.stage.frame(&committed, now_ms, &mut self.rng);
        Some(&self.last_commands)
    }

    /// Install the frame callback into `slot`, then request the first frame.
    /// The slot is emptied again when sampling does not start, which is
    /// always the case after `stop`.
    pub fn start<C>(&mut self, slot: &RefCell<Option<C>>, callback: impl FnOnce() -> C) -> bool {
        let Some(sampling) = self.sampling.as_mut() else {
            return false;
        };
        if sampling.is_running() {
            return true;
        }
        *slot.borrow_mut() = Some(callback());
        let running = sampling.start();
        if !running {
            slot.borrow_mut().take();
        }
        running
    }

    /// Cancel the pending frame and drop the callback. Final.
    pub fn stop<C>(&mut self, slot: &RefCell<Option<C>>) {
        if let Some(sampling) = self.sampling.as_mut() {
            sampling.stop();
        }
        slot.borrow_mut().take();
    }
}
