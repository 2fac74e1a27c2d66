use std::cell::RefCell;
use std::rc::Rc;

use scrollstage_core::{FrameId, FrameScheduler, ScrollHost};
use scrollstage_protocol::{ScrollMetrics, ScrollSample};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Window;

/// Reads scroll geometry from the live page. Any missing API makes the host
/// unavailable for that frame.
pub struct WindowHost {
    window: Window,
}

impl WindowHost {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl ScrollHost for WindowHost {
    fn sample(&self) -> Option<ScrollSample> {
        let offset = self.window.scroll_y().ok()?;
        let viewport_height = self.window.inner_height().ok()?.as_f64()?;
        let document_height = f64::from(
            self.window
                .document()?
                .document_element()?
                .scroll_height(),
        );
        let time_ms = self.window.performance()?.now();
        Some(ScrollSample::new(
            ScrollMetrics::new(offset, document_height, viewport_height),
            time_ms,
        ))
    }
}

/// Slot for the frame callback. Shared between the scheduler that hands it
/// to the browser and the owner that installs and drops it.
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

pub struct RafScheduler {
    window: Window,
    callback: FrameCallback,
}

impl RafScheduler {
    pub fn new(window: Window, callback: FrameCallback) -> Self {
        Self { window, callback }
    }
}

impl FrameScheduler for RafScheduler {
    fn request_frame(&mut self) -> Option<FrameId> {
        let callback = self.callback.borrow();
        let function = callback.as_ref()?.as_ref().unchecked_ref();
        let handle = self.window.request_animation_frame(function).ok()?;
        u64::try_from(handle).ok().map(FrameId)
    }

    fn cancel_frame(&mut self, id: FrameId) {
        let Ok(handle) = i32::try_from(id.0) else {
            return;
        };
        if let Err(e) = self.window.cancel_animation_frame(handle) {
            web_sys::console::warn_2(&"scrollstage: cancel_animation_frame failed".into(), &e);
        }
    }
}
