//! Browser host: samples `window` once per `requestAnimationFrame` and writes
//! the stage's style commands onto page elements by id.

mod dom;
mod host;
mod session;

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use scrollstage_core::state::{self, Committed, StateReader};
use scrollstage_core::timeline::DeviceProfile;
use scrollstage_core::{
    AnimationController, ControlError, SamplingLoop, ScrollTracker, Stage, StageConfig,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, MouseEvent, Window};

use crate::host::{FrameCallback, RafScheduler, WindowHost};
use crate::session::Session;

type PointerCallback = RefCell<Option<Closure<dyn FnMut(MouseEvent)>>>;

struct Runtime {
    session: Session<WindowHost, RafScheduler>,
    document: Option<Document>,
}

impl Runtime {
    fn on_frame(&mut self, now_ms: f64) {
        let Some(document) = self.document.as_ref() else {
            return;
        };
        if let Some(commands) = self.session.frame(now_ms) {
            dom::apply(document, commands);
        }
    }
}

fn device_profile(window: &Window) -> DeviceProfile {
    let navigator = window.navigator();
    let user_agent = navigator.user_agent().unwrap_or_default();
    let cores = navigator.hardware_concurrency() as u32;
    let memory = js_sys::Reflect::get(&navigator, &"deviceMemory".into())
        .ok()
        .and_then(|v| v.as_f64());
    DeviceProfile::from_hints(&user_agent, Some(cores), memory)
}

/// Scroll-driven page effects. Construct once per page, `start()` after the
/// DOM is ready, `stop()` (or `free()`) on teardown.
#[wasm_bindgen]
pub struct ScrollStage {
    runtime: Rc<RefCell<Runtime>>,
    callback: FrameCallback,
    pointer: PointerCallback,
    window: Option<Window>,
    reader: StateReader,
    controller: AnimationController,
}

#[wasm_bindgen]
impl ScrollStage {
    /// `config_json` overrides the default thresholds; omitted fields keep
    /// their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ScrollStage, JsError> {
        console_error_panic_hook::set_once();

        let config = match config_json {
            Some(json) => {
                StageConfig::from_json(json.as_bytes()).map_err(|e| JsError::new(&e.to_string()))?
            }
            None => StageConfig::default(),
        };
        let mut stage = Stage::new(config).map_err(|e| JsError::new(&e.to_string()))?;
        let controller = stage.controller();
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let rng = SmallRng::seed_from_u64(js_sys::Date::now().to_bits());

        let window = web_sys::window();
        let document = window.as_ref().and_then(Window::document);
        let (sampling, reader) = match (&window, &document) {
            (Some(window), Some(_)) => {
                stage = stage.with_device(&device_profile(window));
                let tracker = ScrollTracker::new(WindowHost::new(window.clone()));
                let sampling =
                    SamplingLoop::new(tracker, RafScheduler::new(window.clone(), callback.clone()));
                let reader = sampling.reader();
                (Some(sampling), reader)
            }
            _ => {
                web_sys::console::warn_1(
                    &"scrollstage: no window or document, scroll tracking disabled".into(),
                );
                let (_, reader) = state::channel(Committed::default());
                (None, reader)
            }
        };

        Ok(ScrollStage {
            runtime: Rc::new(RefCell::new(Runtime {
                session: Session::new(stage, rng, sampling),
                document,
            })),
            callback,
            pointer: RefCell::new(None),
            window,
            reader,
            controller,
        })
    }

    /// Begin per-frame sampling. Returns `false` when the page has no frame
    /// source or the stage was already stopped.
    pub fn start(&self) -> bool {
        let weak = Rc::downgrade(&self.runtime);
        let running = self.runtime.borrow_mut().session.start(&*self.callback, || {
            Closure::new(move |now_ms: f64| {
                if let Some(runtime) = weak.upgrade() {
                    runtime.borrow_mut().on_frame(now_ms);
                }
            })
        });
        if running {
            self.listen_pointer();
        }
        running
    }

    /// Cancel the pending frame and release the frame and pointer callbacks.
    /// Final.
    pub fn stop(&self) {
        self.runtime.borrow_mut().session.stop(&*self.callback);
        let Some(pointer) = self.pointer.borrow_mut().take() else {
            return;
        };
        if let Some(window) = &self.window {
            if let Err(e) = window
                .remove_event_listener_with_callback("mousemove", pointer.as_ref().unchecked_ref())
            {
                web_sys::console::warn_2(&"scrollstage: cannot remove mousemove listener".into(), &e);
            }
        }
    }

    /// Feed a pointer position (viewport pixels) to the custom cursor, for
    /// hosts that track the pointer themselves.
    pub fn pointer_moved(&self, x: f64, y: f64) {
        self.runtime.borrow_mut().session.stage_mut().move_pointer(x, y);
    }

    /// Whether frames are being sampled.
    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.runtime.borrow().session.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn progress(&self) -> f64 {
        self.reader.state().progress
    }

    #[wasm_bindgen(getter)]
    pub fn velocity(&self) -> f64 {
        self.reader.state().velocity
    }

    /// Queue a named hero animation for the next frame.
    pub fn play(&self, name: &str) -> Result<(), JsError> {
        if !self.runtime.borrow().session.stage().has_clip(name) {
            let err = ControlError::UnknownAnimation(name.to_string());
            return Err(JsError::new(&err.to_string()));
        }
        self.controller
            .play(name)
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn play_random(&self) -> Result<(), JsError> {
        self.controller
            .play_random()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    pub fn trigger_glitch(&self) -> Result<(), JsError> {
        self.controller
            .trigger_glitch()
            .map_err(|e| JsError::new(&e.to_string()))
    }

    /// Measure section tops (document pixels) from the elements matching
    /// `selector`. Returns how many were found.
    pub fn measure_sections(&self, selector: &str) -> Result<u32, JsError> {
        let mut runtime = self.runtime.borrow_mut();
        let Some(document) = runtime.document.as_ref() else {
            return Ok(0);
        };
        let nodes = document
            .query_selector_all(selector)
            .map_err(|_| JsError::new(&format!("invalid selector: {selector}")))?;
        let tops: Vec<f64> = (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<HtmlElement>().ok())
            .map(|el| f64::from(el.offset_top()))
            .collect();
        let found = tops.len() as u32;
        runtime.session.stage_mut().set_section_tops(tops);
        Ok(found)
    }

    /// Style commands of the most recent frame, as JSON.
    pub fn last_commands_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.runtime.borrow().session.last_commands())
            .map_err(|e| JsError::new(&e.to_string()))
    }
}

impl ScrollStage {
    /// Track `mousemove` on the window for the custom cursor.
    fn listen_pointer(&self) {
        let Some(window) = &self.window else {
            return;
        };
        if self.pointer.borrow().is_some() {
            return;
        }
        let weak = Rc::downgrade(&self.runtime);
        let pointer: Closure<dyn FnMut(MouseEvent)> = Closure::new(move |event: MouseEvent| {
            if let Some(runtime) = weak.upgrade() {
                runtime.borrow_mut().session.stage_mut().move_pointer(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                );
            }
        });
        let listening =
            window.add_event_listener_with_callback("mousemove", pointer.as_ref().unchecked_ref());
        match listening {
            Ok(()) => *self.pointer.borrow_mut() = Some(pointer),
            Err(e) => {
                web_sys::console::warn_2(&"scrollstage: cannot listen for mousemove".into(), &e);
            }
        }
    }
}

impl Drop for ScrollStage {
    fn drop(&mut self) {
        self.stop();
    }
}
