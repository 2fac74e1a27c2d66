use std::cell::Cell;
use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::Backend, backend::CrosstermBackend};
use scrollstage_core::{
    AnimationController, ManualScheduler, SamplingLoop, ScrollHost, ScrollTracker, Stage,
    StageConfig,
};
use scrollstage_protocol::{ScrollMetrics, ScrollSample};
use tracing::info;

use crate::renderer::{self, Status};

const FRAME: Duration = Duration::from_millis(16);
const LINE_PX: f64 = 40.0;
/// Pixel size of one terminal cell, for mapping mouse cells to page pixels.
const CELL_PX: (f64, f64) = (8.0, 16.0);

/// Fixed frame deadlines. Input between two deadlines is drained without
/// ticking, so a burst of events still yields one frame per refresh.
#[derive(Debug, Clone, Copy)]
struct FramePacer {
    next: Instant,
}

impl FramePacer {
    fn new(now: Instant) -> Self {
        Self { next: now }
    }

    /// Whether a frame is due at `now`. Claiming it moves the deadline one
    /// frame on, or to a frame from `now` after a stall.
    fn claim(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += FRAME;
        if self.next <= now {
            self.next = now + FRAME;
        }
        true
    }

    /// How long input may be awaited before the next frame.
    fn wait(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageSize {
    pub document_height: f64,
    pub viewport_height: f64,
}

/// A page that only exists in memory. Offsets clamp to the scrollable range
/// like a browser without overscroll.
pub struct SimulatedPage {
    offset: Cell<f64>,
    document_height: Cell<f64>,
    viewport_height: f64,
    started: Instant,
}

impl SimulatedPage {
    pub fn new(size: PageSize) -> Self {
        Self {
            offset: Cell::new(0.0),
            document_height: Cell::new(size.document_height),
            viewport_height: size.viewport_height,
            started: Instant::now(),
        }
    }

    fn max_offset(&self) -> f64 {
        (self.document_height.get() - self.viewport_height).max(0.0)
    }

    pub fn scroll_to(&self, offset: f64) {
        self.offset.set(offset.clamp(0.0, self.max_offset()));
    }

    pub fn scroll_by(&self, delta: f64) {
        self.scroll_to(self.offset.get() + delta);
    }

    /// Content loaded below the fold.
    pub fn grow(&self, pixels: f64) {
        self.document_height.set(self.document_height.get() + pixels);
    }

    pub fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl ScrollHost for SimulatedPage {
    fn sample(&self) -> Option<ScrollSample> {
        Some(ScrollSample::new(
            ScrollMetrics::new(
                self.offset.get(),
                self.document_height.get(),
                self.viewport_height,
            ),
            self.now_ms(),
        ))
    }
}

pub fn run(size: PageSize, config: StageConfig) -> Result<()> {
    let mut stage = Stage::new(config)?;
    let controller = stage.controller();
    let page = SimulatedPage::new(size);
    let mut sampling = SamplingLoop::new(ScrollTracker::new(&page), ManualScheduler::new());
    sampling.start();
    info!(
        document_height = size.document_height,
        viewport_height = size.viewport_height,
        "preview started"
    );

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(
        &mut terminal,
        &page,
        &mut sampling,
        &mut stage,
        &controller,
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    sampling.stop();
    info!("preview stopped");

    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    page: &SimulatedPage,
    sampling: &mut SamplingLoop<&SimulatedPage, ManualScheduler>,
    stage: &mut Stage,
    controller: &AnimationController,
) -> Result<()> {
    let mut rng = rand::rng();
    let mut status = Status::default();
    let mut pacer = FramePacer::new(Instant::now());

    loop {
        // The preview pumps its own frames; one commit per refresh.
        if pacer.claim(Instant::now()) {
            let committed = sampling.pending_frame().and_then(|id| sampling.on_frame(id));
            if let Some(committed) = committed {
                let commands = stage.frame(&committed, page.now_ms(), &mut rng);
                status.fps = stage.fps();
                status.clip = stage.current_clip().map(String::from);
                status.glitching = stage.glitch_active();
                terminal.draw(|frame| renderer::draw(frame, &committed, &commands, &status))?;
            }
        }

        if !event::poll(pacer.wait(Instant::now()))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => page.scroll_by(LINE_PX),
                KeyCode::Up | KeyCode::Char('k') => page.scroll_by(-LINE_PX),
                KeyCode::PageDown | KeyCode::Char(' ') => {
                    page.scroll_by(page.viewport_height * 0.9);
                }
                KeyCode::PageUp => page.scroll_by(-page.viewport_height * 0.9),
                KeyCode::Home => page.scroll_to(0.0),
                KeyCode::End => page.scroll_to(f64::MAX),
                KeyCode::Char('l') => page.grow(page.viewport_height),
                KeyCode::Char('g') => controller.trigger_glitch()?,
                KeyCode::Char('r') => controller.play_random()?,
                KeyCode::Char('s') => controller.stop()?,
                KeyCode::Char(c @ '1'..='9') => {
                    let index = (c as usize) - ('1' as usize);
                    if let Some(name) = stage.config().animations.get(index) {
                        controller.play(name.clone())?;
                    }
                }
                _ => {}
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollDown => page.scroll_by(LINE_PX),
                MouseEventKind::ScrollUp => page.scroll_by(-LINE_PX),
                MouseEventKind::Moved => stage.move_pointer(
                    f64::from(mouse.column) * CELL_PX.0,
                    f64::from(mouse.row) * CELL_PX.1,
                ),
                _ => {}
            },
            _ => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SimulatedPage {
        SimulatedPage::new(PageSize {
            document_height: 3000.0,
            viewport_height: 1000.0,
        })
    }

    #[test]
    fn scrolling_clamps_to_range() {
        let page = page();
        page.scroll_by(-100.0);
        assert_eq!(page.sample().map(|s| s.metrics.offset), Some(0.0));
        page.scroll_to(f64::MAX);
        assert_eq!(page.sample().map(|s| s.metrics.offset), Some(2000.0));
    }

    #[test]
    fn growing_the_page_lowers_progress() {
        let page = page();
        page.scroll_to(1000.0);
        assert_eq!(page.sample().map(|s| s.metrics.progress()), Some(0.5));
        page.grow(2000.0);
        assert_eq!(page.sample().map(|s| s.metrics.progress()), Some(0.25));
    }

    #[test]
    fn input_bursts_share_one_frame() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(start);
        assert!(pacer.claim(start));

        // Twenty events inside one refresh: none of them is a frame.
        let mut ticks = 0;
        for i in 0..20 {
            let now = start + Duration::from_micros(i * 700);
            if pacer.claim(now) {
                ticks += 1;
            }
            assert!(pacer.wait(now) <= FRAME);
        }
        assert_eq!(ticks, 0);
        assert!(pacer.claim(start + FRAME));
    }

    #[test]
    fn stalled_pacer_does_not_catch_up() {
        let start = Instant::now();
        let mut pacer = FramePacer::new(start);
        let late = start + FRAME * 10;
        assert!(pacer.claim(late));
        assert!(!pacer.claim(late));
        assert_eq!(pacer.wait(late), FRAME);
    }

    #[test]
    fn pumped_frames_commit_in_order() {
        let page = page();
        let mut sampling = SamplingLoop::new(ScrollTracker::new(&page), ManualScheduler::new());
        assert!(sampling.start());
        page.scroll_to(500.0);
        let id = sampling.pending_frame().expect("running loop has a pending frame");
        let committed = sampling.on_frame(id).expect("pending frame ticks");
        assert_eq!(committed.tick, 1);
        assert_eq!(committed.state.progress, 0.25);
    }
}
