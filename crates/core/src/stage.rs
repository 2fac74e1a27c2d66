use rand::Rng;
use scrollstage_protocol::{AnimationCommand, StyleCommand, Target};
use tracing::warn;

use crate::config::{ConfigError, StageConfig};
use crate::control::{self, AnimationController, AnimationInbox, AnimationPlayer, ControlError};
use crate::effects::glitch_background::render_glitch_background;
use crate::effects::hero::render_hero;
use crate::effects::hero_text::render_hero_text;
use crate::effects::panel::render_panels;
use crate::effects::progress_bar::{progress_bar_look, render_progress_bar, uniform_tops};
use crate::state::Committed;
use crate::timeline::glitch::render_glitch_overlay;
use crate::timeline::loading::render_loading;
use crate::timeline::{
    AnalogDecay, CursorFollower, DeviceProfile, FrameMonitor, GlitchTimer, LoadingProgress, QualitySettings,
};

/// Everything the page shows, driven by committed scroll state and the
/// frame clock.
///
/// `frame` fans the committed pair out to every consumer. Consumers are
/// independent; the order of the returned commands carries no meaning.
pub struct Stage {
    config: StageConfig,
    glitch: GlitchTimer,
    decay: AnalogDecay,
    loading: LoadingProgress,
    cursor: CursorFollower,
    monitor: FrameMonitor,
    player: AnimationPlayer,
    controller: AnimationController,
    inbox: AnimationInbox,
    device_quality: QualitySettings,
    section_tops: Option<Vec<f64>>,
    last_frame_ms: Option<f64>,
}

impl Stage {
    pub fn new(config: StageConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (controller, inbox) = control::channel();
        Ok(Self {
            glitch: GlitchTimer::new(config.glitch.clone()),
            decay: AnalogDecay::new(config.analog_decay.clone()),
            loading: LoadingProgress::new(config.loading.clone()),
            cursor: CursorFollower::new(config.cursor.clone()),
            monitor: FrameMonitor::new(),
            player: AnimationPlayer::new(config.animations.clone()),
            controller,
            inbox,
            device_quality: QualitySettings::for_device(&DeviceProfile::default()),
            section_tops: None,
            last_frame_ms: None,
            config,
        })
    }

    pub fn with_device(mut self, device: &DeviceProfile) -> Self {
        self.device_quality = QualitySettings::for_device(device);
        self
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// A handle for triggering animations from anywhere.
    pub fn controller(&self) -> AnimationController {
        self.controller.clone()
    }

    /// Measured section tops in document pixels. Without them sections are
    /// assumed to be one viewport tall each.
    pub fn set_section_tops(&mut self, tops: Vec<f64>) {
        self.section_tops = Some(tops);
    }

    /// Pointer position in viewport pixels; the custom cursor springs toward it.
    pub fn move_pointer(&mut self, x: f64, y: f64) {
        self.cursor.set_target(x, y);
    }

    pub fn has_clip(&self, name: &str) -> bool {
        self.player.clips().iter().any(|c| c == name)
    }

    pub fn current_clip(&self) -> Option<&str> {
        self.player.current()
    }

    pub fn fps(&self) -> f64 {
        self.monitor.fps()
    }

    /// Device tier, dropped to low while the frame rate is poor.
    pub fn quality(&self) -> QualitySettings {
        if self.monitor.should_reduce_quality() {
            QualitySettings::low()
        } else {
            self.device_quality.clone()
        }
    }

    pub fn glitch_active(&self) -> bool {
        self.glitch.is_active()
    }

    /// Apply one animation command immediately.
    pub fn apply<R: Rng + ?Sized>(
        &mut self,
        command: AnimationCommand,
        now_ms: f64,
        rng: &mut R,
    ) -> Result<(), ControlError> {
        match command {
            AnimationCommand::Play { name } => self.player.play(&name).map(|_| ()),
            AnimationCommand::PlayRandom => self.player.play_random(rng).map(|_| ()),
            AnimationCommand::Stop => {
                self.player.stop();
                Ok(())
            }
            AnimationCommand::TriggerGlitch => {
                self.glitch.trigger(now_ms, rng);
                Ok(())
            }
        }
    }

    /// Produce this frame's style commands.
    pub fn frame<R: Rng + ?Sized>(
        &mut self,
        committed: &Committed,
        now_ms: f64,
        rng: &mut R,
    ) -> Vec<StyleCommand> {
        for command in self.inbox.drain() {
            if let Err(e) = self.apply(command, now_ms, rng) {
                warn!("animation command failed: {e}");
            }
        }

        let delta_s = self
            .last_frame_ms
            .map_or(0.0, |last| (now_ms - last) / 1000.0);
        self.last_frame_ms = Some(now_ms);
        self.monitor.record(now_ms);
        self.decay.advance(delta_s);
        self.cursor.advance(delta_s);

        let state = &committed.state;
        let mut commands = Vec::with_capacity(48);
        commands.extend(render_hero(state, &self.config.hero));
        commands.extend(render_hero_text(state));
        commands.extend(render_panels(state, &self.config.sections));
        commands.extend(render_glitch_background(state));

        let bar_config = &self.config.progress_bar;
        let bar = match &self.section_tops {
            Some(tops) => progress_bar_look(&committed.metrics, tops, bar_config),
            None => {
                let tops = uniform_tops(
                    bar_config.total_sections,
                    committed.metrics.viewport_height,
                );
                progress_bar_look(&committed.metrics, &tops, bar_config)
            }
        };
        commands.extend(render_progress_bar(&bar));

        commands.extend(self.decay.render());
        let glitching = self.glitch.update(now_ms, rng) && self.quality().enable_glitch;
        commands.extend(render_glitch_overlay(glitching, rng));
        commands.extend(render_loading(&self.loading.update(now_ms)));
        commands.extend(self.cursor.render());
        commands.push(StyleCommand::SetClip {
            target: Target::HeroScene,
            clip: self.player.current().map(String::from),
        });
        commands
    }
}
