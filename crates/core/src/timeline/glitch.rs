use rand::Rng;
use scrollstage_protocol::{StyleCommand, Target};

use crate::config::GlitchConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Unarmed,
    Waiting { until: f64 },
    /// `next` is when the following burst starts; delays are measured from
    /// the start of a burst.
    Bursting { until: f64, next: f64 },
}

/// Random TV-static bursts: a 200–800 ms burst every 4–10 s by default.
#[derive(Debug, Clone)]
pub struct GlitchTimer {
    config: GlitchConfig,
    phase: Phase,
}

fn between<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

impl GlitchTimer {
    pub fn new(config: GlitchConfig) -> Self {
        Self {
            config,
            phase: Phase::Unarmed,
        }
    }

    /// Advance to `now_ms`. The first call arms the timer. Returns whether a
    /// burst is active.
    pub fn update<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) -> bool {
        self.phase = match self.phase {
            Phase::Unarmed => Phase::Waiting {
                until: now_ms + self.delay(rng),
            },
            Phase::Waiting { until } if now_ms >= until => Phase::Bursting {
                until: now_ms + self.burst(rng),
                next: now_ms + self.delay(rng),
            },
            Phase::Bursting { until, next } if now_ms >= until => Phase::Waiting { until: next },
            phase => phase,
        };
        self.is_active()
    }

    /// Start a burst immediately and re-arm from now.
    pub fn trigger<R: Rng + ?Sized>(&mut self, now_ms: f64, rng: &mut R) {
        self.phase = Phase::Bursting {
            until: now_ms + self.burst(rng),
            next: now_ms + self.delay(rng),
        };
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Bursting { .. })
    }

    fn delay<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        between(rng, self.config.min_delay_ms, self.config.max_delay_ms)
    }

    fn burst<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        between(rng, self.config.min_burst_ms, self.config.max_burst_ms)
    }
}

/// Overlay visibility plus fresh random clip insets (percent) per frame.
pub fn render_glitch_overlay<R: Rng + ?Sized>(active: bool, rng: &mut R) -> Vec<StyleCommand> {
    let target = Target::GlitchOverlay;
    if !active {
        return vec![StyleCommand::Hide { target }];
    }
    vec![
        StyleCommand::Show { target },
        StyleCommand::SetUniform {
            target,
            name: "inset_top".into(),
            value: rng.random_range(0.0..80.0),
        },
        StyleCommand::SetUniform {
            target,
            name: "inset_bottom".into(),
            value: rng.random_range(0.0..20.0),
        },
    ]
}
