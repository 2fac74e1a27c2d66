use scrollstage_protocol::{StyleCommand, Target, ThemeToken};

use crate::config::LoadingConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingLook {
    /// Whole percent, `0..=100`.
    pub percent: f64,
    pub visible: bool,
}

/// Intro loading screen: counts up in fixed steps, lingers at 100%, then
/// goes away for good.
#[derive(Debug, Clone)]
pub struct LoadingProgress {
    config: LoadingConfig,
    started_ms: Option<f64>,
}

impl LoadingProgress {
    pub fn new(config: LoadingConfig) -> Self {
        Self {
            config,
            started_ms: None,
        }
    }

    /// Progress at `now_ms`. The first call starts the count.
    pub fn update(&mut self, now_ms: f64) -> LoadingLook {
        let started = *self.started_ms.get_or_insert(now_ms);
        let elapsed = (now_ms - started).max(0.0);

        let steps = (elapsed / self.config.step_interval_ms).floor();
        let percent = (steps * self.config.step_percent).min(100.0);

        let steps_to_full = (100.0 / self.config.step_percent).ceil();
        let full_at = steps_to_full * self.config.step_interval_ms;
        LoadingLook {
            percent,
            visible: elapsed < full_at + self.config.exit_delay_ms,
        }
    }
}

pub fn render_loading(look: &LoadingLook) -> Vec<StyleCommand> {
    let target = Target::LoadingScreen;
    if !look.visible {
        return vec![StyleCommand::Hide { target }];
    }
    vec![
        StyleCommand::Show { target },
        StyleCommand::SetFill {
            target,
            fraction: look.percent / 100.0,
            color: ThemeToken::Accent,
        },
    ]
}
