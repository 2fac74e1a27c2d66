//! Stage configuration.
//!
//! Every scroll threshold lives in [`SectionTable`] so consumers that are
//! meant to transition together read the same numbers.

use scrollstage_protocol::Target;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("section {section}: {reason}")]
    Section { section: u32, reason: String },
    #[error("{field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn positive(x: f64) -> bool {
    x.is_finite() && x > 0.0
}

fn non_negative(x: f64) -> bool {
    x.is_finite() && x >= 0.0
}

fn in_unit(x: f64) -> bool {
    positive(x) && x <= 1.0
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// The scroll range over which one section's panel fades in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionTransition {
    pub section: u32,
    pub target: Target,
    /// Progress at which the previous section ends and the panel mounts.
    pub previous_end: f64,
    /// Progress at which the panel is fully in.
    pub start: f64,
}

impl SectionTransition {
    /// Transition progress in `[0, 1]`, or `None` before the panel mounts.
    pub fn progress(&self, scroll_progress: f64) -> Option<f64> {
        if scroll_progress.is_nan() || scroll_progress < self.previous_end {
            return None;
        }
        let range = self.start - self.previous_end;
        Some(((scroll_progress - self.previous_end) / range).clamp(0.0, 1.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionTable {
    pub transitions: Vec<SectionTransition>,
    /// Pixels a panel rises while fading in.
    pub rise_px: f64,
    /// Panel scale at the beginning of its transition.
    pub start_scale: f64,
}

impl SectionTable {
    pub fn get(&self, section: u32) -> Option<&SectionTransition> {
        self.transitions.iter().find(|t| t.section == section)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut last: Option<&SectionTransition> = None;
        for t in &self.transitions {
            let fail = |reason: &str| ConfigError::Section {
                section: t.section,
                reason: reason.to_string(),
            };
            if !t.previous_end.is_finite() || !t.start.is_finite() {
                return Err(fail("thresholds must be finite"));
            }
            if t.previous_end < 0.0 {
                return Err(fail("previous_end must be non-negative"));
            }
            if t.start <= t.previous_end {
                return Err(fail("start must be after previous_end"));
            }
            if let Some(prev) = last {
                if t.section <= prev.section {
                    return Err(fail("sections must be listed in increasing order"));
                }
                if t.previous_end < prev.start {
                    return Err(fail("overlaps the previous section's transition"));
                }
            }
            last = Some(t);
        }
        if !in_unit(self.start_scale) {
            return Err(invalid("sections.start_scale", "must be in (0, 1]"));
        }
        if !self.rise_px.is_finite() {
            return Err(invalid("sections.rise_px", "must be finite"));
        }
        Ok(())
    }
}

impl Default for SectionTable {
    fn default() -> Self {
        Self {
            transitions: vec![
                SectionTransition {
                    section: 3,
                    target: Target::YieldPanel,
                    previous_end: 0.33,
                    start: 0.4,
                },
                SectionTransition {
                    section: 4,
                    target: Target::ChatPanel,
                    previous_end: 0.5,
                    start: 0.57,
                },
                SectionTransition {
                    section: 5,
                    target: Target::StakePanel,
                    previous_end: 0.67,
                    start: 0.74,
                },
            ],
            rise_px: 30.0,
            start_scale: 0.9,
        }
    }
}

/// Hero scene and logo response to scroll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroConfig {
    /// Opacity lost per unit of progress.
    pub fade_rate: f64,
    /// Scale lost per unit of progress.
    pub shrink_rate: f64,
    pub min_scale: f64,
    /// Upward travel in pixels at progress 1.
    pub lift_px: f64,
    /// Water distortion per px/ms of velocity.
    pub distortion_gain: f64,
    pub distortion_cap: f64,
    /// Below this distortion the filter is switched off.
    pub filter_threshold: f64,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            fade_rate: 2.0,
            shrink_rate: 1.5,
            min_scale: 0.3,
            lift_px: 300.0,
            distortion_gain: 100.0,
            distortion_cap: 200.0,
            filter_threshold: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressBarConfig {
    pub total_sections: u32,
    /// First section where the bar is shown.
    pub start_from: u32,
    /// Fraction of the viewport below the top used to pick the active section.
    pub marker_fraction: f64,
}

impl Default for ProgressBarConfig {
    fn default() -> Self {
        Self {
            total_sections: 6,
            start_from: 2,
            marker_fraction: 1.0 / 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub min_delay_ms: f64,
    pub max_delay_ms: f64,
    pub min_burst_ms: f64,
    pub max_burst_ms: f64,
}

impl Default for GlitchConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 4000.0,
            max_delay_ms: 10000.0,
            min_burst_ms: 200.0,
            max_burst_ms: 800.0,
        }
    }
}

/// Static uniforms of the analog-decay overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalogDecayConfig {
    pub grain: f64,
    pub bleeding: f64,
    pub vsync: f64,
    pub scanlines: f64,
    pub vignette: f64,
    pub jitter: f64,
    pub intensity: f64,
}

impl Default for AnalogDecayConfig {
    fn default() -> Self {
        Self {
            grain: 0.4,
            bleeding: 0.0,
            vsync: 0.8,
            scanlines: 0.9,
            vignette: 0.9,
            jitter: 0.3,
            intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Percent added per step.
    pub step_percent: f64,
    pub step_interval_ms: f64,
    /// Time the screen stays at 100% before it is hidden.
    pub exit_delay_ms: f64,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            step_percent: 2.0,
            step_interval_ms: 30.0,
            exit_delay_ms: 500.0,
        }
    }
}

/// Spring that pulls the cursor follower toward the pointer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    /// The follower snaps to the pointer once it is closer than `rest_delta`
    /// px and slower than `rest_speed` px/s on both axes.
    pub rest_delta: f64,
    pub rest_speed: f64,
    /// Where the follower waits before the first pointer move (px, both axes).
    pub start: f64,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            stiffness: 200.0,
            damping: 20.0,
            mass: 0.8,
            rest_delta: 0.5,
            rest_speed: 2.0,
            start: -100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    pub sections: SectionTable,
    pub hero: HeroConfig,
    pub progress_bar: ProgressBarConfig,
    pub glitch: GlitchConfig,
    pub analog_decay: AnalogDecayConfig,
    pub loading: LoadingConfig,
    pub cursor: CursorConfig,
    /// Clip names of the hero scene, addressable by `Play`.
    pub animations: Vec<String>,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            sections: SectionTable::default(),
            hero: HeroConfig::default(),
            progress_bar: ProgressBarConfig::default(),
            glitch: GlitchConfig::default(),
            analog_decay: AnalogDecayConfig::default(),
            loading: LoadingConfig::default(),
            cursor: CursorConfig::default(),
            animations: ["idle", "wave", "jump", "spin"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl StageConfig {
    /// Parse and validate. Missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: StageConfig = serde_json::from_slice(data)?;
        config.validate().inspect_err(|e| warn!("rejected stage config: {e}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sections.validate()?;

        let hero = &self.hero;
        if !positive(hero.fade_rate) {
            return Err(invalid("hero.fade_rate", "must be positive"));
        }
        if !positive(hero.shrink_rate) {
            return Err(invalid("hero.shrink_rate", "must be positive"));
        }
        if !in_unit(hero.min_scale) {
            return Err(invalid("hero.min_scale", "must be in (0, 1]"));
        }
        if !(non_negative(hero.distortion_cap) && non_negative(hero.distortion_gain)) {
            return Err(invalid("hero.distortion_cap", "gain and cap must be non-negative"));
        }

        let bar = &self.progress_bar;
        if bar.start_from == 0 || bar.start_from > bar.total_sections {
            return Err(invalid(
                "progress_bar.start_from",
                format!("must be in 1..={}", bar.total_sections),
            ));
        }
        if !(0.0..=1.0).contains(&bar.marker_fraction) {
            return Err(invalid("progress_bar.marker_fraction", "must be in [0, 1]"));
        }

        let glitch = &self.glitch;
        if !(positive(glitch.min_delay_ms) && glitch.min_delay_ms <= glitch.max_delay_ms) {
            return Err(invalid("glitch.min_delay_ms", "need 0 < min_delay_ms <= max_delay_ms"));
        }
        if !(positive(glitch.min_burst_ms) && glitch.min_burst_ms <= glitch.max_burst_ms) {
            return Err(invalid("glitch.min_burst_ms", "need 0 < min_burst_ms <= max_burst_ms"));
        }

        let loading = &self.loading;
        if !(positive(loading.step_percent) && positive(loading.step_interval_ms)) {
            return Err(invalid("loading.step_percent", "step and interval must be positive"));
        }
        if !non_negative(loading.exit_delay_ms) {
            return Err(invalid("loading.exit_delay_ms", "must be non-negative"));
        }

        let cursor = &self.cursor;
        if !(positive(cursor.stiffness) && positive(cursor.mass)) {
            return Err(invalid("cursor.stiffness", "stiffness and mass must be positive"));
        }
        if !non_negative(cursor.damping) {
            return Err(invalid("cursor.damping", "must be non-negative"));
        }
        if !(non_negative(cursor.rest_delta) && non_negative(cursor.rest_speed)) {
            return Err(invalid("cursor.rest_delta", "rest thresholds must be non-negative"));
        }
        if !cursor.start.is_finite() {
            return Err(invalid("cursor.start", "must be finite"));
        }

        if self.animations.iter().any(String::is_empty) {
            return Err(invalid("animations", "clip names must not be empty"));
        }
        Ok(())
    }
}
