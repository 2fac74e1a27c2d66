use scrollstage_protocol::{StyleCommand, Target};

use crate::config::AnalogDecayConfig;

/// Full-screen VHS overlay: grain, scanlines, vignette, jitter and vsync
/// roll. Only the clock moves; the strengths are static config.
#[derive(Debug, Clone)]
pub struct AnalogDecay {
    config: AnalogDecayConfig,
    time_s: f64,
}

impl AnalogDecay {
    pub fn new(config: AnalogDecayConfig) -> Self {
        Self {
            config,
            time_s: 0.0,
        }
    }

    /// Advance the shader clock. Non-finite or negative deltas are dropped.
    pub fn advance(&mut self, delta_s: f64) {
        if delta_s.is_finite() && delta_s > 0.0 {
            self.time_s += delta_s;
        }
    }

    pub fn time(&self) -> f64 {
        self.time_s
    }

    pub fn uniforms(&self) -> [(&'static str, f64); 8] {
        let c = &self.config;
        [
            ("uTime", self.time_s),
            ("uGrain", c.grain),
            ("uBleeding", c.bleeding),
            ("uVSync", c.vsync),
            ("uScanlines", c.scanlines),
            ("uVignette", c.vignette),
            ("uJitter", c.jitter),
            ("uIntensity", c.intensity),
        ]
    }

    pub fn render(&self) -> Vec<StyleCommand> {
        self.uniforms()
            .into_iter()
            .map(|(name, value)| StyleCommand::SetUniform {
                target: Target::AnalogDecay,
                name: name.into(),
                value,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_accumulates_frame_deltas() {
        let mut decay = AnalogDecay::new(AnalogDecayConfig::default());
        decay.advance(0.016);
        decay.advance(0.016);
        decay.advance(f64::NAN);
        decay.advance(-1.0);
        assert!((decay.time() - 0.032).abs() < 1e-12);
    }

    #[test]
    fn renders_every_uniform() {
        let decay = AnalogDecay::new(AnalogDecayConfig::default());
        let commands = decay.render();
        assert_eq!(commands.len(), 8);
        assert!(commands.contains(&StyleCommand::SetUniform {
            target: Target::AnalogDecay,
            name: "uIntensity".into(),
            value: 0.5,
        }));
    }
}
