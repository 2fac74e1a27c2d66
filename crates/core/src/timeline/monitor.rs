use serde::{Deserialize, Serialize};

const WINDOW_MS: f64 = 1000.0;
const REDUCE_BELOW_FPS: f64 = 30.0;

/// Frame-rate estimate over windows of at least one second.
#[derive(Debug, Clone)]
pub struct FrameMonitor {
    frames: u32,
    window_start: Option<f64>,
    fps: f64,
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameMonitor {
    /// Starts optimistic at 60 fps until the first window closes.
    pub fn new() -> Self {
        Self {
            frames: 0,
            window_start: None,
            fps: 60.0,
        }
    }

    /// Record a rendered frame at `now_ms`. The first call only opens the
    /// window.
    pub fn record(&mut self, now_ms: f64) {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return;
        };
        self.frames += 1;
        let elapsed = now_ms - start;
        if elapsed >= WINDOW_MS {
            self.fps = (f64::from(self.frames) * 1000.0 / elapsed).round();
            self.frames = 0;
            self.window_start = Some(now_ms);
        }
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn should_reduce_quality(&self) -> bool {
        self.fps < REDUCE_BELOW_FPS
    }
}

/// What the host knows about the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub cores: u32,
    pub memory_gb: f64,
    pub mobile: bool,
}

const MOBILE_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

impl DeviceProfile {
    /// Build from browser hints; unknown cores or memory count as 4.
    pub fn from_hints(user_agent: &str, cores: Option<u32>, memory_gb: Option<f64>) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        Self {
            cores: cores.filter(|&c| c > 0).unwrap_or(4),
            memory_gb: memory_gb.filter(|m| *m > 0.0).unwrap_or(4.0),
            mobile: MOBILE_MARKERS.iter().any(|m| ua.contains(m)),
        }
    }

    pub fn is_low_end(&self) -> bool {
        self.cores < 4 || self.memory_gb < 4.0 || self.mobile
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            cores: 4,
            memory_gb: 4.0,
            mobile: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowQuality {
    Low,
    High,
}

/// Rendering budget for the 3D scene and post-processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitySettings {
    pub particle_count: u32,
    pub bloom_intensity: f64,
    pub enable_glitch: bool,
    pub enable_depth_of_field: bool,
    pub shadow_quality: ShadowQuality,
}

impl QualitySettings {
    pub fn high() -> Self {
        Self {
            particle_count: 1000,
            bloom_intensity: 0.5,
            enable_glitch: true,
            enable_depth_of_field: true,
            shadow_quality: ShadowQuality::High,
        }
    }

    pub fn low() -> Self {
        Self {
            particle_count: 300,
            bloom_intensity: 0.3,
            enable_glitch: false,
            enable_depth_of_field: false,
            shadow_quality: ShadowQuality::Low,
        }
    }

    pub fn for_device(device: &DeviceProfile) -> Self {
        if device.is_low_end() {
            Self::low()
        } else {
            Self::high()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sixty_frames_in_a_second() {
        let mut monitor = FrameMonitor::new();
        monitor.record(0.0);
        for i in 1..=60 {
            monitor.record(f64::from(i) * 1000.0 / 60.0);
        }
        assert_eq!(monitor.fps(), 60.0);
        assert!(!monitor.should_reduce_quality());
    }

    #[test]
    fn slow_frames_reduce_quality() {
        let mut monitor = FrameMonitor::new();
        monitor.record(0.0);
        for i in 1..=20 {
            monitor.record(f64::from(i) * 50.0);
        }
        assert_eq!(monitor.fps(), 20.0);
        assert!(monitor.should_reduce_quality());
    }

    #[test]
    fn detects_mobile_user_agents() {
        let phone = DeviceProfile::from_hints(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            Some(6),
            None,
        );
        assert!(phone.mobile);
        assert!(phone.is_low_end());
        assert_eq!(QualitySettings::for_device(&phone), QualitySettings::low());
    }

    #[test]
    fn desktop_with_unknown_hints_is_high() {
        let desktop = DeviceProfile::from_hints("Mozilla/5.0 (X11; Linux x86_64)", None, None);
        assert!(!desktop.is_low_end());
        assert_eq!(QualitySettings::for_device(&desktop).particle_count, 1000);

        let weak = DeviceProfile::from_hints("Mozilla/5.0 (X11; Linux x86_64)", Some(2), None);
        assert_eq!(QualitySettings::for_device(&weak).particle_count, 300);
    }
}
