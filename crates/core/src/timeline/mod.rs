//! Effects driven by the frame clock rather than by scroll.

pub mod analog_decay;
pub mod cursor;
pub mod glitch;
pub mod loading;
pub mod monitor;

pub use analog_decay::AnalogDecay;
pub use cursor::CursorFollower;
pub use glitch::GlitchTimer;
pub use loading::{LoadingLook, LoadingProgress};
pub use monitor::{DeviceProfile, FrameMonitor, QualitySettings, ShadowQuality};
