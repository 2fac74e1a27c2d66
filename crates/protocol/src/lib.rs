pub mod commands;
pub mod scroll;
pub mod theme;
pub mod types;

pub use commands::{AnimationCommand, StyleCommand};
pub use scroll::{ScrollMetrics, ScrollSample, ScrollState};
pub use theme::ThemeToken;
pub use types::{Filter, Target, Transform};
