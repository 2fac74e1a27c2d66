//! Frame-paced scroll tracking and the presentation values derived from it.
//!
//! A [`tracker::SamplingLoop`] samples the host once per display refresh and
//! commits a `(progress, velocity)` pair through a [`state`] channel. The
//! [`stage::Stage`] fans each committed pair out to the independent
//! [`effects`] and [`timeline`] consumers and collects their style commands.

pub mod config;
pub mod control;
pub mod effects;
pub mod stage;
pub mod state;
pub mod timeline;
pub mod trace;
pub mod tracker;

pub use config::{ConfigError, SectionTable, SectionTransition, StageConfig};
pub use control::{AnimationController, AnimationInbox, AnimationPlayer, ControlError};
pub use stage::Stage;
pub use state::{Committed, StateReader, StateWriter};
pub use trace::{ReplayFrame, ScrollTrace, TraceError, TraceHost, replay};
pub use tracker::{FrameId, FrameScheduler, ManualScheduler, SamplingLoop, ScrollHost, ScrollTracker};
