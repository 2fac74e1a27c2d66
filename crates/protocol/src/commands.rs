use serde::{Deserialize, Serialize};

use crate::theme::ThemeToken;
use crate::types::{Filter, Target, Transform};

/// A single, stateless style instruction.
///
/// The stage emits a `Vec<StyleCommand>` per frame. Renderers apply them in
/// any order; each command carries everything it needs and touches exactly
/// one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleCommand {
    /// Set element opacity in `[0, 1]`.
    SetOpacity { target: Target, opacity: f64 },

    /// Replace the element transform.
    SetTransform { target: Target, transform: Transform },

    /// Set a named shader uniform.
    SetUniform {
        target: Target,
        name: String,
        value: f64,
    },

    /// Replace the element's filter.
    SetFilter { target: Target, filter: Filter },

    /// Fill a bar-like element to `fraction` (`[0, 1]`).
    SetFill {
        target: Target,
        fraction: f64,
        color: ThemeToken,
    },

    /// Select the clip an animated target plays; `None` stops it. Repeating
    /// the current clip must not restart it.
    SetClip {
        target: Target,
        clip: Option<String>,
    },

    /// Mount / make visible.
    Show { target: Target },

    /// Unmount / hide. Other commands for a hidden target are not emitted in
    /// the same frame.
    Hide { target: Target },
}

impl StyleCommand {
    pub fn target(&self) -> Target {
        match self {
            StyleCommand::SetOpacity { target, .. }
            | StyleCommand::SetTransform { target, .. }
            | StyleCommand::SetUniform { target, .. }
            | StyleCommand::SetFilter { target, .. }
            | StyleCommand::SetFill { target, .. }
            | StyleCommand::SetClip { target, .. }
            | StyleCommand::Show { target }
            | StyleCommand::Hide { target } => *target,
        }
    }
}

/// Typed animation control messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationCommand {
    /// Play a named clip of the hero scene.
    Play { name: String },
    /// Play any clip other than the current one.
    PlayRandom,
    Stop,
    /// Start a glitch burst now instead of waiting for the timer.
    TriggerGlitch,
}
