use serde::{Deserialize, Serialize};

/// A visual element driven by the stage.
///
/// The kebab-case name doubles as the element id browser renderers look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    HeroScene,
    HeroLogo,
    HeroText,
    WaterFilter,
    YieldPanel,
    ChatPanel,
    StakePanel,
    ProgressBar,
    GlitchBackground,
    AnalogDecay,
    GlitchOverlay,
    LoadingScreen,
    CustomCursor,
}

impl Target {
    pub const ALL: [Target; 13] = [
        Target::HeroScene,
        Target::HeroLogo,
        Target::HeroText,
        Target::WaterFilter,
        Target::YieldPanel,
        Target::ChatPanel,
        Target::StakePanel,
        Target::ProgressBar,
        Target::GlitchBackground,
        Target::AnalogDecay,
        Target::GlitchOverlay,
        Target::LoadingScreen,
        Target::CustomCursor,
    ];

    pub fn element_id(self) -> &'static str {
        match self {
            Target::HeroScene => "hero-scene",
            Target::HeroLogo => "hero-logo",
            Target::HeroText => "hero-text",
            Target::WaterFilter => "water-filter",
            Target::YieldPanel => "yield-panel",
            Target::ChatPanel => "chat-panel",
            Target::StakePanel => "stake-panel",
            Target::ProgressBar => "progress-bar",
            Target::GlitchBackground => "glitch-background",
            Target::AnalogDecay => "analog-decay",
            Target::GlitchOverlay => "glitch-overlay",
            Target::LoadingScreen => "loading-screen",
            Target::CustomCursor => "custom-cursor",
        }
    }
}

/// 2D translate + scale, applied translate first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }

    /// Vertical offset with a uniform scale.
    pub fn lift(translate_y: f64, scale: f64) -> Self {
        Self {
            translate_x: 0.0,
            translate_y,
            scale_x: scale,
            scale_y: scale,
        }
    }

    /// Pure translation, for elements positioned by their top-left corner.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::identity()
        }
    }

    /// CSS `transform` value.
    pub fn to_css(&self) -> String {
        format!(
            "translate({}px, {}px) scale({}, {})",
            self.translate_x, self.translate_y, self.scale_x, self.scale_y
        )
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Post-processing filter on a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    None,
    Blur { radius: f64 },
    /// Turbulence displacement; `scale` is the displacement map strength.
    WaterDistortion { scale: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_serializes_as_element_id() {
        for target in Target::ALL {
            let json = serde_json::to_string(&target).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", target.element_id()));
        }
    }

    #[test]
    fn transform_css() {
        let t = Transform::lift(-150.0, 0.5);
        assert_eq!(t.to_css(), "translate(0px, -150px) scale(0.5, 0.5)");
        assert_eq!(Transform::default(), Transform::identity());
    }
}
