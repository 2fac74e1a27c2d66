use scrollstage_protocol::{Filter, ScrollState, StyleCommand, Target, Transform};

const FADE_RATE: f64 = 2.0;
const WARP_GAIN: f64 = 30.0;
const RGB_SHIFT_GAIN: f64 = 5.0;
const BLUR_GAIN: f64 = 2.0;

/// Distorted "sDOGE" headline. Uses the magnitude of progress, so
/// overscroll in either direction distorts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroTextLook {
    pub opacity: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rgb_shift: f64,
    pub blur: f64,
}

pub fn hero_text_look(state: &ScrollState) -> HeroTextLook {
    let d = state.progress.abs();
    let wave = (d * WARP_GAIN / 10.0).sin();
    HeroTextLook {
        opacity: (1.0 - d * FADE_RATE).max(0.0),
        scale_x: 1.0 + wave * 0.3,
        scale_y: 1.0 - wave * 0.2,
        rgb_shift: d * RGB_SHIFT_GAIN,
        blur: d * BLUR_GAIN,
    }
}

pub fn render_hero_text(state: &ScrollState) -> Vec<StyleCommand> {
    let look = hero_text_look(state);
    let target = Target::HeroText;
    vec![
        StyleCommand::SetOpacity {
            target,
            opacity: look.opacity,
        },
        StyleCommand::SetTransform {
            target,
            transform: Transform {
                scale_x: look.scale_x,
                scale_y: look.scale_y,
                ..Transform::identity()
            },
        },
        StyleCommand::SetUniform {
            target,
            name: "rgb_shift".into(),
            value: look.rgb_shift,
        },
        StyleCommand::SetFilter {
            target,
            filter: Filter::Blur { radius: look.blur },
        },
    ]
}
