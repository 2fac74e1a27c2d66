use scrollstage_protocol::{ScrollState, StyleCommand, Target};

const DISTORTION_GAIN: f64 = 5.0;
const RGB_SHIFT_GAIN: f64 = 3.0;

/// Shader uniforms of the glitch background plane.
pub fn render_glitch_background(state: &ScrollState) -> Vec<StyleCommand> {
    let d = state.progress.abs();
    vec![
        StyleCommand::SetUniform {
            target: Target::GlitchBackground,
            name: "distortion".into(),
            value: d * DISTORTION_GAIN,
        },
        StyleCommand::SetUniform {
            target: Target::GlitchBackground,
            name: "rgbShift".into(),
            value: d * RGB_SHIFT_GAIN,
        },
    ]
}
