use scrollstage_protocol::{Filter, ScrollState, StyleCommand, Target, Transform};

use crate::config::HeroConfig;

/// Presentation of the 3D hero scene and the logo behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroLook {
    /// Floored at 0 only; above-top overscroll yields values past 1, which
    /// renderers saturate.
    pub opacity: f64,
    /// Not capped above: negative progress (overscroll at the top) grows
    /// the scene past 1.
    pub scale: f64,
    pub translate_y: f64,
    /// Water displacement strength driven by scroll speed.
    pub distortion: f64,
}

pub fn hero_look(state: &ScrollState, config: &HeroConfig) -> HeroLook {
    let p = state.progress;
    HeroLook {
        opacity: (1.0 - p * config.fade_rate).max(0.0),
        scale: (1.0 - p * config.shrink_rate).max(config.min_scale),
        translate_y: -p * config.lift_px,
        distortion: (state.velocity.abs() * config.distortion_gain).min(config.distortion_cap),
    }
}

/// Scene and logo fade, shrink and lift together; the water filter follows
/// velocity and is switched off below the threshold.
pub fn render_hero(state: &ScrollState, config: &HeroConfig) -> Vec<StyleCommand> {
    let look = hero_look(state, config);
    let transform = Transform::lift(look.translate_y, look.scale);
    let filter = if look.distortion > config.filter_threshold {
        Filter::WaterDistortion {
            scale: look.distortion,
        }
    } else {
        Filter::None
    };

    let mut commands = Vec::with_capacity(5);
    for target in [Target::HeroScene, Target::HeroLogo] {
        commands.push(StyleCommand::SetOpacity {
            target,
            opacity: look.opacity,
        });
        commands.push(StyleCommand::SetTransform { target, transform });
    }
    commands.push(StyleCommand::SetFilter {
        target: Target::WaterFilter,
        filter,
    });
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look(progress: f64, velocity: f64) -> HeroLook {
        hero_look(&ScrollState::new(progress, velocity), &HeroConfig::default())
    }

    #[test]
    fn at_top_fully_visible() {
        let l = look(0.0, 0.0);
        assert_eq!(l.opacity, 1.0);
        assert_eq!(l.scale, 1.0);
        assert_eq!(l.translate_y, 0.0);
        assert_eq!(l.distortion, 0.0);
    }

    #[test]
    fn fades_out_by_halfway() {
        let l = look(0.25, 0.0);
        assert!((l.opacity - 0.5).abs() < 1e-12);
        assert!((l.scale - 0.625).abs() < 1e-12);
        assert!((l.translate_y + 75.0).abs() < 1e-12);
        assert_eq!(look(0.5, 0.0).opacity, 0.0);
    }

    #[test]
    fn scale_floors_and_keeps_tapering_unclamped_progress() {
        assert!((look(1.0, 0.0).scale - 0.3).abs() < 1e-12);
        assert!((look(3.0, 0.0).scale - 0.3).abs() < 1e-12);
        assert!((look(-0.2, 0.0).scale - 1.3).abs() < 1e-12);
    }

    #[test]
    fn opacity_is_only_floored() {
        assert_eq!(look(2.0, 0.0).opacity, 0.0);
        assert!((look(-0.2, 0.0).opacity - 1.4).abs() < 1e-12);
    }

    #[test]
    fn distortion_tracks_speed_in_both_directions() {
        assert!((look(0.1, 0.5).distortion - 50.0).abs() < 1e-12);
        assert!((look(0.1, -0.5).distortion - 50.0).abs() < 1e-12);
        assert_eq!(look(0.1, 40.0).distortion, 200.0);
    }

    #[test]
    fn water_filter_switches_off_at_rest() {
        let config = HeroConfig::default();
        let still = render_hero(&ScrollState::new(0.1, 0.0005), &config);
        assert!(still.contains(&StyleCommand::SetFilter {
            target: Target::WaterFilter,
            filter: Filter::None,
        }));

        let moving = render_hero(&ScrollState::new(0.1, 1.0), &config);
        assert!(moving.contains(&StyleCommand::SetFilter {
            target: Target::WaterFilter,
            filter: Filter::WaterDistortion { scale: 100.0 },
        }));
        assert_eq!(moving.len(), 5);
    }
}
