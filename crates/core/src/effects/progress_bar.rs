use scrollstage_protocol::{ScrollMetrics, StyleCommand, Target, ThemeToken};

use crate::config::ProgressBarConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressBarLook {
    /// 1-based index of the section under the marker line.
    pub active_section: u32,
    pub visible: bool,
    /// Filled fraction in `[0, 1]`.
    pub fill: f64,
}

/// Section tops for a page of equally tall, viewport-high sections. Empty
/// when the viewport has no usable height, which leaves the first section
/// active.
pub fn uniform_tops(total_sections: u32, viewport_height: f64) -> Vec<f64> {
    if !viewport_height.is_finite() || viewport_height <= 0.0 {
        return Vec::new();
    }
    (0..total_sections)
        .map(|i| f64::from(i) * viewport_height)
        .collect()
}

/// The last section whose top is at or above `marker`, or 1 if none is.
///
/// `tops[i]` is the top of section `i + 1` in document pixels.
pub fn active_section(tops: &[f64], marker: f64) -> u32 {
    tops.iter()
        .rposition(|&top| marker >= top)
        .map_or(1, |i| i as u32 + 1)
}

pub fn progress_bar_look(
    metrics: &ScrollMetrics,
    tops: &[f64],
    config: &ProgressBarConfig,
) -> ProgressBarLook {
    let total = config.total_sections as usize;
    let tops = &tops[..tops.len().min(total)];
    let marker = metrics.offset + metrics.viewport_height * config.marker_fraction;
    let active = active_section(tops, marker);

    let shown = f64::from(config.total_sections.saturating_sub(config.start_from) + 1);
    let reached = f64::from(active) - f64::from(config.start_from) + 1.0;
    ProgressBarLook {
        active_section: active,
        visible: active >= config.start_from,
        fill: (reached / shown).clamp(0.0, 1.0),
    }
}

pub fn render_progress_bar(look: &ProgressBarLook) -> Vec<StyleCommand> {
    let target = Target::ProgressBar;
    if !look.visible {
        return vec![StyleCommand::Hide { target }];
    }
    vec![
        StyleCommand::Show { target },
        StyleCommand::SetFill {
            target,
            fraction: look.fill,
            color: ThemeToken::Accent,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look_at(offset: f64) -> ProgressBarLook {
        let config = ProgressBarConfig::default();
        let metrics = ScrollMetrics::new(offset, 6000.0, 1000.0);
        progress_bar_look(&metrics, &uniform_tops(6, 1000.0), &config)
    }

    #[test]
    fn hidden_in_hero_section() {
        let look = look_at(0.0);
        assert_eq!(look.active_section, 1);
        assert!(!look.visible);
        assert_eq!(render_progress_bar(&look).len(), 1);
    }

    #[test]
    fn marker_sits_a_third_down_the_viewport() {
        // Section 2 starts at 1000; the marker crosses it at offset ~667.
        assert_eq!(look_at(600.0).active_section, 1);
        assert_eq!(look_at(700.0).active_section, 2);
    }

    #[test]
    fn fill_grows_per_section() {
        let second = look_at(1000.0);
        assert!(second.visible);
        assert!((second.fill - 0.2).abs() < 1e-12);
        let last = look_at(5000.0);
        assert_eq!(last.active_section, 6);
        assert!((last.fill - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_height_viewport_stays_in_hero() {
        assert!(uniform_tops(6, 0.0).is_empty());
        assert!(uniform_tops(6, f64::NAN).is_empty());
        let metrics = ScrollMetrics::default();
        let look = progress_bar_look(
            &metrics,
            &uniform_tops(6, metrics.viewport_height),
            &ProgressBarConfig::default(),
        );
        assert_eq!(look.active_section, 1);
        assert_eq!(
            render_progress_bar(&look),
            vec![StyleCommand::Hide {
                target: Target::ProgressBar
            }]
        );
    }

    #[test]
    fn empty_layout_defaults_to_first_section() {
        assert_eq!(active_section(&[], 500.0), 1);
    }

    #[test]
    fn ignores_sections_past_the_configured_total() {
        let config = ProgressBarConfig {
            total_sections: 3,
            ..ProgressBarConfig::default()
        };
        let metrics = ScrollMetrics::new(5000.0, 6000.0, 1000.0);
        let look = progress_bar_look(&metrics, &uniform_tops(6, 1000.0), &config);
        assert_eq!(look.active_section, 3);
        assert!((look.fill - 1.0).abs() < 1e-12);
    }
}
