use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph, Row, Table},
};
use scrollstage_core::Committed;
use scrollstage_protocol::{Filter, StyleCommand, Target, ThemeToken, Transform};

fn theme_to_color(token: ThemeToken) -> Color {
    match token {
        ThemeToken::Background => Color::Black,
        ThemeToken::Foreground => Color::White,
        ThemeToken::Accent => Color::Rgb(255, 216, 65),
        ThemeToken::AccentDark => Color::Rgb(255, 215, 0),
        ThemeToken::Track => Color::DarkGray,
    }
}

/// Frame-level facts that are not style commands.
#[derive(Debug, Clone, Default)]
pub struct Status {
    pub fps: f64,
    pub clip: Option<String>,
    pub glitching: bool,
}

/// Latest style of one target, folded from a frame's commands.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetView {
    pub target: Target,
    pub visible: bool,
    pub opacity: Option<f64>,
    pub transform: Option<Transform>,
    pub filter: Option<Filter>,
    pub fill: Option<(f64, ThemeToken)>,
    pub uniforms: Vec<(String, f64)>,
}

impl TargetView {
    fn new(target: Target) -> Self {
        Self {
            target,
            visible: true,
            opacity: None,
            transform: None,
            filter: None,
            fill: None,
            uniforms: Vec::new(),
        }
    }

    fn apply(&mut self, command: &StyleCommand) {
        match command {
            StyleCommand::SetOpacity { opacity, .. } => self.opacity = Some(*opacity),
            StyleCommand::SetTransform { transform, .. } => self.transform = Some(*transform),
            StyleCommand::SetUniform { name, value, .. } => {
                match self.uniforms.iter_mut().find(|(n, _)| n == name) {
                    Some(slot) => slot.1 = *value,
                    None => self.uniforms.push((name.clone(), *value)),
                }
            }
            StyleCommand::SetFilter { filter, .. } => self.filter = Some(*filter),
            StyleCommand::SetFill {
                fraction, color, ..
            } => self.fill = Some((*fraction, *color)),
            StyleCommand::SetClip { .. } => {}
            StyleCommand::Show { .. } => self.visible = true,
            StyleCommand::Hide { .. } => self.visible = false,
        }
    }

    fn detail(&self) -> String {
        if let Some((fraction, _)) = self.fill {
            return format!("fill {:>5.1}%", fraction * 100.0);
        }
        match self.filter {
            Some(Filter::Blur { radius }) => return format!("blur {radius:.2}px"),
            Some(Filter::WaterDistortion { scale }) => return format!("water {scale:.1}"),
            Some(Filter::None) | None => {}
        }
        self.uniforms
            .iter()
            .map(|(name, value)| format!("{name}={value:.2}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One view per target, in [`Target::ALL`] order.
pub fn collect_views(commands: &[StyleCommand]) -> Vec<TargetView> {
    let mut views: Vec<TargetView> = Target::ALL.into_iter().map(TargetView::new).collect();
    for command in commands {
        if let Some(view) = views.iter_mut().find(|v| v.target == command.target()) {
            view.apply(command);
        }
    }
    views
}

pub fn draw(frame: &mut Frame, committed: &Committed, commands: &[StyleCommand], status: &Status) {
    let area = frame.area();
    let [header_area, gauges_area, table_area, help_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(6),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let header = Paragraph::new(format!(
        " scrollstage | tick {} | {:>5.1} fps | clip {} {}",
        committed.tick,
        status.fps,
        status.clip.as_deref().unwrap_or("-"),
        if status.glitching { "| GLITCH" } else { "" },
    ))
    .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, header_area);

    let views = collect_views(commands);
    draw_gauges(frame, gauges_area, committed, &views);
    draw_targets(frame, table_area, &views);

    let help = Paragraph::new(Line::from(
        " ↑↓/wheel scroll | mouse cursor | PgUp/PgDn page | l load more | g glitch | r random | 1-9 clip | s stop | q quit ",
    ))
    .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, help_area);
}

fn draw_gauges(frame: &mut Frame, area: Rect, committed: &Committed, views: &[TargetView]) {
    let [progress_area, section_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(3)]).areas(area);

    let state = committed.state;
    // Progress may leave [0, 1]; the gauge cannot.
    let progress = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(format!(
            " progress {:.3} | velocity {:+.3} px/ms | offset {:.0} of {:.0} ",
            state.progress,
            state.velocity,
            committed.metrics.offset,
            committed.metrics.max_offset().max(0.0),
        )))
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(state.progress.clamp(0.0, 1.0));
    frame.render_widget(progress, progress_area);

    let bar = views.iter().find(|v| v.target == Target::ProgressBar);
    let (fill, color) = match bar {
        Some(TargetView {
            visible: true,
            fill: Some((fraction, color)),
            ..
        }) => (fraction.clamp(0.0, 1.0), *color),
        _ => (0.0, ThemeToken::Track),
    };
    let sections = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" sections "))
        .gauge_style(Style::default().fg(theme_to_color(color)))
        .ratio(fill);
    frame.render_widget(sections, section_area);
}

fn draw_targets(frame: &mut Frame, area: Rect, views: &[TargetView]) {
    let rows = views.iter().map(|view| {
        let style = if view.visible {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let transform = view.transform.map_or(String::new(), |t| {
            format!(
                "x {:>6.1} y {:>7.1} s {:.2}x{:.2}",
                t.translate_x, t.translate_y, t.scale_x, t.scale_y
            )
        });
        Row::new(vec![
            view.target.element_id().to_string(),
            if view.visible { "shown" } else { "hidden" }.to_string(),
            view.opacity.map_or(String::new(), |o| format!("{o:.2}")),
            transform,
            view.detail(),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(33),
            Constraint::Min(10),
        ],
    )
    .header(
        Row::new(vec!["target", "state", "alpha", "transform", "detail"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" targets "));
    frame.render_widget(table, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_commands_win() {
        let views = collect_views(&[
            StyleCommand::SetOpacity {
                target: Target::HeroScene,
                opacity: 1.0,
            },
            StyleCommand::Hide {
                target: Target::ChatPanel,
            },
            StyleCommand::SetOpacity {
                target: Target::HeroScene,
                opacity: 0.25,
            },
        ]);
        assert_eq!(views.len(), Target::ALL.len());
        let hero = &views[0];
        assert_eq!(hero.target, Target::HeroScene);
        assert_eq!(hero.opacity, Some(0.25));
        let chat = views.iter().find(|v| v.target == Target::ChatPanel);
        assert_eq!(chat.map(|v| v.visible), Some(false));
    }

    #[test]
    fn uniforms_update_in_place() {
        let set = |value| StyleCommand::SetUniform {
            target: Target::GlitchBackground,
            name: "distortion".into(),
            value,
        };
        let views = collect_views(&[set(0.5), set(1.5)]);
        let bg = views.iter().find(|v| v.target == Target::GlitchBackground);
        assert_eq!(
            bg.map(|v| v.uniforms.clone()),
            Some(vec![("distortion".to_string(), 1.5)])
        );
        assert_eq!(bg.map(TargetView::detail).as_deref(), Some("distortion=1.50"));
    }
}
