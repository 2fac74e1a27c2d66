use scrollstage_protocol::{ScrollState, StyleCommand, Transform};

use crate::config::{SectionTable, SectionTransition};

/// Presentation of a scroll-revealed section panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLook {
    pub opacity: f64,
    pub translate_y: f64,
    pub scale: f64,
}

/// `None` while the panel is unmounted (before its transition begins).
pub fn panel_look(
    transition: &SectionTransition,
    table: &SectionTable,
    progress: f64,
) -> Option<PanelLook> {
    let t = transition.progress(progress)?;
    Some(PanelLook {
        opacity: t,
        translate_y: (1.0 - t) * table.rise_px,
        scale: table.start_scale + t * (1.0 - table.start_scale),
    })
}

/// Render every panel in the section table.
pub fn render_panels(state: &ScrollState, table: &SectionTable) -> Vec<StyleCommand> {
    let mut commands = Vec::with_capacity(table.transitions.len() * 3);
    for transition in &table.transitions {
        let target = transition.target;
        match panel_look(transition, table, state.progress) {
            Some(look) => {
                commands.push(StyleCommand::Show { target });
                commands.push(StyleCommand::SetOpacity {
                    target,
                    opacity: look.opacity,
                });
                commands.push(StyleCommand::SetTransform {
                    target,
                    transform: Transform::lift(look.translate_y, look.scale),
                });
            }
            None => commands.push(StyleCommand::Hide { target }),
        }
    }
    commands
}
