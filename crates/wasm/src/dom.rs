use scrollstage_protocol::{Filter, StyleCommand};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

/// Apply style commands to the elements whose id is the target name.
/// Targets missing from the page are skipped.
pub fn apply(document: &Document, commands: &[StyleCommand]) {
    for command in commands {
        let Some(element) = document.get_element_by_id(command.target().element_id()) else {
            continue;
        };
        if let Err(e) = apply_one(&element, command) {
            web_sys::console::warn_2(&"scrollstage: style update failed".into(), &e);
        }
    }
}

fn apply_one(element: &Element, command: &StyleCommand) -> Result<(), JsValue> {
    // SVG filter primitives take attributes, not CSS.
    let Some(html) = element.dyn_ref::<HtmlElement>() else {
        return match command {
            StyleCommand::SetFilter {
                filter: Filter::WaterDistortion { scale },
                ..
            } => element.set_attribute("scale", &scale.to_string()),
            StyleCommand::SetFilter { .. } => element.set_attribute("scale", "0"),
            _ => Ok(()),
        };
    };
    let style = html.style();
    match command {
        StyleCommand::SetOpacity { opacity, .. } => {
            style.set_property("opacity", &opacity.to_string())
        }
        StyleCommand::SetTransform { transform, .. } => {
            style.set_property("transform", &transform.to_css())
        }
        StyleCommand::SetUniform { name, value, .. } => {
            style.set_property(&format!("--{name}"), &value.to_string())
        }
        StyleCommand::SetFilter { filter, .. } => style.set_property("filter", &filter_css(filter)),
        StyleCommand::SetFill {
            fraction, color, ..
        } => {
            style.set_property("width", &format!("{}%", fraction * 100.0))?;
            style.set_property("background-color", color.css())
        }
        // Rewriting the same clip would restart it.
        StyleCommand::SetClip { clip, .. } => match clip {
            Some(name) if element.get_attribute("data-clip").as_deref() != Some(name.as_str()) => {
                element.set_attribute("data-clip", name)
            }
            Some(_) => Ok(()),
            None => element.remove_attribute("data-clip"),
        },
        StyleCommand::Show { .. } => style.remove_property("display").map(|_| ()),
        StyleCommand::Hide { .. } => style.set_property("display", "none"),
    }
}

fn filter_css(filter: &Filter) -> String {
    match filter {
        Filter::None => "none".to_string(),
        Filter::Blur { radius } => format!("blur({radius}px)"),
        Filter::WaterDistortion { .. } => "url(#water-filter)".to_string(),
    }
}
