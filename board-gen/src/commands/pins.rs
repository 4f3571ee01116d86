use anyhow::{Context, Result};
use board_target::{AnnotationPolicy, BoardDescription, ConnectorLayout, Pin};
use colored::Colorize;

/// Prints one line per pin with its functions.
///
/// With `layout`, pins missing from that connector layout are skipped when
/// the layout asks for them to be hidden.
pub fn cmd_pins(
    description: &BoardDescription,
    policy: AnnotationPolicy,
    layout: Option<usize>,
) -> Result<()> {
    description.validate()?;
    let pins = description.get_pins_with(policy)?;

    let layout = layout
        .map(|index| {
            description.boards.get(index).with_context(|| {
                format!(
                    "Board {} has {} connector layouts, there is no layout {index}.",
                    description.info.name,
                    description.boards.len()
                )
            })
        })
        .transpose()?;

    for pin in pins.iter().filter(|pin| is_listed(pin, layout)) {
        println!("{}", format_pin(pin));
    }

    Ok(())
}

fn is_listed(pin: &Pin, layout: Option<&ConnectorLayout>) -> bool {
    match layout {
        Some(layout) if layout.hide_not_on_connectors == Some(true) => {
            layout.is_on_connector(pin.id())
        }
        _ => true,
    }
}

fn format_pin(pin: &Pin) -> String {
    let functions = pin
        .functions
        .keys()
        .map(|function| function.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    let name = format!("{:<5}", pin.id().to_string());
    if pin.is_negated() {
        format!("{} {functions}", name.as_str().yellow())
    } else {
        format!("{name} {functions}")
    }
}
