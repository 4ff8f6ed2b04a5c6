// ── Button presets ──
//
// Six ready-made buttons, one close and one open per port. The host
// drops them onto its surface as-is, so ordering and styling are fixed:
// port ascending, Close before Open, white 14pt text on black.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::action::ActionInvocation;
use crate::command::{Port, RelayState};

pub const TEXT_SIZE: u8 = 14;
pub const WHITE: u32 = 0x00FF_FFFF;
pub const BLACK: u32 = 0x0000_0000;

/// How the host should draw the button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonStyle {
    pub style: String,
    pub text: String,
    pub size: u8,
    pub color: u32,
    pub bgcolor: u32,
}

impl ButtonStyle {
    fn text(text: String) -> Self {
        Self {
            style: "text".into(),
            text,
            size: TEXT_SIZE,
            color: WHITE,
            bgcolor: BLACK,
        }
    }
}

/// A predeclared button bundling a style with the action it triggers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub category: String,
    pub label: String,
    pub bank: ButtonStyle,
    pub actions: Vec<ActionInvocation>,
}

impl Preset {
    pub fn for_command(port: Port, state: RelayState) -> Self {
        let verb = state.verb();
        Self {
            category: format!("Port {port}"),
            label: verb.into(),
            bank: ButtonStyle::text(format!("PORT {port}\n{}", verb.to_uppercase())),
            actions: vec![ActionInvocation::port_set(port, state)],
        }
    }
}

/// All presets in display order.
pub fn presets() -> Vec<Preset> {
    Port::iter()
        .flat_map(|port| RelayState::iter().map(move |state| Preset::for_command(port, state)))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::action::{OPT_PORT_NUM, OPT_SET_PORT, PORT_SET};

    #[test]
    fn six_presets_port_ascending_close_first() {
        let all = presets();
        assert_eq!(all.len(), 6);

        let summary: Vec<(String, String, &str, &str)> = all
            .iter()
            .map(|p| {
                let action = &p.actions[0];
                (
                    p.category.clone(),
                    p.label.clone(),
                    action.option(OPT_PORT_NUM).unwrap_or_default(),
                    action.option(OPT_SET_PORT).unwrap_or_default(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Port 1".into(), "Close".into(), "1,", "1"),
                ("Port 1".into(), "Open".into(), "1,", "0"),
                ("Port 2".into(), "Close".into(), "2,", "1"),
                ("Port 2".into(), "Open".into(), "2,", "0"),
                ("Port 3".into(), "Close".into(), "3,", "1"),
                ("Port 3".into(), "Open".into(), "3,", "0"),
            ]
        );
    }

    #[test]
    fn button_text_and_style() {
        let preset = Preset::for_command(Port::Two, RelayState::Open);
        assert_eq!(preset.bank.text, "PORT 2\nOPEN");
        assert_eq!(preset.bank.style, "text");
        assert_eq!(preset.bank.size, 14);
        assert_eq!(preset.bank.color, 16_777_215);
        assert_eq!(preset.bank.bgcolor, 0);
        assert_eq!(preset.actions.len(), 1);
        assert_eq!(preset.actions[0].action, PORT_SET);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(presets(), presets());
    }
}
