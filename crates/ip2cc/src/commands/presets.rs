//! Preset listing.

use tabled::Tabled;

use ip2cc_core::Preset;
use ip2cc_core::preset;

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct PresetRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Button")]
    button: String,
    #[tabled(rename = "Command")]
    command: String,
}

impl From<&Preset> for PresetRow {
    fn from(p: &Preset) -> Self {
        Self {
            category: p.category.clone(),
            label: p.label.clone(),
            button: p.bank.text.clone(),
            command: wire_command(p),
        }
    }
}

fn wire_command(p: &Preset) -> String {
    p.actions
        .iter()
        .filter_map(|a| a.port_set_command().ok())
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let presets = preset::presets();
    let out = output::render_list(
        &config::output_format(global, cfg),
        &presets,
        |p| PresetRow::from(p),
        |p| format!("{}/{}", p.category, p.label),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_show_wire_command() {
        let rows: Vec<PresetRow> = preset::presets().iter().map(PresetRow::from).collect();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].command, "setstate,1:1,1");
        assert_eq!(rows[5].command, "setstate,1:3,0");
        assert_eq!(rows[3].button, "PORT 2\nOPEN");
    }
}
