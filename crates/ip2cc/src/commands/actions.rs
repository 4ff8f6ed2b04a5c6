//! Action registry listing.

use tabled::Tabled;

use ip2cc_core::action::{self, ActionDefinition, ActionOption};

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Options")]
    options: String,
}

impl From<&ActionDefinition> for ActionRow {
    fn from(a: &ActionDefinition) -> Self {
        Self {
            id: a.id.clone(),
            label: a.label.clone(),
            options: a.options.iter().map(describe_option).collect::<Vec<_>>().join("\n"),
        }
    }
}

/// `portNum: 1, | 2, | 3, (default 1,)`
fn describe_option(option: &ActionOption) -> String {
    match option {
        ActionOption::Dropdown {
            id,
            default,
            choices,
            ..
        } => {
            let ids: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
            format!("{id}: {} (default {default})", ids.join(" | "))
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let actions = action::registry();
    let out = output::render_list(
        &config::output_format(global, cfg),
        &actions,
        |a| ActionRow::from(a),
        |a| a.id.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_lists_option_values() {
        let row = ActionRow::from(&action::port_set_definition());
        assert_eq!(row.id, "portSet");
        assert_eq!(
            row.options,
            "portNum: 1, | 2, | 3, (default 1,)\nsetPort: 1 | 0 (default 1)"
        );
    }
}
