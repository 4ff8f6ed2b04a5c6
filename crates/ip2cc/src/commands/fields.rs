//! Configuration schema listing.

use tabled::Tabled;

use ip2cc_core::ConfigField;
use ip2cc_core::field;

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Width")]
    width: u8,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&ConfigField> for FieldRow {
    fn from(f: &ConfigField) -> Self {
        let (kind, width, detail) = match f {
            ConfigField::TextInput { width, regex, .. } => {
                ("textinput", *width, regex.clone().unwrap_or_default())
            }
            ConfigField::StaticText { width, value, .. } => ("text", *width, value.clone()),
        };
        Self {
            id: f.id().into(),
            kind,
            label: f.label().into(),
            width,
            detail,
        }
    }
}

pub fn handle(cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    let fields = field::config_fields();
    let out = output::render_list(
        &config::output_format(global, cfg),
        &fields,
        |f| FieldRow::from(f),
        |f| f.id().to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
