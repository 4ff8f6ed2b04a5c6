//! Config subcommand handlers.

use std::fmt::Write as _;

use ip2cc_config::validate_host;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let text = toml::to_string_pretty(cfg)?;
            let out = output::render_single(
                &config::output_format(global, cfg),
                cfg,
                |_| text.trim_end().to_owned(),
                profile_names,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        // ── Init ────────────────────────────────────────────────────
        ConfigCommand::Init => {
            let host = global.host.as_deref().ok_or_else(|| CliError::Validation {
                field: "host".into(),
                reason: "pass --host <ip> with the unit's address".into(),
            })?;
            let ip = validate_host(host)?;
            let name = global.profile.clone().unwrap_or_else(|| "default".into());

            let mut updated = cfg.clone();
            updated.profiles.insert(
                name.clone(),
                Profile {
                    host: ip.to_string(),
                    port: global.port,
                },
            );
            // Point the default at this profile unless it already names one.
            let default_missing = updated
                .default_profile
                .as_ref()
                .is_none_or(|d| !updated.profiles.contains_key(d));
            if default_missing {
                updated.default_profile = Some(name.clone());
            }
            let path = config::save_config(&updated)?;

            if !global.quiet {
                eprintln!("✓ Saved profile '{name}' ({ip}) to {}", path.display());
            }
            Ok(())
        }
    }
}

/// Plain output: one profile per line, default marked with `*`.
fn profile_names(cfg: &Config) -> String {
    let default = cfg.default_profile.as_deref().unwrap_or("default");
    let mut out = String::new();
    for name in cfg.profiles.keys() {
        let marker = if name == default { " *" } else { "" };
        let _ = writeln!(out, "{name}{marker}");
    }
    out.trim_end().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lists_profiles_with_default_marker() {
        let mut cfg = Config::default();
        for name in ["default", "lab"] {
            cfg.profiles.insert(
                name.into(),
                Profile {
                    host: "10.0.0.5".into(),
                    port: None,
                },
            );
        }
        assert_eq!(profile_names(&cfg), "default *\nlab");
        assert_eq!(profile_names(&Config::default()), "");
    }
}
