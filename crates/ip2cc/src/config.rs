//! CLI configuration: thin wrapper around `ip2cc_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--host, --port, --profile, --output).

use clap::ValueEnum;

use ip2cc_config::validate_host;
use ip2cc_core::{AdapterConfig, ClientConfig, DEFAULT_PORT};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ip2cc_config::{Config, Profile, config_path, load_config, save_config};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// `--output`, else `defaults.output`, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.clone().unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or(OutputFormat::Table)
    })
}

/// Transport tuning from the config defaults.
pub fn client_config(config: &Config) -> ClientConfig {
    config.defaults.client_config()
}

/// Work out which device to talk to.
///
/// `--host` wins over the profile; `--port` wins over the profile's port.
/// An explicit `--profile` that does not exist is an error even when
/// `--host` is given.
pub fn resolve_target(global: &GlobalOpts, config: &Config) -> Result<AdapterConfig, CliError> {
    let profile_name = active_profile_name(global, config);
    let profile = config.profiles.get(&profile_name);

    if profile.is_none() && global.profile.is_some() {
        return Err(profile_not_found(profile_name, config));
    }

    let mut target = match (&global.host, profile) {
        (Some(host), _) => AdapterConfig {
            host: validate_host(host)?.to_string(),
            port: profile.and_then(|p| p.port).unwrap_or(DEFAULT_PORT),
        },
        (None, Some(profile)) => ip2cc_config::profile_to_adapter_config(profile, &profile_name)?,
        (None, None) => {
            return Err(CliError::NoHost {
                path: config_path().display().to_string(),
            });
        }
    };

    if let Some(port) = global.port {
        target.port = port;
    }
    Ok(target)
}

/// `host:port`, bracketing IPv6 literals.
pub fn display_addr(target: &AdapterConfig) -> String {
    if target.host.contains(':') {
        format!("[{}]:{}", target.host, target.port)
    } else {
        format!("{}:{}", target.host, target.port)
    }
}

pub fn profile_not_found(name: String, config: &Config) -> CliError {
    let available: Vec<_> = config.profiles.keys().cloned().collect();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["ip2cc"];
        argv.extend_from_slice(args);
        argv.push("actions");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with(profiles: &[(&str, &str, Option<u16>)]) -> Config {
        let mut cfg = Config::default();
        for (name, host, port) in profiles {
            cfg.profiles.insert(
                (*name).into(),
                Profile {
                    host: (*host).into(),
                    port: *port,
                },
            );
        }
        cfg
    }

    #[test]
    fn host_flag_without_config() {
        let target = resolve_target(&global(&["--host", "10.0.0.5"]), &Config::default()).unwrap();
        assert_eq!(target, AdapterConfig::with_host("10.0.0.5"));
        assert_eq!(display_addr(&target), "10.0.0.5:4998");
    }

    #[test]
    fn profile_supplies_host_and_port() {
        let cfg = config_with(&[("default", "10.0.0.7", Some(5000))]);
        let target = resolve_target(&global(&[]), &cfg).unwrap();
        assert_eq!(target.host, "10.0.0.7");
        assert_eq!(target.port, 5000);

        let target = resolve_target(&global(&["--port", "6000"]), &cfg).unwrap();
        assert_eq!(target.port, 6000);
    }

    #[test]
    fn missing_host_and_unknown_profile() {
        let err = resolve_target(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoHost { .. }));

        let cfg = config_with(&[("garage", "10.0.0.5", None)]);
        let err = resolve_target(&global(&["-p", "attic", "-H", "10.0.0.9"]), &cfg).unwrap_err();
        match err {
            CliError::ProfileNotFound { name, available } => {
                assert_eq!(name, "attic");
                assert_eq!(available, "garage");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn hostname_is_rejected() {
        let err = resolve_target(&global(&["--host", "itach.local"]), &Config::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn output_falls_back_to_config_default() {
        let mut cfg = Config::default();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Table);
        cfg.defaults.output = "json-compact".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::JsonCompact);
        assert_eq!(output_format(&global(&["-o", "yaml"]), &cfg), OutputFormat::Yaml);
    }
}
