//! CLI error types with miette diagnostics.
//!
//! Maps config and dispatch failures into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use ip2cc_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach relay unit at {addr}")]
    #[diagnostic(
        code(ip2cc::connection_failed),
        help(
            "{reason}\n\
             Check that the unit is powered, on the network, and that nothing\n\
             else holds its command port. Try a longer --timeout."
        )
    )]
    ConnectionFailed { addr: String, reason: String },

    #[error("Action rejected: {reason}")]
    #[diagnostic(code(ip2cc::rejected))]
    Rejected { reason: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ip2cc::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No device host configured")]
    #[diagnostic(
        code(ip2cc::no_host),
        help(
            "Pass --host <ip>, set IP2CC_HOST, or save a profile with:\n\
             ip2cc config init --host <ip>\n\
             Config file: {path}"
        )
    )]
    NoHost { path: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ip2cc::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ip2cc config init --host <ip> --profile {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(ip2cc::config),
        help("Fix or remove the config file; `ip2cc config path` shows where it lives.")
    )]
    Config(ConfigError),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(ip2cc::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::NoHost { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::NoHost => Self::NoHost {
                path: ip2cc_config::config_path().display().to_string(),
            },
            other => Self::Config(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let unreachable = CliError::ConnectionFailed {
            addr: "10.0.0.5:4998".into(),
            reason: "refused".into(),
        };
        assert_eq!(unreachable.exit_code(), 7);
        assert_eq!(CliError::from(ConfigError::NoHost).exit_code(), 2);
        assert_eq!(
            CliError::from(ConfigError::UnknownProfile {
                name: "attic".into()
            })
            .exit_code(),
            4
        );
        assert_eq!(CliError::Render("x".into()).exit_code(), 1);
    }

    #[test]
    fn rejected_action_names_local_reason() {
        let err = CliError::Rejected {
            reason: "portNum '4,' is not a relay port".into(),
        };
        assert_eq!(
            err.to_string(),
            "Action rejected: portNum '4,' is not a relay port"
        );
        assert_eq!(err.exit_code(), 1);
    }
}
