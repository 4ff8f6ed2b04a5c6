//! Clap derive structures for the `ip2cc` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

use ip2cc_core::RelayState;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ip2cc -- drive an iTach IP2CC relay unit from the shell
#[derive(Debug, Parser)]
#[command(
    name = "ip2cc",
    version,
    about = "Control Global Cache iTach IP2CC relays from the command line",
    long_about = "Switches the three contact-closure relays of an iTach IP2CC unit\n\
        over its TCP command port (4998), and prints the action, preset,\n\
        and configuration schema the adapter exposes to control surfaces.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'p', env = "IP2CC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Device IP address (overrides profile)
    #[arg(long, short = 'H', env = "IP2CC_HOST", global = true)]
    pub host: Option<String>,

    /// Device command port (overrides profile)
    #[arg(long, env = "IP2CC_PORT", global = true)]
    pub port: Option<u16>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "IP2CC_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Seconds to wait for the device to accept the connection
    #[arg(long, env = "IP2CC_TIMEOUT", default_value = "10", global = true)]
    pub timeout: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Close or open one relay
    Set(SetArgs),

    /// List the actions the adapter registers
    Actions,

    /// List the button presets
    Presets,

    /// List the configuration fields
    Fields,

    /// Stay connected and stream status and log lines until Ctrl-C
    Watch,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Relay port (1-3)
    #[arg(id = "relay_port", value_name = "PORT", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub port: u8,

    /// Target state
    pub state: StateArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    /// Close the contact (turn on)
    #[value(alias = "on")]
    Close,
    /// Open the contact (turn off)
    #[value(alias = "off")]
    Open,
}

impl From<StateArg> for RelayState {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Close => Self::Closed,
            StateArg::Open => Self::Open,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a profile for --host (under --profile, default "default")
    Init,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn state_aliases_map_to_relay_state() {
        assert_eq!(
            RelayState::from(StateArg::from_str("on", true).unwrap_or(StateArg::Open)),
            RelayState::Closed
        );
        assert_eq!(RelayState::from(StateArg::Open), RelayState::Open);
    }
}
