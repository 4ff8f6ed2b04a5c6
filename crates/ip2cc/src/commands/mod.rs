//! Command dispatch: bridges CLI args -> adapter calls -> output formatting.

pub mod actions;
pub mod config_cmd;
pub mod fields;
pub mod presets;
pub mod set;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(cmd: Command, config: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Set(args) => set::handle(args, config, global).await,
        Command::Actions => actions::handle(config, global),
        Command::Presets => presets::handle(config, global),
        Command::Fields => fields::handle(config, global),
        Command::Watch => watch::handle(config, global).await,
        Command::Config(args) => config_cmd::handle(args, config, global),
        // Completions are rendered before config is loaded
        Command::Completions(_) => Ok(()),
    }
}
