//! Config command.

use clap::Args;

use moodbox_session::Config;

use super::{load_config, output_result};
use crate::Cli;

/// Prints the configuration.
///
/// Prints the built-in defaults, or with --effective the configuration
/// that other commands would load.
#[derive(Args)]
pub struct ConfigCommand {
    /// Print the loaded configuration instead of the defaults
    #[arg(long)]
    effective: bool,
    /// Print the default config file path
    #[arg(long, conflicts_with = "effective")]
    path: bool,
}

impl ConfigCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        if self.path {
            let path = Config::default_path()
                .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
            println!("{}", path.display());
            return Ok(());
        }

        let config = if self.effective {
            load_config(cli)?
        } else {
            Config::default()
        };
        output_result(&config, cli.output.as_deref(), cli.json)
    }
}
