//! `hookline config` - inspect and create the layered settings files

use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};

use crate::config::{ConfigLoader, HooklineConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged dispatcher settings
    Show,
    /// Show where each settings layer is read from
    Path,
    /// Write the default settings to the project layer
    Init {
        /// Overwrite an existing project config
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            let config = ConfigLoader::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommands::Path => {
            print_layer("User config:   ", &ConfigLoader::user_config_path());
            print_layer("Project config:", &ConfigLoader::project_config_path());
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = ConfigLoader::project_config_path();
            init_config(&path, force)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn print_layer(label: &str, path: &Path) {
    let state = if path.exists() { "" } else { " (not found)" };
    println!("{} {}{}", label, path.display(), state);
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(&HooklineConfig::default())?;
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
