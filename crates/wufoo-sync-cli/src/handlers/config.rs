//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::PathBuf;

/// Where configuration is read from
#[derive(Debug, Serialize)]
struct ConfigLocations {
    active: Option<PathBuf>,
    searched: Vec<PathBuf>,
}

/// Handle the config command
pub async fn handle_config(
    args: ConfigArgs,
    config: &Config,
    explicit_path: Option<PathBuf>,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Path => handle_config_path(explicit_path, output),
    }
}

/// Handle config show subcommand
fn handle_config_show(
    args: ConfigShowArgs,
    config: &Config,
    output: &mut OutputWriter,
) -> Result<()> {
    let config_to_show = config.redacted();

    let content = match args.format {
        ConfigFormat::Yaml => serde_yaml::to_string(&config_to_show)
            .map_err(|e| Error::config(format!("Failed to serialize as YAML: {}", e)))?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config_to_show)
            .map_err(|e| Error::config(format!("Failed to serialize as JSON: {}", e)))?,
        ConfigFormat::Toml => toml::to_string_pretty(&config_to_show)
            .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e)))?,
    };

    output.writeln(content.trim_end())
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    if args.path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            args.path.display()
        ))?;
        return Ok(());
    }

    Config::starter().save(&args.path)?;
    output.success(&format!("✓ Created config at {}", args.path.display()))?;
    output.info("Set your subdomain and models, and export WUFOO_API_KEY before pushing.")?;

    Ok(())
}

/// Handle config path subcommand
fn handle_config_path(explicit_path: Option<PathBuf>, output: &mut OutputWriter) -> Result<()> {
    let locations = match explicit_path {
        Some(path) => ConfigLocations {
            active: Some(path.clone()),
            searched: vec![path],
        },
        None => ConfigLocations {
            active: Config::find_config_file(),
            searched: Config::default_config_paths(),
        },
    };

    if output.format() != crate::cli::OutputFormat::Human {
        return output.data(&locations);
    }

    match &locations.active {
        Some(path) => output.writeln(&path.display().to_string())?,
        None => output.warning("No configuration file found; using defaults")?,
    }

    output.section("Search order")?;
    for path in &locations.searched {
        output.writeln(&format!("  {}", path.display()))?;
    }

    Ok(())
}
