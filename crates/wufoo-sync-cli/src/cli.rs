//! Command-line interface argument parsing and definitions
//!
//! The CLI structure is declared with clap's derive API.

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// wufoo-sync - push local records to Wufoo forms
///
/// Inspect a form's fields, preview how a record maps onto them and submit
/// records as form entries, with field errors reported under the record's
/// own field names.
#[derive(Parser, Debug)]
#[command(
    name = "wufoo-sync",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "WUFOO_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a form's fields and show the title map records are matched against
    Fields(FieldsArgs),

    /// Show how a record maps onto a form, without submitting anything
    Preview(PreviewArgs),

    /// Submit a record as a form entry
    Push(PushArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the fields command
#[derive(Parser, Debug)]
pub struct FieldsArgs {
    /// Form hash or title slug
    #[arg(value_name = "FORM")]
    pub form: String,
}

/// Arguments for the preview command
#[derive(Parser, Debug)]
pub struct PreviewArgs {
    /// Path to the record file (JSON or YAML object)
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Path to a saved `fields` response for the form (JSON or YAML)
    #[arg(long, value_name = "FIELDS_JSON")]
    pub fields: PathBuf,

    /// Disable the `"{field} {value}"` fallback match
    #[arg(long)]
    pub no_composite: bool,
}

/// Arguments for the push command
#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("target").required(true).args(["form", "model"])))]
pub struct PushArgs {
    /// Path to the record file (JSON or YAML object)
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Submit to this form directly
    #[arg(long, value_name = "FORM")]
    pub form: Option<String>,

    /// Submit to the form configured for this model
    #[arg(long, value_name = "ALIAS")]
    pub model: Option<String>,

    /// Treat the record as an update of an existing record
    #[arg(long)]
    pub update: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration, with secrets redacted
    Show(ConfigShowArgs),

    /// Write a starter configuration file
    Init(ConfigInitArgs),

    /// Show which configuration file is in use and where files are searched
    Path,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file
    #[arg(long, default_value = ".wufoo-sync.yaml")]
    pub path: PathBuf,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
    /// TOML format
    Toml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Shell {
    /// Convert to clap_complete Shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
