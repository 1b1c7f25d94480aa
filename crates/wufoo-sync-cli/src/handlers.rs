//! Command handlers for CLI subcommands
//!
//! Each submodule implements one subcommand.

pub mod completions;
pub mod config;
pub mod fields;
pub mod preview;
pub mod push;
pub mod utils;

pub use completions::handle_completions;
pub use config::handle_config;
pub use fields::handle_fields;
pub use preview::handle_preview;
pub use push::handle_push;
