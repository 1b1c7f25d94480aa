//! Shell completions command handler

use crate::cli::{CompletionsArgs, Shell};
use crate::error::Result;
use clap::CommandFactory;
use std::io::{self, Write};

/// Handle the completions command
pub fn handle_completions(args: CompletionsArgs) -> Result<()> {
    write_completions(args.shell, &mut io::stdout())
}

/// Generate completions for `shell` into `out`
pub fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = crate::cli::Cli::command();
    let name = cmd.get_name().to_string();

    clap_complete::generate(shell.to_clap_shell(), &mut cmd, name, out);
    out.flush()?;

    Ok(())
}
