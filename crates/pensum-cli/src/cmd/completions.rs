//! `pensum completions` — shell completion scripts.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use clap_complete::Shell;
use tracing::debug;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate the script for.
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write the script to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Generate the completion script for `command`.
///
/// # Errors
///
/// Fails when the output file cannot be created or written.
pub fn run_completions(args: &CompletionsArgs, command: clap::Command) -> anyhow::Result<()> {
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_script(args.shell, command, &mut out)?;
            out.flush()
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(shell = %args.shell, path = %path.display(), "completions written");
        }
        None => write_script(args.shell, command, &mut io::stdout().lock())?,
    }
    Ok(())
}

/// The script is keyed on the command's own name, so renaming the binary
/// keeps completions in sync.
fn write_script(shell: Shell, mut command: clap::Command, out: &mut dyn Write) -> io::Result<()> {
    let bin_name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, bin_name, out);
    out.flush()
}
