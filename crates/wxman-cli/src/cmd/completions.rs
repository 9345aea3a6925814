//! Completions command

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Shell, generate};

/// Write completions for `shell` to `out`.
pub fn completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = crate::Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, out);
}
