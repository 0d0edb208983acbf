// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `overstory completions` - Shell completion scripts

use clap::Args;
use clap_complete::Shell;

#[derive(Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: Shell,
}

pub fn completions(args: &CompletionsArgs, cmd: &mut clap::Command) {
    clap_complete::generate(args.shell, cmd, "overstory", &mut std::io::stdout());
}
