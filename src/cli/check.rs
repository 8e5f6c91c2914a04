use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct CheckArgs {
    /// Input source file
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let (source, filename) = super::load_source(&args.input);
    let tree = super::parse_or_exit(&source, &filename);
    let _ = super::lower_or_exit(&tree);
    eprintln!("Checked {}", filename);
}
