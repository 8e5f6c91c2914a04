use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct AsmArgs {
    /// Input source file
    pub input: PathBuf,
}

pub fn cmd_asm(args: AsmArgs) {
    let (source, filename) = super::load_source(&args.input);
    let tree = super::parse_or_exit(&source, &filename);
    let asm = super::lower_or_exit(&tree);
    print!("{}", asm);
}
