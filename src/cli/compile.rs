use std::path::PathBuf;
use std::process;

use clap::Args;

#[derive(Args)]
pub struct CompileArgs {
    /// Input source file
    pub input: PathBuf,
    /// Write the packaged script here instead of standard output
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_compile(args: CompileArgs) {
    let (source, filename) = super::load_source(&args.input);
    let tree = super::parse_or_exit(&source, &filename);
    let asm = super::lower_or_exit(&tree);
    let js = super::package_or_exit(&asm);

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &js) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Compiled -> {}", path.display());
        }
        None => println!("{}", js),
    }
}
