mod cli;

use clap::{Parser, Subcommand};

use cli::asm::AsmArgs;
use cli::check::CheckArgs;
use cli::compile::CompileArgs;

#[derive(Parser)]
#[command(
    name = "graphite",
    version,
    about = "graphite compiler: imperative programs for the graphing calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a source file and print the packaged script
    Compile(CompileArgs),
    /// Print the intermediate assembly for a source file
    Asm(AsmArgs),
    /// Check a source file without emitting anything
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Compile(args) => cli::compile::cmd_compile(args),
        Command::Asm(args) => cli::asm::cmd_asm(args),
        Command::Check(args) => cli::check::cmd_check(args),
    }
}
