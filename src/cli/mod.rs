pub mod asm;
pub mod check;
pub mod compile;

use std::path::Path;
use std::process;

use graphite::ast::Stmt;
use graphite::diagnostic::render_diagnostics;

/// Read a source file, exiting with a message on failure.
pub fn load_source(path: &Path) -> (String, String) {
    match std::fs::read_to_string(path) {
        Ok(source) => (source, path.display().to_string()),
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Parse a source file, rendering diagnostics and exiting on failure.
pub fn parse_or_exit(source: &str, filename: &str) -> Stmt {
    match graphite::parse_source(source) {
        Ok(tree) => tree,
        Err(diagnostics) => {
            render_diagnostics(&diagnostics, filename, source);
            process::exit(1);
        }
    }
}

/// Lower a syntax tree to assembly, exiting on a compile error.
pub fn lower_or_exit(tree: &Stmt) -> String {
    match graphite::emit::Emitter::new().emit_program(tree) {
        Ok(asm) => asm,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Package assembly into the final script, exiting on failure.
pub fn package_or_exit(asm: &str) -> String {
    match graphite::assemble::assemble(asm) {
        Ok(js) => js,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
