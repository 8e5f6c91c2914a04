pub mod asm;
pub mod assemble;
pub mod ast;
pub mod diagnostic;
pub mod emit;
pub mod error;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod registers;
pub mod scope;
pub mod span;

use std::path::Path;

use diagnostic::Diagnostic;
use error::Error;
use lexer::Lexer;
use parser::Parser;

/// Parse source text into a syntax tree: a `Group` of top-level statements.
pub fn parse_source(source: &str) -> Result<ast::Stmt, Vec<Diagnostic>> {
    let (tokens, lex_errors) = Lexer::new(source).tokenize();
    if !lex_errors.is_empty() {
        return Err(lex_errors);
    }
    Parser::new(tokens).parse_program()
}

/// Compile source text to the intermediate assembly.
pub fn compile_source(source: &str) -> Result<String, Error> {
    let tree = parse_source(source)?;
    Ok(emit::Emitter::new().emit_program(&tree)?)
}

/// Compile source text all the way to the packaged script.
pub fn package_source(source: &str) -> Result<String, Error> {
    let asm = compile_source(source)?;
    Ok(assemble::assemble(&asm)?)
}

/// Read a source file and package it.
pub fn package_file(path: &Path) -> Result<String, Error> {
    let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    package_source(&source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_produces_script() {
        let js = package_source("OUT = IN;").unwrap();
        assert!(js.starts_with("calculator.setExpressions(["));
        assert!(js.contains("\"id\":\"run\""));
    }

    #[test]
    fn test_pipeline_surfaces_parse_errors() {
        assert!(matches!(package_source("num x"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_pipeline_surfaces_compile_errors() {
        assert!(matches!(package_source("x = 1;"), Err(Error::Compile(_))));
    }

    #[test]
    fn test_package_file_reads_from_disk() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "num x;\nx = IN;\nOUT = x * 2;").unwrap();
        let js = package_file(file.path()).unwrap();
        assert!(js.contains("\"id\":\"run\""));
    }

    #[test]
    fn test_package_file_missing() {
        let err = package_file(Path::new("no/such/file.gr")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
