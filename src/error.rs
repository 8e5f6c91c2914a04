use crate::diagnostic::Diagnostic;

/// A semantic error raised while lowering a well-formed syntax tree.
///
/// All variants are fatal to the compilation unit; no assembly is produced.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("variable '{0}' is already declared in this scope")]
    Redeclaration(String),

    #[error("'{0}' names a built-in register and cannot be declared")]
    ReservedName(String),

    #[error("variable '{0}' is not in scope")]
    NotInScope(String),

    #[error("variable '{0}' is read before it is assigned")]
    UseBeforeDefine(String),

    #[error("function '{name}' expects {expected} argument(s), found {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("function '{0}' is already defined")]
    DuplicateFunction(String),

    #[error("function '{0}' must be defined in the global scope")]
    NotTopLevel(String),

    #[error("return statement outside of a function body")]
    ReturnOutsideFunction,

    #[error("type '{0}' spans more than one cell, which the backend does not support yet")]
    UnsupportedSize(String),

    #[error("unknown type '{0}'")]
    UnknownType(String),
}

/// An error raised by the packager while turning assembly text into the
/// final script.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    #[error("unknown directive in line '{0}'")]
    UnknownDirective(String),

    #[error("GOTO references undefined label '{0}'")]
    UnknownLabel(String),

    #[error("label '{0}' is bound twice")]
    DuplicateLabel(String),
}

/// Any failure of the source → script pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("parse error")]
    Parse(Vec<Diagnostic>),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

impl From<Vec<Diagnostic>> for Error {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Error::Parse(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_error_messages_name_the_offender() {
        let e = CompileError::Redeclaration("x".to_string());
        assert_eq!(e.to_string(), "variable 'x' is already declared in this scope");

        let e = CompileError::ArityMismatch {
            name: "max".to_string(),
            expected: 2,
            found: 3,
        };
        assert_eq!(e.to_string(), "function 'max' expects 2 argument(s), found 3");
    }

    #[test]
    fn test_assemble_error_messages() {
        let e = AssembleError::UnknownLabel("endif3".to_string());
        assert_eq!(e.to_string(), "GOTO references undefined label 'endif3'");
    }
}
