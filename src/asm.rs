//! The line-oriented assembly text format.
//!
//! One directive per line; blank lines and leading whitespace are ignored.
//! `label` binds a name to the index of the next `line` to appear, so
//! labels never occupy line indices themselves.

use crate::error::AssembleError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Directive {
    /// `reg NAME`: declare a named host register.
    Reg(String),
    /// `expr LATEX`: a free-form definition, emitted verbatim.
    Expr(String),
    /// `line ACTIONS`: one instruction line of comma-separated assignments,
    /// with the mnemonics `NEXTLINE`, `GOTO label`, `LINE`, `IN`, `OUT`,
    /// and `DONE` left symbolic.
    Line(String),
    /// `label NAME`: bind NAME to the next line index.
    Label(String),
}

/// Split assembly text into directives.
pub fn parse_program(text: &str) -> Result<Vec<Directive>, AssembleError> {
    let mut directives = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let directive = match word {
            "reg" => Directive::Reg(rest.to_string()),
            "expr" => Directive::Expr(rest.to_string()),
            "line" => Directive::Line(rest.to_string()),
            "label" => Directive::Label(rest.to_string()),
            _ => return Err(AssembleError::UnknownDirective(line.to_string())),
        };
        directives.push(directive);
    }
    Ok(directives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let program = "\
            reg X_{0}\n\
            expr S_{tack}=[]\n\
            \n\
            line OUT \\to 1, NEXTLINE\n\
            label end\n";
        assert_eq!(
            parse_program(program).unwrap(),
            vec![
                Directive::Reg("X_{0}".to_string()),
                Directive::Expr("S_{tack}=[]".to_string()),
                Directive::Line("OUT \\to 1, NEXTLINE".to_string()),
                Directive::Label("end".to_string()),
            ]
        );
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        let program = "    line DONE \\to 0\n\t label halt\n";
        assert_eq!(
            parse_program(program).unwrap(),
            vec![
                Directive::Line("DONE \\to 0".to_string()),
                Directive::Label("halt".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_directive() {
        assert_eq!(
            parse_program("jump end\n"),
            Err(AssembleError::UnknownDirective("jump end".to_string()))
        );
    }
}
