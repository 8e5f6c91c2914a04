//! The packager: assembly text → a script for the host's embedding language.
//!
//! Labels resolve to line indices, the symbolic mnemonics become register
//! names, and the whole program folds into one `R_{un}` expression that
//! dispatches on the line pointer. The host evaluates the produced snippet
//! once to install every expression record.

use std::collections::HashMap;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::asm::{parse_program, Directive};
use crate::error::AssembleError;

pub const RUN: &str = "R_{un}";
pub const IN: &str = "I_{n}";
pub const OUT: &str = "O_{ut}";
pub const DONE: &str = "D_{one}";
pub const LINE: &str = "L_{ine}";

/// One `(id, latex)` expression record in the packaged script.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CalcExpr {
    pub id: String,
    pub latex: String,
}

impl CalcExpr {
    pub fn new(id: &str, latex: String) -> Self {
        Self {
            id: id.to_string(),
            latex,
        }
    }
}

/// The snippet that installs `exprs` when evaluated by the host.
pub fn generate_js(exprs: &[CalcExpr]) -> String {
    let json = serde_json::to_string(exprs).expect("expression records serialize to JSON");
    format!("calculator.setExpressions({})", json)
}

/// Package an assembly program into the final script.
pub fn assemble(program: &str) -> Result<String, AssembleError> {
    let directives = parse_program(program)?;

    // First pass: bind each label to the index of the next line.
    let mut labels: HashMap<String, usize> = HashMap::new();
    let mut line_count = 0usize;
    for directive in &directives {
        match directive {
            Directive::Line(_) => line_count += 1,
            Directive::Label(name) => {
                if labels.insert(name.clone(), line_count).is_some() {
                    return Err(AssembleError::DuplicateLabel(name.clone()));
                }
            }
            _ => {}
        }
    }

    // Second pass: collect registers and definitions, resolve each line.
    let mut regs = Vec::new();
    let mut defs = Vec::new();
    let mut lines = Vec::new();
    for directive in &directives {
        match directive {
            Directive::Reg(name) => regs.push(name.clone()),
            Directive::Expr(latex) => defs.push(latex.clone()),
            Directive::Line(actions) => lines.push(process_line(actions, &labels)?),
            Directive::Label(_) => {}
        }
    }

    let mut exprs = vec![
        CalcExpr::new("run", build_run_latex(&lines)),
        CalcExpr::new("in", format!("{}=0", IN)),
        CalcExpr::new("out", format!("{}=0", OUT)),
        CalcExpr::new("done", format!("{}=-1", DONE)),
        CalcExpr::new("line", format!("{}=0", LINE)),
    ];
    for (i, name) in regs.iter().enumerate() {
        exprs.push(CalcExpr::new(&format!("reg{}", i), format!("{}=0", name)));
    }
    for (i, latex) in defs.iter().enumerate() {
        exprs.push(CalcExpr::new(&format!("expr{}", i), latex.clone()));
    }

    Ok(generate_js(&exprs))
}

/// Substitute register mnemonics and resolve jumps in one line's actions.
fn process_line(actions: &str, labels: &HashMap<String, usize>) -> Result<String, AssembleError> {
    let mut line = actions.to_string();
    for (mnemonic, register) in [("DONE", DONE), ("OUT", OUT), ("IN", IN), ("LINE", LINE)] {
        let re = Regex::new(&format!(r"\b{}\b", mnemonic)).unwrap();
        line = re.replace_all(&line, register).into_owned();
    }

    let nextline = Regex::new(r"\bNEXTLINE\b").unwrap();
    line = nextline
        .replace_all(&line, format!("{} \\to {} + 1", LINE, LINE).as_str())
        .into_owned();

    let goto = Regex::new(r"\bGOTO (\w+)").unwrap();
    let mut unknown: Option<String> = None;
    let line = goto
        .replace_all(&line, |caps: &Captures| match labels.get(&caps[1]) {
            Some(index) => format!("{} \\to {}", LINE, index),
            None => {
                unknown = Some(caps[1].to_string());
                String::new()
            }
        })
        .into_owned();
    if let Some(name) = unknown {
        return Err(AssembleError::UnknownLabel(name));
    }
    Ok(line)
}

/// The dispatcher: for each line `i`, the guard `L_{ine}=i` selects that
/// line's action bundle.
fn build_run_latex(lines: &[String]) -> String {
    let arms = lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}={}:\\left({}\\right)", LINE, i, line))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} = \\left\\{{{}\\right\\}}", RUN, arms)
}
