use std::fmt;

/// Type of a variable, parameter, or function return (as written in source).
///
/// A single concrete type `num` exists today; the table in
/// [`crate::registers::sizeof`] is where additional types would be sized.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ty(pub String);

impl Ty {
    pub fn num() -> Self {
        Self("num".to_string())
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name and type of a function parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Ty,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.ty, self.name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %
    Eq,  // ==
    Ne,  // !=
    Lt,  // <
    Gt,  // >
    Le,  // <=
    Ge,  // >=
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
        }
    }
}

/// Expressions: any node that can be evaluated.
///
/// Nodes are value-like: built once by the parser, compared structurally,
/// never mutated by the compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    /// A pre-formatted numeric token, embedded verbatim by the backend.
    Literal(String),
    /// A named reference; `$`-sigiled names denote host registers.
    Var(String),
    BinOp {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

/// Statements: any node that can be executed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
    Group(Vec<Stmt>),
    Declare {
        name: String,
        ty: Ty,
    },
    Assign {
        name: String,
        value: Expr,
    },
    If {
        cond: Expr,
        then_body: Box<Stmt>,
        /// `None` for a bare `if`; an `If` for an `else if` chain; a
        /// `Group` for a final `else` block.
        else_body: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    FnDef(FnDef),
    Return(Expr),
    /// A standalone call; the return value is discarded.
    CallStmt(Expr),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FnDef {
    pub name: String,
    pub return_ty: Ty,
    pub params: Vec<Param>,
    pub body: Box<Stmt>,
}

fn indent(s: &str) -> String {
    s.lines()
        .map(|line| format!("    {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(text) => write!(f, "{}", text),
            Expr::Var(name) => write!(f, "{}", name),
            Expr::BinOp { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.as_str(), rhs),
            Expr::Call { callee, args } => {
                let args = args
                    .iter()
                    .map(|a| a.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}({})", callee, args)
            }
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Group(stmts) => {
                let body = stmts
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                write!(f, "{}", body)
            }
            Stmt::Declare { name, ty } => write!(f, "{} {};", ty, name),
            Stmt::Assign { name, value } => write!(f, "{} = {};", name, value),
            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                write!(f, "if ({}) {{\n{}\n}}", cond, indent(&then_body.to_string()))?;
                match else_body.as_deref() {
                    // An `If` in else position reprints as an `else if` chain
                    Some(chained @ Stmt::If { .. }) => write!(f, " else {}", chained),
                    Some(block) => write!(f, " else {{\n{}\n}}", indent(&block.to_string())),
                    None => Ok(()),
                }
            }
            Stmt::While { cond, body } => {
                write!(f, "while ({}) {{\n{}\n}}", cond, indent(&body.to_string()))
            }
            Stmt::FnDef(def) => {
                let params = def
                    .params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "{} {}({}) {{\n{}\n}}",
                    def.return_ty,
                    def.name,
                    params,
                    indent(&def.body.to_string())
                )
            }
            Stmt::Return(expr) => write!(f, "return {};", expr),
            Stmt::CallStmt(call) => write!(f, "{};", call),
        }
    }
}
