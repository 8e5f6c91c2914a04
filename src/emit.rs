//! The lowerer: walks the syntax tree and emits the line-oriented assembly
//! consumed by the packager.
//!
//! Control flow becomes guarded jumps between symbolic labels; scopes become
//! stack pushes and truncations; calls become a frame push, a saved resume
//! line, and a jump. Every emitted line is one atomic multi-assignment on
//! the target, so each statement lowers to a sequence of lines that commit
//! one state transition apiece.

use indexmap::IndexMap;

use crate::ast::*;
use crate::error::CompileError;
use crate::registers::{self, FRAME_PTRS, RETURN_LINES, RETURN_VAL, STACK};
use crate::scope::{ScopeArena, ScopeId};

#[derive(Clone, Debug)]
struct FuncInfo {
    label: String,
    def: FnDef,
}

pub struct Emitter {
    output: Vec<String>,
    label_counter: u32,
    scopes: ScopeArena,
    /// Live scope chain, innermost last. Index 0 is the global scope.
    scope_stack: Vec<ScopeId>,
    /// Functions seen during the top-level walk, in definition order.
    functions: IndexMap<String, FuncInfo>,
    /// Index into `scope_stack` of the current function's root scope.
    /// `None` while lowering the main program.
    function_root: Option<usize>,
}

impl Emitter {
    pub fn new() -> Self {
        let mut scopes = ScopeArena::new();
        let global = scopes.alloc(None, "1".to_string());
        Self {
            output: Vec::new(),
            label_counter: 0,
            scopes,
            scope_stack: vec![global],
            functions: IndexMap::new(),
            function_root: None,
        }
    }

    /// Lower a whole program. Deterministic; user-visible side effects keep
    /// their source order.
    pub fn emit_program(mut self, root: &Stmt) -> Result<String, CompileError> {
        self.emit_preamble()?;
        self.emit_stmt(root)?;
        self.emit_epilogue()?;
        // Function bodies go after the halting line so that an uncalled
        // function can never be reached by the advancing line pointer.
        self.emit_functions()?;
        Ok(self.output.join("\n") + "\n")
    }

    fn current(&self) -> ScopeId {
        *self.scope_stack.last().unwrap()
    }

    fn global(&self) -> ScopeId {
        self.scope_stack[0]
    }

    fn push(&mut self, line: String) {
        self.output.push(line);
    }

    fn fresh_label(&mut self) -> u32 {
        let n = self.label_counter;
        self.label_counter += 1;
        n
    }

    /// Open a child of the current scope and make it innermost.
    fn push_child_scope(&mut self) -> ScopeId {
        let current = self.current();
        let base = self.scopes.child_base(current);
        let child = self.scopes.alloc(Some(current), base);
        self.scope_stack.push(child);
        child
    }

    /// Close the innermost scope, emitting its stack truncation.
    fn pop_scope(&mut self) {
        let id = self.scope_stack.pop().unwrap();
        let line = self.scopes.pop(id);
        self.push(line);
    }

    // --- Program shell ---

    fn emit_preamble(&mut self) -> Result<(), CompileError> {
        for def in registers::helper_definitions() {
            self.push(format!("expr {}", def));
        }
        for (reg, initial) in [
            (STACK, "[]"),
            (FRAME_PTRS, "[-1]"),
            (RETURN_VAL, "0"),
            (RETURN_LINES, "[]"),
        ] {
            self.push(format!("expr {}={}", reg, initial));
        }

        // `IN` and `OUT` are ordinary stack variables; `IN` starts from the
        // host input register, `OUT` is flushed by the epilogue.
        let global = self.global();
        let decl = self.scopes.declare(global, "IN", &Ty::num())?;
        self.push(decl);
        self.push(format!("line {} \\to IN, NEXTLINE", RETURN_VAL));
        let write = self.scopes.write(global, "IN", RETURN_VAL)?;
        self.push(write);
        let decl = self.scopes.declare(global, "OUT", &Ty::num())?;
        self.push(decl);
        Ok(())
    }

    fn emit_epilogue(&mut self) -> Result<(), CompileError> {
        // Unchecked read: a program that never writes OUT reports the
        // zero-initialized cell.
        let (out_expr, _) = self.scopes.read_unchecked(self.global(), "OUT")?;
        self.push(format!("line OUT \\to {}, DONE \\to 0", out_expr));
        Ok(())
    }

    // --- Statements ---

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Group(stmts) => {
                for s in stmts {
                    self.emit_stmt(s)?;
                }
                Ok(())
            }

            Stmt::Declare { name, ty } => {
                if registers::is_reserved_name(name) {
                    return Err(CompileError::ReservedName(name.clone()));
                }
                let current = self.current();
                let line = self.scopes.declare(current, name, ty)?;
                self.push(line);
                Ok(())
            }

            Stmt::Assign { name, value } => {
                self.eval_expr(value)?;
                if name.starts_with('$') {
                    let reg = registers::host_register(name)
                        .ok_or_else(|| CompileError::NotInScope(name.clone()))?;
                    self.push(format!("line {} \\to {}, NEXTLINE", reg, RETURN_VAL));
                } else {
                    let current = self.current();
                    let line = self.scopes.write(current, name, RETURN_VAL)?;
                    self.push(line);
                }
                Ok(())
            }

            Stmt::If {
                cond,
                then_body,
                else_body,
            } => {
                let n = self.fresh_label();
                self.eval_expr(cond)?;
                self.push(format!(
                    "line \\left\\{{{}=1: NEXTLINE, GOTO else{}\\right\\}}",
                    RETURN_VAL, n
                ));

                self.push_child_scope();
                self.emit_stmt(then_body)?;
                self.pop_scope();

                self.push(format!("line GOTO endif{}", n));
                self.push(format!("label else{}", n));
                if let Some(else_body) = else_body {
                    self.push_child_scope();
                    self.emit_stmt(else_body)?;
                    self.pop_scope();
                }
                self.push(format!("label endif{}", n));
                Ok(())
            }

            Stmt::While { cond, body } => {
                let n = self.fresh_label();
                self.push(format!("label begwhile{}", n));
                self.eval_expr(cond)?;
                self.push(format!(
                    "line \\left\\{{{}=1: NEXTLINE, GOTO endwhile{}\\right\\}}",
                    RETURN_VAL, n
                ));

                self.push_child_scope();
                self.emit_stmt(body)?;
                self.pop_scope();

                self.push(format!("line GOTO begwhile{}", n));
                self.push(format!("label endwhile{}", n));
                Ok(())
            }

            Stmt::FnDef(def) => {
                if self.scope_stack.len() > 1 || self.function_root.is_some() {
                    return Err(CompileError::NotTopLevel(def.name.clone()));
                }
                if registers::is_reserved_name(&def.name) {
                    return Err(CompileError::ReservedName(def.name.clone()));
                }
                if self.functions.contains_key(&def.name) {
                    return Err(CompileError::DuplicateFunction(def.name.clone()));
                }
                let label = format!("func{}", self.fresh_label());
                self.functions.insert(
                    def.name.clone(),
                    FuncInfo {
                        label,
                        def: def.clone(),
                    },
                );
                // No assembly here; bodies are emitted after the epilogue.
                Ok(())
            }

            Stmt::Return(expr) => {
                let root = self
                    .function_root
                    .ok_or(CompileError::ReturnOutsideFunction)?;
                self.eval_expr(expr)?;

                // Pop every scope opened since function entry, innermost
                // first. The scopes stay live for the lowerer: a return in
                // a branch must not end the block's logical lifetime.
                for idx in (root..self.scope_stack.len()).rev() {
                    let line = self.scopes.pop(self.scope_stack[idx]);
                    self.push(line);
                }

                self.push(format!(
                    "line {}\\to {}, NEXTLINE",
                    FRAME_PTRS,
                    registers::drop_last(FRAME_PTRS)
                ));
                self.push(format!(
                    "line LINE\\to {}, {}\\to {}",
                    registers::last(RETURN_LINES),
                    RETURN_LINES,
                    registers::drop_last(RETURN_LINES)
                ));
                Ok(())
            }

            Stmt::CallStmt(call) => {
                // Evaluate for side effects; the return value is discarded.
                self.eval_expr(call)
            }
        }
    }

    // --- Expressions ---

    /// Evaluate an expression, leaving its value in the return register.
    fn eval_expr(&mut self, expr: &Expr) -> Result<(), CompileError> {
        match expr {
            Expr::Literal(text) => {
                self.push(format!("line {} \\to {}, NEXTLINE", RETURN_VAL, text));
                Ok(())
            }

            Expr::Var(name) => {
                if name.starts_with('$') {
                    let reg = registers::host_register(name)
                        .ok_or_else(|| CompileError::NotInScope(name.clone()))?;
                    self.push(format!("line {} \\to {}, NEXTLINE", RETURN_VAL, reg));
                } else {
                    let (cell, _) = self.scopes.read(self.current(), name)?;
                    self.push(format!("line {} \\to {}, NEXTLINE", RETURN_VAL, cell));
                }
                Ok(())
            }

            Expr::BinOp { op, lhs, rhs } => {
                // Evaluate both operands into a temporary scope so that
                // nested calls and operations compose left-to-right.
                let arg_scope = self.push_child_scope();
                self.eval_into_temp(arg_scope, "#arg1", lhs)?;
                self.eval_into_temp(arg_scope, "#arg2", rhs)?;

                let (lhs_cell, _) = self.scopes.read(arg_scope, "#arg1")?;
                let (rhs_cell, _) = self.scopes.read(arg_scope, "#arg2")?;
                let result = binary_op_expr(&lhs_cell, &rhs_cell, *op);
                self.push(format!("line {} \\to {}, NEXTLINE", RETURN_VAL, result));

                self.pop_scope();
                Ok(())
            }

            Expr::Call { callee, args } => {
                let func = self
                    .functions
                    .get(callee)
                    .ok_or_else(|| CompileError::NotInScope(callee.clone()))?;
                let label = func.label.clone();
                let params = func.def.params.clone();
                if args.len() != params.len() {
                    return Err(CompileError::ArityMismatch {
                        name: callee.clone(),
                        expected: params.len(),
                        found: args.len(),
                    });
                }

                // Arguments become the top stack cells, in declared order.
                let arg_scope = self.push_child_scope();
                for (index, (arg, param)) in args.iter().zip(&params).enumerate() {
                    let temp = format!("#arg{}", index);
                    let decl = self.scopes.declare(arg_scope, &temp, &param.ty)?;
                    self.push(decl);
                    self.eval_expr(arg)?;
                    let write = self.scopes.write(arg_scope, &temp, RETURN_VAL)?;
                    self.push(write);
                }

                // Push the frame, save the resume line, and jump. The
                // callee pops the argument cells on return, so the scope
                // handle is dropped here without a truncation of its own.
                let frame_base = self.scopes.base(arg_scope).to_string();
                self.push(format!(
                    "line {}\\to {}, NEXTLINE",
                    FRAME_PTRS,
                    registers::join2(FRAME_PTRS, &frame_base)
                ));
                self.push(format!(
                    "line {}\\to {}, GOTO {}",
                    RETURN_LINES,
                    registers::join2(RETURN_LINES, "LINE + 1"),
                    label
                ));
                self.scope_stack.pop();
                Ok(())
            }
        }
    }

    /// Declare `temp` in `scope` and assign `expr` to it.
    fn eval_into_temp(
        &mut self,
        scope: ScopeId,
        temp: &str,
        expr: &Expr,
    ) -> Result<(), CompileError> {
        let decl = self.scopes.declare(scope, temp, &Ty::num())?;
        self.push(decl);
        self.eval_expr(expr)?;
        let write = self.scopes.write(scope, temp, RETURN_VAL)?;
        self.push(write);
        Ok(())
    }

    // --- Function bodies ---

    fn emit_functions(&mut self) -> Result<(), CompileError> {
        let entries: Vec<FuncInfo> = self.functions.values().cloned().collect();
        for info in entries {
            self.push(format!("label {}", info.label));

            // Parameters resolve relative to the caller-pushed frame base;
            // lookup past the function root sees only globals.
            let global = self.global();
            let frame = self
                .scopes
                .alloc(Some(global), registers::current_frame_base());
            self.scope_stack.push(frame);
            self.function_root = Some(self.scope_stack.len() - 1);

            for param in &info.def.params {
                if registers::is_reserved_name(&param.name) {
                    return Err(CompileError::ReservedName(param.name.clone()));
                }
                self.scopes.declare_param(frame, &param.name, &param.ty)?;
            }

            self.emit_stmt(&info.def.body)?;
            // A body may fall off its end; the synthesized return keeps the
            // return-address list in sync.
            self.emit_stmt(&Stmt::Return(Expr::Literal("0".to_string())))?;

            self.scope_stack.pop();
            self.function_root = None;
        }
        Ok(())
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

/// The expression a binary operation evaluates to, over two operand cells.
///
/// Comparisons become a two-arm piecewise yielding 1 or 0: the target has
/// no boolean type, and the default arm keeps every case covered.
fn binary_op_expr(lhs: &str, rhs: &str, op: BinOp) -> String {
    match op {
        BinOp::Div => format!("\\left(\\frac{{{}}}{{{}}}\\right)", lhs, rhs),
        BinOp::Mod => format!("\\operatorname{{mod}}({}, {})", lhs, rhs),
        BinOp::Add | BinOp::Sub | BinOp::Mul => {
            let op_str = match op {
                BinOp::Add => "+",
                BinOp::Sub => "-",
                _ => "\\cdot",
            };
            format!("\\left({} {} {}\\right)", lhs, op_str, rhs)
        }
        // The target piecewise syntax has no "not equal" comparison, so
        // `!=` renders as equality with the arms swapped.
        BinOp::Ne => format!("\\left\\{{{}={}:0,1\\right\\}}", lhs, rhs),
        BinOp::Eq | BinOp::Lt | BinOp::Gt | BinOp::Le | BinOp::Ge => {
            let op_str = match op {
                BinOp::Eq => "=",
                BinOp::Lt => "<",
                BinOp::Gt => ">",
                BinOp::Le => "\\le",
                BinOp::Ge => "\\ge",
                _ => unreachable!(),
            };
            format!("\\left\\{{{} {} {}:1,0\\right\\}}", lhs, op_str, rhs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn compile(source: &str) -> String {
        let (tokens, lex_diags) = Lexer::new(source).tokenize();
        assert!(lex_diags.is_empty(), "lex errors: {:?}", lex_diags);
        let tree = Parser::new(tokens).parse_program().unwrap();
        Emitter::new().emit_program(&tree).unwrap()
    }

    fn compile_err(source: &str) -> CompileError {
        let (tokens, _) = Lexer::new(source).tokenize();
        let tree = Parser::new(tokens).parse_program().unwrap();
        Emitter::new()
            .emit_program(&tree)
            .expect_err("expected compile failure")
    }

    #[test]
    fn test_preamble_and_epilogue() {
        let asm = compile("");
        assert!(asm.contains("expr S_{tack}=[]"));
        assert!(asm.contains("expr S_{tackPtrs}=[-1]"));
        assert!(asm.contains("expr R_{eturnVal}=0"));
        assert!(asm.contains("expr R_{eturnLines}=[]"));
        // IN is seeded from the host register before anything else runs
        assert!(asm.contains("line R_{eturnVal} \\to IN, NEXTLINE"));
        // the last line flushes OUT and halts atomically
        let last = asm.lines().last().unwrap();
        assert!(last.starts_with("line OUT \\to "), "got: {}", last);
        assert!(last.ends_with("DONE \\to 0"), "got: {}", last);
    }

    #[test]
    fn test_helper_definitions_emitted_once() {
        let asm = compile("");
        assert_eq!(asm.matches("expr R_{eplaceLast}").count(), 1);
        assert_eq!(asm.matches("expr E_{xtendZero}").count(), 1);
        assert_eq!(asm.matches("expr D_{ropLast}").count(), 1);
    }

    #[test]
    fn test_declaration_and_assignment() {
        let asm = compile("num x;\nx = 5;");
        assert!(asm.contains("E_{xtendZero}\\left(S_{tack},1\\right)"));
        assert!(asm.contains("line R_{eturnVal} \\to 5, NEXTLINE"));
        // x is the top stack cell, so the write collapses to replace-last
        assert!(asm.contains("R_{eplaceLast}\\left(S_{tack},R_{eturnVal}\\right)"));
    }

    #[test]
    fn test_variable_read_is_single_cell() {
        let asm = compile("num x;\nx = 1;\nOUT = x;");
        assert!(asm.contains("line R_{eturnVal} \\to S_{tack}\\left[1 + 2\\right], NEXTLINE"));
    }

    #[test]
    fn test_binary_operation_uses_temp_scope() {
        let asm = compile("OUT = 1 + 2;");
        // two temp declarations, then the parenthesized sum of their cells
        assert_eq!(
            asm.matches("E_{xtendZero}\\left(S_{tack},1\\right)").count(),
            4, // IN, OUT, #arg1, #arg2
        );
        assert!(asm.contains(
            "line R_{eturnVal} \\to \\left(S_{tack}\\left[1 + 2 + 0\\right] + S_{tack}\\left[1 + 2 + 1\\right]\\right), NEXTLINE"
        ));
    }

    #[test]
    fn test_operator_rendering() {
        assert_eq!(binary_op_expr("a", "b", BinOp::Div), "\\left(\\frac{a}{b}\\right)");
        assert_eq!(binary_op_expr("a", "b", BinOp::Mod), "\\operatorname{mod}(a, b)");
        assert_eq!(binary_op_expr("a", "b", BinOp::Mul), "\\left(a \\cdot b\\right)");
        assert_eq!(binary_op_expr("a", "b", BinOp::Sub), "\\left(a - b\\right)");
        assert_eq!(binary_op_expr("a", "b", BinOp::Eq), "\\left\\{a = b:1,0\\right\\}");
        assert_eq!(binary_op_expr("a", "b", BinOp::Ne), "\\left\\{a=b:0,1\\right\\}");
        assert_eq!(binary_op_expr("a", "b", BinOp::Ge), "\\left\\{a \\ge b:1,0\\right\\}");
    }

    #[test]
    fn test_if_else_labels_and_pops() {
        let asm = compile("if (IN < 2){ num t; t = 1; } else { OUT = 2; }");
        assert!(asm.contains("line \\left\\{R_{eturnVal}=1: NEXTLINE, GOTO else0\\right\\}"));
        assert!(asm.contains("line GOTO endif0"));
        assert!(asm.contains("label else0"));
        assert!(asm.contains("label endif0"));
        // three truncations at the same base: the condition's temp scope,
        // the then-scope, and the else-scope
        assert_eq!(asm.matches("line S_{tack} \\to \\left\\{1 + 2=1:").count(), 3);
    }

    #[test]
    fn test_while_loops_back() {
        let asm = compile("while (IN < 32){ IN = IN * 2; }");
        assert!(asm.contains("label begwhile0"));
        assert!(asm.contains("line \\left\\{R_{eturnVal}=1: NEXTLINE, GOTO endwhile0\\right\\}"));
        assert!(asm.contains("line GOTO begwhile0"));
        assert!(asm.contains("label endwhile0"));
    }

    #[test]
    fn test_function_bodies_follow_halt() {
        let asm = compile("num id(num a){ return a; }\nOUT = id(IN);");
        let halt_at = asm.find("DONE \\to 0").unwrap();
        let func_at = asm.find("label func0").unwrap();
        assert!(func_at > halt_at, "function bodies must come after the halt line");
    }

    #[test]
    fn test_call_pushes_frame_and_saves_resume_line() {
        let asm = compile("num id(num a){ return a; }\nOUT = id(IN);");
        assert!(asm.contains(
            "line S_{tackPtrs}\\to \\operatorname{join}\\left(S_{tackPtrs},1 + 2\\right), NEXTLINE"
        ));
        assert!(asm.contains(
            "line R_{eturnLines}\\to \\operatorname{join}\\left(R_{eturnLines},LINE + 1\\right), GOTO func0"
        ));
    }

    #[test]
    fn test_return_restores_frame_and_resumes() {
        let asm = compile("num id(num a){ return a; }\nOUT = id(IN);");
        assert!(asm.contains("line S_{tackPtrs}\\to D_{ropLast}\\left(S_{tackPtrs}\\right), NEXTLINE"));
        assert!(asm.contains(
            "line LINE\\to R_{eturnLines}\\left[\\operatorname{length}\\left(R_{eturnLines}\\right)\\right], R_{eturnLines}\\to D_{ropLast}\\left(R_{eturnLines}\\right)"
        ));
    }

    #[test]
    fn test_parameters_read_from_frame_base() {
        let asm = compile("num id(num a){ return a; }\nOUT = id(IN);");
        assert!(asm.contains(
            "line R_{eturnVal} \\to S_{tack}\\left[S_{tackPtrs}\\left[\\operatorname{length}\\left(S_{tackPtrs}\\right)\\right] + 0\\right], NEXTLINE"
        ));
    }

    #[test]
    fn test_implicit_return_synthesized() {
        // the body never returns; the emitted tail must still restore the
        // caller's frame and resume line
        let asm = compile("num noop(num a){ a = 1; }\nnoop(IN);");
        let func_at = asm.find("label func0").unwrap();
        let tail = &asm[func_at..];
        assert!(tail.contains("line R_{eturnVal} \\to 0, NEXTLINE"));
        assert!(tail.contains("D_{ropLast}\\left(R_{eturnLines}\\right)"));
    }

    #[test]
    fn test_early_return_pops_intervening_scopes() {
        let asm = compile(
            "num f(num a){ if (a > 0){ num t; t = a; return t; } return 0; }\nOUT = f(IN);",
        );
        let func_at = asm.find("label func0").unwrap();
        let tail = &asm[func_at..];
        // the early return truncates both the if-scope and the frame scope
        let frame_base = "S_{tackPtrs}\\left[\\operatorname{length}\\left(S_{tackPtrs}\\right)\\right]";
        let if_scope_pop = format!("line S_{{tack}} \\to \\left\\{{{} + 1=1:", frame_base);
        let frame_pop = format!("line S_{{tack}} \\to \\left\\{{{}=1:", frame_base);
        assert!(tail.contains(&if_scope_pop), "missing if-scope pop");
        assert!(tail.contains(&frame_pop), "missing frame pop");
    }

    #[test]
    fn test_zero_argument_call() {
        let asm = compile("num one(){ return 1; }\nOUT = one();");
        assert!(asm.contains("GOTO func0"));
        assert!(asm.contains("label func0"));
    }

    #[test]
    fn test_mutual_recursion_resolves() {
        let asm = compile(
            "num even(num n){ if (n == 0){ return 1; } return odd(n - 1); }\n\
             num odd(num n){ if (n == 0){ return 0; } return even(n - 1); }\n\
             OUT = even(IN);",
        );
        assert!(asm.contains("GOTO func0"));
        assert!(asm.contains("GOTO func1"));
    }

    #[test]
    fn test_host_register_assignment() {
        let asm = compile("$DONE = 0;");
        assert!(asm.contains("line DONE \\to R_{eturnVal}, NEXTLINE"));
    }

    #[test]
    fn test_host_register_read() {
        let asm = compile("num x;\nx = $IN;");
        assert!(asm.contains("line R_{eturnVal} \\to IN, NEXTLINE"));
    }

    #[test]
    fn test_error_redeclaration() {
        assert_eq!(
            compile_err("num x;\nnum x;"),
            CompileError::Redeclaration("x".to_string())
        );
    }

    #[test]
    fn test_error_reserved_name() {
        assert_eq!(
            compile_err("num IN;"),
            CompileError::ReservedName("IN".to_string())
        );
        assert_eq!(
            compile_err("num f(num OUT){ return 0; }\nOUT = f(1);"),
            CompileError::ReservedName("OUT".to_string())
        );
    }

    #[test]
    fn test_error_not_in_scope() {
        assert_eq!(
            compile_err("x = 1;"),
            CompileError::NotInScope("x".to_string())
        );
        assert_eq!(
            compile_err("OUT = missing(1);"),
            CompileError::NotInScope("missing".to_string())
        );
    }

    #[test]
    fn test_error_locals_invisible_across_functions() {
        // function bodies see globals only, not other frames' locals
        assert_eq!(
            compile_err("num f(num a){ return b; }\nnum g(num b){ return f(b); }\nOUT = g(1);"),
            CompileError::NotInScope("b".to_string())
        );
    }

    #[test]
    fn test_error_use_before_define() {
        assert_eq!(
            compile_err("num x;\nOUT = x;"),
            CompileError::UseBeforeDefine("x".to_string())
        );
    }

    #[test]
    fn test_error_arity_mismatch() {
        assert_eq!(
            compile_err("num max(num x, num y){ return x; }\nOUT = max(1, 2, 3);"),
            CompileError::ArityMismatch {
                name: "max".to_string(),
                expected: 2,
                found: 3,
            }
        );
    }

    #[test]
    fn test_error_duplicate_function() {
        assert_eq!(
            compile_err("num f(num a){ return a; }\nnum f(num b){ return b; }"),
            CompileError::DuplicateFunction("f".to_string())
        );
    }

    #[test]
    fn test_error_function_not_top_level() {
        assert_eq!(
            compile_err("if (IN > 0){ num f(num a){ return a; } }"),
            CompileError::NotTopLevel("f".to_string())
        );
    }

    #[test]
    fn test_error_return_outside_function() {
        assert_eq!(compile_err("return 1;"), CompileError::ReturnOutsideFunction);
    }

    #[test]
    fn test_error_unknown_type() {
        assert_eq!(
            compile_err("matrix m;"),
            CompileError::UnknownType("matrix".to_string())
        );
    }

    #[test]
    fn test_error_call_before_definition_at_top_level() {
        assert_eq!(
            compile_err("OUT = f(1);\nnum f(num a){ return a; }"),
            CompileError::NotInScope("f".to_string())
        );
    }

    #[test]
    fn test_no_output_on_error() {
        // the failing compile consumed the emitter, so only the Err remains
        let result = {
            let (tokens, _) = Lexer::new("return 1;").tokenize();
            let tree = Parser::new(tokens).parse_program().unwrap();
            Emitter::new().emit_program(&tree)
        };
        assert!(result.is_err());
    }
}
