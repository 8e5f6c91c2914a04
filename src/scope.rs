//! Scope and frame registry for the simulated stack.
//!
//! Scopes form a strict tree held in an arena and addressed by handle; the
//! lowerer keeps the live chain as a stack of handles. Every address is a
//! *textual* arithmetic expression because a function's frame base is only
//! known at run time (it is the top of the frame-pointer list), so the same
//! code paths serve global scopes (base `1`) and call frames.

use std::collections::HashMap;

use crate::ast::Ty;
use crate::error::CompileError;
use crate::registers::{self, STACK};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Clone, Debug)]
struct VarInfo {
    offset: u32,
    ty: Ty,
    /// Set once any lexically earlier assignment has been lowered.
    assigned: bool,
}

#[derive(Clone, Debug)]
struct Scope {
    parent: Option<ScopeId>,
    /// Symbolic expression naming the stack index where this scope starts.
    base: String,
    vars: HashMap<String, VarInfo>,
    total_offset: u32,
}

pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn alloc(&mut self, parent: Option<ScopeId>, base: String) -> ScopeId {
        self.scopes.push(Scope {
            parent,
            base,
            vars: HashMap::new(),
            total_offset: 0,
        });
        ScopeId(self.scopes.len() - 1)
    }

    pub fn base(&self, id: ScopeId) -> &str {
        &self.scopes[id.0].base
    }

    /// Where a child of `id` would start: `base + total_offset`, as text.
    pub fn child_base(&self, id: ScopeId) -> String {
        let scope = &self.scopes[id.0];
        format!("{} + {}", scope.base, scope.total_offset)
    }

    /// Declare a variable and return the line that extends the stack by
    /// `sizeof(ty)` zeroed cells.
    pub fn declare(&mut self, id: ScopeId, name: &str, ty: &Ty) -> Result<String, CompileError> {
        let cells = self.add_var(id, name, ty, false)?;
        Ok(format!(
            "line {}\\to {}, NEXTLINE",
            STACK,
            registers::extend_zero(STACK, cells)
        ))
    }

    /// Declare a function parameter: same bookkeeping as [`declare`], but no
    /// assembly; the caller already pushed the cells, in declared order.
    pub fn declare_param(&mut self, id: ScopeId, name: &str, ty: &Ty) -> Result<(), CompileError> {
        self.add_var(id, name, ty, true)?;
        Ok(())
    }

    fn add_var(
        &mut self,
        id: ScopeId,
        name: &str,
        ty: &Ty,
        assigned: bool,
    ) -> Result<u32, CompileError> {
        let cells = registers::sizeof(ty).ok_or_else(|| CompileError::UnknownType(ty.0.clone()))?;
        let scope = &mut self.scopes[id.0];
        if scope.vars.contains_key(name) {
            return Err(CompileError::Redeclaration(name.to_string()));
        }
        scope.vars.insert(
            name.to_string(),
            VarInfo {
                offset: scope.total_offset,
                ty: ty.clone(),
                assigned,
            },
        );
        scope.total_offset += cells;
        Ok(cells)
    }

    /// A single-cell read expression for `name`, walking the parent chain.
    pub fn read(&self, from: ScopeId, name: &str) -> Result<(String, Ty), CompileError> {
        let (owner, info) = self
            .lookup(from, name)
            .ok_or_else(|| CompileError::NotInScope(name.to_string()))?;
        if !info.assigned {
            return Err(CompileError::UseBeforeDefine(name.to_string()));
        }
        self.cell_expr(owner, name)
    }

    /// Like [`read`], without the definite-assignment check. Used by the
    /// epilogue, which flushes `OUT` whether or not the program wrote it
    /// (cells are zero-initialized, so the value is well-defined).
    pub fn read_unchecked(&self, from: ScopeId, name: &str) -> Result<(String, Ty), CompileError> {
        let (owner, _) = self
            .lookup(from, name)
            .ok_or_else(|| CompileError::NotInScope(name.to_string()))?;
        self.cell_expr(owner, name)
    }

    fn cell_expr(&self, owner: ScopeId, name: &str) -> Result<(String, Ty), CompileError> {
        let scope = &self.scopes[owner.0];
        let info = &scope.vars[name];
        let cells = registers::sizeof(&info.ty).unwrap_or(0);
        if cells != 1 {
            return Err(CompileError::UnsupportedSize(info.ty.0.clone()));
        }
        let expr = format!("{}\\left[{} + {}\\right]", STACK, scope.base, info.offset);
        Ok((expr, info.ty.clone()))
    }

    /// The line replacing `name`'s cell with `rhs`, and the assignment mark.
    ///
    /// The general shape is a splice-by-join with guarded head and tail so
    /// that an empty prefix or suffix never produces an out-of-range slice.
    /// When the target is the last-declared cell of the scope the write is
    /// emitted from, the splice collapses to the replace-last helper: at
    /// statement level every expression temporary has already been popped,
    /// so nothing can sit above that cell.
    pub fn write(
        &mut self,
        from: ScopeId,
        name: &str,
        rhs: &str,
    ) -> Result<String, CompileError> {
        let (owner, info) = self
            .lookup(from, name)
            .ok_or_else(|| CompileError::NotInScope(name.to_string()))?;
        let offset = info.offset;
        let cells = registers::sizeof(&info.ty).unwrap_or(0);
        if cells != 1 {
            return Err(CompileError::UnsupportedSize(info.ty.0.clone()));
        }

        let scope = &self.scopes[owner.0];
        let is_top_cell = owner == from && offset + cells == scope.total_offset;
        let new_stack = if is_top_cell {
            registers::replace_last(STACK, rhs)
        } else {
            let start = format!("{} + {}", scope.base, offset);
            let end = format!("{} + {} + {}", scope.base, offset, cells - 1);
            splice_expr(&start, &end, rhs)
        };

        self.scopes[owner.0].vars.get_mut(name).unwrap().assigned = true;
        Ok(format!("line {} \\to {}, NEXTLINE", STACK, new_stack))
    }

    /// The line truncating the stack back to just below this scope's base.
    pub fn pop(&self, id: ScopeId) -> String {
        let base = &self.scopes[id.0].base;
        format!(
            "line {} \\to \\left\\{{{}=1:\\left[\\right],{}\\left[1...{}-1\\right]\\right\\}}, NEXTLINE",
            STACK, base, STACK, base
        )
    }

    fn lookup(&self, from: ScopeId, name: &str) -> Option<(ScopeId, VarInfo)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.0];
            if let Some(info) = scope.vars.get(name) {
                return Some((id, info.clone()));
            }
            current = scope.parent;
        }
        None
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace `stack[start..=end]` with `rhs` by joining the guarded head,
/// the new value, and the guarded tail.
fn splice_expr(start: &str, end: &str, rhs: &str) -> String {
    format!(
        "\\operatorname{{join}}\\left(\\left\\{{{start}=1:\\left[\\right],{stack}\\left[1...{start}-1\\right]\\right\\}},{rhs},\\left\\{{{end}=\\operatorname{{length}}\\left({stack}\\right):\\left[\\right],{stack}\\left[{end}+1...\\right]\\right\\}}\\right)",
        start = start,
        end = end,
        rhs = rhs,
        stack = STACK,
    )
}
