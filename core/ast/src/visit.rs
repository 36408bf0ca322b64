//! The "default-recursing" tree-traversal abstraction.
//!
//! Implementors override only the node kinds they care about; every other
//! kind falls back to the matching `walk_*_mut` free function, which just
//! recurses into children in source order. This is the flavor the resolver
//! and type checker use, since each only annotates a handful of node kinds
//! and would otherwise have to repeat the same recursive plumbing.
//!
//! Code generators do not use this trait: they must cover every node kind
//! with no silent fallback, which an ordinary exhaustive `match` already
//! guarantees at compile time (see the crate-level docs).

use crate::nodes::{
    Assign, Binary, Call, Expr, FuncDef, GlobalDef, If, LocalDef, Program, Return, Stmt, Unary,
    Var, While,
};

pub trait VisitMut {
    fn visit_program(&mut self, node: &mut Program) {
        walk_program_mut(self, node);
    }

    fn visit_global_def(&mut self, node: &mut GlobalDef) {
        walk_global_def_mut(self, node);
    }

    fn visit_func_def(&mut self, node: &mut FuncDef) {
        walk_func_def_mut(self, node);
    }

    fn visit_stmt(&mut self, node: &mut Stmt) {
        walk_stmt_mut(self, node);
    }

    fn visit_local_def(&mut self, node: &mut LocalDef) {
        walk_local_def_mut(self, node);
    }

    fn visit_assign(&mut self, node: &mut Assign) {
        walk_assign_mut(self, node);
    }

    fn visit_if(&mut self, node: &mut If) {
        walk_if_mut(self, node);
    }

    fn visit_while(&mut self, node: &mut While) {
        walk_while_mut(self, node);
    }

    fn visit_return(&mut self, node: &mut Return) {
        walk_return_mut(self, node);
    }

    fn visit_call(&mut self, node: &mut Call) {
        walk_call_mut(self, node);
    }

    fn visit_expr(&mut self, node: &mut Expr) {
        walk_expr_mut(self, node);
    }

    fn visit_binary(&mut self, node: &mut Binary) {
        walk_binary_mut(self, node);
    }

    fn visit_unary(&mut self, node: &mut Unary) {
        walk_unary_mut(self, node);
    }

    fn visit_var(&mut self, _node: &mut Var) {}

    fn visit_const(&mut self, _node: &mut crate::nodes::Const) {}

    fn visit_str(&mut self, _node: &mut crate::nodes::Str) {}
}

pub fn walk_program_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Program) {
    for g in &mut node.globaldefs {
        v.visit_global_def(g);
    }
    for f in &mut node.funcdefs {
        v.visit_func_def(f);
    }
}

pub fn walk_global_def_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut GlobalDef) {
    v.visit_expr(&mut node.value);
}

pub fn walk_func_def_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut FuncDef) {
    for stmt in &mut node.statements {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Stmt) {
    match node {
        Stmt::LocalDef(n) => v.visit_local_def(n),
        Stmt::Assign(n) => v.visit_assign(n),
        Stmt::If(n) => v.visit_if(n),
        Stmt::While(n) => v.visit_while(n),
        Stmt::Return(n) => v.visit_return(n),
        Stmt::Call(n) => v.visit_call(n),
    }
}

pub fn walk_local_def_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut LocalDef) {
    v.visit_expr(&mut node.value);
}

pub fn walk_assign_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Assign) {
    v.visit_expr(&mut node.value);
}

pub fn walk_if_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut If) {
    v.visit_expr(&mut node.exp);
    for stmt in &mut node.statements {
        v.visit_stmt(stmt);
    }
    if let Some(elsestatements) = &mut node.elsestatements {
        for stmt in elsestatements {
            v.visit_stmt(stmt);
        }
    }
}

pub fn walk_while_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut While) {
    v.visit_expr(&mut node.exp);
    for stmt in &mut node.statements {
        v.visit_stmt(stmt);
    }
}

pub fn walk_return_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Return) {
    if let Some(expr) = &mut node.expression {
        v.visit_expr(expr);
    }
}

pub fn walk_call_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Call) {
    for arg in &mut node.args {
        v.visit_expr(arg);
    }
}

pub fn walk_expr_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Expr) {
    match node {
        Expr::Binary(n) => v.visit_binary(n),
        Expr::Unary(n) => v.visit_unary(n),
        Expr::Var(n) => v.visit_var(n),
        Expr::Const(n) => v.visit_const(n),
        Expr::Str(n) => v.visit_str(n),
        Expr::Call(n) => v.visit_call(n),
    }
}

pub fn walk_binary_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Binary) {
    v.visit_expr(&mut node.val1);
    v.visit_expr(&mut node.val2);
}

pub fn walk_unary_mut<V: VisitMut + ?Sized>(v: &mut V, node: &mut Unary) {
    v.visit_expr(&mut node.val);
}
