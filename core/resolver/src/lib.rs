//! Variable/scope resolution and string-constant interning.
//!
//! Walks a freshly parsed [`Program`] with [`VisitMut`], building the
//! program's global table and each function's local table in place, and
//! rejects the scoping violations listed in the specification. The first
//! violation encountered wins; [`Resolver`] records it and every later visit
//! method becomes a no-op, since `VisitMut`'s methods return `()` and cannot
//! short-circuit the walk themselves.

mod error;

pub use error::ResolverError;

use dbasic_ast::visit::VisitMut;
use dbasic_ast::{Assign, Call, FuncDef, GlobalDef, LocalDef, Program, Stmt, Str, Var};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Resolves `program` in place: fills `globalvars`, `globalvartypes`,
/// `constants` on the program and `localvars`/`localvartypes` on every
/// function, or returns the first scoping error encountered.
pub fn resolve(program: &mut Program) -> Result<(), ResolverError> {
    let mut resolver = Resolver::default();
    resolver.visit_program(program);
    if let Some(err) = resolver.error.take() {
        return Err(err);
    }
    if !program.funcdefs.iter().any(|f| f.name == "main") {
        return Err(ResolverError::MissingMain);
    }
    program.globalvars = std::mem::take(&mut resolver.globalvars);
    program.globalvartypes = std::mem::take(&mut resolver.globalvartypes);
    program.constants = std::mem::take(&mut resolver.constants);
    tracing::info!(
        globals = program.globalvars.len(),
        constants = program.constants.len(),
        funcs = program.funcdefs.len(),
        "resolver: program resolved"
    );
    Ok(())
}

#[derive(Default)]
struct Resolver {
    globalvars: IndexMap<String, i64>,
    globalvartypes: IndexMap<String, dbasic_ast::Type>,
    localvars: IndexMap<String, i64>,
    localvartypes: IndexMap<String, dbasic_ast::Type>,
    constants: IndexMap<String, String>,
    const_counter: usize,
    seen_funcs: HashSet<String>,
    error: Option<ResolverError>,
}

impl Resolver {
    fn fail(&mut self, err: ResolverError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.localvars.contains_key(name) || self.globalvars.contains_key(name)
    }
}

impl VisitMut for Resolver {
    fn visit_global_def(&mut self, node: &mut GlobalDef) {
        if self.error.is_some() {
            return;
        }
        if self.globalvars.contains_key(&node.name) {
            self.fail(ResolverError::DuplicateGlobal {
                line: node.line,
                name: node.name.clone(),
            });
            return;
        }
        let dbasic_ast::Expr::Const(c) = &node.value else {
            self.fail(ResolverError::NonConstGlobalInitializer {
                line: node.line,
                name: node.name.clone(),
            });
            return;
        };
        let value: i64 = c.value.parse().unwrap_or(0);
        self.globalvars.insert(node.name.clone(), value);
        self.globalvartypes.insert(node.name.clone(), node.ty);
    }

    fn visit_func_def(&mut self, node: &mut FuncDef) {
        if self.error.is_some() {
            return;
        }
        if !self.seen_funcs.insert(node.name.clone()) {
            self.fail(ResolverError::DuplicateFunction {
                line: node.line,
                name: node.name.clone(),
            });
            return;
        }

        self.localvars = IndexMap::new();
        self.localvartypes = IndexMap::new();
        for (name, ty) in node.args.iter().zip(node.argtypes.iter()) {
            self.localvars.insert(name.clone(), 0);
            self.localvartypes.insert(name.clone(), *ty);
        }

        for stmt in &mut node.statements {
            self.visit_stmt(stmt);
            if self.error.is_some() {
                return;
            }
        }

        if !matches!(node.statements.last(), Some(Stmt::Return(_))) {
            self.fail(ResolverError::MissingReturn {
                line: node.line,
                name: node.name.clone(),
            });
            return;
        }

        node.localvars = std::mem::take(&mut self.localvars);
        node.localvartypes = std::mem::take(&mut self.localvartypes);
        tracing::debug!(func = %node.name, locals = node.localvars.len(), "resolver: function resolved");
    }

    fn visit_local_def(&mut self, node: &mut LocalDef) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.value);
        if self.error.is_some() {
            return;
        }
        // Matches the original tool's check: collisions are only ever
        // detected against globals, never against a local already declared
        // in this function, so redeclaring a local silently overwrites it.
        if self.globalvars.contains_key(&node.name) {
            self.fail(ResolverError::DuplicateLocal {
                line: node.line,
                name: node.name.clone(),
            });
            return;
        }
        self.localvars.insert(node.name.clone(), 0);
        self.localvartypes.insert(node.name.clone(), node.ty);
    }

    fn visit_assign(&mut self, node: &mut Assign) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.value);
        if self.error.is_some() {
            return;
        }
        if !self.is_declared(&node.name) {
            self.fail(ResolverError::UndeclaredVariable {
                line: node.line,
                name: node.name.clone(),
            });
        }
    }

    fn visit_var(&mut self, node: &mut Var) {
        if self.error.is_some() {
            return;
        }
        if !self.is_declared(&node.name) {
            self.fail(ResolverError::UndeclaredVariable {
                line: node.line,
                name: node.name.clone(),
            });
        }
    }

    fn visit_str(&mut self, node: &mut Str) {
        if self.error.is_some() {
            return;
        }
        if !self.constants.contains_key(&node.value) {
            let label = format!(".Lstr{}", self.const_counter);
            self.const_counter += 1;
            self.constants.insert(node.value.clone(), label);
        }
    }

    fn visit_call(&mut self, node: &mut Call) {
        if self.error.is_some() {
            return;
        }
        if node.args.len() > 6 {
            self.fail(ResolverError::TooManyArguments {
                line: node.line,
                count: node.args.len(),
            });
            return;
        }
        for arg in &mut node.args {
            self.visit_expr(arg);
            if self.error.is_some() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbasic_parser::parse;

    fn resolve_src(src: &str) -> Result<Program, ResolverError> {
        let mut program = parse(src).unwrap();
        resolve(&mut program)?;
        Ok(program)
    }

    #[test]
    fn undeclared_variable_is_rejected() {
        let err = resolve_src("FUNC main()\nRETURN x\nEND\n").unwrap_err();
        assert!(matches!(err, ResolverError::UndeclaredVariable { .. }));
    }

    #[test]
    fn duplicate_global_is_rejected() {
        let src = "GLOBAL INT x = 1\nGLOBAL INT x = 2\nFUNC main()\nRETURN\nEND\n";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, ResolverError::DuplicateGlobal { .. }));
    }

    #[test]
    fn duplicate_function_is_rejected() {
        let src = "FUNC f()\nRETURN\nEND\nFUNC f()\nRETURN\nEND\nFUNC main()\nRETURN\nEND\n";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, ResolverError::DuplicateFunction { .. }));
    }

    #[test]
    fn missing_main_is_rejected() {
        let err = resolve_src("FUNC f()\nRETURN\nEND\n").unwrap_err();
        assert!(matches!(err, ResolverError::MissingMain));
    }

    #[test]
    fn too_many_call_arguments_is_rejected() {
        let src = "FUNC main()\nRETURN f(1,2,3,4,5,6,7)\nEND\n";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, ResolverError::TooManyArguments { .. }));
    }

    #[test]
    fn missing_trailing_return_is_rejected() {
        let src = "FUNC main()\nINT x = 1\nEND\n";
        let err = resolve_src(src).unwrap_err();
        assert!(matches!(err, ResolverError::MissingReturn { .. }));
    }

    #[test]
    fn local_shadowing_global_is_rejected_but_not_another_local() {
        // Preserves the original tool's bug: a LocalDef only ever collides
        // with a global, never with an existing local in the same function.
        let clashes_with_global =
            "GLOBAL INT g = 1\nFUNC main()\nINT g = 2\nRETURN g\nEND\n";
        assert!(matches!(
            resolve_src(clashes_with_global).unwrap_err(),
            ResolverError::DuplicateLocal { .. }
        ));

        let redeclares_local = "FUNC main()\nINT x = 1\nINT x = 2\nRETURN x\nEND\n";
        assert!(resolve_src(redeclares_local).is_ok());
    }

    #[test]
    fn string_constants_are_interned_once_per_distinct_literal() {
        let src = "FUNC main()\nprint(\"hi\")\nprint(\"hi\")\nprint(\"bye\")\nRETURN 0\nEND\n";
        let program = resolve_src(src).unwrap();
        assert_eq!(program.constants.len(), 2);
    }

    #[test]
    fn well_formed_program_resolves() {
        let src = "GLOBAL INT total = 0\nFUNC add(INT a, INT b) INT\nRETURN a+b\nEND\nFUNC main()\nINT r = add(1,2)\nRETURN r\nEND\n";
        let program = resolve_src(src).unwrap();
        assert_eq!(program.globalvars.get("total"), Some(&0));
        assert_eq!(program.funcdefs[0].localvars.len(), 2);
    }
}
