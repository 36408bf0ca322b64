//! Type checking and expression-type annotation.
//!
//! Runs after the resolver. Walks each function body with [`VisitMut`],
//! assigning a `type` to every expression node and enforcing the rules in
//! the specification. Function signatures and global variable types are
//! snapshotted up front into owned tables so each function can be checked
//! (and its AST mutated) without holding a borrow across the whole program.

mod error;

pub use error::TypeCheckError;

use dbasic_ast::visit::VisitMut;
use dbasic_ast::{Assign, Binary, Call, If, LocalDef, Program, Return, Type, Unary, Var, While};
use indexmap::IndexMap;

/// Type-checks `program` in place, or returns the first violation.
/// Assumes the resolver has already run: every `Var`/`Assign` name is
/// assumed declared, so failing that lookup here is a resolver bug, not a
/// user-facing error (see [`TypeChecker::lookup_var`]).
pub fn type_check(program: &mut Program) -> Result<(), TypeCheckError> {
    let sigs: IndexMap<String, FuncSig> = program
        .funcdefs
        .iter()
        .map(|f| {
            (
                f.name.clone(),
                FuncSig {
                    argtypes: f.argtypes.clone(),
                    returntype: f.returntype,
                },
            )
        })
        .collect();

    for g in &program.globaldefs {
        let found = g.value.ty();
        if found != Some(g.ty) {
            return Err(TypeCheckError::AssignTypeMismatch {
                line: g.line,
                name: g.name.clone(),
                expected: Some(g.ty),
                found,
            });
        }
    }

    for f in &mut program.funcdefs {
        let mut checker = TypeChecker {
            sigs: &sigs,
            globaltypes: &program.globalvartypes,
            localtypes: &f.localvartypes,
            current_return: f.returntype,
            error: None,
        };
        for stmt in &mut f.statements {
            checker.visit_stmt(stmt);
            if checker.error.is_some() {
                break;
            }
        }
        if let Some(err) = checker.error {
            return Err(err);
        }
    }

    tracing::info!(funcs = program.funcdefs.len(), "type checker: program checked");
    Ok(())
}

#[derive(Clone)]
struct FuncSig {
    argtypes: Vec<Type>,
    returntype: Option<Type>,
}

struct TypeChecker<'a> {
    sigs: &'a IndexMap<String, FuncSig>,
    globaltypes: &'a IndexMap<String, Type>,
    localtypes: &'a IndexMap<String, Type>,
    current_return: Option<Type>,
    error: Option<TypeCheckError>,
}

impl TypeChecker<'_> {
    fn fail(&mut self, err: TypeCheckError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    fn lookup_var(&self, name: &str) -> Option<Type> {
        self.localtypes
            .get(name)
            .or_else(|| self.globaltypes.get(name))
            .copied()
    }
}

impl VisitMut for TypeChecker<'_> {
    fn visit_var(&mut self, node: &mut Var) {
        if self.error.is_some() {
            return;
        }
        node.ty = self.lookup_var(&node.name);
    }

    fn visit_unary(&mut self, node: &mut Unary) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.val);
        if self.error.is_some() {
            return;
        }
        match node.val.ty() {
            Some(Type::Int) => node.ty = Some(Type::Int),
            _ => self.fail(TypeCheckError::NonIntOperand { line: node.line }),
        }
    }

    fn visit_binary(&mut self, node: &mut Binary) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.val1);
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.val2);
        if self.error.is_some() {
            return;
        }
        let (t1, t2) = (node.val1.ty(), node.val2.ty());
        // Corrected rule: compares val1 against val2. The original source
        // compares val1.type against itself, a self-comparison that can
        // never fail.
        if t1 != t2 {
            self.fail(TypeCheckError::OperandTypeMismatch { line: node.line });
            return;
        }
        let Some(t1) = t1 else {
            self.fail(TypeCheckError::VoidOperand { line: node.line });
            return;
        };
        if node.op.is_arithmetic() {
            if t1 != Type::Int {
                self.fail(TypeCheckError::NonIntOperand { line: node.line });
                return;
            }
            node.ty = Some(Type::Int);
        } else if node.op.is_comparison() {
            node.ty = Some(Type::Bool);
        } else {
            node.ty = Some(t1);
        }
    }

    fn visit_return(&mut self, node: &mut Return) {
        if self.error.is_some() {
            return;
        }
        let found = if let Some(expr) = &mut node.expression {
            self.visit_expr(expr);
            if self.error.is_some() {
                return;
            }
            expr.ty()
        } else {
            None
        };
        if found != self.current_return {
            self.fail(TypeCheckError::ReturnTypeMismatch {
                line: node.line,
                expected: self.current_return,
                found,
            });
        }
    }

    fn visit_if(&mut self, node: &mut If) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.exp);
        if self.error.is_some() {
            return;
        }
        if node.exp.ty() != Some(Type::Bool) {
            self.fail(TypeCheckError::NonBoolCondition {
                line: node.line,
                construct: "IF",
            });
            return;
        }
        for stmt in &mut node.statements {
            self.visit_stmt(stmt);
            if self.error.is_some() {
                return;
            }
        }
        if let Some(elses) = &mut node.elsestatements {
            for stmt in elses {
                self.visit_stmt(stmt);
                if self.error.is_some() {
                    return;
                }
            }
        }
    }

    fn visit_while(&mut self, node: &mut While) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.exp);
        if self.error.is_some() {
            return;
        }
        if node.exp.ty() != Some(Type::Bool) {
            self.fail(TypeCheckError::NonBoolCondition {
                line: node.line,
                construct: "WHILE",
            });
            return;
        }
        for stmt in &mut node.statements {
            self.visit_stmt(stmt);
            if self.error.is_some() {
                return;
            }
        }
    }

    fn visit_assign(&mut self, node: &mut Assign) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.value);
        if self.error.is_some() {
            return;
        }
        let declared = self.lookup_var(&node.name);
        let found = node.value.ty();
        if found != declared {
            self.fail(TypeCheckError::AssignTypeMismatch {
                line: node.line,
                name: node.name.clone(),
                expected: declared,
                found,
            });
        }
    }

    fn visit_local_def(&mut self, node: &mut LocalDef) {
        if self.error.is_some() {
            return;
        }
        self.visit_expr(&mut node.value);
        if self.error.is_some() {
            return;
        }
        let found = node.value.ty();
        if found != Some(node.ty) {
            self.fail(TypeCheckError::AssignTypeMismatch {
                line: node.line,
                name: node.name.clone(),
                expected: Some(node.ty),
                found,
            });
        }
    }

    fn visit_call(&mut self, node: &mut Call) {
        if self.error.is_some() {
            return;
        }
        match node.name.as_str() {
            "input" => {
                if !node.args.is_empty() {
                    self.fail(TypeCheckError::BuiltinArity {
                        line: node.line,
                        name: "input".to_string(),
                        expected: 0,
                        found: node.args.len(),
                    });
                    return;
                }
                node.ty = Some(Type::Int);
            }
            "print" => {
                if node.args.is_empty() {
                    self.fail(TypeCheckError::PrintMissingFormat { line: node.line });
                    return;
                }
                self.visit_expr(&mut node.args[0]);
                if self.error.is_some() {
                    return;
                }
                if node.args[0].ty() != Some(Type::ConstStr) {
                    self.fail(TypeCheckError::PrintFirstArgNotString { line: node.line });
                    return;
                }
                // Only the first argument is type-checked; the remaining
                // varargs are visited (so nested exprs get annotated) but
                // never validated, matching the original tool's behavior.
                for arg in node.args.iter_mut().skip(1) {
                    self.visit_expr(arg);
                    if self.error.is_some() {
                        return;
                    }
                }
                node.ty = None;
            }
            name => match self.sigs.get(name).cloned() {
                None => {
                    // No definition found: treat as an extern function, no
                    // type checking performed, only annotate nested exprs.
                    for arg in &mut node.args {
                        self.visit_expr(arg);
                        if self.error.is_some() {
                            return;
                        }
                    }
                    node.ty = None;
                }
                Some(sig) => {
                    for (i, arg) in node.args.iter_mut().enumerate() {
                        self.visit_expr(arg);
                        if self.error.is_some() {
                            return;
                        }
                        let expected = sig.argtypes.get(i).copied();
                        if expected != arg.ty() {
                            self.fail(TypeCheckError::ArgumentTypeMismatch {
                                line: node.line,
                                func: name.to_string(),
                                index: i,
                                expected,
                                found: arg.ty(),
                            });
                            return;
                        }
                    }
                    node.ty = sig.returntype;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_src(src: &str) -> Result<Program, TypeCheckError> {
        let mut program = dbasic_parser::parse(src).unwrap();
        dbasic_resolver::resolve(&mut program).unwrap();
        type_check(&mut program)?;
        Ok(program)
    }

    #[test]
    fn arithmetic_requires_int_operands() {
        let src = "FUNC main()\nRETURN TRUE+1\nEND\n";
        let err = check_src(src).unwrap_err();
        assert!(matches!(err, TypeCheckError::NonIntOperand { .. }));
    }

    #[test]
    fn comparison_yields_bool() {
        let src = "FUNC main() BOOL\nRETURN 1 < 2\nEND\n";
        let program = check_src(src).unwrap();
        let stmt = &program.funcdefs[0].statements[0];
        let dbasic_ast::Stmt::Return(r) = stmt else { panic!() };
        assert_eq!(r.expression.as_ref().unwrap().ty(), Some(Type::Bool));
    }

    #[test]
    fn if_condition_must_be_bool() {
        let src = "FUNC main()\nIF 1 THEN\nRETURN 0\nEND\nRETURN 0\nEND\n";
        let err = check_src(src).unwrap_err();
        assert!(matches!(err, TypeCheckError::NonBoolCondition { .. }));
    }

    #[test]
    fn return_type_mismatch_is_rejected() {
        let src = "FUNC main() BOOL\nRETURN 1\nEND\n";
        let err = check_src(src).unwrap_err();
        assert!(matches!(err, TypeCheckError::ReturnTypeMismatch { .. }));
    }

    #[test]
    fn argument_type_mismatch_against_known_callee_is_rejected() {
        let src = "FUNC f(INT a)\nRETURN\nEND\nFUNC main()\nf(TRUE)\nRETURN\nEND\n";
        let err = check_src(src).unwrap_err();
        assert!(matches!(err, TypeCheckError::ArgumentTypeMismatch { .. }));
    }

    #[test]
    fn unknown_callee_is_treated_as_extern_and_unchecked() {
        // puts() is not declared in this program, so no argument check runs;
        // the call result simply carries no type.
        let src = "FUNC main()\nputs(\"hi\")\nRETURN\nEND\n";
        let program = check_src(src).unwrap();
        let dbasic_ast::Stmt::Call(c) = &program.funcdefs[0].statements[0] else {
            panic!()
        };
        assert_eq!(c.ty, None);
    }

    #[test]
    fn print_only_checks_first_argument() {
        let src = "FUNC main()\nprint(\"hi\", TRUE, 1)\nRETURN 0\nEND\n";
        assert!(check_src(src).is_ok());
    }

    #[test]
    fn print_requires_string_first_argument() {
        let src = "FUNC main()\nprint(1)\nRETURN 0\nEND\n";
        let err = check_src(src).unwrap_err();
        assert!(matches!(err, TypeCheckError::PrintFirstArgNotString { .. }));
    }

    #[test]
    fn input_takes_no_arguments() {
        let src = "FUNC main()\nRETURN input()\nEND\n";
        let program = check_src(src).unwrap();
        let dbasic_ast::Stmt::Return(r) = &program.funcdefs[0].statements[0] else {
            panic!()
        };
        assert_eq!(r.expression.as_ref().unwrap().ty(), Some(Type::Int));
    }

    #[test]
    fn self_comparison_bug_is_corrected() {
        // Would always pass under the original's `val1.type != val1.type`
        // self-comparison; must fail here since BOOL and INT differ.
        let src = "FUNC main()\nRETURN TRUE+1\nEND\n";
        assert!(check_src(src).is_err());
    }
}
