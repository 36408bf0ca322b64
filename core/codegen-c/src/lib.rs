//! C source emitter.
//!
//! Builds the translation unit as a `Vec<String>` of lines, one push per
//! construct, joined at the end — the same shape the WAT emitter in this
//! codebase's lineage uses, which also makes the output trivially
//! diffable in snapshot-style tests. Expects a program that has already
//! been through the resolver and type checker.

use dbasic_ast::{Call, Expr, FuncDef, Program, Stmt};

/// Emits a complete, self-contained C translation unit for `program`.
pub fn emit_c(program: &Program) -> String {
    let mut lines = Vec::new();

    lines.push("#include <stdio.h>".to_string());
    lines.push("#include <string.h>".to_string());
    lines.push("#include <stdlib.h>".to_string());
    lines.push("#include <stdarg.h>".to_string());
    lines.push(String::new());
    lines.push("char inputbuffer[60];".to_string());
    lines.push(String::new());

    for (name, value) in &program.globalvars {
        lines.push(format!("int {name} = {value};"));
    }
    if !program.globalvars.is_empty() {
        lines.push(String::new());
    }

    lines.extend(emit_builtins());

    for f in &program.funcdefs {
        lines.extend(emit_funcdef(f));
    }

    tracing::info!(funcs = program.funcdefs.len(), "codegen-c: emitted translation unit");
    lines.join("\n") + "\n"
}

fn emit_builtins() -> Vec<String> {
    vec![
        "void print(const char *fmt, ...) {".to_string(),
        "    va_list args;".to_string(),
        "    va_start(args, fmt);".to_string(),
        "    vprintf(fmt, args);".to_string(),
        "    va_end(args);".to_string(),
        "    fflush(stdout);".to_string(),
        "}".to_string(),
        String::new(),
        "int input(void) {".to_string(),
        "    fgets(inputbuffer, sizeof(inputbuffer), stdin);".to_string(),
        "    size_t len = strlen(inputbuffer);".to_string(),
        "    if (len > 0 && inputbuffer[len - 1] == '\\n') {".to_string(),
        "        inputbuffer[len - 1] = '\\0';".to_string(),
        "    }".to_string(),
        "    return atoi(inputbuffer);".to_string(),
        "}".to_string(),
        String::new(),
    ]
}

fn emit_funcdef(f: &FuncDef) -> Vec<String> {
    let params = f
        .args
        .iter()
        .map(|a| format!("int {a}"))
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![format!("int {}({}) {{", f.name, params)];
    for stmt in &f.statements {
        lines.extend(emit_stmt(stmt));
    }
    lines.push("}".to_string());
    lines.push(String::new());
    lines
}

fn emit_stmt(stmt: &Stmt) -> Vec<String> {
    match stmt {
        Stmt::LocalDef(n) => vec![format!("int {} = {};", n.name, emit_expr(&n.value))],
        Stmt::Assign(n) => vec![format!("{} = {};", n.name, emit_expr(&n.value))],
        Stmt::Call(n) => vec![format!("{};", emit_call(n))],
        Stmt::Return(n) => vec![match &n.expression {
            Some(e) => format!("return {};", emit_expr(e)),
            None => "return 0;".to_string(),
        }],
        Stmt::If(n) => {
            let mut lines = vec![format!("if ({}) {{", emit_expr(&n.exp))];
            for s in &n.statements {
                lines.extend(emit_stmt(s));
            }
            lines.push("}".to_string());
            if let Some(elses) = &n.elsestatements {
                lines.push("else {".to_string());
                for s in elses {
                    lines.extend(emit_stmt(s));
                }
                lines.push("}".to_string());
            }
            lines
        }
        Stmt::While(n) => {
            let mut lines = vec![format!("while ({}) {{", emit_expr(&n.exp))];
            for s in &n.statements {
                lines.extend(emit_stmt(s));
            }
            lines.push("}".to_string());
            lines
        }
    }
}

fn emit_expr(expr: &Expr) -> String {
    match expr {
        Expr::Binary(b) => format!(
            "({} {} {})",
            emit_expr(&b.val1),
            b.op.symbol(),
            emit_expr(&b.val2)
        ),
        Expr::Unary(u) => format!("(-{})", emit_expr(&u.val)),
        Expr::Var(v) => v.name.clone(),
        Expr::Const(c) => c.value.clone(),
        Expr::Str(s) => format!("\"{}\"", escape_c_string(&s.value)),
        Expr::Call(c) => emit_call(c),
    }
}

fn emit_call(call: &Call) -> String {
    let args = call
        .args
        .iter()
        .map(emit_expr)
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", call.name, args)
}

fn escape_c_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(src: &str) -> String {
        let mut program = dbasic_parser::parse(src).unwrap();
        dbasic_resolver::resolve(&mut program).unwrap();
        dbasic_type_checker::type_check(&mut program).unwrap();
        emit_c(&program)
    }

    #[test]
    fn emits_standard_headers_and_builtins() {
        let out = compile("FUNC main()\nRETURN 0\nEND\n");
        assert!(out.contains("#include <stdio.h>"));
        assert!(out.contains("void print(const char *fmt, ...)"));
        assert!(out.contains("int input(void)"));
    }

    #[test]
    fn binary_expressions_are_parenthesized() {
        let out = compile("FUNC main()\nRETURN 1+2*3\nEND\n");
        assert!(out.contains("return (1 + (2 * 3));"));
    }

    #[test]
    fn global_variables_declared_at_top() {
        let out = compile("GLOBAL INT n = 5\nFUNC main()\nRETURN n\nEND\n");
        assert!(out.contains("int n = 5;"));
    }

    #[test]
    fn if_else_lowers_to_braces() {
        let out = compile("FUNC main()\nIF 1 < 2 THEN\nRETURN 1\nELSE\nRETURN 0\nEND\nRETURN 0\nEND\n");
        assert!(out.contains("if ((1 < 2)) {"));
        assert!(out.contains("else {"));
    }

    #[test]
    fn statement_call_gets_semicolon() {
        let out = compile("FUNC main()\nprint(\"hi\")\nRETURN 0\nEND\n");
        assert!(out.contains("print(\"hi\");"));
    }

    #[test]
    fn function_params_are_always_declared_int() {
        let out = compile("FUNC add(INT a, BOOL b) INT\nRETURN a\nEND\nFUNC main()\nRETURN add(1, TRUE)\nEND\n");
        assert!(out.contains("int add(int a, int b) {"));
    }
}
