//! x86-64 AT&T assembly emitter.
//!
//! Naive stack-spill codegen: every expression leaves its result in `%rax`,
//! binary operators push/pop around the right-hand evaluation instead of
//! tracking a register allocation. Builds the output as a `Vec<String>` of
//! lines joined at the end, the same shape [`dbasic_codegen_c`] uses.
//! Expects a program that has already been through the resolver and type
//! checker — stack-slot offsets come straight from `FuncDef::localvars`'
//! insertion order.

use dbasic_ast::{Binary, BinOp, Call, Expr, FuncDef, Program, Stmt, Unary};
use indexmap::IndexMap;

const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

/// Emits a complete assembly translation unit for `program`.
pub fn emit_asm(program: &Program) -> String {
    let mut emitter = Emitter::default();
    emitter.emit_program(program);
    tracing::info!(funcs = program.funcdefs.len(), "codegen-asm: emitted translation unit");
    emitter.lines.join("\n") + "\n"
}

/// Indents every line that is neither a label (ends with `:`) nor a
/// directive (starts with `.`) with four spaces. Purely cosmetic: GAS
/// ignores leading whitespace on instruction lines.
#[must_use]
pub fn prettify(asm: &str) -> String {
    asm.lines()
        .map(|line| {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed.ends_with(':') || trimmed.starts_with('.') {
                trimmed.to_string()
            } else {
                format!("    {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

#[derive(Default)]
struct Emitter {
    lines: Vec<String>,
    label_counter: u32,
    offsets: IndexMap<String, u32>,
}

impl Emitter {
    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn next_label(&mut self, prefix: &str) -> String {
        self.label_counter += 1;
        format!(".L{prefix}_{}", self.label_counter)
    }

    fn emit_program(&mut self, program: &Program) {
        self.push(".file \"test.c\"");
        self.push(".text");
        self.push(".globl main");
        self.push(".type main, @function");

        for f in &program.funcdefs {
            self.emit_funcdef(f, program);
        }

        self.emit_builtins();

        self.push(String::new());
        self.push(".data");
        self.push(String::new());
        for (literal, label) in &program.constants {
            self.push(format!("{label}:"));
            self.push(format!(".string \"{}\"", escape_asm_string(literal)));
            self.push(String::new());
        }
        for (name, value) in &program.globalvars {
            self.push(format!("{name}:"));
            self.push(format!(".quad {value}"));
            self.push(String::new());
        }
        self.push("inputbuf:".to_string());
        self.push(".skip 128".to_string());
        self.push(String::new());
    }

    fn emit_funcdef(&mut self, f: &FuncDef, program: &Program) {
        self.offsets = f
            .localvars
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), 8 * (i as u32 + 1)))
            .collect();
        let frame_size = 8 * f.localvars.len() as u32;

        self.push(format!("{}:", f.name));
        self.push("push %rbp");
        self.push("mov %rsp, %rbp");
        if frame_size > 0 {
            self.push(format!("sub ${frame_size}, %rsp"));
        }
        for (i, arg) in f.args.iter().enumerate() {
            let off = self.offsets[arg];
            self.push(format!("mov %{}, -{off}(%rbp)", ARG_REGS[i]));
        }

        for stmt in &f.statements {
            self.emit_stmt(stmt, program);
        }
        self.push(String::new());
    }

    fn emit_stmt(&mut self, stmt: &Stmt, program: &Program) {
        match stmt {
            Stmt::LocalDef(n) => {
                self.emit_expr(&n.value, program);
                let off = self.offsets[&n.name];
                self.push(format!("mov %rax, -{off}(%rbp)"));
            }
            Stmt::Assign(n) => {
                self.emit_expr(&n.value, program);
                self.store_var(&n.name);
            }
            Stmt::Call(n) => {
                self.emit_call(n, program);
            }
            Stmt::Return(n) => {
                if let Some(e) = &n.expression {
                    self.emit_expr(e, program);
                }
                self.push("leave");
                self.push("ret");
            }
            Stmt::If(n) => {
                let endif = self.next_label("endif");
                let endelse = self.next_label("endelse");
                self.emit_expr(&n.exp, program);
                self.push("test %rax,%rax");
                self.push(format!("jz {endif}"));
                for s in &n.statements {
                    self.emit_stmt(s, program);
                }
                if n.elsestatements.is_some() {
                    self.push(format!("jmp {endelse}"));
                }
                self.push(format!("{endif}:"));
                if let Some(elses) = &n.elsestatements {
                    for s in elses {
                        self.emit_stmt(s, program);
                    }
                    self.push(format!("{endelse}:"));
                }
            }
            Stmt::While(n) => {
                let start = self.next_label("whilestart");
                let end = self.next_label("whileend");
                self.push(format!("{start}:"));
                self.emit_expr(&n.exp, program);
                self.push("test %rax,%rax");
                self.push(format!("jz {end}"));
                for s in &n.statements {
                    self.emit_stmt(s, program);
                }
                self.push(format!("jmp {start}"));
                self.push(format!("{end}:"));
            }
        }
    }

    fn emit_expr(&mut self, expr: &Expr, program: &Program) {
        match expr {
            Expr::Const(c) => self.push(format!("mov ${}, %rax", c.value)),
            Expr::Var(v) => {
                if let Some(&off) = self.offsets.get(&v.name) {
                    self.push(format!("mov -{off}(%rbp), %rax"));
                } else {
                    self.push(format!("mov {}, %rax", v.name));
                }
            }
            Expr::Str(s) => {
                let label = &program.constants[&s.value];
                self.push(format!("mov ${label}, %rax"));
            }
            Expr::Binary(b) => self.emit_binary(b, program),
            Expr::Unary(u) => self.emit_unary(u, program),
            Expr::Call(c) => self.emit_call(c, program),
        }
    }

    fn emit_binary(&mut self, b: &Binary, program: &Program) {
        self.emit_expr(&b.val1, program);
        self.push("push %rax");
        self.emit_expr(&b.val2, program);
        self.push("pop %rcx");
        match b.op {
            BinOp::Add => self.push("add %rcx, %rax"),
            BinOp::Sub => {
                self.push("sub %rax, %rcx");
                self.push("mov %rcx, %rax");
            }
            BinOp::Or => self.push("or %rcx, %rax"),
            BinOp::And => self.push("and %rcx, %rax"),
            BinOp::Eq => self.emit_compare("sete"),
            BinOp::Ne => self.emit_compare("setne"),
            BinOp::Lt => self.emit_compare("setl"),
            BinOp::Gt => self.emit_compare("setg"),
            BinOp::Le => self.emit_compare("setle"),
            BinOp::Ge => self.emit_compare("setge"),
            BinOp::Mul => self.push("imul %rcx, %rax"),
            BinOp::Div => {
                self.push("mov %rax, %rbx");
                self.push("mov %rcx, %rax");
                self.push("cqto");
                self.push("idiv %rbx");
            }
        }
    }

    fn emit_compare(&mut self, set_insn: &str) {
        self.push("cmp %rax, %rcx");
        self.push("mov $0, %rax");
        self.push(format!("{set_insn} %al"));
    }

    fn emit_unary(&mut self, u: &Unary, program: &Program) {
        self.emit_expr(&u.val, program);
        self.push("neg %rax");
    }

    fn emit_call(&mut self, call: &Call, program: &Program) {
        for (i, arg) in call.args.iter().enumerate() {
            self.emit_expr(arg, program);
            let reg = ARG_REGS[i];
            self.push(format!("push %{reg}"));
            self.push(format!("mov %rax, %{reg}"));
        }
        self.push(format!("call {}", call.name));
        for i in (0..call.args.len()).rev() {
            self.push(format!("pop %{}", ARG_REGS[i]));
        }
    }

    fn store_var(&mut self, name: &str) {
        if let Some(&off) = self.offsets.get(name) {
            self.push(format!("mov %rax, -{off}(%rbp)"));
        } else {
            self.push(format!("mov %rax, {name}"));
        }
    }

    fn emit_builtins(&mut self) {
        self.push(String::new());
        self.push("input:".to_string());
        self.push("mov $0, %eax".to_string());
        self.push("mov $0, %rdi".to_string());
        self.push("mov $inputbuf, %rsi".to_string());
        self.push("mov $127, %rdx".to_string());
        self.push("syscall".to_string());
        self.push("mov $inputbuf, %rdi".to_string());
        self.push("call atoi".to_string());
        self.push("ret".to_string());
        self.push(String::new());
        self.push("print:".to_string());
        self.push("mov $0, %rax".to_string());
        self.push("call printf".to_string());
        self.push("movq stdout(%rip), %rdi".to_string());
        self.push("call fflush".to_string());
        self.push("ret".to_string());
    }
}

fn escape_asm_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
