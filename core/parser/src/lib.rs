//! Recursive-descent parser for dbasic source text.
//!
//! Every `parse_*` production either consumes a prefix of the token stream
//! and returns a node, or fails outright once committed — there is no
//! backtracking. Statement and factor position need two tokens of lookahead
//! (`ID =` vs. `ID (`) which [`dbasic_lexer::Lexer::peek`] supports directly.

mod error;

pub use error::ParseError;

use dbasic_ast::{
    Assign, BinOp, Binary, Call, Const, Expr, FuncDef, GlobalDef, If, LocalDef, Program, Return,
    Stmt, Str, Type, Unary, Var, While,
};
use dbasic_lexer::{Lexer, Token, TokenKind};
use indexmap::IndexMap;

/// Parses a complete program from source text.
pub fn parse(source: &str) -> Result<Program, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_program()
}

struct Parser {
    lexer: Lexer,
    last_line: u32,
}

impl Parser {
    fn new(source: &str) -> Result<Self, ParseError> {
        Ok(Parser {
            lexer: Lexer::new(source)?,
            last_line: 1,
        })
    }

    fn peek_kind(&self, k: usize) -> Option<TokenKind> {
        self.lexer.peek(k).map(|t| t.kind)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.lexer.next();
        if let Some(t) = &tok {
            self.last_line = t.line;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token, ParseError> {
        match self.bump() {
            Some(t) if t.kind == kind => Ok(t),
            Some(t) => Err(ParseError::Unexpected {
                line: t.line,
                expected: what.to_string(),
                found: format!("{:?}", t.kind),
            }),
            None => Err(ParseError::UnexpectedEof {
                line: self.last_line,
                expected: what.to_string(),
            }),
        }
    }

    fn unexpected(&self, tok: Option<Token>, expected: &str) -> ParseError {
        match tok {
            Some(t) => ParseError::Unexpected {
                line: t.line,
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
            },
            None => ParseError::UnexpectedEof {
                line: self.last_line,
                expected: expected.to_string(),
            },
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::default();
        loop {
            // A blank source line collapses to a single NL token (the lexer
            // coalesces runs of newlines), which the top-level grammar never
            // expects between definitions — skip it rather than erroring.
            while self.peek_kind(0) == Some(TokenKind::Nl) {
                self.bump();
            }
            match self.peek_kind(0) {
                None => break,
                Some(TokenKind::Func) => program.funcdefs.push(self.parse_funcdef()?),
                Some(TokenKind::Global) => program.globaldefs.push(self.parse_globaldef()?),
                _ => {
                    let tok = self.lexer.peek(0).cloned();
                    return Err(self.unexpected(tok, "FUNC or GLOBAL"));
                }
            }
        }
        tracing::info!(
            functions = program.funcdefs.len(),
            globals = program.globaldefs.len(),
            "parser: program complete"
        );
        Ok(program)
    }

    fn parse_funcdef(&mut self) -> Result<FuncDef, ParseError> {
        let start = self.expect(TokenKind::Func, "FUNC")?;
        tracing::trace!(line = start.line, "parser: calling parse_funcdef");
        let name = self.expect(TokenKind::Id, "function name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let (args, argtypes) = self.parse_param_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        let returntype = self.parse_opt_type()?;
        self.expect(TokenKind::Nl, "newline")?;
        let statements = self.parse_block()?;
        self.expect(TokenKind::End, "END")?;
        self.expect(TokenKind::Nl, "newline")?;
        tracing::trace!(name = %name.value.as_deref().unwrap_or(""), "parser: parse_funcdef returned FuncDef");
        Ok(FuncDef {
            name: name.value.unwrap_or_default(),
            args,
            argtypes,
            statements,
            returntype,
            localvars: IndexMap::new(),
            localvartypes: IndexMap::new(),
            line: start.line,
        })
    }

    fn parse_param_list(&mut self) -> Result<(Vec<String>, Vec<Type>), ParseError> {
        let mut args = Vec::new();
        let mut argtypes = Vec::new();
        if self.peek_kind(0) != Some(TokenKind::Type) {
            return Ok((args, argtypes));
        }
        loop {
            argtypes.push(self.parse_type()?);
            let name = self.expect(TokenKind::Id, "parameter name")?;
            args.push(name.value.unwrap_or_default());
            if self.peek_kind(0) == Some(TokenKind::Comma) {
                self.bump();
                continue;
            }
            break;
        }
        Ok((args, argtypes))
    }

    fn parse_type(&mut self) -> Result<Type, ParseError> {
        let tok = self.expect(TokenKind::Type, "INT or BOOL")?;
        let keyword = tok.value.as_deref().unwrap_or("");
        Type::from_keyword(keyword).ok_or_else(|| ParseError::Unexpected {
            line: tok.line,
            expected: "INT or BOOL".to_string(),
            found: keyword.to_string(),
        })
    }

    fn parse_opt_type(&mut self) -> Result<Option<Type>, ParseError> {
        if self.peek_kind(0) == Some(TokenKind::Type) {
            Ok(Some(self.parse_type()?))
        } else {
            Ok(None)
        }
    }

    fn parse_globaldef(&mut self) -> Result<GlobalDef, ParseError> {
        let start = self.expect(TokenKind::Global, "GLOBAL")?;
        let (name, value, ty, _line) = self.parse_localdef_fields()?;
        self.expect(TokenKind::Nl, "newline")?;
        Ok(GlobalDef {
            name,
            value,
            ty,
            line: start.line,
        })
    }

    fn parse_localdef_fields(&mut self) -> Result<(String, Expr, Type, u32), ParseError> {
        let ty = self.parse_type()?;
        let name = self.expect(TokenKind::Id, "variable name")?;
        self.expect(TokenKind::Eq, "'='")?;
        let value = self.parse_expression()?;
        Ok((name.value.unwrap_or_default(), value, ty, name.line))
    }

    /// A block is a run of statements, terminated by whatever the caller is
    /// about to look for (`END` or `ELSE`). Like [`Self::parse_program`], it
    /// must tolerate a stray coalesced `NL` between statements.
    fn parse_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        loop {
            while self.peek_kind(0) == Some(TokenKind::Nl) {
                self.bump();
            }
            match self.peek_kind(0) {
                Some(TokenKind::End) | Some(TokenKind::Else) | None => break,
                _ => statements.push(self.parse_statement()?),
            }
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let stmt = match self.peek_kind(0) {
            Some(TokenKind::If) => Stmt::If(self.parse_if()?),
            Some(TokenKind::While) => Stmt::While(self.parse_while()?),
            Some(TokenKind::Return) => Stmt::Return(self.parse_return()?),
            Some(TokenKind::Type) => {
                let (name, value, ty, line) = self.parse_localdef_fields()?;
                Stmt::LocalDef(LocalDef {
                    name,
                    value,
                    ty,
                    line,
                })
            }
            Some(TokenKind::Id) => self.parse_assign_or_call()?,
            _ => {
                let tok = self.lexer.peek(0).cloned();
                return Err(self.unexpected(tok, "statement"));
            }
        };
        self.expect(TokenKind::Nl, "newline")?;
        Ok(stmt)
    }

    fn parse_assign_or_call(&mut self) -> Result<Stmt, ParseError> {
        match self.peek_kind(1) {
            Some(TokenKind::Eq) => {
                let name = self.expect(TokenKind::Id, "identifier")?;
                self.expect(TokenKind::Eq, "'='")?;
                let value = self.parse_expression()?;
                Ok(Stmt::Assign(Assign {
                    name: name.value.unwrap_or_default(),
                    value,
                    line: name.line,
                }))
            }
            Some(TokenKind::LParen) => Ok(Stmt::Call(self.parse_call()?)),
            _ => {
                let tok = self.lexer.peek(0).cloned();
                Err(self.unexpected(tok, "'=' or '(' after identifier"))
            }
        }
    }

    fn parse_call(&mut self) -> Result<Call, ParseError> {
        let name = self.expect(TokenKind::Id, "function name")?;
        tracing::trace!(name = %name.value.as_deref().unwrap_or(""), "parser: calling parse_call");
        self.expect(TokenKind::LParen, "'('")?;
        let args = if self.peek_kind(0) == Some(TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_exprlist()?
        };
        self.expect(TokenKind::RParen, "')'")?;
        Ok(Call {
            name: name.value.unwrap_or_default(),
            args,
            ty: None,
            line: name.line,
        })
    }

    fn parse_exprlist(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut exprs = vec![self.parse_expr_or_string()?];
        while self.peek_kind(0) == Some(TokenKind::Comma) {
            self.bump();
            exprs.push(self.parse_expr_or_string()?);
        }
        Ok(exprs)
    }

    fn parse_expr_or_string(&mut self) -> Result<Expr, ParseError> {
        if self.peek_kind(0) == Some(TokenKind::Str) {
            let tok = self.expect(TokenKind::Str, "string literal")?;
            Ok(Expr::Str(Str {
                value: tok.value.unwrap_or_default(),
                line: tok.line,
            }))
        } else {
            self.parse_expression()
        }
    }

    fn parse_if(&mut self) -> Result<If, ParseError> {
        let start = self.expect(TokenKind::If, "IF")?;
        tracing::trace!(line = start.line, "parser: calling parse_if");
        let exp = self.parse_expression()?;
        self.expect(TokenKind::Then, "THEN")?;
        self.expect(TokenKind::Nl, "newline")?;
        let statements = self.parse_block()?;
        let elsestatements = if self.peek_kind(0) == Some(TokenKind::Else) {
            self.bump();
            self.expect(TokenKind::Nl, "newline")?;
            Some(self.parse_block()?)
        } else {
            None
        };
        self.expect(TokenKind::End, "END")?;
        Ok(If {
            exp,
            statements,
            elsestatements,
            line: start.line,
        })
    }

    fn parse_while(&mut self) -> Result<While, ParseError> {
        let start = self.expect(TokenKind::While, "WHILE")?;
        tracing::trace!(line = start.line, "parser: calling parse_while");
        let exp = self.parse_expression()?;
        self.expect(TokenKind::Do, "DO")?;
        self.expect(TokenKind::Nl, "newline")?;
        let statements = self.parse_block()?;
        self.expect(TokenKind::End, "END")?;
        Ok(While {
            exp,
            statements,
            line: start.line,
        })
    }

    fn parse_return(&mut self) -> Result<Return, ParseError> {
        let start = self.expect(TokenKind::Return, "RETURN")?;
        let expression = if self.starts_expression() {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Return {
            expression,
            line: start.line,
        })
    }

    fn starts_expression(&self) -> bool {
        matches!(
            self.peek_kind(0),
            Some(TokenKind::Minus | TokenKind::LParen | TokenKind::Id | TokenKind::Const)
        )
    }

    /// Level 1 (lowest): `|`, `&`, left-associative, unbounded chain.
    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_logic()?;
        loop {
            let op = match self.peek_kind(0) {
                Some(TokenKind::Pipe) => BinOp::Or,
                Some(TokenKind::Amp) => BinOp::And,
                _ => break,
            };
            let line = self.bump().unwrap().line;
            let right = self.parse_logic()?;
            left = Expr::Binary(Box::new(Binary {
                op,
                val1: left,
                val2: right,
                ty: None,
                line,
            }));
        }
        Ok(left)
    }

    /// Level 2: a single, non-chaining comparison.
    fn parse_logic(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_sum()?;
        let op = match self.peek_kind(0) {
            Some(TokenKind::EqEq) => BinOp::Eq,
            Some(TokenKind::Ne) => BinOp::Ne,
            Some(TokenKind::Ge) => BinOp::Ge,
            Some(TokenKind::Le) => BinOp::Le,
            Some(TokenKind::Gt) => BinOp::Gt,
            Some(TokenKind::Lt) => BinOp::Lt,
            _ => return Ok(left),
        };
        let line = self.bump().unwrap().line;
        let right = self.parse_sum()?;
        Ok(Expr::Binary(Box::new(Binary {
            op,
            val1: left,
            val2: right,
            ty: None,
            line,
        })))
    }

    /// Level 3: `+`/`-`, plus a leading unary `-` on the first term.
    fn parse_sum(&mut self) -> Result<Expr, ParseError> {
        let mut left = if self.peek_kind(0) == Some(TokenKind::Minus) {
            let line = self.bump().unwrap().line;
            let val = self.parse_term()?;
            Expr::Unary(Box::new(Unary { val, ty: None, line }))
        } else {
            self.parse_term()?
        };
        loop {
            let op = match self.peek_kind(0) {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            let line = self.bump().unwrap().line;
            let right = self.parse_term()?;
            left = Expr::Binary(Box::new(Binary {
                op,
                val1: left,
                val2: right,
                ty: None,
                line,
            }));
        }
        Ok(left)
    }

    /// Level 4: `*`/`/`.
    fn parse_term(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        loop {
            let op = match self.peek_kind(0) {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            let line = self.bump().unwrap().line;
            let right = self.parse_factor()?;
            left = Expr::Binary(Box::new(Binary {
                op,
                val1: left,
                val2: right,
                ty: None,
                line,
            }));
        }
        Ok(left)
    }

    /// Level 5: calls, constants, parenthesized sub-expressions, and bare
    /// variable references. `ID (` needs one token of lookahead past the
    /// identifier to tell a call from a variable.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        match self.peek_kind(0) {
            Some(TokenKind::Id) if self.peek_kind(1) == Some(TokenKind::LParen) => {
                Ok(Expr::Call(Box::new(self.parse_call()?)))
            }
            Some(TokenKind::Id) => {
                let tok = self.expect(TokenKind::Id, "identifier")?;
                Ok(Expr::Var(Var {
                    name: tok.value.unwrap_or_default(),
                    ty: None,
                    line: tok.line,
                }))
            }
            Some(TokenKind::Const) => {
                let tok = self.expect(TokenKind::Const, "constant")?;
                Ok(const_from_token(tok))
            }
            Some(TokenKind::LParen) => {
                self.bump();
                let exp = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(exp)
            }
            _ => {
                let tok = self.lexer.peek(0).cloned();
                Err(self.unexpected(tok, "expression"))
            }
        }
    }
}

/// `TRUE`/`FALSE` fold to boolean constants here, with the corrected value
/// mapping (`FALSE` -> lexeme `"0"`, not the literal word).
fn const_from_token(tok: Token) -> Expr {
    let lexeme = tok.value.unwrap_or_default();
    let (value, ty) = match lexeme.as_str() {
        "TRUE" => ("1".to_string(), Type::Bool),
        "FALSE" => ("0".to_string(), Type::Bool),
        _ => (lexeme, Type::Int),
    };
    Expr::Const(Const {
        value,
        ty,
        line: tok.line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_expr_src(src: &str) -> Expr {
        let src = format!("FUNC main()\nRETURN {src}\nEND\n");
        let program = parse(&src).unwrap();
        match &program.funcdefs[0].statements[0] {
            Stmt::Return(r) => r.expression.clone().unwrap(),
            _ => panic!("expected return"),
        }
    }

    fn binop(expr: &Expr) -> BinOp {
        match expr {
            Expr::Binary(b) => b.op,
            _ => panic!("expected binary expr"),
        }
    }

    #[test]
    fn precedence_mul_binds_tighter_than_add() {
        let expr = parse_expr_src("1+2*3");
        let Expr::Binary(b) = &expr else { panic!() };
        assert_eq!(b.op, BinOp::Add);
        assert_eq!(binop(&b.val2), BinOp::Mul);
    }

    #[test]
    fn logical_or_binds_looser_than_comparison() {
        let expr = parse_expr_src("a < b & c == d");
        let Expr::Binary(b) = &expr else { panic!() };
        assert_eq!(b.op, BinOp::And);
        assert_eq!(binop(&b.val1), BinOp::Lt);
        assert_eq!(binop(&b.val2), BinOp::Eq);
    }

    #[test]
    fn comparison_does_not_chain() {
        // a < b < c must fail to parse: logic() only consumes one comparison,
        // leaving a second `<` where a statement terminator is expected.
        let src = "FUNC main()\nRETURN a < b < c\nEND\n";
        assert!(parse(src).is_err());
    }

    #[test]
    fn false_folds_to_corrected_zero() {
        let expr = parse_expr_src("FALSE");
        let Expr::Const(c) = expr else { panic!() };
        assert_eq!(c.value, "0");
        assert_eq!(c.ty, Type::Bool);
    }

    #[test]
    fn true_folds_to_one() {
        let expr = parse_expr_src("TRUE");
        let Expr::Const(c) = expr else { panic!() };
        assert_eq!(c.value, "1");
        assert_eq!(c.ty, Type::Bool);
    }

    #[test]
    fn call_vs_var_disambiguation() {
        let expr = parse_expr_src("f(1,2)");
        assert!(matches!(expr, Expr::Call(_)));
        let expr = parse_expr_src("x");
        assert!(matches!(expr, Expr::Var(_)));
    }

    #[test]
    fn blank_line_between_statements_is_tolerated() {
        let src = "FUNC main()\nINT x = 1\n\nRETURN x\nEND\n";
        let program = parse(src).unwrap();
        assert_eq!(program.funcdefs[0].statements.len(), 2);
    }

    #[test]
    fn full_function_with_params_and_if() {
        let src = "FUNC max(INT a, INT b) INT\nIF a > b THEN\nRETURN a\nELSE\nRETURN b\nEND\nEND\n";
        let program = parse(src).unwrap();
        let f = &program.funcdefs[0];
        assert_eq!(f.name, "max");
        assert_eq!(f.args, vec!["a", "b"]);
        assert_eq!(f.returntype, Some(Type::Int));
        assert_eq!(f.statements.len(), 1);
    }

    #[test]
    fn global_def_parses() {
        let src = "GLOBAL INT counter = 0\nFUNC main()\nRETURN\nEND\n";
        let program = parse(src).unwrap();
        assert_eq!(program.globaldefs.len(), 1);
        assert_eq!(program.globaldefs[0].name, "counter");
    }

    #[test]
    fn missing_newline_is_a_parse_error() {
        let src = "FUNC main()\nIF x THEN RETURN 0\nEND\nEND\n";
        assert!(parse(src).is_err());
    }
}
