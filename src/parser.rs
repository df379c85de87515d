//! Tokens → AST: recursive-descent, precedence-climbing parser with
//! panic-mode error recovery.

use crate::ast::{ClassStmt, Expr, FunctionStmt, NodeId, Stmt};
use crate::error::Diagnostic;
use crate::token::{Token, TokenKind};
use crate::value::Value;
use std::rc::Rc;

/// Marks that a parse rule failed and already recorded a diagnostic.
/// Propagated with `?`; callers that can recover (`declaration`) catch
/// it and synchronize.
struct ParseError;

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: Vec<Diagnostic>,
    next_id: NodeId,
}

type PResult<T> = Result<T, ParseError>;

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics: Vec::new(),
            next_id: 0,
        }
    }

    pub fn parse(mut self) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let mut stmts = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        (stmts, self.diagnostics)
    }

    fn next_id(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- token stream primitives ----

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        kinds.iter().any(|k| self.check(*k)) && {
            self.advance();
            true
        }
    }

    fn error_at_peek(&mut self, message: impl Into<String>) -> ParseError {
        let diag = Diagnostic::at_token(self.peek(), message);
        self.diagnostics.push(diag);
        ParseError
    }

    fn consume(&mut self, kind: TokenKind, message: impl Into<String>) -> PResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error_at_peek(message))
        }
    }

    /// Panic-mode recovery: discard tokens until the previous one was
    /// `;` or the next one begins a statement.
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// A terminator is a consumed `;`, an unconsumed `}`/EOF, or the
    /// next token starting on a later source line than the last
    /// consumed token (newline-aware automatic semicolon insertion).
    fn terminator(&mut self) -> PResult<()> {
        if self.match_kind(TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(TokenKind::RightBrace) || self.is_at_end() {
            return Ok(());
        }
        if self.peek().line != self.previous().line {
            return Ok(());
        }
        Err(self.error_at_peek("Expect terminator after statement."))
    }

    // ---- declarations ----

    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.match_kind(TokenKind::Class) {
            self.class_declaration()
        } else if self.match_kind(TokenKind::Fun) {
            self.function_declaration("function").map(Stmt::Function)
        } else if self.match_kind(TokenKind::Var) {
            self.var_declaration()
        } else {
            self.statement()
        };
        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> PResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name.")?;
        self.consume(TokenKind::LeftBrace, "Expect '{' before class body.")?;
        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function_declaration("method")?);
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after class body.")?;
        Ok(Stmt::Class(Rc::new(ClassStmt { name, methods })))
    }

    fn function_declaration(&mut self, kind: &str) -> PResult<Rc<FunctionStmt>> {
        let name = self.consume(TokenKind::Identifier, format!("Expect {kind} name."))?;
        self.consume(TokenKind::LeftParen, format!("Expect '(' after {kind} name."))?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.error_at_peek("Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;
        self.consume(TokenKind::LeftBrace, format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;
        Ok(Rc::new(FunctionStmt { name, params, body }))
    }

    fn var_declaration(&mut self) -> PResult<Stmt> {
        let stmt = self.var_declaration_body()?;
        self.terminator()?;
        Ok(stmt)
    }

    /// The `var` grammar rule without a trailing terminator check: used
    /// both by `var_declaration` (which checks the newline-aware
    /// terminator) and by a `for` initializer (which instead requires a
    /// literal `;`, see `for_statement`).
    fn var_declaration_body(&mut self) -> PResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.match_kind(TokenKind::Equal) {
            Some(self.expression()?)
        } else {
            None
        };
        Ok(Stmt::Var { name, initializer })
    }

    // ---- statements ----

    fn statement(&mut self) -> PResult<Stmt> {
        if self.match_kind(TokenKind::For) {
            self.for_statement()
        } else if self.match_kind(TokenKind::If) {
            self.if_statement()
        } else if self.match_kind(TokenKind::Return) {
            self.return_statement()
        } else if self.match_kind(TokenKind::While) {
            self.while_statement()
        } else if self.match_kind(TokenKind::LeftBrace) {
            Ok(Stmt::Block(self.block()?))
        } else {
            self.expression_statement()
        }
    }

    /// Desugars to `{ init; while (cond) { body; inc; } }`.
    fn for_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        // The init clause always requires a literal `;`, unlike an
        // ordinary `var`/expression statement: newline-aware terminator
        // insertion does not apply inside a `for` header.
        let initializer = if self.match_kind(TokenKind::Semicolon) {
            None
        } else if self.match_kind(TokenKind::Var) {
            let stmt = self.var_declaration_body()?;
            self.consume(TokenKind::Semicolon, "Expect ';' after initializer statement.")?;
            Some(stmt)
        } else {
            let expr = self.expression()?;
            self.consume(TokenKind::Semicolon, "Expect ';' after initializer statement.")?;
            Some(Stmt::Expression(expr))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(inc) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(inc)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(Value::Bool(true)));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(init) = initializer {
            body = Stmt::Block(vec![init, body]);
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_kind(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// Attempts to parse a value expression; on failure, rewinds to
    /// just past `return` and discards any diagnostics the failed
    /// attempt recorded, treating the statement as value-less.
    fn return_statement(&mut self) -> PResult<Stmt> {
        let keyword = self.previous();
        let rewind_point = self.current;
        let diag_mark = self.diagnostics.len();
        let value = match self.expression() {
            Ok(expr) => Some(expr),
            Err(ParseError) => {
                self.current = rewind_point;
                self.diagnostics.truncate(diag_mark);
                None
            }
        };
        self.terminator()?;
        Ok(Stmt::Return { keyword, value })
    }

    fn while_statement(&mut self) -> PResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    fn block(&mut self) -> PResult<Vec<Stmt>> {
        let mut stmts = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                stmts.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(stmts)
    }

    fn expression_statement(&mut self) -> PResult<Stmt> {
        let expr = self.expression()?;
        self.terminator()?;
        Ok(Stmt::Expression(expr))
    }

    // ---- expressions, lowest to highest precedence ----

    fn expression(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let expr = self.ternary()?;

        let compound_op = match self.peek().kind {
            TokenKind::Equal => Some(None),
            TokenKind::PlusEqual => Some(Some(TokenKind::Plus)),
            TokenKind::MinusEqual => Some(Some(TokenKind::Minus)),
            TokenKind::StarEqual => Some(Some(TokenKind::Star)),
            TokenKind::SlashEqual => Some(Some(TokenKind::Slash)),
            _ => None,
        };

        let Some(op_kind) = compound_op else {
            return Ok(expr);
        };
        let op_token = self.advance();
        let rhs = self.assignment()?;

        let value = match op_kind {
            None => rhs,
            Some(binary_kind) => Expr::Binary {
                left: Box::new(expr.clone()),
                operator: Token::new(binary_kind, op_token.lexeme.trim_end_matches('=').to_string(), op_token.line, op_token.col),
                right: Box::new(rhs),
            },
        };

        self.assignment_target(expr, op_token, value)
    }

    /// Rewrites a parsed left-hand expression into the matching target
    /// variant (`Assign`/`Set`/`Replace`), or reports an invalid target.
    fn assignment_target(&mut self, target: Expr, op_token: Token, value: Expr) -> PResult<Expr> {
        match target {
            Expr::Variable { name, .. } => Ok(Expr::Assign {
                id: self.next_id(),
                name,
                value: Box::new(value),
            }),
            Expr::Get { object, name } => Ok(Expr::Set {
                object,
                name,
                value: Box::new(value),
            }),
            Expr::Index {
                indexee,
                bracket,
                start,
                stop: None,
            } => Ok(Expr::Replace {
                indexee,
                bracket,
                index: start,
                value: Box::new(value),
            }),
            _ => {
                self.diagnostics
                    .push(Diagnostic::at_token(&op_token, "Invalid assignment target."));
                Err(ParseError)
            }
        }
    }

    fn ternary(&mut self) -> PResult<Expr> {
        let condition = self.or()?;
        if self.match_kind(TokenKind::Question) {
            let then_branch = self.ternary()?;
            self.consume(TokenKind::Colon, "Expect ':' in ternary expression.")?;
            let else_branch = self.ternary()?;
            return Ok(Expr::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            });
        }
        Ok(condition)
    }

    fn or(&mut self) -> PResult<Expr> {
        let mut expr = self.and()?;
        while self.check(TokenKind::Or) {
            let operator = self.advance();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn and(&mut self) -> PResult<Expr> {
        let mut expr = self.equality()?;
        while self.check(TokenKind::And) {
            let operator = self.advance();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> PResult<Expr> {
        let mut expr = self.comparison()?;
        while self.match_any(&[TokenKind::BangEqual, TokenKind::EqualEqual]) {
            let operator = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> PResult<Expr> {
        let mut expr = self.term()?;
        while self.match_any(&[
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::Less,
            TokenKind::LessEqual,
        ]) {
            let operator = self.previous();
            let right = self.term()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> PResult<Expr> {
        let mut expr = self.factor()?;
        while self.match_any(&[TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous();
            let right = self.factor()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> PResult<Expr> {
        let mut expr = self.unary()?;
        while self.match_any(&[TokenKind::Slash, TokenKind::Star]) {
            let operator = self.previous();
            let right = self.unary()?;
            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> PResult<Expr> {
        if self.match_any(&[TokenKind::Bang, TokenKind::Minus, TokenKind::Plus]) {
            let operator = self.previous();
            let operand = self.unary()?;
            return Ok(Expr::Unary {
                operator,
                operand: Box::new(operand),
            });
        }
        self.postfix()
    }

    /// `t++`/`t--` desugar like compound assignment: `t = (t + 1)`,
    /// evaluating to the new value.
    fn postfix(&mut self) -> PResult<Expr> {
        let expr = self.call()?;
        if self.match_any(&[TokenKind::PlusPlus, TokenKind::MinusMinus]) {
            let op_token = self.previous();
            let binary_kind = if op_token.kind == TokenKind::PlusPlus {
                TokenKind::Plus
            } else {
                TokenKind::Minus
            };
            let one = Expr::Literal(Value::Number(1.0));
            let value = Expr::Binary {
                left: Box::new(expr.clone()),
                operator: Token::new(binary_kind, &op_token.lexeme[0..1], op_token.line, op_token.col),
                right: Box::new(one),
            };
            return self.assignment_target(expr, op_token, value);
        }
        Ok(expr)
    }

    fn call(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.match_kind(TokenKind::LeftParen) {
                expr = self.finish_call(expr)?;
            } else if self.match_kind(TokenKind::Dot) {
                let name = self.consume(TokenKind::Identifier, "Expect property name after '.'.")?;
                expr = Expr::Get {
                    object: Box::new(expr),
                    name,
                };
            } else if self.match_kind(TokenKind::LeftBracket) {
                expr = self.finish_index(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> PResult<Expr> {
        let mut arguments = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.error_at_peek("Can't have more than 255 arguments.");
                }
                arguments.push(self.expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            arguments,
            paren,
        })
    }

    /// The `bracket` token recorded on the node is the *closing* `]`,
    /// matching the reference parser (which hands the token returned by
    /// its final `consume(RIGHT_BRACKET, ...)` to the node), not the
    /// opening one — runtime diagnostics for index/slice/replace
    /// expressions are anchored there.
    fn finish_index(&mut self, indexee: Expr) -> PResult<Expr> {
        if self.match_kind(TokenKind::Colon) {
            let stop = if self.check(TokenKind::RightBracket) {
                Expr::Literal(Value::Nil)
            } else {
                self.expression()?
            };
            let bracket = self.consume(TokenKind::RightBracket, "Expect ']' after index.")?;
            return Ok(Expr::Index {
                indexee: Box::new(indexee),
                bracket,
                start: Box::new(Expr::Literal(Value::Nil)),
                stop: Some(Box::new(stop)),
            });
        }

        let start = self.expression()?;
        if self.match_kind(TokenKind::Colon) {
            let stop = if self.check(TokenKind::RightBracket) {
                Expr::Literal(Value::Nil)
            } else {
                self.expression()?
            };
            let bracket = self.consume(TokenKind::RightBracket, "Expect ']' after index.")?;
            return Ok(Expr::Index {
                indexee: Box::new(indexee),
                bracket,
                start: Box::new(start),
                stop: Some(Box::new(stop)),
            });
        }

        let bracket = self.consume(TokenKind::RightBracket, "Expect ']' after index.")?;
        Ok(Expr::Index {
            indexee: Box::new(indexee),
            bracket,
            start: Box::new(start),
            stop: None,
        })
    }

    fn primary(&mut self) -> PResult<Expr> {
        if self.match_kind(TokenKind::False) {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.match_kind(TokenKind::True) {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.match_kind(TokenKind::Nil) {
            return Ok(Expr::Literal(Value::Nil));
        }
        if self.match_kind(TokenKind::Number) {
            let lexeme = self.previous().lexeme;
            let n: f64 = lexeme.parse().expect("lexer guarantees a well-formed number lexeme");
            return Ok(Expr::Literal(Value::Number(n)));
        }
        if self.match_kind(TokenKind::String) {
            let token = self.previous();
            let value = self.string_literal_value(&token);
            return Ok(Expr::Literal(value));
        }
        if self.match_kind(TokenKind::This) {
            return Ok(Expr::This {
                id: self.next_id(),
                keyword: self.previous(),
            });
        }
        if self.match_kind(TokenKind::Identifier) {
            return Ok(Expr::Variable {
                id: self.next_id(),
                name: self.previous(),
            });
        }
        if self.match_kind(TokenKind::LeftParen) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        if self.match_kind(TokenKind::LeftBracket) {
            let mut elements = Vec::new();
            if !self.check(TokenKind::RightBracket) {
                loop {
                    elements.push(self.expression()?);
                    if !self.match_kind(TokenKind::Comma) {
                        break;
                    }
                }
            }
            let bracket = self.consume(TokenKind::RightBracket, "Expect ']' after list elements.")?;
            return Ok(Expr::List { elements, bracket });
        }
        Err(self.error_at_peek("Expect expression."))
    }

    /// Processes `\n \t \" \\` escapes; any other escape is diagnosed
    /// but the escaped byte is kept verbatim so parsing can continue.
    fn string_literal_value(&mut self, token: &Token) -> Value {
        let raw = token.lexeme.as_bytes();
        let inner = if raw.len() >= 2 && raw[0] == b'"' {
            &raw[1..raw.len() - 1]
        } else {
            raw
        };
        let mut bytes = Vec::new();
        let mut i = 0;
        while i < inner.len() {
            if inner[i] == b'\\' && i + 1 < inner.len() {
                let escaped = inner[i + 1];
                match escaped {
                    b'n' => bytes.push(b'\n'),
                    b't' => bytes.push(b'\t'),
                    b'"' => bytes.push(b'"'),
                    b'\\' => bytes.push(b'\\'),
                    other => {
                        self.diagnostics.push(Diagnostic::at_token(
                            token,
                            format!("Contains invalid escape sequence '\\{}'.", other as char),
                        ));
                        bytes.push(other);
                    }
                }
                i += 2;
            } else {
                bytes.push(inner[i]);
                i += 1;
            }
        }
        Value::string(bytes)
    }
}

pub fn parse(tokens: Vec<Token>) -> (Vec<Stmt>, Vec<Diagnostic>) {
    Parser::new(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn parse_source(src: &str) -> (Vec<Stmt>, Vec<Diagnostic>) {
        let (tokens, lex_diags) = lexer::scan(src);
        assert!(lex_diags.is_empty(), "unexpected lex diagnostics: {lex_diags:?}");
        parse(tokens)
    }

    #[test]
    fn parses_var_and_expression_statement_with_newline_terminator() {
        let (stmts, diags) = parse_source("var x = 1\nprint(x);");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(stmts.len(), 2);
    }

    #[test]
    fn for_desugars_to_block_with_while() {
        let (stmts, diags) = parse_source("for (var i = 0; i < 3; i = i + 1) print(i);");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(stmts.len(), 1);
        match &stmts[0] {
            Stmt::Block(inner) => {
                assert_eq!(inner.len(), 2);
                assert!(matches!(inner[0], Stmt::Var { .. }));
                assert!(matches!(inner[1], Stmt::While { .. }));
            }
            other => panic!("expected Block, got {other:?}"),
        }
    }

    #[test]
    fn return_without_value_recovers_via_maximal_munch() {
        let (stmts, diags) = parse_source("fun f() { return; }");
        assert!(diags.is_empty(), "{diags:?}");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn compound_assignment_desugars_to_binary() {
        let (stmts, diags) = parse_source("x += 1;");
        assert!(diags.is_empty(), "{diags:?}");
        match &stmts[0] {
            Stmt::Expression(Expr::Assign { value, .. }) => {
                assert!(matches!(**value, Expr::Binary { .. }));
            }
            other => panic!("expected Assign(Binary), got {other:?}"),
        }
    }

    #[test]
    fn postfix_increment_desugars_like_compound_assignment() {
        let (stmts, diags) = parse_source("x++;");
        assert!(diags.is_empty(), "{diags:?}");
        assert!(matches!(&stmts[0], Stmt::Expression(Expr::Assign { .. })));
    }

    #[test]
    fn ternary_is_right_associative() {
        let (stmts, diags) = parse_source("a ? b : c ? d : e;");
        assert!(diags.is_empty(), "{diags:?}");
        match &stmts[0] {
            Stmt::Expression(Expr::Ternary { else_branch, .. }) => {
                assert!(matches!(**else_branch, Expr::Ternary { .. }));
            }
            other => panic!("expected nested Ternary, got {other:?}"),
        }
    }

    #[test]
    fn index_and_slice_forms_parse() {
        for src in ["a[1];", "a[1:2];", "a[:2];", "a[1:];", "a[:];"] {
            let (_, diags) = parse_source(src);
            assert!(diags.is_empty(), "{src}: {diags:?}");
        }
    }

    #[test]
    fn invalid_assignment_target_is_reported() {
        let (_, diags) = parse_source("1 = 2;");
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].message, "Invalid assignment target.");
    }

    #[test]
    fn missing_terminator_is_reported_and_recovers_at_next_statement() {
        let (stmts, diags) = parse_source("var x = 1 var y = 2;");
        assert_eq!(diags.len(), 1);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn super_and_let_are_reserved_and_ungrammared() {
        let (_, diags) = parse_source("super;");
        assert_eq!(diags.len(), 1);
        let (_, diags2) = parse_source("let;");
        assert_eq!(diags2.len(), 1);
    }
}
