//! Static scope analysis: binds every variable/`this` reference to an
//! exact enclosing-scope distance before the evaluator ever runs, and
//! enforces the handful of rules that are only checkable statically.

use crate::ast::{Expr, NodeId, Stmt};
use crate::error::Diagnostic;
use std::collections::HashMap;

#[derive(Clone, Copy, PartialEq)]
enum FunctionKind {
    None,
    Function,
    Initializer,
    Method,
}

pub struct Resolver {
    scopes: Vec<HashMap<String, bool>>,
    locals: HashMap<NodeId, usize>,
    diagnostics: Vec<Diagnostic>,
    current_function: FunctionKind,
    in_class: bool,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver {
            scopes: Vec::new(),
            locals: HashMap::new(),
            diagnostics: Vec::new(),
            current_function: FunctionKind::None,
            in_class: false,
        }
    }

    pub fn resolve(mut self, stmts: &[Stmt]) -> (HashMap<NodeId, usize>, Vec<Diagnostic>) {
        self.resolve_stmts(stmts);
        (self.locals, self.diagnostics)
    }

    fn resolve_stmts(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.resolve_stmt(stmt);
        }
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, line: usize, col: usize) {
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name) {
                self.diagnostics.push(Diagnostic::new(
                    line,
                    col,
                    format!(" at '{name}'"),
                    "Already a variable with this name in this scope.",
                ));
            }
            scope.insert(name.to_string(), false);
        }
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), true);
        }
    }

    fn resolve_local(&mut self, id: NodeId, name: &str) {
        for (depth, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(name) {
                self.locals.insert(id, depth);
                return;
            }
        }
        // not found in any scope: resolves to the global frame at eval time
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(stmts) => {
                self.begin_scope();
                self.resolve_stmts(stmts);
                self.end_scope();
            }
            Stmt::Class(class) => {
                self.declare(&class.name.lexeme, class.name.line, class.name.col);
                self.define(&class.name.lexeme);

                let was_in_class = self.in_class;
                self.in_class = true;
                self.begin_scope();
                self.scopes.last_mut().unwrap().insert("this".to_string(), true);

                for method in &class.methods {
                    let kind = if method.name.lexeme == "init" {
                        FunctionKind::Initializer
                    } else {
                        FunctionKind::Method
                    };
                    self.resolve_function(&method.params, &method.body, kind);
                }

                self.end_scope();
                self.in_class = was_in_class;
            }
            Stmt::Expression(expr) => self.resolve_expr(expr),
            Stmt::Function(function) => {
                self.declare(&function.name.lexeme, function.name.line, function.name.col);
                self.define(&function.name.lexeme);
                self.resolve_function(&function.params, &function.body, FunctionKind::Function);
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_stmt(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_stmt(else_branch);
                }
            }
            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionKind::None {
                    self.diagnostics.push(Diagnostic::at_token(
                        keyword,
                        "Can't return from top-level code.",
                    ));
                }
                if let Some(value) = value {
                    if self.current_function == FunctionKind::Initializer {
                        self.diagnostics.push(Diagnostic::at_token(
                            keyword,
                            "Can't return a value from an initializer.",
                        ));
                    }
                    self.resolve_expr(value);
                }
            }
            Stmt::Var { name, initializer } => {
                self.declare(&name.lexeme, name.line, name.col);
                if let Some(initializer) = initializer {
                    self.resolve_expr(initializer);
                }
                self.define(&name.lexeme);
            }
            Stmt::While { condition, body } => {
                self.resolve_expr(condition);
                self.resolve_stmt(body);
            }
        }
    }

    fn resolve_function(
        &mut self,
        params: &[crate::token::Token],
        body: &[Stmt],
        kind: FunctionKind,
    ) {
        let enclosing_function = self.current_function;
        self.current_function = kind;
        self.begin_scope();
        for param in params {
            self.declare(&param.lexeme, param.line, param.col);
            self.define(&param.lexeme);
        }
        self.resolve_stmts(body);
        self.end_scope();
        self.current_function = enclosing_function;
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Assign { id, name, value } => {
                self.resolve_expr(value);
                self.resolve_local(*id, &name.lexeme);
            }
            Expr::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Call { callee, arguments, .. } => {
                self.resolve_expr(callee);
                for arg in arguments {
                    self.resolve_expr(arg);
                }
            }
            Expr::Get { object, .. } => self.resolve_expr(object),
            Expr::Grouping(inner) => self.resolve_expr(inner),
            Expr::Index { indexee, start, stop, .. } => {
                self.resolve_expr(indexee);
                self.resolve_expr(start);
                if let Some(stop) = stop {
                    self.resolve_expr(stop);
                }
            }
            Expr::List { elements, .. } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            Expr::Literal(_) => {}
            Expr::Logical { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            Expr::Replace {
                indexee,
                index,
                value,
                ..
            } => {
                self.resolve_expr(indexee);
                self.resolve_expr(index);
                self.resolve_expr(value);
            }
            Expr::Set { object, value, .. } => {
                self.resolve_expr(object);
                self.resolve_expr(value);
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_branch);
                self.resolve_expr(else_branch);
            }
            Expr::This { id, keyword } => {
                if !self.in_class {
                    self.diagnostics
                        .push(Diagnostic::at_token(keyword, "Can't use 'this' outside of a class."));
                    return;
                }
                self.resolve_local(*id, "this");
            }
            Expr::Unary { operand, .. } => self.resolve_expr(operand),
            Expr::Variable { id, name } => {
                if let Some(scope) = self.scopes.last() {
                    if scope.get(&name.lexeme) == Some(&false) {
                        self.diagnostics.push(Diagnostic::at_token(
                            name,
                            "Can't read local variable in its own initializer.",
                        ));
                    }
                }
                self.resolve_local(*id, &name.lexeme);
            }
        }
    }
}

pub fn resolve(stmts: &[Stmt]) -> (HashMap<NodeId, usize>, Vec<Diagnostic>) {
    Resolver::new().resolve(stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer, parser};

    fn resolve_source(src: &str) -> (HashMap<NodeId, usize>, Vec<Diagnostic>) {
        let (tokens, _) = lexer::scan(src);
        let (stmts, parse_diags) = parser::parse(tokens);
        assert!(parse_diags.is_empty(), "{parse_diags:?}");
        resolve(&stmts)
    }

    #[test]
    fn self_referential_initializer_is_an_error() {
        let (_, diags) = resolve_source("{ var x = x; }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("own initializer"));
    }

    #[test]
    fn duplicate_binding_in_same_scope_is_an_error() {
        let (_, diags) = resolve_source("{ var x = 1; var x = 2; }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("Already a variable"));
    }

    #[test]
    fn this_outside_class_is_an_error() {
        let (_, diags) = resolve_source("print(this);");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("'this' outside"));
    }

    #[test]
    fn top_level_return_is_an_error() {
        let (_, diags) = resolve_source("return 1;");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("top-level"));
    }

    #[test]
    fn return_value_from_initializer_is_an_error() {
        let (_, diags) = resolve_source("class C { init() { return 1; } }");
        assert_eq!(diags.len(), 1);
        assert!(diags[0].message.contains("initializer"));
    }

    #[test]
    fn shadowing_in_nested_scope_is_fine() {
        let (_, diags) = resolve_source("var x = 1; { var x = 2; }");
        assert!(diags.is_empty());
    }

    #[test]
    fn local_reference_gets_a_recorded_distance() {
        let (locals, diags) = resolve_source("{ var x = 1; print(x); }");
        assert!(diags.is_empty());
        assert_eq!(locals.len(), 1);
    }

    #[test]
    fn global_reference_has_no_recorded_distance() {
        let (locals, diags) = resolve_source("var x = 1; print(x);");
        assert!(diags.is_empty());
        assert!(locals.is_empty());
    }
}
