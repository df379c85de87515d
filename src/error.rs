//! Diagnostics and runtime errors.
//!
//! Lexing, parsing and resolution collect [`Diagnostic`] values and keep
//! going; a runtime error aborts evaluation, so it is carried separately
//! as [`RuntimeError`] and propagated through `Result`.

use crate::token::{Token, TokenKind};
use thiserror::Error;

/// One reported problem from the lex/parse/resolve stages.
///
/// Formats as `[line L, col C] Error<where>: <message>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub col: usize,
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, col: usize, location: impl Into<String>, message: impl Into<String>) -> Self {
        Diagnostic {
            line,
            col,
            location: location.into(),
            message: message.into(),
        }
    }

    /// Build a diagnostic anchored at a token, choosing ` at EOF` or
    /// ` at '<lexeme>'` per the token kind.
    pub fn at_token(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.kind == TokenKind::Eof {
            " at EOF".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        Diagnostic::new(token.line, token.col, location, message)
    }

    pub fn to_line(&self) -> String {
        format!(
            "[line {}, col {}] Error{}: {}",
            self.line, self.col, self.location, self.message
        )
    }
}

/// A runtime error: carries the offending token so the driver can report
/// its position exactly like lex/parse/resolve diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: impl Into<String>) -> Self {
        RuntimeError {
            token,
            message: message.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = if self.token.kind == TokenKind::Eof {
            " at EOF".to_string()
        } else {
            format!(" at '{}' during runtime", self.token.lexeme)
        };
        Diagnostic::new(self.token.line, self.token.col, location, self.message.clone())
    }

    pub fn undefined_variable(token: Token, name: &str) -> Self {
        RuntimeError::new(token, format!("Undefined variable '{name}'."))
    }

    pub fn undefined_property(token: Token, name: &str) -> Self {
        RuntimeError::new(token, format!("Undefined property '{name}'."))
    }

    pub fn not_callable(token: Token) -> Self {
        RuntimeError::new(token, "Can only call functions and classes.")
    }

    pub fn arity_mismatch(token: Token, expected: usize, got: usize) -> Self {
        RuntimeError::new(
            token,
            format!("Expected {expected} arguments but got {got}."),
        )
    }

    pub fn operands_must_be_numbers(token: Token) -> Self {
        RuntimeError::new(token, "Operands must be numbers.")
    }

    pub fn operands_must_be_addable(token: Token) -> Self {
        RuntimeError::new(
            token,
            "Operands must be two numbers, two strings, or two lists.",
        )
    }

    pub fn operand_must_be_number(token: Token) -> Self {
        RuntimeError::new(token, "Operand must be a number.")
    }

    pub fn only_instances_have_properties(token: Token) -> Self {
        RuntimeError::new(token, "Only instances have properties.")
    }

    pub fn only_instances_have_fields(token: Token) -> Self {
        RuntimeError::new(token, "Only instances have fields.")
    }

    pub fn index_out_of_range(token: Token) -> Self {
        RuntimeError::new(token, "Index out of range.")
    }

    pub fn replace_value_must_be_char(token: Token) -> Self {
        RuntimeError::new(token, "Replace value must be string of length 1.")
    }

    pub fn index_must_be_number(token: Token) -> Self {
        RuntimeError::new(token, "Index must be a number.")
    }

    /// Distinct wording for `Index`/slice expressions (plural, matching
    /// the reference's `visitIndexExpr`), as opposed to `Replace`'s
    /// singular "Index must be a number." (`visitReplaceExpr`).
    pub fn indices_must_be_numbers(token: Token) -> Self {
        RuntimeError::new(token, "Indices must be numbers.")
    }

    pub fn indexee_must_be_sequence(token: Token) -> Self {
        RuntimeError::new(token, "Can only index strings and lists.")
    }

    /// Built by a native function, which has no call-site token of its
    /// own; the caller (`Interpreter::call`) always re-decorates this
    /// with the call's `)` token before it reaches a diagnostic.
    pub fn native(message: impl Into<String>) -> Self {
        RuntimeError::new(Token::new(TokenKind::Eof, "", 0, 0), message)
    }
}
