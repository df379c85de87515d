//! The WIXME tree-walking interpreter, exposed as a library so the
//! binary driver and the integration tests share one front-end.

pub mod ast;
pub mod config;
pub mod env;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod token;
pub mod value;

use error::{Diagnostic, RuntimeError};

/// The result of lexing, parsing, resolving and (if those stages were
/// clean) evaluating one complete source unit.
pub struct RunOutcome {
    pub output: String,
    pub diagnostics: Vec<Diagnostic>,
    pub runtime_error: Option<RuntimeError>,
}

impl RunOutcome {
    pub fn had_error(&self) -> bool {
        !self.diagnostics.is_empty() || self.runtime_error.is_some()
    }
}

/// Runs one source unit start to finish. Lexing, parsing and
/// resolution each collect diagnostics and keep going per their own
/// stage's recovery rules; evaluation only runs if none of the three
/// stages reported anything.
pub fn run(source: &str) -> RunOutcome {
    let (tokens, lex_diags) = lexer::scan(source);
    let (stmts, parse_diags) = parser::parse(tokens);
    let (locals, resolve_diags) = resolver::resolve(&stmts);

    let mut diagnostics = Vec::with_capacity(lex_diags.len() + parse_diags.len() + resolve_diags.len());
    diagnostics.extend(lex_diags);
    diagnostics.extend(parse_diags);
    diagnostics.extend(resolve_diags);

    if !diagnostics.is_empty() {
        return RunOutcome {
            output: String::new(),
            diagnostics,
            runtime_error: None,
        };
    }

    let (mut interpreter, buf) = eval::Interpreter::with_capture(locals);
    let runtime_error = interpreter.interpret(&stmts).err();
    let output = String::from_utf8_lossy(&buf.borrow()).into_owned();

    RunOutcome {
        output,
        diagnostics: Vec::new(),
        runtime_error,
    }
}
