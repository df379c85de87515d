//! CLI/REPL driver: argument handling, diagnostic printing, and the
//! glue between the front-end stages and the interpreter.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::ExitCode;
use wixme::eval::Interpreter;
use wixme::{config, lexer, parser, resolver};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => run_repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: wixme [script]");
            ExitCode::from(1)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read file {path}: {err}");
            return ExitCode::from(1);
        }
    };

    let outcome = wixme::run(&source);
    print!("{}", outcome.output);
    let _ = io::stdout().flush();
    for diagnostic in &outcome.diagnostics {
        eprintln!("{}", diagnostic.to_line());
    }
    if let Some(err) = &outcome.runtime_error {
        eprintln!("{}", err.to_diagnostic().to_line());
    }

    if outcome.had_error() {
        ExitCode::from(1)
    } else {
        ExitCode::from(0)
    }
}

fn run_repl() -> ExitCode {
    println!("{} {}", config::WELCOME_MESSAGE, config::VERSION);
    println!("{}", config::WELCOME_SUBTITLE);

    let mut rl = match DefaultEditor::new() {
        Ok(rl) => rl,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {err}");
            return ExitCode::from(1);
        }
    };
    let _ = rl.load_history(config::HISTORY_FILE);

    let mut interpreter = Interpreter::new(Default::default());

    loop {
        match rl.readline(config::REPL_PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(line.as_str());
                run_line(&mut interpreter, &line);
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {err}");
                break;
            }
        }
    }

    let _ = rl.save_history(config::HISTORY_FILE);
    ExitCode::from(0)
}

/// Lexes, parses, resolves and evaluates one REPL line against the
/// interpreter's persistent environment. The "had error" condition is
/// per line, not session-global: a diagnostic on one line does not
/// poison the next, matching the reference driver resetting its error
/// flag after every line.
fn run_line(interpreter: &mut Interpreter, line: &str) {
    let (tokens, lex_diags) = lexer::scan(line);
    let (stmts, parse_diags) = parser::parse(tokens);
    let (locals, resolve_diags) = resolver::resolve(&stmts);

    let mut diagnostics = lex_diags;
    diagnostics.extend(parse_diags);
    diagnostics.extend(resolve_diags);

    if !diagnostics.is_empty() {
        for diagnostic in &diagnostics {
            eprintln!("{}", diagnostic.to_line());
        }
        return;
    }

    interpreter.set_locals(locals);
    if let Err(err) = interpreter.interpret(&stmts) {
        eprintln!("{}", err.to_diagnostic().to_line());
    }
}
