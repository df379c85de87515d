//! Constants the CLI/REPL driver carries: version string, REPL banner,
//! prompt, and history file name. The interpreter itself has no
//! tunables beyond its single CLI argument, so there is nothing here
//! to load from a file or environment variable.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WELCOME_MESSAGE: &str = "WIXME";
pub const WELCOME_SUBTITLE: &str = "A small dynamically-typed scripting language.";

pub const REPL_PROMPT: &str = "> ";

pub const HISTORY_FILE: &str = ".wixme_history";
