// jsonql Query Library
//
// A miniature SQL-like query language over an in-memory store of named
// tables, each an ordered list of flat rows. The pipeline is
// lexer -> parser -> evaluator; persistence and the interactive loop sit on
// top of it.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod storage;
pub mod store;
pub mod value;

// Re-export commonly used items
pub use ast::{CompareOp, Condition, Statement};
pub use error::{ErrorKind, QueryError, Span};
pub use evaluator::{execute, Outcome, QueryResult};
pub use lexer::{Lexer, Token, TokenType};
pub use parser::{parse, Parser};
pub use storage::StoreError;
pub use store::{Row, Store, Table};
pub use value::Value;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;

/// Parses and executes one statement against `store`.
///
/// A statement that fails to lex or parse leaves the store untouched.
pub fn run_query(source: &str, store: &mut Store) -> Result<Outcome, QueryError> {
    let statement = parse(source)?;
    tracing::debug!(?statement, "parsed");
    execute(&statement, store)
}
