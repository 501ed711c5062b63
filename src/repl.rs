use crate::run_query;
use crate::storage;
use crate::store::Store;
use std::io::{self, Write};
use std::path::Path;
use tracing::error;

/// Interactive loop over one store. Mutations are saved to `data_path` as
/// soon as the statement succeeds; a failed statement is reported and the
/// session continues.
pub fn start(data_path: &Path, mut store: Store) {
    println!("jsonql v0.1.0 ({})", data_path.display());
    println!("Type 'exit' or 'quit' to leave");
    println!();

    loop {
        print!("sql> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
                    break;
                }

                run_repl_command(line, data_path, &mut store);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, data_path: &Path, store: &mut Store) {
    let outcome = match run_query(source, store) {
        Ok(outcome) => outcome,
        Err(error) => {
            error.report(source, None);
            return;
        }
    };

    if outcome.mutated {
        if let Err(err) = storage::save(data_path, store) {
            error!(%err, "failed to save store");
            eprintln!("Error: {}", err);
        }
    }

    println!("{}", outcome.result);
}
