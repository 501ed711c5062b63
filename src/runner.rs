use crate::run_query;
use crate::storage;
use std::path::Path;
use tracing::error;

/// Runs a single query against the data file, saving it after a mutation.
/// Returns false when the query or the storage layer failed.
pub fn run(source: &str, data_path: &Path) -> bool {
    let mut store = match storage::load(data_path) {
        Ok(store) => store,
        Err(error) => {
            eprintln!("Error: {}", error);
            return false;
        }
    };

    let outcome = match run_query(source, &mut store) {
        Ok(outcome) => outcome,
        Err(error) => {
            error.report(source, None);
            return false;
        }
    };

    if outcome.mutated {
        if let Err(err) = storage::save(data_path, &store) {
            error!(%err, "failed to save store");
            eprintln!("Error: {}", err);
            return false;
        }
    }

    println!("{}", outcome.result);
    true
}
