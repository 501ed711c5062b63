use clap::{Arg, ArgAction, Command};
use jsonql::{repl, runner, storage};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

fn main() -> ExitCode {
    let matches = Command::new("jsonql")
        .about("A tiny SQL-like query shell over a JSON document")
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .help("JSON data file holding the tables")
                .value_name("FILE")
                .default_value("data.json"),
        )
        .arg(
            Arg::new("execute")
                .short('e')
                .long("execute")
                .help("Run a single query and exit")
                .value_name("QUERY"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let level = if matches.get_flag("verbose") {
        Level::DEBUG
    } else {
        Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let data_path = matches
        .get_one::<String>("data")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data.json"));

    if let Some(query) = matches.get_one::<String>("execute") {
        return if runner::run(query, &data_path) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match storage::load(&data_path) {
        Ok(store) => {
            repl::start(&data_path, store);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("Error: {}", error);
            ExitCode::FAILURE
        }
    }
}
