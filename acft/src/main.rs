use std::process;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use acft::error::AcftError;

mod cli;

use cli::dispatch::dispatch;
use cli::types::Cli;

const EXIT_FAILURE: i32 = 1;
const EXIT_PATH_ERROR: i32 = 2;

fn init_tracing() {
    let filter = std::env::var("ACFT_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "acft=warn".to_string());

    tracing_subscriber::registry()
        .with(EnvFilter::new(filter))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match dispatch(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(EXIT_FAILURE),
        Err(err) => {
            let path_error = err
                .downcast_ref::<AcftError>()
                .is_some_and(AcftError::is_path_resolution);
            if path_error {
                eprintln!("acft path error: {err}");
                eprintln!("\nTip: Run 'acft init' to create the required configuration files.");
                process::exit(EXIT_PATH_ERROR);
            }
            eprintln!("acft error: {err:#}");
            process::exit(EXIT_FAILURE);
        }
    }
}
