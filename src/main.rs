use clap::Parser;
use gapscreen::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let my_code_level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, log::LevelFilter::Warn)
        .filter(Some("gapscreen"), my_code_level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();

    run(cli)
}
