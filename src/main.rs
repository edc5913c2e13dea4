use clap::Parser;
use tracing_subscriber::EnvFilter;

use estimator::config::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(config) => {
            if let Err(e) = estimator::api::run_http_server(&config).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        command => match estimator::api::run_command(command, cli.json) {
            Ok(output) => print!("{output}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
    }
}
