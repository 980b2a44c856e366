use clap::Parser;
use core_config::tracing::install_color_eyre;
use course::cli::Cli;
use course::{Bootstrap, LivePlatform};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let cli = Cli::parse();

    let Some(options) = cli.into_options() else {
        return match Cli::print_server_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    Bootstrap::new(LivePlatform, options).run().await
}
