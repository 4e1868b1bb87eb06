//! Proxmox provider CLI - machine lifecycle through Terraform

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stderr};

use proxmox_provider::cli::Cli;
use proxmox_provider::domain::ProviderError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    cli.init_logging();

    if let Err(e) = cli.run().await {
        // A failing remote command reports through its own exit code.
        if let Some(ProviderError::RemoteCommandFailed { code }) = e.downcast_ref::<ProviderError>()
        {
            std::process::exit(*code);
        }
        eprintln!(
            "{}: {e:#}",
            "Error".if_supports_color(Stderr, |t| t.red().bold().to_string())
        );
        std::process::exit(1);
    }
}
