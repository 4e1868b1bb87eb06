//! CLI argument parsing with clap derive

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::app::AppContext;
use crate::commands;
use crate::infra::installer::ReleaseInstaller;
use crate::infra::ssh::OpenSshShell;
use crate::infra::terraform::TerraformCli;

/// Proxmox machine provider driven by Terraform
#[derive(Parser)]
#[command(
    name = "proxmox-provider",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); `RUST_LOG` takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install Terraform if it is missing
    Init,

    /// Provision the machine
    Create,

    /// Destroy the machine
    Delete,

    /// Print NotFound, Busy or Running
    Status,

    /// Run a command on the machine over SSH
    Command(commands::command::CommandArgs),
}

impl Cli {
    /// Default log filter for the requested verbosity.
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Install the stderr log subscriber.
    pub fn init_logging(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.log_level()));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self) -> Result<()> {
        let ctx = AppContext::new()?;
        match self.command {
            Command::Init => {
                commands::init::run(
                    &ctx.binary,
                    &TerraformCli::default_runner(),
                    &ReleaseInstaller::default(),
                )
                .await
            }
            Command::Create => commands::create::run(&ctx.lifecycle()?).await,
            Command::Delete => commands::delete::run(&ctx.lifecycle()?).await,
            Command::Status => {
                let lifecycle = ctx.lifecycle()?;
                commands::status::run(&lifecycle, &mut std::io::stdout()).await
            }
            Command::Command(args) => {
                commands::command::run(&ctx.lifecycle()?, &OpenSshShell, &args).await
            }
        }
    }
}
