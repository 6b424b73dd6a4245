use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sdf-provisioner")]
#[command(about = "Provision the SDF demo warehouse and seed it through pipeline executions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ./sdf.toml when present)
    #[arg(short, long, global = true, env = "SDF_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level filter, overriding logging.level
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Handle one custom-resource lifecycle event and print the response
    CustomResource(EventArgs),
    /// Pipeline task orchestration
    Workflow(WorkflowArgs),
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args)]
pub struct EventArgs {
    /// JSON event file, or `-` for stdin
    pub event: PathBuf,
}

#[derive(clap::Args)]
pub struct WorkflowArgs {
    #[command(subcommand)]
    pub command: WorkflowCommands,
}

#[derive(Subcommand)]
pub enum WorkflowCommands {
    /// Pop one task and create its executions
    Trigger(InputArgs),
    /// Poll the executions of a trigger result once
    Check(InputArgs),
    /// Run the trigger/check loop to completion and signal the callback
    Run(InputArgs),
    /// Signal the callback URL for a termination event
    Callback(InputArgs),
}

#[derive(clap::Args)]
pub struct InputArgs {
    /// JSON input file, or `-` for stdin
    pub input: PathBuf,
}
