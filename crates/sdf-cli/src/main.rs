mod cli;
mod context;
mod input;
mod observability;

use anyhow::{Context as _, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;

use cli::{Cli, Commands, WorkflowCommands};
use context::AppContext;
use input::read_json;
use sdf_config::loader::load_config_with_default_path;
use sdf_custom_resource::ResourceEvent;
use sdf_workflow::{CheckPipelineTask, TerminationEvent, TriggerPipelineTask};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = load_config_with_default_path(cli.config.as_ref()).map_err(anyhow::Error::msg)?;
    observability::init_tracing(&config.logging);
    if let Some(level) = &cli.log_level {
        observability::apply_logging_level(level);
    }
    info!(config = ?cli.config, region = ?config.aws.region, "Configuration loaded");

    if let Commands::Config = cli.command {
        print!("{}", config.to_toml().map_err(anyhow::Error::msg)?);
        return Ok(());
    }

    let ctx = AppContext::new(config).await;
    match &cli.command {
        Commands::CustomResource(args) => {
            let event: ResourceEvent = read_json(&args.event)?;
            let response = ctx.lifecycle().respond(&event).await;
            print_json(&response)?;
        }
        Commands::Workflow(args) => match &args.command {
            WorkflowCommands::Trigger(a) => {
                let input: TriggerPipelineTask = read_json(&a.input)?;
                let checked = ctx.trigger_phase().await?.process(input).await?;
                print_json(&checked)?;
            }
            WorkflowCommands::Check(a) => {
                let input: CheckPipelineTask = read_json(&a.input)?;
                let outcome = ctx.check_phase()?.process(input).await?;
                print_json(&outcome)?;
            }
            WorkflowCommands::Run(a) => {
                let input: TriggerPipelineTask = read_json(&a.input)?;
                let (summary, _) = ctx
                    .driver()
                    .await?
                    .run(input)
                    .await
                    .context("workflow run failed")?;
                print_json(&summary)?;
            }
            WorkflowCommands::Callback(a) => {
                let event: TerminationEvent = read_json(&a.input)?;
                let body = ctx.callback_service().notify(&event).await?;
                print_json(&body)?;
            }
        },
        Commands::Config => {}
    }
    Ok(())
}
