//! CLI module for Switchyard
//!
//! Every command prints pretty JSON on stdout; logs go to stderr.

use crate::app;
use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::process::ExitCode;
use switchyard_core::{AgentResult, AgentTask, Orchestrator};

/// Switchyard agent orchestrator CLI
#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Route requests to specialist agents and run multi-step workflows")]
#[command(version)]
pub struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Skip the language model; classify by keyword only
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a message and route it to the matching agent
    Chat {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Call one agent directly
    Delegate {
        agent: String,
        task_type: String,
        /// Task input as a JSON object
        #[arg(long, short, default_value = "{}")]
        input: String,
    },
    /// Run a workflow template
    Workflow {
        template: String,
        /// Initial workflow context as a JSON object
        #[arg(long, short, default_value = "{}")]
        context: String,
    },
    /// Execute a raw task, e.g. '{"type": "chat", "input": {"message": "hi"}}'
    Run { task: String },
    /// List registered agents
    Agents,
    /// List workflow templates
    Templates,
    /// Show how a message would be classified
    Classify {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let Some(command) = cli.command else {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        cmd.print_help()?;
        println!();
        return Ok(ExitCode::SUCCESS);
    };

    let config = app::load_config()?;
    let orchestrator = app::build(&config, cli.offline)?;

    match command {
        Commands::Chat { message } => {
            let task = AgentTask::from_value("chat", json!({ "message": message.join(" ") }));
            execute(&orchestrator, task).await
        }
        Commands::Delegate {
            agent,
            task_type,
            input,
        } => {
            let input = parse_object(&input, "--input")?;
            let task = AgentTask::from_value(
                "delegate",
                json!({ "agentName": agent, "taskType": task_type, "taskInput": input }),
            );
            execute(&orchestrator, task).await
        }
        Commands::Workflow { template, context } => {
            let context = parse_object(&context, "--context")?;
            let task = AgentTask::from_value(
                "workflow",
                json!({ "template": template, "context": context }),
            );
            execute(&orchestrator, task).await
        }
        Commands::Run { task } => {
            let task: AgentTask = serde_json::from_str(&task)
                .context("Task must be a JSON object with a \"type\" field")?;
            execute(&orchestrator, task).await
        }
        Commands::Agents => {
            let profiles: Vec<_> = orchestrator
                .registry()
                .get_all()
                .iter()
                .map(|agent| agent.profile().clone())
                .collect();
            print_json(&profiles)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Templates => {
            let templates: Vec<Value> = orchestrator
                .templates()
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "steps": t.steps.iter().map(|s| json!({
                            "name": s.name,
                            "agent": s.agent,
                            "taskType": s.task_type,
                        })).collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(&templates)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Classify { message } => {
            let classified = orchestrator.classifier().classify(&message.join(" ")).await;
            print_json(&classified)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn execute(orchestrator: &Orchestrator, task: AgentTask) -> Result<ExitCode> {
    let result: AgentResult = orchestrator.execute(task).await;
    print_json(&result)?;
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn parse_object(raw: &str, flag: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).with_context(|| format!("{} is not valid JSON", flag))?;
    ensure!(value.is_object(), "{} must be a JSON object", flag);
    Ok(value)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
