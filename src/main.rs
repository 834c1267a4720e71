// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::Context;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nodeflow::config::{NodeFlowSettings, RuntimeBuilder};
use nodeflow::engine::{MessageLevel, NodeEvent};

/// What the command line asked for.
enum Command {
    ListTypes,
    Run(RunArgs),
}

struct RunArgs {
    flow: PathBuf,
    settings: Option<PathBuf>,
    duration: Option<Duration>,
    save: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut rest = args.iter().skip(1);
    let mut flow = None;
    let mut settings = None;
    let mut duration = None;
    let mut save = None;

    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--list-types" => return Ok(Command::ListTypes),
            "--settings" => settings = Some(PathBuf::from(value_for(arg, rest.next())?)),
            "--save" => save = Some(PathBuf::from(value_for(arg, rest.next())?)),
            "--duration" => {
                let value = value_for(arg, rest.next())?;
                let seconds: u64 = value
                    .parse()
                    .map_err(|_| format!("--duration expects whole seconds, got '{}'", value))?;
                duration = Some(Duration::from_secs(seconds));
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'", flag)),
            path if flow.is_none() => flow = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument '{}'", extra)),
        }
    }

    let flow = flow.ok_or_else(|| "Missing flow document".to_string())?;
    Ok(Command::Run(RunArgs {
        flow,
        settings,
        duration,
        save,
    }))
}

fn value_for<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str, String> {
    value
        .map(String::as_str)
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <flow.json> [--settings <file.yaml>] [--duration <secs>] [--save <out.json>]", program);
    eprintln!("       {} --list-types", program);
    eprintln!("Example: {} flows/demo-flow.json --settings configs/nodeflow.yaml --duration 12", program);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("nodeflow");

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(reason) => {
            eprintln!("❌ {}", reason);
            print_usage(program);
            std::process::exit(1);
        }
    };

    let result = match command {
        Command::ListTypes => list_types(),
        Command::Run(run) => run_flow(run).await,
    };

    if let Err(error) = result {
        eprintln!("❌ {:#}", error);
        std::process::exit(1);
    }
}

fn list_types() -> anyhow::Result<()> {
    let runtime = RuntimeBuilder::from_settings(&NodeFlowSettings::default())?;
    let descriptors = runtime.registry.descriptors();
    println!("{}", serde_json::to_string_pretty(&descriptors)?);
    Ok(())
}

async fn run_flow(args: RunArgs) -> anyhow::Result<()> {
    let runtime = match &args.settings {
        Some(path) => RuntimeBuilder::from_settings_file(path)
            .with_context(|| format!("Failed to build runtime from {}", path.display()))?,
        None => RuntimeBuilder::from_settings(&NodeFlowSettings::default())?,
    };
    let graph = runtime
        .codec
        .load_from_path(&args.flow)
        .with_context(|| format!("Failed to load flow {}", args.flow.display()))?;

    println!("🚀 NodeFlow");
    println!("═══════════════════════════════════");
    println!("📋 Flow: {}", args.flow.display());
    println!("🔢 Nodes: {}", graph.len());
    for node in graph.nodes() {
        println!("   • {} ({})", node.label(), node.id());
    }
    println!();

    let stop_printers = CancellationToken::new();
    let printers: Vec<_> = graph
        .nodes()
        .into_iter()
        .map(|node| {
            let mut events = node.subscribe();
            let label = node.label();
            let stop = stop_printers.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => break,
                        event = events.recv() => match event {
                            Ok(event) => print_event(&label, &event),
                            Err(RecvError::Lagged(missed)) => println!("[{}] ⚠️  {} events dropped", label, missed),
                            Err(RecvError::Closed) => break,
                        },
                    }
                }
            })
        })
        .collect();

    let flush_stop = CancellationToken::new();
    let flusher = runtime.start_flusher(flush_stop.clone());

    let started = graph.run();
    println!("▶️  Started {} root nodes; press Ctrl-C to stop", started);

    match args.duration {
        Some(duration) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = tokio::time::sleep(duration) => {}
            }
        }
        None => tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?,
    }

    println!("\n⏹️  Stopping");
    graph.abort();
    graph.shutdown().await;

    stop_printers.cancel();
    for printer in printers {
        printer.await?;
    }

    flush_stop.cancel();
    match flusher {
        Some(flusher) => flusher.await?,
        None => {
            runtime.store.flush()?;
        }
    }

    if let Some(path) = &args.save {
        runtime
            .codec
            .save_to_path(&graph, path)
            .with_context(|| format!("Failed to save flow to {}", path.display()))?;
        println!("💾 Saved flow to {}", path.display());
    }

    Ok(())
}

fn print_event(label: &str, event: &NodeEvent) {
    match event {
        NodeEvent::Entered { .. } => println!("[{}] → entered", label),
        NodeEvent::Left { elapsed, .. } => println!("[{}] ← left after {:?}", label, elapsed),
        NodeEvent::Output { payload, .. } => println!("[{}] 📤 {}", label, payload),
        NodeEvent::Message { level, text, .. } => {
            let marker = match level {
                MessageLevel::Debug => "🔍",
                MessageLevel::Info => "ℹ️ ",
                MessageLevel::Warning => "⚠️ ",
                MessageLevel::Error => "❌",
            };
            println!("[{}] {} {}", label, marker, text);
        }
    }
}
