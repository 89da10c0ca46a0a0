//! Backends command - inspect extraction backends.

use clap::{Args, Subcommand};
use console::style;

use poisnap_core::models::config::PoisnapConfig;
use poisnap_core::Orchestrator;

use super::scan::build_orchestrator;

/// Arguments for the backends command.
#[derive(Args)]
pub struct BackendsArgs {
    #[command(subcommand)]
    command: BackendsCommand,
}

#[derive(Subcommand)]
enum BackendsCommand {
    /// List configured backends and their availability
    List,

    /// Probe a single backend, failing if it is unavailable
    Probe(ProbeArgs),
}

#[derive(Args)]
struct ProbeArgs {
    /// Backend name (as accepted by --policy)
    name: String,
}

pub async fn run(args: BackendsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    // Load configuration
    let config = if let Some(path) = config_path {
        PoisnapConfig::from_file(std::path::Path::new(path))?
    } else {
        PoisnapConfig::default()
    };

    let orchestrator = build_orchestrator(&config)?;

    match args.command {
        BackendsCommand::List => list_backends(&orchestrator).await,
        BackendsCommand::Probe(probe_args) => probe_backend(&orchestrator, &probe_args.name).await,
    }
}

async fn list_backends(orchestrator: &Orchestrator) -> anyhow::Result<()> {
    println!("{}", style("Configured Backends").bold());
    println!();

    for backend in orchestrator.backends() {
        let available = backend.is_available().await;
        let status = if available {
            style("available").green()
        } else {
            style("unavailable").yellow()
        };

        let mut modes = Vec::new();
        if backend.supports_text() {
            modes.push("text");
        }
        if backend.supports_image() {
            modes.push("image");
        }

        println!(
            "{} {:<12} {:<12} {}",
            style(format!("▸ {}", backend.name())).bold().cyan(),
            modes.join("+"),
            status,
            style(describe_backend(backend.name())).dim()
        );
    }

    println!();
    println!("Pass a backend name to --policy to force it for one scan.");

    Ok(())
}

async fn probe_backend(orchestrator: &Orchestrator, name: &str) -> anyhow::Result<()> {
    let backend = orchestrator
        .backends()
        .iter()
        .find(|b| b.name() == name)
        .ok_or_else(|| anyhow::anyhow!("Unknown backend: {}", name))?;

    if backend.is_available().await {
        println!("{} {} is available", style("✓").green(), name);
        Ok(())
    } else {
        anyhow::bail!("Backend {} is not available", name);
    }
}

fn describe_backend(name: &str) -> &'static str {
    match name {
        "cloud" => "OpenAI-compatible chat API",
        "assistant" => "local assistant server",
        "local" => "on-device text model",
        "vision" => "on-device vision model",
        _ => "",
    }
}
