// ABOUTME: Entry point for the impeller CLI application.
// ABOUTME: Parses settings, then either audits cluster configs or applies one cluster's releases.

mod cli;

use std::env;
use std::path::Path;

use clap::Parser;
use cli::Cli;
use impeller::audit;
use impeller::command::ProcessRunner;
use impeller::config::ClusterConfig;
use impeller::diagnostics::Diagnostics;
use impeller::error::{Error, Result};
use impeller::orchestrator::{Orchestrator, RunContext, ToolPaths};
use impeller::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse().with_env_fallbacks();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(OutputMode::from_flags(cli.quiet, cli.json));
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    cli.validate()?;
    let config_path = cli
        .cluster_config_path
        .as_deref()
        .ok_or(Error::ConfigPathNotSet)?;

    if cli.audit {
        let audit_file = cli.audit_file();
        let report = audit::run_audit(config_path, &audit_file)?;
        output.success(&format!(
            "Audit report written to {} ({} releases)",
            audit_file.display(),
            report.len()
        ));
        return Ok(());
    }

    deploy(&cli, config_path, output).await
}

/// Apply every release of one cluster config.
async fn deploy(cli: &Cli, config_path: &Path, output: &Output) -> Result<()> {
    let config = ClusterConfig::load(config_path)?;
    let work_dir = env::current_dir()?;

    let mut ctx = RunContext::new(work_dir)
        .value_files(cli.value_files.iter().cloned())
        .dry_run(cli.dry_run)
        .diff_run(cli.diff_run)
        .tools(ToolPaths {
            helm: cli.helm_bin.clone(),
            kubectl: cli.kubectl_bin.clone(),
            ..ToolPaths::default()
        });
    if let Some(kube_config) = &cli.kube_config {
        ctx = ctx.kube_config(kube_config.clone(), cli.kube_config_base64);
    }
    if let Some(context) = &cli.kube_context {
        ctx = ctx.kube_context(context.clone());
    }

    output.progress(&format!(
        "Applying {} release(s) for cluster {}",
        config.releases.len(),
        config.name
    ));

    let mut diag = Diagnostics::default();
    let mut orchestrator = Orchestrator::new(config, ctx, ProcessRunner::new());
    let result = orchestrator.run(&mut diag).await;

    output.warnings(&diag);
    result?;

    let mode = if cli.diff_run {
        "Diff"
    } else if cli.dry_run {
        "Dry run"
    } else {
        "Deployment"
    };
    output.success(&format!("{mode} complete!"));
    Ok(())
}
