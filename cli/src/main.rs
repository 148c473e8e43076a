//! CLI for RepoPulse.
//!
//! Shows pipeline statuses and aggregated Renovate pull requests across the
//! configured Azure DevOps repositories, and runs bulk actions on them.

use clap::{Parser, Subcommand};
use repo_pulse::{
    import_configuration, require_configuration, sample_configuration, ActionResult,
    ActionSummary, Aggregation, BuildOutcome, ConfigError, Configuration, ConfigurationStore,
    Dashboard, DashboardError, FileConfigurationStore, RepositoryStatus, DEFAULT_CONCURRENCY,
    TOKEN_ENV,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// RepoPulse - CI pipeline status and Renovate pull request management for Azure DevOps.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file.
    #[arg(long, env = "REPOPULSE_CONFIG", default_value = "repo-pulse.json")]
    config: PathBuf,

    /// Azure DevOps Personal Access Token, overrides the stored one.
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    token: Option<String>,

    /// Maximum concurrent API requests.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Latest pipeline run of every repository.
    Repositories,
    /// Aggregated Renovate pull requests with build outcomes.
    Prs,
    /// Publish every draft of an aggregated pull request.
    Publish {
        /// Title of the aggregated pull request.
        title: String,
    },
    /// Complete every pull request of an aggregate.
    Complete {
        /// Title of the aggregated pull request.
        title: String,
    },
    /// Queue pipeline runs on each repository's configured branch.
    Trigger {
        /// Only trigger this repository.
        #[arg(long)]
        repository: Option<String>,
    },
    /// Open pull requests from each configured branch into a target branch.
    UpdatePrs {
        /// Branch to update.
        target_branch: String,
    },
    /// Manage the configuration file.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the current configuration, token masked.
    Show,
    /// Print a sample configuration.
    Sample,
    /// Validate a configuration file and make it the current one.
    Import {
        /// File to import.
        file: PathBuf,
    },
    /// Write the current configuration to a file.
    Export {
        /// Destination file.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(DashboardError::Config(ConfigError::NotConfigured { path })) => {
            print_setup_instructions(&path);
            ExitCode::from(2)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Compact single-line output without target paths, on stderr so stdout
/// carries only command output. `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<ActionSummary, DashboardError> {
    let store = FileConfigurationStore::new(&args.config);
    let location = args.config.display().to_string();

    if let Command::Config(command) = &args.command {
        run_config_command(command, &store, &location, args.json)?;
        return Ok(ActionSummary::default());
    }

    let config = require_configuration(&store, &location)?;
    let dashboard = Dashboard::new(config, args.token, args.concurrency)?;

    let results = match args.command {
        Command::Repositories => {
            let statuses = dashboard.repository_statuses().await;
            if args.json {
                print_json(&statuses);
            } else {
                print_repositories(&dashboard.config().azure_dev_ops.organization, &statuses);
            }
            return Ok(failure_summary(
                statuses.iter().filter(|status| status.is_failed()).count(),
            ));
        }
        Command::Prs => {
            let aggregation = dashboard.refresh().await?;
            if args.json {
                print_json(&aggregation);
            } else {
                print_aggregation(&aggregation);
            }
            return Ok(failure_summary(aggregation.failed_repositories.len()));
        }
        Command::Publish { title } => dashboard.publish(&title).await?,
        Command::Complete { title } => dashboard.complete(&title).await?,
        Command::Trigger { repository } => dashboard.trigger(repository.as_deref()).await?,
        Command::UpdatePrs { target_branch } => dashboard.create_update_prs(&target_branch).await,
        Command::Config(_) => Vec::new(),
    };

    let summary = ActionSummary::from_results(&results);
    if args.json {
        print_json(&results);
    } else {
        print_results(&results, &summary);
    }
    Ok(summary)
}

fn run_config_command(
    command: &ConfigCommand,
    store: &FileConfigurationStore,
    location: &str,
    json: bool,
) -> Result<(), ConfigError> {
    match command {
        ConfigCommand::Show => {
            let mut config = require_configuration(store, location)?;
            if !config.azure_dev_ops.personal_access_token.is_empty() {
                config.azure_dev_ops.personal_access_token = "********".to_string();
            }
            println!("{}", config.to_json(location)?);
        }
        ConfigCommand::Sample => {
            println!("{}", sample_configuration().to_json("sample")?);
        }
        ConfigCommand::Import { file } => {
            let path = file.display().to_string();
            let text = std::fs::read_to_string(file)
                .map_err(|source| ConfigError::IoError { path, source })?;
            let config = import_configuration(store, &text)?;
            report_saved(&config, location, json);
        }
        ConfigCommand::Export { file } => {
            let config = require_configuration(store, location)?;
            let destination = FileConfigurationStore::new(file);
            destination.save(&config)?;
            report_saved(&config, &file.display().to_string(), json);
        }
    }
    Ok(())
}

fn report_saved(config: &Configuration, location: &str, json: bool) {
    if json {
        print_json(&serde_json::json!({
            "path": location,
            "repositories": config.repositories.len(),
        }));
    } else {
        println!(
            "Saved configuration with {} repositories to {location}",
            config.repositories.len()
        );
    }
}

/// Exit summary for read-only commands, which only report failed repositories.
fn failure_summary(failed: usize) -> ActionSummary {
    ActionSummary {
        failed,
        ..ActionSummary::default()
    }
}

/// Writes `value` as one pretty-printed JSON document.
fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    if let Err(e) = write_json(&mut io::stdout().lock(), value) {
        error!(error = %e, "Failed to write output");
    }
}

/// Short marker for a build outcome in text output.
fn outcome_marker(outcome: BuildOutcome) -> &'static str {
    if outcome.is_success() {
        "ok"
    } else if outcome.is_running() {
        ".."
    } else if outcome == BuildOutcome::Unknown {
        "?"
    } else {
        "!!"
    }
}

fn print_repositories(organization: &str, statuses: &[RepositoryStatus]) {
    println!("Organization: {organization}");
    for status in statuses {
        let build = match (&status.build, &status.error) {
            (_, Some(error)) => format!("lookup failed: {error}"),
            (Some(b), None) => format!("#{} {}", b.id, b.outcome),
            (None, None) => "no runs".to_string(),
        };
        println!(
            "{:<2} {:<30} {:<12} pipeline {:<6} {}",
            outcome_marker(status.outcome()),
            status.name,
            status.branch,
            status.pipeline_id,
            build
        );
    }
}

fn print_aggregation(aggregation: &Aggregation) {
    let aggregates = &aggregation.aggregates;
    if aggregates.is_empty() {
        println!("No Renovate pull requests.");
    }

    for aggregate in aggregates {
        println!("\n{} [{}]", aggregate.title, aggregate.status().as_str());
        for entry in &aggregate.repositories {
            let outcome = entry
                .build_status
                .as_ref()
                .map_or(BuildOutcome::Unknown, |b| b.outcome);
            let build = if entry.build_status.is_some() {
                outcome.as_str()
            } else {
                "no build"
            };
            println!(
                "  {:<2} {:<30} {:<6} #{:<6} {:<20} {}",
                outcome_marker(outcome),
                entry.name,
                entry.status.as_str(),
                entry.pull_request_id,
                build,
                entry.pr_url
            );
        }
    }

    if aggregation.has_failures() {
        println!(
            "\nCould not load: {}",
            aggregation.failed_repositories.join(", ")
        );
    }
}

fn print_results(results: &[ActionResult], summary: &ActionSummary) {
    for result in results {
        match result {
            ActionResult::Success {
                repository,
                detail,
                url,
            } => match url {
                Some(url) => println!("  ok      {repository}: {detail} ({url})"),
                None => println!("  ok      {repository}: {detail}"),
            },
            ActionResult::Skipped { repository, reason } => {
                println!("  skipped {repository}: {reason}");
            }
            ActionResult::Failed { repository, error } => {
                println!("  failed  {repository}: {error}");
            }
        }
    }

    println!("\nSummary:");
    println!("  Succeeded: {}", summary.succeeded);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);
}

fn print_setup_instructions(path: &str) {
    eprintln!("No configuration found at {path}.");
    eprintln!();
    eprintln!("To get started:");
    eprintln!("  1. repo-pulse config sample > sample.json");
    eprintln!("  2. Edit sample.json with your organization, project and repositories");
    eprintln!("  3. repo-pulse --config {path} config import sample.json");
    eprintln!("  4. export {TOKEN_ENV}=<personal access token>");
}
