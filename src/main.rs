use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use serde::Serialize;
use tofupilot::models::{ListRunsRequest, RunOutcome};
use tofupilot::{ClientOptions, RetryPolicy, TofuPilotClient, collect_all};
use tokio_util::sync::CancellationToken;

/// tofupilot - TofuPilot API client
///
/// Query runs and units, and attach files to runs.
///
/// The API key is read from --api-key or the TOFUPILOT_API_KEY environment
/// variable. Set TOFUPILOT_URL to talk to a self-hosted instance.
///
/// Examples:
///   tofupilot runs list --serial-number SN-001
///   tofupilot attachments upload <RUN_ID> report.pdf scope.png
#[derive(Parser, Debug)]
#[command(author, version = env!("TOFUPILOT_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API key (also via TOFUPILOT_API_KEY)
    #[arg(
        long = "api-key",
        env = "TOFUPILOT_API_KEY",
        hide_env_values = true,
        value_name = "KEY",
        global = true
    )]
    pub api_key: Option<String>,

    /// API base URL (defaults to https://www.tofupilot.com; also via TOFUPILOT_URL)
    #[arg(long = "url", env = "TOFUPILOT_URL", value_name = "URL", global = true)]
    pub url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Retries for transient failures (default 3)
    #[arg(long = "max-retries", value_name = "N", global = true)]
    pub max_retries: Option<u32>,

    /// Send every request exactly once
    #[arg(long = "no-retry", global = true, conflicts_with = "max_retries")]
    pub no_retry: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Inspect test runs
    #[command(subcommand)]
    Runs(RunsCommand),

    /// Inspect units
    #[command(subcommand)]
    Units(UnitsCommand),

    /// Manage run attachments
    #[command(subcommand)]
    Attachments(AttachmentsCommand),
}

#[derive(clap::Subcommand, Debug)]
enum RunsCommand {
    /// List runs, newest first
    List(ListRunsArgs),
    /// Show one run
    Get {
        #[arg(value_name = "RUN_ID")]
        id: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct ListRunsArgs {
    /// Only runs of this unit (repeatable)
    #[arg(long = "serial-number", value_name = "SERIAL")]
    pub serial_numbers: Vec<String>,

    /// Only runs with this outcome (repeatable)
    #[arg(long = "outcome", value_name = "OUTCOME")]
    pub outcomes: Vec<RunOutcome>,

    /// Page size
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<u32>,

    /// Follow the cursor through every page
    #[arg(long = "all")]
    pub all: bool,
}

#[derive(clap::Subcommand, Debug)]
enum UnitsCommand {
    /// Show one unit
    Get {
        #[arg(value_name = "UNIT_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum AttachmentsCommand {
    /// Upload files and link them to a run
    Upload {
        #[arg(value_name = "RUN_ID")]
        run_id: String,
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
}

impl Cli {
    fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new();
        if let Some(key) = &self.api_key {
            options = options.with_api_key(key.clone());
        }
        if let Some(url) = &self.url {
            options = options.with_base_url(url.clone());
        }
        if let Some(secs) = self.timeout {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if self.no_retry {
            options = options.with_retry(RetryPolicy::disabled());
        } else if let Some(n) = self.max_retries {
            options = options.with_retry(RetryPolicy::default().with_max_retries(n));
        }
        options
    }
}

impl ListRunsArgs {
    fn to_request(&self) -> ListRunsRequest {
        let mut request = ListRunsRequest {
            serial_numbers: self.serial_numbers.clone(),
            outcomes: self.outcomes.clone(),
            ..ListRunsRequest::default()
        };
        if self.limit.is_some() {
            request.limit = self.limit;
        }
        request
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to render response")?;
    println!("{}", json);
    Ok(())
}

async fn run(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let client =
        TofuPilotClient::new(cli.client_options()).context("Failed to create TofuPilot client")?;

    match cli.command {
        Commands::Runs(RunsCommand::List(args)) => {
            let request = args.to_request();
            if args.all {
                let runs = client.runs();
                let cancel = &cancel;
                let all = collect_all(|cursor| {
                    let mut page = request.clone();
                    page.cursor = cursor;
                    async move { runs.list(&page, cancel).await }
                })
                .await
                .context("Failed to list runs")?;
                print_json(&all)?;
            } else {
                let page = client
                    .runs()
                    .list(&request, &cancel)
                    .await
                    .context("Failed to list runs")?;
                print_json(&page)?;
            }
        }
        Commands::Runs(RunsCommand::Get { id }) => {
            let run = client
                .runs()
                .get(&id, &cancel)
                .await
                .with_context(|| format!("Failed to fetch run {}", id))?;
            print_json(&run)?;
        }
        Commands::Units(UnitsCommand::Get { id }) => {
            let unit = client
                .units()
                .get(&id, &cancel)
                .await
                .with_context(|| format!("Failed to fetch unit {}", id))?;
            print_json(&unit)?;
        }
        Commands::Attachments(AttachmentsCommand::Upload { run_id, files }) => {
            let ids = client
                .attachments()
                .upload(&run_id, &files, &cancel)
                .await
                .with_context(|| format!("Failed to upload attachments to run {}", run_id))?;
            print_json(&ids)?;
        }
    }

    client.close();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling in-flight request");
            on_interrupt.cancel();
        }
    });

    run(cli, cancel).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_runs_get_parsing() {
        let cli = Cli::try_parse_from(["tofupilot", "runs", "get", "run-1"]).unwrap();
        match cli.command {
            Commands::Runs(RunsCommand::Get { id }) => assert_eq!(id, "run-1"),
            _ => panic!("Expected runs get command"),
        }
    }

    #[test]
    fn test_cli_runs_list_filters() {
        let cli = Cli::try_parse_from([
            "tofupilot",
            "runs",
            "list",
            "--serial-number",
            "SN-1",
            "--outcome",
            "fail",
            "--outcome",
            "PASS",
            "--limit",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Runs(RunsCommand::List(args)) => {
                let request = args.to_request();
                assert_eq!(request.serial_numbers, vec!["SN-1"]);
                assert_eq!(request.outcomes, vec![RunOutcome::Fail, RunOutcome::Pass]);
                assert_eq!(request.limit, Some(10));
                assert_eq!(request.sort_by.as_deref(), Some("started_at"));
                assert!(!args.all);
            }
            _ => panic!("Expected runs list command"),
        }
    }

    #[test]
    fn test_cli_unknown_outcome_fails() {
        let result = Cli::try_parse_from(["tofupilot", "runs", "list", "--outcome", "maybe"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_upload_requires_files() {
        let result = Cli::try_parse_from(["tofupilot", "attachments", "upload", "run-1"]);
        assert!(result.is_err());

        let cli =
            Cli::try_parse_from(["tofupilot", "attachments", "upload", "run-1", "a.txt", "b.png"])
                .unwrap();
        match cli.command {
            Commands::Attachments(AttachmentsCommand::Upload { run_id, files }) => {
                assert_eq!(run_id, "run-1");
                assert_eq!(files, vec![PathBuf::from("a.txt"), PathBuf::from("b.png")]);
            }
            _ => panic!("Expected attachments upload command"),
        }
    }

    #[test]
    fn test_cli_global_flags_build_options() {
        let cli = Cli::try_parse_from([
            "tofupilot",
            "--api-key",
            "tp_flag",
            "--url",
            "http://localhost:3000",
            "--timeout",
            "5",
            "--max-retries",
            "1",
            "units",
            "get",
            "u1",
        ])
        .unwrap();
        let options = cli.client_options();
        assert_eq!(options.api_key.as_deref(), Some("tp_flag"));
        assert_eq!(options.base_url.as_deref(), Some("http://localhost:3000"));
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.retry.max_retries, 1);
        assert!(options.retry.enabled);
    }

    #[test]
    fn test_cli_no_retry_disables_policy() {
        let cli = Cli::try_parse_from(["tofupilot", "runs", "get", "r1", "--no-retry"]).unwrap();
        assert!(!cli.client_options().retry.enabled);
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        let result = Cli::try_parse_from(["tofupilot", "run-1"]);
        assert!(result.is_err());
    }
}
