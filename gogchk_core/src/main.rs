/*============================================================
  Synavera Project: Gog-Chk
  Module: gogchk_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for Gog-Chk Core. Inventories a local installer
    collection, queries the product catalog, and reports titles
    and add-ons missing newer installer builds.

  Security / Safety Notes:
    Operates within user privileges. Reads the collection tree
    and performs HTTPS GET requests only; nothing is downloaded.

  Dependencies:
    clap for CLI parsing, chrono for session stamps, tokio for
    the async runtime.

  Operational Scope:
    Run manually or from a timer whenever the collection should
    be checked against the catalog.

  Revision History:
    2025-11-12 COD  Authored Gog-Chk Core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::Utc;
use clap::{ArgAction, Parser};

use gogchk_core::catalog::CatalogClient;
use gogchk_core::config::GogchkConfig;
use gogchk_core::error::{GogchkError, Result};
use gogchk_core::logger::Logger;
use gogchk_core::report::{build_report, render_text, write_report};
use gogchk_core::scanner::{scan, ScanOptions};

/// Command-line arguments for Gog-Chk-Core.
#[derive(Debug, Parser)]
#[command(
    name = "Gog-Chk-Core",
    version,
    author = "Synavera Systems",
    about = "Installer collection update checker for Gog-Chk"
)]
struct Cli {
    /// Collection root holding one directory per title.
    #[arg(value_name = "ROOT")]
    root: Option<PathBuf>,
    /// Override configuration file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override report output path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Catalog URL template; `{id}` is replaced by the product id.
    #[arg(long, value_name = "TEMPLATE")]
    catalog_url: Option<String>,
    /// Maximum concurrent catalog requests.
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
    /// Report per-title failures instead of aborting the run.
    #[arg(long, action = ArgAction::SetTrue)]
    keep_going: bool,
    /// Do not write the report file; print the summary only.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[Gog-Chk-Core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = GogchkConfig::load_from_optional_path(cli.config.as_deref())?;
    if let Some(template) = cli.catalog_url.clone() {
        config.catalog.url_template = template;
    }
    if let Some(jobs) = cli.jobs {
        config.catalog.max_parallel_requests = jobs;
    }

    let root = cli
        .root
        .clone()
        .or_else(|| config.scan.root.clone())
        .ok_or_else(|| {
            GogchkError::Config("No collection root given on the command line or in config".into())
        })?;
    let report_path = cli.report.clone().unwrap_or_else(|| config.report_path());

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("core_{session_stamp}.log")));
    let logger = Logger::new(Some(log_path), cli.verbose)?;
    logger.info("INIT", format!("Scanning collection at {}", root.display()));

    let client = CatalogClient::new(&config.catalog)?;
    let options = ScanOptions {
        max_parallel_requests: config.catalog.max_parallel_requests,
        keep_going: cli.keep_going || config.scan.keep_going,
    };

    let outcome = match scan(&root, &client, &options, &logger).await {
        Ok(outcome) => outcome,
        Err(err) => {
            logger.error("SCAN", format!("Scan aborted: {err}"));
            logger.finalize()?;
            return Err(err);
        }
    };

    let document = build_report(&outcome, &root);
    print!("{}", render_text(&document));

    if !cli.dry_run {
        write_report(&document, &report_path)?;
        logger.info(
            "REPORT",
            format!("Report written to {}", report_path.display()),
        );
    }

    logger.info(
        "SUMMARY",
        format!(
            "titles={} addons={} title_updates={} addon_updates={} failures={}",
            document.metadata.titles_scanned,
            document.metadata.addons_scanned,
            document.metadata.titles_with_updates,
            document.metadata.addons_with_updates,
            document.metadata.failures.len()
        ),
    );
    logger.finalize()?;

    if outcome.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}
