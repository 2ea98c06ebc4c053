use std::process::ExitCode;

use clap::Parser;
use miette::IntoDiagnostic;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use kegg_pathway_downloader::app::{DownloadReport, Downloader, RunRequest};
use kegg_pathway_downloader::config::{ConfigLoader, Overrides};
use kegg_pathway_downloader::domain::DriverKind;
use kegg_pathway_downloader::error::KpwdError;
use kegg_pathway_downloader::kegg::KeggHttpClient;
use kegg_pathway_downloader::output::{JsonOutput, LogSink};
use kegg_pathway_downloader::store::PathwayStore;

#[derive(Parser)]
#[command(name = "kpwd")]
#[command(about = "Download KEGG pathway maps in KGML format")]
#[command(version, author)]
struct Cli {
    /// JSON config file (defaults to ./kpwd.json when present)
    #[arg(long)]
    config: Option<String>,

    /// all, search, list, file or commandline
    #[arg(long)]
    action: Option<String>,

    /// Organism code such as hsa; empty or `map` for reference maps
    #[arg(long = "org")]
    org_code: Option<String>,

    #[arg(long)]
    output: Option<String>,

    #[arg(long)]
    extension: Option<String>,

    #[arg(long, value_enum)]
    driver: Option<DriverKind>,

    /// Concurrent driver only: cap on simultaneous downloads
    #[arg(long)]
    max_in_flight: Option<usize>,

    #[arg(long)]
    base_url: Option<String>,

    /// Print a JSON report on stdout
    #[arg(long)]
    json: bool,

    /// Search term, input file name or pathway ids, depending on the action
    args: Vec<String>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(kpwd) = report.downcast_ref::<KpwdError>() {
            return ExitCode::from(kpwd.exit_code());
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = Overrides {
        action: cli.action,
        org_code: cli.org_code,
        download_folder: cli.output,
        extension: cli.extension,
        driver: cli.driver,
        max_in_flight: cli.max_in_flight,
        base_url: cli.base_url,
    };

    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    debug!(?config, "resolved configuration");
    let request = RunRequest::from_config(&config, &cli.args)?;

    let kegg = KeggHttpClient::with_base_url(&config.base_url, config.timeout)?;
    let store = PathwayStore::with_extension(config.output_dir.clone(), &config.extension);
    let downloader = Downloader::new(kegg, store);
    let report = downloader.run(&request, &LogSink)?;

    if cli.json {
        JsonOutput::print_report(&report).into_diagnostic()?;
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn print_summary(report: &DownloadReport) {
    let elapsed = report.finished_at - report.started_at;
    println!(
        "Downloaded {} pathway(s) to {} ({} driver, {:.1}s)",
        report.pathways.len(),
        report.output_dir,
        report.driver,
        elapsed.num_milliseconds() as f64 / 1000.0
    );
}
