use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use skinprick_report::{Error, ReportConfig, ReportRequest, generate_report};

/// Render an allergy skin-prick test report as a paginated PDF.
#[derive(Parser)]
#[command(name = "skinprick-report", version, about)]
struct Args {
    /// Intake form data (JSON, camelCase fields)
    request: PathBuf,

    /// Plain-text results / interpretation block
    #[arg(long)]
    results: PathBuf,

    /// Clinic logo (JPEG or PNG) replacing the bundled one
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Directory the report is written into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(path) => {
            log::info!("Wrote {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<PathBuf, Error> {
    let request = ReportRequest::from_json(&std::fs::read_to_string(&args.request)?)?;
    let results_text = std::fs::read_to_string(&args.results)?;

    let mut config = ReportConfig::default();
    if let Some(logo) = &args.logo {
        config.logo = Some(std::fs::read(logo)?);
    }

    generate_report(&request, &results_text, &config, &args.out_dir)
}
