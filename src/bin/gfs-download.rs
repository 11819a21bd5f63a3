//! Downloads one GFS 0.25° product from NOMADS into the local data directory.

use anyhow::{Context, Result};
use clap::Parser;
use gfs_profile::{
    ExistingFilePolicy, FetchConfig, FetchOutcome, Fetcher, LevelSelection, VariableSelection,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gfs-download")]
#[command(about = "Download GFS pressure-level data from the NOMADS filter service")]
#[command(after_help = "If date or time is omitted, the most recent data will be downloaded")]
struct Args {
    /// Cycle date, YYYYMMDD
    #[arg(short, long)]
    date: Option<String>,

    /// Cycle hour: 0, 6, 12 or 18
    #[arg(short, long)]
    time: Option<u32>,

    /// Forecast offset in hours; omit for the analysis
    #[arg(short = 'n', long = "number")]
    number: Option<u32>,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Request every level and variable instead of the curated subset
    #[arg(long)]
    all_fields: bool,

    /// Replace an existing file instead of failing
    #[arg(long)]
    overwrite: bool,

    /// JSON request preset
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, env = "GFS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[arg(long, env = "GFS_BASE_URL")]
    base_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.quiet {
        "warn"
    } else {
        "warn,gfs_profile=debug"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).with_target(false).init();

    match run(&args).await {
        Ok(outcome) => {
            println!("{}", outcome.path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<FetchOutcome> {
    let fetcher = Fetcher::new(build_config(args)?);

    let outcome = match (&args.date, args.time) {
        (Some(date), Some(hour)) => {
            fetcher
                .fetch()
                .date(date.as_str())
                .hour(hour)
                .maybe_forecast_offset(args.number)
                .call()
                .await?
        }
        _ => fetcher.fetch_latest(args.number).await?,
    };
    Ok(outcome)
}

fn build_config(args: &Args) -> Result<FetchConfig> {
    let mut config = match &args.config {
        Some(path) => FetchConfig::from_json_file(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?,
        None => FetchConfig::curated(),
    };

    if args.all_fields {
        config.levels = LevelSelection::All;
        config.variables = VariableSelection::All;
    }
    if args.overwrite {
        config = config.with_existing_file(ExistingFilePolicy::Overwrite);
    }
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url);
    }
    Ok(config)
}
