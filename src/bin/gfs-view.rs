//! Interactive temperature profile viewer for downloaded GFS files.

use anyhow::Result;
use clap::Parser;
use gfs_profile::{
    coordinate_or_default, plot_profile, prompt_line, DataStore, FileRequest, LatLon,
    DEFAULT_DATA_DIR, DEFAULT_LATITUDE, DEFAULT_LONGITUDE,
};
use std::io;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gfs-view")]
#[command(about = "Plot the temperature profile of a downloaded GFS file at one grid point")]
struct Args {
    /// File name inside the data directory; empty means the most recent file
    #[arg(long)]
    file: Option<String>,

    /// Cycle date, YYYYMMDD (with --time, instead of --file)
    #[arg(short, long)]
    date: Option<String>,

    /// Cycle hour
    #[arg(short, long)]
    time: Option<u32>,

    /// Forecast offset in hours; omit for the analysis
    #[arg(short = 'n', long = "number")]
    number: Option<u32>,

    /// Latitude in degrees; prompted for when omitted
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    /// Longitude in degrees; prompted for when omitted
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,

    #[arg(long, env = "GFS_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Print the profile without opening the plot
    #[arg(long)]
    no_plot: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).with_target(false).init();

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    match run(&args, &mut input, &mut output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run<R: BufRead, W: Write>(args: &Args, input: &mut R, output: &mut W) -> Result<()> {
    let request = match FileRequest::from_flags(
        args.file.as_deref(),
        args.date.as_deref(),
        args.time,
        args.number,
    ) {
        Some(request) => request,
        None => {
            let name = prompt_line(input, output, "File name: ")?.unwrap_or_default();
            FileRequest::from_name(&name)
        }
    };

    let store = DataStore::new(&args.data_dir);
    let (path, dataset) = store.open_dataset(&request).await?;

    let latitude = match &args.lat {
        Some(raw) => coordinate_or_default(Some(raw.as_str()), DEFAULT_LATITUDE),
        None => {
            writeln!(output, "{:?}", dataset.latitudes())?;
            let prompt = format!("Select latitude (default: {}): ", DEFAULT_LATITUDE);
            let answer = prompt_line(input, output, &prompt)?;
            coordinate_or_default(answer.as_deref(), DEFAULT_LATITUDE)
        }
    };
    let longitude = match &args.lon {
        Some(raw) => coordinate_or_default(Some(raw.as_str()), DEFAULT_LONGITUDE),
        None => {
            writeln!(output, "{:?}", dataset.longitudes())?;
            let prompt = format!("Select longitude (default: {}): ", DEFAULT_LONGITUDE);
            let answer = prompt_line(input, output, &prompt)?;
            coordinate_or_default(answer.as_deref(), DEFAULT_LONGITUDE)
        }
    };

    let profile = dataset.temperature_profile(LatLon(latitude, longitude))?;
    writeln!(
        output,
        "{} at {} (nearest to {})",
        path.display(),
        profile.grid_point,
        profile.requested
    )?;
    writeln!(output, "{}", profile.to_frame()?)?;

    if !args.no_plot {
        plot_profile(&profile)?;
        prompt_line(input, output, "Press Enter to exit")?;
    }
    Ok(())
}
