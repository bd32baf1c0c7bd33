use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cardscan::{BatchExecutor, CardDetector, DebugConfig, DetectError, DirectorySink, PipelineConfig};

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Find a card or document in a photo and crop it to a top-down view")]
struct Cli {
    /// Path(s) to input image file(s)
    #[arg(value_name = "IMAGE", required_unless_present = "print_config")]
    images: Vec<PathBuf>,

    /// Directory for the edge map, annotated and rectified images
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    out_dir: PathBuf,

    /// JSON file overriding the default pipeline parameters
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Maximum number of images processed at once (default: CPU count)
    #[arg(short, long, value_name = "N")]
    jobs: Option<usize>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            let code = err
                .downcast_ref::<DetectError>()
                .map(DetectError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Cli) -> anyhow::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if args.print_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(ExitCode::SUCCESS);
    }
    config.validate()?;

    let debug = args.debug_out.map(DebugConfig::prepare).transpose()?;

    let batch = args.images.len() > 1;
    let sink_for = |path: &Path| {
        let (out_dir, debug) = if batch {
            let name = image_stem(path);
            (args.out_dir.join(&name), debug.as_ref().map(|d| d.child(&name)))
        } else {
            (args.out_dir.clone(), debug.clone())
        };
        let sink = DirectorySink::new(out_dir);
        match debug {
            Some(d) => sink.with_debug(d),
            None => sink,
        }
    };

    let mut executor = BatchExecutor::new(CardDetector::new(config));
    if let Some(jobs) = args.jobs {
        executor = executor.with_max_workers(jobs);
    }
    let results = executor.execute(&args.images, sink_for);

    let mut exit = ExitCode::SUCCESS;
    let mut first_failure = true;
    for item in &results {
        match &item.result {
            Ok(detection) => {
                let c = &detection.corners;
                println!("{}: card detected", item.path.display());
                println!(
                    "  corners: TL ({:.1}, {:.1})  TR ({:.1}, {:.1})  BR ({:.1}, {:.1})  BL ({:.1}, {:.1})",
                    c.top_left.x,
                    c.top_left.y,
                    c.top_right.x,
                    c.top_right.y,
                    c.bottom_right.x,
                    c.bottom_right.y,
                    c.bottom_left.x,
                    c.bottom_left.y
                );
                println!(
                    "  rectified: {}x{}",
                    detection.rectified.width(),
                    detection.rectified.height()
                );
            }
            Err(err) => {
                println!("{}: {}", item.path.display(), err);
                if first_failure {
                    exit = ExitCode::from(err.exit_code());
                    first_failure = false;
                }
            }
        }
    }

    Ok(exit)
}

/// Per-image directory name within a batch
fn image_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
