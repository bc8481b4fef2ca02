use std::{path::PathBuf, process::ExitCode};

use anyhow::Context as _;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gifbar", version, about = "Overlay a progress bar onto animated GIFs")]
struct Cli {
    /// Input GIF, or a directory to process every eligible GIF in it.
    path: PathBuf,

    /// JSON run config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Register the progress bar handler (implied by --bar-thickness / --bar-color).
    #[arg(long)]
    bar: bool,

    /// Bar thickness in pixels (adaptive when omitted).
    #[arg(long)]
    bar_thickness: Option<u32>,

    /// Bar color: a name (red, yellow, ...) or #RRGGBB / #RRGGBBAA.
    #[arg(long)]
    bar_color: Option<gifbar::BarColor>,

    /// Shrink frames to fit WIDTHxHEIGHT.
    #[arg(long, value_parser = parse_size)]
    resize: Option<(u32, u32)>,

    /// Shrink frames by a factor of their original size (wins over --resize).
    #[arg(long)]
    resize_percent: Option<f64>,

    /// Resize before drawing the bar instead of after.
    #[arg(long)]
    resize_first: bool,

    /// Disposal handling while decoding.
    #[arg(long, value_enum)]
    disposal: Option<gifbar::DisposalChoice>,

    /// Where frames are kept between decode and encode.
    #[arg(long, value_enum)]
    storage: Option<gifbar::StorageMode>,

    /// Replace the source file instead of writing a prefixed copy.
    #[arg(long)]
    overwrite: bool,

    /// Play the output once instead of looping forever.
    #[arg(long)]
    no_loop: bool,

    /// Encoder quality, 1 (fastest) to 100 (best).
    #[arg(long)]
    quality: Option<u8>,

    /// Prefix for output file names.
    #[arg(long)]
    prefix: Option<String>,

    /// Process batch files in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel.
    #[arg(long)]
    threads: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got \"{s}\""))?;
    let w = w.trim().parse().map_err(|_| format!("invalid width \"{w}\""))?;
    let h = h.trim().parse().map_err(|_| format!("invalid height \"{h}\""))?;
    Ok((w, h))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> anyhow::Result<gifbar::RunConfig> {
    let mut cfg = match &cli.config {
        Some(path) => gifbar::RunConfig::from_path(path)?,
        None => gifbar::RunConfig::default(),
    };

    if let Some(d) = cli.disposal {
        cfg.disposal = d;
    }
    if let Some(s) = cli.storage {
        cfg.storage = s;
    }
    if cli.overwrite {
        cfg.overwrite_original = true;
    }
    if cli.no_loop {
        cfg.encode.loop_playback = false;
    }
    if let Some(q) = cli.quality {
        cfg.encode.quality = q;
    }
    if let Some(p) = &cli.prefix {
        cfg.output_prefix = p.clone();
    }
    if cli.parallel {
        cfg.parallel = true;
    }
    if cli.threads.is_some() {
        cfg.threads = cli.threads;
    }

    let bar = (cli.bar || cli.bar_thickness.is_some() || cli.bar_color.is_some()).then(|| {
        gifbar::HandlerSpec::ProgressBar {
            thickness: cli.bar_thickness,
            color: cli.bar_color.unwrap_or_default(),
        }
    });
    let resize = (cli.resize.is_some() || cli.resize_percent.is_some()).then(|| {
        gifbar::HandlerSpec::Resize {
            width: cli.resize.map(|(w, _)| w),
            height: cli.resize.map(|(_, h)| h),
            percent: cli.resize_percent,
        }
    });

    if bar.is_some() || resize.is_some() {
        cfg.handlers = if cli.resize_first {
            resize.into_iter().chain(bar).collect()
        } else {
            bar.into_iter().chain(resize).collect()
        };
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Returns `Ok(false)` when some batch files failed.
fn run(cli: Cli) -> anyhow::Result<bool> {
    let cfg = build_config(&cli)?;

    if cli.path.is_dir() {
        let report = gifbar::process_dir(&cli.path, &cfg)
            .with_context(|| format!("process directory '{}'", cli.path.display()))?;
        for failure in &report.failed {
            eprintln!("{}: {}", failure.source.display(), failure.error);
        }
        return Ok(report.is_success());
    }

    gifbar::process_file(&cli.path, &cfg)
        .with_context(|| format!("process '{}'", cli.path.display()))?;
    Ok(true)
}
