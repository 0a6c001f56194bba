use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use brightness_core::{
    aggregate, is_supported_image, load_image, save_image, write_workbook, BitDepthMode,
    ReductionStep, Session, Settings,
};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(author, version, about = "Measure, reduce and export image brightness")]
struct Cli {
    /// Settings file (defaults to ./brightness.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print total brightness and brightness percentage of an image or directory of images
    Calculate(CalculateArgs),
    /// Reduce the brightness of an image, write the result to disk and measure it
    Reduce(ReduceArgs),
    /// Reduce the brightness of an image and save per-pixel before/after values to a workbook
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct CalculateArgs {
    /// Input image path, or a directory searched recursively for images
    input: PathBuf,
    /// Pixel format interpretation used for the brightness sum
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,
}

#[derive(Parser, Debug)]
struct ReduceArgs {
    /// Input image path
    input: PathBuf,
    /// Output image path
    #[arg(short, long)]
    output: PathBuf,
    #[command(flatten)]
    reduction: ReductionSettings,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input image path
    input: PathBuf,
    /// Workbook path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Also write the reduced image to this path
    #[arg(long)]
    reduced_image: Option<PathBuf>,
    #[command(flatten)]
    reduction: ReductionSettings,
}

#[derive(Parser, Debug, Clone)]
struct ReductionSettings {
    /// Pixel format interpretation used to measure the reduced image
    #[arg(long, value_enum)]
    mode: Option<ModeChoice>,
    /// Brightness reduction percentage (10, 20, ... 90)
    #[arg(short, long)]
    percentage: Option<i64>,
    /// Number of times the reduction is applied to the current image
    #[arg(long, default_value_t = 1)]
    times: u32,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ModeChoice {
    #[value(name = "8bpp")]
    Bpp8,
    #[value(name = "12bpp")]
    Bpp12,
    #[value(name = "16bpp")]
    Bpp16,
    #[value(name = "24bpp")]
    Bpp24,
    #[value(name = "32bpp")]
    Bpp32,
    #[value(name = "48bpp")]
    Bpp48,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    match cli.command {
        Commands::Calculate(args) => calculate(args, &settings),
        Commands::Reduce(args) => reduce(args, &settings),
        Commands::Export(args) => export(args, &settings),
    }
}

fn init_logging(verbose: bool) {
    if verbose && std::env::var_os("BRIGHTNESS_LOG").is_none() {
        std::env::set_var("BRIGHTNESS_LOG", "debug");
    }
    pretty_env_logger::init_custom_env("BRIGHTNESS_LOG");
}

fn calculate(args: CalculateArgs, settings: &Settings) -> Result<()> {
    let mode = match args.mode {
        Some(choice) => choice.to_mode(),
        None => settings.mode()?,
    };

    if !args.input.is_dir() {
        let mut session = Session::new(mode, ReductionStep::default());
        session
            .open(&args.input)
            .with_context(|| format!("failed to open image {:?}", args.input))?;
        print!("{}", measurement_report(&session)?);
        return Ok(());
    }

    let entries = collect_images(&args.input)?;
    let progress = ProgressBar::new(entries.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images",
        )
        .context("invalid progress template")?
        .progress_chars("=> "),
    );

    for entry in entries {
        let measured = load_image(&entry)
            .and_then(|loaded| aggregate(&loaded.buffer, mode).map(|result| (loaded, result)));
        match measured {
            Ok((loaded, result)) => progress.println(format!(
                "{}: {} ({}), Brightness: {}, Brightness Percentage: {}%",
                entry.display(),
                mode,
                loaded.format_label(),
                result.total,
                result.percentage
            )),
            Err(err) => warn!("skipping {}: {err}", entry.display()),
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!("measured images in {:?}", args.input));
    Ok(())
}

fn reduce(args: ReduceArgs, settings: &Settings) -> Result<()> {
    let session = reduced_session(&args.input, &args.reduction, settings)?;
    let current = session.current().context("no image loaded")?;
    save_image(current, &args.output)
        .with_context(|| format!("failed to write {:?}", args.output))?;
    print!("{}", measurement_report(&session)?);
    Ok(())
}

fn export(args: ExportArgs, settings: &Settings) -> Result<()> {
    let session = reduced_session(&args.input, &args.reduction, settings)?;

    if let Some(path) = &args.reduced_image {
        let current = session.current().context("no image loaded")?;
        save_image(current, path).with_context(|| format!("failed to write {:?}", path))?;
    }

    let table = session.export_table().context("failed to build pixel table")?;
    let output = args.output.unwrap_or_else(|| settings.workbook.clone());
    let written = write_workbook(&table, &output)
        .with_context(|| format!("failed to write workbook {:?}", output))?;

    // Truncated tables are still saved, matching what fits in a worksheet.
    if let Err(err) = table.ensure_complete() {
        warn!("{err}");
    }

    print!("{}", measurement_report(&session)?);
    println!("Pixel data saved to {}", written.display());
    Ok(())
}

fn reduced_session(
    input: &Path,
    reduction: &ReductionSettings,
    settings: &Settings,
) -> Result<Session> {
    let step = match reduction.percentage {
        Some(percentage) => ReductionStep::try_from(percentage)?,
        None => settings.reduction()?,
    };

    let mode = match reduction.mode {
        Some(choice) => choice.to_mode(),
        None => settings.mode()?,
    };

    let mut session = Session::new(mode, step);
    session.open(input).with_context(|| format!("failed to open image {:?}", input))?;

    for _ in 0..reduction.times {
        session.reduce()?;
    }
    debug!("applied {}% reduction {} time(s)", step.percent(), reduction.times);

    Ok(session)
}

fn collect_images(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_supported_image(entry.path()))
        .map(|entry| entry.path().to_path_buf())
        .collect();
    entries.sort();
    if entries.is_empty() {
        anyhow::bail!("no image files found in {:?}", path);
    }
    Ok(entries)
}

/// Source format and brightness of the image the session currently holds.
fn measurement_report(session: &Session) -> Result<String> {
    let format = session.original_format().context("no image loaded")?;
    let result = session.calculate().context("failed to measure image")?;
    Ok(format!(
        "Original Format: {format}\nBrightness: {}\nBrightness Percentage: {}%\n",
        result.total, result.percentage
    ))
}

impl ModeChoice {
    fn to_mode(self) -> BitDepthMode {
        match self {
            ModeChoice::Bpp8 => BitDepthMode::Bpp8,
            ModeChoice::Bpp12 => BitDepthMode::Bpp12,
            ModeChoice::Bpp16 => BitDepthMode::Bpp16,
            ModeChoice::Bpp24 => BitDepthMode::Bpp24,
            ModeChoice::Bpp32 => BitDepthMode::Bpp32,
            ModeChoice::Bpp48 => BitDepthMode::Bpp48,
        }
    }
}
