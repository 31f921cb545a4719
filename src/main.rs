use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tile_cropper::export::{ExportOptions, build_export_set};
use tile_cropper::imaging::{OutputFormat, OutputScale, Projection, Quality, RustBackend, project};
use tile_cropper::layout::Mode;
use tile_cropper::logging::{LogConfig, init_logging};
use tile_cropper::session::Session;
use tile_cropper::source::ImageSource;
use tile_cropper::{archive, config, output};

#[derive(Parser)]
#[command(name = "tile-cropper")]
#[command(about = "Crop an image into fixed-layout tiles and export them as a zip")]
#[command(long_about = "\
Crop an image into fixed-layout tiles and export them as a zip

Modes:

  artwork         two columns (506 + 100 display px) over the full height
  workshop-duo    two squares spread across a 304:150 capture region
  workshop-quad   four squares spread across a 612:150 capture region

Every tile is exported twice: <name>_<tile>_original (native resolution)
and <name>_<tile>_scaled (the preview). The archive is named
<name>_<MODE>_<hex timestamp>.zip.

Sources can be a file path, an http(s) URL, or a base64 data URI.

Run 'tile-cropper gen-config' to generate a documented tile-cropper.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./tile-cropper.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load an image, crop it into tiles, and write the zip archive
    Crop {
        /// File path, http(s) URL, or data URI
        source: String,
        /// Layout to crop with (artwork, workshop-duo, workshop-quad)
        #[arg(short, long)]
        mode: Option<Mode>,
        /// Directory for the archive
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Tile encoding (png, jpeg, webp)
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Show where the tiles land on an image of the given size
    Plan {
        width: u32,
        height: u32,
        #[arg(short, long)]
        mode: Option<Mode>,
        /// Print both projections as JSON
        #[arg(long)]
        json: bool,
    },
    /// List modes and their tiles
    Modes,
    /// Print a stock tile-cropper.toml with all options documented
    GenConfig,
}

#[derive(Serialize)]
struct Plan {
    preview: Projection,
    native: Projection,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose));

    match cli.command {
        Command::Crop {
            source,
            mode,
            output: out_dir,
            format,
        } => {
            let cfg = load_config(cli.config.as_ref())?;
            init_thread_pool(&cfg.processing);
            let mode = mode.unwrap_or(cfg.mode);
            let backend = RustBackend::new();

            let mut session = Session::new(mode, cfg.preview.filter);
            session.load(&backend, &ImageSource::parse(&source))?;

            if let Some(projection) = session.projection() {
                output::print_projection(projection);
            }

            let request = session.export_request()?;
            let options = ExportOptions {
                format: format.unwrap_or(cfg.export.format),
                quality: Quality::new(cfg.export.quality),
                filter: cfg.preview.filter,
            };
            let entries = build_export_set(&backend, &request, &options)?;
            let out_dir = out_dir.unwrap_or(cfg.export.output_dir);
            let path = archive::save_archive(&entries, &out_dir, &request.basename, request.mode)?;
            output::print_export(&entries, &path);
        }
        Command::Plan {
            width,
            height,
            mode,
            json,
        } => {
            let cfg = load_config(cli.config.as_ref())?;
            let mode = mode.unwrap_or(cfg.mode);
            let plan = Plan {
                preview: project(mode, width, height, OutputScale::Preview)?,
                native: project(mode, width, height, OutputScale::Native)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_projection(&plan.preview);
                output::print_projection(&plan.native);
            }
        }
        Command::Modes => output::print_modes(),
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config named by `-c`, or `./tile-cropper.toml` if it exists.
///
/// An explicitly named file must exist; the implicit one is optional.
fn load_config(
    explicit: Option<&PathBuf>,
) -> Result<config::CropperConfig, Box<dyn std::error::Error>> {
    match explicit {
        Some(path) if !path.exists() => {
            Err(format!("config file not found: {}", path.display()).into())
        }
        Some(path) => Ok(config::load_config(path)?),
        None => Ok(config::load_config(Path::new(config::CONFIG_FILE_NAME))?),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
