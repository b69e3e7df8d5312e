use cardcrop::editor::{CropEditor, CropTransform, FaceLocator, FacePosition, FixedFaceLocator};
use cardcrop::imaging::{
    ImageBackend, OutputFormat, RustBackend, optimize_cropped_image, optimize_logo,
};
use cardcrop::session::{Session, SessionStep};
use cardcrop::{batch, config, output, session};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Viewport side used when neither the command line nor a session sets one.
const DEFAULT_VIEWPORT: f64 = 320.0;

/// Shared flag for commands that can center on a known face.
#[derive(clap::Args, Clone)]
struct FaceArgs {
    /// Face center as X,Y percent of width and height, e.g. 48,35
    #[arg(long, value_parser = FacePosition::parse)]
    face: Option<FacePosition>,
}

#[derive(Parser)]
#[command(name = "cardcrop")]
#[command(about = "Square photo cropping for profile pictures and business cards")]
#[command(long_about = "\
Square photo cropping for profile pictures and business cards

The crop engine behind a pan/zoom photo editor, driven from the command line.
The image always covers the square viewport; what is visible in the viewport
is cut out of the full-resolution source and saved at a fixed size.

Sessions replay recorded editor input (JSON):

  {
    \"viewport\": 320,
    \"steps\": [
      { \"step\": \"gesture\", \"events\": [
          { \"type\": \"touch_start\", \"touches\": [{ \"x\": 10, \"y\": 10 }] },
          { \"type\": \"touch_move\",  \"touches\": [{ \"x\": 40, \"y\": 12 }] },
          { \"type\": \"touch_end\" } ] },
      { \"step\": \"auto_center\" },
      { \"step\": \"frame\" }
    ]
  }

Set RUST_LOG=debug to trace editor decisions.
Run 'cardcrop gen-config' to generate a documented cardcrop.toml.")]
#[command(version)]
struct Cli {
    /// Config file; a missing file means stock defaults
    #[arg(long, default_value = "cardcrop.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the initial crop geometry for a photo
    Inspect {
        input: PathBuf,
        /// Square viewport side in pixels
        #[arg(long, default_value_t = DEFAULT_VIEWPORT)]
        viewport: f64,
    },
    /// Crop a photo, optionally replaying an editor session
    ///
    /// Without a session, --face centers the crop on the face. With a session,
    /// it answers the session's auto_center steps.
    Crop {
        input: PathBuf,
        /// Output file; the extension picks the format (jpg, avif, png)
        #[arg(short, long)]
        output: PathBuf,
        /// Square viewport side in pixels (overrides the session's)
        #[arg(long)]
        viewport: Option<f64>,
        /// Editor session to replay
        #[arg(long)]
        session: Option<PathBuf>,
        /// Re-compress the crop toward the target size (always JPEG)
        #[arg(long)]
        optimize: bool,
        #[command(flatten)]
        face: FaceArgs,
    },
    /// Batch-optimize square profile photos
    Photo {
        /// Image files or directories (walked recursively)
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        out_dir: PathBuf,
        #[command(flatten)]
        face: FaceArgs,
    },
    /// Fit a logo into the logo box and compress it
    Logo {
        input: PathBuf,
        /// Output file; .png keeps the logo lossless
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print a stock cardcrop.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config_path = cli.config;

    match cli.command {
        Command::Inspect { input, viewport } => {
            let config = config::load_config(&config_path)?;
            let transform =
                CropTransform::from_file(&RustBackend::new(), &input, viewport, config.editor.max_zoom)?
                    .ok_or("viewport must be a positive number of pixels")?;
            output::print_inspect(&input, &transform);
        }
        Command::Crop {
            input,
            output: out,
            viewport,
            session: session_path,
            optimize,
            face,
        } => {
            let config = config::load_config(&config_path)?;
            let out_format = extension_format(&out);
            if optimize && matches!(out_format, Some(OutputFormat::Avif | OutputFormat::Png)) {
                return Err("--optimize writes JPEG; use a .jpg output".into());
            }
            let backend = RustBackend::new();
            let image = backend.decode(&input)?;
            let mut editor = CropEditor::new(image, config.editor_settings());

            let mut script = match &session_path {
                Some(path) => session::load_session(path)?,
                None => Session::default(),
            };
            if viewport.is_some() {
                script.viewport = viewport;
            }
            script.viewport.get_or_insert(DEFAULT_VIEWPORT);

            let locator = face.face.map(FixedFaceLocator);
            if session_path.is_none() && locator.is_some() {
                script.steps.push(SessionStep::AutoCenter);
            }
            let report = session::replay(
                &mut editor,
                &script,
                locator.as_ref().map(|l| l as &dyn FaceLocator),
            );

            let rect = editor
                .transform()
                .map(|t| t.source_rect())
                .ok_or("the editor never got a usable viewport; check --viewport")?;
            let mut settings = config.output_settings();
            if let Some(format) = out_format {
                settings.format = format;
            }
            if optimize {
                // lossless intermediate; the target-size pass is the only lossy encode
                settings.format = OutputFormat::Png;
            }
            let mut encoded = editor
                .save(&backend, &settings)?
                .ok_or("the editor closed before saving")?;
            if optimize {
                let raster = image::load_from_memory(&encoded.bytes)?;
                encoded = optimize_cropped_image(&backend, &raster, &config.optimize_settings())?;
            }
            std::fs::write(&out, &encoded.bytes)?;
            output::print_crop_result(
                &input,
                &out,
                &encoded,
                rect,
                session_path.as_ref().map(|_| &report),
            );
        }
        Command::Photo {
            inputs,
            out_dir,
            face,
        } => {
            let config = config::load_config(&config_path)?;
            init_thread_pool(&config.processing);
            let files = batch::expand_inputs(&inputs)?;
            if files.is_empty() {
                return Err("no supported images found".into());
            }

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::optimize_photos(
                &RustBackend::new(),
                &files,
                &out_dir,
                face.face,
                &config.optimize_settings(),
                Some(tx),
            )?;
            printer.join().map_err(|_| "output thread panicked")?;

            println!();
            println!("{}", output::format_batch_summary(&summary));
            if summary.failed > 0 {
                return Err(format!("{} of {} photos failed", summary.failed, files.len()).into());
            }
        }
        Command::Logo { input, output: out } => {
            let config = config::load_config(&config_path)?;
            let backend = RustBackend::new();
            let image = backend.decode(&input)?;
            let keep_lossless = match extension_format(&out) {
                Some(OutputFormat::Png) => true,
                Some(OutputFormat::Jpeg) => false,
                Some(OutputFormat::Avif) => return Err("logos are written as PNG or JPEG".into()),
                None => image.color().has_alpha(),
            };
            let encoded = optimize_logo(&backend, &image, keep_lossless, &config.optimize_settings())?;
            std::fs::write(&out, &encoded.bytes)?;
            output::print_logo_result(&input, &out, &encoded);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Output format implied by the file extension, if any.
fn extension_format(path: &Path) -> Option<OutputFormat> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(OutputFormat::from_extension)
}

/// Size the global rayon pool for batch work. Never more threads than cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
