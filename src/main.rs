use clap::{Parser, Subcommand};
use image_resizer::{ImageResizer, config, output};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(about = "Generate named resized and cropped renditions of an image")]
#[command(long_about = "\
Generate named resized and cropped renditions of an image

Formats are declared in groups in a TOML config file:

  [[formats.default]]
  name = \"big\"
  width = 800
  resizeMode = \"proportional\"

  [[formats.default]]
  name = \"small\"
  width = 100
  height = 100
  resizeMode = \"crop\"

Renditions are written to the temp dir as <hash>_<name>.<ext>, where <hash>
is derived from the source path, so re-running a resize overwrites the same
files.

Run 'image-resizer gen-config' to generate a documented config file.
Set RUST_LOG=image_resizer=debug for per-format logging.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults are used if it does not exist)
    #[arg(long, default_value = "image-resizer.toml", global = true)]
    config: PathBuf,

    /// Override the configured temp dir
    #[arg(long, global = true)]
    temp_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the configured formats of one source image
    Resize {
        /// Source image
        source: PathBuf,
        /// Format group to attach (repeatable; default: all groups)
        #[arg(long = "group", value_name = "NAME")]
        groups: Vec<String>,
        /// Skip formats larger than the source instead of upscaling
        #[arg(long)]
        skip_bigger: bool,
        /// Print the result as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Validate the config file and list its format groups
    Check,
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_resizer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Resize {
            source,
            groups,
            skip_bigger,
            json,
        } => {
            let mut resizer = load_resizer(&cli.config, cli.temp_dir)?;
            if skip_bigger {
                resizer.skip_bigger_formats(true);
            }

            let groups = if groups.is_empty() {
                resizer.group_names().map(str::to_string).collect()
            } else {
                groups
            };
            for group in &groups {
                resizer.use_formats_group(group)?;
            }

            let renditions = resizer.resize(&source)?;
            if json {
                output::print_resize_json(&renditions)?;
            } else {
                output::print_resize_output(&source, &renditions, resizer.active_formats().len());
            }
        }
        Command::Check => {
            let resizer = load_resizer(&cli.config, cli.temp_dir)?;
            println!("==> Checking {}", cli.config.display());
            output::print_check_output(&resizer);
            println!("==> Config is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and build a session from it.
fn load_resizer(
    config_path: &std::path::Path,
    temp_dir: Option<PathBuf>,
) -> Result<ImageResizer, Box<dyn std::error::Error>> {
    let mut config = config::load_config(config_path)?;
    if let Some(dir) = temp_dir {
        config.temp_dir = dir;
    }
    debug!(config = %config_path.display(), groups = config.formats.len(), "loaded config");
    Ok(ImageResizer::from_config(&config)?)
}
