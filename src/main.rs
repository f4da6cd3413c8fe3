use anyhow::Context;
use appgen::{Config, Pipeline};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "appgen",
    version,
    author,
    about = "Generate application scaffolds from free-text descriptions",
    long_about = "Generate application scaffolds from free-text descriptions using Gemini.\n\n\
    The tool reads a description file, asks the model for a JSON list of files, \
    writes them under an output directory, and bundles everything into a zip \
    archive for download.\n\n\
    USAGE EXAMPLES:\n  \
      # Generate from a description file\n  \
      appgen description.txt\n\n  \
      # Custom output locations\n  \
      appgen description.txt --out ./generated --archive ./generated.zip\n\n  \
      # Tighter file ceiling and a cooldown between invocations\n  \
      appgen description.txt --max-files 10 --cooldown 60"
)]
struct Cli {
    /// Path to a text file containing the application description
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output directory for generated files
    #[arg(short, long, default_value = "application_files", value_name = "PATH")]
    out: PathBuf,

    /// Path of the produced zip archive
    #[arg(long, default_value = "application_files.zip", value_name = "PATH")]
    archive: PathBuf,

    /// Model used for generation
    #[arg(short, long, default_value = "gemini-1.0-pro")]
    model: String,

    /// Maximum number of files accepted from a single reply
    #[arg(long, default_value_t = 20)]
    max_files: usize,

    /// Sampling temperature
    #[arg(long, default_value_t = 0.9)]
    temperature: f64,

    /// Seconds to pause after a successful run (rate limiting)
    #[arg(long, default_value_t = 0)]
    cooldown: u64,

    /// Gemini API credential
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let config = Config::builder()
        .api_key(cli.api_key)
        .model(cli.model)
        .output_dir(cli.out)
        .archive_path(cli.archive)
        .max_files(cli.max_files)
        .temperature(cli.temperature)
        .cooldown(Duration::from_secs(cli.cooldown))
        .build()
        .context("Failed to build configuration")?;

    let pipeline = Pipeline::new(config).context("Failed to create pipeline")?;

    match pipeline.run(&cli.input) {
        Ok(stats) => {
            stats.print_summary();
            println!(
                "Application generated and saved as '{}' in the current directory.",
                stats.archive_path
            );
            Ok(())
        }
        // Rejected replies end the run cleanly: the raw reply has already
        // been printed, nothing was written to disk.
        Err(err) if err.is_rejected_reply() => {
            eprintln!("Error processing AI response: {err}");
            std::process::exit(1);
        }
        Err(err) => Err(err).context("Pipeline execution failed"),
    }
}

fn setup_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => EnvFilter::new("appgen=info"),
        1 => EnvFilter::new("appgen=debug"),
        _ => EnvFilter::new("appgen=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();
}
