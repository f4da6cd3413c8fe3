//! # appgen
//!
//! Generate runnable application scaffolds from free-text descriptions.
//!
//! The tool sends a description to the Gemini text-generation API, expects
//! back a JSON array of `{path, content}` file descriptors, writes those
//! files under an output directory, and bundles the result into a zip
//! archive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use appgen::{Config, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .api_key(std::env::var("GEMINI_API_KEY")?)
//!     .output_dir("./application_files")
//!     .build()?;
//!
//! let stats = Pipeline::new(config)?.run("./description.txt")?;
//! stats.print_summary();
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is a strictly linear pipeline:
//! 1. **Loader**: reads the description file
//! 2. **Prompt**: wraps it in a fixed instruction template
//! 3. **Client**: calls the Gemini `generateContent` endpoint
//! 4. **Parser**: validates the reply as a bounded file structure
//! 5. **Materializer**: writes files confined to the output root
//! 6. **Archiver**: zips the output tree

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod archive;
mod client;
mod config;
mod error;
mod file;
mod parser;
mod pipeline;
mod prompt;
mod writer;

pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use file::GeneratedFile;
pub use pipeline::{Pipeline, PipelineStats};

/// Runs the complete generation pipeline with the given configuration.
///
/// This is the main entry point for the library.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The description file is unreadable
/// - The backend request fails
/// - The reply is rejected or files cannot be written or archived
///
/// # Examples
///
/// ```no_run
/// use appgen::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .api_key("AIza...")
///     .build()?;
///
/// run(config, "./description.txt")?;
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config, description_path: impl AsRef<std::path::Path>) -> Result<PipelineStats> {
    Pipeline::new(config)?.run(description_path)
}
