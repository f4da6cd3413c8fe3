use crate::{
    archive::Archiver,
    client::{GeminiClient, TextGenerator},
    config::Config,
    error::{Error, Result},
    parser::ResponseParser,
    prompt::PromptBuilder,
    writer::Materializer,
};
use serde::Serialize;
use std::{
    fs,
    path::Path,
    thread,
    time::{Duration, Instant},
};
use tracing::{info, instrument};

/// Statistics collected during pipeline execution.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Length of the user's description in characters
    pub description_chars: usize,

    /// Length of the model's reply in characters
    pub reply_chars: usize,

    /// Number of generated files written to disk
    pub files_written: usize,

    /// Total bytes of file content written
    pub bytes_written: u64,

    /// Number of entries in the produced archive
    pub archive_entries: usize,

    /// Total execution time
    pub duration: Duration,

    /// Time spent waiting on the generative backend
    pub generate_duration: Duration,

    /// Time spent materializing files
    pub write_duration: Duration,

    /// Time spent building the archive
    pub archive_duration: Duration,

    /// Output directory path
    pub output_directory: String,

    /// Archive file path
    pub archive_path: String,
}

impl PipelineStats {
    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Generation Run Summary                     ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Description:          {:>8} chars                  ║",
            self.description_chars
        );
        println!(
            "║ Model reply:          {:>8} chars                  ║",
            self.reply_chars
        );
        println!(
            "║ Files written:        {:>8}                        ║",
            self.files_written
        );
        println!(
            "║ Bytes written:        {:>8}                        ║",
            self.bytes_written
        );
        println!(
            "║ Archive entries:      {:>8}                        ║",
            self.archive_entries
        );
        println!("║                                                       ║");
        println!("║ Timing Breakdown:                                     ║");
        println!(
            "║   - Generation:       {:>8.2}s                     ║",
            self.generate_duration.as_secs_f64()
        );
        println!(
            "║   - Writing:          {:>8.2}s                     ║",
            self.write_duration.as_secs_f64()
        );
        println!(
            "║   - Archiving:        {:>8.2}s                     ║",
            self.archive_duration.as_secs_f64()
        );
        println!(
            "║   - Total:            {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("║                                                       ║");
        println!("║ Output directory:                                     ║");
        println!("║   {}                                                ║", self.output_directory);
        println!("║ Archive:                                              ║");
        println!("║   {}                                                ║", self.archive_path);
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }
}

/// Main pipeline orchestrator: description in, archive out.
///
/// Stages run strictly in order with no retries:
/// load input, build prompt, call the backend, parse the reply,
/// materialize files, archive, optional cooldown.
pub struct Pipeline {
    config: Config,
    prompt_builder: PromptBuilder,
    generator: Box<dyn TextGenerator>,
    parser: ResponseParser,
    materializer: Materializer,
    archiver: Archiver,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration validation fails
    /// - The HTTP client or prompt template cannot be constructed
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let generator: Box<dyn TextGenerator> = Box::new(GeminiClient::new(&config)?);
        Self::assemble(config, generator)
    }

    /// Creates a pipeline around an arbitrary text generator.
    pub(crate) fn with_generator(
        config: Config,
        generator: Box<dyn TextGenerator>,
    ) -> Result<Self> {
        config.validate()?;
        Self::assemble(config, generator)
    }

    fn assemble(config: Config, generator: Box<dyn TextGenerator>) -> Result<Self> {
        let prompt_builder = PromptBuilder::new(&config)?;
        let parser = ResponseParser::new(config.max_files);
        let materializer = Materializer::new(&config.output_dir);
        let archiver = Archiver::new(&config.output_dir, &config.archive_path);

        Ok(Self {
            config,
            prompt_builder,
            generator,
            parser,
            materializer,
            archiver,
        })
    }

    /// Executes the complete pipeline for the description stored at
    /// `description_path` and returns statistics.
    ///
    /// The raw reply is printed to stdout as soon as it arrives, before any
    /// parsing, so it is available for manual debugging on every failure
    /// path.
    ///
    /// # Errors
    ///
    /// Returns an error if any stage fails. [`Error::InvalidResponse`] and
    /// [`Error::TooManyFiles`] mean the reply was rejected before anything
    /// was written; callers may treat those as a clean rejection rather
    /// than a fault.
    #[instrument(skip(self, description_path))]
    pub fn run(self, description_path: impl AsRef<Path>) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let description_path = description_path.as_ref();

        info!("Stage 1/6: Loading description...");
        let description = fs::read_to_string(description_path)
            .map_err(|e| Error::io(description_path, e))?;
        info!(
            "✓ Loaded {} chars from {}",
            description.len(),
            description_path.display()
        );

        info!("Stage 2/6: Building prompt...");
        let prompt = self.prompt_builder.build(&description)?;

        info!("Stage 3/6: Requesting generation...");
        let generate_start = Instant::now();
        let reply = self.generator.generate(&prompt)?;
        let generate_duration = generate_start.elapsed();
        info!(
            "✓ Received {} chars in {:.2}s",
            reply.len(),
            generate_duration.as_secs_f64()
        );

        println!("Raw AI response:\n{reply}");

        info!("Stage 4/6: Parsing reply...");
        let files = self.parser.parse(&reply)?;
        info!("✓ Parsed {} file descriptors", files.len());

        info!("Stage 5/6: Writing files...");
        let write_start = Instant::now();
        let bytes_written = self.materializer.write_files(&files)?;
        let write_duration = write_start.elapsed();

        info!("Stage 6/6: Archiving...");
        let archive_start = Instant::now();
        let archive_entries = self.archiver.archive()?;
        let archive_duration = archive_start.elapsed();

        let stats = PipelineStats {
            description_chars: description.len(),
            reply_chars: reply.len(),
            files_written: files.len(),
            bytes_written,
            archive_entries,
            duration: start_time.elapsed(),
            generate_duration,
            write_duration,
            archive_duration,
            output_directory: self.materializer.output_dir().display().to_string(),
            archive_path: self.archiver.archive_path().display().to_string(),
        };

        info!(
            "✓ Pipeline completed successfully in {:.2}s",
            stats.duration.as_secs_f64()
        );

        if !self.config.cooldown.is_zero() {
            info!(
                "Cooling down for {:.0}s before exit",
                self.config.cooldown.as_secs_f64()
            );
            thread::sleep(self.config.cooldown);
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;

    struct CannedGenerator {
        reply: String,
    }

    impl TextGenerator for CannedGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.clone())
        }
    }

    struct FailingGenerator;

    impl TextGenerator for FailingGenerator {
        fn generate(&self, _prompt: &str) -> Result<String> {
            Err(Error::api("connection refused"))
        }
    }

    fn test_config(temp: &assert_fs::TempDir) -> Config {
        Config::builder()
            .api_key("test-key")
            .output_dir(temp.child("application_files").path())
            .archive_path(temp.child("application_files.zip").path())
            .build()
            .unwrap()
    }

    fn pipeline_with_reply(temp: &assert_fs::TempDir, reply: &str) -> Pipeline {
        Pipeline::with_generator(
            test_config(temp),
            Box::new(CannedGenerator {
                reply: reply.to_string(),
            }),
        )
        .unwrap()
    }

    fn write_description(temp: &assert_fs::TempDir) -> std::path::PathBuf {
        let input = temp.child("description.txt");
        input.write_str("a todo list app").unwrap();
        input.path().to_path_buf()
    }

    const TODO_REPLY: &str = r#"[{"path":"index.html","content":"<h1>Todo</h1>"}, {"path":"style.css","content":"body{margin:0}"}]"#;

    #[test]
    fn test_full_run_materializes_and_archives() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        let stats = pipeline_with_reply(&temp, TODO_REPLY).run(&input).unwrap();

        assert_eq!(stats.files_written, 2);
        assert_eq!(stats.archive_entries, 2);
        temp.child("application_files/index.html")
            .assert("<h1>Todo</h1>");
        temp.child("application_files/style.css")
            .assert("body{margin:0}");
        assert!(temp.child("application_files.zip").exists());
    }

    #[test]
    fn test_archive_mirrors_output_tree() {
        use std::io::Read;

        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);
        let reply = r#"[{"path":"/index.html","content":"<h1>Todo</h1>"},{"path":"src/app.js","content":"run()"}]"#;

        pipeline_with_reply(&temp, reply).run(&input).unwrap();

        let file = fs::File::open(temp.child("application_files.zip").path()).unwrap();
        let mut zip = zip::ZipArchive::new(file).unwrap();

        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, vec!["index.html", "src/app.js"]);

        let mut content = String::new();
        zip.by_name("src/app.js")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "run()");
    }

    #[test]
    fn test_invalid_json_reply_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        let err = pipeline_with_reply(&temp, "not json").run(&input).unwrap_err();

        assert!(err.is_rejected_reply());
        assert!(!temp.child("application_files").exists());
        assert!(!temp.child("application_files.zip").exists());
    }

    #[test]
    fn test_wrong_shape_reply_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        let err = pipeline_with_reply(&temp, r#"[{"path":"a"}]"#)
            .run(&input)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidResponse { .. }));
        assert!(!temp.child("application_files.zip").exists());
    }

    #[test]
    fn test_ceiling_exceeded_writes_nothing() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        let entries: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"path":"f{i}.txt","content":"x"}}"#))
            .collect();
        let reply = format!("[{}]", entries.join(","));

        let err = pipeline_with_reply(&temp, &reply).run(&input).unwrap_err();

        assert!(matches!(err, Error::TooManyFiles { count: 21, limit: 20 }));
        assert!(!temp.child("application_files").exists());
    }

    #[test]
    fn test_backend_failure_propagates() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        let pipeline =
            Pipeline::with_generator(test_config(&temp), Box::new(FailingGenerator)).unwrap();
        let err = pipeline.run(&input).unwrap_err();

        assert!(err.is_api());
        assert!(!err.is_rejected_reply());
    }

    #[test]
    fn test_missing_description_file() {
        let temp = assert_fs::TempDir::new().unwrap();

        let err = pipeline_with_reply(&temp, TODO_REPLY)
            .run(temp.child("missing.txt").path())
            .unwrap_err();

        assert!(err.is_io());
    }

    #[test]
    fn test_repeated_runs_are_idempotent() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);

        pipeline_with_reply(&temp, TODO_REPLY).run(&input).unwrap();
        let first_archive = fs::read(temp.child("application_files.zip").path()).unwrap();
        let first_index =
            fs::read(temp.child("application_files/index.html").path()).unwrap();

        pipeline_with_reply(&temp, TODO_REPLY).run(&input).unwrap();
        let second_archive = fs::read(temp.child("application_files.zip").path()).unwrap();
        let second_index =
            fs::read(temp.child("application_files/index.html").path()).unwrap();

        assert_eq!(first_index, second_index);
        assert_eq!(first_archive, second_archive);
    }

    #[test]
    fn test_unsafe_path_rejected() {
        let temp = assert_fs::TempDir::new().unwrap();
        let input = write_description(&temp);
        let reply = r#"[{"path":"../../escape.txt","content":"boom"}]"#;

        let err = pipeline_with_reply(&temp, reply).run(&input).unwrap_err();

        assert!(matches!(err, Error::UnsafePath { .. }));
        assert!(!temp.child("escape.txt").exists());
    }
}
