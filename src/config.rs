use crate::error::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.0-pro";
const DEFAULT_OUTPUT_DIR: &str = "application_files";
const DEFAULT_ARCHIVE_PATH: &str = "application_files.zip";
const DEFAULT_MAX_FILES: usize = 20;
const DEFAULT_TEMPERATURE: f64 = 0.9;
const DEFAULT_TOP_P: f64 = 1.0;
const DEFAULT_TOP_K: u32 = 0;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for the appgen pipeline.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Gemini API credential
    pub api_key: String,

    /// Base URL of the generative API (overridable for proxies and tests)
    pub api_base_url: String,

    /// Model identifier used for generation
    pub model: String,

    /// Sampling temperature
    pub temperature: f64,

    /// Nucleus sampling parameter
    pub top_p: f64,

    /// Greedy sampling parameter (0 disables top-k)
    pub top_k: u32,

    /// Ceiling on generated output tokens
    pub max_output_tokens: u32,

    /// Directory where generated files are materialized
    pub output_dir: PathBuf,

    /// Path of the zip archive produced from the output directory
    pub archive_path: PathBuf,

    /// Maximum number of files accepted from a single reply
    pub max_files: usize,

    /// Pause after a successful run, for rate-limiting repeated invocations
    pub cooldown: Duration,

    /// HTTP client timeout for the generation request
    pub timeout: Duration,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use appgen::Config;
    ///
    /// let config = Config::builder()
    ///     .api_key("AIza...")
    ///     .model("gemini-1.0-pro")
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API key or model name is empty
    /// - The file ceiling is zero
    /// - Sampling parameters are out of range
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::config(
                "API key is empty. Set GEMINI_API_KEY or use Config::builder().api_key(..)",
            ));
        }

        if self.model.trim().is_empty() {
            return Err(Error::config("model name must not be empty"));
        }

        if self.api_base_url.trim().is_empty() {
            return Err(Error::config("api_base_url must not be empty"));
        }

        if self.max_files == 0 {
            return Err(Error::config("max_files must be greater than 0"));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::config(format!(
                "temperature ({}) must be within [0.0, 2.0]",
                self.temperature
            )));
        }

        if !(0.0..=1.0).contains(&self.top_p) {
            return Err(Error::config(format!(
                "top_p ({}) must be within [0.0, 1.0]",
                self.top_p
            )));
        }

        if self.max_output_tokens == 0 {
            return Err(Error::config("max_output_tokens must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_PATH),
            max_files: DEFAULT_MAX_FILES,
            cooldown: Duration::ZERO,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    api_key: Option<String>,
    api_base_url: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    top_p: Option<f64>,
    top_k: Option<u32>,
    max_output_tokens: Option<u32>,
    output_dir: Option<PathBuf>,
    archive_path: Option<PathBuf>,
    max_files: Option<usize>,
    cooldown: Option<Duration>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    /// Sets the API credential.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL of the generative API.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling parameter.
    #[must_use]
    pub fn top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the top-k sampling parameter (0 disables it).
    #[must_use]
    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Sets the output token ceiling.
    #[must_use]
    pub fn max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Sets the directory where generated files are written.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Sets the path of the produced zip archive.
    #[must_use]
    pub fn archive_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.archive_path = Some(path.into());
        self
    }

    /// Sets the maximum number of files accepted from a reply.
    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        self.max_files = Some(max);
        self
    }

    /// Sets the post-run cooldown.
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    /// Sets the HTTP client timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn build(self) -> Result<Config> {
        let defaults = Config::default();

        let config = Config {
            api_key: self.api_key.unwrap_or(defaults.api_key),
            api_base_url: self.api_base_url.unwrap_or(defaults.api_base_url),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            top_k: self.top_k.unwrap_or(defaults.top_k),
            max_output_tokens: self.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            archive_path: self.archive_path.unwrap_or(defaults.archive_path),
            max_files: self.max_files.unwrap_or(defaults.max_files),
            cooldown: self.cooldown.unwrap_or(defaults.cooldown),
            timeout: self.timeout.unwrap_or(defaults.timeout),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::builder().api_key("test-key").build().unwrap();

        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.max_files, DEFAULT_MAX_FILES);
        assert_eq!(config.output_dir, PathBuf::from("application_files"));
        assert_eq!(config.archive_path, PathBuf::from("application_files.zip"));
        assert_eq!(config.cooldown, Duration::ZERO);
    }

    #[test]
    fn test_missing_api_key() {
        let result = Config::builder().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_max_files() {
        let result = Config::builder().api_key("k").max_files(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_temperature_out_of_range() {
        let result = Config::builder().api_key("k").temperature(3.5).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_top_p_out_of_range() {
        let result = Config::builder().api_key("k").top_p(1.5).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_paths() {
        let config = Config::builder()
            .api_key("k")
            .output_dir("/tmp/gen")
            .archive_path("/tmp/gen.zip")
            .build()
            .unwrap();

        assert_eq!(config.output_dir, PathBuf::from("/tmp/gen"));
        assert_eq!(config.archive_path, PathBuf::from("/tmp/gen.zip"));
    }
}
