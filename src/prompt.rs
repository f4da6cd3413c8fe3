use crate::{
    config::Config,
    error::{Error, Result},
};
use tera::{Context, Tera};

const PROMPT_TEMPLATE_NAME: &str = "generation_prompt";

/// Instruction template wrapped around the user's application description.
///
/// The instructions pin down the reply contract: a raw JSON array of
/// `{path, content}` objects, double-quoted strings, a bounded file count,
/// and no surrounding prose.
const PROMPT_TEMPLATE: &str = r#"Generate an application based on the following details: {{ description }}

Respond strictly with a JSON array and nothing else. Each element must be an object with "path" and "content" as string key-value pairs describing one file of the application. The structure should be followed for any type of file extension, not only the ones shown in the example. Use double quotes for all strings. Do not wrap the response in markdown fences and do not add any prose before or after the JSON. The maximum file limit is {{ max_files }} files. The structure should look like this:
[
    {"path": "file.extension", "content": "the file content"},
    {"path": "style.css", "content": "body { margin: 0; }"}
]
"#;

/// Renders generation prompts from a fixed instruction template.
pub(crate) struct PromptBuilder {
    tera: Tera,
    max_files: usize,
}

impl PromptBuilder {
    /// Creates a new prompt builder from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if template registration fails.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(PROMPT_TEMPLATE_NAME, PROMPT_TEMPLATE)
            .map_err(|e| Error::template(PROMPT_TEMPLATE_NAME, e))?;

        Ok(Self {
            tera,
            max_files: config.max_files,
        })
    }

    /// Builds the full prompt for a user description.
    ///
    /// The description is embedded verbatim; no validation is applied here.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub(crate) fn build(&self, description: &str) -> Result<String> {
        let mut context = Context::new();
        context.insert("description", description);
        context.insert("max_files", &self.max_files);

        self.tera
            .render(PROMPT_TEMPLATE_NAME, &context)
            .map_err(|e| Error::template(PROMPT_TEMPLATE_NAME, e))
    }
}
