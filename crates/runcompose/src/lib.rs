//! Runcompose - translate `docker run` commands into Compose documents.
//!
//! Parsing, merging, dialect migration and YAML rendering for one or more
//! `docker run`, `docker create`, `docker container run` and
//! `docker service create` commands.

pub mod config;
pub mod export;
pub mod migrate;
pub mod resources;

mod error;
mod translation;

pub use runcompose_core::{compose, dialect};
pub use runcompose_parser::{Command, FlagRegistry, FlagRegistryBuilder, ParseError};

pub use error::{NO_INVOCATION_MESSAGE, RunComposeError};
pub use translation::Translation;

use log::{debug, info, trace};
use serde_yaml::Value;

use compose::ComposeDocument;
use config::{AppConfig, RenderConfig};
use dialect::Dialect;
use export::yaml::YamlEmitter;
use migrate::{BuiltinMigrator, Migrator};
use resources::ResourceCollector;

/// Builder for translating docker commands into Compose documents.
///
/// This provides an API for processing commands through parsing, merging,
/// migration, and rendering stages. A builder holds no per-call state and
/// can be shared between threads.
///
/// # Examples
///
/// ```rust
/// use runcompose::{ComposeBuilder, config::AppConfig};
///
/// let source = "docker run -p 80:80 nginx";
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = ComposeBuilder::new(config);
///
/// // Parse commands to a translation
/// let translation = builder.parse(source)
///     .expect("Failed to parse");
///
/// // Render the translation to YAML
/// let yaml = builder.render(&translation);
/// assert!(yaml.starts_with("services:"));
///
/// // Or use default config
/// let builder = ComposeBuilder::default();
/// ```
pub struct ComposeBuilder {
    config: AppConfig,
    registry: FlagRegistry,
    migrator: Box<dyn Migrator>,
}

impl Default for ComposeBuilder {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl ComposeBuilder {
    /// Create a new builder with the given configuration.
    ///
    /// The builder starts with the built-in flag table and migrator.
    ///
    /// # Arguments
    ///
    /// * `config` - Application configuration including render settings
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            registry: FlagRegistry::builtin(),
            migrator: Box::new(BuiltinMigrator),
        }
    }

    /// Replace the flag table.
    pub fn with_registry(mut self, registry: FlagRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the dialect migrator.
    pub fn with_migrator(mut self, migrator: Box<dyn Migrator>) -> Self {
        self.migrator = migrator;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse command text into a translation.
    ///
    /// Every invocation becomes a service of the generated document. Ignored
    /// commands, ignored options and named resources are recorded as
    /// comments.
    ///
    /// # Arguments
    ///
    /// * `commands` - One or more docker commands
    ///
    /// # Errors
    ///
    /// Returns [`RunComposeError::Parse`] for lexical or flag value errors,
    /// and [`RunComposeError::NoInvocation`] when no command is translated.
    pub fn parse(&self, commands: &str) -> Result<Translation, RunComposeError> {
        info!("Parsing docker commands");

        let parsed = runcompose_parser::parse(commands, &self.registry)
            .map_err(|err| RunComposeError::new_parse_error(err, commands))?;

        let mut document = ComposeDocument::new();
        let mut comments = Vec::new();
        let mut resources = ResourceCollector::new();
        let mut services_len = 0;

        for command in parsed {
            match command {
                Command::Ignored(text) => comments.push(format!("# ignored : {text}")),
                Command::Service(service) => {
                    document.add_service(&service);
                    resources.scan(service.tree());
                    services_len += 1;

                    if !service.ignored_options().is_empty() {
                        comments.push(format!("# ignored options for '{}'", service.name()));
                        comments.extend(
                            service
                                .ignored_options()
                                .iter()
                                .map(|option| format!("# {option}")),
                        );
                    }
                }
            }
        }

        if services_len == 0 {
            return Err(RunComposeError::NoInvocation);
        }

        comments.extend(resources.declare_all(&mut document));

        debug!(services_len = services_len, comments_len = comments.len(); "Commands translated");
        trace!(document:? = document; "Generated document");
        Ok(Translation::new(document, comments))
    }

    /// Merge a translation on top of an existing Compose document.
    ///
    /// Services and resources of the translation are deep merged into the
    /// existing definitions. Empty text leaves the translation unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`RunComposeError::ExistingDocument`] if `existing` is not
    /// YAML or its root is not a mapping.
    pub fn merge_existing(
        &self,
        translation: Translation,
        existing: &str,
    ) -> Result<Translation, RunComposeError> {
        if existing.trim().is_empty() {
            return Ok(translation);
        }

        let root = match serde_yaml::from_str::<Value>(existing)
            .map_err(|err| RunComposeError::ExistingDocument(err.to_string()))?
        {
            Value::Null => return Ok(translation),
            Value::Mapping(root) => root,
            other => {
                return Err(RunComposeError::ExistingDocument(format!(
                    "expected a mapping at the top level, found {}",
                    value_kind(&other)
                )));
            }
        };

        info!(keys_len = root.len(); "Merging onto existing document");
        let (generated, comments) = translation.into_parts();
        let mut document = ComposeDocument::from_mapping(root);
        document.merge(generated);
        Ok(Translation::new(document, comments))
    }

    /// Render a translation as YAML text.
    ///
    /// The document is migrated to the configured dialect first. Comments
    /// come before the document, separated by a blank line.
    pub fn render(&self, translation: &Translation) -> String {
        let render = self.config.render();
        info!(dialect:? = render.dialect(), indent = render.indent(); "Rendering document");

        let document = self
            .migrator
            .migrate(translation.document().clone(), render.dialect());
        let yaml = YamlEmitter::new(render.indent()).emit(document.root());

        if translation.comments().is_empty() {
            yaml
        } else {
            format!("{}\n\n{yaml}", translation.comments().join("\n"))
        }
    }

    /// Parse, merge and render in one call.
    ///
    /// # Errors
    ///
    /// See [`ComposeBuilder::parse`] and [`ComposeBuilder::merge_existing`].
    pub fn translate(
        &self,
        commands: &str,
        existing: Option<&str>,
    ) -> Result<String, RunComposeError> {
        let translation = self.parse(commands)?;
        let translation = match existing {
            Some(existing) => self.merge_existing(translation, existing)?,
            None => translation,
        };
        Ok(self.render(&translation))
    }
}

/// Translate docker commands into a Compose document.
///
/// # Arguments
///
/// * `commands` - One or more docker commands
/// * `existing` - A Compose document to merge the result into
/// * `dialect` - `latest`, `v2x` or `v3x`
/// * `indent` - Spaces per nesting level
///
/// # Errors
///
/// Returns [`RunComposeError::Dialect`] for an unknown dialect before any
/// command is parsed, and the errors of [`ComposeBuilder::translate`].
///
/// # Examples
///
/// ```
/// let yaml = runcompose::translate("docker run --restart always redis", None, "latest", 2)
///     .expect("Failed to translate");
/// assert_eq!(yaml, "services:\n  redis:\n    restart: always\n    image: redis\n");
/// ```
pub fn translate(
    commands: &str,
    existing: Option<&str>,
    dialect: &str,
    indent: usize,
) -> Result<String, RunComposeError> {
    let dialect: Dialect = dialect.parse()?;
    let config = AppConfig::new(RenderConfig::new(indent, dialect));
    ComposeBuilder::new(config).translate(commands, existing)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
