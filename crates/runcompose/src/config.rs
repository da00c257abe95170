//! Configuration types for runcompose rendering.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources such as a TOML file.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level application configuration.
//! - [`RenderConfig`] - Controls the target [`Dialect`] and YAML indentation.
//!
//! # Example
//!
//! ```
//! # use runcompose::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert_eq!(config.render().indent(), 4);
//! ```

use serde::Deserialize;

use runcompose_core::dialect::Dialect;

/// Indentation used when nothing else is configured.
pub const DEFAULT_INDENT: usize = 4;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Render configuration section.
    #[serde(default)]
    render: RenderConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified render configuration.
    pub fn new(render: RenderConfig) -> Self {
        Self { render }
    }

    /// Returns the render configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }

    /// Returns a mutable reference to the render configuration.
    pub fn render_mut(&mut self) -> &mut RenderConfig {
        &mut self.render
    }
}

/// Output settings for rendered documents.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Spaces per nesting level.
    #[serde(default = "default_indent")]
    indent: usize,

    /// Target Compose schema.
    #[serde(default)]
    dialect: Dialect,
}

fn default_indent() -> usize {
    DEFAULT_INDENT
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            dialect: Dialect::default(),
        }
    }
}

impl RenderConfig {
    /// Creates a new [`RenderConfig`].
    ///
    /// # Arguments
    ///
    /// * `indent` - Spaces per nesting level. Zero is raised to one.
    /// * `dialect` - Target Compose schema.
    pub fn new(indent: usize, dialect: Dialect) -> Self {
        Self {
            indent: indent.max(1),
            dialect,
        }
    }

    /// Returns the indentation width, never less than one.
    pub fn indent(&self) -> usize {
        self.indent.max(1)
    }

    /// Returns the target dialect.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Overrides the indentation width.
    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent.max(1);
    }

    /// Overrides the target dialect.
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
    }
}
