//! Services and Compose documents.
//!
//! This module contains the semantic model produced by the parser:
//!
//! - [`Service`]: one translated invocation, with its service tree and the
//!   flags that could not be translated.
//! - [`IgnoredOption`]: an unrecognized flag kept for user-facing comments.
//! - [`ComposeDocument`]: the accumulated multi-service document.
//! - [`ResourceKind`]: the kinds of top-level named resources.

use std::fmt;

use log::trace;
use serde_yaml::{Mapping, Value};

use crate::tree;

/// Top-level key holding the service definitions.
pub const SERVICES_KEY: &str = "services";

/// An unrecognized flag and its raw value.
///
/// Displays the way it was given on the command line, with a single dash for
/// one-character flags and without `=value` for switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredOption {
    flag: String,
    value: Option<String>,
}

impl IgnoredOption {
    /// Create a new ignored option record.
    pub fn new(flag: impl Into<String>, value: Option<String>) -> Self {
        Self {
            flag: flag.into(),
            value,
        }
    }

    /// Returns the flag name without leading dashes.
    pub fn flag(&self) -> &str {
        &self.flag
    }

    /// Returns the raw value, if the flag carried one.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for IgnoredOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dash = if self.flag.chars().count() == 1 { "-" } else { "--" };
        write!(f, "{dash}{}", self.flag)?;
        if let Some(value) = &self.value {
            write!(f, "={value}")?;
        }
        Ok(())
    }
}

/// One translated container invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    name: String,
    tree: Mapping,
    ignored_options: Vec<IgnoredOption>,
}

impl Service {
    /// Create a new service.
    ///
    /// # Arguments
    ///
    /// * `name` - Service name, derived from the image reference
    /// * `tree` - The service's Compose definition
    /// * `ignored_options` - Flags without a translation rule
    pub fn new(name: impl Into<String>, tree: Mapping, ignored_options: Vec<IgnoredOption>) -> Self {
        Self {
            name: name.into(),
            tree,
            ignored_options,
        }
    }

    /// Returns the service name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the service tree.
    pub fn tree(&self) -> &Mapping {
        &self.tree
    }

    /// Returns the image reference, if the invocation named one.
    pub fn image(&self) -> Option<&str> {
        self.tree.get("image").and_then(Value::as_str)
    }

    /// Returns the flags that were not translated.
    pub fn ignored_options(&self) -> &[IgnoredOption] {
        &self.ignored_options
    }
}

/// The kinds of top-level resources a service can reference by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Volume,
    Network,
}

impl ResourceKind {
    /// Returns the top-level Compose key declaring resources of this kind.
    pub fn section(&self) -> &'static str {
        match self {
            ResourceKind::Volume => "volumes",
            ResourceKind::Network => "networks",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::Network => write!(f, "network"),
        }
    }
}

/// A Compose document: `services` plus optional top-level resources.
///
/// # Examples
///
/// ```
/// use runcompose_core::compose::{ComposeDocument, ResourceKind};
///
/// let mut document = ComposeDocument::new();
/// document.declare_external(ResourceKind::Volume, "data");
/// assert!(!document.has_services());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeDocument {
    root: Mapping,
}

impl ComposeDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing top-level mapping.
    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    /// Returns the top-level mapping.
    pub fn root(&self) -> &Mapping {
        &self.root
    }

    /// Consumes the document and returns the top-level mapping.
    pub fn into_mapping(self) -> Mapping {
        self.root
    }

    /// Returns the `services` mapping, if present.
    pub fn services(&self) -> Option<&Mapping> {
        self.root.get(SERVICES_KEY).and_then(Value::as_mapping)
    }

    /// Returns the definition of the service called `name`.
    pub fn service(&self, name: &str) -> Option<&Mapping> {
        self.services()?.get(name).and_then(Value::as_mapping)
    }

    /// Returns `true` if at least one service is defined.
    pub fn has_services(&self) -> bool {
        self.services().is_some_and(|services| !services.is_empty())
    }

    /// Merge a service into the document.
    ///
    /// A service with a name that already exists is deep merged into the
    /// existing definition.
    pub fn add_service(&mut self, service: &Service) {
        trace!(service = service.name(); "Merging service into document");
        let services = tree::singleton(service.name(), Value::Mapping(service.tree().clone()));
        tree::merge_mapping(
            &mut self.root,
            tree::singleton(SERVICES_KEY, Value::Mapping(services)),
        );
    }

    /// Declare a named resource as external at the top level.
    pub fn declare_external(&mut self, kind: ResourceKind, name: &str) {
        trace!(kind:? = kind, name = name; "Declaring external resource");
        let mut declaration = Mapping::new();
        declaration.insert(Value::from("external"), Value::from(true));
        declaration.insert(Value::from("name"), Value::from(name));

        let resources = tree::singleton(name, Value::Mapping(declaration));
        tree::merge_mapping(
            &mut self.root,
            tree::singleton(kind.section(), Value::Mapping(resources)),
        );
    }

    /// Deep merge `overlay` on top of this document.
    pub fn merge(&mut self, overlay: ComposeDocument) {
        tree::merge_mapping(&mut self.root, overlay.root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(name: &str, yaml: &str) -> Service {
        Service::new(name, serde_yaml::from_str(yaml).unwrap(), Vec::new())
    }

    #[test]
    fn test_ignored_option_display() {
        assert_eq!(
            IgnoredOption::new("totally-unknown", Some("foo".to_string())).to_string(),
            "--totally-unknown=foo"
        );
        assert_eq!(IgnoredOption::new("x", None).to_string(), "-x");
        assert_eq!(
            IgnoredOption::new("publish-all", None).to_string(),
            "--publish-all"
        );
    }

    #[test]
    fn test_service_image() {
        let svc = service("nginx", "image: nginx:latest");
        assert_eq!(svc.image(), Some("nginx:latest"));
        assert_eq!(service("invalid", "image:").image(), None);
    }

    #[test]
    fn test_add_service_merges_same_name() {
        let mut document = ComposeDocument::new();
        document.add_service(&service("web", "ports: ['80:80']\nimage: nginx"));
        document.add_service(&service("web", "ports: ['443:443']\nimage: nginx"));

        let web = document.service("web").unwrap();
        assert_eq!(web.get("ports").and_then(Value::as_sequence).map(Vec::len), Some(2));
        assert_eq!(document.services().map(Mapping::len), Some(1));
    }

    #[test]
    fn test_declare_external_is_idempotent() {
        let mut document = ComposeDocument::new();
        document.declare_external(ResourceKind::Network, "backend");
        document.declare_external(ResourceKind::Network, "backend");

        let expected: Mapping =
            serde_yaml::from_str("networks: {backend: {external: true, name: backend}}").unwrap();
        assert_eq!(document.root(), &expected);
    }

    #[test]
    fn test_merge_onto_existing_document() {
        let mut existing = ComposeDocument::from_mapping(
            serde_yaml::from_str("services: {db: {image: postgres}}").unwrap(),
        );
        let mut generated = ComposeDocument::new();
        generated.add_service(&service("web", "image: nginx"));

        existing.merge(generated);

        assert!(existing.service("db").is_some());
        assert!(existing.service("web").is_some());
    }

    #[test]
    fn test_has_services() {
        assert!(!ComposeDocument::new().has_services());
        assert!(
            !ComposeDocument::from_mapping(serde_yaml::from_str("services: {}").unwrap())
                .has_services()
        );
    }
}
