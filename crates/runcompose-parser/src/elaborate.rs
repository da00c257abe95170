//! Elaboration of invocations into services.
//!
//! The [`Builder`] resolves every flag of an [`Invocation`] against the flag
//! registry, runs the value transformers, materializes the resulting entries
//! into the service tree, and attaches the image and command. Flags without a
//! rule become ignored options.

use log::{debug, trace};
use runcompose_core::{
    compose::{IgnoredOption, Service},
    rule::Transform,
    tree,
};
use serde_yaml::{Mapping, Value};

use crate::{
    builtin_flags::FlagRegistry,
    error::{DiagnosticCollector, ParseError},
    invocation::Invocation,
    lexer, transform,
};

/// Service name used when the invocation names no image.
pub const INVALID_SERVICE_NAME: &str = "!!!invalid!!!";

/// Network that `{network}` paths resolve to without `--network`.
pub const DEFAULT_NETWORK: &str = "default";

/// Derive the service name from an image reference.
///
/// The name is the last path component of the reference, without its tag
/// or digest.
///
/// # Examples
///
/// ```
/// use runcompose_parser::service_name;
///
/// assert_eq!(service_name(Some("registry.example.com:5000/team/api:1.2")), "api");
/// assert_eq!(service_name(Some("redis@sha256:abcd")), "redis");
/// assert_eq!(service_name(None), "!!!invalid!!!");
/// ```
pub fn service_name(image: Option<&str>) -> String {
    let name = image
        .and_then(|image| image.rsplit('/').next())
        .and_then(|last| last.split('@').next())
        .and_then(|last| last.split(':').next())
        .unwrap_or_default();

    if name.is_empty() {
        INVALID_SERVICE_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Turns invocations into services using a flag registry.
pub struct Builder<'r> {
    registry: &'r FlagRegistry,
}

impl<'r> Builder<'r> {
    pub fn new(registry: &'r FlagRegistry) -> Self {
        Self { registry }
    }

    /// Build the service for one invocation.
    ///
    /// # Errors
    ///
    /// Returns every flag value that failed validation.
    pub fn build(&self, invocation: &Invocation) -> Result<Service, ParseError> {
        let network = self.network_name(invocation);
        debug!(subcommand:? = invocation.subcommand(), network = network; "Elaborating invocation");

        let mut service_tree = Mapping::new();
        let mut ignored_options = Vec::new();
        let mut diagnostics = DiagnosticCollector::new();

        for (name, flag) in invocation.flags() {
            let Some(rule) = self.registry.get(name) else {
                debug!(flag = name; "Ignoring unknown flag");
                ignored_options.push(IgnoredOption::new(name.as_str(), flag.value().joined()));
                continue;
            };

            if rule.is_inert() {
                trace!(flag = name; "Dropping inert flag");
                continue;
            }

            if rule.transform() != Transform::Switch && flag.value().is_switch() {
                debug!(flag = name; "Flag is missing its value");
                ignored_options.push(IgnoredOption::new(name.as_str(), None));
                continue;
            }

            match transform::transform(rule, flag.value()) {
                Ok(entries) => {
                    for entry in entries {
                        let entry = entry.with_network(network);
                        trace!(entry:? = entry; "Applying entry");
                        tree::apply(&mut service_tree, &entry);
                    }
                }
                Err(err) => diagnostics.emit(err.into_diagnostic(name, flag.span())),
            }
        }

        diagnostics.finish()?;

        let mut positionals = invocation.positionals().iter();
        let image = positionals.next().map(|word| word.text());
        service_tree.insert(
            Value::from("image"),
            image.map_or(Value::Null, Value::from),
        );

        // Compose splits `command` like a shell, so quoting is restored.
        let command: Vec<_> = positionals.map(|word| lexer::quote(word.text())).collect();
        if !command.is_empty() {
            service_tree.insert(Value::from("command"), Value::from(command.join(" ")));
        }

        let name = service_name(image);
        debug!(
            service = name,
            ignored_len = ignored_options.len();
            "Service elaborated",
        );
        Ok(Service::new(name, service_tree, ignored_options))
    }

    /// The network `{network}` paths resolve to: `--net`, then `--network`,
    /// then the default network.
    fn network_name<'i>(&self, invocation: &'i Invocation) -> &'i str {
        ["net", "network"]
            .into_iter()
            .find_map(|name| invocation.flag(name)?.value().last())
            .unwrap_or(DEFAULT_NETWORK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        assert_eq!(service_name(Some("nginx")), "nginx");
        assert_eq!(service_name(Some("nginx:latest")), "nginx");
        assert_eq!(service_name(Some("a/b:latest")), "b");
        assert_eq!(service_name(Some("ghcr.io/org/tool@sha256:00ff")), "tool");
        assert_eq!(service_name(Some("")), INVALID_SERVICE_NAME);
        assert_eq!(service_name(None), INVALID_SERVICE_NAME);
    }
}
