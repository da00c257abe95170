//! Named resources referenced by services.
//!
//! A service can mount a named volume (`-v data:/var/lib/data`) or join a
//! user-defined network (`--network backend`). Neither exists unless it is
//! declared at the top level of the document, so every name found here is
//! declared as `external` and gets an advisory comment.

use indexmap::IndexSet;
use log::debug;
use serde_yaml::{Mapping, Value};

use runcompose_core::compose::{ComposeDocument, ResourceKind};
use runcompose_parser::DEFAULT_NETWORK;

/// A named volume or network referenced by a service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedResource {
    kind: ResourceKind,
    name: String,
}

impl NamedResource {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// One comment line telling the user how to provide the resource.
    pub fn advisory(&self) -> String {
        format!(
            "# named {kind} '{name}' is declared external: create it with 'docker {kind} create {name}' or remove 'external: true'",
            kind = self.kind,
            name = self.name,
        )
    }
}

/// Collects named resources across services, keeping first-seen order.
#[derive(Debug, Default)]
pub struct ResourceCollector {
    resources: IndexSet<NamedResource>,
}

impl ResourceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every named volume and network of one service tree.
    pub fn scan(&mut self, service_tree: &Mapping) {
        for name in named_volumes(service_tree) {
            self.resources.insert(NamedResource::new(ResourceKind::Volume, name));
        }
        for name in named_networks(service_tree) {
            self.resources.insert(NamedResource::new(ResourceKind::Network, name));
        }
    }

    /// Returns the distinct resources found so far.
    pub fn resources(&self) -> impl Iterator<Item = &NamedResource> {
        self.resources.iter()
    }

    /// Declare every resource as external in `document`.
    ///
    /// Returns one advisory comment line per resource.
    pub fn declare_all(&self, document: &mut ComposeDocument) -> Vec<String> {
        self.resources
            .iter()
            .map(|resource| {
                debug!(kind:? = resource.kind(), name = resource.name(); "Declaring named resource");
                document.declare_external(resource.kind(), resource.name());
                resource.advisory()
            })
            .collect()
    }
}

/// Returns `true` if a volume source names a volume rather than a host path.
pub fn is_named_volume(source: &str) -> bool {
    !source.is_empty() && !source.contains(['/', '\\', '$', '<', '>'])
}

fn named_volumes(service_tree: &Mapping) -> Vec<&str> {
    let Some(volumes) = service_tree.get("volumes").and_then(Value::as_sequence) else {
        return Vec::new();
    };

    volumes
        .iter()
        .filter_map(|volume| match volume {
            Value::String(short) => short.split(':').next(),
            Value::Mapping(long) => long
                .get("source")
                .or_else(|| long.get("src"))
                .and_then(Value::as_str),
            _ => None,
        })
        .filter(|source| is_named_volume(source))
        .collect()
}

fn named_networks(service_tree: &Mapping) -> Vec<&str> {
    let names: Vec<&str> = match service_tree.get("networks") {
        Some(Value::Mapping(networks)) => networks.keys().filter_map(Value::as_str).collect(),
        Some(Value::Sequence(networks)) => networks.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    names
        .into_iter()
        .filter(|name| !name.is_empty() && *name != DEFAULT_NETWORK)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn collect(yaml: &str) -> Vec<NamedResource> {
        let mut collector = ResourceCollector::new();
        collector.scan(&tree(yaml));
        collector.resources().cloned().collect()
    }

    #[test]
    fn test_is_named_volume() {
        assert!(is_named_volume("data"));
        assert!(is_named_volume("pg_data-1"));
        assert!(!is_named_volume(""));
        assert!(!is_named_volume("/srv/data"));
        assert!(!is_named_volume("./data"));
        assert!(!is_named_volume("$PWD"));
        assert!(!is_named_volume("C:\\data"));
    }

    #[test]
    fn test_short_and_long_volume_forms() {
        let resources = collect(
            "volumes: ['vol:/tmp', '/abs:/abs', '$VAR:/x', {type: volume, source: cache, target: /c}, {type: tmpfs, target: /t}]",
        );
        assert_eq!(
            resources,
            vec![
                NamedResource::new(ResourceKind::Volume, "vol"),
                NamedResource::new(ResourceKind::Volume, "cache"),
            ]
        );
    }

    #[test]
    fn test_networks_skip_default() {
        let resources = collect("networks: {default: {ipv4_address: 1.2.3.4}, backend: {}}");
        assert_eq!(resources, vec![NamedResource::new(ResourceKind::Network, "backend")]);

        let resources = collect("networks: [front, default]");
        assert_eq!(resources, vec![NamedResource::new(ResourceKind::Network, "front")]);
    }

    #[test]
    fn test_distinct_across_services() {
        let mut collector = ResourceCollector::new();
        collector.scan(&tree("volumes: ['data:/a']"));
        collector.scan(&tree("volumes: ['data:/b']"));
        assert_eq!(collector.resources().count(), 1);
    }

    #[test]
    fn test_declare_all() {
        let mut collector = ResourceCollector::new();
        collector.scan(&tree("volumes: ['vol:/tmp']\nnetworks: {backend: {}}"));

        let mut document = ComposeDocument::new();
        let comments = collector.declare_all(&mut document);

        let expected = tree(
            "volumes: {vol: {external: true, name: vol}}\nnetworks: {backend: {external: true, name: backend}}",
        );
        assert_eq!(document.root(), &expected);
        assert_eq!(
            comments[0],
            "# named volume 'vol' is declared external: create it with 'docker volume create vol' or remove 'external: true'"
        );
        assert!(comments[1].contains("'docker network create backend'"));
    }
}
