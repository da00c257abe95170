//! Dialect migration of finished documents.
//!
//! The generated document follows the Compose specification. A [`Migrator`]
//! rewrites it for the requested [`Dialect`] right before rendering.

use log::{debug, trace};
use serde_yaml::{Mapping, Value};

use runcompose_core::{
    compose::{ComposeDocument, ResourceKind, SERVICES_KEY},
    dialect::Dialect,
};

const VERSION_KEY: &str = "version";
const V2_VERSION: &str = "2.4";
const V3_VERSION: &str = "3";

/// Deploy resource keys and the v2 service keys they become.
const V2_RESOURCE_KEYS: [(&str, &str, &str); 4] = [
    ("limits", "cpus", "cpus"),
    ("limits", "memory", "mem_limit"),
    ("limits", "pids", "pids_limit"),
    ("reservations", "memory", "mem_reservation"),
];

/// Rewrites a document for a target dialect.
pub trait Migrator: Send + Sync {
    /// Migrate `document` to `dialect`.
    fn migrate(&self, document: ComposeDocument, dialect: Dialect) -> ComposeDocument;
}

/// The migrator used unless another one is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMigrator;

impl Migrator for BuiltinMigrator {
    fn migrate(&self, document: ComposeDocument, dialect: Dialect) -> ComposeDocument {
        debug!(dialect:? = dialect; "Migrating document");
        let root = document.into_mapping();
        let root = match dialect {
            Dialect::Latest => to_latest(root),
            Dialect::V3x => to_v3(root),
            Dialect::V2x => to_v2(root),
        };
        ComposeDocument::from_mapping(root)
    }
}

fn to_latest(root: Mapping) -> Mapping {
    let root = root
        .into_iter()
        .filter(|(key, _)| key.as_str() != Some(VERSION_KEY))
        .collect();
    map_resource_sections(root, rewrite_legacy_external)
}

/// Apply `rewrite` to the top-level `volumes` and `networks` mappings.
fn map_resource_sections(root: Mapping, rewrite: fn(Mapping) -> Mapping) -> Mapping {
    root.into_iter()
        .map(|(key, value)| {
            let is_resource_section = [ResourceKind::Volume, ResourceKind::Network]
                .iter()
                .any(|kind| key.as_str() == Some(kind.section()));
            match value {
                Value::Mapping(resources) if is_resource_section => {
                    (key, Value::Mapping(rewrite(resources)))
                }
                value => (key, value),
            }
        })
        .collect()
}

/// Rewrite `external: {name: x}` into `external: true` and `name: x`.
fn rewrite_legacy_external(resources: Mapping) -> Mapping {
    resources
        .into_iter()
        .map(|(name, declaration)| {
            let Value::Mapping(declaration) = declaration else {
                return (name, declaration);
            };

            let legacy_name = declaration
                .get("external")
                .and_then(Value::as_mapping)
                .and_then(|external| external.get("name"))
                .cloned();
            let Some(legacy_name) = legacy_name else {
                return (name, Value::Mapping(declaration));
            };

            trace!(resource:? = name; "Rewriting legacy external declaration");
            let has_name = declaration.contains_key("name");
            let mut rewritten = Mapping::new();
            for (key, value) in declaration {
                if key.as_str() == Some("external") {
                    rewritten.insert(key, Value::Bool(true));
                    if !has_name {
                        rewritten.insert(Value::from("name"), legacy_name.clone());
                    }
                } else {
                    rewritten.insert(key, value);
                }
            }
            (name, Value::Mapping(rewritten))
        })
        .collect()
}

/// Rewrite `external: true` and `name: x` into `external: {name: x}`.
///
/// Top-level `name` on volumes needs 3.4 and on networks 3.5, while the
/// nested form is accepted by every 3.x file.
fn rewrite_modern_external(resources: Mapping) -> Mapping {
    resources
        .into_iter()
        .map(|(name, declaration)| {
            let Value::Mapping(declaration) = declaration else {
                return (name, declaration);
            };
            let is_external = declaration.get("external") == Some(&Value::Bool(true));
            let external_name = declaration.get("name").cloned().filter(|_| is_external);
            let Some(external_name) = external_name else {
                return (name, Value::Mapping(declaration));
            };

            trace!(resource:? = name; "Rewriting external declaration for v3");
            let mut nested = Mapping::new();
            nested.insert(Value::from("name"), external_name);
            let rewritten = declaration
                .into_iter()
                .filter(|(key, _)| key.as_str() != Some("name"))
                .map(|(key, value)| match key.as_str() {
                    Some("external") => (key, Value::Mapping(nested.clone())),
                    _ => (key, value),
                })
                .collect();
            (name, Value::Mapping(rewritten))
        })
        .collect()
}

fn to_v3(root: Mapping) -> Mapping {
    let version = root
        .get(VERSION_KEY)
        .cloned()
        .unwrap_or_else(|| Value::from(V3_VERSION));
    let root = map_resource_sections(root, rewrite_modern_external);
    with_version_first(root, version)
}

fn to_v2(root: Mapping) -> Mapping {
    let mut root = with_version_first(root, Value::from(V2_VERSION));
    if let Some(Value::Mapping(services)) = root.get_mut(SERVICES_KEY) {
        for service in services.values_mut() {
            if let Value::Mapping(service) = service {
                move_deploy_resources(service);
            }
        }
    }
    root
}

fn with_version_first(root: Mapping, version: Value) -> Mapping {
    std::iter::once((Value::from(VERSION_KEY), version))
        .chain(
            root.into_iter()
                .filter(|(key, _)| key.as_str() != Some(VERSION_KEY)),
        )
        .collect()
}

/// Move `deploy/resources` limits into v2 service keys.
fn move_deploy_resources(service: &mut Mapping) {
    let Some(Value::Mapping(deploy)) = service.get_mut("deploy") else {
        return;
    };

    let mut moved = Vec::new();
    if let Some(Value::Mapping(resources)) = deploy.get_mut("resources") {
        for (section, key, v2_key) in V2_RESOURCE_KEYS {
            let Some(Value::Mapping(section)) = resources.get_mut(section) else {
                continue;
            };
            if let Some(value) = take(section, key) {
                moved.push((v2_key, value));
            }
        }
        prune_empty(resources, &["limits", "reservations"]);
    }
    prune_empty(deploy, &["resources"]);
    let deploy_is_empty = deploy.is_empty();

    if deploy_is_empty {
        *service = std::mem::take(service)
            .into_iter()
            .filter(|(key, _)| key.as_str() != Some("deploy"))
            .collect();
    }
    for (v2_key, value) in moved {
        trace!(key = v2_key; "Moved deploy resource to v2 key");
        service.insert(Value::from(v2_key), value);
    }
}

/// Remove `key` from `mapping` without disturbing the order of the rest.
fn take(mapping: &mut Mapping, key: &str) -> Option<Value> {
    let value = mapping.get(key).cloned()?;
    *mapping = std::mem::take(mapping)
        .into_iter()
        .filter(|(k, _)| k.as_str() != Some(key))
        .collect();
    Some(value)
}

fn prune_empty(mapping: &mut Mapping, keys: &[&str]) {
    for key in keys {
        let is_empty = mapping
            .get(*key)
            .and_then(Value::as_mapping)
            .is_some_and(Mapping::is_empty);
        if is_empty {
            take(mapping, key);
        }
    }
}
