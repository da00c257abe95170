//! Flag rules and transformer tags.
//!
//! A [`FlagRule`] tells the elaborator where a docker CLI flag lands in the
//! Compose service tree and which [`Transform`] turns its raw value into
//! entries. Rules are immutable and live in the parser's flag registry.

use std::fmt;

/// The closed set of value encodings a docker CLI flag can carry.
///
/// Each variant is handled by exactly one transformer function in the parser,
/// so adding a variant is a compile error until it is handled there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    /// Arbitrary text stored verbatim (e.g. `--restart`).
    Value,
    /// Base-10 integer (e.g. `--cpu-shares`).
    Int,
    /// Floating-point number (e.g. `--cpus`).
    Float,
    /// Boolean switch (e.g. `--privileged`).
    Switch,
    /// List of strings, one per occurrence (e.g. `--publish`).
    Array,
    /// Comma separated `key=value` pairs merged into one map (e.g. `--log-opt`).
    Map,
    /// Comma separated `key=value` pairs, one map per occurrence (e.g. `--mount`).
    MapArray,
    /// Environment assignments (`KEY=VALUE` or bare `KEY`).
    Envs,
    /// Resource limits in the `<name>=<soft>[:<hard>]` format.
    Ulimits,
    /// Block device I/O rates in the `<path>:<rate>` format.
    DeviceRate,
    /// Block device weights in the `<path>:<weight>` format.
    DeviceWeight,
    /// GPU reservation requests (`all`, a count, or `device=<ids>`).
    Gpus,
    /// Network mode or named network attachment.
    Networks,
    /// Recognized flag without any Compose counterpart.
    Ignore,
}

impl Transform {
    /// Returns `true` if the transformer needs a value following the flag.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Transform::Switch | Transform::Ignore)
    }

    /// Returns a short name used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transform::Value => "value",
            Transform::Int => "int",
            Transform::Float => "float",
            Transform::Switch => "switch",
            Transform::Array => "array",
            Transform::Map => "map",
            Transform::MapArray => "map-array",
            Transform::Envs => "envs",
            Transform::Ulimits => "ulimits",
            Transform::DeviceRate => "device-rate",
            Transform::DeviceWeight => "device-weight",
            Transform::Gpus => "gpus",
            Transform::Networks => "networks",
            Transform::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable mapping from a docker CLI flag to a Compose location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagRule {
    transform: Transform,
    path: &'static str,
}

impl FlagRule {
    /// Create a rule that transforms values with `transform` into `path`.
    pub const fn new(transform: Transform, path: &'static str) -> Self {
        Self { transform, path }
    }

    /// Create a rule for a flag that is recognized but produces no output.
    pub const fn inert() -> Self {
        Self::new(Transform::Ignore, "")
    }

    /// Returns the transformer tag.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Returns the slash-delimited target path.
    pub fn path(&self) -> &'static str {
        self.path
    }

    /// Returns `true` if the flag is recognized but intentionally dropped.
    pub fn is_inert(&self) -> bool {
        self.path.is_empty()
    }
}
