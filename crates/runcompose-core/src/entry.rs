//! Atomic translation units.
//!
//! An [`Entry`] pairs a slash-delimited path with the value that should end
//! up at that location of a service tree. Value transformers produce entries,
//! and the [`tree`](crate::tree) module materializes them.

use std::fmt;

use serde_yaml::Value;

/// Path segment substituted with the invocation's network name.
///
/// Rules such as `--ip` target `networks/{network}/ipv4_address`; the
/// placeholder is resolved with [`Entry::with_network`] before the entry is
/// materialized.
pub const NETWORK_PLACEHOLDER: &str = "{network}";

/// A `(path, value)` pair produced by a value transformer.
///
/// # Examples
///
/// ```
/// use runcompose_core::entry::Entry;
///
/// let entry = Entry::new("deploy/resources/limits/memory", "512m");
/// assert_eq!(entry.segments().count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    path: String,
    value: Value,
}

impl Entry {
    /// Create a new entry.
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Returns the slash-delimited target path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the value placed at the end of the path.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the entry and returns its value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// Returns `true` when the entry contributes nothing to a tree.
    pub fn is_inert(&self) -> bool {
        self.segments().next().is_none()
    }

    /// Iterates over the non-empty path segments.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    /// Substitute the [`NETWORK_PLACEHOLDER`] segment with `network`.
    pub fn with_network(self, network: &str) -> Self {
        if !self.path.contains(NETWORK_PLACEHOLDER) {
            return self;
        }

        Self {
            path: self.path.replace(NETWORK_PLACEHOLDER, network),
            value: self.value,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {:?}", self.path, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_skip_empty() {
        let entry = Entry::new("/logging//driver/", "syslog");
        let segments: Vec<_> = entry.segments().collect();
        assert_eq!(segments, vec!["logging", "driver"]);
    }

    #[test]
    fn test_empty_path_is_inert() {
        assert!(Entry::new("", true).is_inert());
        assert!(!Entry::new("privileged", true).is_inert());
    }

    #[test]
    fn test_with_network_substitutes_placeholder() {
        let entry = Entry::new("networks/{network}/ipv4_address", "10.0.0.2").with_network("backend");
        assert_eq!(entry.path(), "networks/backend/ipv4_address");
        assert_eq!(entry.value(), &Value::from("10.0.0.2"));
    }

    #[test]
    fn test_with_network_leaves_plain_paths() {
        let entry = Entry::new("hostname", "web").with_network("backend");
        assert_eq!(entry.path(), "hostname");
    }
}
