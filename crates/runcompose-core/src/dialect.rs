//! Target Compose schema dialects.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Errors produced while selecting a dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    #[error("unknown compose dialect '{0}' (expected one of: latest, v2x, v3x)")]
    Unknown(String),
}

/// The schema variant a finished document is rendered in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// The Compose specification, without a `version` header.
    #[default]
    Latest,
    /// Compose file format 2.x.
    V2x,
    /// Compose file format 3.x.
    V3x,
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Dialect; 3] = [Dialect::Latest, Dialect::V2x, Dialect::V3x];

    /// Returns the name used on the command line and in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Latest => "latest",
            Dialect::V2x => "v2x",
            Dialect::V3x => "v3x",
        }
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|dialect| dialect.as_str() == s)
            .ok_or_else(|| DialectError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("latest".parse::<Dialect>(), Ok(Dialect::Latest));
        assert_eq!("v2x".parse::<Dialect>(), Ok(Dialect::V2x));
        assert_eq!("v3x".parse::<Dialect>(), Ok(Dialect::V3x));
    }

    #[test]
    fn test_unknown_dialect() {
        let err = "xxx".parse::<Dialect>().unwrap_err();
        assert_eq!(err, DialectError::Unknown("xxx".to_string()));
        assert!(err.to_string().contains("'xxx'"));
    }

    #[test]
    fn test_dialect_roundtrips_through_display() {
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_dialect_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            dialect: Dialect,
        }

        let wrapper: Wrapper = serde_yaml::from_str("dialect: v3x").unwrap();
        assert_eq!(wrapper.dialect, Dialect::V3x);
        assert!(serde_yaml::from_str::<Wrapper>("dialect: v4x").is_err());
    }
}
