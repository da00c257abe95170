//! Export of finished Compose documents.
//!
//! This is the final stage of the translation pipeline.
//!
//! # Pipeline Position
//!
//! ```text
//! Command Text
//!     ↓ parse
//! Services
//!     ↓ merge (+ existing document)
//! Compose Document
//!     ↓ migrate
//! Dialect Document
//!     ↓ export (this module)
//! YAML Text
//! ```
//!
//! # Available Backends
//!
//! - [`yaml`] - Block-style YAML via [`yaml::YamlEmitter`]

/// YAML export backend.
pub mod yaml;
