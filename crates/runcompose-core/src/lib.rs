//! Runcompose Core Types and Definitions
//!
//! This crate provides the foundational types shared by the runcompose
//! parser and facade crates. It includes:
//!
//! - **Entries**: Atomic `(path, value)` translation units ([`entry::Entry`])
//! - **Rules**: Flag rules and transformer tags ([`rule::FlagRule`], [`rule::Transform`])
//! - **Tree**: Path materialization and deep merging ([`tree`] module)
//! - **Compose**: Services and Compose documents ([`compose`] module)
//! - **Dialect**: Target Compose schema dialects ([`dialect::Dialect`])

pub mod compose;
pub mod dialect;
pub mod entry;
pub mod rule;
pub mod tree;
