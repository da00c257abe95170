//! The result of translating command text.

use runcompose_core::compose::ComposeDocument;

/// A generated Compose document with the comments that accompany it.
///
/// Comments are complete lines starting with `#`: ignored commands, ignored
/// options and advisories for named resources, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    document: ComposeDocument,
    comments: Vec<String>,
}

impl Translation {
    pub fn new(document: ComposeDocument, comments: Vec<String>) -> Self {
        Self { document, comments }
    }

    /// Returns the generated document.
    pub fn document(&self) -> &ComposeDocument {
        &self.document
    }

    /// Returns the comment lines.
    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    /// Consumes the translation and returns its parts.
    pub fn into_parts(self) -> (ComposeDocument, Vec<String>) {
        (self.document, self.comments)
    }
}
