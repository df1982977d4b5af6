//! # Manifest Splitter
//!
//! Splits a configuration entry into manifest documents on the literal
//! `---` token. The token is matched anywhere in the text, not only on its
//! own line, and document order is preserved.

use crate::constants::DOCUMENT_SEPARATOR;

/// One `---`-delimited unit of a configuration entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestDocument<'a> {
    /// Position of the document within its entry, starting at 0
    pub index: usize,
    pub text: &'a str,
}

impl ManifestDocument<'_> {
    /// Whether the document holds nothing but whitespace
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split an entry into its documents, in order
#[must_use]
pub fn split_documents(blob: &str) -> Vec<ManifestDocument<'_>> {
    blob.split(DOCUMENT_SEPARATOR)
        .enumerate()
        .map(|(index, text)| ManifestDocument { index, text })
        .collect()
}
