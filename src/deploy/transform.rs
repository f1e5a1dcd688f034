// SPDX-FileCopyrightText: 2026 Promptstow Contributors
// SPDX-License-Identifier: MIT

//! Cross-reference rewriting for command documents.
//!
//! Pristine command documents point at knowledge documents through a bare
//! marker token. At install time every occurrence of the marker is replaced
//! with the resolved target's addressing prefix so the reference resolves
//! from wherever the document lands. This is a literal all-occurrences
//! substitution, not a templating pass: no other byte of the document is
//! touched, and the rewrite always starts from pristine source text.

/// Literal reference prefix used in pristine command documents.
pub const KNOWLEDGE_MARKER: &str = "@knowledge/";

/// Replace every knowledge marker with the target's addressing prefix.
pub fn rewrite_references(text: &str, addressing_prefix: &str) -> String {
    text.replace(KNOWLEDGE_MARKER, &format!("@{addressing_prefix}/"))
}
