//! Bundle — streamable snapshot bundle format (v1)
//!
//! This module implements encoding of document snapshots and named query
//! results into a single self-describing byte stream that a client can
//! replay offline without contacting the server.
//!
//! ## Stream Structure
//!
//! ```text
//! bundle := metadata-element named-query-element* document-group*
//! element := length payload          (ASCII decimal length, no delimiter)
//! payload := single-key JSON object:
//!              {"metadata": …} | {"namedQuery": …}
//!            | {"documentMetadata": …} | {"document": …}
//! document-group := documentMetadata-element [document-element]
//! ```
//!
//! The metadata element carries aggregates (creation time, document count,
//! section byte length) that are only computable once all content is known,
//! yet it appears first; the encoder builds the document/query section and
//! prepends the metadata element last.
//!
//! ## Design Principles
//!
//! - **Streamable**: consumers parse elements one at a time via the length
//!   prefixes, without loading the whole buffer
//! - **Deduplicated**: documents are keyed by path, last write wins
//! - **Deterministic**: the same accumulation history always encodes to
//!   byte-identical output
//! - **Encode-only**: parsing bundles back is a separate concern

pub mod builder;
pub mod types;
pub mod writer;

// Re-export public types
pub use builder::BundleBuilder;
pub use types::{
    BundleElement, BundleMetadata, BundledDocument, DocumentMetadata, NamedQuery,
    BUNDLE_FORMAT_VERSION,
};
pub use writer::{BundleWriteInfo, BundleWriter};
