//! Bundle wire value types
//!
//! Types for the element payloads of the bundle stream. Every element is a
//! single-key JSON object; [`BundleElement`] is an externally tagged enum so
//! that shape falls out of serde directly.

use crate::error::{BundleError, BundleResult};
use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current bundle format version
///
/// Versions the framing + element-shape contract, not the document-protocol
/// payload format. Embedded verbatim in every metadata element.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Bundle-wide metadata, synthesized at build time
///
/// This is the first element of every bundle. `total_bytes` covers the
/// document/query section after this element, not the element itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleMetadata {
    /// Caller-supplied bundle identifier (opaque)
    pub id: String,

    /// Creation time = the maximum read time across all bundled inputs
    pub create_time: Timestamp,

    /// Format version (currently 1)
    pub version: u32,

    /// Number of distinct documents, existing and non-existing both counted
    pub total_documents: u64,

    /// Byte length of the encoded section after the metadata element
    pub total_bytes: u64,
}

/// Per-document metadata element
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Full document path
    pub name: String,

    /// When the document was read
    pub read_time: Timestamp,

    /// Whether the document existed at read time
    pub exists: bool,
}

/// A saved query definition and the read time of its result set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NamedQuery {
    /// Caller-assigned query name, unique within a bundle
    pub name: String,

    /// Opaque query-definition encoding from the query collaborator
    pub bundled_query: Value,

    /// When the result set was read
    pub read_time: Timestamp,
}

/// One accumulated document: metadata plus the payload when it existed
///
/// Invariant: `document` is `Some` if and only if `metadata.exists`.
#[derive(Debug, Clone, PartialEq)]
pub struct BundledDocument {
    metadata: DocumentMetadata,
    document: Option<Value>,
}

impl BundledDocument {
    /// Pair metadata with an optional payload, checking the exists invariant
    pub fn new(metadata: DocumentMetadata, document: Option<Value>) -> BundleResult<Self> {
        if metadata.exists != document.is_some() {
            return Err(BundleError::invalid_argument(
                "document",
                format!(
                    "payload presence must match the exists flag for `{}`",
                    metadata.name
                ),
            ));
        }
        Ok(Self { metadata, document })
    }

    /// The document's metadata
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// The document-protocol payload, present only for existing documents
    pub fn document(&self) -> Option<&Value> {
        self.document.as_ref()
    }
}

/// One element of the bundle stream
///
/// Serializes as a single-key JSON object whose key is exactly one of
/// `metadata`, `namedQuery`, `documentMetadata`, or `document`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum BundleElement {
    /// Bundle-wide metadata, always first in the stream
    Metadata(BundleMetadata),
    /// A saved named query
    NamedQuery(NamedQuery),
    /// Metadata for one document
    DocumentMetadata(DocumentMetadata),
    /// Document-protocol payload, follows its metadata element
    Document(Value),
}
