//! Snapshot collaborator interfaces
//!
//! The bundle builder does not read from a database itself; the embedding
//! client hands it snapshots. These traits are the seam: a document snapshot
//! exposes its identity, existence, read time, and document-protocol
//! payload; a query snapshot exposes its read time, matched documents, and
//! an opaque encoding of its originating query definition.
//!
//! [`OwnedDocumentSnapshot`] and [`OwnedQuerySnapshot`] are plain owned
//! implementations for embedders (and tests) that do not have their own
//! snapshot types.

use crate::error::{BundleError, BundleResult};
use crate::timestamp::Timestamp;
use serde_json::Value;

/// A single document as read from the database at a point in time
pub trait DocumentSnapshot {
    /// Full document path, the deduplication key (e.g. `"coll/doc1"`)
    fn name(&self) -> &str;

    /// Whether the document existed at read time
    fn exists(&self) -> bool;

    /// When the document was read
    fn read_time(&self) -> Timestamp;

    /// The document-protocol payload
    ///
    /// Only invoked when [`exists`](DocumentSnapshot::exists) is true; a
    /// failure here propagates unchanged to the caller of the add operation.
    fn to_document_proto(&self) -> BundleResult<Value>;
}

/// The result set of a query as read at a point in time
pub trait QuerySnapshot {
    /// Snapshot type of the matched documents
    type Document: DocumentSnapshot;

    /// When the result set was read
    fn read_time(&self) -> Timestamp;

    /// The matched documents, in result order
    fn documents(&self) -> &[Self::Document];

    /// Opaque encoding of the originating query definition
    fn to_bundled_query(&self) -> BundleResult<Value>;
}

/// Plain owned document snapshot
///
/// The constructors uphold the invariant that a payload is present if and
/// only if the document existed.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedDocumentSnapshot {
    name: String,
    read_time: Timestamp,
    document: Option<Value>,
}

impl OwnedDocumentSnapshot {
    /// Snapshot of a document that existed at read time
    pub fn existing(name: impl Into<String>, read_time: Timestamp, document: Value) -> Self {
        Self {
            name: name.into(),
            read_time,
            document: Some(document),
        }
    }

    /// Snapshot of a document that did not exist at read time
    pub fn missing(name: impl Into<String>, read_time: Timestamp) -> Self {
        Self {
            name: name.into(),
            read_time,
            document: None,
        }
    }
}

impl DocumentSnapshot for OwnedDocumentSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self) -> bool {
        self.document.is_some()
    }

    fn read_time(&self) -> Timestamp {
        self.read_time
    }

    fn to_document_proto(&self) -> BundleResult<Value> {
        self.document
            .clone()
            .ok_or_else(|| BundleError::snapshot(format!("document `{}` has no payload", self.name)))
    }
}

/// Plain owned query-result snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedQuerySnapshot {
    read_time: Timestamp,
    bundled_query: Value,
    documents: Vec<OwnedDocumentSnapshot>,
}

impl OwnedQuerySnapshot {
    /// Create a query snapshot from its encoded definition and result set
    pub fn new(
        read_time: Timestamp,
        bundled_query: Value,
        documents: Vec<OwnedDocumentSnapshot>,
    ) -> Self {
        Self {
            read_time,
            bundled_query,
            documents,
        }
    }
}

impl QuerySnapshot for OwnedQuerySnapshot {
    type Document = OwnedDocumentSnapshot;

    fn read_time(&self) -> Timestamp {
        self.read_time
    }

    fn documents(&self) -> &[OwnedDocumentSnapshot] {
        &self.documents
    }

    fn to_bundled_query(&self) -> BundleResult<Value> {
        Ok(self.bundled_query.clone())
    }
}
