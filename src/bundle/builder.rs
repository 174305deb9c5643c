//! Bundle accumulator
//!
//! [`BundleBuilder`] collects document snapshots and named query results,
//! deduplicates documents by path (last write wins), and tracks the
//! watermark — the maximum read time seen across every input — which
//! becomes the bundle's creation time.
//!
//! The add operations are the only mutators and either commit fully or not
//! at all; [`build`](BundleBuilder::build) is read-only and repeatable.

use crate::bundle::types::{BundledDocument, DocumentMetadata, NamedQuery};
use crate::bundle::writer::BundleWriter;
use crate::error::{BundleError, BundleResult};
use crate::snapshot::{DocumentSnapshot, QuerySnapshot};
use crate::timestamp::Timestamp;
use indexmap::IndexMap;
use tracing::debug;

/// Accumulator and encoder entry point for one bundle
///
/// # Example
///
/// ```ignore
/// let mut builder = BundleBuilder::new("b1");
/// builder
///     .add_document(&doc_snapshot)?
///     .add_named_query("latest-orders", &query_snapshot)?;
/// let bytes = builder.build()?;
/// ```
#[derive(Debug, Clone)]
pub struct BundleBuilder {
    bundle_id: String,
    documents: IndexMap<String, BundledDocument>,
    named_queries: IndexMap<String, NamedQuery>,
    latest_read_time: Timestamp,
}

impl BundleBuilder {
    /// Create an empty builder for the given bundle id
    pub fn new(bundle_id: impl Into<String>) -> Self {
        Self {
            bundle_id: bundle_id.into(),
            documents: IndexMap::new(),
            named_queries: IndexMap::new(),
            latest_read_time: Timestamp::EPOCH,
        }
    }

    /// The caller-supplied bundle identifier
    pub fn bundle_id(&self) -> &str {
        &self.bundle_id
    }

    /// Number of distinct documents accumulated so far
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of named queries accumulated so far
    pub fn named_query_count(&self) -> usize {
        self.named_queries.len()
    }

    /// Whether nothing has been added yet
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty() && self.named_queries.is_empty()
    }

    /// The watermark: maximum read time seen, epoch if nothing was added
    pub fn latest_read_time(&self) -> Timestamp {
        self.latest_read_time
    }

    /// Accumulated documents, in insertion order
    pub fn documents(&self) -> impl Iterator<Item = &BundledDocument> {
        self.documents.values()
    }

    /// Accumulated named queries, in insertion order
    pub fn named_queries(&self) -> impl Iterator<Item = &NamedQuery> {
        self.named_queries.values()
    }

    /// Add a document snapshot
    ///
    /// Overwrites any prior entry for the same document path (last write
    /// wins) and advances the watermark if the snapshot's read time exceeds
    /// it. Returns `&mut Self` for fluent chaining through `?`.
    pub fn add_document(&mut self, snapshot: &impl DocumentSnapshot) -> BundleResult<&mut Self> {
        let entry = Self::bundled_document(snapshot)?;
        self.insert_document(entry);
        Ok(self)
    }

    /// Add a named query and its result set
    ///
    /// Records the query under `name` and runs every matched document
    /// through the same accumulation logic as
    /// [`add_document`](BundleBuilder::add_document). Fails with
    /// [`BundleError::NameConflict`] if `name` is already taken, leaving
    /// the existing entry untouched. On any failure no state is mutated.
    pub fn add_named_query<Q: QuerySnapshot>(
        &mut self,
        name: &str,
        query: &Q,
    ) -> BundleResult<&mut Self> {
        if name.is_empty() {
            return Err(BundleError::invalid_argument(
                "name",
                "query name must not be empty",
            ));
        }
        if self.named_queries.contains_key(name) {
            return Err(BundleError::name_conflict(name));
        }

        // Stage all fallible work before the first insert so a failure
        // leaves the builder untouched.
        let bundled_query = query.to_bundled_query()?;
        let mut entries = Vec::with_capacity(query.documents().len());
        for document in query.documents() {
            entries.push(Self::bundled_document(document)?);
        }

        self.named_queries.insert(
            name.to_string(),
            NamedQuery {
                name: name.to_string(),
                bundled_query,
                read_time: query.read_time(),
            },
        );
        for entry in entries {
            self.insert_document(entry);
        }
        self.advance_watermark(query.read_time());
        debug!(name, "bundled named query");
        Ok(self)
    }

    /// Encode the accumulated state into a bundle byte stream
    ///
    /// Read-only: repeated calls with no intervening add produce
    /// byte-identical output.
    pub fn build(&self) -> BundleResult<Vec<u8>> {
        BundleWriter::write_to_vec(self)
    }

    fn bundled_document(snapshot: &impl DocumentSnapshot) -> BundleResult<BundledDocument> {
        let name = snapshot.name();
        if name.is_empty() {
            return Err(BundleError::invalid_argument(
                "documentSnapshot",
                "document name must not be empty",
            ));
        }
        let document = if snapshot.exists() {
            Some(snapshot.to_document_proto()?)
        } else {
            None
        };
        BundledDocument::new(
            DocumentMetadata {
                name: name.to_string(),
                read_time: snapshot.read_time(),
                exists: snapshot.exists(),
            },
            document,
        )
    }

    fn insert_document(&mut self, entry: BundledDocument) {
        let read_time = entry.metadata().read_time;
        debug!(
            name = %entry.metadata().name,
            exists = entry.metadata().exists,
            "bundled document"
        );
        self.documents.insert(entry.metadata().name.clone(), entry);
        self.advance_watermark(read_time);
    }

    fn advance_watermark(&mut self, read_time: Timestamp) {
        if read_time > self.latest_read_time {
            self.latest_read_time = read_time;
        }
    }
}
