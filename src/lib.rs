//! docbundle - streamable snapshot bundle encoder
//!
//! docbundle accumulates database document snapshots and named query
//! results, tracks their read timestamps, and serializes everything into a
//! single self-describing byte stream for offline replay.
//!
//! # Quick Start
//!
//! ```ignore
//! use docbundle::{BundleBuilder, OwnedDocumentSnapshot, Timestamp};
//! use serde_json::json;
//!
//! let mut builder = BundleBuilder::new("b1");
//! builder.add_document(&OwnedDocumentSnapshot::existing(
//!     "coll/doc1",
//!     Timestamp::new(1_700_000_000, 0),
//!     json!({"name": "coll/doc1", "fields": {"a": 1}}),
//! ))?;
//! let bytes = builder.build()?;
//! ```
//!
//! # Architecture
//!
//! [`BundleBuilder`] is the accumulator: it deduplicates documents by path
//! (last write wins), rejects duplicate query names, and tracks the
//! watermark used as the bundle's creation time. [`BundleWriter`] encodes
//! the accumulated state as length-prefixed JSON elements with the
//! bundle-wide metadata element first. Snapshots are supplied through the
//! [`DocumentSnapshot`] and [`QuerySnapshot`] collaborator traits.

pub mod bundle;
pub mod error;
pub mod snapshot;
pub mod timestamp;

pub use bundle::{
    BundleBuilder, BundleElement, BundleMetadata, BundleWriteInfo, BundleWriter, BundledDocument,
    DocumentMetadata, NamedQuery, BUNDLE_FORMAT_VERSION,
};
pub use error::{BundleError, BundleResult};
pub use snapshot::{DocumentSnapshot, OwnedDocumentSnapshot, OwnedQuerySnapshot, QuerySnapshot};
pub use timestamp::Timestamp;
