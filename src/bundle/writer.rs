//! Bundle stream encoder
//!
//! Turns a [`BundleBuilder`]'s state into the length-prefixed element
//! stream and optionally writes it to a file with atomic semantics
//! (temp file + rename, nothing left behind on failure).
//!
//! ## Framing
//!
//! Each element is its compact JSON payload prefixed by the ASCII decimal
//! digits of the payload byte length — no delimiter between the digits and
//! the payload and no trailing separator. A reader scans digits until the
//! first non-digit byte (the `{` opening the payload), then slices exactly
//! that many bytes and repeats until the buffer is exhausted.

use crate::bundle::builder::BundleBuilder;
use crate::bundle::types::{BundleElement, BundleMetadata, BUNDLE_FORMAT_VERSION};
use crate::error::BundleResult;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Information returned after writing a bundle to a file
#[derive(Debug, Clone)]
pub struct BundleWriteInfo {
    /// Path where the bundle was written
    pub path: PathBuf,

    /// Size of the bundle file in bytes, metadata element included
    pub bundle_size_bytes: u64,

    /// Number of distinct documents in the bundle
    pub total_documents: u64,

    /// Number of named queries in the bundle
    pub named_queries: u64,
}

/// Encoder for bundle streams
pub struct BundleWriter;

impl BundleWriter {
    /// Encode a builder's state into a bundle byte stream
    ///
    /// Emits named-query elements, then per-document metadata/payload
    /// pairs, then prepends the metadata element once the section totals
    /// are known.
    pub fn write_to_vec(builder: &BundleBuilder) -> BundleResult<Vec<u8>> {
        let mut section = Vec::new();
        for query in builder.named_queries() {
            append_element(&mut section, &BundleElement::NamedQuery(query.clone()))?;
        }
        for entry in builder.documents() {
            append_element(
                &mut section,
                &BundleElement::DocumentMetadata(entry.metadata().clone()),
            )?;
            if let Some(payload) = entry.document() {
                append_element(&mut section, &BundleElement::Document(payload.clone()))?;
            }
        }

        let metadata = BundleMetadata {
            id: builder.bundle_id().to_string(),
            create_time: builder.latest_read_time(),
            version: BUNDLE_FORMAT_VERSION,
            total_documents: builder.document_count() as u64,
            total_bytes: section.len() as u64,
        };

        let mut bundle = Vec::with_capacity(section.len() + 128);
        append_element(&mut bundle, &BundleElement::Metadata(metadata))?;
        bundle.extend_from_slice(&section);

        debug!(
            bundle_id = builder.bundle_id(),
            documents = builder.document_count(),
            named_queries = builder.named_query_count(),
            bytes = bundle.len(),
            "encoded bundle"
        );
        Ok(bundle)
    }

    /// Write a bundle to a file
    ///
    /// This is an atomic operation: either the complete bundle is written
    /// or no file is left behind. Parent directories are created as needed.
    pub fn write(builder: &BundleBuilder, path: &Path) -> BundleResult<BundleWriteInfo> {
        let temp_path = path.with_extension("tmp");

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        match Self::write_inner(builder, &temp_path) {
            Ok(info) => {
                fs::rename(&temp_path, path)?;
                Ok(BundleWriteInfo {
                    path: path.to_path_buf(),
                    ..info
                })
            }
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                Err(e)
            }
        }
    }

    fn write_inner(builder: &BundleBuilder, path: &Path) -> BundleResult<BundleWriteInfo> {
        let data = Self::write_to_vec(builder)?;
        fs::write(path, &data)?;
        Ok(BundleWriteInfo {
            path: path.to_path_buf(),
            bundle_size_bytes: data.len() as u64,
            total_documents: builder.document_count() as u64,
            named_queries: builder.named_query_count() as u64,
        })
    }
}

/// Append one length-prefixed element to `buf`
///
/// The prefix is the payload byte length as ASCII decimal digits, directly
/// followed by the compact JSON payload.
fn append_element(buf: &mut Vec<u8>, element: &BundleElement) -> BundleResult<()> {
    let payload = serde_json::to_vec(element)?;
    buf.extend_from_slice(payload.len().to_string().as_bytes());
    buf.extend_from_slice(&payload);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{OwnedDocumentSnapshot, OwnedQuerySnapshot};
    use crate::timestamp::Timestamp;
    use serde_json::json;
    use tempfile::tempdir;

    /// Split a bundle into its elements by walking the length prefixes
    fn scan_elements(bytes: &[u8]) -> Vec<BundleElement> {
        let mut elements = Vec::new();
        let mut at = 0;
        while at < bytes.len() {
            let digits_start = at;
            while at < bytes.len() && bytes[at].is_ascii_digit() {
                at += 1;
            }
            let digits = std::str::from_utf8(&bytes[digits_start..at]).unwrap();
            let len: usize = digits.parse().expect("length prefix");
            let payload = &bytes[at..at + len];
            elements.push(serde_json::from_slice(payload).expect("element payload"));
            at += len;
        }
        elements
    }

    fn make_builder() -> BundleBuilder {
        let mut builder = BundleBuilder::new("b1");
        builder
            .add_document(&OwnedDocumentSnapshot::existing(
                "coll/doc1",
                Timestamp::new(10, 0),
                json!({"name": "coll/doc1", "fields": {"a": 1}}),
            ))
            .unwrap();
        builder
            .add_document(&OwnedDocumentSnapshot::missing(
                "coll/doc2",
                Timestamp::new(11, 0),
            ))
            .unwrap();
        let query = OwnedQuerySnapshot::new(Timestamp::new(12, 0), json!({"parent": "coll"}), vec![]);
        builder.add_named_query("q1", &query).unwrap();
        builder
    }

    #[test]
    fn test_empty_bundle_is_metadata_only() {
        let builder = BundleBuilder::new("empty");
        let bytes = builder.build().unwrap();
        let elements = scan_elements(&bytes);

        assert_eq!(elements.len(), 1);
        match &elements[0] {
            BundleElement::Metadata(metadata) => {
                assert_eq!(metadata.id, "empty");
                assert_eq!(metadata.version, BUNDLE_FORMAT_VERSION);
                assert!(metadata.create_time.is_epoch());
                assert_eq!(metadata.total_documents, 0);
                assert_eq!(metadata.total_bytes, 0);
            }
            other => panic!("expected metadata element, got {other:?}"),
        }
    }

    #[test]
    fn test_element_order() {
        let builder = make_builder();
        let bytes = builder.build().unwrap();
        let elements = scan_elements(&bytes);

        assert_eq!(elements.len(), 4);
        assert!(matches!(elements[0], BundleElement::Metadata(_)));
        assert!(matches!(elements[1], BundleElement::NamedQuery(_)));
        assert!(matches!(elements[2], BundleElement::DocumentMetadata(_)));
        assert!(matches!(elements[3], BundleElement::Document(_)));
    }

    #[test]
    fn test_missing_document_has_no_payload_element() {
        let builder = make_builder();
        let bytes = builder.build().unwrap();
        let elements = scan_elements(&bytes);

        // coll/doc2 does not exist: only a metadata element, exists=false,
        // and nothing follows it.
        match elements.last().unwrap() {
            BundleElement::DocumentMetadata(metadata) => {
                assert_eq!(metadata.name, "coll/doc2");
                assert!(!metadata.exists);
            }
            other => panic!("expected documentMetadata element, got {other:?}"),
        }
    }

    #[test]
    fn test_total_bytes_covers_post_metadata_section() {
        let builder = make_builder();
        let bytes = builder.build().unwrap();

        // Re-measure the section after the metadata element by hand.
        let mut at = 0;
        while bytes[at].is_ascii_digit() {
            at += 1;
        }
        let metadata_len: usize = std::str::from_utf8(&bytes[..at]).unwrap().parse().unwrap();
        let metadata: BundleElement = serde_json::from_slice(&bytes[at..at + metadata_len]).unwrap();
        let section_len = bytes.len() - at - metadata_len;

        match metadata {
            BundleElement::Metadata(metadata) => {
                assert_eq!(metadata.total_bytes, section_len as u64);
                assert_eq!(metadata.total_documents, 2);
                assert_eq!(metadata.create_time, Timestamp::new(12, 0));
            }
            other => panic!("expected metadata element, got {other:?}"),
        }
    }

    #[test]
    fn test_build_is_repeatable() {
        let builder = make_builder();
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snapshots.bundle");

        let builder = make_builder();
        let info = BundleWriter::write(&builder, &path).unwrap();

        assert!(path.exists());
        assert_eq!(info.path, path);
        assert_eq!(info.total_documents, 2);
        assert_eq!(info.named_queries, 1);

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len() as u64, info.bundle_size_bytes);
        assert_eq!(data, builder.build().unwrap());

        // Temp file must not survive a successful write
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshots.bundle");

        let builder = make_builder();
        let info = BundleWriter::write(&builder, &path).unwrap();
        assert!(path.exists());
        assert_eq!(info.path, path);
    }
}
