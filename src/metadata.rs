//! IPDB Metadata Header Parsing
//!
//! An IPDB file opens with a 4-byte big-endian length followed by that many
//! bytes of JSON metadata. The metadata carries the record schema (`fields`),
//! the per-language offsets into each record (`languages`), the trie size
//! (`node_count`), the combined node-table + data-segment size (`total_size`),
//! and the supported address families (`ip_version` bitmask).
//!
//! Only the header is parsed eagerly; the node table and data segment stay
//! in the mapped file untouched.

use crate::error::{IpdbError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// `ip_version` bit for IPv4 support
pub const IPV4: u8 = 1;
/// `ip_version` bit for IPv6 support
pub const IPV6: u8 = 2;

/// Parsed IPDB metadata header
///
/// Immutable after load. The field list is the shared schema for every
/// language; each language's value in `languages` is the starting offset of
/// that language's slice within a record's flat value list.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// Ordered record schema, shared across all languages
    pub fields: Vec<String>,
    /// Language code to starting offset in the per-record flat field list
    pub languages: HashMap<String, usize>,
    /// Number of internal trie nodes; also the "not found" sentinel value
    pub node_count: u32,
    /// Combined size of the node table and data segment in bytes
    pub total_size: u64,
    /// Address-family bitmask: bit 0 = IPv4, bit 1 = IPv6
    pub ip_version: u8,
}

impl Metadata {
    /// Parse the metadata header from the start of a full IPDB image.
    ///
    /// Validates the structural invariant
    /// `4 + metadata_length + total_size == file_size` and returns the
    /// metadata together with the byte offset of the node table that
    /// follows it.
    pub fn parse(data: &[u8]) -> Result<(Metadata, usize)> {
        let len_bytes = data
            .get(0..4)
            .ok_or(IpdbError::TruncatedRead { offset: 0, len: 4 })?;
        let meta_len =
            u32::from_be_bytes([len_bytes[0], len_bytes[1], len_bytes[2], len_bytes[3]]) as usize;

        let node_offset = 4 + meta_len;
        let json = data.get(4..node_offset).ok_or_else(|| {
            IpdbError::InvalidMetadata(format!(
                "declared metadata length {} exceeds file size {}",
                meta_len,
                data.len()
            ))
        })?;

        let metadata: Metadata = serde_json::from_slice(json)
            .map_err(|e| IpdbError::InvalidMetadata(e.to_string()))?;

        let expected = node_offset as u64 + metadata.total_size;
        if expected != data.len() as u64 {
            return Err(IpdbError::SizeMismatch {
                expected,
                actual: data.len() as u64,
            });
        }

        Ok((metadata, node_offset))
    }

    /// Whether the database holds IPv4 data
    pub fn support_v4(&self) -> bool {
        self.ip_version & IPV4 == IPV4
    }

    /// Whether the database holds IPv6 data
    pub fn support_v6(&self) -> bool {
        self.ip_version & IPV6 == IPV6
    }
}
