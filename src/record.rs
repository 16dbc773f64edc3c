//! Record Resolution
//!
//! Converts a terminal trie record into a byte offset past the node table
//! and decodes the length-prefixed record found there. Records are
//! tab-separated UTF-8 field values for every supported language,
//! concatenated in schema order.

use crate::error::{IpdbError, Result};
use std::str;

/// Decoder for the data segment of an IPDB image.
///
/// `data` is the region starting at the node-table base, the same region
/// the search tree operates on; data pointers resolve past the node table
/// into its tail.
pub struct RecordReader<'a> {
    data: &'a [u8],
    node_count: u32,
}

impl<'a> RecordReader<'a> {
    /// Create a record reader over the node-table region
    pub fn new(data: &'a [u8], node_count: u32) -> Self {
        Self { data, node_count }
    }

    /// Resolve a data pointer into its decoded field values.
    ///
    /// Returns `None` when the pointer lands past the end of the image.
    /// The record is a 2-byte big-endian length followed by that many bytes
    /// of tab-separated text.
    pub fn resolve(&self, pointer: u32) -> Result<Option<Vec<&'a str>>> {
        let relative = (pointer as usize)
            .checked_sub(self.node_count as usize)
            .ok_or_else(|| {
                IpdbError::InvalidRecord(format!(
                    "pointer {} does not point past the node table (node count {})",
                    pointer, self.node_count
                ))
            })?;
        let offset = relative + self.node_count as usize * 8;

        if offset >= self.data.len() {
            return Ok(None);
        }

        let len_bytes = self
            .data
            .get(offset..offset + 2)
            .ok_or(IpdbError::TruncatedRead { offset, len: 2 })?;
        let len = u16::from_be_bytes([len_bytes[0], len_bytes[1]]) as usize;

        let start = offset + 2;
        let raw = self
            .data
            .get(start..start + len)
            .ok_or(IpdbError::TruncatedRead { offset: start, len })?;

        let text = str::from_utf8(raw).map_err(|e| {
            IpdbError::InvalidRecord(format!("record at offset {} is not UTF-8: {}", offset, e))
        })?;

        Ok(Some(text.split('\t').collect()))
    }
}
