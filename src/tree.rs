//! IPDB Search Tree Traversal
//!
//! Implements binary trie traversal for IP address lookups. Each node is
//! eight bytes: two big-endian u32 child records selected by the next
//! address bit. A record below the node count points at another node, a
//! record above it points into the data segment, and a record equal to it
//! is the "not found" sentinel.
//!
//! IPv4 data lives under the fixed ::ffff:0:0/96 subtree, so IPv4 lookups
//! descend 96 scheduled bits once and cache the resulting subtree root.
//! IPv6 lookups cache the node reached after the first 16 bits, keyed by
//! the first two address bytes.

use crate::error::{IpdbError, Result};
use rustc_hash::FxHashMap;
use std::net::IpAddr;

/// Per-database traversal cache.
///
/// Owned by a single `Database` instance and populated lazily under its
/// lock, so cached subtree roots can never leak between database files.
#[derive(Debug, Default)]
pub struct LookupCache {
    /// Node reached after the fixed 96-bit descent into the IPv4 subtree
    v4_root: Option<u32>,
    /// First two address bytes -> node reached after 16 bits of traversal
    v6_roots: FxHashMap<[u8; 2], u32>,
}

/// Search tree over the node table of an IPDB image.
///
/// `data` is the region starting at the node-table base (node table plus
/// the trailing data segment).
pub struct SearchTree<'a> {
    data: &'a [u8],
    node_count: u32,
}

impl<'a> SearchTree<'a> {
    /// Create a search tree over the node-table region
    pub fn new(data: &'a [u8], node_count: u32) -> Self {
        Self { data, node_count }
    }

    /// Look up an IP address.
    ///
    /// Returns a data pointer (a record value above the node count) when the
    /// address has an entry, or `None` when traversal lands on the sentinel.
    pub fn lookup(&self, addr: IpAddr, cache: &mut LookupCache) -> Result<Option<u32>> {
        match addr {
            IpAddr::V4(v4) => {
                let root = match cache.v4_root {
                    Some(node) => node,
                    None => match self.find_v4_root()? {
                        Some(node) => {
                            cache.v4_root = Some(node);
                            node
                        }
                        None => return Ok(None),
                    },
                };
                self.walk(&v4.octets(), 0, root, None)
            }
            IpAddr::V6(v6) => {
                let octets = v6.octets();
                let key = [octets[0], octets[1]];
                match cache.v6_roots.get(&key).copied() {
                    Some(node) => self.walk(&octets, 16, node, None),
                    None => self.walk(&octets, 0, 0, Some((&mut cache.v6_roots, key))),
                }
            }
        }
    }

    /// Read one child record from a node.
    ///
    /// `bit` selects the child: 0 = left, 1 = right.
    fn read_node(&self, node: u32, bit: u32) -> Result<u32> {
        let offset = node as usize * 8 + bit as usize * 4;
        let bytes = self
            .data
            .get(offset..offset + 4)
            .ok_or(IpdbError::TruncatedRead { offset, len: 4 })?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Descend the fixed 96-bit IPv4-mapped prefix from the trie root.
    ///
    /// The bit schedule is 80 zero bits followed by 16 one bits
    /// (::ffff:0:0/96). Returns `None` if the descent runs into a data
    /// pointer before the prefix is consumed, which means the database
    /// has no IPv4 subtree.
    fn find_v4_root(&self) -> Result<Option<u32>> {
        let mut node = 0u32;
        for i in 0..96 {
            if node >= self.node_count {
                break;
            }
            let bit = u32::from(i >= 80);
            node = self.read_node(node, bit)?;
            if node > self.node_count {
                return Ok(None);
            }
        }
        Ok(Some(node))
    }

    /// Walk address bits from `start_bit`, beginning at `node`.
    ///
    /// Bits are taken most-significant-first within each byte. When
    /// `prefix_cache` is given, the node reached after bit 15 is snapshotted
    /// under the supplied two-byte key for reuse by later lookups.
    fn walk(
        &self,
        bytes: &[u8],
        start_bit: usize,
        mut node: u32,
        mut prefix_cache: Option<(&mut FxHashMap<[u8; 2], u32>, [u8; 2])>,
    ) -> Result<Option<u32>> {
        let bit_count = bytes.len() * 8;
        for i in start_bit..bit_count {
            if node >= self.node_count {
                break;
            }
            let bit = u32::from((bytes[i >> 3] >> (7 - (i & 7))) & 1);
            node = self.read_node(node, bit)?;

            if i == 15 {
                if let Some((roots, key)) = prefix_cache.as_mut() {
                    roots.entry(*key).or_insert(node);
                }
            }
        }

        if node == self.node_count {
            Ok(None)
        } else if node > self.node_count {
            Ok(Some(node))
        } else {
            // All address bits consumed while still above a live internal
            // node: the trie is malformed.
            Err(IpdbError::NodeTraversalFailure)
        }
    }
}
