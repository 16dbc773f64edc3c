//! ipdb - Fast Reader for IPDB-Format IP Location Databases
//!
//! A read-only lookup engine for IPDB files: given an IPv4 or IPv6 address,
//! it walks a binary radix trie embedded in a single immutable database file
//! and decodes the tab-separated location record it lands on, sliced to the
//! requested language.
//!
//! # Quick Start
//!
//! ```no_run
//! use ipdb::Database;
//!
//! let db = Database::open("city.ipdb")?;
//!
//! // Ordered field values for one language
//! if let Some(values) = db.find("1.2.3.4", "CN")? {
//!     println!("{:?}", values);
//! }
//!
//! // Or keyed by field name
//! if let Some(map) = db.find_map("2001:db8::1", "EN")? {
//!     println!("country = {:?}", map.get("country_name"));
//! }
//! # Ok::<(), ipdb::IpdbError>(())
//! ```
//!
//! # File Format
//!
//! All multi-byte integers are big-endian:
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  4 bytes   metadata length L                │
//! │  L bytes   JSON metadata (fields, languages,│
//! │            node_count, total_size,          │
//! │            ip_version)                      │
//! │  node_count * 8 bytes   trie node table     │
//! │  remainder data segment: 2-byte length +    │
//! │            tab-separated record text        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Each trie node holds two 4-byte child records, one per address bit. A
//! record below the node count points at another node, one above it points
//! into the data segment, and one equal to it means "not found".
//!
//! # Design
//!
//! - **Zero-copy**: the file is memory-mapped; only the metadata header is
//!   parsed at open time.
//! - **Dual-stack fast paths**: IPv4 lookups skip the fixed 96-bit
//!   IPv4-mapped prefix via a cached subtree root; IPv6 lookups cache the
//!   node reached after the first 16 address bits per two-byte prefix.
//! - **Resilient lookups**: corruption found mid-traversal degrades to a
//!   miss instead of an error; only open-time and argument errors escalate.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Database facade
pub mod database;
/// Error types for ipdb operations
pub mod error;
/// Metadata header parsing
pub mod metadata;
mod record;
mod tree;

pub use crate::database::Database;
pub use crate::error::{IpdbError, Result};
pub use crate::metadata::Metadata;
