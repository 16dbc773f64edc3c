//! IPDB Database API
//!
//! Provides the single public interface for opening an IPDB file and
//! resolving IP addresses to location records. The file is memory-mapped
//! for zero-copy access; only the JSON metadata header is parsed at open
//! time and everything else stays in the map.
//!
//! Lookups validate their arguments eagerly (language, IP syntax, address
//! family) but treat data-layer corruption encountered mid-traversal as a
//! plain miss, so one bad record cannot take the lookup path down.

use crate::error::{IpdbError, Result};
use crate::metadata::Metadata;
use crate::record::RecordReader;
use crate::tree::{LookupCache, SearchTree};
use memmap2::Mmap;
use std::collections::HashMap;
use std::fs::File;
use std::net::IpAddr;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

/// Storage for database data - either owned or memory-mapped
enum DatabaseStorage {
    Owned(Vec<u8>),
    Mmap(Mmap),
}

impl DatabaseStorage {
    fn as_slice(&self) -> &[u8] {
        match self {
            DatabaseStorage::Owned(v) => v.as_slice(),
            DatabaseStorage::Mmap(m) => &m[..],
        }
    }
}

/// An opened, immutable IPDB database
///
/// Open once, query many times. Queries take `&self` and the instance is
/// `Send + Sync`; the only mutable state is the traversal cache, which sits
/// behind an internal lock and is scoped to this instance.
///
/// # Examples
///
/// ```no_run
/// use ipdb::Database;
///
/// let db = Database::open("city.ipdb")?;
/// if let Some(values) = db.find("1.2.3.4", "CN")? {
///     println!("location: {:?}", values);
/// }
/// # Ok::<(), ipdb::IpdbError>(())
/// ```
pub struct Database {
    /// `None` after `close()`
    storage: Option<DatabaseStorage>,
    metadata: Metadata,
    /// Byte offset of the node table: 4 + metadata length
    node_offset: usize,
    cache: Mutex<LookupCache>,
}

impl Database {
    /// Open a database file using memory mapping.
    ///
    /// Parses and validates the metadata header; fails if the file is
    /// unreadable, the metadata is malformed, or the declared sizes do not
    /// match the actual file size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IpdbError::Io(format!("failed to open {}: {}", path.display(), e)))?;
        let mmap = unsafe { Mmap::map(&file) }
            .map_err(|e| IpdbError::Io(format!("failed to mmap {}: {}", path.display(), e)))?;

        Self::from_storage(DatabaseStorage::Mmap(mmap))
    }

    /// Create a database from raw bytes (for testing and in-memory use)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_storage(DatabaseStorage::Owned(data))
    }

    fn from_storage(storage: DatabaseStorage) -> Result<Self> {
        let (metadata, node_offset) = Metadata::parse(storage.as_slice())?;
        Ok(Self {
            storage: Some(storage),
            metadata,
            node_offset,
            cache: Mutex::new(LookupCache::default()),
        })
    }

    /// Look up an IP address, returning the field values for one language.
    ///
    /// Returns `Ok(None)` when the database has no entry for the address.
    /// Fails immediately on an unknown language, an unparseable address, or
    /// an address family the database does not carry. Corruption encountered
    /// in the node table or data segment is reported as a miss rather than
    /// an error.
    pub fn find(&self, ip: &str, language: &str) -> Result<Option<Vec<String>>> {
        if self.storage.is_none() {
            return Err(IpdbError::DatabaseClosed);
        }

        let offset = self
            .metadata
            .languages
            .get(language)
            .copied()
            .ok_or_else(|| IpdbError::UnsupportedLanguage(language.to_string()))?;

        let addr: IpAddr = ip
            .parse()
            .map_err(|_| IpdbError::InvalidIpAddress(ip.to_string()))?;

        match addr {
            IpAddr::V4(_) if !self.support_v4() => {
                return Err(IpdbError::UnsupportedAddressFamily("IPv4".to_string()))
            }
            IpAddr::V6(_) if !self.support_v6() => {
                return Err(IpdbError::UnsupportedAddressFamily("IPv6".to_string()))
            }
            _ => {}
        }

        match self.lookup_values(addr, offset) {
            Ok(values) => Ok(values),
            Err(
                IpdbError::TruncatedRead { .. }
                | IpdbError::NodeTraversalFailure
                | IpdbError::InvalidRecord(_),
            ) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up an IP address, returning field values keyed by field name.
    ///
    /// Same semantics as [`find`](Self::find), with each value paired
    /// positionally with its schema field name.
    pub fn find_map(&self, ip: &str, language: &str) -> Result<Option<HashMap<String, String>>> {
        let values = match self.find(ip, language)? {
            Some(values) => values,
            None => return Ok(None),
        };
        Ok(Some(
            self.metadata.fields.iter().cloned().zip(values).collect(),
        ))
    }

    /// Traversal + record resolution, before the facade's miss policy is
    /// applied. Values are sliced to the language's window of the record.
    fn lookup_values(&self, addr: IpAddr, language_offset: usize) -> Result<Option<Vec<String>>> {
        let region = self.region()?;
        let tree = SearchTree::new(region, self.metadata.node_count);

        // A poisoned lock only means another thread panicked mid-lookup;
        // the cache contents are still valid.
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let pointer = match tree.lookup(addr, &mut cache)? {
            Some(pointer) => pointer,
            None => return Ok(None),
        };
        drop(cache);

        let reader = RecordReader::new(region, self.metadata.node_count);
        let values = match reader.resolve(pointer)? {
            Some(values) => values,
            None => return Ok(None),
        };

        let count = self.metadata.fields.len();
        let slice = values
            .get(language_offset..language_offset + count)
            .ok_or_else(|| {
                IpdbError::InvalidRecord(format!(
                    "record holds {} values, language slice {}..{} out of range",
                    values.len(),
                    language_offset,
                    language_offset + count
                ))
            })?;

        Ok(Some(slice.iter().map(|s| s.to_string()).collect()))
    }

    /// The node-table region: node table followed by the data segment
    fn region(&self) -> Result<&[u8]> {
        let storage = self.storage.as_ref().ok_or(IpdbError::DatabaseClosed)?;
        Ok(&storage.as_slice()[self.node_offset..])
    }

    /// Whether the database holds IPv4 data
    pub fn support_v4(&self) -> bool {
        self.metadata.support_v4()
    }

    /// Whether the database holds IPv6 data
    pub fn support_v6(&self) -> bool {
        self.metadata.support_v6()
    }

    /// The record schema shared by all languages
    pub fn fields(&self) -> &[String] {
        &self.metadata.fields
    }

    /// Language codes the database carries, sorted
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> =
            self.metadata.languages.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Number of internal trie nodes
    pub fn node_count(&self) -> u32 {
        self.metadata.node_count
    }

    /// Parsed metadata header
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Release the underlying file mapping or buffer.
    ///
    /// Subsequent `find`/`find_map` calls return `DatabaseClosed`. Dropping
    /// the database releases the mapping as well; `close` exists for callers
    /// that need the file released at a deterministic point.
    pub fn close(&mut self) {
        self.storage = None;
    }
}
