/// Error types for the ipdb library
use std::fmt;
use std::io;

/// Result type alias for ipdb operations
pub type Result<T> = std::result::Result<T, IpdbError>;

/// Main error type for ipdb operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpdbError {
    /// I/O errors (file not readable, mmap failure)
    Io(String),

    /// Declared metadata + data size does not match the actual file size
    SizeMismatch {
        /// Size the metadata header declares (4 + metadata length + total_size)
        expected: u64,
        /// Actual file size in bytes
        actual: u64,
    },

    /// Metadata header is malformed or missing required keys
    InvalidMetadata(String),

    /// Requested language is not present in the metadata language table
    UnsupportedLanguage(String),

    /// Query string does not parse as an IPv4 or IPv6 address
    InvalidIpAddress(String),

    /// Address family is not enabled in the database's `ip_version` bitmask
    UnsupportedAddressFamily(String),

    /// A read landed past the end of the node table or data segment
    TruncatedRead {
        /// Byte offset of the attempted read, relative to the node table base
        offset: usize,
        /// Number of bytes requested
        len: usize,
    },

    /// The trie ran out of address bits above a live internal node
    NodeTraversalFailure,

    /// A data record could not be decoded (bad UTF-8, language slice out of range)
    InvalidRecord(String),

    /// The database was queried after `close()`
    DatabaseClosed,
}

impl fmt::Display for IpdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpdbError::Io(msg) => write!(f, "I/O error: {}", msg),
            IpdbError::SizeMismatch { expected, actual } => write!(
                f,
                "database size mismatch: header declares {} bytes, file is {} bytes",
                expected, actual
            ),
            IpdbError::InvalidMetadata(msg) => write!(f, "invalid metadata: {}", msg),
            IpdbError::UnsupportedLanguage(lang) => {
                write!(f, "language not supported by this database: {}", lang)
            }
            IpdbError::InvalidIpAddress(ip) => write!(f, "not a valid IP address: {}", ip),
            IpdbError::UnsupportedAddressFamily(family) => {
                write!(f, "database does not support {} addresses", family)
            }
            IpdbError::TruncatedRead { offset, len } => write!(
                f,
                "truncated read: {} bytes at offset {} past end of database",
                len, offset
            ),
            IpdbError::NodeTraversalFailure => write!(f, "trie traversal failed to reach a leaf"),
            IpdbError::InvalidRecord(msg) => write!(f, "invalid record: {}", msg),
            IpdbError::DatabaseClosed => write!(f, "database has been closed"),
        }
    }
}

impl std::error::Error for IpdbError {}

impl From<io::Error> for IpdbError {
    fn from(err: io::Error) -> Self {
        IpdbError::Io(err.to_string())
    }
}
