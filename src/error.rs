//! Error types for kdip.

use thiserror::Error;

use crate::address::AddressFamily;

/// Error type for kdip operations.
///
/// The tree itself never fails; these errors come from turning text,
/// files and configuration into points.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid IP address
    #[error("invalid IP address: {0}")]
    InvalidIpAddress(String),

    /// Invalid CIDR pattern
    #[error("invalid CIDR pattern: {0}")]
    InvalidCidrPattern(String),

    /// Prefix length longer than the address
    #[error("invalid prefix length /{prefix} for {family}")]
    InvalidPrefixLength { family: AddressFamily, prefix: u8 },

    /// Address of the wrong family for this index or file
    #[error("address family mismatch: expected {expected}, got {actual}")]
    AddressFamilyMismatch {
        expected: AddressFamily,
        actual: AddressFamily,
    },

    /// Unsupported IP version number
    #[error("unsupported IP version: {0}")]
    UnsupportedVersion(u32),

    /// Malformed line in an address file
    #[error("line {line}: {source}")]
    InvalidLine {
        line: usize,
        #[source]
        source: Box<Error>,
    },

    /// Unrecognised shell command
    #[error("invalid command: {0}")]
    InvalidCommand(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Attach a 1-based line number to an error raised while reading a file.
    pub fn at_line(self, line: usize) -> Self {
        Error::InvalidLine {
            line,
            source: Box::new(self),
        }
    }
}

/// Result type alias for kdip operations.
pub type Result<T> = std::result::Result<T, Error>;
