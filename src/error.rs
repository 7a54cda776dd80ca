//! Error types for the ipmap library

/// Result type alias for map operations
pub type Result<T> = std::result::Result<T, IpMapError>;

/// Main error type for map operations
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IpMapError {
    /// The input is not usable as an address string
    ///
    /// Raised by `insert_bytes` for non-UTF-8 input and by every lookup whose
    /// input is not a bare IPv4 address (CIDR strings included).
    #[error("{0}")]
    InvalidInput(String),

    /// An insert key that is neither a bare IPv4 address nor `address/prefix`
    #[error("{0}")]
    InvalidRange(String),
}

/// Coarse classification of an [`IpMapError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`IpMapError::InvalidInput`]
    InvalidInput,
    /// See [`IpMapError::InvalidRange`]
    InvalidRange,
}

impl IpMapError {
    pub(crate) fn not_a_string() -> Self {
        IpMapError::InvalidInput("value must be a string".to_string())
    }

    pub(crate) fn not_an_address() -> Self {
        IpMapError::InvalidInput("value must be an IP address".to_string())
    }

    pub(crate) fn invalid_ip() -> Self {
        IpMapError::InvalidRange("invalid IP".to_string())
    }

    /// Which of the two error kinds this is
    pub fn kind(&self) -> ErrorKind {
        match self {
            IpMapError::InvalidInput(_) => ErrorKind::InvalidInput,
            IpMapError::InvalidRange(_) => ErrorKind::InvalidRange,
        }
    }
}
