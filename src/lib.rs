//! ipmap - IPv4 Lookup Table for Exact Addresses and CIDR Ranges
//!
//! ipmap answers "does this address match a known entry, and what is attached
//! to it" for a registry that mixes single addresses and CIDR blocks. Each
//! entry carries an arbitrary value of the caller's choosing.
//!
//! # Quick Start
//!
//! ```rust
//! use ipmap::IpMap;
//!
//! let mut map = IpMap::new();
//! map.insert("127.0.0.1", "loopback host")?;
//! map.insert("10.0.0.0/8", "private")?;
//! map.insert("10.0.0.53", "resolver")?;
//!
//! assert_eq!(map.lookup("10.0.0.53")?, Some(&"resolver")); // exact beats range
//! assert_eq!(map.lookup("10.20.30.40")?, Some(&"private"));
//! assert_eq!(map.lookup("192.0.2.1")?, None);
//!
//! // Only bare addresses can be looked up
//! assert!(map.lookup("10.0.0.0/8").is_err());
//! # Ok::<(), ipmap::IpMapError>(())
//! ```
//!
//! # Architecture
//!
//! ```text
//! insert("a.b.c.d", v)      ──► AddressTable   (hash map, O(1))
//! insert("a.b.c.d/n", v)    ──► RangeIndex     (max-end interval tree, O(h))
//!
//! lookup("a.b.c.d") ──► AddressTable hit? ──yes──► value
//!                              │ no
//!                              ▼
//!                        RangeIndex hit? ──yes──► value
//!                              │ no
//!                              ▼
//!                            None
//! ```
//!
//! Addresses are handled as `u32`, so only IPv4 is supported. The range index
//! is an unbalanced search tree; when several ranges contain an address, the
//! one returned is whichever the search reaches first, not the most specific.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// IPv4 address and CIDR parsing
pub mod addr;
/// Exact address table
pub mod address_table;
/// Error types for map operations
pub mod error;
/// Line reading with transparent gzip
pub mod file_reader;
/// Address + range lookup facade
pub mod ip_map;
/// Entry file loading (text and CSV)
pub mod loader;
/// Max-end interval tree over address ranges
pub mod range_index;

// Re-exports for Rust consumers

pub use crate::addr::Range;
pub use crate::address_table::AddressTable;
pub use crate::error::{ErrorKind, IpMapError, Result};
pub use crate::ip_map::{EntryKind, IpMap, MapStats, Match, MatchSource};
pub use crate::range_index::RangeIndex;

/// Library version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
