//! Combined exact-address and CIDR-range lookup table
//!
//! [`IpMap`] routes every inserted key to one of two structures:
//!
//! - a bare address such as `"10.1.2.3"` goes into the [`AddressTable`]
//! - a CIDR block such as `"10.0.0.0/8"` goes into the [`RangeIndex`]
//!
//! Lookups consult the exact table first and fall back to the ranges, so an
//! exact entry overrides any range that encloses it.

use crate::addr::{parse_address, parse_cidr, Range};
use crate::address_table::AddressTable;
use crate::error::{IpMapError, Result};
use crate::range_index::RangeIndex;
use serde::Serialize;
use std::net::Ipv4Addr;
use tracing::trace;

/// Where an inserted key is stored, as detected from its text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Bare IPv4 address in integer form
    Exact(u32),
    /// CIDR block, expanded to the addresses it covers
    Range(Range),
}

impl EntryKind {
    /// Detect whether `text` is an address or a CIDR block
    ///
    /// Anything else is an [`IpMapError::InvalidRange`].
    ///
    /// # Example
    /// ```
    /// use ipmap::EntryKind;
    ///
    /// assert!(matches!(EntryKind::classify("1.2.3.4"), Ok(EntryKind::Exact(_))));
    /// assert!(matches!(EntryKind::classify("1.2.3.0/24"), Ok(EntryKind::Range(_))));
    /// assert!(EntryKind::classify("1.2.3.4/3c").is_err());
    /// ```
    pub fn classify(text: &str) -> Result<Self> {
        // Try parsing as plain IP address first (most conservative)
        if let Some(addr) = parse_address(text) {
            return Ok(EntryKind::Exact(addr));
        }
        if let Some(range) = parse_cidr(text) {
            return Ok(EntryKind::Range(range));
        }
        Err(IpMapError::invalid_ip())
    }
}

/// Which structure produced a lookup hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum MatchSource {
    /// Exact entry for this address
    Exact {
        /// Integer form of the matched address
        addr: u32,
    },
    /// Range entry containing the address
    Range {
        /// The matched range
        range: Range,
    },
}

/// A lookup hit: the stored value and where it came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a, V> {
    /// Value attached to the matching entry
    pub value: &'a V,
    /// Exact table or range index
    pub source: MatchSource,
}

/// Entry counts for an [`IpMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MapStats {
    /// Distinct exact addresses
    pub exact_entries: usize,
    /// Ranges, duplicates included
    pub range_entries: usize,
    /// Longest path in the range index
    pub range_height: usize,
}

/// IPv4 lookup table over exact addresses and CIDR ranges
///
/// # Example
///
/// ```
/// use ipmap::IpMap;
///
/// let mut map = IpMap::new();
/// map.insert("127.0.0.1", "foo")?;
/// map.insert("0.0.0.0/8", "bar")?;
/// map.insert("0.0.0.4", "baz")?;
///
/// assert_eq!(map.lookup("127.0.0.1")?, Some(&"foo"));
/// assert_eq!(map.lookup("0.0.0.4")?, Some(&"baz")); // exact beats range
/// assert_eq!(map.lookup("0.0.0.8")?, Some(&"bar"));
/// assert_eq!(map.lookup("127.0.0.2")?, None);
/// # Ok::<(), ipmap::IpMapError>(())
/// ```
#[derive(Debug)]
pub struct IpMap<V> {
    exact: AddressTable<V>,
    ranges: RangeIndex<V>,
}

impl<V> IpMap<V> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            exact: AddressTable::new(),
            ranges: RangeIndex::new(),
        }
    }

    /// Add an address or CIDR block with its value
    ///
    /// A repeated address replaces the earlier value. Ranges are never
    /// replaced; overlapping and duplicate blocks are all kept.
    ///
    /// # Errors
    ///
    /// [`IpMapError::InvalidRange`] if `key` is neither a bare IPv4 address
    /// nor `address/prefix`. The map is left untouched.
    pub fn insert(&mut self, key: &str, value: V) -> Result<()> {
        match EntryKind::classify(key)? {
            EntryKind::Exact(addr) => {
                trace!(key, "exact entry");
                self.exact.put(addr, value);
            }
            EntryKind::Range(range) => {
                trace!(key, %range, "range entry");
                self.ranges.insert(range, value);
            }
        }
        Ok(())
    }

    /// [`insert`](Self::insert) for raw bytes
    ///
    /// # Errors
    ///
    /// [`IpMapError::InvalidInput`] if `key` is not UTF-8, otherwise as
    /// [`insert`](Self::insert).
    pub fn insert_bytes(&mut self, key: &[u8], value: V) -> Result<()> {
        let key = std::str::from_utf8(key).map_err(|_| IpMapError::not_a_string())?;
        self.insert(key, value)
    }

    /// Add an exact address
    pub fn insert_addr(&mut self, addr: Ipv4Addr, value: V) {
        self.exact.put(u32::from(addr), value);
    }

    /// Add a range directly
    pub fn insert_range(&mut self, range: Range, value: V) {
        self.ranges.insert(range, value);
    }

    /// Value for `addr`: its exact entry if present, else a containing range
    ///
    /// # Errors
    ///
    /// [`IpMapError::InvalidInput`] if `addr` is not a bare IPv4 address.
    /// CIDR strings are rejected here even though `insert` accepts them.
    pub fn lookup(&self, addr: &str) -> Result<Option<&V>> {
        let addr = Self::parse_query(addr)?;
        Ok(self.lookup_u32(addr))
    }

    /// [`lookup`](Self::lookup) for raw bytes; non-UTF-8 is
    /// [`IpMapError::InvalidInput`]
    pub fn lookup_bytes(&self, addr: &[u8]) -> Result<Option<&V>> {
        let addr = std::str::from_utf8(addr).map_err(|_| IpMapError::not_an_address())?;
        self.lookup(addr)
    }

    /// Typed lookup that cannot fail
    pub fn lookup_addr(&self, addr: Ipv4Addr) -> Option<&V> {
        self.lookup_u32(u32::from(addr))
    }

    /// Like [`lookup`](Self::lookup), also reporting which entry matched
    pub fn lookup_match(&self, addr: &str) -> Result<Option<Match<'_, V>>> {
        let addr = Self::parse_query(addr)?;
        if let Some(value) = self.exact.get(addr) {
            return Ok(Some(Match {
                value,
                source: MatchSource::Exact { addr },
            }));
        }
        Ok(self.ranges.search_entry(addr).map(|(range, value)| Match {
            value,
            source: MatchSource::Range { range },
        }))
    }

    /// Every entry matching `addr`
    ///
    /// The exact entry comes first when there is one, followed by all
    /// containing ranges in search order. The first element is what
    /// [`lookup`](Self::lookup) returns.
    pub fn lookup_all(&self, addr: &str) -> Result<Vec<Match<'_, V>>> {
        let addr = Self::parse_query(addr)?;
        let exact = self.exact.get(addr).map(|value| Match {
            value,
            source: MatchSource::Exact { addr },
        });
        let ranges = self
            .ranges
            .search_all(addr)
            .into_iter()
            .map(|(range, value)| Match {
                value,
                source: MatchSource::Range { range },
            });
        Ok(exact.into_iter().chain(ranges).collect())
    }

    fn parse_query(addr: &str) -> Result<u32> {
        parse_address(addr).ok_or_else(IpMapError::not_an_address)
    }

    #[inline]
    fn lookup_u32(&self, addr: u32) -> Option<&V> {
        self.exact.get(addr).or_else(|| self.ranges.search(addr))
    }

    /// The exact-address table
    pub fn exact(&self) -> &AddressTable<V> {
        &self.exact
    }

    /// The range index
    pub fn ranges(&self) -> &RangeIndex<V> {
        &self.ranges
    }

    /// Total entries, exact and range
    pub fn len(&self) -> usize {
        self.exact.len() + self.ranges.len()
    }

    /// Whether nothing has been inserted
    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.ranges.is_empty()
    }

    /// Entry counts and range index height
    pub fn stats(&self) -> MapStats {
        MapStats {
            exact_entries: self.exact.len(),
            range_entries: self.ranges.len(),
            range_height: self.ranges.height(),
        }
    }
}

impl<V> Default for IpMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_is_empty() {
        let map: IpMap<&str> = IpMap::new();
        assert!(map.is_empty());
        assert!(map.exact().is_empty());
        assert!(map.ranges().is_empty());
        assert_eq!(map.stats().range_height, 0);
    }

    #[test]
    fn test_insert_routes_entries() {
        let mut map = IpMap::new();

        map.insert("127.0.0.1", "foo").unwrap();
        assert_eq!(map.exact().len(), 1);
        assert_eq!(map.exact().get(0x7F00_0001), Some(&"foo"));
        assert!(map.ranges().is_empty());

        map.insert("0.0.0.0/8", "bar").unwrap();
        assert_eq!(map.exact().len(), 1);
        let entries: Vec<_> = map.ranges().iter().collect();
        assert_eq!(entries, vec![(Range::new(0, 16777215).unwrap(), &"bar")]);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_insert_rejects_invalid_keys() {
        let mut map = IpMap::new();
        for key in [
            "",
            "foo",
            "999.999.999.999",
            "2.2.2.3a",
            "a/b",
            "a/b/c",
            "127.0.0.1/3c",
            "127.0.0.x/8",
            "12.0.0.1/3.1",
        ] {
            let err = map.insert(key, ()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidRange, "{:?}", key);
            assert_eq!(err.to_string(), "invalid IP");
        }
        assert!(map.is_empty());
    }

    #[test]
    fn test_insert_bytes_rejects_non_utf8() {
        let mut map = IpMap::new();
        let err = map.insert_bytes(&[0xff, 0xfe, b'1'], ()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "value must be a string");

        map.insert_bytes(b"10.0.0.0/8", ()).unwrap();
        assert_eq!(map.lookup_bytes(b"10.9.9.9").unwrap(), Some(&()));
        assert!(map.lookup_bytes(&[0xc3, 0x28]).is_err());
    }

    #[test]
    fn test_lookup_priority() {
        let mut map = IpMap::new();
        map.insert("127.0.0.1", "foo").unwrap();
        map.insert("0.0.0.0/8", "bar").unwrap();
        map.insert("0.0.0.4", "baz").unwrap();

        assert_eq!(map.lookup("127.0.0.1").unwrap(), Some(&"foo"));
        assert_eq!(map.lookup("0.0.0.4").unwrap(), Some(&"baz"));
        assert_eq!(map.lookup("0.0.0.8").unwrap(), Some(&"bar"));
        assert_eq!(map.lookup("127.0.0.2").unwrap(), None);
    }

    #[test]
    fn test_lookup_match_reports_source() {
        let mut map = IpMap::new();
        map.insert("0.0.0.0/8", "bar").unwrap();
        map.insert("0.0.0.4", "baz").unwrap();

        let hit = map.lookup_match("0.0.0.4").unwrap().unwrap();
        assert_eq!(hit.value, &"baz");
        assert_eq!(hit.source, MatchSource::Exact { addr: 4 });

        let hit = map.lookup_match("0.0.0.8").unwrap().unwrap();
        assert_eq!(hit.value, &"bar");
        assert_eq!(
            hit.source,
            MatchSource::Range {
                range: Range::new(0, 16777215).unwrap()
            }
        );

        assert!(map.lookup_match("1.0.0.0").unwrap().is_none());
    }

    #[test]
    fn test_lookup_all() {
        let mut map = IpMap::new();
        map.insert("10.0.0.0/8", 1).unwrap();
        map.insert("10.1.0.0/16", 2).unwrap();
        map.insert("10.1.2.3", 3).unwrap();

        let values: Vec<i32> = map
            .lookup_all("10.1.2.3")
            .unwrap()
            .iter()
            .map(|m| *m.value)
            .collect();
        assert_eq!(values[0], 3);
        assert_eq!(values.len(), 3);

        assert_eq!(map.lookup_all("10.2.0.0").unwrap().len(), 1);
        assert!(map.lookup_all("11.0.0.0").unwrap().is_empty());
    }

    #[test]
    fn test_lookup_rejects_non_addresses() {
        let mut map = IpMap::new();
        map.insert("0.0.0.0/8", "bar").unwrap();
        for addr in ["", "foo", "999.999.999.999", "2.2.2.3a", "0.0.0.0/8", "::1"] {
            let err = map.lookup(addr).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidInput, "{:?}", addr);
            assert_eq!(err.to_string(), "value must be an IP address");
            assert!(map.lookup_match(addr).is_err());
            assert!(map.lookup_all(addr).is_err());
        }
    }

    #[test]
    fn test_typed_inserts() {
        let mut map = IpMap::new();
        map.insert_addr(Ipv4Addr::new(192, 168, 0, 1), "router");
        map.insert_range(Range::from_cidr(0xC0A8_0000, 16).unwrap(), "lan");

        assert_eq!(map.lookup_addr(Ipv4Addr::new(192, 168, 0, 1)), Some(&"router"));
        assert_eq!(map.lookup_addr(Ipv4Addr::new(192, 168, 7, 7)), Some(&"lan"));
        assert_eq!(map.lookup_addr(Ipv4Addr::new(192, 169, 0, 0)), None);
        assert_eq!(
            map.stats(),
            MapStats {
                exact_entries: 1,
                range_entries: 1,
                range_height: 1,
            }
        );
    }

    #[test]
    fn test_match_source_json() {
        let source = MatchSource::Range {
            range: Range::new(1, 2).unwrap(),
        };
        let json = serde_json::to_value(source).unwrap();
        assert_eq!(json["source"], "range");
        assert_eq!(json["range"]["start"], 1);
        assert_eq!(json["range"]["end"], 2);
    }
}
