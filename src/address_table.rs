//! Exact-match table from integer IPv4 address to attached value

use rustc_hash::FxHashMap;

/// Exact address table
///
/// Keys are integer addresses, so two spellings of the same address share
/// one slot. Inserting an existing address replaces its value.
#[derive(Debug, Clone)]
pub struct AddressTable<V> {
    entries: FxHashMap<u32, V>,
}

impl<V> AddressTable<V> {
    /// Create an empty table
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }

    /// Insert or overwrite the value for `addr`, returning the displaced value
    pub fn put(&mut self, addr: u32, value: V) -> Option<V> {
        self.entries.insert(addr, value)
    }

    /// Value stored for exactly `addr`
    #[inline]
    pub fn get(&self, addr: u32) -> Option<&V> {
        self.entries.get(&addr)
    }

    /// Number of distinct addresses stored
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no addresses
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(address, value)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &V)> {
        self.entries.iter().map(|(addr, value)| (*addr, value))
    }
}

impl<V> Default for AddressTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
