//! IPv4 address and CIDR parsing
//!
//! Every structure in this crate works on the integer form of an IPv4 address
//! (`u32::from(Ipv4Addr)`). This module turns text into that form:
//!
//! - [`parse_address`] - strict dotted-decimal address to integer
//! - [`is_valid_address`] - syntactic gate used by lookups
//! - [`parse_cidr`] - `address/prefix` to the inclusive [`Range`] it covers
//!
//! IPv6 text is rejected everywhere; it is neither an address nor a CIDR
//! block for the purposes of this crate.

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Widest IPv4 prefix length
pub const MAX_PREFIX_LEN: u8 = 32;

/// Inclusive range of integer IPv4 addresses
///
/// `start <= end` always holds; both endpoints belong to the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    start: u32,
    end: u32,
}

impl Range {
    /// Create a range, or `None` if `start > end`
    pub fn new(start: u32, end: u32) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Range holding a single address
    pub fn single(addr: u32) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Range covered by a CIDR block, network through broadcast address
    ///
    /// Host bits in `addr` are ignored. Returns `None` if `prefix_len` exceeds 32.
    ///
    /// # Example
    /// ```
    /// use ipmap::Range;
    ///
    /// let range = Range::from_cidr(0x0A00_0001, 8).unwrap();
    /// assert_eq!(range.start(), 0x0A00_0000);
    /// assert_eq!(range.end(), 0x0AFF_FFFF);
    /// ```
    pub fn from_cidr(addr: u32, prefix_len: u8) -> Option<Self> {
        if prefix_len > MAX_PREFIX_LEN {
            return None;
        }
        let mask = prefix_mask(prefix_len);
        let start = addr & mask;
        Some(Self {
            start,
            end: start | !mask,
        })
    }

    /// First address in the range
    pub fn start(&self) -> u32 {
        self.start
    }

    /// Last address in the range
    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether `point` lies within the range (inclusive at both ends)
    #[inline]
    pub fn contains(&self, point: u32) -> bool {
        self.start <= point && point <= self.end
    }

    /// Number of addresses covered
    pub fn size(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            Ipv4Addr::from(self.start),
            Ipv4Addr::from(self.end)
        )
    }
}

fn prefix_mask(prefix_len: u8) -> u32 {
    // `u32 << 32` overflows, so /0 is handled separately
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix_len))
    }
}

/// Parse a dotted-decimal IPv4 address into its integer form
///
/// Accepts exactly four decimal octets in 0..=255 with no leading zeros,
/// whitespace or trailing characters.
///
/// # Example
/// ```
/// use ipmap::addr::parse_address;
///
/// assert_eq!(parse_address("127.0.0.1"), Some(0x7F00_0001));
/// assert_eq!(parse_address("999.999.999.999"), None);
/// assert_eq!(parse_address("::1"), None);
/// ```
pub fn parse_address(text: &str) -> Option<u32> {
    text.parse::<Ipv4Addr>().ok().map(u32::from)
}

/// Whether `text` is a bare IPv4 address
pub fn is_valid_address(text: &str) -> bool {
    parse_address(text).is_some()
}

/// Parse `address/prefix` into the inclusive range the block covers
///
/// The prefix must be a plain run of ASCII digits with a value of at most 32;
/// signs, fractions, empty prefixes and extra `/` separators are rejected.
pub fn parse_cidr(text: &str) -> Option<Range> {
    let (addr_str, prefix_str) = text.split_once('/')?;
    let addr = parse_address(addr_str)?;
    let prefix_len = parse_prefix_len(prefix_str)?;
    Range::from_cidr(addr, prefix_len)
}

fn parse_prefix_len(text: &str) -> Option<u8> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Long digit runs overflow u8 and are rejected along with values over 32
    let prefix_len = text.parse::<u8>().ok()?;
    (prefix_len <= MAX_PREFIX_LEN).then_some(prefix_len)
}
