//! IPv4 prefixes on top of the bit-level trie.
//!
//! `"192.168.0.0/16"` becomes the first 16 bits of the address, most
//! significant first. By default host bits past the mask are ignored, so
//! `"10.1.2.3/8"` and `"10.0.0.0/8"` name the same prefix;
//! [`Ipv4Prefix::parse_strict`] rejects the former.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::bits::BitString;
use crate::error::{InsertError, PrefixParseError};
use crate::PrefixTrie;

/// All 32 bits of `addr`.
pub fn addr_bits(addr: Ipv4Addr) -> BitString {
    BitString::from_u32(u32::from(addr), 32)
}

#[inline]
fn mask(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - len)
    }
}

/// An IPv4 network: address plus mask length. The address is kept with its
/// host bits cleared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ipv4Prefix {
    addr: Ipv4Addr,
    len: u8,
}

impl Ipv4Prefix {
    /// # Panics
    ///
    /// Panics if `len > 32`.
    pub fn new(addr: Ipv4Addr, len: u8) -> Self {
        assert!(len <= 32, "IPv4 prefix length {len} exceeds 32");
        Self {
            addr: Ipv4Addr::from(u32::from(addr) & mask(len)),
            len,
        }
    }

    /// The zero-length prefix, matching every address.
    pub fn default_route() -> Self {
        Self::new(Ipv4Addr::UNSPECIFIED, 0)
    }

    /// Like [`FromStr`], but host bits set past the mask are an error.
    pub fn parse_strict(s: &str) -> Result<Self, PrefixParseError> {
        let (addr, len) = split_prefix(s)?;
        if u32::from(addr) & !mask(len) != 0 {
            return Err(PrefixParseError::HostBitsSet(s.to_string()));
        }
        Ok(Self::new(addr, len))
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    pub fn is_default(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.len) == u32::from(self.addr)
    }

    /// The first `len` bits of the address.
    pub fn to_bits(&self) -> BitString {
        BitString::from_u32(u32::from(self.addr), self.len as usize)
    }

    /// Inverse of [`to_bits`](Self::to_bits) for strings of at most 32 bits.
    fn from_bits(bits: &BitString) -> Option<Self> {
        if bits.len() > 32 {
            return None;
        }
        let raw = bits
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, bit)| acc | ((bit as u32) << (31 - i)));
        Some(Self::new(Ipv4Addr::from(raw), bits.len() as u8))
    }
}

fn split_prefix(s: &str) -> Result<(Ipv4Addr, u8), PrefixParseError> {
    let (addr, len) = s
        .split_once('/')
        .ok_or_else(|| PrefixParseError::MissingLength(s.to_string()))?;
    let addr: Ipv4Addr = addr.trim().parse()?;
    let len: u32 = len
        .trim()
        .parse()
        .map_err(|_| PrefixParseError::Length(len.to_string()))?;
    if len > 32 {
        return Err(PrefixParseError::LengthOutOfRange(len));
    }
    Ok((addr, len as u8))
}

impl FromStr for Ipv4Prefix {
    type Err = PrefixParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = split_prefix(s)?;
        Ok(Self::new(addr, len))
    }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.len)
    }
}

impl From<Ipv4Addr> for Ipv4Prefix {
    /// A host route (`/32`).
    fn from(addr: Ipv4Addr) -> Self {
        Self::new(addr, 32)
    }
}

/// An IPv4 forwarding table.
#[derive(Clone)]
pub struct RouteTable<V> {
    trie: PrefixTrie<V>,
}

impl<V> RouteTable<V> {
    pub fn new() -> Self {
        Self {
            trie: PrefixTrie::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Adds a route. An existing route for the same prefix is kept and the
    /// new value comes back in the error.
    pub fn insert(&mut self, prefix: Ipv4Prefix, value: V) -> Result<(), InsertError<V>> {
        self.trie.insert(&prefix.to_bits(), value)
    }

    /// Value of the most specific route covering `addr`.
    pub fn lookup(&self, addr: Ipv4Addr) -> Option<&V> {
        self.trie.longest_match(&addr_bits(addr))
    }

    /// Most specific route covering `addr`, with the prefix that matched.
    pub fn lookup_route(&self, addr: Ipv4Addr) -> Option<(Ipv4Prefix, &V)> {
        let (len, value) = self.trie.longest_match_with_len(&addr_bits(addr))?;
        Some((Ipv4Prefix::new(addr, len as u8), value))
    }

    pub fn get(&self, prefix: Ipv4Prefix) -> Option<&V> {
        self.trie.get_exact(&prefix.to_bits())
    }

    /// Routes in pre-order: shorter prefixes before the ones they cover.
    pub fn routes(&self) -> impl Iterator<Item = (Ipv4Prefix, &V)> + '_ {
        self.trie
            .iter()
            .filter_map(|(bits, value)| Some((Ipv4Prefix::from_bits(&bits)?, value)))
    }

    pub fn trie(&self) -> &PrefixTrie<V> {
        &self.trie
    }
}

impl<V> Default for RouteTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for RouteTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.routes()).finish()
    }
}
