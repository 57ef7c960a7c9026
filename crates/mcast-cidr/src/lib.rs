//! CIDR operations and address range enumeration
//!
//! Provides utilities for turning CIDR notation into address lists:
//! - Split "address[/prefix]" strings ([`split_cidr`])
//! - Parse CIDR blocks, masking the base address down to the network
//! - Materialize every address in a block ([`ip_list`], [`ip_list_cidr`])
//! - Lazily iterate large blocks ([`Cidr::iter`])
//!
//! # Examples
//!
//! ```
//! use mcast_cidr::ip_list_cidr;
//! use std::net::Ipv4Addr;
//!
//! let ips = ip_list_cidr("192.168.1.0/30").unwrap();
//! assert_eq!(ips.len(), 4);
//! assert_eq!(ips[0], Ipv4Addr::new(192, 168, 1, 0)); // network
//! assert_eq!(ips[3], Ipv4Addr::new(192, 168, 1, 3)); // broadcast
//! ```

use mcast_core::config::RangeLimits;
use mcast_core::{int_to_ip4, ip4_to_int, parse_ipv4, AddressError, IPV4_BITS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Prefix length used when an address carries no mask
pub const HOST_PREFIX: i32 = 32;

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Invalid CIDR notation
    #[error("Invalid CIDR notation: {0}")]
    InvalidNotation(String),

    /// Invalid IP address
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),

    /// Prefix is not an integer
    #[error("Invalid prefix: {0}")]
    InvalidPrefix(String),

    /// Invalid prefix length
    #[error("Invalid prefix length: {0} (must be 0-32)")]
    InvalidPrefixLength(i32),

    /// Range too large
    #[error("CIDR range too large: /{0} (use smaller prefix)")]
    RangeTooLarge(u8),
}

impl From<AddressError> for CidrError {
    fn from(err: AddressError) -> Self {
        match err {
            AddressError::InvalidIpAddress(s) => CidrError::InvalidIpAddress(s),
            AddressError::NotIpv4(ip) => CidrError::InvalidIpAddress(ip.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// Split an address into its address and prefix parts
///
/// An address without a `/` is a host route and gets a prefix of 32. The
/// address part is returned as-is; it is validated when the block is parsed.
///
/// # Examples
///
/// ```
/// use mcast_cidr::split_cidr;
///
/// assert_eq!(split_cidr("10.0.0.1").unwrap(), ("10.0.0.1", 32));
/// assert_eq!(split_cidr("10.0.0.0/24").unwrap(), ("10.0.0.0", 24));
/// assert!(split_cidr("10.0.0.0/abc").is_err());
/// ```
pub fn split_cidr(address: &str) -> Result<(&str, i32)> {
    match address.split_once('/') {
        None => Ok((address, HOST_PREFIX)),
        Some((network, prefix)) => {
            let prefix = prefix
                .parse()
                .map_err(|_| CidrError::InvalidPrefix(prefix.to_string()))?;
            Ok((network, prefix))
        }
    }
}

/// List every address in the network containing `network`/`prefix`
///
/// The list runs from the network address to the broadcast address, both
/// included. The base address does not need to be the network address; it
/// is masked first. Blocks shorter than the default [`RangeLimits`] are
/// rejected with [`CidrError::RangeTooLarge`]. The address must be
/// dotted-quad text; IPv6 text, IPv4-mapped forms included, is an
/// [`CidrError::InvalidIpAddress`].
pub fn ip_list(network: &str, prefix: i32) -> Result<Vec<Ipv4Addr>> {
    ip_list_with_limits(network, prefix, &RangeLimits::default())
}

/// List every address in a block, using explicit limits
///
/// Pass [`RangeLimits::unbounded`] to allow any prefix, /0 included.
pub fn ip_list_with_limits(
    network: &str,
    prefix: i32,
    limits: &RangeLimits,
) -> Result<Vec<Ipv4Addr>> {
    let cidr = Cidr::from_parts(network, prefix)?;

    if !limits.allows(cidr.prefix_len()) {
        debug!(%cidr, min_prefix_len = limits.min_prefix_len, "refusing to materialize block");
        return Err(CidrError::RangeTooLarge(cidr.prefix_len()));
    }

    debug!(%cidr, count = cidr.size(), "materializing block");
    Ok(cidr.to_vec())
}

/// List every address for an "address[/prefix]" string
///
/// Combines [`split_cidr`] and [`ip_list`]; a bare address yields a
/// one-element list.
pub fn ip_list_cidr(address: &str) -> Result<Vec<Ipv4Addr>> {
    let (network, prefix) = split_cidr(address)?;
    ip_list(network, prefix)
}

fn mask_for(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        u32::MAX << (IPV4_BITS - prefix_len)
    }
}

/// CIDR block representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cidr {
    /// Network address (base IP, host bits cleared)
    network: u32,
    /// Prefix length (0-32)
    prefix_len: u8,
    /// Network mask
    mask: u32,
}

impl Cidr {
    /// Parse CIDR notation string
    ///
    /// # Arguments
    ///
    /// * `cidr` - CIDR string (e.g., "192.168.1.0/24")
    ///
    /// # Examples
    ///
    /// ```
    /// use mcast_cidr::Cidr;
    ///
    /// let cidr = Cidr::parse("239.1.1.7/24").unwrap();
    /// assert_eq!(cidr.prefix_len(), 24);
    /// assert_eq!(cidr.to_string(), "239.1.1.0/24");
    /// ```
    pub fn parse(cidr: &str) -> Result<Self> {
        let (network, prefix) = cidr.split_once('/').ok_or_else(|| {
            CidrError::InvalidNotation(format!("Expected format: x.x.x.x/prefix, got {}", cidr))
        })?;

        let prefix: i32 = prefix
            .parse()
            .map_err(|_| CidrError::InvalidPrefix(prefix.to_string()))?;

        Self::from_parts(network, prefix)
    }

    /// Build a block from an address string and a prefix length
    ///
    /// The prefix is checked before the address is parsed.
    pub fn from_parts(network: &str, prefix: i32) -> Result<Self> {
        let prefix_len = u8::try_from(prefix)
            .ok()
            .filter(|&p| p <= IPV4_BITS)
            .ok_or(CidrError::InvalidPrefixLength(prefix))?;

        let ip = parse_ipv4(network)?;
        Self::new(ip4_to_int(ip)?, prefix_len)
    }

    /// Create new CIDR from network address and prefix length
    ///
    /// Host bits of `network` are cleared.
    pub fn new(network: u32, prefix_len: u8) -> Result<Self> {
        if prefix_len > IPV4_BITS {
            return Err(CidrError::InvalidPrefixLength(i32::from(prefix_len)));
        }

        let mask = mask_for(prefix_len);

        Ok(Self {
            network: network & mask,
            prefix_len,
            mask,
        })
    }

    /// Get network address
    pub fn network(&self) -> u32 {
        self.network
    }

    /// Get network address as an [`Ipv4Addr`]
    pub fn network_addr(&self) -> Ipv4Addr {
        int_to_ip4(self.network)
    }

    /// Get prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Get network mask
    pub fn mask(&self) -> u32 {
        self.mask
    }

    /// Get broadcast address
    pub fn broadcast(&self) -> u32 {
        self.network | !self.mask
    }

    /// Get broadcast address as an [`Ipv4Addr`]
    pub fn broadcast_addr(&self) -> Ipv4Addr {
        int_to_ip4(self.broadcast())
    }

    /// Get total number of IPs in this CIDR block
    pub fn size(&self) -> u64 {
        1u64 << (IPV4_BITS - self.prefix_len)
    }

    /// Check if IP address is in this CIDR block
    pub fn contains(&self, ip: u32) -> bool {
        (ip & self.mask) == self.network
    }

    /// Check if an [`Ipv4Addr`] is in this CIDR block
    pub fn contains_addr(&self, ip: Ipv4Addr) -> bool {
        self.contains(u32::from(ip))
    }

    /// Whether the whole block lies inside 224.0.0.0/4
    pub fn is_multicast(&self) -> bool {
        self.prefix_len >= 4 && (self.network & 0xF000_0000) == 0xE000_0000
    }

    /// Get iterator over all IPs in this CIDR block
    ///
    /// The iterator is lazy and never allocates, so it is the way to walk
    /// blocks too large for [`Cidr::to_vec`].
    pub fn iter(&self) -> CidrIterator {
        CidrIterator::new(*self)
    }

    /// Collect every address in this block, network to broadcast
    pub fn to_vec(&self) -> Vec<Ipv4Addr> {
        self.iter().collect()
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network_addr(), self.prefix_len)
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Cidr {
    type Error = CidrError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<Cidr> for String {
    fn from(cidr: Cidr) -> Self {
        cidr.to_string()
    }
}

impl IntoIterator for &Cidr {
    type Item = Ipv4Addr;
    type IntoIter = CidrIterator;

    fn into_iter(self) -> CidrIterator {
        self.iter()
    }
}

/// Iterator over IPs in a CIDR block
///
/// Yields `network | offset` for each host offset in ascending order.
#[derive(Debug, Clone)]
pub struct CidrIterator {
    network: u32,
    front: u64,
    back: u64,
}

impl CidrIterator {
    fn new(cidr: Cidr) -> Self {
        Self {
            network: cidr.network(),
            front: 0,
            back: cidr.size(),
        }
    }

    fn addr_at(&self, offset: u64) -> Ipv4Addr {
        int_to_ip4(self.network | offset as u32)
    }
}

impl Iterator for CidrIterator {
    type Item = Ipv4Addr;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let ip = self.addr_at(self.front);
            self.front += 1;
            Some(ip)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.back - self.front) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl DoubleEndedIterator for CidrIterator {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            self.back -= 1;
            Some(self.addr_at(self.back))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_cidr_host() {
        assert_eq!(split_cidr("10.0.0.1").unwrap(), ("10.0.0.1", 32));
    }

    #[test]
    fn test_split_cidr_with_prefix() {
        assert_eq!(split_cidr("10.0.0.0/24").unwrap(), ("10.0.0.0", 24));
        assert_eq!(split_cidr("10.0.0.0/+8").unwrap(), ("10.0.0.0", 8));
    }

    #[test]
    fn test_split_cidr_does_not_validate_address() {
        assert_eq!(split_cidr("not-an-ip/16").unwrap(), ("not-an-ip", 16));
        assert_eq!(split_cidr("").unwrap(), ("", 32));
    }

    #[test]
    fn test_split_cidr_invalid_prefix() {
        assert_eq!(
            split_cidr("10.0.0.0/abc"),
            Err(CidrError::InvalidPrefix("abc".to_string()))
        );
        assert!(split_cidr("10.0.0.0/").is_err());
        assert!(split_cidr("10.0.0.0/24/8").is_err());
    }

    #[test]
    fn test_parse_cidr() {
        let cidr = Cidr::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.network(), 0xC0A80100);
        assert_eq!(cidr.prefix_len(), 24);
        assert_eq!(cidr.mask(), 0xFFFFFF00);
    }

    #[test]
    fn test_parse_masks_host_bits() {
        let cidr = Cidr::parse("10.1.2.3/8").unwrap();
        assert_eq!(cidr.network_addr(), Ipv4Addr::new(10, 0, 0, 0));
    }

    #[test]
    fn test_parse_invalid_cidr() {
        assert!(matches!(
            Cidr::parse("192.168.1.0"),
            Err(CidrError::InvalidNotation(_))
        ));
        assert_eq!(
            Cidr::parse("192.168.1.0/33"),
            Err(CidrError::InvalidPrefixLength(33))
        );
        assert_eq!(
            Cidr::parse("192.168.1.0/-1"),
            Err(CidrError::InvalidPrefixLength(-1))
        );
        assert!(matches!(
            Cidr::parse("256.0.0.0/24"),
            Err(CidrError::InvalidIpAddress(_))
        ));
        assert!(matches!(
            Cidr::parse("2001:db8::/32"),
            Err(CidrError::InvalidIpAddress(_))
        ));
    }

    #[test]
    fn test_cidr_contains() {
        let cidr = Cidr::parse("192.168.1.0/24").unwrap();
        assert!(cidr.contains(0xC0A80100)); // 192.168.1.0
        assert!(cidr.contains(0xC0A801FF)); // 192.168.1.255
        assert!(!cidr.contains(0xC0A80001)); // 192.168.0.1
        assert!(cidr.contains_addr(Ipv4Addr::new(192, 168, 1, 77)));
    }

    #[test]
    fn test_cidr_broadcast() {
        let cidr = Cidr::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.broadcast_addr(), Ipv4Addr::new(192, 168, 1, 255));

        let all = Cidr::new(0, 0).unwrap();
        assert_eq!(all.broadcast(), u32::MAX);
        assert_eq!(all.size(), 1u64 << 32);
    }

    #[test]
    fn test_cidr_is_multicast() {
        assert!(Cidr::parse("224.0.0.0/4").unwrap().is_multicast());
        assert!(Cidr::parse("239.255.0.0/16").unwrap().is_multicast());
        assert!(!Cidr::parse("192.168.1.0/24").unwrap().is_multicast());
        assert!(!Cidr::parse("192.0.0.0/2").unwrap().is_multicast());
    }

    #[test]
    fn test_cidr_iterator_both_ends() {
        let cidr = Cidr::parse("10.0.0.0/30").unwrap();
        let mut it = cidr.iter();
        assert_eq!(it.size_hint(), (4, Some(4)));
        assert_eq!(it.next(), Some(Ipv4Addr::new(10, 0, 0, 0)));
        assert_eq!(it.next_back(), Some(Ipv4Addr::new(10, 0, 0, 3)));
        assert_eq!(it.next(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(it.next_back(), Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_cidr_iterator_restarts() {
        let cidr = Cidr::parse("10.0.0.0/31").unwrap();
        let first: Vec<_> = cidr.iter().collect();
        let second: Vec<_> = (&cidr).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cidr_iterator_unbounded_is_lazy() {
        let cidr = Cidr::new(0, 0).unwrap();
        let tail: Vec<_> = cidr.iter().rev().take(2).collect();
        assert_eq!(
            tail,
            vec![
                Ipv4Addr::new(255, 255, 255, 255),
                Ipv4Addr::new(255, 255, 255, 254)
            ]
        );
    }

    #[test]
    fn test_ip_list_cidr_slash_30() {
        let ips = ip_list_cidr("192.168.1.0/30").unwrap();
        assert_eq!(
            ips,
            vec![
                Ipv4Addr::new(192, 168, 1, 0),
                Ipv4Addr::new(192, 168, 1, 1),
                Ipv4Addr::new(192, 168, 1, 2),
                Ipv4Addr::new(192, 168, 1, 3),
            ]
        );
    }

    #[test]
    fn test_ip_list_slash_32() {
        let ips = ip_list("239.1.2.3", 32).unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(239, 1, 2, 3)]);

        let ips = ip_list_cidr("239.1.2.3").unwrap();
        assert_eq!(ips, vec![Ipv4Addr::new(239, 1, 2, 3)]);
    }

    #[test]
    fn test_ip_list_from_host_address() {
        let ips = ip_list("10.9.8.7", 29).unwrap();
        assert_eq!(ips.len(), 8);
        assert_eq!(ips[0], Ipv4Addr::new(10, 9, 8, 0));
        assert_eq!(ips[7], Ipv4Addr::new(10, 9, 8, 7));
    }

    #[test]
    fn test_ip_list_errors() {
        assert_eq!(ip_list("10.0.0.0", 33), Err(CidrError::InvalidPrefixLength(33)));
        assert!(matches!(ip_list("10.0.0", 24), Err(CidrError::InvalidIpAddress(_))));
        assert!(matches!(ip_list_cidr("10.0.0.0/x"), Err(CidrError::InvalidPrefix(_))));
        assert!(matches!(ip_list_cidr("nope/24"), Err(CidrError::InvalidIpAddress(_))));
    }

    #[test]
    fn test_ip_list_rejects_mapped_v6_text() {
        // A /24 after IPv6 text is an IPv6 prefix; it must not be read as IPv4.
        assert_eq!(
            ip_list("::ffff:10.0.0.0", 24),
            Err(CidrError::InvalidIpAddress("::ffff:10.0.0.0".to_string()))
        );
        assert!(matches!(
            ip_list_cidr("::ffff:10.0.0.0/120"),
            Err(CidrError::InvalidIpAddress(_))
        ));
    }

    #[test]
    fn test_ip_list_range_limit() {
        assert_eq!(ip_list("10.0.0.0", 7), Err(CidrError::RangeTooLarge(7)));
        assert_eq!(ip_list("0.0.0.0", 0), Err(CidrError::RangeTooLarge(0)));

        let limits = RangeLimits::new(28).unwrap();
        assert_eq!(
            ip_list_with_limits("10.0.0.0", 27, &limits),
            Err(CidrError::RangeTooLarge(27))
        );
        assert_eq!(ip_list_with_limits("10.0.0.0", 28, &limits).unwrap().len(), 16);
    }

    #[test]
    fn test_cidr_display() {
        let cidr = Cidr::parse("192.168.1.0/24").unwrap();
        assert_eq!(cidr.to_string(), "192.168.1.0/24");
        let parsed: Cidr = "192.168.1.0/24".parse().unwrap();
        assert_eq!(parsed, cidr);
    }

    #[test]
    fn test_cidr_serialization() {
        let cidr = Cidr::parse("239.0.0.0/8").unwrap();
        let json = serde_json::to_string(&cidr).expect("serialization failed");
        assert_eq!(json, r#""239.0.0.0/8""#);

        let back: Cidr = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(back, cidr);

        assert!(serde_json::from_str::<Cidr>(r#""239.0.0.0/40""#).is_err());
    }

    proptest! {
        #[test]
        fn prop_ip_list_spans_block(addr in any::<u32>(), prefix in 20i32..=32) {
            let network = int_to_ip4(addr).to_string();
            let ips = ip_list(&network, prefix).unwrap();
            let host_mask = u32::MAX.checked_shr(prefix as u32).unwrap_or(0);
            let net = addr & !host_mask;

            prop_assert_eq!(ips.len() as u64, 1u64 << (32 - prefix));
            prop_assert_eq!(ips[0], int_to_ip4(net));
            prop_assert_eq!(*ips.last().unwrap(), int_to_ip4(net | host_mask));
        }
    }
}
