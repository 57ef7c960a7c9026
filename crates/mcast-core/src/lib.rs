//! Core address types and conversions for mcast
//!
//! This crate provides the IPv4 primitives shared by the rest of the workspace:
//! - [`ip4_to_int`] / [`int_to_ip4`] - big-endian address ⇄ `u32` conversion
//! - [`to_ipv4`] - normalization of any [`IpAddr`] to its 4-byte form
//! - [`AddressError`] - error types
//! - [`config::RangeLimits`] - limits on range materialization
//!
//! ```
//! use mcast_core::{int_to_ip4, ip4_to_int};
//! use std::net::Ipv4Addr;
//!
//! let n = ip4_to_int(Ipv4Addr::new(192, 168, 1, 1)).unwrap();
//! assert_eq!(n, 0xC0A80101);
//! assert_eq!(int_to_ip4(n), Ipv4Addr::new(192, 168, 1, 1));
//! ```

use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

pub mod config;

/// Number of bytes in an IPv4 address
pub const IPV4_ADDRESS_LENGTH: usize = 4;

/// Number of bits in an IPv4 address
pub const IPV4_BITS: u8 = 32;

/// Error types for address operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Address has no 4-byte IPv4 form
    #[error("Not an IPv4 address: {0}")]
    NotIpv4(IpAddr),

    /// Address text could not be parsed
    #[error("Invalid IP address: {0}")]
    InvalidIpAddress(String),
}

/// Result type alias for address operations
pub type Result<T> = std::result::Result<T, AddressError>;

/// Normalize an address to its 4-byte IPv4 form
///
/// IPv4 addresses pass through unchanged. IPv4-mapped IPv6 addresses
/// (`::ffff:a.b.c.d`) are unwrapped. Any other IPv6 address is rejected.
///
/// # Examples
///
/// ```
/// use mcast_core::to_ipv4;
/// use std::net::{IpAddr, Ipv4Addr};
///
/// let mapped: IpAddr = "::ffff:10.0.0.1".parse().unwrap();
/// assert_eq!(to_ipv4(mapped).unwrap(), Ipv4Addr::new(10, 0, 0, 1));
/// assert!(to_ipv4("2001:db8::1".parse().unwrap()).is_err());
/// ```
pub fn to_ipv4(ip: IpAddr) -> Result<Ipv4Addr> {
    match ip {
        IpAddr::V4(v4) => Ok(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped().ok_or(AddressError::NotIpv4(ip)),
    }
}

/// Parse dotted-quad address text
///
/// IPv6 text is rejected, IPv4-mapped forms included: a prefix length that
/// follows such text counts IPv6 bits, not IPv4 bits.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    s.parse()
        .map_err(|_| AddressError::InvalidIpAddress(s.to_string()))
}

/// Convert an IPv4 address to its big-endian `u32` representation
///
/// # Arguments
///
/// * `ip` - Any address convertible to [`IpAddr`]; it is normalized with
///   [`to_ipv4`] first.
///
/// # Errors
///
/// Returns [`AddressError::NotIpv4`] when the address has no 4-byte form.
pub fn ip4_to_int(ip: impl Into<IpAddr>) -> Result<u32> {
    let octets: [u8; IPV4_ADDRESS_LENGTH] = to_ipv4(ip.into())?.octets();
    Ok(u32::from_be_bytes(octets))
}

/// Convert a big-endian `u32` into an IPv4 address
pub fn int_to_ip4(n: u32) -> Ipv4Addr {
    let octets: [u8; IPV4_ADDRESS_LENGTH] = n.to_be_bytes();
    Ipv4Addr::from(octets)
}
