//! Range materialization limits
//!
//! Enumerating a short-prefix network materializes up to 2^32 addresses.
//! [`RangeLimits`] bounds how large a block callers may expand into a list;
//! the consuming tool can override the default through the
//! `MCAST_MIN_PREFIX` environment variable.

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

use crate::IPV4_BITS;

/// Environment variable holding the minimum prefix length
pub const MIN_PREFIX_ENV: &str = "MCAST_MIN_PREFIX";

/// Default minimum prefix length (a /8 holds 16,777,216 addresses)
pub const DEFAULT_MIN_PREFIX: u8 = 8;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Value is not a prefix length
    #[error("Invalid value for {name}: {value} (must be 0-32)")]
    InvalidValue { name: &'static str, value: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Limits applied when expanding a CIDR block into an address list
///
/// Deserialization goes through [`RangeLimits::new`], so a loaded value is
/// always a valid prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRangeLimits")]
pub struct RangeLimits {
    /// Shortest prefix that may be materialized
    pub min_prefix_len: u8,
}

#[derive(Deserialize)]
struct RawRangeLimits {
    min_prefix_len: u8,
}

impl TryFrom<RawRangeLimits> for RangeLimits {
    type Error = ConfigError;

    fn try_from(raw: RawRangeLimits) -> Result<Self> {
        Self::new(raw.min_prefix_len)
    }
}

impl RangeLimits {
    /// Create limits with the given minimum prefix length
    pub fn new(min_prefix_len: u8) -> Result<Self> {
        if min_prefix_len > IPV4_BITS {
            return Err(ConfigError::InvalidValue {
                name: MIN_PREFIX_ENV,
                value: min_prefix_len.to_string(),
            });
        }
        Ok(Self { min_prefix_len })
    }

    /// Limits that allow every prefix, including /0
    pub const fn unbounded() -> Self {
        Self { min_prefix_len: 0 }
    }

    /// Load limits from the environment
    ///
    /// Reads `MCAST_MIN_PREFIX`; falls back to the default when unset.
    pub fn from_env() -> Result<Self> {
        match env::var(MIN_PREFIX_ENV) {
            Ok(value) => Self::parse(&value),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parse a minimum prefix length from text
    pub fn parse(value: &str) -> Result<Self> {
        let min_prefix_len: u8 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: MIN_PREFIX_ENV,
            value: value.to_string(),
        })?;
        Self::new(min_prefix_len).map_err(|_| ConfigError::InvalidValue {
            name: MIN_PREFIX_ENV,
            value: value.to_string(),
        })
    }

    /// Check whether a block with this prefix length may be materialized
    pub fn allows(&self, prefix_len: u8) -> bool {
        prefix_len >= self.min_prefix_len
    }

    /// Largest number of addresses a permitted block can hold
    ///
    /// Out-of-range limits (a prefix longer than 32) permit nothing.
    pub fn max_addresses(&self) -> u64 {
        IPV4_BITS
            .checked_sub(self.min_prefix_len)
            .and_then(|host_bits| 1u64.checked_shl(u32::from(host_bits)))
            .unwrap_or(0)
    }
}

impl Default for RangeLimits {
    fn default() -> Self {
        Self {
            min_prefix_len: DEFAULT_MIN_PREFIX,
        }
    }
}
