//! Network interface resolution for mcast
//!
//! Looks up local interfaces by name for the `--interface` style options of
//! the traffic tool. An empty name means "no interface requested" and is
//! not an error.
//!
//! # Examples
//!
//! ```no_run
//! use mcast_iface::get_interface;
//!
//! match get_interface("eth0")? {
//!     Some(iface) => println!("{} (index {})", iface.name, iface.index),
//!     None => println!("no interface requested"),
//! }
//! # Ok::<(), mcast_iface::InterfaceError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use tracing::{debug, trace};

/// Interface lookup errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InterfaceError {
    /// No local interface has the requested name
    #[error("No such network interface: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, InterfaceError>;

/// Address assigned to an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddr {
    /// Assigned address
    pub addr: IpAddr,
    /// Prefix length of the attached network
    pub prefix_len: u8,
}

/// Snapshot of a local network interface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    /// Interface name (e.g., "eth0")
    pub name: String,
    /// OS interface index
    pub index: u32,
    /// Hardware address, if the link has one
    pub mac: Option<[u8; 6]>,
    /// Assigned addresses
    pub addrs: Vec<InterfaceAddr>,
    /// Administratively up
    pub up: bool,
    /// Loopback device
    pub loopback: bool,
    /// Multicast capable
    pub multicast: bool,
}

impl Interface {
    /// Whether the interface is up
    pub fn is_up(&self) -> bool {
        self.up
    }

    /// Whether the interface is a loopback device
    pub fn is_loopback(&self) -> bool {
        self.loopback
    }

    /// Whether multicast traffic can be sent through this interface
    pub fn supports_multicast(&self) -> bool {
        self.up && self.multicast
    }

    /// IPv4 addresses assigned to this interface
    pub fn ipv4_addrs(&self) -> impl Iterator<Item = Ipv4Addr> + '_ {
        self.addrs.iter().filter_map(|a| match a.addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
    }
}

impl From<pnet_datalink::NetworkInterface> for Interface {
    fn from(iface: pnet_datalink::NetworkInterface) -> Self {
        let addrs = iface
            .ips
            .iter()
            .map(|net| InterfaceAddr {
                addr: net.ip(),
                prefix_len: net.prefix(),
            })
            .collect();

        Self {
            up: iface.is_up(),
            loopback: iface.is_loopback(),
            multicast: iface.is_multicast(),
            mac: iface.mac.map(|m| [m.0, m.1, m.2, m.3, m.4, m.5]),
            index: iface.index,
            addrs,
            name: iface.name,
        }
    }
}

/// Source of local interface information
pub trait InterfaceTable {
    /// Current interfaces, in OS order
    fn interfaces(&self) -> Vec<Interface>;
}

/// The operating system's interface table
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceTable for SystemInterfaces {
    fn interfaces(&self) -> Vec<Interface> {
        let interfaces: Vec<Interface> = pnet_datalink::interfaces()
            .into_iter()
            .map(Interface::from)
            .collect();
        trace!(count = interfaces.len(), "read system interface table");
        interfaces
    }
}

/// Resolve an interface by name against the system table
///
/// Returns `Ok(None)` for an empty name.
///
/// # Errors
///
/// Returns [`InterfaceError::NotFound`] when a non-empty name matches no
/// local interface.
pub fn get_interface(name: &str) -> Result<Option<Interface>> {
    get_interface_from(&SystemInterfaces, name)
}

/// Resolve an interface by name against a given table
pub fn get_interface_from<T: InterfaceTable + ?Sized>(
    table: &T,
    name: &str,
) -> Result<Option<Interface>> {
    if name.is_empty() {
        return Ok(None);
    }

    match table.interfaces().into_iter().find(|iface| iface.name == name) {
        Some(iface) => Ok(Some(iface)),
        None => {
            debug!(name, "interface not found");
            Err(InterfaceError::NotFound(name.to_string()))
        }
    }
}

/// List all local interfaces
pub fn list_interfaces() -> Vec<Interface> {
    SystemInterfaces.interfaces()
}
