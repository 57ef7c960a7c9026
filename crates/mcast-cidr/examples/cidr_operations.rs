//! CIDR operations example
//!
//! Run with: cargo run -p mcast-cidr --example cidr_operations -- [INTERFACE]

use mcast_cidr::{ip_list_cidr, Cidr};
use mcast_iface::get_interface;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("mcast - CIDR Operations Example\n");

    // Enumerate a small multicast group range
    let groups = ip_list_cidr("239.1.1.0/29")?;

    println!("Groups in 239.1.1.0/29:");
    for (i, group) in groups.iter().enumerate() {
        println!("  {}: {}", i + 1, group);
    }

    // Walk a large block lazily instead of materializing it
    let cidr = Cidr::parse("239.0.0.0/8")?;

    println!("\nCIDR: {}", cidr);
    println!("─────────────────────────────");
    println!("Network:       {}", cidr.network_addr());
    println!("Broadcast:     {}", cidr.broadcast_addr());
    println!("Total IPs:     {}", cidr.size());
    println!("Multicast:     {}", cidr.is_multicast());

    println!("\nLast 3 IPs in range:");
    for ip in cidr.iter().rev().take(3) {
        println!("  {}", ip);
    }

    // Empty name means no interface was requested
    let name = std::env::args().nth(1).unwrap_or_default();
    match get_interface(&name)? {
        Some(iface) => {
            println!("\nInterface {} (index {})", iface.name, iface.index);
            println!("Multicast capable: {}", iface.supports_multicast());
            for addr in iface.ipv4_addrs() {
                println!("  {}", addr);
            }
        }
        None => println!("\nNo interface requested"),
    }

    Ok(())
}
