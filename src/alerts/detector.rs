//! Gateway MAC spoofing detection
//!
//! The gateway ("modem") is the host whose IPv4 address ends in `.1`. Its
//! hardware address is captured once when monitoring starts. Any *other* IP
//! later seen with that same hardware address is the signature of an ARP
//! spoofing (man-in-the-middle) attack.

use std::net::Ipv4Addr;

use crate::models::NeighborTable;

/// True for addresses of the form `a.b.c.1`
pub fn is_gateway_ip(ip: &Ipv4Addr) -> bool {
    ip.octets()[3] == 1
}

/// Hardware address of the first gateway-looking entry in the table
pub fn capture_modem_address(table: &NeighborTable) -> Option<String> {
    table
        .values()
        .find(|entry| is_gateway_ip(&entry.ip))
        .map(|entry| entry.hardware_address.clone())
}

/// Per-host predicate: a non-gateway host using the modem's hardware address.
pub fn is_spoofing_gateway(ip: &Ipv4Addr, mac: &str, modem_mac: Option<&str>) -> bool {
    match modem_mac {
        Some(modem) => !is_gateway_ip(ip) && mac.eq_ignore_ascii_case(modem),
        None => false,
    }
}

/// Table-wide flag, the OR of [`is_spoofing_gateway`] over every entry.
pub fn detect_gateway_spoofing(table: &NeighborTable, modem_mac: Option<&str>) -> bool {
    table
        .values()
        .any(|entry| is_spoofing_gateway(&entry.ip, &entry.hardware_address, modem_mac))
}

/// IPs that currently share the modem's hardware address
pub fn spoofing_suspects(table: &NeighborTable, modem_mac: Option<&str>) -> Vec<Ipv4Addr> {
    table
        .values()
        .filter(|entry| is_spoofing_gateway(&entry.ip, &entry.hardware_address, modem_mac))
        .map(|entry| entry.ip)
        .collect()
}
