//! Scanner module - neighbor table discovery and host probing

pub mod neighbor;
pub mod ping;

pub use neighbor::{
    normalize_mac, parse_arp_a, parse_ip_neigh, NeighborSource, SystemNeighborSource,
};
pub use ping::{parse_ping_latency, HostProber, PingProber};
