//! Bogon (non-globally-routable address) classification.
//!
//! Pure, allocation-free checks over the address bits. No I/O.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Reserved IPv4 blocks, as (network, prefix length).
const IPV4_BOGON_RANGES: &[(Ipv4Addr, u8)] = &[
    (Ipv4Addr::new(0, 0, 0, 0), 8),
    (Ipv4Addr::new(100, 64, 0, 0), 10), // shared address space (CGNAT)
    (Ipv4Addr::new(127, 0, 0, 0), 8),
    (Ipv4Addr::new(169, 254, 0, 0), 16),
    (Ipv4Addr::new(224, 0, 0, 0), 4),
    (Ipv4Addr::new(240, 0, 0, 0), 4),
    (Ipv4Addr::new(255, 255, 255, 255), 32),
];

/// Reserved IPv6 blocks, as (network, prefix length).
const IPV6_BOGON_RANGES: &[(Ipv6Addr, u8)] = &[
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 0), 128),
    (Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1), 128),
    (Ipv6Addr::new(0x64, 0xff9b, 0, 0, 0, 0, 0, 0), 96), // NAT64
    (Ipv6Addr::new(0x100, 0, 0, 0, 0, 0, 0, 0), 64),  // discard-only
    (Ipv6Addr::new(0x2001, 0, 0, 0, 0, 0, 0, 0), 23),
    (Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0), 32), // documentation
    (Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 0), 7),
    (Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0), 10),
    (Ipv6Addr::new(0xff00, 0, 0, 0, 0, 0, 0, 0), 8),
];

/// Returns true if `ip` is not globally routable (private, loopback,
/// link-local, multicast or reserved).
pub fn is_bogon(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_bogon_ipv4(v4),
        // IPv4-mapped addresses are judged by the IPv4 address they carry
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_bogon_ipv4(v4),
            None => is_bogon_ipv6(v6),
        },
    }
}

fn is_bogon_ipv4(ip: Ipv4Addr) -> bool {
    if ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_multicast() {
        return true;
    }

    let bits = u32::from(ip);
    IPV4_BOGON_RANGES
        .iter()
        .any(|&(network, prefix)| bits & ipv4_mask(prefix) == u32::from(network))
}

fn is_bogon_ipv6(ip: Ipv6Addr) -> bool {
    let segments = ip.segments();

    // fc00::/7 (unique local) and fe80::/10 (link-local unicast)
    let unique_local = (segments[0] & 0xfe00) == 0xfc00;
    let link_local = (segments[0] & 0xffc0) == 0xfe80;
    if ip.is_loopback() || ip.is_multicast() || unique_local || link_local {
        return true;
    }

    let bits = u128::from(ip);
    IPV6_BOGON_RANGES
        .iter()
        .any(|&(network, prefix)| bits & ipv6_mask(prefix) == u128::from(network))
}

fn ipv4_mask(prefix: u8) -> u32 {
    u32::MAX.checked_shl(32 - u32::from(prefix)).unwrap_or(0)
}

fn ipv6_mask(prefix: u8) -> u128 {
    u128::MAX.checked_shl(128 - u32::from(prefix)).unwrap_or(0)
}
