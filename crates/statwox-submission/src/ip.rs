//! Caller address resolution and IPv4 allowlist matching.

use std::net::Ipv4Addr;

use tracing::warn;

/// Placeholder address when no forwarding header is present.
pub const UNKNOWN_IP: &str = "unknown";

/// Resolve the caller's address: first entry of `X-Forwarded-For`, else
/// `X-Real-IP`, else [`UNKNOWN_IP`].
pub fn client_ip(forwarded_for: Option<&str>, real_ip: Option<&str>) -> String {
    forwarded_for
        .filter(|v| !v.trim().is_empty())
        .or(real_ip.filter(|v| !v.trim().is_empty()))
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_IP.to_string())
}

/// True when `ip` matches at least one entry. An empty list allows everyone.
pub fn ip_allowed(allowlist: &[String], ip: &str) -> bool {
    allowlist.is_empty() || allowlist.iter().any(|entry| matches_entry(entry, ip))
}

/// Match one allowlist entry: an exact dotted quad or an `a.b.c.d/len` block.
pub fn matches_entry(entry: &str, ip: &str) -> bool {
    let entry = entry.trim();

    let Some((network, prefix)) = entry.split_once('/') else {
        return entry == ip
            || matches!((entry.parse::<Ipv4Addr>(), ip.parse::<Ipv4Addr>()), (Ok(a), Ok(b)) if a == b);
    };

    let (Ok(network), Ok(prefix)) = (network.parse::<Ipv4Addr>(), prefix.parse::<u8>()) else {
        warn!(entry = entry, "ignoring malformed allowlist entry");
        return false;
    };
    if prefix > 32 {
        warn!(entry = entry, "ignoring allowlist entry with prefix longer than 32");
        return false;
    }

    let Ok(ip) = ip.parse::<Ipv4Addr>() else {
        return false;
    };

    let mask = prefix_mask(prefix);
    u32::from(ip) & mask == u32::from(network) & mask
}

fn prefix_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}
