use std::io;
use std::net::IpAddr;

use crate::error::ProbeError;

/// Address family of a resolved target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrFamily {
    V4,
    V6,
}

/// Resolve a host string to an IP address and its family.
///
/// Numeric addresses are accepted as-is without a DNS round trip. For host
/// names the first address returned by the system resolver wins.
pub fn resolve(address: &str) -> Result<(IpAddr, AddrFamily), ProbeError> {
    if let Ok(ip) = address.parse::<IpAddr>() {
        return Ok((ip, family_of(ip)));
    }

    let addrs = dns_lookup::lookup_host(address).map_err(|source| ProbeError::Resolve {
        addr: address.to_string(),
        source,
    })?;

    let ip = addrs.into_iter().next().ok_or_else(|| ProbeError::Resolve {
        addr: address.to_string(),
        source: io::Error::new(io::ErrorKind::NotFound, "lookup returned no addresses"),
    })?;

    Ok((ip, family_of(ip)))
}

fn family_of(ip: IpAddr) -> AddrFamily {
    match ip {
        IpAddr::V4(_) => AddrFamily::V4,
        IpAddr::V6(_) => AddrFamily::V6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn numeric_v4_resolves_without_lookup() {
        let (ip, family) = resolve("192.0.2.1").unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
        assert_eq!(family, AddrFamily::V4);
    }

    #[test]
    fn numeric_v6_reports_v6_family() {
        let (ip, family) = resolve("::1").unwrap();
        assert!(ip.is_ipv6());
        assert_eq!(family, AddrFamily::V6);
    }

    #[test]
    fn unresolvable_host_is_a_resolve_error() {
        // spaces are never valid in a host name, so this fails without
        // depending on the test environment's DNS setup
        let err = resolve("no such host").unwrap_err();
        assert!(matches!(err, ProbeError::Resolve { .. }));
    }
}
