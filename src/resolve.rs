use std::net::IpAddr;

use tokio::net::lookup_host;
use tracing::debug;

use crate::error::{Error, Result};

/// Resolve `host` to the first address the system resolver returns.
///
/// IP literals are returned as-is without a lookup.
pub async fn resolve_host(host: &str) -> Result<IpAddr> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Ok(ip);
    }
    let mut addrs = lookup_host((host, 0))
        .await
        .map_err(|source| Error::Resolution {
            host: host.to_string(),
            source,
        })?;
    let ip = addrs
        .next()
        .map(|sa| sa.ip())
        .ok_or_else(|| Error::NoAddress(host.to_string()))?;
    debug!(%host, %ip, "resolved host");
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[tokio::test]
    async fn ip_literal_skips_lookup() {
        let ip = resolve_host("127.0.0.1").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn unresolvable_host_is_fatal() {
        // .invalid is reserved and never resolves
        let err = resolve_host("no-such-host.invalid").await.unwrap_err();
        assert!(err.is_fatal());
    }
}
