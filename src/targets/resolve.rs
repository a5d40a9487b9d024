use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::lookup_host;
use tokio::sync::Semaphore;

const DEFAULT_HTTP_PORT: u16 = 80;

/// Why a host was dropped before crawling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unusable {
    /// The lookup failed or returned no address
    Unresolvable,
    /// The host resolved to 0.0.0.0 or ::
    Unspecified(IpAddr),
    /// The host resolved to a loopback address and loopback is not allowed
    Loopback(IpAddr),
}

/// Classifies the first resolved address of a host
pub fn check_address(ip: IpAddr, allow_loopback: bool) -> Result<IpAddr, Unusable> {
    if ip.is_unspecified() {
        Err(Unusable::Unspecified(ip))
    } else if ip.is_loopback() && !allow_loopback {
        Err(Unusable::Loopback(ip))
    } else {
        Ok(ip)
    }
}

/// Resolves a host (optionally carrying a port) to its first address
pub async fn resolve_host(host: &str) -> Option<IpAddr> {
    if let Ok(addr) = host.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    if let Ok(ip) = host.parse::<IpAddr>() {
        return Some(ip);
    }

    // Different ToSocketAddrs inputs give different iterator types
    let addrs: Vec<SocketAddr> = match host.rsplit_once(':') {
        Some((_, port)) if port.parse::<u16>().is_ok() => lookup_host(host).await.ok()?.collect(),
        _ => lookup_host((host, DEFAULT_HTTP_PORT)).await.ok()?.collect(),
    };

    addrs.first().map(|addr| addr.ip())
}

/// Checks that a host resolves to a usable address
pub async fn check_host(host: &str, allow_loopback: bool) -> Result<IpAddr, Unusable> {
    let ip = resolve_host(host).await.ok_or(Unusable::Unresolvable)?;
    check_address(ip, allow_loopback)
}

/// Keeps the hosts that resolve to a usable address, preserving order
///
/// Lookups run concurrently, at most `parallelism` at a time.
pub async fn filter_resolvable(
    hosts: Vec<String>,
    allow_loopback: bool,
    parallelism: usize,
) -> Vec<String> {
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let mut handles = Vec::with_capacity(hosts.len());

    for host in hosts {
        let semaphore = Arc::clone(&semaphore);
        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let checked = check_host(&host, allow_loopback).await;
            (host, checked)
        }));
    }

    let mut usable = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok((host, Ok(ip))) => {
                tracing::info!("  Validated Host IP: {} ({})", ip, host);
                tracing::info!("  pushing {}", host);
                usable.push(host);
            }
            Ok((host, Err(reason))) => {
                tracing::info!("  Skipping {}: {:?}", host, reason);
            }
            Err(e) => tracing::warn!("DNS lookup task panicked: {}", e),
        }
    }

    usable
}
