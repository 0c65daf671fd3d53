//! Host eligibility guard for active scanning.
//!
//! The crawler discovers sites freely, but an active scan is an attack and
//! only runs against hosts the pipeline explicitly allowed. With no allow-list
//! configured, only hosts that resolve to loopback or any-local addresses are
//! eligible. The guard fails closed on anything it cannot parse or resolve.

use std::net::IpAddr;
use tokio::net::lookup_host;
use url::{Host, Url};

/// `localhost.localdomain` does not resolve reliably on all platforms, so it
/// bypasses the resolution check entirely. A documented workaround, not a
/// security decision.
const RESOLUTION_EXEMPT_HOST: &str = "localhost.localdomain";

/// Decide whether an active scan may be launched against `site_url`.
///
/// Rules, in order:
/// - unparseable URL or missing host: not eligible
/// - host `localhost.localdomain`: always eligible
/// - non-empty `allowed_hosts`: eligible iff the host is a literal member
///   (no wildcard or subdomain matching)
/// - empty `allowed_hosts`: eligible iff the host resolves to a loopback or
///   unspecified (any-local) address; resolution failure is not eligible
pub async fn is_scannable(site_url: &str, allowed_hosts: &[String]) -> bool {
    let Ok(parsed) = Url::parse(site_url) else {
        tracing::warn!("Could not parse site URL {}. Not scanning.", site_url);
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    if host == RESOLUTION_EXEMPT_HOST {
        return true;
    }

    if !allowed_hosts.is_empty() {
        let allowed = allowed_hosts.iter().any(|entry| entry == host);
        if !allowed {
            tracing::info!(
                "Host {} is not in the allowed hosts list and is not a local host. Not scanning.",
                host
            );
        }
        return allowed;
    }

    match parsed.host() {
        Some(Host::Ipv4(ip)) => is_local(IpAddr::V4(ip)),
        Some(Host::Ipv6(ip)) => is_local(IpAddr::V6(ip)),
        Some(Host::Domain(domain)) => match lookup_host((domain, 0u16)).await {
            Ok(mut addrs) => addrs.any(|addr| is_local(addr.ip())),
            Err(e) => {
                tracing::warn!("Could not resolve host {}: {}. Not scanning.", domain, e);
                false
            }
        },
        None => false,
    }
}

fn is_local(ip: IpAddr) -> bool {
    ip.is_loopback() || ip.is_unspecified()
}
