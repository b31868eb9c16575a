//! Local address discovery for the startup announcement.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tracing::warn;

/// Returns the URLs a LAN peer can use to reach a server bound to `bound`.
///
/// A wildcard bind is announced once per non-loopback IPv4 interface address;
/// a specific IPv4 bind is announced as itself unless it is loopback, which
/// no peer can reach.
pub fn local_urls(bound: SocketAddr) -> Vec<String> {
    match bound.ip() {
        IpAddr::V4(ip) if !ip.is_unspecified() => urls_for([IpAddr::V4(ip)], bound.port()),
        _ => match if_addrs::get_if_addrs() {
            Ok(interfaces) => {
                urls_for(interfaces.iter().map(|iface| iface.ip()), bound.port())
            }
            Err(e) => {
                warn!(error = %e, "cannot list network interfaces");
                Vec::new()
            }
        },
    }
}

/// Formats `http://<ip>:<port>` for every non-loopback IPv4 address, once each.
pub fn urls_for<I>(addrs: I, port: u16) -> Vec<String>
where
    I: IntoIterator<Item = IpAddr>,
{
    let mut seen: Vec<Ipv4Addr> = Vec::new();
    for addr in addrs {
        if let IpAddr::V4(ip) = addr {
            if !ip.is_loopback() && !ip.is_unspecified() && !seen.contains(&ip) {
                seen.push(ip);
            }
        }
    }
    seen.into_iter().map(|ip| url_for(ip, port)).collect()
}

fn url_for(ip: Ipv4Addr, port: u16) -> String {
    format!("http://{ip}:{port}")
}
