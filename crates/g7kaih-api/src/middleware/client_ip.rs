//! Client address resolution behind trusted reverse proxies.

use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap};

use g7kaih_core::error::AppError;
use g7kaih_core::AppResult;

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Resolves the address a request should be attributed to.
///
/// The peer address is used as-is unless the peer is a trusted proxy, in
/// which case the right-most `X-Forwarded-For` entry that is not itself a
/// trusted proxy wins. Entries further left are client-controlled.
#[derive(Debug, Clone, Default)]
pub struct ClientIpResolver {
    trusted_proxies: HashSet<IpAddr>,
}

impl ClientIpResolver {
    /// Parses the trusted proxy list.
    pub fn new<I, S>(trusted_proxies: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trusted_proxies = trusted_proxies
            .into_iter()
            .filter(|s| !s.as_ref().trim().is_empty())
            .map(|s| parse_ip(s.as_ref(), "server.trusted_proxies"))
            .collect::<Result<_, _>>()?;
        Ok(Self { trusted_proxies })
    }

    fn is_trusted(&self, ip: &IpAddr) -> bool {
        self.trusted_proxies.contains(ip)
    }

    /// Resolves from the peer socket address and request headers.
    pub fn resolve(&self, peer: Option<IpAddr>, headers: &HeaderMap) -> Option<IpAddr> {
        let peer = peer.map(|ip| ip.to_canonical())?;
        if !self.is_trusted(&peer) {
            return Some(peer);
        }

        let forwarded: Vec<IpAddr> = headers
            .get_all(X_FORWARDED_FOR)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(','))
            .filter_map(|s| s.trim().parse::<IpAddr>().ok())
            .map(|ip| ip.to_canonical())
            .collect();

        forwarded
            .iter()
            .rev()
            .find(|ip| !self.is_trusted(ip))
            .or_else(|| forwarded.first())
            .copied()
            .or(Some(peer))
    }

    /// Resolves using the `ConnectInfo` the server attached to the request.
    pub fn resolve_request(&self, extensions: &Extensions, headers: &HeaderMap) -> Option<IpAddr> {
        let peer = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        self.resolve(peer, headers)
    }
}

/// Parses one configured address, naming the config key on failure.
pub(crate) fn parse_ip(raw: &str, key: &str) -> AppResult<IpAddr> {
    raw.trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_canonical())
        .map_err(|e| AppError::configuration(format!("Invalid address '{raw}' in {key}: {e}")))
}
