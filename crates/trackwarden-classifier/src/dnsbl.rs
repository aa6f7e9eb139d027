//! DNS blocklist reputation source
//!
//! Queries `<reversed-ip>.<zone>` for submitter addresses and
//! `<domain>.<zone>` for link domains. A blocklist lists a subject by
//! answering with an address inside `127.0.0.0/8`.

use async_trait::async_trait;
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, warn};
use trackwarden_domain::traits::{LookupError, Reputation, ReputationLookup};

/// Address lookups used by [`DnsblLookup`]
///
/// `Ok(None)` means the name does not exist (NXDOMAIN or no records);
/// `Err` is reserved for resolver failures.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Addresses for a fully qualified name
    async fn resolve(&self, name: &str) -> Result<Option<Vec<IpAddr>>, LookupError>;
}

/// Resolver backed by the system DNS configuration
pub struct SystemResolver {
    inner: TokioAsyncResolver,
}

impl SystemResolver {
    /// Resolver from `/etc/resolv.conf`, or hickory's defaults when that
    /// cannot be read
    pub fn new() -> Self {
        let inner = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
            warn!("Falling back to default resolver configuration: {}", e);
            TokioAsyncResolver::tokio(Default::default(), Default::default())
        });
        Self { inner }
    }
}

impl Default for SystemResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<Option<Vec<IpAddr>>, LookupError> {
        match self.inner.lookup_ip(name).await {
            Ok(lookup) => Ok(Some(lookup.iter().collect())),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => Ok(None),
                _ => Err(LookupError::Resolve(e.to_string())),
            },
        }
    }
}

/// Reputation lookups against DNS blocklists
#[derive(Clone)]
pub struct DnsblLookup {
    ip_zones: Vec<String>,
    host_zones: Vec<String>,
    resolver: Arc<dyn DnsResolver>,
}

impl DnsblLookup {
    /// Create a lookup over the given IP and host zones using the system resolver
    pub fn new(ip_zones: Vec<String>, host_zones: Vec<String>) -> Self {
        Self::with_resolver(ip_zones, host_zones, Arc::new(SystemResolver::new()))
    }

    /// Create a lookup with a specific resolver
    pub fn with_resolver(
        ip_zones: Vec<String>,
        host_zones: Vec<String>,
        resolver: Arc<dyn DnsResolver>,
    ) -> Self {
        Self {
            ip_zones,
            host_zones,
            resolver,
        }
    }

    /// Ask each zone in turn; the first listing wins
    ///
    /// A zone that answers without listing the subject counts as a clean
    /// answer. If no zone answers at all the result is `Inconclusive`.
    async fn query_zones(&self, zones: &[String], subject: &str) -> Reputation {
        let mut answered = false;

        for zone in zones {
            let name = format!("{}.{}.", subject, zone.trim_matches('.'));
            let answer = self.resolver.resolve(&name).await;

            match answer {
                Ok(Some(addrs)) => {
                    answered = true;
                    if let Some(addr) = addrs.into_iter().find(is_listing_answer) {
                        debug!("{} listed by {} ({})", subject, zone, addr);
                        return Reputation::Suspicious;
                    }
                }
                Ok(None) => {
                    answered = true;
                    debug!("{} not listed by {}", subject, zone);
                }
                Err(e) => debug!("{} lookup in {} failed: {}", subject, zone, e),
            }
        }

        if answered {
            Reputation::Trusted
        } else {
            Reputation::Inconclusive
        }
    }
}

impl std::fmt::Debug for DnsblLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DnsblLookup")
            .field("ip_zones", &self.ip_zones)
            .field("host_zones", &self.host_zones)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ReputationLookup for DnsblLookup {
    async fn lookup_ip(&self, ip: IpAddr) -> Result<Reputation, LookupError> {
        Ok(self.query_zones(&self.ip_zones, &reverse_ip(ip.to_canonical())).await)
    }

    async fn lookup_domain(&self, domain: &str) -> Result<Reputation, LookupError> {
        Ok(self.query_zones(&self.host_zones, domain).await)
    }
}

fn is_listing_answer(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.octets()[0] == 127,
        IpAddr::V6(_) => false,
    }
}

/// DNSBL query label for an address
///
/// IPv4 octets are reversed (`1.2.3.4` → `4.3.2.1`); IPv6 addresses are
/// expanded into reversed nibbles.
pub fn reverse_ip(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, d] = v4.octets();
            format!("{}.{}.{}.{}", d, c, b, a)
        }
        IpAddr::V6(v6) => v6
            .octets()
            .iter()
            .rev()
            .flat_map(|byte| [byte & 0x0f, byte >> 4])
            .map(|nibble| format!("{:x}", nibble))
            .collect::<Vec<_>>()
            .join("."),
    }
}
