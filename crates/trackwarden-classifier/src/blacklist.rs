//! Blacklist data and pattern matching
//!
//! Three independently refreshable pattern sets back the classifier:
//! domain fragments, IP addresses/blocks, and content patterns
//! (plain keywords plus regular expressions).

use crate::ClassifierError;
use ipnet::IpNet;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::sync::{Arc, RwLock};

/// Case-insensitive substring matching against a pattern set
///
/// A pattern matches when the candidate contains it. No fuzzy or
/// edit-distance matching is done; near-miss domains must be listed
/// explicitly. Blank patterns never match.
pub struct BlacklistMatcher;

impl BlacklistMatcher {
    /// Whether the candidate contains any of the patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use trackwarden_classifier::BlacklistMatcher;
    ///
    /// let patterns = vec!["chinaaircatering.com".to_string()];
    /// assert!(BlacklistMatcher::matches("http://ChinaAirCatering.com/x", &patterns));
    /// assert!(!BlacklistMatcher::matches("http://www.chinaircatering.com", &patterns));
    /// assert!(!BlacklistMatcher::matches("anything", &patterns[..0]));
    /// ```
    pub fn matches<S: AsRef<str>>(candidate: &str, patterns: &[S]) -> bool {
        Self::find(candidate, patterns).is_some()
    }

    /// The first pattern the candidate contains, if any
    pub fn find<'p, S: AsRef<str>>(candidate: &str, patterns: &'p [S]) -> Option<&'p str> {
        let candidate = candidate.to_lowercase();
        patterns
            .iter()
            .map(AsRef::<str>::as_ref)
            .find(|pattern| {
                let pattern = pattern.trim();
                !pattern.is_empty() && candidate.contains(&pattern.to_lowercase())
            })
    }
}

/// One entry of the IP blacklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpPattern {
    /// A single address
    Exact(IpAddr),

    /// A CIDR block, e.g. `10.66.0.0/16`
    Network(IpNet),

    /// An inclusive range, e.g. `212.42.230.200-212.42.230.210`
    Range {
        /// First address in the range
        start: IpAddr,
        /// Last address in the range
        end: IpAddr,
    },
}

impl IpPattern {
    /// Parse an address, CIDR block, or `start-end` range
    pub fn parse(s: &str) -> Result<Self, ClassifierError> {
        let s = s.trim();
        let invalid = || ClassifierError::InvalidIpPattern(s.to_string());

        if let Some((start, end)) = s.split_once('-') {
            let start: IpAddr = start.trim().parse().map_err(|_| invalid())?;
            let end: IpAddr = end.trim().parse().map_err(|_| invalid())?;
            if start.is_ipv4() != end.is_ipv4() || start > end {
                return Err(invalid());
            }
            return Ok(IpPattern::Range { start, end });
        }

        if s.contains('/') {
            return s.parse::<IpNet>().map(IpPattern::Network).map_err(|_| invalid());
        }

        s.parse::<IpAddr>()
            .map(|ip| IpPattern::Exact(ip.to_canonical()))
            .map_err(|_| invalid())
    }

    /// Whether the address falls under this entry
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match self {
            IpPattern::Exact(addr) => addr == ip,
            IpPattern::Network(net) => net.contains(ip),
            IpPattern::Range { start, end } => {
                start.is_ipv4() == ip.is_ipv4() && start <= ip && ip <= end
            }
        }
    }
}

impl fmt::Display for IpPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpPattern::Exact(addr) => write!(f, "{}", addr),
            IpPattern::Network(net) => write!(f, "{}", net),
            IpPattern::Range { start, end } => write!(f, "{}-{}", start, end),
        }
    }
}

/// Uncompiled blacklist data as it appears in configuration
///
/// ```toml
/// domains  = ["chinaaircatering.com"]
/// ips      = ["212.42.230.207", "10.66.0.0/16"]
/// keywords = ["viagra"]
/// regexes  = ["(?i)cheap\\s+pills"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistSource {
    /// Domain fragments matched against URLs
    #[serde(default)]
    pub domains: Vec<String>,

    /// Addresses, CIDR blocks, or ranges
    #[serde(default)]
    pub ips: Vec<String>,

    /// Plain keywords matched against text fields
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Regular expressions matched against text fields
    #[serde(default)]
    pub regexes: Vec<String>,
}

impl BlacklistSource {
    /// Compile into matchable blacklists
    pub fn compile(&self) -> Result<Blacklists, ClassifierError> {
        let ips = self
            .ips
            .iter()
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| IpPattern::parse(entry))
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = self
            .regexes
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Blacklists {
            domains: normalize(&self.domains),
            ips,
            keywords: normalize(&self.keywords),
            regexes,
        })
    }
}

fn normalize(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Compiled, read-only blacklists
#[derive(Debug, Clone, Default)]
pub struct Blacklists {
    domains: Vec<String>,
    ips: Vec<IpPattern>,
    keywords: Vec<String>,
    regexes: Vec<Regex>,
}

impl Blacklists {
    /// Blacklists with nothing in them
    pub fn empty() -> Self {
        Self::default()
    }

    /// The domain pattern contained in `candidate`, if any
    pub fn match_domain(&self, candidate: &str) -> Option<&str> {
        BlacklistMatcher::find(candidate, &self.domains)
    }

    /// The IP entry covering `ip`, if any
    ///
    /// IPv4-mapped IPv6 addresses are matched as the IPv4 address they carry.
    pub fn match_ip(&self, ip: &IpAddr) -> Option<&IpPattern> {
        let ip = ip.to_canonical();
        self.ips.iter().find(|pattern| pattern.contains(&ip))
    }

    /// The keyword contained in `text`, if any
    pub fn match_keyword(&self, text: &str) -> Option<&str> {
        BlacklistMatcher::find(text, &self.keywords)
    }

    /// The regular expression matching `text`, if any
    pub fn match_regex(&self, text: &str) -> Option<&Regex> {
        self.regexes.iter().find(|re| re.is_match(text))
    }

    /// Total number of entries across all sets
    pub fn len(&self) -> usize {
        self.domains.len() + self.ips.len() + self.keywords.len() + self.regexes.len()
    }

    /// Whether every set is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared, hot-swappable blacklists
///
/// Classifications take an `Arc` snapshot when they start, so a `replace`
/// never changes the data under an in-flight run.
#[derive(Debug, Clone, Default)]
pub struct BlacklistHandle {
    current: Arc<RwLock<Arc<Blacklists>>>,
}

impl BlacklistHandle {
    /// Wrap compiled blacklists
    pub fn new(blacklists: Blacklists) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(blacklists))),
        }
    }

    /// The blacklists in effect right now
    pub fn snapshot(&self) -> Arc<Blacklists> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Install new blacklists for subsequent classifications
    pub fn replace(&self, blacklists: Blacklists) {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        tracing::info!("Blacklists refreshed ({} entries)", blacklists.len());
        *guard = Arc::new(blacklists);
    }
}
