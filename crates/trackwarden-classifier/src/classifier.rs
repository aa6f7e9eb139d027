//! Spam classification pipeline

use crate::blacklist::{BlacklistHandle, BlacklistSource, Blacklists};
use crate::links::{extract_links, host_of, registrable_domain};
use crate::{ClassifierConfig, ClassifierError, DnsblLookup};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use trackwarden_domain::traits::{
    LookupError, NoReputation, Reputation, ReputationLookup,
};
use trackwarden_domain::{Classification, Signal, TrackbackRecord, TriggeredSignal};

/// Decides whether a trackback is spam
///
/// Runs independent checks and ORs them:
/// 1. Links embedded in the excerpt against the domain blacklist
/// 2. The source URL against the domain blacklist
/// 3. The submitter IP against the IP blacklist, then the reputation source
/// 4. Keywords and regular expressions against the text fields
/// 5. The number of links in the excerpt, when a limit is configured
///
/// The first three run concurrently. Reputation lookups are bounded by
/// `lookup_timeout`; a failed or timed-out lookup casts no vote.
///
/// # Examples
///
/// ```
/// use trackwarden_classifier::{BlacklistSource, ClassifierConfig, ContentClassifier};
/// use trackwarden_domain::{ArticleId, RawSubmission, TrackbackRecord};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = BlacklistSource {
///     domains: vec!["chinaaircatering.com".to_string()],
///     ..Default::default()
/// };
/// let classifier = ContentClassifier::from_config(ClassifierConfig::default(), &source)?;
///
/// let record = TrackbackRecord::from_submission(
///     RawSubmission {
///         url: Some("http://chinaaircatering.com".to_string()),
///         ..Default::default()
///     },
///     ArticleId::from("1"),
/// );
/// assert!(classifier.classify(&record).await.is_spam());
/// # Ok(())
/// # }
/// ```
pub struct ContentClassifier {
    config: ClassifierConfig,
    blacklists: BlacklistHandle,
    reputation: Arc<dyn ReputationLookup>,
}

impl ContentClassifier {
    /// Create a classifier from its parts
    pub fn new(
        config: ClassifierConfig,
        blacklists: BlacklistHandle,
        reputation: Arc<dyn ReputationLookup>,
    ) -> Self {
        Self {
            config,
            blacklists,
            reputation,
        }
    }

    /// Build a classifier from configuration and blacklist data
    ///
    /// DNS blocklists are consulted only when `enable_dnsbl` is set.
    pub fn from_config(
        config: ClassifierConfig,
        source: &BlacklistSource,
    ) -> Result<Self, ClassifierError> {
        config.validate()?;
        let blacklists = BlacklistHandle::new(source.compile()?);

        let reputation: Arc<dyn ReputationLookup> = if config.enable_dnsbl {
            Arc::new(DnsblLookup::new(
                config.ip_zones.clone(),
                config.host_zones.clone(),
            ))
        } else {
            Arc::new(NoReputation)
        };

        Ok(Self::new(config, blacklists, reputation))
    }

    /// Handle for refreshing the blacklists in place
    pub fn blacklists(&self) -> &BlacklistHandle {
        &self.blacklists
    }

    /// Active configuration
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a record without modifying it
    pub async fn classify(&self, record: &TrackbackRecord) -> Classification {
        let blacklists = self.blacklists.snapshot();
        let links = record
            .excerpt
            .as_deref()
            .map(extract_links)
            .unwrap_or_default();

        let (excerpt, source_url, ip) = tokio::join!(
            self.check_excerpt(&blacklists, &links),
            self.check_source_url(&blacklists, record.url.as_deref()),
            self.check_ip(&blacklists, record.ip.as_deref()),
        );

        let signals: Vec<TriggeredSignal> = [
            excerpt,
            source_url,
            ip,
            self.check_content_patterns(&blacklists, record),
            self.check_link_limit(&links),
        ]
        .into_iter()
        .flatten()
        .collect();

        let classification = Classification::from_signals(signals);
        if classification.is_spam() {
            for signal in &classification.signals {
                info!(
                    "Trackback for article {} flagged by {} check: {}",
                    record.article_id, signal.signal, signal.detail
                );
            }
        } else {
            debug!("Trackback for article {} classified as ham", record.article_id);
        }

        classification
    }

    async fn check_excerpt(
        &self,
        blacklists: &Blacklists,
        links: &[String],
    ) -> Option<TriggeredSignal> {
        for link in links {
            if let Some(pattern) = blacklists.match_domain(link) {
                return Some(TriggeredSignal::new(
                    Signal::Excerpt,
                    format!("link {} matches blacklisted domain '{}'", link, pattern),
                ));
            }
        }

        let mut domains: Vec<String> = Vec::new();
        for domain in links.iter().filter_map(|l| host_of(l)).map(|h| registrable_domain(&h)) {
            if !domains.contains(&domain) {
                domains.push(domain);
            }
        }

        self.first_suspicious_domain(domains)
            .await
            .map(|domain| {
                TriggeredSignal::new(
                    Signal::Excerpt,
                    format!("linked domain {} has a bad reputation", domain),
                )
            })
    }

    async fn check_source_url(
        &self,
        blacklists: &Blacklists,
        url: Option<&str>,
    ) -> Option<TriggeredSignal> {
        let url = url?;

        if let Some(pattern) = blacklists.match_domain(url) {
            return Some(TriggeredSignal::new(
                Signal::SourceUrl,
                format!("source {} matches blacklisted domain '{}'", url, pattern),
            ));
        }

        let domain = registrable_domain(&host_of(url)?);
        if self.domain_reputation(&domain).await == Reputation::Suspicious {
            return Some(TriggeredSignal::new(
                Signal::SourceUrl,
                format!("source domain {} has a bad reputation", domain),
            ));
        }

        None
    }

    async fn check_ip(&self, blacklists: &Blacklists, ip: Option<&str>) -> Option<TriggeredSignal> {
        let raw = ip?.trim();
        let ip = match raw.parse::<IpAddr>() {
            Ok(ip) => ip.to_canonical(),
            Err(_) => {
                debug!("Skipping IP check for unparseable address '{}'", raw);
                return None;
            }
        };

        if let Some(entry) = blacklists.match_ip(&ip) {
            return Some(TriggeredSignal::new(
                Signal::Ip,
                format!("{} covered by blacklist entry {}", ip, entry),
            ));
        }

        let reputation = self
            .bounded(&ip.to_string(), self.reputation.lookup_ip(ip))
            .await;
        if reputation == Reputation::Suspicious {
            return Some(TriggeredSignal::new(
                Signal::Ip,
                format!("{} has a bad reputation", ip),
            ));
        }

        None
    }

    fn check_content_patterns(
        &self,
        blacklists: &Blacklists,
        record: &TrackbackRecord,
    ) -> Option<TriggeredSignal> {
        let fields = [
            ("excerpt", record.excerpt.as_deref()),
            ("title", record.title.as_deref()),
            ("blog_name", record.blog_name.as_deref()),
        ];

        for (field, text) in fields {
            let Some(text) = text else { continue };

            if let Some(keyword) = blacklists.match_keyword(text) {
                return Some(TriggeredSignal::new(
                    Signal::ContentPattern,
                    format!("keyword '{}' in {}", keyword, field),
                ));
            }
            if let Some(re) = blacklists.match_regex(text) {
                return Some(TriggeredSignal::new(
                    Signal::ContentPattern,
                    format!("pattern /{}/ in {}", re.as_str(), field),
                ));
            }
        }

        None
    }

    fn check_link_limit(&self, links: &[String]) -> Option<TriggeredSignal> {
        let limit = self.config.max_links;
        if limit > 0 && links.len() > limit {
            return Some(TriggeredSignal::new(
                Signal::LinkLimit,
                format!("{} links exceed the limit of {}", links.len(), limit),
            ));
        }
        None
    }

    async fn domain_reputation(&self, domain: &str) -> Reputation {
        self.bounded(domain, self.reputation.lookup_domain(domain))
            .await
    }

    /// Look up every domain at once; the first `Suspicious` answer wins
    ///
    /// The whole batch shares one `lookup_timeout`. Lookups still running
    /// when it returns are aborted.
    async fn first_suspicious_domain(&self, domains: Vec<String>) -> Option<String> {
        if domains.is_empty() {
            return None;
        }

        let mut lookups = JoinSet::new();
        for domain in domains {
            let reputation = Arc::clone(&self.reputation);
            lookups.spawn(async move {
                let answer = reputation.lookup_domain(&domain).await;
                (domain, answer)
            });
        }

        let scan = async {
            while let Some(joined) = lookups.join_next().await {
                match joined {
                    Ok((domain, Ok(Reputation::Suspicious))) => return Ok(Some(domain)),
                    Ok((domain, Err(e))) => {
                        warn!("Reputation lookup for {} failed: {}", domain, e)
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Reputation lookup task failed: {}", e),
                }
            }
            Ok::<_, LookupError>(None)
        };

        match bounded_lookup(self.config.lookup_timeout(), scan).await {
            Ok(found) => found,
            Err(e) => {
                warn!("Linked domain reputation lookups abandoned: {}", e);
                None
            }
        }
    }

    /// Run a reputation lookup under the configured timeout
    async fn bounded<F>(&self, subject: &str, lookup: F) -> Reputation
    where
        F: Future<Output = Result<Reputation, LookupError>>,
    {
        match bounded_lookup(self.config.lookup_timeout(), lookup).await {
            Ok(reputation) => reputation,
            Err(e) => {
                warn!("Reputation lookup for {} failed: {}", subject, e);
                Reputation::Inconclusive
            }
        }
    }
}

/// Await `lookup`, reporting [`LookupError::Timeout`] once `limit` passes
async fn bounded_lookup<T, F>(limit: Duration, lookup: F) -> Result<T, LookupError>
where
    F: Future<Output = Result<T, LookupError>>,
{
    tokio::time::timeout(limit, lookup)
        .await
        .unwrap_or(Err(LookupError::Timeout))
}
