//! Integration tests for trackwarden-service
//!
//! These tests drive whole submissions through validation, classification,
//! routing and persistence against in-memory and SQLite stores.

use async_trait::async_trait;
use std::collections::HashSet;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use trackwarden_classifier::BlacklistSource;
use trackwarden_domain::traits::{
    ArticleStore, LookupError, PersistError, Reputation, ReputationLookup, TrackbackStore,
};
use trackwarden_domain::{
    ArticleId, Guid, ModerationPolicy, Outcome, RawSubmission, Signal, SpamVerdict,
    TrackbackRecord, ValidationState,
};
use trackwarden_service::{ServiceConfig, ServiceError, TrackbackService};
use trackwarden_store::{MemoryStore, SqliteStore};

fn spam_config() -> ServiceConfig {
    ServiceConfig {
        blacklist: BlacklistSource {
            domains: vec![
                "chinaaircatering.com".to_string(),
                "chinaircatering.com".to_string(),
            ],
            ips: vec!["212.42.230.207".to_string()],
            ..Default::default()
        },
        ..Default::default()
    }
}

fn service() -> TrackbackService {
    TrackbackService::from_config(spam_config()).unwrap()
}

fn articles() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.register_article(ArticleId::from("1"));
    store
}

fn ham_params() -> RawSubmission {
    RawSubmission {
        blog_name: Some("Blog".to_string()),
        title: Some("trackback".to_string()),
        url: Some("http://notaspammer.com".to_string()),
        excerpt: Some("bland".to_string()),
        ip: Some("212.42.230.206".to_string()),
    }
}

/// Reputation source that never answers in time
struct HangingReputation;

#[async_trait]
impl ReputationLookup for HangingReputation {
    async fn lookup_ip(&self, _ip: IpAddr) -> Result<Reputation, LookupError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Reputation::Suspicious)
    }
}

/// Store that reports a GUID collision for the first `collisions` saves
struct CollidingStore {
    inner: MemoryStore,
    collisions: usize,
    attempted: Vec<Guid>,
}

impl CollidingStore {
    fn new(collisions: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            collisions,
            attempted: Vec::new(),
        }
    }
}

impl TrackbackStore for CollidingStore {
    fn save(&mut self, record: &TrackbackRecord) -> Result<(), PersistError> {
        let guid = record
            .guid()
            .ok_or_else(|| PersistError::Storage("no guid".to_string()))?;
        self.attempted.push(guid);

        if self.collisions > 0 {
            self.collisions -= 1;
            return Err(PersistError::DuplicateGuid(guid));
        }
        self.inner.save(record)
    }

    fn find_by_guid(&self, guid: Guid) -> Result<Option<TrackbackRecord>, PersistError> {
        self.inner.find_by_guid(guid)
    }

    fn list_for_article(&self, id: &ArticleId) -> Result<Vec<TrackbackRecord>, PersistError> {
        self.inner.list_for_article(id)
    }
}

/// Store whose disk is always full
struct BrokenStore;

impl TrackbackStore for BrokenStore {
    fn save(&mut self, _record: &TrackbackRecord) -> Result<(), PersistError> {
        Err(PersistError::Storage("disk full".to_string()))
    }

    fn find_by_guid(&self, _guid: Guid) -> Result<Option<TrackbackRecord>, PersistError> {
        Ok(None)
    }

    fn list_for_article(&self, _id: &ArticleId) -> Result<Vec<TrackbackRecord>, PersistError> {
        Ok(Vec::new())
    }
}

struct UnreachableArticles;

impl ArticleStore for UnreachableArticles {
    type Error = String;

    fn resolve_article(&self, _id: &ArticleId) -> Result<bool, Self::Error> {
        Err("connection refused".to_string())
    }
}

#[tokio::test]
async fn test_missing_or_blank_url_is_rejected_without_guid() {
    let service = service();
    let store = articles();

    for url in [None, Some(String::new()), Some("  ".to_string())] {
        let raw = RawSubmission {
            url,
            ..ham_params()
        };
        let decision = service
            .submit(raw, ArticleId::from("1"), service.policy(), Some(&store))
            .await
            .unwrap();

        assert_eq!(decision.outcome, Outcome::RejectedInvalid);
        assert!(!decision.validation.errors_for("url").is_empty());
        assert!(decision.guid().is_none());
        assert_eq!(decision.record.validation_state(), ValidationState::Invalid);
        assert_eq!(decision.record.spam_verdict(), SpamVerdict::Unclassified);
    }
}

#[tokio::test]
async fn test_unknown_article_is_rejected() {
    let service = service();
    let decision = service
        .submit(ham_params(), ArticleId::from("404"), service.policy(), Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::RejectedInvalid);
    assert_eq!(decision.validation.errors_for("article_id").len(), 1);
    assert!(decision.guid().is_none());
}

#[tokio::test]
async fn test_article_store_failure_is_an_error() {
    let service = service();
    let result = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&UnreachableArticles))
        .await;

    assert!(matches!(result, Err(ServiceError::Gatekeeper(_))));
}

#[tokio::test]
async fn test_valid_ham_is_accepted_with_long_guid() {
    let service = service();
    let decision = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::Accepted);
    assert_eq!(decision.record.spam_verdict(), SpamVerdict::Ham);
    let guid = decision.guid().unwrap();
    assert!(guid.to_string().len() > Guid::MIN_TEXT_LEN);
}

#[tokio::test]
async fn test_identical_submissions_get_distinct_guids() {
    let service = service();
    let store = articles();
    let mut guids = HashSet::new();

    for _ in 0..50 {
        let decision = service
            .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&store))
            .await
            .unwrap();
        assert!(guids.insert(decision.guid().unwrap()));
    }
}

#[tokio::test]
async fn test_spammy_excerpt_is_queued() {
    let service = service();
    let raw = RawSubmission {
        excerpt: Some(r#"<a href="http://chinaaircatering.com">spam</a>"#.to_string()),
        ..ham_params()
    };

    let decision = service
        .submit(raw, ArticleId::from("1"), ModerationPolicy::QueueSpam, Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::QueuedForModeration);
    assert!(decision.record.is_spam());
    assert!(decision.guid().is_some());
    assert!(decision.classification.unwrap().fired(Signal::Excerpt));
}

#[tokio::test]
async fn test_spammy_source_url_is_rejected_under_reject_policy() {
    let service = service();
    let raw = RawSubmission {
        url: Some("http://www.chinaircatering.com".to_string()),
        ..ham_params()
    };

    let decision = service
        .submit(raw, ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::RejectedSpam);
    assert!(decision.guid().is_none());
    assert!(decision.classification.unwrap().fired(Signal::SourceUrl));
}

#[tokio::test]
async fn test_neighbouring_ip_is_not_blacklisted() {
    let service = service();
    let store = articles();

    let ham = service
        .submit(ham_params(), ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&store))
        .await
        .unwrap();
    assert_eq!(ham.outcome, Outcome::Accepted);

    let raw = RawSubmission {
        ip: Some("212.42.230.207".to_string()),
        ..ham_params()
    };
    let spam = service
        .submit(raw, ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&store))
        .await
        .unwrap();
    assert_eq!(spam.outcome, Outcome::RejectedSpam);
    assert!(spam.classification.unwrap().fired(Signal::Ip));
}

#[tokio::test]
async fn test_moderate_all_queues_ham() {
    let service = service();
    let decision = service
        .submit(ham_params(), ArticleId::from("1"), ModerationPolicy::ModerateAll, Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::QueuedForModeration);
    assert_eq!(decision.record.spam_verdict(), SpamVerdict::Ham);
    assert!(decision.guid().is_some());
}

#[tokio::test]
async fn test_resubmission_gets_same_outcome() {
    let service = service();
    let store = articles();
    let raw = RawSubmission {
        url: Some("http://www.chinaircatering.com".to_string()),
        ..ham_params()
    };

    let first = service
        .submit(raw.clone(), ArticleId::from("1"), service.policy(), Some(&store))
        .await
        .unwrap();
    let second = service
        .submit(raw, ArticleId::from("1"), service.policy(), Some(&store))
        .await
        .unwrap();

    assert_eq!(first.outcome, second.outcome);
    assert_eq!(first.classification, second.classification);
}

#[tokio::test]
async fn test_reputation_timeout_still_accepts_ham() {
    let mut config = spam_config();
    config.classifier.lookup_timeout_ms = 50;
    let service = TrackbackService::with_reputation(config, Arc::new(HangingReputation)).unwrap();

    let decision = service
        .submit(ham_params(), ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&articles()))
        .await
        .unwrap();

    assert_eq!(decision.outcome, Outcome::Accepted);
}

#[tokio::test]
async fn test_abandoned_submission_leaves_no_trace() {
    let mut config = spam_config();
    config.classifier.lookup_timeout_ms = 10_000;
    let service = TrackbackService::with_reputation(config, Arc::new(HangingReputation)).unwrap();
    let store = articles();

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        service.submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&store)),
    )
    .await;

    assert!(result.is_err());
    assert!(store.is_empty());
    assert_eq!(service.metrics().total_submissions(), 0);
}

#[tokio::test]
async fn test_concurrent_submissions() {
    let service = Arc::new(service());
    let store = Arc::new(articles());

    let mut handles = Vec::new();
    for i in 0..20 {
        let service = Arc::clone(&service);
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            let raw = if i % 2 == 0 {
                ham_params()
            } else {
                RawSubmission {
                    ip: Some("212.42.230.207".to_string()),
                    ..ham_params()
                }
            };
            service
                .submit(raw, ArticleId::from("1"), ModerationPolicy::QueueSpam, Some(&*store))
                .await
        }));
    }

    let mut guids = HashSet::new();
    for handle in handles {
        let decision = handle.await.unwrap().unwrap();
        assert!(decision.is_persistable());
        assert!(guids.insert(decision.guid().unwrap()));
    }

    let metrics = service.metrics();
    assert_eq!(metrics.count(Outcome::Accepted), 10);
    assert_eq!(metrics.count(Outcome::QueuedForModeration), 10);
    assert_eq!(metrics.signals.get(&Signal::Ip), Some(&10));
}

#[tokio::test]
async fn test_persist_accepted_decision() {
    let service = service();
    let mut store = articles();

    let mut decision = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&store))
        .await
        .unwrap();
    let guid = service.persist(&mut store, &mut decision).unwrap();

    assert_eq!(Some(guid), decision.guid());
    assert_eq!(store.find_by_guid(guid).unwrap(), Some(decision.record));
    assert_eq!(service.metrics().persisted, 1);
}

#[tokio::test]
async fn test_persist_refuses_rejected_decisions() {
    let service = service();
    let mut store = articles();

    let raw = RawSubmission {
        url: None,
        ..ham_params()
    };
    let mut invalid = service
        .submit(raw, ArticleId::from("1"), service.policy(), Some(&store))
        .await
        .unwrap();

    let raw = RawSubmission {
        ip: Some("212.42.230.207".to_string()),
        ..ham_params()
    };
    let mut spam = service
        .submit(raw, ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&store))
        .await
        .unwrap();

    assert!(matches!(
        service.persist(&mut store, &mut invalid),
        Err(ServiceError::NotPersistable(Outcome::RejectedInvalid))
    ));
    assert!(matches!(
        service.persist(&mut store, &mut spam),
        Err(ServiceError::NotPersistable(Outcome::RejectedSpam))
    ));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_persist_retries_guid_collision() {
    let service = service();
    let mut store = CollidingStore::new(1);

    let mut decision = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&articles()))
        .await
        .unwrap();
    let first_guid = decision.guid().unwrap();

    let stored = service.persist(&mut store, &mut decision).unwrap();

    assert_eq!(store.attempted.len(), 2);
    assert_eq!(store.attempted[0], first_guid);
    assert_ne!(stored, first_guid);
    assert_eq!(decision.guid(), Some(stored));
    assert!(store.find_by_guid(stored).unwrap().is_some());
    assert_eq!(service.metrics().guid_collisions, 1);
}

#[tokio::test]
async fn test_persist_gives_up_after_max_attempts() {
    let service = service();
    let mut store = CollidingStore::new(usize::MAX);

    let mut decision = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&articles()))
        .await
        .unwrap();

    let result = service.persist(&mut store, &mut decision);
    assert!(matches!(result, Err(ServiceError::GuidExhausted(3))));
    assert_eq!(store.attempted.len(), 3);

    let mut distinct = store.attempted.clone();
    distinct.dedup();
    assert_eq!(distinct.len(), 3);
    assert_eq!(decision.guid(), store.attempted.last().copied());
}

#[tokio::test]
async fn test_persist_surfaces_storage_error() {
    let service = service();
    let mut decision = service
        .submit(ham_params(), ArticleId::from("1"), service.policy(), Some(&articles()))
        .await
        .unwrap();

    let result = service.persist(&mut BrokenStore, &mut decision);
    assert!(matches!(result, Err(ServiceError::Storage(msg)) if msg == "disk full"));
}

#[tokio::test]
async fn test_refreshed_blacklist_applies_to_later_submissions() {
    let service = service();
    let store = articles();

    let before = service
        .submit(ham_params(), ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&store))
        .await
        .unwrap();
    assert_eq!(before.outcome, Outcome::Accepted);

    let refreshed = BlacklistSource {
        domains: vec!["notaspammer.com".to_string()],
        ..Default::default()
    };
    service
        .classifier()
        .blacklists()
        .replace(refreshed.compile().unwrap());

    let after = service
        .submit(ham_params(), ArticleId::from("1"), ModerationPolicy::RejectSpam, Some(&store))
        .await
        .unwrap();
    assert_eq!(after.outcome, Outcome::RejectedSpam);
}

#[tokio::test]
async fn test_end_to_end_with_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteStore::new(dir.path().join("trackwarden.db")).unwrap();
    store.register_article(&ArticleId::from("1"), Some("Hello")).unwrap();

    let service = service();
    let raw = RawSubmission {
        excerpt: Some("z".repeat(400)),
        ..ham_params()
    };

    let mut decision = service
        .submit(raw, ArticleId::from("1"), service.policy(), Some(&store))
        .await
        .unwrap();
    let guid = service.persist(&mut store, &mut decision).unwrap();

    let stored = store.find_by_guid(guid).unwrap().unwrap();
    assert_eq!(stored.spam_verdict(), SpamVerdict::Ham);
    assert_eq!(stored.excerpt.as_deref().map(|e| e.chars().count()), Some(250));

    let listed = store.list_for_article(&ArticleId::from("1")).unwrap();
    assert_eq!(listed.len(), 1);
}
