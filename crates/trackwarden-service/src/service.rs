//! Submission pipeline: validate, classify, decide, finalize

use crate::{ServiceConfig, ServiceError, ServiceMetrics};
use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};
use trackwarden_classifier::{BlacklistHandle, ContentClassifier};
use trackwarden_domain::traits::{ArticleStore, PersistError, ReputationLookup, TrackbackStore};
use trackwarden_domain::{
    ArticleId, Classification, Guid, ModerationPolicy, Outcome, RawSubmission, RecordError,
    TrackbackRecord,
};
use trackwarden_gatekeeper::{TrackbackValidator, ValidationResult};

/// Everything the service decided about one submission
#[derive(Debug, Clone)]
pub struct Decision {
    /// Final outcome
    pub outcome: Outcome,

    /// The record as finalized; carries a GUID only when persistable
    pub record: TrackbackRecord,

    /// Validation result, with field-level messages on rejection
    pub validation: ValidationResult,

    /// Classification, absent when validation failed
    pub classification: Option<Classification>,
}

impl Decision {
    /// The assigned GUID, if any
    pub fn guid(&self) -> Option<Guid> {
        self.record.guid()
    }

    /// Whether the record may be handed to a store
    pub fn is_persistable(&self) -> bool {
        self.outcome.is_persistable()
    }
}

/// Front door for trackback submissions
///
/// Submissions are independent: `submit` takes `&self` and may run
/// concurrently. Nothing is written anywhere until [`persist`] is called.
///
/// [`persist`]: TrackbackService::persist
///
/// # Examples
///
/// ```
/// use trackwarden_service::{ServiceConfig, TrackbackService};
/// use trackwarden_domain::traits::ArticleStore;
/// use trackwarden_domain::{ArticleId, Outcome, RawSubmission};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TrackbackService::from_config(ServiceConfig::permissive())?;
/// let raw = RawSubmission {
///     url: Some("http://notaspammer.com".to_string()),
///     excerpt: Some("bland".to_string()),
///     ..Default::default()
/// };
///
/// let decision = service
///     .submit::<NoArticles>(raw, ArticleId::from("1"), service.policy(), None)
///     .await?;
/// assert_eq!(decision.outcome, Outcome::Accepted);
/// assert!(decision.guid().is_some());
/// # Ok(())
/// # }
/// # struct NoArticles;
/// # impl ArticleStore for NoArticles {
/// #     type Error = String;
/// #     fn resolve_article(&self, _: &ArticleId) -> Result<bool, String> { Ok(false) }
/// # }
/// ```
pub struct TrackbackService {
    validator: TrackbackValidator,
    classifier: ContentClassifier,
    policy: ModerationPolicy,
    max_excerpt_length: usize,
    max_guid_attempts: u32,
    metrics: Mutex<ServiceMetrics>,
}

impl TrackbackService {
    /// Create a service from already-built parts
    pub fn new(
        validator: TrackbackValidator,
        classifier: ContentClassifier,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            validator,
            classifier,
            policy: config.policy,
            max_excerpt_length: config.max_excerpt_length,
            max_guid_attempts: config.max_guid_attempts.max(1),
            metrics: Mutex::new(ServiceMetrics::new()),
        }
    }

    /// Build a service from configuration
    ///
    /// DNS blocklists are used as the reputation source when the
    /// classifier configuration enables them.
    pub fn from_config(config: ServiceConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        let validator = TrackbackValidator::new(config.validation.clone());
        let classifier = ContentClassifier::from_config(config.classifier.clone(), &config.blacklist)?;
        Ok(Self::new(validator, classifier, &config))
    }

    /// Build a service with an injected reputation source
    pub fn with_reputation(
        config: ServiceConfig,
        reputation: Arc<dyn ReputationLookup>,
    ) -> Result<Self, ServiceError> {
        config.validate()?;
        let validator = TrackbackValidator::new(config.validation.clone());
        let blacklists = BlacklistHandle::new(config.blacklist.compile()?);
        let classifier = ContentClassifier::new(config.classifier.clone(), blacklists, reputation);
        Ok(Self::new(validator, classifier, &config))
    }

    /// Configured moderation policy
    pub fn policy(&self) -> ModerationPolicy {
        self.policy
    }

    /// The classifier, e.g. to refresh its blacklists
    pub fn classifier(&self) -> &ContentClassifier {
        &self.classifier
    }

    /// Snapshot of the metrics collected so far
    pub fn metrics(&self) -> ServiceMetrics {
        self.lock_metrics().clone()
    }

    /// Decide on one submission
    ///
    /// Invalid submissions come back as `RejectedInvalid` with field errors
    /// and no GUID. Valid ones are classified and routed by `policy`; only
    /// `Accepted` and `QueuedForModeration` records get a GUID.
    ///
    /// Dropping the returned future abandons any reputation lookups in
    /// flight; nothing has been written at that point.
    ///
    /// # Errors
    ///
    /// Returns an error only when a collaborator fails (the article store).
    pub async fn submit<A>(
        &self,
        raw: RawSubmission,
        article_id: ArticleId,
        policy: ModerationPolicy,
        articles: Option<&A>,
    ) -> Result<Decision, ServiceError>
    where
        A: ArticleStore,
        A::Error: Display,
    {
        let mut record = TrackbackRecord::from_submission(raw, article_id);

        let validation = self.validator.validate(&record, articles)?;
        if !validation.valid {
            record.mark_invalid();
            info!(
                "Rejected invalid trackback for article {}: {:?}",
                record.article_id, validation.field_errors
            );
            self.lock_metrics().record_outcome(Outcome::RejectedInvalid);
            return Ok(Decision {
                outcome: Outcome::RejectedInvalid,
                record,
                validation,
                classification: None,
            });
        }
        record.mark_valid();

        let classification = self.classifier.classify(&record).await;
        record.apply_classification(&classification);

        let outcome = policy.outcome_for(classification.is_spam());
        if outcome.is_persistable() {
            record.assign_guid(Guid::generate())?;
            if self.max_excerpt_length > 0 && record.truncate_excerpt(self.max_excerpt_length) {
                debug!("Truncated excerpt to {} characters", self.max_excerpt_length);
            }
        }

        info!(
            "Trackback for article {} from {}: {} ({} signals, policy {})",
            record.article_id,
            record.url.as_deref().unwrap_or("-"),
            outcome.as_str(),
            classification.signals.len(),
            policy.as_str()
        );

        {
            let mut metrics = self.lock_metrics();
            metrics.record_outcome(outcome);
            metrics.record_signals(&classification);
        }

        Ok(Decision {
            outcome,
            record,
            validation,
            classification: Some(classification),
        })
    }

    /// Save an accepted or queued decision
    ///
    /// A duplicate GUID reported by the store is replaced with a fresh one
    /// and the save retried, up to the configured number of attempts. The
    /// decision's record carries whichever GUID was finally stored.
    ///
    /// # Errors
    ///
    /// - `NotPersistable` for rejected decisions (nothing is written)
    /// - `GuidExhausted` when every attempt collided
    /// - `Storage` for any other store failure
    pub fn persist<S>(&self, store: &mut S, decision: &mut Decision) -> Result<Guid, ServiceError>
    where
        S: TrackbackStore + ?Sized,
    {
        if !decision.is_persistable() {
            return Err(ServiceError::NotPersistable(decision.outcome));
        }

        for attempt in 1..=self.max_guid_attempts {
            let guid = decision
                .record
                .guid()
                .ok_or(RecordError::GuidMissing)?;

            match store.save(&decision.record) {
                Ok(()) => {
                    debug!("Persisted trackback {} (attempt {})", guid, attempt);
                    self.lock_metrics().record_persisted();
                    return Ok(guid);
                }
                Err(PersistError::DuplicateGuid(taken)) => {
                    warn!(
                        "GUID {} already taken (attempt {}/{})",
                        taken, attempt, self.max_guid_attempts
                    );
                    self.lock_metrics().record_collision();
                    // the last rejected GUID stays on the record
                    if attempt < self.max_guid_attempts {
                        decision.record.replace_colliding_guid(Guid::generate())?;
                    }
                }
                Err(PersistError::Storage(msg)) => return Err(ServiceError::Storage(msg)),
            }
        }

        Err(ServiceError::GuidExhausted(self.max_guid_attempts))
    }

    fn lock_metrics(&self) -> MutexGuard<'_, ServiceMetrics> {
        self.metrics.lock().unwrap_or_else(|e| e.into_inner())
    }
}
