//! Trackback validation logic

use crate::{GatekeeperError, ValidationConfig};
use std::collections::BTreeMap;
use trackwarden_domain::traits::ArticleStore;
use trackwarden_domain::{ArticleId, TrackbackRecord};

/// Result of trackback validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the record passed every rule
    pub valid: bool,

    /// Violated rules, in evaluation order
    pub reasons: Vec<RejectionReason>,

    /// Messages keyed by the offending field
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationResult {
    fn from_reasons(reasons: Vec<RejectionReason>) -> Self {
        let mut field_errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for reason in &reasons {
            field_errors
                .entry(reason.field().to_string())
                .or_default()
                .push(reason.message());
        }

        Self {
            valid: reasons.is_empty(),
            reasons,
            field_errors,
        }
    }

    /// Messages recorded against one field (empty if none)
    pub fn errors_for(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Reasons for rejection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// No source URL, or only whitespace
    MissingUrl,

    /// Source URL does not parse as an absolute URL
    MalformedUrl(String),

    /// Source URL scheme is not allowed
    DisallowedScheme(String),

    /// Source URL has no host
    MissingHost,

    /// Target article could not be resolved
    UnknownArticle(ArticleId),
}

impl RejectionReason {
    /// The record field this reason is attributed to
    pub fn field(&self) -> &'static str {
        match self {
            RejectionReason::MissingUrl
            | RejectionReason::MalformedUrl(_)
            | RejectionReason::DisallowedScheme(_)
            | RejectionReason::MissingHost => "url",
            RejectionReason::UnknownArticle(_) => "article_id",
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            RejectionReason::MissingUrl => "can't be blank".to_string(),
            RejectionReason::MalformedUrl(detail) => format!("is not a valid URL ({})", detail),
            RejectionReason::DisallowedScheme(scheme) => {
                format!("uses unsupported scheme '{}'", scheme)
            }
            RejectionReason::MissingHost => "has no host".to_string(),
            RejectionReason::UnknownArticle(id) => format!("article {} does not exist", id),
        }
    }
}

/// Enforces required-field and format rules on trackbacks
///
/// Validation is side-effect free; the caller decides what to do with
/// the result.
pub struct TrackbackValidator {
    config: ValidationConfig,
}

impl TrackbackValidator {
    /// Create a new validator with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Create a validator with default configuration
    pub fn default_config() -> Self {
        Self::new(ValidationConfig::default())
    }

    /// Validate a trackback against the configured rules
    ///
    /// # Arguments
    ///
    /// * `record` - The trackback to validate
    /// * `articles` - Article store for the existence check; may be `None`
    ///   only when `require_resolvable_article` is off
    ///
    /// # Returns
    ///
    /// A validation result; `Err` when the article store fails or is
    /// required but missing
    pub fn validate<A: ArticleStore>(
        &self,
        record: &TrackbackRecord,
        articles: Option<&A>,
    ) -> Result<ValidationResult, GatekeeperError>
    where
        A::Error: std::fmt::Display,
    {
        let mut reasons = Vec::new();

        // 1. Source URL
        if let Some(reason) = self.validate_url(record.url.as_deref()) {
            reasons.push(reason);
        }

        // 2. Target article
        if self.config.require_resolvable_article {
            let articles = articles.ok_or_else(|| {
                GatekeeperError::Config(
                    "require_resolvable_article is set but no article store was given".to_string(),
                )
            })?;
            if let Some(reason) = self.check_article(&record.article_id, articles)? {
                reasons.push(reason);
            }
        }

        Ok(ValidationResult::from_reasons(reasons))
    }

    /// Validate the source URL (present, absolute, allowed scheme, has a host)
    fn validate_url(&self, url: Option<&str>) -> Option<RejectionReason> {
        let url = match url.map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return Some(RejectionReason::MissingUrl),
        };

        let parsed = match url::Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => return Some(RejectionReason::MalformedUrl(e.to_string())),
        };

        if !self.config.allows_scheme(parsed.scheme()) {
            return Some(RejectionReason::DisallowedScheme(parsed.scheme().to_string()));
        }

        match parsed.host_str() {
            Some(host) if !host.is_empty() => None,
            _ => Some(RejectionReason::MissingHost),
        }
    }

    /// Check that the target article resolves
    fn check_article<A: ArticleStore>(
        &self,
        id: &ArticleId,
        articles: &A,
    ) -> Result<Option<RejectionReason>, GatekeeperError>
    where
        A::Error: std::fmt::Display,
    {
        let exists = articles
            .resolve_article(id)
            .map_err(|e| GatekeeperError::Store(format!("Failed to resolve article: {}", e)))?;

        if exists {
            Ok(None)
        } else {
            Ok(Some(RejectionReason::UnknownArticle(id.clone())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackwarden_domain::RawSubmission;

    fn create_test_record(url: Option<&str>) -> TrackbackRecord {
        TrackbackRecord::from_submission(
            RawSubmission {
                blog_name: Some("Blog name".to_string()),
                title: Some("Title".to_string()),
                url: url.map(str::to_string),
                excerpt: Some("Excerpt".to_string()),
                ip: None,
            },
            ArticleId::from("1"),
        )
    }

    #[test]
    fn test_valid_trackback() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("http://foo.com"));
        let result = validator
            .validate(&record, Some(&MockArticles::with(&["1"])))
            .unwrap();

        assert!(result.valid);
        assert!(result.reasons.is_empty());
        assert!(result.field_errors.is_empty());
    }

    #[test]
    fn test_missing_url() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(None);
        let result = validator.validate(&record, Some(&known())).unwrap();

        assert!(!result.valid);
        assert_eq!(result.reasons, vec![RejectionReason::MissingUrl]);
        assert!(!result.errors_for("url").is_empty());
    }

    #[test]
    fn test_blank_url() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("   "));
        let result = validator.validate(&record, Some(&known())).unwrap();

        assert!(!result.valid);
        assert_eq!(result.reasons, vec![RejectionReason::MissingUrl]);
    }

    #[test]
    fn test_relative_url_is_malformed() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("foo.com/post"));
        let result = validator.validate(&record, Some(&known())).unwrap();

        assert!(!result.valid);
        match &result.reasons[0] {
            RejectionReason::MalformedUrl(_) => {}
            other => panic!("Expected MalformedUrl, got {:?}", other),
        }
        assert_eq!(result.errors_for("url").len(), 1);
    }

    #[test]
    fn test_disallowed_scheme() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("ftp://foo.com/file"));
        let result = validator.validate(&record, Some(&known())).unwrap();

        assert_eq!(
            result.reasons,
            vec![RejectionReason::DisallowedScheme("ftp".to_string())]
        );
    }

    #[test]
    fn test_url_without_host() {
        let validator = TrackbackValidator::new(ValidationConfig::permissive());
        let record = create_test_record(Some("mailto:someone@foo.com"));
        let result = validator.validate::<MockArticles>(&record, None).unwrap();

        assert_eq!(result.reasons, vec![RejectionReason::MissingHost]);
    }

    #[test]
    fn test_unknown_article() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("http://foo.com"));
        let result = validator
            .validate(&record, Some(&MockArticles::with(&["2"])))
            .unwrap();

        assert!(!result.valid);
        assert!(result.errors_for("url").is_empty());
        assert_eq!(result.errors_for("article_id").len(), 1);
    }

    #[test]
    fn test_permissive_config_skips_article_lookup() {
        let validator = TrackbackValidator::new(ValidationConfig::permissive());
        let record = create_test_record(Some("http://foo.com"));
        let result = validator
            .validate(&record, Some(&MockArticles::with(&[])))
            .unwrap();

        assert!(result.valid);
    }

    #[test]
    fn test_multiple_validation_errors() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(None);
        let result = validator
            .validate(&record, Some(&MockArticles::with(&[])))
            .unwrap();

        assert!(!result.valid);
        assert_eq!(result.reasons.len(), 2);
        assert_eq!(result.field_errors.len(), 2);
    }

    #[test]
    fn test_store_failure_is_an_error() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("http://foo.com"));

        let result = validator.validate(&record, Some(&FailingArticles));
        assert!(matches!(result, Err(GatekeeperError::Store(_))));
    }

    #[test]
    fn test_validation_does_not_mutate_record() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(None);
        let before = record.clone();

        validator.validate(&record, Some(&known())).unwrap();
        assert_eq!(record, before);
    }

    #[test]
    fn test_missing_article_store_is_config_error() {
        let validator = TrackbackValidator::default_config();
        let record = create_test_record(Some("http://foo.com"));
        let result = validator.validate::<MockArticles>(&record, None);

        assert!(matches!(result, Err(GatekeeperError::Config(_))));
    }

    #[test]
    fn test_article_store_optional_when_not_required() {
        let validator = TrackbackValidator::new(ValidationConfig::permissive());
        let record = create_test_record(Some("http://foo.com"));
        let result = validator.validate::<MockArticles>(&record, None).unwrap();

        assert!(result.valid);
    }

    fn known() -> MockArticles {
        MockArticles::with(&["1"])
    }

    // Mock article store (fixed set of known ids)
    struct MockArticles {
        known: Vec<ArticleId>,
    }

    impl MockArticles {
        fn with(ids: &[&str]) -> Self {
            Self {
                known: ids.iter().map(|id| ArticleId::from(*id)).collect(),
            }
        }
    }

    impl ArticleStore for MockArticles {
        type Error = String;

        fn resolve_article(&self, id: &ArticleId) -> Result<bool, Self::Error> {
            Ok(self.known.contains(id))
        }
    }

    struct FailingArticles;

    impl ArticleStore for FailingArticles {
        type Error = String;

        fn resolve_article(&self, _id: &ArticleId) -> Result<bool, Self::Error> {
            Err("connection reset".to_string())
        }
    }
}
