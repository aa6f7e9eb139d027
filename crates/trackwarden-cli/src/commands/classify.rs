//! Classify command implementation.

use crate::cli::ClassifyArgs;
use crate::error::Result;
use crate::output::Formatter;
use trackwarden_classifier::ContentClassifier;
use trackwarden_domain::{ArticleId, TrackbackRecord};

/// Execute the classify command.
pub async fn execute_classify(
    args: ClassifyArgs,
    classifier: &ContentClassifier,
    formatter: &Formatter,
) -> Result<()> {
    let record = TrackbackRecord::from_submission(args.fields.into(), ArticleId::new("-"));
    let classification = classifier.classify(&record).await;

    println!("{}", formatter.format_classification(&classification)?);
    Ok(())
}
