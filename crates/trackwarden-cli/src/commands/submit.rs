//! Submit command implementation.

use crate::cli::SubmitArgs;
use crate::error::Result;
use crate::output::Formatter;
use trackwarden_domain::ArticleId;
use trackwarden_service::TrackbackService;
use trackwarden_store::SqliteStore;

/// Execute the submit command.
pub async fn execute_submit(
    args: SubmitArgs,
    service: &TrackbackService,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let policy = args.policy.map(Into::into).unwrap_or_else(|| service.policy());

    let mut decision = service
        .submit(args.fields.into(), ArticleId::new(args.article), policy, Some(&*store))
        .await?;

    if decision.is_persistable() && !args.dry_run {
        service.persist(store, &mut decision)?;
    }

    println!("{}", formatter.format_decision(&decision)?);
    if args.dry_run && decision.is_persistable() {
        eprintln!("{}", formatter.warning("Dry run: nothing was stored"));
    }

    Ok(())
}
