//! List command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::Formatter;
use trackwarden_domain::traits::TrackbackStore;
use trackwarden_domain::ArticleId;

/// Execute the list command.
pub fn execute_list<S: TrackbackStore>(
    args: ListArgs,
    store: &S,
    formatter: &Formatter,
) -> Result<()> {
    let mut records = store.list_for_article(&ArticleId::new(args.article))?;
    if args.spam_only {
        records.retain(|r| r.is_spam());
    }

    println!("{}", formatter.format_trackbacks(&records)?);
    Ok(())
}
