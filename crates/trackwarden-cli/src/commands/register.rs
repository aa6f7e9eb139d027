//! Register-article command implementation.

use crate::cli::RegisterArticleArgs;
use crate::error::Result;
use crate::output::Formatter;
use trackwarden_domain::ArticleId;
use trackwarden_store::SqliteStore;

/// Execute the register-article command.
pub fn execute_register_article(
    args: RegisterArticleArgs,
    store: &mut SqliteStore,
    formatter: &Formatter,
) -> Result<()> {
    let id = ArticleId::new(args.id);
    store.register_article(&id, args.title.as_deref())?;

    println!("{}", formatter.success(&format!("Article {} registered", id)));
    Ok(())
}
