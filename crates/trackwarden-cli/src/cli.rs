//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use trackwarden_domain::{ModerationPolicy, RawSubmission};

/// Trackwarden CLI - Validate and classify trackback submissions.
#[derive(Debug, Parser)]
#[command(name = "trackwarden")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TRACKWARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path
    #[arg(long, global = true, env = "TRACKWARDEN_DB", default_value = "trackwarden.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (GUIDs and outcomes only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Validate, classify and store a trackback
    Submit(SubmitArgs),

    /// Classify a trackback without validating or storing it
    Classify(ClassifyArgs),

    /// List stored trackbacks for an article
    List(ListArgs),

    /// Register an article so trackbacks can target it
    RegisterArticle(RegisterArticleArgs),

    /// Print the effective configuration
    ShowConfig,
}

/// Submitted trackback fields.
#[derive(Debug, Clone, Args)]
pub struct SubmissionFields {
    /// Address of the remote post
    #[arg(short, long)]
    pub url: Option<String>,

    /// Title of the remote post
    #[arg(short, long)]
    pub title: Option<String>,

    /// Name of the remote blog
    #[arg(short, long)]
    pub blog_name: Option<String>,

    /// Excerpt of the remote post
    #[arg(short, long)]
    pub excerpt: Option<String>,

    /// Submitter IP address
    #[arg(long)]
    pub ip: Option<String>,
}

/// Arguments for the submit command.
#[derive(Debug, Parser)]
pub struct SubmitArgs {
    /// Target article
    pub article: String,

    #[command(flatten)]
    pub fields: SubmissionFields,

    /// Moderation policy (defaults to the configured one)
    #[arg(short, long, value_enum)]
    pub policy: Option<PolicyArg>,

    /// Decide only; do not write to the database
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the classify command.
#[derive(Debug, Parser)]
pub struct ClassifyArgs {
    #[command(flatten)]
    pub fields: SubmissionFields,
}

/// Arguments for the list command.
#[derive(Debug, Parser)]
pub struct ListArgs {
    /// Article whose trackbacks to list
    pub article: String,

    /// Show only trackbacks classified as spam
    #[arg(long)]
    pub spam_only: bool,
}

/// Arguments for the register-article command.
#[derive(Debug, Parser)]
pub struct RegisterArticleArgs {
    /// Article identifier
    pub id: String,

    /// Article title
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Moderation policy argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PolicyArg {
    /// Reject spam outright
    RejectSpam,
    /// Queue spam for moderation
    QueueSpam,
    /// Queue everything for moderation
    ModerateAll,
}

impl From<PolicyArg> for ModerationPolicy {
    fn from(policy: PolicyArg) -> Self {
        match policy {
            PolicyArg::RejectSpam => ModerationPolicy::RejectSpam,
            PolicyArg::QueueSpam => ModerationPolicy::QueueSpam,
            PolicyArg::ModerateAll => ModerationPolicy::ModerateAll,
        }
    }
}

impl From<SubmissionFields> for RawSubmission {
    fn from(fields: SubmissionFields) -> Self {
        RawSubmission {
            blog_name: fields.blog_name,
            title: fields.title,
            url: fields.url,
            excerpt: fields.excerpt,
            ip: fields.ip,
        }
    }
}

impl From<CliFormat> for crate::output::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::output::OutputFormat::Table,
            CliFormat::Json => crate::output::OutputFormat::Json,
            CliFormat::Quiet => crate::output::OutputFormat::Quiet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_command() {
        let cli = Cli::parse_from([
            "trackwarden",
            "submit",
            "42",
            "--url",
            "http://notaspammer.com",
            "--excerpt",
            "bland",
            "--ip",
            "212.42.230.206",
            "--policy",
            "reject-spam",
        ]);

        match cli.command {
            Command::Submit(args) => {
                assert_eq!(args.article, "42");
                assert_eq!(args.fields.url.as_deref(), Some("http://notaspammer.com"));
                assert!(matches!(args.policy, Some(PolicyArg::RejectSpam)));
                assert!(!args.dry_run);
            }
            _ => panic!("Expected Submit command"),
        }
    }

    #[test]
    fn test_global_options() {
        let cli = Cli::parse_from([
            "trackwarden",
            "list",
            "1",
            "--db",
            "/tmp/tb.db",
            "--format",
            "json",
        ]);

        assert_eq!(cli.db, PathBuf::from("/tmp/tb.db"));
        assert_eq!(cli.format, Some(CliFormat::Json));
        assert!(matches!(cli.command, Command::List(_)));
    }

    #[test]
    fn test_register_article_command() {
        let cli = Cli::parse_from(["trackwarden", "register-article", "7", "--title", "Hello"]);
        match cli.command {
            Command::RegisterArticle(args) => {
                assert_eq!(args.id, "7");
                assert_eq!(args.title.as_deref(), Some("Hello"));
            }
            _ => panic!("Expected RegisterArticle command"),
        }
    }

    #[test]
    fn test_fields_into_submission() {
        let fields = SubmissionFields {
            url: Some("http://foo.com".to_string()),
            title: None,
            blog_name: Some("Blog".to_string()),
            excerpt: None,
            ip: None,
        };
        let raw: RawSubmission = fields.into();
        assert_eq!(raw.url.as_deref(), Some("http://foo.com"));
        assert_eq!(raw.blog_name.as_deref(), Some("Blog"));
    }

    #[test]
    fn test_policy_conversion() {
        let policy: ModerationPolicy = PolicyArg::ModerateAll.into();
        assert_eq!(policy, ModerationPolicy::ModerateAll);
    }
}
