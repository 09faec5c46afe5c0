//! Store issue commands.

use celekt_core::{IssueCategory, IssuePriority, IssueStatus};
use celekt_crm::query::Filter;
use celekt_crm::types::{Issue, IssueInput, IssuePatch};
use celekt_crm::{RemoteClient, SyncOrchestrator};
use clap::Subcommand;

use super::{ensure_ok, into_result, parse_label};

#[derive(Subcommand)]
pub enum IssueAction {
    /// List store issues
    List {
        /// Only issues still open
        #[arg(long)]
        open: bool,
    },
    /// Show one issue
    Show {
        /// Case record ID
        id: String,
    },
    /// Raise a new issue
    Raise {
        /// Short summary
        #[arg(short, long)]
        subject: String,

        /// What is wrong and where
        #[arg(short, long)]
        description: String,

        /// Facility category (Electrical, Air Conditioning, Furniture/Fixtures,
        /// Security Systems, Cleanliness, Other)
        #[arg(short, long, default_value = "Other")]
        category: String,

        /// Priority (Low, Medium, High)
        #[arg(short, long, default_value = "Medium")]
        priority: String,
    },
    /// Close an issue
    Close {
        /// Case record ID
        id: String,
    },
}

pub async fn run(
    client: RemoteClient,
    action: IssueAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sync = SyncOrchestrator::<Issue>::new(client);

    match action {
        IssueAction::List { open } => {
            let mut filter = Filter::new();
            if open {
                filter = filter.eq("Status", IssueStatus::Open.as_remote());
            }
            let issues = into_result(sync.list(filter).await)?;
            print_issues(&issues);
        }
        IssueAction::Show { id } => {
            let issue = into_result(sync.get_by_id(&id).await)?;
            print_issue(&issue);
        }
        IssueAction::Raise {
            subject,
            description,
            category,
            priority,
        } => {
            let input = IssueInput {
                subject,
                description,
                category: parse_label(
                    &category,
                    IssueCategory::from_remote,
                    IssueCategory::as_remote,
                )?,
                priority: parse_label(
                    &priority,
                    IssuePriority::from_remote,
                    IssuePriority::as_remote,
                )?,
            };
            let state = sync.create(&input).await;
            ensure_ok(state)?;
            report_raised(state.data.as_ref());
        }
        IssueAction::Close { id } => {
            let patch = IssuePatch {
                status: Some(IssueStatus::Closed),
                ..IssuePatch::default()
            };
            ensure_ok(sync.update(&id, patch).await)?;
            report_closed(&id);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_issues(issues: &[Issue]) {
    for issue in issues {
        println!(
            "{}  {:<40} {:?}/{:?}  {:?}",
            issue.id, issue.subject, issue.status, issue.priority, issue.category
        );
    }
    println!("{} issue(s)", issues.len());
}

#[allow(clippy::print_stdout)]
fn print_issue(issue: &Issue) {
    println!("Id:          {}", issue.id);
    println!("Subject:     {}", issue.subject);
    println!("Description: {}", issue.description);
    println!("Category:    {}", issue.category.as_remote());
    println!("Status:      {}", issue.status.as_remote());
    println!("Priority:    {}", issue.priority.as_remote());
    println!("Raised:      {}", issue.created_at.format("%Y-%m-%d"));
}

#[allow(clippy::print_stdout)]
fn report_raised(issue: Option<&Issue>) {
    match issue {
        Some(issue) => println!("raised issue {}", issue.id),
        None => println!("raised issue"),
    }
}

#[allow(clippy::print_stdout)]
fn report_closed(id: &str) {
    println!("closed issue {id}");
}
