//! Demo request commands.

use celekt_core::{ApprovalStatus, DemoStage};
use celekt_crm::query::Filter;
use celekt_crm::types::{Demo, DemoPatch};
use celekt_crm::{RemoteClient, SyncOrchestrator};
use clap::Subcommand;

use super::{ensure_ok, into_result, parse_label};

#[derive(Subcommand)]
pub enum DemoAction {
    /// List demo requests
    List {
        /// Filter by stage (Scheduled, In Progress, Completed, Cancelled)
        #[arg(short, long)]
        stage: Option<String>,
    },
    /// Show one demo request
    Show {
        /// Demo record ID
        id: String,
    },
    /// Move a demo request to a new stage
    SetStage {
        /// Demo record ID
        id: String,
        /// New stage (Scheduled, In Progress, Completed, Cancelled)
        stage: String,
    },
}

pub async fn run(
    client: RemoteClient,
    action: DemoAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sync = SyncOrchestrator::<Demo>::new(client);

    match action {
        DemoAction::List { stage } => {
            let mut filter = Filter::new();
            if let Some(stage) = stage {
                let stage = parse_label(&stage, DemoStage::from_remote, DemoStage::as_remote)?;
                filter = filter.eq("StageName", stage.as_remote());
            }
            let demos = into_result(sync.list(filter).await)?;
            print_demos(&demos);
        }
        DemoAction::Show { id } => {
            let demo = into_result(sync.get_by_id(&id).await)?;
            print_demo(&demo);
        }
        DemoAction::SetStage { id, stage } => {
            let stage = parse_label(&stage, DemoStage::from_remote, DemoStage::as_remote)?;
            let patch = DemoPatch {
                stage: Some(stage),
                ..DemoPatch::default()
            };
            ensure_ok(sync.update(&id, patch).await)?;
            report_updated(&id, stage);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_demos(demos: &[Demo]) {
    for demo in demos {
        println!(
            "{}  {:<24} {}  {:<12} approval: {}",
            demo.id,
            demo.customer_name,
            demo.scheduled_at.format("%Y-%m-%d %H:%M"),
            demo.stage.as_remote(),
            demo.manager_approval.as_remote()
        );
    }
    println!("{} demo request(s)", demos.len());
}

#[allow(clippy::print_stdout)]
fn print_demo(demo: &Demo) {
    println!("Id:        {}", demo.id);
    println!("Customer:  {}", demo.customer_name);
    println!("Scheduled: {}", demo.scheduled_at.format("%Y-%m-%d %H:%M"));
    println!("Stage:     {}", demo.stage.as_remote());
    println!("Approval:  {}", demo.manager_approval.as_remote());
    println!("Discount:  {}%", demo.expected_discount_pct);
    println!("Interest:  {}", demo.product_interest);
    if !demo.manager_comment.is_empty() {
        println!("Comment:   {}", demo.manager_comment);
    }
    if demo.manager_approval == ApprovalStatus::Pending {
        println!("(awaiting manager approval)");
    }
}

#[allow(clippy::print_stdout)]
fn report_updated(id: &str, stage: DemoStage) {
    println!("moved demo {id} to {}", stage.as_remote());
}
