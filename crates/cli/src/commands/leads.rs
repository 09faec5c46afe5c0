//! Lead management commands.

use celekt_core::LeadStatus;
use celekt_crm::query::Filter;
use celekt_crm::types::{Lead, LeadInput, LeadPatch};
use celekt_crm::{RemoteClient, SyncOrchestrator};
use clap::Subcommand;

use super::{ensure_ok, into_result, parse_label};

#[derive(Subcommand)]
pub enum LeadAction {
    /// List captured leads
    List {
        /// Filter by pipeline status (New, Contacted, Interested, Converted, Lost)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Show one lead
    Show {
        /// Lead record ID
        id: String,
    },
    /// Capture a new lead
    Create {
        /// Customer first name
        #[arg(short = 'f', long)]
        first_name: String,

        /// Customer last name
        #[arg(short = 'l', long)]
        last_name: String,

        /// Customer phone number
        #[arg(short, long)]
        phone: String,

        /// Customer email (optional)
        #[arg(short, long, default_value = "")]
        email: String,

        /// Customer city
        #[arg(long, default_value = "")]
        location: String,

        /// Device the customer asked about
        #[arg(long, default_value = "")]
        interest: String,
    },
    /// Update a lead's pipeline status
    SetStatus {
        /// Lead record ID
        id: String,
        /// New status (New, Contacted, Interested, Converted, Lost)
        status: String,
    },
}

pub async fn run(
    client: RemoteClient,
    action: LeadAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sync = SyncOrchestrator::<Lead>::new(client);

    match action {
        LeadAction::List { status } => {
            let mut filter = Filter::new();
            if let Some(status) = status {
                let status =
                    parse_label(&status, LeadStatus::from_remote, LeadStatus::as_remote)?;
                filter = filter.eq("Status", status.as_remote());
            }
            let leads = into_result(sync.list(filter).await)?;
            print_leads(&leads);
        }
        LeadAction::Show { id } => {
            let lead = into_result(sync.get_by_id(&id).await)?;
            print_lead(&lead);
        }
        LeadAction::Create {
            first_name,
            last_name,
            phone,
            email,
            location,
            interest,
        } => {
            let input = LeadInput {
                first_name,
                last_name,
                phone,
                email,
                location,
                product_interest: interest,
            };
            let state = sync.create(&input).await;
            ensure_ok(state)?;
            report_created(state.data.as_ref());
        }
        LeadAction::SetStatus { id, status } => {
            let status = parse_label(&status, LeadStatus::from_remote, LeadStatus::as_remote)?;
            let patch = LeadPatch {
                status: Some(status),
                ..LeadPatch::default()
            };
            ensure_ok(sync.update(&id, patch).await)?;
            report_updated(&id);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_leads(leads: &[Lead]) {
    for lead in leads {
        println!(
            "{}  {:<24} {:<16} {:?}",
            lead.id,
            lead.full_name(),
            lead.phone,
            lead.status
        );
    }
    println!("{} lead(s)", leads.len());
}

#[allow(clippy::print_stdout)]
fn print_lead(lead: &Lead) {
    println!("Id:        {}", lead.id);
    println!("Name:      {}", lead.full_name());
    println!("Email:     {}", lead.email);
    println!("Phone:     {}", lead.phone);
    println!("Location:  {}", lead.location);
    println!("Interest:  {}", lead.product_interest);
    println!("Status:    {:?}", lead.status);
    println!("Created:   {}", lead.created_at.format("%Y-%m-%d"));
}

#[allow(clippy::print_stdout)]
fn report_created(lead: Option<&Lead>) {
    match lead {
        Some(lead) => println!("created lead {}", lead.id),
        None => println!("created lead"),
    }
}

#[allow(clippy::print_stdout)]
fn report_updated(id: &str) {
    println!("updated lead {id}");
}
