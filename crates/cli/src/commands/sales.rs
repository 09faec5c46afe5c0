//! Approved sale and billing commands.

use celekt_core::{CurrencyCode, Money};
use celekt_crm::query::Filter;
use celekt_crm::types::{ApprovedSale, ApprovedSalePatch};
use celekt_crm::{RemoteClient, SyncOrchestrator};
use clap::Subcommand;
use rust_decimal::Decimal;

use super::{ensure_ok, into_result};

#[derive(Subcommand)]
pub enum SaleAction {
    /// List approved sales
    List {
        /// Only sales that already have a bill recorded
        #[arg(long)]
        billed: bool,
    },
    /// Show one approved sale
    Show {
        /// Sale record ID
        id: String,
    },
    /// Record bill details against an approved sale
    RecordBill {
        /// Sale record ID
        id: String,

        /// Bill number from the store's billing system
        #[arg(short, long)]
        bill_number: String,

        /// Billed amount in whole rupees
        #[arg(short, long)]
        amount: Decimal,
    },
}

pub async fn run(
    client: RemoteClient,
    action: SaleAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sync = SyncOrchestrator::<ApprovedSale>::new(client);

    match action {
        SaleAction::List { billed } => {
            let mut filter = Filter::new();
            if billed {
                filter = filter.not_null("Bill_Number__c");
            }
            let sales = into_result(sync.list(filter).await)?;
            print_sales(&sales);
        }
        SaleAction::Show { id } => {
            let sale = into_result(sync.get_by_id(&id).await)?;
            print_sale(&sale);
        }
        SaleAction::RecordBill {
            id,
            bill_number,
            amount,
        } => {
            let patch = ApprovedSalePatch {
                bill_number: Some(bill_number.clone()),
                billing_amount: Some(Money::new(amount, CurrencyCode::INR)),
            };
            ensure_ok(sync.update(&id, patch).await)?;
            report_billed(&id, &bill_number);
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_sales(sales: &[ApprovedSale]) {
    for sale in sales {
        let billed = if sale.bill_number.is_empty() {
            "unbilled"
        } else {
            sale.bill_number.as_str()
        };
        println!(
            "{}  {:<24} {}  final {}  [{billed}]",
            sale.id, sale.customer_name, sale.amount, sale.final_price
        );
    }
    println!("{} approved sale(s)", sales.len());
}

#[allow(clippy::print_stdout)]
fn print_sale(sale: &ApprovedSale) {
    println!("Id:          {}", sale.id);
    println!("Customer:    {}", sale.customer_name);
    println!("Phone:       {}", sale.phone);
    println!("Amount:      {}", sale.amount);
    println!("Discount:    {}%", sale.expected_discount_pct);
    println!("Final price: {}", sale.final_price);
    println!("Approved:    {}", sale.approved_on.format("%Y-%m-%d"));
    if !sale.manager_comment.is_empty() {
        println!("Comment:     {}", sale.manager_comment);
    }
    if sale.bill_number.is_empty() {
        println!("Billing:     not recorded yet");
    } else {
        println!("Billing:     {} ({})", sale.bill_number, sale.billing_amount);
    }
}

#[allow(clippy::print_stdout)]
fn report_billed(id: &str, bill_number: &str) {
    println!("recorded bill {bill_number} against sale {id}");
}
