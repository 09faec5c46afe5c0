//! Local view-models for CRM records.
//!
//! These are the flat, fully-typed shapes the screens consume. Every field
//! has a defined value after mapping - a screen never observes an absent
//! field, whatever the remote record looked like. Inputs (`…Input`) are the
//! create shapes validated before anything leaves the device; patches
//! (`…Patch`) are partial update shapes merged locally only after the CRM
//! confirms the update.

use celekt_core::{
    ApprovalStatus, CaseId, DemoId, DemoStage, IssueCategory, IssuePriority, IssueStatus, LeadId,
    LeadStatus, Money, SaleId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Lead
// =============================================================================

/// A captured sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub first_name: String,
    pub last_name: String,
    /// May be empty when the lead was captured without an email.
    pub email: String,
    pub phone: String,
    pub location: String,
    /// Device the customer asked about.
    pub product_interest: String,
    pub status: LeadStatus,
    pub created_at: DateTime<Utc>,
}

impl Lead {
    /// Customer's display name.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Input for capturing a new lead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub product_interest: String,
}

/// Partial update to a lead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeadPatch {
    pub status: Option<LeadStatus>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub product_interest: Option<String>,
}

// =============================================================================
// Issue
// =============================================================================

/// A store facility issue (remote Case).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub id: CaseId,
    pub subject: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub created_at: DateTime<Utc>,
}

/// Input for raising a new issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueInput {
    pub subject: String,
    pub description: String,
    pub category: IssueCategory,
    pub priority: IssuePriority,
}

/// Partial update to an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuePatch {
    pub status: Option<IssueStatus>,
    pub priority: Option<IssuePriority>,
    pub description: Option<String>,
}

// =============================================================================
// Demo
// =============================================================================

/// A customer demo request (remote Opportunity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demo {
    pub id: DemoId,
    pub customer_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub stage: DemoStage,
    pub manager_approval: ApprovalStatus,
    /// Discount the customer expects, in percent.
    pub expected_discount_pct: Decimal,
    pub manager_comment: String,
    /// Product interest carried over from the originating lead.
    pub product_interest: String,
}

/// Input for scheduling a new demo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoInput {
    pub customer_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub expected_discount_pct: Decimal,
}

/// Partial update to a demo request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemoPatch {
    pub stage: Option<DemoStage>,
    pub manager_approval: Option<ApprovalStatus>,
    pub manager_comment: Option<String>,
}

// =============================================================================
// Approved sale
// =============================================================================

/// A manager-approved sale awaiting billing (remote Opportunity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedSale {
    pub id: SaleId,
    pub customer_name: String,
    /// Contact phone from the related account; `"N/A"` when there is none.
    pub phone: String,
    pub amount: Money,
    /// Approved discount, in percent.
    pub expected_discount_pct: Decimal,
    pub manager_comment: String,
    pub approved_on: DateTime<Utc>,
    /// Bill number recorded at the store; empty until billed.
    pub bill_number: String,
    pub billing_amount: Money,
    /// Derived at mapping time: `amount × (1 − discount/100)`, rounded to
    /// the nearest whole currency unit. Never stored remotely.
    pub final_price: Money,
}

/// Approved sales are created by managers inside the CRM; the dashboard
/// can only record billing against them. This type exists to satisfy the
/// entity contract and carries no fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprovedSaleInput {}

/// Billing details recorded against an approved sale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApprovedSalePatch {
    pub bill_number: Option<String>,
    pub billing_amount: Option<Money>,
}
