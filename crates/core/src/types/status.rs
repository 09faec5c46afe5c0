//! Status enums shared by every screen.
//!
//! Each enum carries a `#[default]` variant that is also the documented
//! mapping default: when the remote record omits the field or carries a
//! value we do not recognize, mapping falls back to it rather than failing.
//! `from_remote` is therefore total, and `as_remote` is the exact picklist
//! label the CRM stores.

use serde::{Deserialize, Serialize};

/// Lead pipeline status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Interested,
    Converted,
    Lost,
}

impl LeadStatus {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "Contacted" => Self::Contacted,
            "Interested" => Self::Interested,
            "Converted" => Self::Converted,
            "Lost" => Self::Lost,
            _ => Self::New,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::Contacted => "Contacted",
            Self::Interested => "Interested",
            Self::Converted => "Converted",
            Self::Lost => "Lost",
        }
    }
}

/// Store issue (Case) status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IssueStatus {
    #[default]
    Open,
    InProgress,
    Closed,
}

impl IssueStatus {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "In Progress" => Self::InProgress,
            "Closed" => Self::Closed,
            _ => Self::Open,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Closed => "Closed",
        }
    }
}

/// Store issue (Case) priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IssuePriority {
    Low,
    #[default]
    Medium,
    High,
}

impl IssuePriority {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "Low" => Self::Low,
            "High" => Self::High,
            _ => Self::Medium,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

/// Facility category for a store issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IssueCategory {
    Electrical,
    AirConditioning,
    FurnitureFixtures,
    SecuritySystems,
    Cleanliness,
    #[default]
    Other,
}

impl IssueCategory {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "Electrical" => Self::Electrical,
            "Air Conditioning" => Self::AirConditioning,
            "Furniture/Fixtures" => Self::FurnitureFixtures,
            "Security Systems" => Self::SecuritySystems,
            "Cleanliness" => Self::Cleanliness,
            _ => Self::Other,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::Electrical => "Electrical",
            Self::AirConditioning => "Air Conditioning",
            Self::FurnitureFixtures => "Furniture/Fixtures",
            Self::SecuritySystems => "Security Systems",
            Self::Cleanliness => "Cleanliness",
            Self::Other => "Other",
        }
    }
}

/// Demo request stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DemoStage {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl DemoStage {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "In Progress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Cancelled" => Self::Cancelled,
            _ => Self::Scheduled,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Manager approval state on a demo or discount request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    /// Parse the remote picklist label, falling back to the default.
    #[must_use]
    pub fn from_remote(value: &str) -> Self {
        match value {
            "Approved" => Self::Approved,
            "Rejected" => Self::Rejected,
            _ => Self::Pending,
        }
    }

    /// The picklist label stored in the CRM.
    #[must_use]
    pub const fn as_remote(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_labels_fall_back_to_default() {
        assert_eq!(LeadStatus::from_remote("Recycled"), LeadStatus::New);
        assert_eq!(IssueStatus::from_remote(""), IssueStatus::Open);
        assert_eq!(IssuePriority::from_remote("Urgent"), IssuePriority::Medium);
        assert_eq!(IssueCategory::from_remote("Plumbing"), IssueCategory::Other);
        assert_eq!(DemoStage::from_remote("On Hold"), DemoStage::Scheduled);
        assert_eq!(
            ApprovalStatus::from_remote("Escalated"),
            ApprovalStatus::Pending
        );
    }

    #[test]
    fn test_remote_labels_round_trip() {
        for status in [
            IssueStatus::Open,
            IssueStatus::InProgress,
            IssueStatus::Closed,
        ] {
            assert_eq!(IssueStatus::from_remote(status.as_remote()), status);
        }
        for stage in [
            DemoStage::Scheduled,
            DemoStage::InProgress,
            DemoStage::Completed,
            DemoStage::Cancelled,
        ] {
            assert_eq!(DemoStage::from_remote(stage.as_remote()), stage);
        }
    }

    #[test]
    fn test_multi_word_labels() {
        assert_eq!(
            IssueCategory::FurnitureFixtures.as_remote(),
            "Furniture/Fixtures"
        );
        assert_eq!(
            IssueCategory::from_remote("Air Conditioning"),
            IssueCategory::AirConditioning
        );
    }
}
