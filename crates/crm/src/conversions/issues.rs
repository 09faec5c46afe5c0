//! Issue (Case) conversion functions.

use celekt_core::{CaseId, IssueCategory, IssuePriority, IssueStatus};
use serde_json::{Value, json};

use crate::error::CrmError;
use crate::record::RemoteRecord;
use crate::types::{Issue, IssueInput, IssuePatch};

use super::CrmEntity;

impl CrmEntity for Issue {
    const OBJECT_NAME: &'static str = "Case";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Subject",
        "Description",
        "Status",
        "Priority",
        "Category__c",
        "CreatedDate",
    ];

    const CREATE_COMMAND: Option<&'static str> = Some("createIssueCase");
    const UPDATE_COMMAND: &'static str = "updateIssueCase";

    type Input = IssueInput;
    type Patch = IssuePatch;

    fn from_record(record: &RemoteRecord) -> Self {
        Self {
            id: CaseId::new(record.id()),
            subject: record.text_or("Subject", ""),
            description: record.text_or("Description", ""),
            category: IssueCategory::from_remote(record.text_or("Category__c", "").as_str()),
            status: IssueStatus::from_remote(record.text_or("Status", "").as_str()),
            priority: IssuePriority::from_remote(record.text_or("Priority", "").as_str()),
            created_at: record.datetime_or_epoch("CreatedDate"),
        }
    }

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn validate_input(input: &Self::Input) -> Result<(), CrmError> {
        if input.subject.trim().is_empty() {
            return Err(CrmError::Validation("subject is required".to_string()));
        }
        if input.description.trim().is_empty() {
            return Err(CrmError::Validation("description is required".to_string()));
        }
        Ok(())
    }

    fn create_payload(input: &Self::Input) -> Value {
        json!({
            "Subject": input.subject.trim(),
            "Description": input.description.trim(),
            "Category__c": input.category.as_remote(),
            "Priority": input.priority.as_remote(),
            "Status": IssueStatus::Open.as_remote(),
        })
    }

    fn patch_payload(id: &str, patch: &Self::Patch) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(status) = patch.status {
            fields.insert("Status".to_string(), json!(status.as_remote()));
        }
        if let Some(priority) = patch.priority {
            fields.insert("Priority".to_string(), json!(priority.as_remote()));
        }
        if let Some(description) = &patch.description {
            fields.insert("Description".to_string(), json!(description));
        }

        json!({ "Id": id, "fields": fields })
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
    }
}
