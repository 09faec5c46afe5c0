//! Lead conversion functions.

use celekt_core::{Email, LeadId, LeadStatus};
use serde_json::{Value, json};

use crate::error::CrmError;
use crate::record::RemoteRecord;
use crate::types::{Lead, LeadInput, LeadPatch};

use super::CrmEntity;

impl CrmEntity for Lead {
    const OBJECT_NAME: &'static str = "Lead";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "FirstName",
        "LastName",
        "Email",
        "Phone",
        "City",
        "Product_Interest__c",
        "Status",
        "CreatedDate",
    ];

    const CREATE_COMMAND: Option<&'static str> = Some("createLead");
    const UPDATE_COMMAND: &'static str = "updateLeadStatus";

    type Input = LeadInput;
    type Patch = LeadPatch;

    fn from_record(record: &RemoteRecord) -> Self {
        Self {
            id: LeadId::new(record.id()),
            first_name: record.text_or("FirstName", ""),
            last_name: record.text_or("LastName", ""),
            email: record.text_or("Email", ""),
            phone: record.text_or("Phone", "N/A"),
            location: record.text_or("City", ""),
            product_interest: record.text_or("Product_Interest__c", ""),
            status: LeadStatus::from_remote(record.text_or("Status", "").as_str()),
            created_at: record.datetime_or_epoch("CreatedDate"),
        }
    }

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn validate_input(input: &Self::Input) -> Result<(), CrmError> {
        if input.first_name.trim().is_empty() {
            return Err(CrmError::Validation("first name is required".to_string()));
        }
        if input.last_name.trim().is_empty() {
            return Err(CrmError::Validation("last name is required".to_string()));
        }
        if input.phone.trim().is_empty() {
            return Err(CrmError::Validation("phone is required".to_string()));
        }
        // Email is optional at capture time, but a provided one must parse.
        if !input.email.trim().is_empty() {
            Email::parse(input.email.trim())
                .map_err(|e| CrmError::Validation(format!("invalid email: {e}")))?;
        }
        Ok(())
    }

    fn create_payload(input: &Self::Input) -> Value {
        json!({
            "FirstName": input.first_name.trim(),
            "LastName": input.last_name.trim(),
            "Email": input.email.trim(),
            "Phone": input.phone.trim(),
            "City": input.location.trim(),
            "Product_Interest__c": input.product_interest.trim(),
            "Status": LeadStatus::New.as_remote(),
        })
    }

    fn patch_payload(id: &str, patch: &Self::Patch) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(status) = patch.status {
            fields.insert("Status".to_string(), json!(status.as_remote()));
        }
        if let Some(phone) = &patch.phone {
            fields.insert("Phone".to_string(), json!(phone));
        }
        if let Some(location) = &patch.location {
            fields.insert("City".to_string(), json!(location));
        }
        if let Some(product_interest) = &patch.product_interest {
            fields.insert(
                "Product_Interest__c".to_string(),
                json!(product_interest),
            );
        }

        json!({ "Id": id, "fields": fields })
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(phone) = &patch.phone {
            self.phone.clone_from(phone);
        }
        if let Some(location) = &patch.location {
            self.location.clone_from(location);
        }
        if let Some(product_interest) = &patch.product_interest {
            self.product_interest.clone_from(product_interest);
        }
    }
}
