//! Demo request (Opportunity) conversion functions.

use celekt_core::{ApprovalStatus, DemoId, DemoStage};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::error::CrmError;
use crate::record::RemoteRecord;
use crate::types::{Demo, DemoInput, DemoPatch};

use super::CrmEntity;

impl CrmEntity for Demo {
    const OBJECT_NAME: &'static str = "Opportunity";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "StageName",
        "Demo_Schedule__c",
        "Expected_Discount__c",
        "Manager_Approval__c",
        "Manager_Comment__c",
        "Lead__r.Product_Interest__c",
    ];

    const CREATE_COMMAND: Option<&'static str> = Some("createDemoRequest");
    const UPDATE_COMMAND: &'static str = "updateDemoStatus";

    type Input = DemoInput;
    type Patch = DemoPatch;

    fn from_record(record: &RemoteRecord) -> Self {
        Self {
            id: DemoId::new(record.id()),
            customer_name: record.text_or("Name", ""),
            scheduled_at: record.datetime_or_epoch("Demo_Schedule__c"),
            stage: DemoStage::from_remote(record.text_or("StageName", "").as_str()),
            manager_approval: ApprovalStatus::from_remote(
                record.text_or("Manager_Approval__c", "").as_str(),
            ),
            expected_discount_pct: record.decimal_or("Expected_Discount__c", Decimal::ZERO),
            manager_comment: record.text_or("Manager_Comment__c", ""),
            // One hop into the originating lead; empty when the demo was
            // entered without one.
            product_interest: record.text_or("Lead__r.Product_Interest__c", ""),
        }
    }

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn validate_input(input: &Self::Input) -> Result<(), CrmError> {
        if input.customer_name.trim().is_empty() {
            return Err(CrmError::Validation(
                "customer name is required".to_string(),
            ));
        }
        if input.expected_discount_pct < Decimal::ZERO
            || input.expected_discount_pct > Decimal::from(100)
        {
            return Err(CrmError::Validation(
                "expected discount must be between 0 and 100 percent".to_string(),
            ));
        }
        Ok(())
    }

    fn create_payload(input: &Self::Input) -> Value {
        json!({
            "Name": input.customer_name.trim(),
            "Demo_Schedule__c": input.scheduled_at.to_rfc3339(),
            "Expected_Discount__c": input.expected_discount_pct,
            "StageName": DemoStage::Scheduled.as_remote(),
            "Manager_Approval__c": ApprovalStatus::Pending.as_remote(),
        })
    }

    fn patch_payload(id: &str, patch: &Self::Patch) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(stage) = patch.stage {
            fields.insert("StageName".to_string(), json!(stage.as_remote()));
        }
        if let Some(approval) = patch.manager_approval {
            fields.insert(
                "Manager_Approval__c".to_string(),
                json!(approval.as_remote()),
            );
        }
        if let Some(comment) = &patch.manager_comment {
            fields.insert("Manager_Comment__c".to_string(), json!(comment));
        }

        json!({ "Id": id, "fields": fields })
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        if let Some(stage) = patch.stage {
            self.stage = stage;
        }
        if let Some(approval) = patch.manager_approval {
            self.manager_approval = approval;
        }
        if let Some(comment) = &patch.manager_comment {
            self.manager_comment.clone_from(comment);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_with_related_lead() {
        let record = RemoteRecord::from_value(json!({
            "Id": "0065g00000DemoABCD",
            "Name": "Priya Sharma",
            "StageName": "In Progress",
            "Demo_Schedule__c": "2024-01-17T11:00:00.000+0000",
            "Expected_Discount__c": 15,
            "Manager_Approval__c": "Approved",
            "Manager_Comment__c": "Customer has good credit history",
            "Lead__r": { "Product_Interest__c": "Samsung Galaxy S24" }
        }));

        let demo = Demo::from_record(&record);
        assert_eq!(demo.stage, DemoStage::InProgress);
        assert_eq!(demo.manager_approval, ApprovalStatus::Approved);
        assert_eq!(demo.expected_discount_pct, Decimal::from(15));
        assert_eq!(demo.product_interest, "Samsung Galaxy S24");
    }

    #[test]
    fn test_from_record_without_related_lead() {
        let record = RemoteRecord::from_value(json!({
            "Id": "0065g00000DemoABCD",
            "Name": "Walk-in",
            "Lead__r": null
        }));

        let demo = Demo::from_record(&record);
        assert_eq!(demo.product_interest, "");
        assert_eq!(demo.stage, DemoStage::Scheduled);
        assert_eq!(demo.manager_approval, ApprovalStatus::Pending);
        assert_eq!(demo.expected_discount_pct, Decimal::ZERO);
    }

    #[test]
    fn test_validate_input_bounds_discount() {
        let input = DemoInput {
            customer_name: "Amit Patel".to_string(),
            scheduled_at: chrono::Utc::now(),
            expected_discount_pct: Decimal::from(120),
        };
        assert!(matches!(
            Demo::validate_input(&input),
            Err(CrmError::Validation(_))
        ));
    }

    #[test]
    fn test_apply_patch_is_idempotent() {
        let mut demo = Demo::from_record(&RemoteRecord::from_value(json!({
            "Id": "0065g0", "Name": "Rajesh Kumar", "StageName": "Scheduled"
        })));
        let patch = DemoPatch {
            stage: Some(DemoStage::Completed),
            manager_comment: Some("Demo successful, ready to purchase".to_string()),
            ..DemoPatch::default()
        };

        demo.apply_patch(&patch);
        let once = demo.clone();
        demo.apply_patch(&patch);

        assert_eq!(demo, once);
        assert_eq!(demo.stage, DemoStage::Completed);
    }
}
