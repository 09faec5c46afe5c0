//! Approved sale (Opportunity) conversion functions.

use celekt_core::{CurrencyCode, Money, SaleId};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use crate::error::CrmError;
use crate::record::RemoteRecord;
use crate::types::{ApprovedSale, ApprovedSaleInput, ApprovedSalePatch};

use super::CrmEntity;

/// Compute the customer-payable price: `amount × (1 − discount/100)`,
/// rounded to the nearest whole currency unit.
fn final_price(amount: Money, discount_pct: Decimal) -> Money {
    let factor = Decimal::ONE - discount_pct / Decimal::from(100);
    Money::new(amount.amount * factor, amount.currency_code).rounded_to_unit()
}

impl CrmEntity for ApprovedSale {
    const OBJECT_NAME: &'static str = "Opportunity";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "Amount",
        "Expected_Discount__c",
        "Manager_Comment__c",
        "Approved_Date__c",
        "Bill_Number__c",
        "Billing_Amount__c",
        "Account.Phone",
    ];

    // Sales are approved by managers inside the CRM; the dashboard only
    // records billing against them.
    const CREATE_COMMAND: Option<&'static str> = None;
    const UPDATE_COMMAND: &'static str = "updateBilling";

    type Input = ApprovedSaleInput;
    type Patch = ApprovedSalePatch;

    fn from_record(record: &RemoteRecord) -> Self {
        let amount = Money::new(
            record.decimal_or("Amount", Decimal::ZERO),
            CurrencyCode::INR,
        );
        let expected_discount_pct = record.decimal_or("Expected_Discount__c", Decimal::ZERO);

        Self {
            id: SaleId::new(record.id()),
            customer_name: record.text_or("Name", ""),
            phone: record.text_or("Account.Phone", "N/A"),
            amount,
            expected_discount_pct,
            manager_comment: record.text_or("Manager_Comment__c", ""),
            approved_on: record.datetime_or_epoch("Approved_Date__c"),
            bill_number: record.text_or("Bill_Number__c", ""),
            billing_amount: Money::new(
                record.decimal_or("Billing_Amount__c", Decimal::ZERO),
                CurrencyCode::INR,
            ),
            final_price: final_price(amount, expected_discount_pct),
        }
    }

    fn record_id(&self) -> &str {
        self.id.as_str()
    }

    fn validate_input(_input: &Self::Input) -> Result<(), CrmError> {
        Err(CrmError::Validation(
            "approved sales are created by managers in the CRM".to_string(),
        ))
    }

    fn create_payload(_input: &Self::Input) -> Value {
        Value::Null
    }

    fn patch_payload(id: &str, patch: &Self::Patch) -> Value {
        let mut fields = serde_json::Map::new();
        if let Some(bill_number) = &patch.bill_number {
            fields.insert("Bill_Number__c".to_string(), json!(bill_number));
        }
        if let Some(billing_amount) = &patch.billing_amount {
            fields.insert("Billing_Amount__c".to_string(), json!(billing_amount.amount));
        }

        json!({ "Id": id, "fields": fields })
    }

    fn apply_patch(&mut self, patch: &Self::Patch) {
        if let Some(bill_number) = &patch.bill_number {
            self.bill_number.clone_from(bill_number);
        }
        if let Some(billing_amount) = &patch.billing_amount {
            self.billing_amount = *billing_amount;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_final_price_derivation() {
        // amount=100000 discount=10% -> 90000, rounded to a whole unit
        let price = final_price(
            Money::new(Decimal::from(100_000), CurrencyCode::INR),
            Decimal::from(10),
        );
        assert_eq!(price.amount, Decimal::from(90_000));
    }

    #[test]
    fn test_final_price_rounds_to_whole_unit() {
        // 134900 at 7% -> 125457 exactly; 99999 at 12.5% -> 87499.125 -> 87499
        let price = final_price(
            Money::new(Decimal::from(99_999), CurrencyCode::INR),
            Decimal::new(125, 1),
        );
        assert_eq!(price.amount, Decimal::from(87_499));
    }

    #[test]
    fn test_from_record_computes_final_price() {
        let record = RemoteRecord::from_value(json!({
            "Id": "0065g00000SaleABCD",
            "Name": "Rajesh Kumar",
            "Amount": 134900,
            "Expected_Discount__c": 10,
            "Approved_Date__c": "2024-07-15",
            "Account": { "Phone": "+91 9876543210" }
        }));

        let sale = ApprovedSale::from_record(&record);
        assert_eq!(sale.amount.amount, Decimal::from(134_900));
        assert_eq!(sale.final_price.amount, Decimal::from(121_410));
        assert_eq!(sale.phone, "+91 9876543210");
    }

    #[test]
    fn test_from_record_without_related_account() {
        let sale = ApprovedSale::from_record(&RemoteRecord::from_value(json!({
            "Id": "0065g00000SaleABCD",
            "Name": "Walk-in"
        })));

        assert_eq!(sale.phone, "N/A");
        assert_eq!(sale.amount, Money::zero());
        assert_eq!(sale.final_price, Money::zero());
        assert_eq!(sale.bill_number, "");
    }

    #[test]
    fn test_create_is_rejected_locally() {
        assert!(matches!(
            ApprovedSale::validate_input(&ApprovedSaleInput::default()),
            Err(CrmError::Validation(_))
        ));
    }

    #[test]
    fn test_billing_patch_payload() {
        let patch = ApprovedSalePatch {
            bill_number: Some("CLK-2024-0042".to_string()),
            billing_amount: Some(Money::new(Decimal::from(121_410), CurrencyCode::INR)),
        };
        let payload = ApprovedSale::patch_payload("0065g0", &patch);

        assert_eq!(payload["Id"], "0065g0");
        assert_eq!(payload["fields"]["Bill_Number__c"], "CLK-2024-0042");
        assert_eq!(payload["fields"]["Billing_Amount__c"], json!(Decimal::from(121_410)));
    }

    #[test]
    fn test_apply_patch_is_idempotent() {
        let mut sale = ApprovedSale::from_record(&RemoteRecord::from_value(json!({
            "Id": "0065g0", "Name": "Rajesh Kumar", "Amount": 124900
        })));
        let patch = ApprovedSalePatch {
            bill_number: Some("CLK-2024-0042".to_string()),
            billing_amount: Some(Money::new(Decimal::from(124_900), CurrencyCode::INR)),
        };

        sale.apply_patch(&patch);
        let once = sale.clone();
        sale.apply_patch(&patch);

        assert_eq!(sale, once);
        assert_eq!(sale.bill_number, "CLK-2024-0042");
    }
}
