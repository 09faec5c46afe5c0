//! Raw record shapes returned by the CRM.
//!
//! A [`RemoteRecord`] is an untyped, nested key/value structure whose fields
//! vary per entity and may be absent or null. Records are owned transiently
//! by the transport and handed to the mappers, which must never fail on a
//! surprising shape - every accessor here is total and falls back to `None`
//! for missing, null, or mistyped values.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

/// A raw CRM record.
#[derive(Debug, Clone, Default)]
pub struct RemoteRecord(serde_json::Map<String, Value>);

impl RemoteRecord {
    /// Wrap a JSON value. Anything other than an object becomes an empty
    /// record, which maps to an all-defaults entity downstream.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// The record's `Id` field, or `""` when absent.
    #[must_use]
    pub fn id(&self) -> &str {
        self.text("Id").unwrap_or("")
    }

    /// Look up a field, following at most one relationship hop
    /// (`Account.Phone` reads the `Phone` field of the nested `Account`
    /// object).
    fn raw(&self, field: &str) -> Option<&Value> {
        let value = match field.split_once('.') {
            Some((relation, nested)) => self.0.get(relation)?.as_object()?.get(nested)?,
            None => self.0.get(field)?,
        };

        if value.is_null() { None } else { Some(value) }
    }

    /// A non-null string field.
    #[must_use]
    pub fn text(&self, field: &str) -> Option<&str> {
        self.raw(field)?.as_str()
    }

    /// A string field with a default for missing/null/mistyped values.
    #[must_use]
    pub fn text_or(&self, field: &str, default: &str) -> String {
        self.text(field).unwrap_or(default).to_string()
    }

    /// A numeric field as a decimal. Accepts JSON numbers and numeric
    /// strings; parses via the string form so float representation never
    /// corrupts currency amounts.
    #[must_use]
    pub fn decimal(&self, field: &str) -> Option<Decimal> {
        match self.raw(field)? {
            Value::Number(n) => n.to_string().parse().ok(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// A decimal field with a default.
    #[must_use]
    pub fn decimal_or(&self, field: &str, default: Decimal) -> Decimal {
        self.decimal(field).unwrap_or(default)
    }

    /// A timestamp field. Accepts RFC 3339, the CRM's compact offset form
    /// (`2024-01-15T14:00:00.000+0000`), and bare dates (midnight UTC).
    #[must_use]
    pub fn datetime(&self, field: &str) -> Option<DateTime<Utc>> {
        let text = self.text(field)?;

        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(parsed) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
            return Some(parsed.with_timezone(&Utc));
        }
        if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
        }

        None
    }

    /// A timestamp field defaulting to the Unix epoch, the documented
    /// default for missing remote timestamps.
    #[must_use]
    pub fn datetime_or_epoch(&self, field: &str) -> DateTime<Utc> {
        self.datetime(field).unwrap_or(DateTime::UNIX_EPOCH)
    }
}
