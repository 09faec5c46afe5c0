//! Read-query construction against the remote object model.
//!
//! Queries are built centrally from a small typed predicate language rather
//! than by string concatenation at call sites, so field names cannot drift
//! from what the mappers understand and filter values cannot inject query
//! syntax. Construction is pure - the only failure mode is a programmer
//! error (unknown field, malformed name), reported before any I/O happens.

use crate::error::CrmError;

/// A fully-constructed read query, ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    soql: String,
}

impl QuerySpec {
    /// The query string sent to the CRM.
    #[must_use]
    pub fn as_soql(&self) -> &str {
        &self.soql
    }
}

/// A filter predicate: equality or non-null, AND-conjoined.
///
/// The remote object graph supports one related-object hop, so a predicate
/// field may name a relationship field (`Account.Phone`) as long as the
/// mapper declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Eq { field: String, value: String },
    NotNull { field: String },
}

/// An AND-conjunction of simple predicates.
///
/// # Example
///
/// ```
/// use celekt_crm::query::Filter;
///
/// let filter = Filter::new()
///     .eq("Status", "New")
///     .not_null("Phone");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    /// An empty filter (matches everything).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Require `field = value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    /// Require `field != null`.
    #[must_use]
    pub fn not_null(mut self, field: impl Into<String>) -> Self {
        self.predicates.push(Predicate::NotNull {
            field: field.into(),
        });
        self
    }

    /// Whether the filter has no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

/// Build a list query: `SELECT <fields> FROM <object> [WHERE <conjunction>]`.
///
/// `fields` is the mapper's declared field list for the entity; every filter
/// predicate must name one of them.
///
/// # Errors
///
/// Returns `CrmError::Query` if a predicate names a field the mapper does
/// not declare, or if a field name contains anything but identifier
/// characters and at most one relationship dot.
pub fn build_list_query(
    object: &str,
    fields: &[&str],
    filter: &Filter,
) -> Result<QuerySpec, CrmError> {
    for field in fields {
        validate_field_name(field)?;
    }

    let mut soql = format!("SELECT {} FROM {object}", fields.join(", "));

    if !filter.is_empty() {
        let clauses = filter
            .predicates
            .iter()
            .map(|predicate| render_predicate(predicate, fields))
            .collect::<Result<Vec<_>, _>>()?;
        soql.push_str(" WHERE ");
        soql.push_str(&clauses.join(" AND "));
    }

    Ok(QuerySpec { soql })
}

/// Build a single-record query: `SELECT <fields> FROM <object> WHERE Id = '<id>'`.
///
/// # Errors
///
/// Returns `CrmError::Query` on a malformed field list or an empty ID.
pub fn build_by_id_query(object: &str, fields: &[&str], id: &str) -> Result<QuerySpec, CrmError> {
    if id.trim().is_empty() {
        return Err(CrmError::Query("record id cannot be empty".to_string()));
    }

    for field in fields {
        validate_field_name(field)?;
    }

    let soql = format!(
        "SELECT {} FROM {object} WHERE Id = '{}'",
        fields.join(", "),
        escape_literal(id)
    );

    Ok(QuerySpec { soql })
}

fn render_predicate(predicate: &Predicate, known_fields: &[&str]) -> Result<String, CrmError> {
    match predicate {
        Predicate::Eq { field, value } => {
            validate_filter_field(field, known_fields)?;
            Ok(format!("{field} = '{}'", escape_literal(value)))
        }
        Predicate::NotNull { field } => {
            validate_filter_field(field, known_fields)?;
            Ok(format!("{field} != null"))
        }
    }
}

/// A filter field must be one the entity's mapper declares.
fn validate_filter_field(field: &str, known_fields: &[&str]) -> Result<(), CrmError> {
    if !known_fields.contains(&field) {
        return Err(CrmError::Query(format!(
            "unknown field '{field}' (not declared by the entity mapper)"
        )));
    }
    Ok(())
}

/// Field names are identifiers with at most one relationship dot.
fn validate_field_name(field: &str) -> Result<(), CrmError> {
    let well_formed = !field.is_empty()
        && field.matches('.').count() <= 1
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && !field.starts_with('.')
        && !field.ends_with('.');

    if well_formed {
        Ok(())
    } else {
        Err(CrmError::Query(format!("malformed field name '{field}'")))
    }
}

/// Escape a string literal for embedding in a query.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const FIELDS: &[&str] = &["Id", "FirstName", "Status", "Account.Phone"];

    #[test]
    fn test_plain_list_query() {
        let spec = build_list_query("Lead", FIELDS, &Filter::new()).unwrap();
        assert_eq!(
            spec.as_soql(),
            "SELECT Id, FirstName, Status, Account.Phone FROM Lead"
        );
    }

    #[test]
    fn test_conjunction_rendering() {
        let filter = Filter::new().eq("Status", "New").not_null("Account.Phone");
        let spec = build_list_query("Lead", FIELDS, &filter).unwrap();
        assert_eq!(
            spec.as_soql(),
            "SELECT Id, FirstName, Status, Account.Phone FROM Lead \
             WHERE Status = 'New' AND Account.Phone != null"
        );
    }

    #[test]
    fn test_unknown_filter_field_is_rejected() {
        let filter = Filter::new().eq("Email", "x@example.com");
        let result = build_list_query("Lead", FIELDS, &filter);
        assert!(matches!(result, Err(CrmError::Query(_))));
    }

    #[test]
    fn test_literal_escaping() {
        let filter = Filter::new().eq("FirstName", "O'Brien \\ Co");
        let spec = build_list_query("Lead", FIELDS, &filter).unwrap();
        assert!(spec.as_soql().contains(r"FirstName = 'O\'Brien \\ Co'"));
    }

    #[test]
    fn test_by_id_query() {
        let spec = build_by_id_query("Lead", FIELDS, "00Q5g00000AbCdEFGH").unwrap();
        assert_eq!(
            spec.as_soql(),
            "SELECT Id, FirstName, Status, Account.Phone FROM Lead \
             WHERE Id = '00Q5g00000AbCdEFGH'"
        );
    }

    #[test]
    fn test_empty_id_is_rejected() {
        assert!(matches!(
            build_by_id_query("Lead", FIELDS, "  "),
            Err(CrmError::Query(_))
        ));
    }

    #[test]
    fn test_malformed_field_names_are_rejected() {
        for bad in ["", "A.B.C", "Name; DROP", ".Phone", "Phone."] {
            assert!(
                matches!(validate_field_name(bad), Err(CrmError::Query(_))),
                "expected rejection for {bad:?}"
            );
        }
        assert!(validate_field_name("Lead__r.Product_Interest__c").is_ok());
    }
}
