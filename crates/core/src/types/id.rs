//! Newtype IDs for type-safe record references.
//!
//! Use the `define_record_id!` macro to create type-safe ID wrappers that
//! prevent accidentally mixing IDs from different CRM record types.

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe CRM record ID wrapper.
///
/// CRM record IDs are opaque strings (15 or 18 characters in practice, but
/// nothing here depends on that). Creates a newtype wrapper around `String`
/// with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `as_str()`
/// - `From<String>` and `From<&str>` implementations
///
/// # Example
///
/// ```rust
/// # use celekt_core::define_record_id;
/// define_record_id!(LeadId);
/// define_record_id!(CaseId);
///
/// let lead_id = LeadId::new("00Q5g00000AbCdEFGH");
///
/// // These are different types, so this won't compile:
/// // let _: CaseId = lead_id;
/// ```
#[macro_export]
macro_rules! define_record_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            Default,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying ID string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID is empty (a defaulted, never-synced record).
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard record IDs
define_record_id!(LeadId);
define_record_id!(CaseId);
define_record_id!(DemoId);
define_record_id!(SaleId);
define_record_id!(StoreId);

/// A generic record ID for call sites that are not entity-specific.
///
/// Prefer using specific ID types like `LeadId`, `CaseId`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new record ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the underlying ID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}
