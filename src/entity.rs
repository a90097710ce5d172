//! Types stored as documents.
//!
//! Field mapping is plain `serde`: whatever an entity serializes to is the
//! stored document. The id lives in the `_id` field:
//!
//! ```rust
//! use filterql::Entity;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! struct Customer {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     id: Option<String>,
//!     name: String,
//! }
//!
//! impl Entity for Customer {
//!     fn id(&self) -> Option<&str> {
//!         self.id.as_deref()
//!     }
//!
//!     fn set_id(&mut self, id: String) {
//!         self.id = Some(id);
//!     }
//! }
//!
//! assert_eq!(Customer::collection_name(), "Customer");
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{DbError, DbResult};

pub trait Entity: Serialize + DeserializeOwned {
    /// Collection holding this type. Defaults to the type's short name.
    fn collection_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Store-assigned id, `None` until first saved.
    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    fn to_document(&self) -> DbResult<Value> {
        let document = serde_json::to_value(self)?;
        if !document.is_object() {
            return Err(DbError::InvalidDocument(format!(
                "{} does not serialize to an object",
                Self::collection_name()
            )));
        }
        Ok(document)
    }

    fn from_document(document: Value) -> DbResult<Self> {
        Ok(serde_json::from_value(document)?)
    }
}

/// `my_app::models::Customer` -> `Customer`, generics kept.
fn short_type_name(full: &str) -> String {
    let base = full.split('<').next().unwrap_or(full);
    let short = base.rsplit("::").next().unwrap_or(base);
    format!("{}{}", short, &full[base.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Invoice {
        #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        total: f64,
    }

    impl Entity for Invoice {
        fn id(&self) -> Option<&str> {
            self.id.as_deref()
        }

        fn set_id(&mut self, id: String) {
            self.id = Some(id);
        }
    }

    #[derive(Serialize, Deserialize)]
    struct Renamed(u8);

    impl Entity for Renamed {
        fn collection_name() -> String {
            "renamed_things".to_string()
        }

        fn id(&self) -> Option<&str> {
            None
        }

        fn set_id(&mut self, _id: String) {}
    }

    #[test]
    fn test_default_collection_name() {
        assert_eq!(Invoice::collection_name(), "Invoice");
        assert_eq!(Renamed::collection_name(), "renamed_things");
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name("a::b::Customer"), "Customer");
        assert_eq!(short_type_name("Customer"), "Customer");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper<b::Inner>");
    }

    #[test]
    fn test_document_round_trip_uses_id_field() {
        let mut invoice = Invoice {
            id: None,
            total: 12.5,
        };
        assert_eq!(invoice.to_document().unwrap(), serde_json::json!({"total": 12.5}));

        invoice.set_id("inv-1".to_string());
        let document = invoice.to_document().unwrap();
        assert_eq!(document["_id"], "inv-1");

        let back = Invoice::from_document(document).unwrap();
        assert_eq!(back.id(), Some("inv-1"));
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            Renamed(3).to_document(),
            Err(DbError::InvalidDocument(_))
        ));
    }
}
