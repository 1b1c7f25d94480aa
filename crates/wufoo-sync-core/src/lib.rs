//! wufoo-sync core - push local records to Wufoo forms
//!
//! When a record is saved, its field values are submitted as an entry of a
//! Wufoo form, and any per-field validation errors the service returns are
//! mapped back onto the record's own field names.
//!
//! # Main Components
//!
//! - **Field Reconciler**: builds the form's `title → id` map, resolves local
//!   field names against it (exact, humanized, `"{field} {value}"`), and
//!   translates remote error ids back to local names
//! - **Inflector**: the name transformations the reconciler matches with
//! - **Remote client**: the [`FormClient`] contract and the reqwest-backed
//!   [`WufooClient`]
//! - **Save flow**: [`EntrySync`], the save hook tying the pieces together
//!
//! # Example
//!
//! ```
//! use wufoo_sync_core::{FieldReconciler, FormFieldDescriptor, RecordData, Subfield};
//! use serde_json::json;
//!
//! let reconciler = FieldReconciler::new();
//! let titles = reconciler.build_title_map(&[
//!     FormFieldDescriptor::new("Receipt No", "Field5"),
//!     FormFieldDescriptor::with_subfields(
//!         "Name",
//!         vec![Subfield::new("First", "Field1"), Subfield::new("Last", "Field2")],
//!     ),
//! ]);
//!
//! let mut record = RecordData::new();
//! record.insert("receipt_no".to_string(), json!("R-100"));
//! record.insert("Name First".to_string(), json!("Jo"));
//!
//! let payload = reconciler.build_outgoing_payload(&record, &titles);
//! assert_eq!(payload.get("Field5"), Some(&json!("R-100")));
//! assert_eq!(payload.get("Field1"), Some(&json!("Jo")));
//! ```

pub mod entry;
pub mod error;
pub mod http;
pub mod inflector;
pub mod reconciler;
pub mod remote;
pub mod response;
pub mod types;

// Re-export main types for convenience
pub use entry::{EntrySettings, EntrySync, MemoryRecord, Record, SaveOutcome, SaveReport};
pub use error::{Error, Result};
pub use http::{WufooAuth, WufooClient, WufooClientConfig};
pub use reconciler::{
    build_outgoing_payload, build_title_map, translate_errors, FieldMatch, FieldReconciler,
    MatchKind, Reconciliation,
};
pub use remote::FormClient;
pub use response::{parse_entry_response, parse_fields_response, EntryResponse, Rejection};
pub use types::{
    form_value, FieldError, FormFieldDescriptor, OutgoingPayload, RecordData, Subfield, TitleMap,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
