//! Entry submission on record save
//!
//! [`EntrySync`] is the save hook: given a record about to be saved, it
//! looks up the form configured for the record's model, reconciles the
//! record's fields against the form, submits the entry and, if the service
//! rejects it, marks the offending local fields invalid on the record.
//!
//! ```no_run
//! use wufoo_sync_core::{EntrySettings, EntrySync, FieldReconciler, MemoryRecord, WufooClient};
//! use serde_json::json;
//!
//! # async fn example() -> wufoo_sync_core::Result<()> {
//! let sync = EntrySync::new(WufooClient::from_env()?, FieldReconciler::new())
//!     .with_model("Member", EntrySettings::new("s1afea8b1vk0jf7"));
//!
//! let mut member = MemoryRecord::new("Member")
//!     .with_field("receipt_no", json!("R-100"))
//!     .with_field("email", json!("jo@example.com"));
//!
//! if !sync.before_save(&mut member, true).await?.is_saved() {
//!     for (field, message) in member.validation_errors() {
//!         eprintln!("{}: {}", field, message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::reconciler::{FieldReconciler, Reconciliation};
use crate::remote::FormClient;
use crate::response::EntryResponse;
use crate::types::{RecordData, TitleMap};
use crate::{Error, Result};

/// Per-model settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntrySettings {
    /// Form hash or title slug entries are submitted to
    pub form: String,
}

impl EntrySettings {
    pub fn new(form: impl Into<String>) -> Self {
        Self { form: form.into() }
    }

    /// Overlay `other` on these settings; every value in `other` wins
    pub fn merge(&mut self, other: EntrySettings) {
        self.form = other.form;
    }
}

/// What the host framework has to offer for a record being saved
pub trait Record {
    /// Model name the settings are registered under
    fn alias(&self) -> &str;

    /// Field values about to be saved
    fn data(&self) -> &RecordData;

    /// Mark a local field as invalid
    fn invalidate(&mut self, field: &str, message: &str);
}

/// A record held entirely in memory
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub alias: String,
    pub data: RecordData,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub validation_errors: IndexMap<String, String>,
}

impl MemoryRecord {
    pub fn new(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            ..Default::default()
        }
    }

    /// Record for `alias` holding `data`
    pub fn from_data(alias: impl Into<String>, data: RecordData) -> Self {
        Self {
            alias: alias.into(),
            data,
            validation_errors: IndexMap::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>, value: Value) -> Self {
        self.data.insert(field.into(), value);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_empty()
    }

    pub fn validation_errors(&self) -> &IndexMap<String, String> {
        &self.validation_errors
    }
}

impl Record for MemoryRecord {
    fn alias(&self) -> &str {
        &self.alias
    }

    fn data(&self) -> &RecordData {
        &self.data
    }

    fn invalidate(&mut self, field: &str, message: &str) {
        self.validation_errors
            .insert(field.to_string(), message.to_string());
    }
}

/// Final state of a save: the entry is either stored or refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved {
        entry_id: u64,
    },
    Rejected {
        /// Local fields invalidated on the record
        invalid_fields: BTreeSet<String>,
        /// Form-level error text, when the service sends one
        #[serde(skip_serializing_if = "Option::is_none")]
        error_text: Option<String>,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// A save outcome together with how the record was mapped onto the form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveReport {
    pub form: String,
    pub outcome: SaveOutcome,
    pub reconciliation: Reconciliation,
}

/// Submits records to their configured form when they are saved
pub struct EntrySync<C> {
    client: C,
    reconciler: FieldReconciler,
    settings: HashMap<String, EntrySettings>,
}

impl<C: FormClient> EntrySync<C> {
    /// Create a save hook with no models configured
    pub fn new(client: C, reconciler: FieldReconciler) -> Self {
        Self {
            client,
            reconciler,
            settings: HashMap::new(),
        }
    }

    /// Register or update the settings for a model
    ///
    /// Settings start from the defaults (no form) and `settings` is merged
    /// over whatever is already registered for `alias`.
    pub fn setup(&mut self, alias: impl Into<String>, settings: EntrySettings) {
        self.settings
            .entry(alias.into())
            .or_default()
            .merge(settings);
    }

    /// Builder form of [`setup`](Self::setup)
    pub fn with_model(mut self, alias: impl Into<String>, settings: EntrySettings) -> Self {
        self.setup(alias, settings);
        self
    }

    pub fn settings(&self, alias: &str) -> Option<&EntrySettings> {
        self.settings.get(alias)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn reconciler(&self) -> &FieldReconciler {
        &self.reconciler
    }

    /// The form configured for `alias`
    pub fn form_for(&self, alias: &str) -> Result<&str> {
        match self.settings.get(alias) {
            Some(settings) if !settings.form.trim().is_empty() => Ok(settings.form.as_str()),
            Some(_) => Err(Error::configuration(format!(
                "Model '{}' has no form configured",
                alias
            ))),
            None => Err(Error::configuration(format!(
                "Model '{}' is not set up for form submission",
                alias
            ))),
        }
    }

    /// Fetch the form's fields and build its `title → id` map
    pub async fn fields_map(&self, form: &str) -> Result<TitleMap> {
        let descriptors = self.client.find_fields(form).await?;
        Ok(self.reconciler.build_title_map(&descriptors))
    }

    /// Save hook: submit the record to its model's form
    ///
    /// `created` tells an insert from an update. The service has no notion of
    /// updating an entry, so both submit a new one.
    #[instrument(skip(self, record), fields(model = %record.alias()))]
    pub async fn before_save<R: Record + ?Sized>(
        &self,
        record: &mut R,
        created: bool,
    ) -> Result<SaveOutcome> {
        let form = self.form_for(record.alias())?.to_string();
        debug!(form = %form, created, "Submitting record on save");

        let report = self.save_to_form(&form, record).await?;
        Ok(report.outcome)
    }

    /// Submit the record to an explicit form
    #[instrument(skip(self, record), fields(model = %record.alias()))]
    pub async fn save_to_form<R: Record + ?Sized>(&self, form: &str, record: &mut R) -> Result<SaveReport> {
        let titles = self.fields_map(form).await?;
        let reconciliation = self.reconciler.reconcile(record.data(), &titles);

        if !reconciliation.dropped.is_empty() {
            debug!(
                dropped = ?reconciliation.dropped,
                "Record fields without a matching form field were not submitted"
            );
        }

        let outcome = match self.client.save_entry(form, &reconciliation.payload).await? {
            EntryResponse::Saved { entry_id, .. } => {
                info!(form = %form, entry_id, "Entry saved");
                SaveOutcome::Saved { entry_id }
            }
            EntryResponse::Rejected(rejection) => {
                let resolved = self.reconciler.resolve_errors(&rejection.field_errors, &titles);
                let mut invalid_fields = BTreeSet::new();

                for (field, error) in resolved {
                    record.invalidate(&field, &error.message);
                    invalid_fields.insert(field);
                }

                warn!(
                    form = %form,
                    errors = rejection.field_errors.len(),
                    invalid = ?invalid_fields,
                    "Entry rejected"
                );
                SaveOutcome::Rejected {
                    invalid_fields,
                    error_text: rejection.error_text,
                }
            }
        };

        Ok(SaveReport {
            form: form.to_string(),
            outcome,
            reconciliation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Rejection;
    use crate::types::{FieldError, FormFieldDescriptor, OutgoingPayload};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubClient {
        fields: Vec<FormFieldDescriptor>,
        response: EntryResponse,
        submitted: Mutex<Vec<(String, OutgoingPayload)>>,
    }

    impl StubClient {
        fn new(response: EntryResponse) -> Self {
            Self {
                fields: vec![
                    FormFieldDescriptor::new("Receipt No", "5"),
                    FormFieldDescriptor::new("Email", "6"),
                ],
                response,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl FormClient for StubClient {
        async fn find_fields(&self, _form: &str) -> Result<Vec<FormFieldDescriptor>> {
            Ok(self.fields.clone())
        }

        async fn save_entry(&self, form: &str, payload: &OutgoingPayload) -> Result<EntryResponse> {
            self.submitted
                .lock()
                .unwrap()
                .push((form.to_string(), payload.clone()));
            Ok(self.response.clone())
        }
    }

    fn member() -> MemoryRecord {
        MemoryRecord::new("Member")
            .with_field("receipt_no", json!("R-1"))
            .with_field("email", json!("not-an-email"))
            .with_field("password", json!("hunter2"))
    }

    #[test]
    fn test_settings_merge() {
        let mut settings = EntrySettings::default();
        settings.merge(EntrySettings::new("abc"));
        assert_eq!(settings.form, "abc");

        settings.merge(EntrySettings::new("def"));
        assert_eq!(settings.form, "def");

        settings.merge(EntrySettings::default());
        assert_eq!(settings.form, "");
    }

    #[test]
    fn test_form_for_unconfigured_model() {
        let sync = EntrySync::new(
            StubClient::new(EntryResponse::Saved { entry_id: 1, entry_link: None }),
            FieldReconciler::new(),
        )
        .with_model("Blank", EntrySettings::default());

        assert!(matches!(sync.form_for("Member"), Err(Error::Configuration { .. })));
        assert!(matches!(sync.form_for("Blank"), Err(Error::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_before_save_success() {
        let sync = EntrySync::new(
            StubClient::new(EntryResponse::Saved { entry_id: 99, entry_link: None }),
            FieldReconciler::new(),
        )
        .with_model("Member", EntrySettings::new("member-form"));

        let mut record = member();
        let outcome = sync.before_save(&mut record, true).await.unwrap();

        assert_eq!(outcome, SaveOutcome::Saved { entry_id: 99 });
        assert!(record.is_valid());

        let submitted = sync.client().submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].0, "member-form");
        assert_eq!(submitted[0].1.get("5"), Some(&json!("R-1")));
        assert_eq!(submitted[0].1.get("6"), Some(&json!("not-an-email")));
        assert_eq!(submitted[0].1.len(), 2);
    }

    #[tokio::test]
    async fn test_before_save_rejection_invalidates_fields() {
        let rejection = Rejection {
            error_text: Some("Errors have been highlighted below.".to_string()),
            field_errors: vec![
                FieldError::new("6", "Please enter a valid email address."),
                FieldError::new("42", "Unknown field"),
            ],
        };
        let sync = EntrySync::new(
            StubClient::new(EntryResponse::Rejected(rejection)),
            FieldReconciler::new(),
        )
        .with_model("Member", EntrySettings::new("member-form"));

        let mut record = member();
        let outcome = sync.before_save(&mut record, false).await.unwrap();

        match outcome {
            SaveOutcome::Rejected {
                invalid_fields,
                error_text,
            } => {
                assert_eq!(invalid_fields.into_iter().collect::<Vec<_>>(), vec!["email"]);
                assert!(error_text.is_some());
            }
            other => panic!("expected rejection, got {:?}", other),
        }
        assert_eq!(
            record.validation_errors().get("email").map(String::as_str),
            Some("Please enter a valid email address.")
        );
        assert_eq!(record.validation_errors().len(), 1);
    }

    #[tokio::test]
    async fn test_save_to_form_reports_dropped_fields() {
        let sync = EntrySync::new(
            StubClient::new(EntryResponse::Saved { entry_id: 3, entry_link: None }),
            FieldReconciler::new(),
        );

        let mut record = member();
        let report = sync.save_to_form("adhoc", &mut record).await.unwrap();

        assert_eq!(report.form, "adhoc");
        assert_eq!(report.reconciliation.dropped, vec!["password".to_string()]);
        assert!(report.outcome.is_saved());
    }

    #[tokio::test]
    async fn test_before_save_without_settings_is_error() {
        let sync = EntrySync::new(
            StubClient::new(EntryResponse::Saved { entry_id: 3, entry_link: None }),
            FieldReconciler::new(),
        );

        let mut record = member();
        let err = sync.before_save(&mut record, true).await.unwrap_err();
        assert!(err.to_string().contains("Member"));
        assert!(sync.client().submitted.lock().unwrap().is_empty());
    }
}
