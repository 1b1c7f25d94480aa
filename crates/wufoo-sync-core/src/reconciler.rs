//! Field reconciliation between local records and a remote form
//!
//! The remote form only knows its fields by title and opaque id. The
//! reconciler builds a `title → id` map from the form's descriptors, resolves
//! each local field against it and, when the service rejects an entry, walks
//! the map backwards to find which local fields the errors belong to.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::inflector;
use crate::types::{form_value, FieldError, FormFieldDescriptor, OutgoingPayload, RecordData, TitleMap};

/// Which strategy resolved a local field to a remote title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// The local field name is itself a remote title
    Exact,
    /// The humanized field name (`receipt_no` → `Receipt No`) is a remote title
    Humanized,
    /// `"{field} {value}"` is a remote title
    ///
    /// Covers checkbox-style compound fields, where each choice is a subfield
    /// titled `"{Field} {Choice}"` and the record stores the chosen label.
    Composite,
}

/// Produces the candidate title for a local field, if the strategy applies
type CandidateFn = fn(&str, &Value) -> Option<String>;

fn exact_candidate(field: &str, _value: &Value) -> Option<String> {
    Some(field.to_string())
}

fn humanized_candidate(field: &str, _value: &Value) -> Option<String> {
    Some(inflector::title_for_field_name(field))
}

fn composite_candidate(field: &str, value: &Value) -> Option<String> {
    match value {
        Value::Array(_) | Value::Object(_) => None,
        scalar => Some(format!("{} {}", field, form_value(scalar))),
    }
}

/// Matching strategies, tried in order; the first hit wins
const STRATEGIES: [(MatchKind, CandidateFn); 3] = [
    (MatchKind::Exact, exact_candidate),
    (MatchKind::Humanized, humanized_candidate),
    (MatchKind::Composite, composite_candidate),
];

/// A local field that resolved to a remote id
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FieldMatch {
    pub field: String,
    pub title: String,
    pub remote_id: String,
    pub kind: MatchKind,
}

/// Outcome of resolving a whole record against a title map
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct Reconciliation {
    /// Values keyed by remote id
    pub payload: OutgoingPayload,
    /// How each submitted field was matched, in record order
    pub matches: Vec<FieldMatch>,
    /// Local fields no strategy could place; they are not submitted
    pub dropped: Vec<String>,
}

/// Resolves local field names to remote field ids and back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldReconciler {
    composite_match: bool,
}

impl Default for FieldReconciler {
    fn default() -> Self {
        Self {
            composite_match: true,
        }
    }
}

impl FieldReconciler {
    /// Reconciler with all three matching strategies enabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the `"{field} {value}"` fallback
    pub fn with_composite_match(mut self, enabled: bool) -> Self {
        self.composite_match = enabled;
        self
    }

    pub fn composite_match(&self) -> bool {
        self.composite_match
    }

    /// Build the `title → id` map for a form
    ///
    /// Plain fields contribute `title → id`. Compound fields contribute one
    /// entry per subfield, keyed `"{title} {label}"`; the compound field's own
    /// id is not mapped.
    pub fn build_title_map(&self, descriptors: &[FormFieldDescriptor]) -> TitleMap {
        let mut map = TitleMap::new();

        for descriptor in descriptors {
            match &descriptor.subfields {
                None => insert_title(&mut map, descriptor.title.clone(), &descriptor.id),
                Some(subfields) => {
                    for subfield in subfields {
                        let title = format!("{} {}", descriptor.title, subfield.label);
                        insert_title(&mut map, title, &subfield.id);
                    }
                }
            }
        }

        map
    }

    /// Resolve the remote title and id for one local field
    pub fn resolve(&self, field: &str, value: &Value, titles: &TitleMap) -> Option<FieldMatch> {
        STRATEGIES
            .iter()
            .filter(|(kind, _)| self.composite_match || *kind != MatchKind::Composite)
            .find_map(|(kind, candidate)| {
                let title = candidate(field, value)?;
                let remote_id = titles.get(&title)?.to_string();
                Some(FieldMatch {
                    field: field.to_string(),
                    title,
                    remote_id,
                    kind: *kind,
                })
            })
    }

    /// Resolve every record field, keeping track of what was dropped
    pub fn reconcile(&self, record: &RecordData, titles: &TitleMap) -> Reconciliation {
        let mut result = Reconciliation::default();

        for (field, value) in record {
            match self.resolve(field, value, titles) {
                Some(found) => {
                    trace!(
                        field = %found.field,
                        remote_id = %found.remote_id,
                        kind = ?found.kind,
                        "Matched record field"
                    );
                    result.payload.insert(found.remote_id.clone(), value.clone());
                    result.matches.push(found);
                }
                None => {
                    debug!(field = %field, "No remote field matches record field; not submitted");
                    result.dropped.push(field.clone());
                }
            }
        }

        result
    }

    /// Build the values to submit, keyed by remote id
    ///
    /// Fields that match no remote title are left out without error.
    pub fn build_outgoing_payload(&self, record: &RecordData, titles: &TitleMap) -> OutgoingPayload {
        self.reconcile(record, titles).payload
    }

    /// Map remote field errors to local field names
    ///
    /// Each returned pair holds the local field name and the error that
    /// rejected it. Errors on ids the map does not know are skipped.
    pub fn resolve_errors<'e>(
        &self,
        errors: &'e [FieldError],
        titles: &TitleMap,
    ) -> Vec<(String, &'e FieldError)> {
        let by_id = titles.invert();

        errors
            .iter()
            .filter_map(|error| match by_id.get(error.id.as_str()) {
                Some(title) => Some((inflector::field_name_for_title(title), error)),
                None => {
                    warn!(
                        remote_id = %error.id,
                        message = %error.message,
                        "Remote field error does not map to any known field"
                    );
                    None
                }
            })
            .collect()
    }

    /// The set of local field names the remote errors point at
    pub fn translate_errors(&self, errors: &[FieldError], titles: &TitleMap) -> BTreeSet<String> {
        self.resolve_errors(errors, titles)
            .into_iter()
            .map(|(field, _)| field)
            .collect()
    }
}

fn insert_title(map: &mut TitleMap, title: String, id: &str) {
    if let Some(previous) = map.insert(title.clone(), id) {
        if previous != id {
            debug!(title = %title, previous = %previous, id = %id, "Duplicate remote title; later field wins");
        }
    }
}

/// [`FieldReconciler::build_title_map`] with the default reconciler
pub fn build_title_map(descriptors: &[FormFieldDescriptor]) -> TitleMap {
    FieldReconciler::default().build_title_map(descriptors)
}

/// [`FieldReconciler::build_outgoing_payload`] with the default reconciler
pub fn build_outgoing_payload(record: &RecordData, titles: &TitleMap) -> OutgoingPayload {
    FieldReconciler::default().build_outgoing_payload(record, titles)
}

/// [`FieldReconciler::translate_errors`] with the default reconciler
pub fn translate_errors(errors: &[FieldError], titles: &TitleMap) -> BTreeSet<String> {
    FieldReconciler::default().translate_errors(errors, titles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subfield;
    use serde_json::json;

    fn record(pairs: &[(&str, Value)]) -> RecordData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn sample_descriptors() -> Vec<FormFieldDescriptor> {
        vec![
            FormFieldDescriptor::new("Receipt No", "5"),
            FormFieldDescriptor::with_subfields(
                "Name",
                vec![Subfield::new("First", "3"), Subfield::new("Last", "4")],
            ),
            FormFieldDescriptor::new("email", "6"),
            FormFieldDescriptor::with_subfields(
                "colour",
                vec![Subfield::new("Red", "10"), Subfield::new("Blue", "11")],
            ),
        ]
    }

    #[test]
    fn test_build_title_map_plain_and_subfields() {
        let map = build_title_map(&sample_descriptors());

        assert_eq!(map.get("Receipt No"), Some("5"));
        assert_eq!(map.get("Name First"), Some("3"));
        assert_eq!(map.get("Name Last"), Some("4"));
        assert!(!map.contains_title("Name"));
        assert_eq!(map.len(), 6);
    }

    #[test]
    fn test_build_title_map_empty() {
        assert!(build_title_map(&[]).is_empty());
    }

    #[test]
    fn test_build_title_map_later_duplicate_wins() {
        let descriptors = vec![
            FormFieldDescriptor::new("Email", "Field1"),
            FormFieldDescriptor::new("Phone", "Field2"),
            FormFieldDescriptor::new("Email", "Field3"),
        ];

        let first = build_title_map(&descriptors);
        let second = build_title_map(&descriptors);

        assert_eq!(first, second);
        assert_eq!(first.get("Email"), Some("Field3"));
    }

    #[test]
    fn test_humanized_match() {
        let titles = build_title_map(&sample_descriptors());
        let payload = build_outgoing_payload(&record(&[("receipt_no", json!("R-100"))]), &titles);

        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("5"), Some(&json!("R-100")));
    }

    #[test]
    fn test_exact_match_preferred() {
        let titles: TitleMap = [("receipt_no", "1"), ("Receipt No", "2")].into_iter().collect();
        let found = FieldReconciler::new()
            .resolve("receipt_no", &json!("x"), &titles)
            .unwrap();

        assert_eq!(found.kind, MatchKind::Exact);
        assert_eq!(found.remote_id, "1");
    }

    #[test]
    fn test_composite_match() {
        let titles = build_title_map(&sample_descriptors());
        let found = FieldReconciler::new()
            .resolve("colour", &json!("Blue"), &titles)
            .unwrap();

        assert_eq!(found.kind, MatchKind::Composite);
        assert_eq!(found.title, "colour Blue");
        assert_eq!(found.remote_id, "11");
    }

    #[test]
    fn test_composite_match_can_be_disabled() {
        let titles = build_title_map(&sample_descriptors());
        let reconciler = FieldReconciler::new().with_composite_match(false);

        assert!(reconciler.resolve("colour", &json!("Blue"), &titles).is_none());
    }

    #[test]
    fn test_unmatched_fields_are_dropped() {
        let titles = build_title_map(&sample_descriptors());
        let data = record(&[
            ("email", json!("a@example.com")),
            ("password", json!("secret")),
            ("id", json!(12)),
        ]);

        let result = FieldReconciler::new().reconcile(&data, &titles);

        assert_eq!(result.payload.len(), 1);
        assert_eq!(result.payload.get("6"), Some(&json!("a@example.com")));
        assert_eq!(result.dropped, vec!["password".to_string(), "id".to_string()]);
        assert!(!result.payload.values().any(|v| v == &json!("secret")));
    }

    #[test]
    fn test_translate_errors() {
        let titles: TitleMap = [("Receipt No", "5"), ("Name First", "3")].into_iter().collect();
        let errors = vec![
            FieldError::new("5", "This field is required."),
            FieldError::new("3", "Too long."),
        ];

        let fields = translate_errors(&errors, &titles);

        assert_eq!(
            fields.into_iter().collect::<Vec<_>>(),
            vec!["name_first".to_string(), "receipt_no".to_string()]
        );
    }

    #[test]
    fn test_translate_errors_shared_id_uses_later_title() {
        let titles: TitleMap = [("Old Title", "5"), ("New Title", "5")].into_iter().collect();

        let fields = translate_errors(&[FieldError::new("5", "x")], &titles);

        assert_eq!(fields, BTreeSet::from(["new_title".to_string()]));
    }

    #[test]
    fn test_composite_match_whole_float() {
        let titles: TitleMap = [("qty 1", "20")].into_iter().collect();
        let data = record(&[("qty", json!(1.0))]);

        let result = FieldReconciler::new().reconcile(&data, &titles);

        assert_eq!(result.payload.get("20"), Some(&json!(1.0)));
        assert!(result.dropped.is_empty());
    }

    #[test]
    fn test_translate_errors_skips_unknown_ids() {
        let titles: TitleMap = [("Receipt No", "5")].into_iter().collect();
        let errors = vec![FieldError::new("99", "Unknown"), FieldError::new("5", "Bad")];

        let fields = translate_errors(&errors, &titles);

        assert_eq!(fields.len(), 1);
        assert!(fields.contains("receipt_no"));
    }

    #[test]
    fn test_resolve_errors_keeps_messages() {
        let titles: TitleMap = [("Receipt No", "5")].into_iter().collect();
        let errors = vec![FieldError::new("5", "This field is required.")];

        let resolved = FieldReconciler::new().resolve_errors(&errors, &titles);

        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].0, "receipt_no");
        assert_eq!(resolved[0].1.message, "This field is required.");
    }
}
