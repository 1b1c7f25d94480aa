// Tests for report formatting and the output writer

use super::*;
use crate::test_support::{writer, SharedBuffer};
use serde_json::json;
use std::collections::BTreeSet;
use wufoo_sync_core::{FieldReconciler, RecordData, Subfield};

fn membership_fields() -> Vec<FormFieldDescriptor> {
    vec![
        FormFieldDescriptor::new("Receipt No", "Field5"),
        FormFieldDescriptor::with_subfields(
            "Name",
            vec![Subfield::new("First", "Field1"), Subfield::new("Last", "Field2")],
        ),
    ]
}

fn reconciliation() -> Reconciliation {
    let reconciler = FieldReconciler::new();
    let titles = reconciler.build_title_map(&membership_fields());
    let record: RecordData = [
        ("receipt_no".to_string(), json!("R-100")),
        ("Name First".to_string(), json!("Jo")),
        ("password".to_string(), json!("hunter22")),
    ]
    .into_iter()
    .collect();
    reconciler.reconcile(&record, &titles)
}

#[test]
fn test_fields_report_human() {
    let fields = membership_fields();
    let report = FieldsReport {
        form: "s1afea8b1vk0jf7".to_string(),
        titles: FieldReconciler::new().build_title_map(&fields),
        fields,
    };

    let formatted = format_fields_report_human(&report);
    assert!(formatted.contains("Form 's1afea8b1vk0jf7': 2 field(s), 3 title(s)"));
    assert!(formatted.contains("Record field"));
    assert!(formatted.contains("Receipt No │ Field5 │ receipt_no"));
    assert!(formatted.contains("Name First │ Field1 │ name_first"));
}

#[test]
fn test_fields_report_json() {
    let fields = membership_fields();
    let report = FieldsReport {
        form: "s1afea8b1vk0jf7".to_string(),
        titles: FieldReconciler::new().build_title_map(&fields),
        fields,
    };

    let formatted = OutputFormat::Json.format_fields_report(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
    assert_eq!(value["titles"]["Name Last"], "Field2");
    assert_eq!(value["fields"][0]["Title"], "Receipt No");
}

#[test]
fn test_reconciliation_human_lists_dropped_fields() {
    let formatted = format_reconciliation_human(&reconciliation());
    assert!(formatted.contains("receipt_no"));
    assert!(formatted.contains("humanized"));
    assert!(formatted.contains("R-100"));
    assert!(formatted.contains("Not submitted (no matching form field): password"));
    assert!(!formatted.contains("hunter22"));
}

#[test]
fn test_reconciliation_human_without_matches() {
    let formatted = format_reconciliation_human(&Reconciliation::default());
    assert!(formatted.contains("No record fields match the form"));
}

#[test]
fn test_push_report_human_rejected() {
    let mut validation_errors = IndexMap::new();
    validation_errors.insert("receipt_no".to_string(), "This field is required.".to_string());

    let report = PushReport {
        form: "s1afea8b1vk0jf7".to_string(),
        model: Some("Member".to_string()),
        created: true,
        outcome: SaveOutcome::Rejected {
            invalid_fields: BTreeSet::from(["receipt_no".to_string()]),
            error_text: Some("Errors have been highlighted below.".to_string()),
        },
        reconciliation: None,
        validation_errors,
    };

    let formatted = format_push_report_human(&report);
    assert!(formatted.contains("✗ Form 's1afea8b1vk0jf7' rejected the new record"));
    assert!(formatted.contains("Errors have been highlighted below."));
    assert!(formatted.contains("• receipt_no: This field is required."));
}

#[test]
fn test_push_report_human_saved_with_reconciliation() {
    let report = PushReport {
        form: "s1afea8b1vk0jf7".to_string(),
        model: None,
        created: false,
        outcome: SaveOutcome::Saved { entry_id: 42 },
        reconciliation: Some(reconciliation()),
        validation_errors: IndexMap::new(),
    };

    let formatted = format_push_report_human(&report);
    assert!(formatted.contains("✓ Saved updated record as entry 42 of form 's1afea8b1vk0jf7'"));
    assert!(formatted.contains("Field5"));
}

#[test]
fn test_push_report_yaml() {
    let report = PushReport {
        form: "contact-us".to_string(),
        model: Some("Contact".to_string()),
        created: true,
        outcome: SaveOutcome::Saved { entry_id: 7 },
        reconciliation: None,
        validation_errors: IndexMap::new(),
    };

    let formatted = OutputFormat::Yaml.format_push_report(&report).unwrap();
    assert!(formatted.contains("status: saved"));
    assert!(formatted.contains("entry_id: 7"));
    assert!(!formatted.contains("validation_errors"));
}

#[test]
fn test_render_table_alignment() {
    let table = render_table(
        &["A", "Long header"],
        &[vec!["wide cell".to_string(), "x".to_string()]],
    );
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "A         │ Long header");
    assert_eq!(lines[2], "wide cell │ x");
}

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("abcdefghij", 5), "abcd…");
}

#[test]
fn test_writer_suppresses_messages_in_machine_formats() {
    let (mut output, buffer) = writer(OutputFormat::Json);
    output.info("hello").unwrap();
    output.success("done").unwrap();
    output.section("Section").unwrap();
    output.data(&json!({"ok": true})).unwrap();

    assert_eq!(buffer.contents(), "{\"ok\":true}\n");
}

#[test]
fn test_writer_human_messages() {
    let (mut output, buffer) = writer(OutputFormat::Human);
    output.info("Fetching fields").unwrap();
    output.warning("Careful").unwrap();
    output.section("Entry").unwrap();

    let contents = buffer.contents();
    assert!(contents.contains("INFO: Fetching fields"));
    assert!(contents.contains("WARNING: Careful"));
    assert!(contents.contains("=== Entry ==="));
}

#[test]
fn test_quiet_writer_still_writes_data() {
    let buffer = SharedBuffer::default();
    let mut output =
        OutputWriter::with_writer(OutputFormat::Human, false, true, Box::new(buffer.clone()));
    output.info("hidden").unwrap();
    output.reconciliation(&reconciliation()).unwrap();

    let contents = buffer.contents();
    assert!(!contents.contains("hidden"));
    assert!(contents.contains("Field5"));
}
