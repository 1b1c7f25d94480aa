//! Behavioral properties of the field reconciler


use proptest::prelude::*;
use serde_json::json;
use wufoo_sync_core::inflector::{field_name_for_title, humanize};
use wufoo_sync_core::{
    build_outgoing_payload, build_title_map, parse_entry_response, translate_errors,
    EntryResponse, FieldError, FieldReconciler, FormFieldDescriptor, MatchKind, Subfield,
    TitleMap,
};

#[test]
fn receipt_no_resolves_through_humanized_title() {
    let titles = build_title_map(&[FormFieldDescriptor::new("Receipt No", "5")]);
    let payload = build_outgoing_payload(&test_support::record(&[("receipt_no", json!(1234))]), &titles);

    assert_eq!(payload.len(), 1);
    assert_eq!(payload.get("5"), Some(&json!(1234)));
}

#[test]
fn compound_fields_map_each_subfield() {
    let titles = build_title_map(&[FormFieldDescriptor::with_subfields(
        "Name",
        vec![Subfield::new("First", "3"), Subfield::new("Last", "4")],
    )]);

    assert_eq!(titles.get("Name First"), Some("3"));
    assert_eq!(titles.get("Name Last"), Some("4"));
    assert_eq!(titles.len(), 2);
}

#[test]
fn error_on_receipt_no_translates_to_local_name() {
    let titles: TitleMap = [("Receipt No", "5")].into_iter().collect();
    let fields = translate_errors(&[FieldError::new("5", "This field is required.")], &titles);

    assert_eq!(fields.into_iter().collect::<Vec<_>>(), vec!["receipt_no"]);
}

#[test]
fn single_error_response_translates_like_a_list() {
    let titles = build_title_map(&test_support::membership_form());

    let single = parse_entry_response(json!({
        "PostResponse": {"Success": "0", "FieldErrors": {"FieldError": {"ID": "Field5", "ErrorText": "Required"}}}
    }))
    .unwrap();
    let list = parse_entry_response(json!({
        "Success": 0,
        "FieldErrors": [{"ID": "Field5", "ErrorText": "Required"}]
    }))
    .unwrap();

    let fields_of = |response: EntryResponse| match response {
        EntryResponse::Rejected(rejection) => translate_errors(&rejection.field_errors, &titles),
        other => panic!("expected rejection, got {:?}", other),
    };

    assert_eq!(fields_of(single), fields_of(list));
}

#[test]
fn unmatched_fields_never_reach_the_payload() {
    let titles = build_title_map(&test_support::membership_form());
    let result = FieldReconciler::new().reconcile(&test_support::member_record().data, &titles);

    assert_eq!(result.dropped, vec!["password".to_string()]);
    assert!(!result.payload.values().any(|v| v == &json!("hunter2")));
    assert_eq!(result.payload.len(), 4);
}

#[test]
fn every_strategy_is_exercised_by_the_member_record() {
    let titles = build_title_map(&test_support::membership_form());
    let result = FieldReconciler::new().reconcile(&test_support::member_record().data, &titles);

    let kinds: Vec<_> = result.matches.iter().map(|m| (m.field.as_str(), m.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("receipt_no", MatchKind::Humanized),
            ("Name First", MatchKind::Exact),
            ("Email", MatchKind::Exact),
            ("interests", MatchKind::Composite),
        ]
    );
    assert_eq!(result.payload.get("Field11"), Some(&json!("Rowing")));
}

fn snake_name() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z][a-z0-9]{0,8}", 1..4).prop_map(|parts| parts.join("_"))
}

proptest! {
    #[test]
    fn slug_of_humanized_name_recovers_snake_name(name in snake_name()) {
        prop_assert_eq!(field_name_for_title(&humanize(&name)), name);
    }

    #[test]
    fn humanized_title_round_trips_through_errors(name in snake_name(), id in "Field[0-9]{1,3}") {
        let title = humanize(&name);
        let titles = build_title_map(&[FormFieldDescriptor::new(title, id.clone())]);

        let payload = build_outgoing_payload(&test_support::record(&[(name.as_str(), json!("v"))]), &titles);
        prop_assert_eq!(payload.get(&id), Some(&json!("v")));

        let fields = translate_errors(&[FieldError::new(id, "bad")], &titles);
        prop_assert!(fields.contains(&name));
    }

    #[test]
    fn title_map_is_deterministic(titles in proptest::collection::vec("[A-Z][a-z]{0,5}", 0..8)) {
        let descriptors: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| FormFieldDescriptor::new(t.clone(), format!("Field{}", i)))
            .collect();

        let first = build_title_map(&descriptors);
        let second = build_title_map(&descriptors);
        prop_assert_eq!(&first, &second);

        // Later duplicates win
        for title in &titles {
            let last = titles.iter().rposition(|t| t == title).unwrap();
            let expected = format!("Field{}", last);
            prop_assert_eq!(first.get(title), Some(expected.as_str()));
        }
    }
}
