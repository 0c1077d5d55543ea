// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Integration tests for the masking pipeline

use sensitive_masking::sensitive_data::{
    masking::render, resolver::resolve, tagger, ClassifierError, DetectedSpan, EntityCategory,
    GenerationRequest, GenerativeClassifier, MaskingConfig, MaskingError, RuleBasedClassifier,
    SensitiveDataMasker,
};

fn records(text: &str) -> (String, Vec<(String, String, String)>) {
    let result = sensitive_masking::mask(text).expect("mask() failed");
    let rows = result
        .masked_entities
        .into_iter()
        .map(|r| (r.entity_type, r.original_text, r.masked_text))
        .collect();
    (result.masked_text, rows)
}

fn row(entity_type: &str, original: &str, token: &str) -> (String, String, String) {
    (entity_type.to_string(), original.to_string(), token.to_string())
}

#[test]
fn test_contact_paragraph() {
    let (masked, rows) = records(
        "John Smith lives at 123 Main St. Contact John at john@example.com or 555-1234. Jane Doe co-signed.",
    );

    assert_eq!(
        masked,
        "[PERSON_NAME_1] lives at [ADDRESS_1]. Contact [PERSON_NAME_1] at [EMAIL_1] or [PHONE_NUMBER_1]. [PERSON_NAME_2] co-signed."
    );
    assert_eq!(
        rows,
        vec![
            row("PERSON_NAME", "John Smith", "[PERSON_NAME_1]"),
            row("ADDRESS", "123 Main St", "[ADDRESS_1]"),
            row("PERSON_NAME", "John", "[PERSON_NAME_1]"),
            row("EMAIL", "john@example.com", "[EMAIL_1]"),
            row("PHONE_NUMBER", "555-1234", "[PHONE_NUMBER_1]"),
            row("PERSON_NAME", "Jane Doe", "[PERSON_NAME_2]"),
        ]
    );
}

#[test]
fn test_role_label_stays_literal() {
    let text = "The Landlord agrees to maintain the property.";
    let (masked, rows) = records(text);

    assert_eq!(masked, text);
    assert!(rows.iter().all(|(_, original, _)| original != "Landlord"));
    assert!(rows.is_empty());
}

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(
        sensitive_masking::mask(""),
        Err(MaskingError::InvalidInput { .. })
    ));
    assert!(matches!(
        sensitive_masking::mask("  \n  "),
        Err(MaskingError::InvalidInput { .. })
    ));
}

#[test]
fn test_identifiers_and_figures() {
    let (masked, rows) = records(
        "Mr. Ramesh Kumar, PAN: ABCDE1234F, Date of Birth: 14/08/1990, pays Rs. 25,000/- to A/c No. 001234567890.",
    );

    assert_eq!(
        masked,
        "Mr. [PERSON_NAME_1], PAN: [ID_NUMBER_1], Date of Birth: [DOB_1], pays [AMOUNT_1] to A/c No. [ACCOUNT_NUMBER_1]."
    );
    assert!(rows.contains(&row("FINANCIAL", "Rs. 25,000/-", "[AMOUNT_1]")));
    assert!(rows.contains(&row("FINANCIAL", "001234567890", "[ACCOUNT_NUMBER_1]")));
    assert!(rows.contains(&row("DATE_OF_BIRTH", "14/08/1990", "[DOB_1]")));
}

#[test]
fn test_contract_dates_and_headings_stay_literal() {
    let text = "1. Security Deposit\nEffective Date: 01/04/2024\nThe Tenant shall pay the deposit.";
    let (masked, rows) = records(text);

    assert_eq!(masked, text);
    assert!(rows.is_empty());
}

#[test]
fn test_names_inside_numbered_clauses_are_masked() {
    let (masked, rows) =
        records("1. John Smith shall pay the rent to Acme Holdings Ltd. on time.");
    assert_eq!(
        masked,
        "1. [PERSON_NAME_1] shall pay the rent to [ORGANIZATION_1] on time."
    );
    assert_eq!(
        rows,
        vec![
            row("PERSON_NAME", "John Smith", "[PERSON_NAME_1]"),
            row("ORGANIZATION", "Acme Holdings Ltd.", "[ORGANIZATION_1]"),
        ]
    );

    let (masked, _) = records("(a) Priya Sharma shall pay Rs. 5,000 monthly.");
    assert_eq!(masked, "(a) [PERSON_NAME_1] shall pay [AMOUNT_1] monthly.");
}

#[test]
fn test_clause_title_stays_but_clause_body_is_tagged() {
    let config = MaskingConfig::default();
    let classifier = RuleBasedClassifier::new(&config).unwrap();
    let text = "4. Security Deposit Refund\n4.1 Meera Iyer holds the deposit.";

    let spans = tagger::tag(text, &classifier, &config).unwrap();
    let found: Vec<(EntityCategory, &str)> = spans
        .iter()
        .map(|s| (s.category, s.original_text.as_str()))
        .collect();
    assert_eq!(found, vec![(EntityCategory::PersonName, "Meera Iyer")]);
}

#[test]
fn test_statute_titles_stay_literal() {
    let text =
        "This lease is governed by the Karnataka Rent Control Act. The Act applies to all premises.";
    let (masked, rows) = records(text);

    assert_eq!(masked, text);
    assert!(rows.is_empty());
}

#[test]
fn test_residence_address_stops_before_next_person() {
    let (masked, rows) = records(
        "Ravi Kumar residing at 45 Park Avenue, Bengaluru with his brother Arjun Kumar and mother, pays rent.",
    );

    assert_eq!(
        masked,
        "[PERSON_NAME_1] residing at [ADDRESS_1] with his brother [PERSON_NAME_2] and mother, pays rent."
    );
    assert!(rows.contains(&row("ADDRESS", "45 Park Avenue, Bengaluru", "[ADDRESS_1]")));
    assert!(rows.contains(&row("PERSON_NAME", "Arjun Kumar", "[PERSON_NAME_2]")));
}

#[test]
fn test_first_name_after_second_namesake_is_ambiguous() {
    let (masked, _) = records("John Smith signed. John paid. John Doe witnessed. John left.");

    assert_eq!(
        masked,
        "[PERSON_NAME_1] signed. [PERSON_NAME_1] paid. [PERSON_NAME_2] witnessed. [PERSON_NAME_3] left."
    );
}

#[test]
fn test_remasking_is_idempotent() {
    let (once, _) = records(
        "John Smith lives at 123 Main St. Contact John at john@example.com or 555-1234. Jane Doe co-signed.",
    );
    let (twice, rows) = records(&once);

    assert_eq!(twice, once);
    assert!(rows.is_empty());
}

#[test]
fn test_alias_matching_disabled_keeps_first_name_separate() {
    let masker = SensitiveDataMasker::new(MaskingConfig {
        alias_matching: false,
        ..Default::default()
    })
    .unwrap();
    let result = masker.mask("Asha Rao signed and Asha paid.").unwrap();

    assert_eq!(
        result.masked_text,
        "[PERSON_NAME_1] signed and [PERSON_NAME_2] paid."
    );
}

#[test]
fn test_custom_pattern_from_json_config() {
    let config = MaskingConfig::from_json(
        r#"{"custom_patterns": [{"pattern": "EMP-\\d{5}", "category": "ID_NUMBER"}]}"#,
    )
    .unwrap();
    let masker = SensitiveDataMasker::new(config).unwrap();
    let result = masker.mask("badge EMP-00123 issued").unwrap();

    assert_eq!(result.masked_text, "badge [ID_NUMBER_1] issued");
}

#[test]
fn test_generative_classifier_pipeline() {
    let backend = |request: &GenerationRequest| -> Result<String, ClassifierError> {
        assert!(request.system.contains("Landlord"));
        Ok(r#"{"entities": [
            {"entityType": "PERSON_NAME", "originalText": "Anita Desai"},
            {"entityType": "PERSON_NAME", "originalText": "Bharat Rao"},
            {"entityType": "PERSON_NAME", "originalText": "Anita"},
            {"entityType": "FINANCIAL", "originalText": "Rs. 5,000"},
            {"entityType": "PERSON_NAME", "originalText": "Landlord"}
        ]}"#
        .to_string())
    };
    let config = MaskingConfig::default();
    let classifier = GenerativeClassifier::new(backend, &config);
    let masker = SensitiveDataMasker::with_classifier(config, classifier).unwrap();

    let result = masker
        .mask("Lease between Anita Desai and Bharat Rao. The Landlord Anita receives Rs. 5,000 monthly.")
        .unwrap();

    assert_eq!(
        result.masked_text,
        "Lease between [PERSON_NAME_1] and [PERSON_NAME_2]. The Landlord [PERSON_NAME_1] receives [AMOUNT_1] monthly."
    );
    assert_eq!(result.masked_entities.len(), 4);
}

#[test]
fn test_generative_failure_returns_no_partial_result() {
    let backend = |_: &GenerationRequest| -> Result<String, ClassifierError> {
        Ok("Sure! Here are the entities: Anita Desai".to_string())
    };
    let config = MaskingConfig::default();
    let classifier = GenerativeClassifier::new(backend, &config);
    let masker = SensitiveDataMasker::with_classifier(config, classifier).unwrap();

    match masker.mask("Lease between Anita Desai and Bharat Rao.") {
        Err(MaskingError::DetectionUnavailable(ClassifierError::Malformed(_))) => {}
        other => panic!("expected malformed output error, got {other:?}"),
    }
}

#[test]
fn test_overlapping_groups_fail_loudly() {
    let text = "Kumar Holdings Pvt. Ltd.";
    let spans = vec![
        DetectedSpan::from_range(text, EntityCategory::Organization, 0, 24),
        DetectedSpan::from_range(text, EntityCategory::PersonName, 0, 5),
    ];
    let groups = resolve(spans, true);

    assert!(matches!(
        render(text, &groups),
        Err(MaskingError::OverlapConflict { .. })
    ));
}

#[test]
fn test_result_json_shape() {
    let result = sensitive_masking::mask("Write to asha@rao.in.").unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["maskedText"], "Write to [EMAIL_1].");
    assert_eq!(json["maskedEntities"][0]["entityType"], "EMAIL");
    assert_eq!(json["maskedEntities"][0]["originalText"], "asha@rao.in");
    assert_eq!(json["maskedEntities"][0]["maskedText"], "[EMAIL_1]");
}
