//! Integration tests for span resolution, operators and scoring

use aegis::config::secret_string;
use aegis::governance::operators::{HashType, OperatorConfig, OperatorKeys, OperatorTable};
use aegis::governance::risk::{self, RiskLevel};
use aegis::governance::{resolve_conflicts, AnonymizationEngine, ConflictStrategy, DetectedSpan};
use std::collections::BTreeMap;
use std::sync::Arc;

fn engine(rules: Vec<(&str, OperatorConfig)>) -> AnonymizationEngine {
    let table = OperatorTable::from_rules(rules).unwrap();
    AnonymizationEngine::new(Arc::new(table), ConflictStrategy::LongestWins)
}

#[test]
fn test_longer_overlapping_span_is_accepted() {
    let spans = vec![
        DetectedSpan::new("PERSON", 0, 10, 0.6),
        DetectedSpan::new("PERSON", 5, 8, 0.9),
    ];
    let accepted = resolve_conflicts(&spans, ConflictStrategy::LongestWins);

    assert_eq!(accepted.len(), 1);
    assert_eq!((accepted[0].start, accepted[0].end), (0, 10));
}

#[test]
fn test_mask_last_six_of_ten() {
    let engine = engine(vec![("PHONE_NUMBER", OperatorConfig::mask(6, "*", true))]);
    let result = engine
        .anonymize("0123456789", &[DetectedSpan::new("PHONE_NUMBER", 0, 10, 0.7)])
        .unwrap();

    assert_eq!(result.sanitized_text, "0123******");
    assert_eq!(result.applied_count, 1);
}

#[test]
fn test_mask_longer_than_span_masks_everything() {
    let engine = engine(vec![("PHONE_NUMBER", OperatorConfig::mask(50, "#", false))]);
    let result = engine
        .anonymize("call 555-0199 now", &[DetectedSpan::new("PHONE_NUMBER", 5, 13, 0.7)])
        .unwrap();

    assert_eq!(result.sanitized_text, "call ######## now");
}

#[test]
fn test_unconfigured_type_passes_through() {
    let engine = engine(vec![("EMAIL_ADDRESS", OperatorConfig::replace("[EMAIL]"))]);
    let text = "server 10.0.0.1 mail ops@corp.io";
    let result = engine
        .anonymize(
            text,
            &[
                DetectedSpan::new("IP_ADDRESS", 7, 15, 0.9),
                DetectedSpan::new("EMAIL_ADDRESS", 21, 32, 1.0),
            ],
        )
        .unwrap();

    assert_eq!(result.sanitized_text, "server 10.0.0.1 mail [EMAIL]");
    assert_eq!(result.applied_count, 1);
    assert_eq!(result.items.len(), 1);
}

#[test]
fn test_applied_spans_never_survive() {
    let engine = engine(vec![
        ("PERSON", OperatorConfig::replace("[NAME]")),
        ("EMAIL_ADDRESS", OperatorConfig::Replace { new_value: None }),
    ]);
    let text = "Ana Lima <ana.lima@corp.io> and Ana Lima again";
    let spans = vec![
        DetectedSpan::new("PERSON", 0, 8, 0.7),
        DetectedSpan::new("EMAIL_ADDRESS", 10, 26, 1.0),
        DetectedSpan::new("PERSON", 32, 40, 0.7),
    ];
    let result = engine.anonymize(text, &spans).unwrap();

    assert_eq!(
        result.sanitized_text,
        "[NAME] <<EMAIL_ADDRESS>> and [NAME] again"
    );
    for span in &spans {
        assert!(!result.sanitized_text.contains(&text[span.start..span.end]));
    }
}

#[test]
fn test_hash_and_encrypt_from_configuration() {
    let hash_key = secret_string("pepper".to_string());
    let encryption_key = secret_string("QkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkJCQkI=".to_string());
    let rules = BTreeMap::from([
        (
            "US_SSN".to_string(),
            OperatorConfig::Hash {
                hash_type: HashType::Sha256,
            },
        ),
        ("CREDIT_CARD".to_string(), OperatorConfig::Encrypt),
    ]);
    let table = OperatorTable::build(
        rules.iter(),
        OperatorKeys {
            hash_key: Some(&hash_key),
            encryption_key: Some(&encryption_key),
        },
    )
    .unwrap();
    let engine = AnonymizationEngine::new(Arc::new(table), ConflictStrategy::LongestWins);

    let text = "ssn 123-45-6789 card 4111 1111 1111 1111";
    let spans = vec![
        DetectedSpan::new("US_SSN", 4, 15, 0.85),
        DetectedSpan::new("CREDIT_CARD", 21, 40, 0.8),
    ];
    let first = engine.anonymize(text, &spans).unwrap();
    let second = engine.anonymize(text, &spans).unwrap();

    assert_eq!(first.applied_count, 2);
    assert_eq!(first.sanitized_text, second.sanitized_text);
    assert!(!first.sanitized_text.contains("123-45-6789"));
    assert!(!first.sanitized_text.contains("4111 1111 1111 1111"));
    assert_eq!(first.items[0].operator, "hash");
    assert_eq!(first.items[1].operator, "encrypt");
}

#[test]
fn test_score_is_monotonic_and_saturates() {
    let mut previous = 0;
    for count in 0..10 {
        let assessment = risk::score(count);
        assert!(assessment.score >= previous);
        previous = assessment.score;
        if count >= 5 {
            assert_eq!(assessment.score, 100);
            assert_eq!(assessment.level, RiskLevel::Critical);
        }
    }
}
