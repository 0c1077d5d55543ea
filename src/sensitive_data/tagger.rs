// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entity tagger: turns classifier candidates into a clean, non-overlapping span set

use regex::Regex;
use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

use super::classifier::{find_whole_word, is_corporate_suffix, trim_range, EntityClassifier};
use super::config::MaskingConfig;
use super::error::{ClassifierError, MaskingError, Result};
use super::patterns::{self, compile_whitelist, PLACEHOLDER_TOKEN};
use super::types::{DetectedSpan, EntityCategory};

/// Reject empty or whitespace-only documents
pub fn validate_input(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(MaskingError::invalid_input(
            "document text is empty or whitespace-only",
        ));
    }
    Ok(())
}

/// One-shot tagging; builds a [`Tagger`] from `config` for this call only.
pub fn tag(
    text: &str,
    classifier: &dyn EntityClassifier,
    config: &MaskingConfig,
) -> Result<Vec<DetectedSpan>> {
    Tagger::new(config)?.tag(text, classifier)
}

/// Post-processing shared by every classifier
pub struct Tagger {
    whitelist: Vec<Regex>,
    exempt_terms: HashSet<String>,
}

impl Tagger {
    pub fn new(config: &MaskingConfig) -> Result<Self> {
        Ok(Self {
            whitelist: compile_whitelist(config)?,
            exempt_terms: config.normalized_exempt_terms(),
        })
    }

    /// Produce the complete, ordered, non-overlapping span set for `text`.
    ///
    /// Fails if the text is blank or if the classifier fails or hands back
    /// spans that do not address the document.
    pub fn tag(&self, text: &str, classifier: &dyn EntityClassifier) -> Result<Vec<DetectedSpan>> {
        validate_input(text)?;

        let candidates = classifier.classify(text)?;
        let placeholders: Vec<(usize, usize)> = PLACEHOLDER_TOKEN
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut kept = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            check_span(text, &candidate)?;

            let (start, end) = trim_range(text, candidate.start, candidate.end);
            if start >= end || overlaps_any(&placeholders, start, end) {
                continue;
            }
            let span = DetectedSpan::from_range(text, candidate.category, start, end);
            if self.is_exempt(&span) {
                continue;
            }
            kept.push(span);
        }

        let mut spans = resolve_overlaps(kept);
        let aliases = self.alias_mentions(text, &spans, &placeholders);
        spans.extend(aliases);
        spans.sort_by_key(|span| span.start);

        debug!(spans = spans.len(), "tagging complete");
        Ok(spans)
    }

    fn is_exempt(&self, span: &DetectedSpan) -> bool {
        let value = span.original_text.as_str();

        if self.exempt_terms.contains(&value.trim().to_lowercase())
            || patterns::is_role_label(value)
        {
            return true;
        }
        if matches!(
            span.category,
            EntityCategory::PersonName | EntityCategory::Organization
        ) && value.split_whitespace().all(patterns::is_common_word)
        {
            return true;
        }
        self.whitelist.iter().any(|pattern| pattern.is_match(value))
    }

    /// Standalone mentions of a detected person's first or last name, or of
    /// an organization's distinctive leading word.
    fn alias_mentions(
        &self,
        text: &str,
        spans: &[DetectedSpan],
        placeholders: &[(usize, usize)],
    ) -> Vec<DetectedSpan> {
        let mut taken: Vec<(usize, usize)> = spans
            .iter()
            .map(|span| (span.start, span.end))
            .chain(placeholders.iter().copied())
            .collect();
        let mut aliases = Vec::new();
        let mut searched = HashSet::new();

        for span in spans {
            for alias in alias_words(span) {
                if !searched.insert((span.category, alias)) {
                    continue;
                }
                for start in find_whole_word(text, alias) {
                    let end = start + alias.len();
                    if overlaps_any(&taken, start, end) {
                        continue;
                    }
                    let mention = DetectedSpan::from_range(text, span.category, start, end);
                    if self.is_exempt(&mention) {
                        continue;
                    }
                    taken.push((start, end));
                    aliases.push(mention);
                }
            }
        }

        if !aliases.is_empty() {
            debug!(aliases = aliases.len(), "added alias mentions");
        }
        aliases
    }
}

/// Candidate alias words for a multi-word name.
fn alias_words(span: &DetectedSpan) -> Vec<&str> {
    let words: Vec<&str> = span
        .original_text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| {
            w.chars().count() >= 2
                && w.chars().next().is_some_and(char::is_uppercase)
                && !patterns::is_common_word(w)
        })
        .collect();

    match span.category {
        EntityCategory::PersonName if words.len() >= 2 => {
            let mut out = vec![words[0]];
            if let Some(last) = words.last().filter(|w| **w != words[0]) {
                out.push(last);
            }
            out
        }
        EntityCategory::Organization => {
            let distinctive: Vec<&str> = words
                .iter()
                .copied()
                .filter(|w| !is_corporate_suffix(w))
                .collect();
            if distinctive.len() < words.len() {
                distinctive.into_iter().take(1).collect()
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

/// Ensure a classifier candidate addresses a real range of the text
fn check_span(text: &str, span: &DetectedSpan) -> Result<()> {
    let valid = span.start < span.end
        && span.end <= text.len()
        && text.is_char_boundary(span.start)
        && text.is_char_boundary(span.end)
        && text[span.start..span.end] == span.original_text;

    if !valid {
        return Err(ClassifierError::InvalidSpan {
            start: span.start,
            end: span.end,
        }
        .into());
    }
    Ok(())
}

fn overlaps_any(ranges: &[(usize, usize)], start: usize, end: usize) -> bool {
    ranges.iter().any(|&(s, e)| start < e && s < end)
}

/// Settle textual overlap deterministically.
///
/// Higher-precedence categories claim text first, then longer spans, then
/// earlier ones. Exact duplicates collapse into one span.
pub fn resolve_overlaps(mut candidates: Vec<DetectedSpan>) -> Vec<DetectedSpan> {
    candidates.sort_by_key(|span| (span.category.precedence(), Reverse(span.len()), span.start));

    let mut accepted: Vec<DetectedSpan> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !accepted.iter().any(|span| span.overlaps(&candidate)) {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|span| span.start);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensitive_data::classifier::RuleBasedClassifier;

    struct FixedClassifier(Vec<DetectedSpan>);

    impl EntityClassifier for FixedClassifier {
        fn classify(
            &self,
            _text: &str,
        ) -> std::result::Result<Vec<DetectedSpan>, ClassifierError> {
            Ok(self.0.clone())
        }
    }

    struct DownClassifier;

    impl EntityClassifier for DownClassifier {
        fn classify(
            &self,
            _text: &str,
        ) -> std::result::Result<Vec<DetectedSpan>, ClassifierError> {
            Err(ClassifierError::Unavailable("connection refused".into()))
        }
    }

    fn tag(text: &str) -> Vec<(EntityCategory, String)> {
        let config = MaskingConfig::default();
        let tagger = Tagger::new(&config).unwrap();
        let classifier = RuleBasedClassifier::new(&config).unwrap();
        tagger
            .tag(text, &classifier)
            .unwrap()
            .into_iter()
            .map(|s| (s.category, s.original_text))
            .collect()
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let config = MaskingConfig::default();
        let tagger = Tagger::new(&config).unwrap();
        let classifier = RuleBasedClassifier::new(&config).unwrap();

        assert!(matches!(
            tagger.tag("", &classifier),
            Err(MaskingError::InvalidInput { .. })
        ));
        assert!(matches!(
            tagger.tag(" \n\t ", &classifier),
            Err(MaskingError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_classifier_failure_is_detection_unavailable() {
        let tagger = Tagger::new(&MaskingConfig::default()).unwrap();
        assert!(matches!(
            tagger.tag("Asha Rao", &DownClassifier),
            Err(MaskingError::DetectionUnavailable(_))
        ));
    }

    #[test]
    fn test_out_of_range_candidate_is_rejected() {
        let tagger = Tagger::new(&MaskingConfig::default()).unwrap();
        let bogus = FixedClassifier(vec![DetectedSpan {
            category: EntityCategory::Email,
            original_text: "a@b.io".into(),
            start: 40,
            end: 46,
        }]);
        assert!(matches!(
            tagger.tag("short text", &bogus),
            Err(MaskingError::DetectionUnavailable(
                ClassifierError::InvalidSpan { .. }
            ))
        ));
    }

    #[test]
    fn test_scenario_spans() {
        let spans =
            tag("John Smith lives at 123 Main St. Contact John at john@example.com or 555-1234. Jane Doe co-signed.");
        assert_eq!(
            spans,
            vec![
                (EntityCategory::PersonName, "John Smith".to_string()),
                (EntityCategory::Address, "123 Main St".to_string()),
                (EntityCategory::PersonName, "John".to_string()),
                (EntityCategory::Email, "john@example.com".to_string()),
                (EntityCategory::PhoneNumber, "555-1234".to_string()),
                (EntityCategory::PersonName, "Jane Doe".to_string()),
            ]
        );
    }

    #[test]
    fn test_role_label_is_never_tagged() {
        assert!(tag("The Landlord agrees to maintain the property.").is_empty());

        let text = "Landlord";
        let tagger = Tagger::new(&MaskingConfig::default()).unwrap();
        let eager = FixedClassifier(vec![DetectedSpan::from_range(
            text,
            EntityCategory::PersonName,
            0,
            8,
        )]);
        assert!(tagger.tag(text, &eager).unwrap().is_empty());
    }

    #[test]
    fn test_placeholders_are_left_alone() {
        let spans = tag("[PERSON_NAME_1] lives at [ADDRESS_1]. Contact [PERSON_NAME_1] at [EMAIL_1].");
        assert!(spans.is_empty(), "unexpected spans: {spans:?}");
    }

    #[test]
    fn test_exempt_terms_and_whitelist() {
        let config = MaskingConfig {
            exempt_terms: vec!["Ravi Shankar".into()],
            whitelist_patterns: vec![r"@example\.org$".into()],
            ..Default::default()
        };
        let tagger = Tagger::new(&config).unwrap();
        let classifier = RuleBasedClassifier::new(&config).unwrap();
        let spans = tagger
            .tag(
                "Ravi Shankar wrote to help@example.org and asha@rao.in.",
                &classifier,
            )
            .unwrap();

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].original_text, "asha@rao.in");
    }

    #[test]
    fn test_overlap_prefers_precedence_then_length() {
        let text = "Acme Corporation";
        let spans = resolve_overlaps(vec![
            DetectedSpan::from_range(text, EntityCategory::PersonName, 0, 16),
            DetectedSpan::from_range(text, EntityCategory::Organization, 0, 16),
            DetectedSpan::from_range(text, EntityCategory::Organization, 0, 4),
        ]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, EntityCategory::Organization);
        assert_eq!(spans[0].end, 16);
    }

    #[test]
    fn test_statute_titles_are_not_names() {
        let spans = tag(
            "This lease is governed by the Karnataka Rent Control Act. The Act applies to all premises.",
        );
        assert!(spans.is_empty(), "unexpected spans: {spans:?}");
    }

    #[test]
    fn test_organization_alias_mentions() {
        let spans = tag("Acme Holdings Ltd. leases the premises. Acme shall pay rent.");
        assert!(spans.contains(&(
            EntityCategory::Organization,
            "Acme Holdings Ltd.".to_string()
        )));
        assert!(spans.contains(&(EntityCategory::Organization, "Acme".to_string())));
    }
}
