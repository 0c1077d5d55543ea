// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Identity resolution: cluster detected spans into numbered entity groups

use std::collections::{BTreeSet, HashMap};
use tracing::debug;

use super::patterns;
use super::types::{DetectedSpan, EntityCategory, EntityGroup, FinancialKind};

/// Group spans that refer to the same entity and number the groups.
///
/// Spans are processed in document order. A span joins an existing group
/// when its normalized text matches a member of that group, or, with
/// `alias_matching`, when it is a person or organization mention whose
/// words form a strict subset of exactly one earlier group's words.
/// Ordinals count from 1 per placeholder prefix and are never reused.
pub fn resolve(mut spans: Vec<DetectedSpan>, alias_matching: bool) -> Vec<EntityGroup> {
    spans.sort_by_key(|span| (span.start, span.end));

    let mut groups: Vec<EntityGroup> = Vec::new();
    let mut by_key: HashMap<(EntityCategory, String), usize> = HashMap::new();
    let mut counters: HashMap<&'static str, usize> = HashMap::new();

    for span in spans {
        let key = (span.category, identity_key(&span));

        // Alias hits are not cached: the next mention re-checks ambiguity
        // against every group seen so far.
        if let Some(&index) = by_key.get(&key) {
            groups[index].members.push(span);
            continue;
        }
        if let Some(index) = alias_matching.then(|| alias_target(&groups, &span)).flatten() {
            groups[index].members.push(span);
            continue;
        }

        let counter = counters.entry(span.category.placeholder_prefix()).or_insert(0);
        *counter += 1;
        groups.push(EntityGroup::new(span.category, *counter, span));
        by_key.insert(key, groups.len() - 1);
    }

    debug!(groups = groups.len(), "identity resolution complete");
    groups
}

/// Normalized comparison key for a span's text.
fn identity_key(span: &DetectedSpan) -> String {
    match span.category {
        EntityCategory::PhoneNumber
        | EntityCategory::IdNumber
        | EntityCategory::Financial(FinancialKind::AccountNumber) => span
            .original_text
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect(),
        _ => span
            .original_text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end_matches(['.', ','])
            .to_lowercase(),
    }
}

/// Lowercased distinctive words of a name, honorifics and boilerplate removed.
fn name_words(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .filter(|word| !patterns::is_common_word(word))
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// The single earlier group this mention is a shortened form of, if any.
fn alias_target(groups: &[EntityGroup], span: &DetectedSpan) -> Option<usize> {
    if !matches!(
        span.category,
        EntityCategory::PersonName | EntityCategory::Organization
    ) {
        return None;
    }
    let words = name_words(&span.original_text);
    if words.is_empty() {
        return None;
    }

    let mut candidates = groups.iter().enumerate().filter(|(_, group)| {
        group.category == span.category && {
            let canonical = name_words(group.canonical_text());
            words.len() < canonical.len() && words.is_subset(&canonical)
        }
    });

    match (candidates.next(), candidates.next()) {
        (Some((index, _)), None) => Some(index),
        _ => None,
    }
}
