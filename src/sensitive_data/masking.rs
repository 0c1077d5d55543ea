// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Placeholder rendering and masking report assembly

use std::borrow::Cow;

use super::error::{MaskingError, Result};
use super::types::{DetectedSpan, EntityGroup, MaskedEntityRecord, MaskingResult};

/// Every member span paired with its group's placeholder, in document order
fn placements(groups: &[EntityGroup]) -> Vec<(&DetectedSpan, &EntityGroup)> {
    let mut all: Vec<(&DetectedSpan, &EntityGroup)> = groups
        .iter()
        .flat_map(|group| group.members.iter().map(move |span| (span, group)))
        .collect();
    all.sort_by_key(|(span, _)| (span.start, span.end));
    all
}

/// Replace every grouped span in `text` with its placeholder token.
///
/// Substitution is by byte offset, applied from the end of the document
/// backwards so earlier offsets stay valid. Text outside the spans is
/// copied unchanged.
///
/// # Errors
/// * `SpanOutOfBounds` - a span does not address `text` or its recorded
///   text differs from the document
/// * `OverlapConflict` - two spans claim overlapping ranges
pub fn render<'a>(text: &'a str, groups: &[EntityGroup]) -> Result<Cow<'a, str>> {
    let all = placements(groups);
    if all.is_empty() {
        return Ok(Cow::Borrowed(text));
    }

    for (span, _) in &all {
        let in_bounds = span.start < span.end
            && span.end <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.end);
        if !in_bounds || text[span.start..span.end] != span.original_text {
            return Err(MaskingError::SpanOutOfBounds {
                start: span.start,
                end: span.end,
                len: text.len(),
            });
        }
    }

    // Sorted by start, so any overlap shows up between neighbours
    for pair in all.windows(2) {
        let (first, second) = (pair[0].0, pair[1].0);
        if first.end > second.start {
            return Err(MaskingError::OverlapConflict {
                first: (first.start, first.end),
                second: (second.start, second.end),
            });
        }
    }

    let mut result = text.to_string();
    for (span, group) in all.iter().rev() {
        result.replace_range(span.start..span.end, &group.placeholder_token);
    }

    Ok(Cow::Owned(result))
}

/// Assemble the final result: one record per replaced span, in document
/// order. Repeated mentions of one entity yield repeated records that share
/// a placeholder.
pub fn build_report(masked_text: String, groups: &[EntityGroup]) -> MaskingResult {
    let masked_entities = placements(groups)
        .into_iter()
        .map(|(span, group)| MaskedEntityRecord {
            entity_type: span.category.as_str().to_string(),
            original_text: span.original_text.clone(),
            masked_text: group.placeholder_token.clone(),
        })
        .collect();

    MaskingResult {
        masked_text,
        masked_entities,
    }
}
