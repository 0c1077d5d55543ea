// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Data model for the masking pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ClassifierError;

/// FINANCIAL subtypes; each has its own placeholder sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FinancialKind {
    AccountNumber,
    Amount,
}

impl FinancialKind {
    /// Guess the subtype of an unlabelled financial value.
    ///
    /// Currency markers or a two-digit decimal tail mean an amount; anything
    /// else is treated as an account or routing identifier.
    pub fn infer(value: &str) -> Self {
        let lower = value.to_lowercase();
        let has_currency = ['$', '€', '£', '₹', '¥'].iter().any(|c| value.contains(*c))
            || ["rs", "inr", "usd", "eur", "gbp"]
                .iter()
                .any(|code| lower.starts_with(code) || lower.ends_with(code))
            || ["dollar", "rupee", "euro", "pound"]
                .iter()
                .any(|word| lower.contains(word));
        let decimal_tail = value
            .rsplit_once('.')
            .map(|(head, tail)| {
                tail.len() == 2
                    && tail.chars().all(|c| c.is_ascii_digit())
                    && head.chars().any(|c| c.is_ascii_digit())
            })
            .unwrap_or(false);

        if has_currency || decimal_tail {
            FinancialKind::Amount
        } else {
            FinancialKind::AccountNumber
        }
    }
}

/// Closed taxonomy of sensitive entity categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityCategory {
    PersonName,
    Organization,
    Address,
    LandDetail,
    PhoneNumber,
    Email,
    IdNumber,
    Financial(FinancialKind),
    DateOfBirth,
    Signature,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 11] = [
        EntityCategory::PersonName,
        EntityCategory::Organization,
        EntityCategory::Address,
        EntityCategory::LandDetail,
        EntityCategory::PhoneNumber,
        EntityCategory::Email,
        EntityCategory::IdNumber,
        EntityCategory::Financial(FinancialKind::AccountNumber),
        EntityCategory::Financial(FinancialKind::Amount),
        EntityCategory::DateOfBirth,
        EntityCategory::Signature,
    ];

    /// Category name reported in `MaskedEntityRecord::entity_type`
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityCategory::PersonName => "PERSON_NAME",
            EntityCategory::Organization => "ORGANIZATION",
            EntityCategory::Address => "ADDRESS",
            EntityCategory::LandDetail => "LAND_DETAIL",
            EntityCategory::PhoneNumber => "PHONE_NUMBER",
            EntityCategory::Email => "EMAIL",
            EntityCategory::IdNumber => "ID_NUMBER",
            EntityCategory::Financial(_) => "FINANCIAL",
            EntityCategory::DateOfBirth => "DATE_OF_BIRTH",
            EntityCategory::Signature => "SIGNATURE",
        }
    }

    /// Prefix used to build `[PREFIX_n]` tokens. Ordinals are scoped per prefix.
    pub fn placeholder_prefix(&self) -> &'static str {
        match self {
            EntityCategory::Financial(FinancialKind::AccountNumber) => "ACCOUNT_NUMBER",
            EntityCategory::Financial(FinancialKind::Amount) => "AMOUNT",
            EntityCategory::DateOfBirth => "DOB",
            other => other.as_str(),
        }
    }

    pub fn placeholder(&self, ordinal: usize) -> String {
        format!("[{}_{}]", self.placeholder_prefix(), ordinal)
    }

    /// Overlap precedence in the tagger; lower wins.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            EntityCategory::Email => 0,
            EntityCategory::IdNumber => 1,
            EntityCategory::Financial(_) => 2,
            EntityCategory::DateOfBirth => 3,
            EntityCategory::LandDetail => 4,
            EntityCategory::Address => 5,
            EntityCategory::Signature => 6,
            EntityCategory::PhoneNumber => 7,
            EntityCategory::Organization => 8,
            EntityCategory::PersonName => 9,
        }
    }

    /// Parse a category label as produced by a classifier or a config file.
    ///
    /// Accepts the canonical names, the placeholder prefixes and the short
    /// forms used in prompts (`PHONE`, `LAND_DETAILS`, `DOB`). A bare
    /// `FINANCIAL` label is narrowed with [`FinancialKind::infer`].
    pub fn from_label(label: &str, value: &str) -> Option<Self> {
        let normalized: String = label
            .trim()
            .trim_matches(|c| c == '[' || c == ']')
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        let category = match normalized.as_str() {
            "PERSON_NAME" | "PERSON" | "NAME" => EntityCategory::PersonName,
            "ORGANIZATION" | "ORGANISATION" | "ORG" => EntityCategory::Organization,
            "ADDRESS" => EntityCategory::Address,
            "LAND_DETAIL" | "LAND_DETAILS" => EntityCategory::LandDetail,
            "PHONE_NUMBER" | "PHONE" => EntityCategory::PhoneNumber,
            "EMAIL" | "EMAIL_ADDRESS" => EntityCategory::Email,
            "ID_NUMBER" | "ID" => EntityCategory::IdNumber,
            "ACCOUNT_NUMBER" => EntityCategory::Financial(FinancialKind::AccountNumber),
            "AMOUNT" => EntityCategory::Financial(FinancialKind::Amount),
            "FINANCIAL" => EntityCategory::Financial(FinancialKind::infer(value)),
            "DATE_OF_BIRTH" | "DOB" => EntityCategory::DateOfBirth,
            "SIGNATURE" => EntityCategory::Signature,
            _ => return None,
        };
        Some(category)
    }
}

impl fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityCategory {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s, "").ok_or_else(|| ClassifierError::UnknownCategory(s.to_string()))
    }
}

/// A single occurrence of sensitive content, as byte offsets into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedSpan {
    pub category: EntityCategory,
    pub original_text: String,
    pub start: usize,
    pub end: usize,
}

impl DetectedSpan {
    /// Build a span from a range of `text`. The range must be valid.
    pub fn from_range(text: &str, category: EntityCategory, start: usize, end: usize) -> Self {
        Self {
            category,
            original_text: text[start..end].to_string(),
            start,
            end,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn overlaps(&self, other: &DetectedSpan) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// All mentions judged to refer to one real-world entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityGroup {
    pub category: EntityCategory,
    /// 1-based, by first appearance, unique per placeholder prefix
    pub ordinal: usize,
    pub placeholder_token: String,
    /// Mentions in document order
    pub members: Vec<DetectedSpan>,
}

impl EntityGroup {
    pub fn new(category: EntityCategory, ordinal: usize, first: DetectedSpan) -> Self {
        Self {
            category,
            ordinal,
            placeholder_token: category.placeholder(ordinal),
            members: vec![first],
        }
    }

    /// Longest member text; used as the canonical surface form for aliasing.
    pub fn canonical_text(&self) -> &str {
        self.members
            .iter()
            .max_by(|a, b| {
                a.original_text
                    .len()
                    .cmp(&b.original_text.len())
                    .then(b.start.cmp(&a.start))
            })
            .map(|span| span.original_text.as_str())
            .unwrap_or_default()
    }
}

/// One row of the masking inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskedEntityRecord {
    pub entity_type: String,
    pub original_text: String,
    pub masked_text: String,
}

/// Pipeline output: masked document plus per-span inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskingResult {
    pub masked_text: String,
    pub masked_entities: Vec<MaskedEntityRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_tokens() {
        assert_eq!(EntityCategory::PersonName.placeholder(1), "[PERSON_NAME_1]");
        assert_eq!(EntityCategory::DateOfBirth.placeholder(2), "[DOB_2]");
        assert_eq!(
            EntityCategory::Financial(FinancialKind::Amount).placeholder(3),
            "[AMOUNT_3]"
        );
        assert_eq!(
            EntityCategory::Financial(FinancialKind::AccountNumber).as_str(),
            "FINANCIAL"
        );
    }

    #[test]
    fn test_label_aliases() {
        assert_eq!(
            EntityCategory::from_label("phone", ""),
            Some(EntityCategory::PhoneNumber)
        );
        assert_eq!(
            EntityCategory::from_label("LAND_DETAILS", ""),
            Some(EntityCategory::LandDetail)
        );
        assert_eq!(
            EntityCategory::from_label("[DOB]", ""),
            Some(EntityCategory::DateOfBirth)
        );
        assert_eq!(
            EntityCategory::from_label("FINANCIAL", "$1,200.00"),
            Some(EntityCategory::Financial(FinancialKind::Amount))
        );
        assert_eq!(
            EntityCategory::from_label("FINANCIAL", "0012345678"),
            Some(EntityCategory::Financial(FinancialKind::AccountNumber))
        );
        assert!("LANDLORD".parse::<EntityCategory>().is_err());
    }

    #[test]
    fn test_financial_inference() {
        assert_eq!(FinancialKind::infer("Rs. 25,000"), FinancialKind::Amount);
        assert_eq!(FinancialKind::infer("1500.50"), FinancialKind::Amount);
        assert_eq!(FinancialKind::infer("5000 rupees"), FinancialKind::Amount);
        assert_eq!(FinancialKind::infer("SBIN0001234"), FinancialKind::AccountNumber);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = MaskingResult {
            masked_text: "[EMAIL_1]".into(),
            masked_entities: vec![MaskedEntityRecord {
                entity_type: "EMAIL".into(),
                original_text: "a@b.io".into(),
                masked_text: "[EMAIL_1]".into(),
            }],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["maskedText"], "[EMAIL_1]");
        assert_eq!(json["maskedEntities"][0]["entityType"], "EMAIL");
        assert_eq!(json["maskedEntities"][0]["originalText"], "a@b.io");

        let back: MaskingResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_span_overlap() {
        let text = "John Smith";
        let a = DetectedSpan::from_range(text, EntityCategory::PersonName, 0, 10);
        let b = DetectedSpan::from_range(text, EntityCategory::PersonName, 5, 10);
        let c = DetectedSpan::from_range(text, EntityCategory::PersonName, 0, 4);
        assert!(a.overlaps(&b));
        assert!(!b.overlaps(&c));
    }
}
