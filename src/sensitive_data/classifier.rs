// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Entity classification capability: built-in rules or an external model

use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

use super::config::MaskingConfig;
use super::error::{ClassifierError, Result};
use super::patterns::{self, compile_patterns, CompiledPattern, CompiledPatterns};
use super::types::{DetectedSpan, EntityCategory};

/// Source of candidate sensitive spans for a document.
///
/// Candidates may overlap and may include role labels; the tagger cleans
/// them up. An implementation must either return every finding or fail.
pub trait EntityClassifier: Send + Sync {
    fn classify(&self, text: &str) -> std::result::Result<Vec<DetectedSpan>, ClassifierError>;
}

/// Deterministic classifier built from regex rules and name heuristics
pub struct RuleBasedClassifier {
    patterns: CompiledPatterns,
}

impl RuleBasedClassifier {
    pub fn new(config: &MaskingConfig) -> Result<Self> {
        Ok(Self {
            patterns: compile_patterns(config)?,
        })
    }

    fn collect(&self, text: &str, pattern: &CompiledPattern, out: &mut Vec<DetectedSpan>) {
        for caps in pattern.regex.captures_iter(text) {
            let Some((start, end)) = pattern.value_range(&caps) else {
                continue;
            };
            let (start, end) = trim_range(text, start, end);
            if start >= end {
                continue;
            }
            if pattern.skip_headings && patterns::is_heading(text, start) {
                continue;
            }
            if patterns::requires_digit(pattern.category)
                && !text[start..end].chars().any(|c| c.is_ascii_digit())
            {
                continue;
            }
            trace!(rule = %pattern.description, start, end, "rule matched");

            match pattern.category {
                EntityCategory::PersonName => {
                    for (s, e) in name_runs(text, start, end, pattern.min_tokens) {
                        out.push(DetectedSpan::from_range(text, pattern.category, s, e));
                    }
                }
                EntityCategory::Organization => {
                    if let Some((s, e)) = organization_range(text, start, end) {
                        out.push(DetectedSpan::from_range(text, pattern.category, s, e));
                    }
                }
                category => out.push(DetectedSpan::from_range(text, category, start, end)),
            }
        }
    }
}

impl EntityClassifier for RuleBasedClassifier {
    fn classify(&self, text: &str) -> std::result::Result<Vec<DetectedSpan>, ClassifierError> {
        let mut spans = Vec::new();

        // Only run the rules the RegexSet says can match
        for pattern_idx in self.patterns.regex_set.matches(text).iter() {
            self.collect(text, &self.patterns.patterns[pattern_idx], &mut spans);
        }

        debug!(candidates = spans.len(), "rule classifier finished");
        Ok(spans)
    }
}

/// Shrink a byte range so it neither starts nor ends with whitespace or
/// trailing separators.
pub(crate) fn trim_range(text: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &text[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim_start().trim_end_matches(|c: char| {
        c.is_whitespace() || matches!(c, ',' | ';' | ':')
    });
    (start + lead, start + lead + trimmed.len())
}

/// Whitespace-separated tokens of `text[start..end]` with absolute offsets.
fn tokens(text: &str, start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut token_start = None;
    for (i, c) in text[start..end].char_indices() {
        match (c.is_whitespace(), token_start) {
            (false, None) => token_start = Some(start + i),
            (true, Some(s)) => {
                out.push((s, start + i));
                token_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = token_start {
        out.push((s, end));
    }
    out
}

const MAX_NAME_TOKENS: usize = 4;

/// Split a capitalised run into name candidates.
///
/// Role labels and boilerplate words break the run; each remaining
/// stretch of `min_tokens..=MAX_NAME_TOKENS` words is a candidate.
fn name_runs(text: &str, start: usize, end: usize, min_tokens: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut current: Vec<(usize, usize)> = Vec::new();

    let mut flush = |current: &mut Vec<(usize, usize)>| {
        if (min_tokens.max(1)..=MAX_NAME_TOKENS).contains(&current.len()) {
            if let (Some(first), Some(last)) = (current.first(), current.last()) {
                runs.push((first.0, last.1));
            }
        }
        current.clear();
    };

    for (s, e) in tokens(text, start, end) {
        if patterns::is_common_word(&text[s..e]) {
            flush(&mut current);
        } else {
            current.push((s, e));
        }
    }
    flush(&mut current);
    runs
}

const CORPORATE_SUFFIXES: &[&str] = &[
    "inc", "corp", "co", "ltd", "pvt", "llc", "llp", "plc", "gmbh", "limited", "corporation",
    "company", "bank", "associates", "enterprises", "industries", "holdings", "group",
    "foundation", "trust", "partners", "solutions", "technologies", "agency", "society", "&",
];

pub(crate) fn is_corporate_suffix(word: &str) -> bool {
    let word = word.trim_end_matches('.').to_lowercase();
    CORPORATE_SUFFIXES.contains(&word.as_str())
}

/// Drop leading boilerplate ("The", "Contact") from an organization match;
/// keep it only if a distinctive word remains.
fn organization_range(text: &str, start: usize, end: usize) -> Option<(usize, usize)> {
    let toks = tokens(text, start, end);
    let first = toks
        .iter()
        .position(|&(s, e)| !patterns::is_common_word(&text[s..e]))?;
    let kept = &toks[first..];
    let distinctive = kept.iter().any(|&(s, e)| {
        let word = &text[s..e];
        !is_corporate_suffix(word) && !patterns::is_common_word(word)
    });
    if !distinctive {
        return None;
    }
    Some((kept[0].0, end))
}

/// Request sent to a text-generation backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// An external text-generation service (LLM) used as the classifier.
///
/// Implementations own transport, timeouts and cancellation.
pub trait TextGenerationBackend: Send + Sync {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, ClassifierError>;
}

impl<F> TextGenerationBackend for F
where
    F: Fn(&GenerationRequest) -> std::result::Result<String, ClassifierError> + Send + Sync,
{
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, ClassifierError> {
        self(request)
    }
}

/// Expected reply shape from the model
#[derive(Debug, Deserialize)]
struct FindingsReply {
    #[serde(alias = "maskedEntities", alias = "findings")]
    entities: Vec<RawFinding>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFinding {
    #[serde(alias = "category", alias = "entity_type")]
    entity_type: String,
    #[serde(alias = "text", alias = "original_text")]
    original_text: String,
}

/// Classifier backed by a generative model.
///
/// Issues exactly one request per document; no retries.
pub struct GenerativeClassifier<B> {
    backend: B,
    temperature: f32,
}

impl<B: TextGenerationBackend> GenerativeClassifier<B> {
    pub fn new(backend: B, config: &MaskingConfig) -> Self {
        Self {
            backend,
            temperature: config.temperature,
        }
    }

    pub fn request_for(&self, text: &str) -> GenerationRequest {
        GenerationRequest {
            system: taxonomy_prompt(),
            prompt: format!(
                "Identify every sensitive entity in the following document:\n\n{}",
                text
            ),
            temperature: self.temperature,
        }
    }
}

impl<B: TextGenerationBackend> EntityClassifier for GenerativeClassifier<B> {
    fn classify(&self, text: &str) -> std::result::Result<Vec<DetectedSpan>, ClassifierError> {
        let request = self.request_for(text);
        let response = self.backend.generate(&request).map_err(|e| {
            warn!(error = %e, "text generation backend failed");
            e
        })?;

        let reply = parse_reply(&response)?;
        debug!(findings = reply.entities.len(), "model classifier replied");

        let mut seen = HashSet::new();
        let mut spans = Vec::new();
        for finding in reply.entities {
            let value = finding.original_text.trim();
            if value.is_empty() {
                continue;
            }
            let category = EntityCategory::from_label(&finding.entity_type, value)
                .ok_or_else(|| ClassifierError::UnknownCategory(finding.entity_type.clone()))?;
            if !seen.insert((category, value.to_string())) {
                continue;
            }

            let occurrences = find_whole_word(text, value);
            if occurrences.is_empty() {
                return Err(ClassifierError::FindingNotInText {
                    category: category.as_str().to_string(),
                });
            }
            spans.extend(
                occurrences
                    .into_iter()
                    .map(|start| DetectedSpan::from_range(text, category, start, start + value.len())),
            );
        }

        Ok(spans)
    }
}

fn parse_reply(response: &str) -> std::result::Result<FindingsReply, ClassifierError> {
    serde_json::from_str(response)
        .or_else(|_| {
            // Models often wrap JSON in a markdown code block
            let json_str = response
                .trim()
                .trim_start_matches("```json")
                .trim_start_matches("```")
                .trim_end_matches("```")
                .trim();
            serde_json::from_str(json_str)
        })
        .map_err(ClassifierError::from)
}

/// Byte offsets of `needle` in `haystack` that are not glued to
/// surrounding letters or digits.
pub(crate) fn find_whole_word(haystack: &str, needle: &str) -> Vec<usize> {
    let word_edge = |c: Option<char>| c.map_or(true, |c| !c.is_alphanumeric());
    let needs_left = needle.chars().next().is_some_and(char::is_alphanumeric);
    let needs_right = needle.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack
        .match_indices(needle)
        .filter(|(start, _)| {
            let end = start + needle.len();
            (!needs_left || word_edge(haystack[..*start].chars().next_back()))
                && (!needs_right || word_edge(haystack[end..].chars().next()))
        })
        .map(|(start, _)| start)
        .collect()
}

/// System prompt describing the entity taxonomy and the reply format.
pub fn taxonomy_prompt() -> String {
    let categories = [
        ("PERSON_NAME", "names of individuals: full names, first names, surnames, initials"),
        ("ORGANIZATION", "company, business, firm and partnership names"),
        ("ADDRESS", "street addresses, house and building numbers, localities, cities, postal codes"),
        ("LAND_DETAIL", "survey, plot, property and cadastral numbers; extent or area measurements"),
        ("PHONE_NUMBER", "phone, mobile and landline numbers with or without country code"),
        ("EMAIL", "email addresses"),
        ("ID_NUMBER", "national ID, tax ID, passport, driving licence, voter ID, business registration numbers"),
        ("ACCOUNT_NUMBER", "bank account numbers, routing, sort and IFSC codes, card numbers"),
        ("AMOUNT", "monetary amounts, rents, deposits, salaries"),
        ("DATE_OF_BIRTH", "dates that are birth dates (never contract or effective dates)"),
        ("SIGNATURE", "references to signatures or thumb impressions"),
    ];

    let mut prompt = String::from(
        "You are a data privacy specialist reviewing legal documents. \
         List every span of sensitive information in the document.\n\nCATEGORIES:\n",
    );
    for (name, description) in categories {
        prompt.push_str(&format!("- {}: {}\n", name, description));
    }
    prompt.push_str(
        "\nRULES:\n\
         - Report each distinct value once, copied exactly as it appears in the document.\n\
         - Do not report generic roles such as Landlord, Tenant, Lessee or Lessor.\n\
         - Do not report legal terminology, clause headings or standard legal language.\n\
         - Do not report contract or effective dates.\n\
         \nReply with JSON only, in the form:\n\
         {\"entities\": [{\"entityType\": \"PERSON_NAME\", \"originalText\": \"...\"}]}\n",
    );
    prompt
}
