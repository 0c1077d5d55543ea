// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Regex pattern compilation for sensitive entity detection
// Uses RegexSet to skip rules that cannot match a document at all

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use std::collections::HashSet;

use super::config::MaskingConfig;
use super::error::{MaskingError, Result};
use super::types::{EntityCategory, FinancialKind};

/// Compiled pattern with metadata
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub category: EntityCategory,
    pub regex: Regex,
    /// Minimum number of name tokens a person/organization match must keep
    /// after role labels and boilerplate words are trimmed away
    pub min_tokens: usize,
    /// Matches that start inside a clause heading are discarded
    pub skip_headings: bool,
    pub description: String,
}

impl CompiledPattern {
    /// Byte range of the sensitive value within a match.
    ///
    /// Labelled rules capture the value in a `value` group so that the label
    /// itself ("Passport No:", "Mr.") stays readable.
    pub fn value_range(&self, caps: &regex::Captures<'_>) -> Option<(usize, usize)> {
        caps.name("value")
            .or_else(|| caps.get(0))
            .map(|m| (m.start(), m.end()))
    }
}

/// All compiled patterns with RegexSet for prefiltering
pub struct CompiledPatterns {
    pub regex_set: RegexSet,
    pub patterns: Vec<CompiledPattern>,
}

/// Pattern definitions (pattern, description, min name tokens, skip headings)
type PatternDef = (&'static str, &'static str, usize, bool);

// Email patterns
static EMAIL_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        "Email address",
        0,
        false,
    )]
});

// Phone patterns (North American, international, short local)
static PHONE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"(?:^|[^\w+])(?P<value>(?:\+\d{1,3}[-.\s]?)?(?:\(\d{3}\)|\d{3})[-.\s]?\d{3}[-.\s]?\d{4})\b",
            "Ten digit phone number",
            0,
            false,
        ),
        (
            r"(?:^|[^\w+])(?P<value>\+[1-9]\d{0,3}[-.\s]?\d{4,5}[-.\s]?\d{4,6})\b",
            "International phone number",
            0,
            false,
        ),
        (r"\b\d{3}-\d{4}\b", "Local phone number", 0, false),
    ]
});

// Government and business identifiers
static ID_NUMBER_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (r"\b\d{3}-\d{2}-\d{4}\b", "US Social Security Number", 0, false),
        (r"\b[2-9]\d{3}\s\d{4}\s\d{4}\b", "Aadhaar number", 0, false),
        (r"\b[A-Z]{5}\d{4}[A-Z]\b", "PAN", 0, false),
        (
            r"\b\d{2}[A-Z]{5}\d{4}[A-Z][A-Z\d]Z[A-Z\d]\b",
            "GSTIN",
            0,
            false,
        ),
        (
            r"(?i)\b(?:passport|driver'?s?\s+licen[cs]e|driving\s+licen[cs]e|licen[cs]e|DL|voter\s+id|EPIC|national\s+id|tax\s+id|TIN|EIN|SSN|aadhaa?r|PAN|GSTIN|GST|CIN|business\s+registration|registration)\s*(?:no\.?|number|#|id)?\s*[:#.-]?\s*(?P<value>[A-Z0-9][A-Z0-9-]{4,19})\b",
            "Labelled identification number",
            0,
            false,
        ),
    ]
});

// Account numbers, routing codes and card numbers
static ACCOUNT_NUMBER_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"(?i)\b(?:a/c|acct\.?|account|iban|routing|aba)\s*(?:no\.?|number|#|code)?\s*[:#.-]?\s*(?P<value>\d(?:[ -]?\d){5,33})\b",
            "Labelled account number",
            0,
            false,
        ),
        (
            r"(?i)\bsort\s+code\s*[:#.-]?\s*(?P<value>\d{2}-\d{2}-\d{2})\b",
            "UK sort code",
            0,
            false,
        ),
        (r"\b[A-Z]{4}0[A-Z0-9]{6}\b", "IFSC code", 0, false),
        (
            r"\b[A-Z]{2}\d{2}[A-Z0-9]{4}\d{7}[A-Z0-9]{0,16}\b",
            "IBAN",
            0,
            false,
        ),
        (r"\b(?:\d{4}[-\s]?){3}\d{4}\b", "Card number", 0, false),
    ]
});

// Monetary amounts
static AMOUNT_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"(?:[$€£₹¥]\s?|\b(?:Rs|INR|USD|EUR|GBP)\.?\s?)(?:\d{1,3}(?:,\d{2,3})+|\d+)(?:\.\d{1,2})?(?:\s?(?:lakhs?|crores?|million|billion|thousand)\b)?(?:/-)?",
            "Amount with currency marker",
            0,
            false,
        ),
        (
            r"\b(?:\d{1,3}(?:,\d{2,3})+|\d+)(?:\.\d{1,2})?\s(?i:dollars|rupees|euros|pounds)\b",
            "Amount with currency word",
            0,
            false,
        ),
    ]
});

// Only dates introduced as birthdates; contract dates stay readable
static DOB_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"(?i)\b(?:date\s+of\s+birth|birth\s*date|d\.?o\.?b\.?|born\s+on|born|birthday)\s*(?:is|:|-)?\s*(?P<value>\d{4}-\d{2}-\d{2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{1,2}(?:st|nd|rd|th)?\s+(?:of\s+)?(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?,?\s+\d{4}|(?:jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4})",
        "Labelled date of birth",
        0,
        false,
    )]
});

// Survey, plot and parcel identifiers plus land extents
static LAND_DETAIL_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"(?i)\b(?:survey|sy\.?|plot|khasra|khata|khatian|patta|cadastral|parcel|lot|property|gat|cts|sub-?division)\s*(?:no\.?|nos\.?|number|#|id)\s*[:#.-]?\s*(?P<value>[A-Z0-9][A-Z0-9/-]*)",
            "Survey or plot number",
            0,
            false,
        ),
        (
            r"(?i)\b\d+(?:[.,]\d+)?\s*(?:sq\.?\s*(?:ft|feet|m|mtrs?|yds?|yards|metres|meters)\.?|square\s+(?:feet|foot|metres|meters|yards)|acres?|hectares?|cents|guntas?|bighas?|marlas?|kanals?)\b",
            "Land extent",
            0,
            false,
        ),
    ]
});

// Street addresses, unit numbers and postal codes
static ADDRESS_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"\b\d{1,5}[A-Za-z]?(?:[,/-]\d+)?\s+(?:[A-Z][A-Za-z'.-]*\s+){1,4}(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Lane|Ln|Drive|Dr|Court|Ct|Way|Place|Pl|Terrace|Parkway|Pkwy|Highway|Hwy|Circle|Cir|Square|Sq|Nagar|Marg|Colony|Layout)\b(?:,\s*(?:Apt|Apartment|Suite|Ste|Unit|Flat|Floor)\.?\s*#?\s*[A-Za-z0-9-]+)?(?:,\s*[A-Z][a-z]+(?:\s[A-Z][a-z]+)?){0,2}(?:,?\s+[A-Z]{2}\b)?(?:,?\s+\d{5}(?:-\d{4})?\b)?",
            "Street address",
            0,
            false,
        ),
        (
            r"(?i:residing\s+at|resident\s+of|lives\s+at|living\s+at|situated\s+at|located\s+at|r/o)\s*[:,]?\s*(?P<value>(?:\d|[A-Z])[^\n;()]{5,120}?)(?:[;\n(]|\.\s|\.$|$|,\s+\p{Ll}|,?\s+(?:with|and|who|which|where|whose|being|having|hereinafter|represented|aged|along|since|shall|will|is|are|was|has|have|pays?|holds?|signs?)\b)",
            "Address introduced by a residence phrase",
            0,
            false,
        ),
        (
            r"(?i)\b(?:house|flat|door|apartment|apt|unit|suite)\s*(?:no\.?|number|#)\s*[:#.-]?\s*(?P<value>[A-Z0-9][A-Z0-9/-]*)",
            "House or unit number",
            0,
            false,
        ),
        (
            r"(?i)\b(?:pin\s*code|pincode|pin|zip\s*code|zip|postal\s+code)\s*[:#.-]?\s*(?P<value>\d{3}\s?\d{3}|\d{5}(?:-\d{4})?)\b",
            "Postal code",
            0,
            false,
        ),
    ]
});

// Signature blocks and thumb impressions
static SIGNATURE_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"/s/\s*\p{Lu}[\w.'-]*(?:\s+\p{Lu}[\w.'-]*){0,3}",
            "Electronic signature",
            0,
            false,
        ),
        (
            r"\bSd/-(?:\s*\p{Lu}\p{Ll}+(?:\s+\p{Lu}\p{Ll}+){0,2})?",
            "Signed copy marker",
            0,
            false,
        ),
        (
            r"(?i)\b(?:(?:left|right)\s+)?thumb\s*(?:impressions?|prints?)\b",
            "Thumb impression",
            0,
            false,
        ),
        (r"\b(?:LTI|RTI)\b", "Thumb impression abbreviation", 0, false),
        (
            r"(?i)\[\s*(?:signature|signed|thumb\s*impression)\s*\]",
            "Signature marker",
            0,
            false,
        ),
        (
            r"(?i)\b(?:digital\s+)?signature\s*(?:id|ref(?:erence)?|no\.?|number|#)\s*[:#.-]?\s*(?P<value>[A-Z0-9][A-Z0-9-]{3,})",
            "Signature reference",
            0,
            false,
        ),
    ]
});

// Company and firm names ending in a corporate suffix
static ORGANIZATION_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![(
        r"\b(?:(?:\p{Lu}[\w&'.-]*|&)[ \t]+){1,5}(?:(?:Inc|Corp|Co|Ltd|Pvt)\b\.?|(?:LLC|LLP|PLC|GmbH|Limited|Corporation|Company|Bank|Associates|Enterprises|Industries|Holdings|Group|Foundation|Trust|Partners|Solutions|Technologies|Agency|Society)\b)(?:\s+(?:Ltd|Limited|LLC|Inc)\b\.?)?",
        "Organization with corporate suffix",
        1,
        true,
    )]
});

// Person names, contextual cues first, bare capitalised runs last
static PERSON_NAME_PATTERNS: Lazy<Vec<PatternDef>> = Lazy::new(|| {
    vec![
        (
            r"\b(?:Mr|Mrs|Ms|Miss|Mx|Dr|Prof|Shri|Sri|Smt|Kumari|Late|Sir|Madam)\.?[ \t]+(?P<value>\p{Lu}[\p{L}'-]+(?:[ \t]+\p{Lu}\.)?(?:[ \t]+\p{Lu}[\p{L}'-]+){0,3})",
            "Name after honorific",
            1,
            false,
        ),
        (
            r"(?:\b[SDWC]/[Oo]|\b(?i:son|daughter|wife|husband|widow)\s+of)\s*[:.]?\s*(?:(?:Mr|Mrs|Shri|Late|Smt)\.?\s+)?(?P<value>\p{Lu}[\p{L}'-]+(?:[ \t]+\p{Lu}[\p{L}'-]+){0,3})",
            "Name after relationship marker",
            1,
            false,
        ),
        (
            r"\b(?i:(?:full\s+)?name|signed\s+by|witness(?:ed)?\s+by|executed\s+by|attention|attn\.?)[ \t]*[:-]?[ \t]*(?P<value>\p{Lu}[\p{L}'-]+(?:[ \t]+\p{Lu}\.)?(?:[ \t]+\p{Lu}[\p{L}'-]+){0,3})",
            "Labelled name",
            1,
            false,
        ),
        (
            r"\b\p{Lu}[\p{Ll}']+(?:\p{Lu}\p{Ll}+)?(?:[ \t]+\p{Lu}\.)?(?:[ \t]+\p{Lu}[\p{Ll}']+(?:\p{Lu}\p{Ll}+)?(?:-\p{Lu}\p{Ll}+)?){1,4}\b",
            "Capitalised full name",
            2,
            true,
        ),
    ]
});

/// Existing placeholder tokens such as `[PERSON_NAME_1]`; never re-detected.
pub static PLACEHOLDER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[A-Z]+(?:_[A-Z]+)*_\d+\]").expect("placeholder regex is valid"));

/// Numbering or section keyword that opens a clause heading.
static HEADING_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:\d+(?:\.\d+)*[.)]?|[IVXLC]+[.)]|\((?:[a-z]|[ivx]+)\)|(?i:section|clause|article|schedule|annexure|exhibit|part|recital)s?\b(?:[ \t]+(?:\d+(?:\.\d+)*|[IVXLC]+|[A-Z])\b[.):]?)?)[ \t]+",
    )
    .expect("heading marker regex is valid")
});

/// Generic party and role labels that stay readable even when capitalised.
static ROLE_LABELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "landlord", "landlords", "tenant", "tenants", "lessee", "lessees", "lessor", "lessors",
        "licensor", "licensors", "licensee", "licensees", "buyer", "buyers", "seller", "sellers",
        "vendor", "vendors", "vendee", "vendees", "purchaser", "purchasers", "owner", "owners",
        "occupant", "occupants", "employer", "employers", "employee", "employees", "borrower",
        "borrowers", "lender", "lenders", "guarantor", "guarantors", "surety", "mortgagor",
        "mortgagee", "assignor", "assignee", "contractor", "contractors", "subcontractor",
        "consultant", "client", "clients", "customer", "customers", "provider", "party",
        "parties", "witness", "witnesses", "executant", "executants", "donor", "donee",
        "testator", "beneficiary", "beneficiaries", "trustee", "trustees", "nominee", "agent",
        "principal", "attorney", "director", "directors", "partner", "partners", "manager",
        "company", "firm", "developer", "builder", "broker", "caretaker", "sublessee",
        "sub-lessee", "sublessor", "sub-lessor", "applicant", "plaintiff", "defendant",
        "petitioner", "respondent", "claimant", "notary", "registrar",
    ]
    .into_iter()
    .collect()
});

/// Words that may be capitalised in legal text without naming anyone.
static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // function words and sentence starters
        "the", "this", "that", "these", "those", "a", "an", "and", "or", "of", "in", "on",
        "at", "to", "for", "by", "with", "from", "as", "if", "any", "all", "each", "every",
        "such", "said", "same", "no", "not", "it", "he", "she", "they", "we", "you", "i",
        "his", "her", "their", "our", "your", "its", "who", "which", "where", "when", "upon",
        "under", "over", "after", "before", "between", "during", "within", "without", "until",
        "unless", "also", "both", "either", "neither", "other", "another", "first", "second",
        "third", "last", "yes", "dear", "please", "contact", "call", "email", "phone", "tel",
        "fax", "mobile", "name", "address", "note", "regards", "sincerely", "thanks", "thank",
        "hello", "hi", "subject", "re", "ref", "date", "dated", "place", "signed", "sealed",
        "delivered", "signature", "sd",
        // honorifics
        "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "shri", "sri", "smt", "kumari", "late",
        "sir", "madam", "jr", "sr",
        // boilerplate and headings
        "whereas", "now", "therefore", "hereby", "herein", "hereinafter", "hereto", "hereof",
        "witnesseth", "whereof", "agreement", "agreements", "deed", "lease", "rental", "rent",
        "contract", "schedule", "annexure", "exhibit", "appendix", "clause", "clauses",
        "section", "sections", "article", "articles", "part", "recital", "recitals", "term",
        "terms", "condition", "conditions", "effective", "period", "notice", "notices",
        "payment", "payments", "deposit", "security", "maintenance", "repairs", "repair",
        "termination", "renewal", "governing", "law", "laws", "jurisdiction", "arbitration",
        "dispute", "disputes", "resolution", "indemnity", "indemnification", "liability",
        "confidentiality", "confidential", "force", "majeure", "premises", "property",
        "properties", "total", "amount", "sum", "rupees", "dollars", "utilities", "insurance",
        "default", "remedies", "assignment", "miscellaneous", "entire", "severability",
        "amendment", "amendments", "waiver", "definitions", "interpretation", "obligations",
        "rights", "use", "purpose", "consideration", "possession", "registration", "stamp",
        "duty", "fees", "charges", "taxes", "tax", "interest", "penalty", "late", "fee",
        "inspection", "alterations", "subletting", "sale", "purchase", "loan", "mortgage",
        "power", "general", "special", "memorandum", "understanding", "non", "disclosure",
        "employment", "service", "services", "scope", "work", "deliverables", "compensation",
        "salary", "benefits", "leave", "probation", "non-compete", "intellectual",
        "ownership", "warranties", "representations", "covenants", "execution", "counterparts",
        "signatures", "witnesses", "annex", "table", "contents", "page", "pages", "copy",
        "original", "true", "certified", "notary", "public", "court", "high", "supreme",
        "district", "sub", "office", "government", "state", "states", "united", "union",
        "city", "village", "taluk", "tehsil", "county", "north", "south", "east", "west",
        "new", "old", "main", "street", "road", "avenue", "lane", "india", "america",
        // statutes and instruments
        "act", "acts", "rules", "code", "ordinance", "ordinances", "regulation", "regulations",
        "statute", "statutes", "order", "orders", "notification", "gazette", "constitution",
        "control", "transfer", "tenancy", "tenancies", "real", "estate", "development",
        "authority", "civil", "criminal", "procedure", "penal", "evidence", "limitation",
        "specific", "relief", "contracts", "companies", "partnership", "conciliation",
        "consumer", "protection", "income", "goods", "negotiable", "instrument", "instruments",
        "information", "technology", "model", "housing", "municipal", "registered",
        // calendar
        "january", "february", "march", "april", "may", "june", "july", "august", "september",
        "october", "november", "december", "monday", "tuesday", "wednesday", "thursday",
        "friday", "saturday", "sunday",
    ]
    .into_iter()
    .collect()
});

fn normalize_word(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-')
        .trim_end_matches("'s")
        .to_lowercase()
}

/// Whether `word` is a generic role label such as "Landlord" or "Tenant".
pub fn is_role_label(word: &str) -> bool {
    ROLE_LABELS.contains(normalize_word(word).as_str())
}

/// Whether `word` never contributes to a name on its own.
pub fn is_common_word(word: &str) -> bool {
    let normalized = normalize_word(word);
    normalized.is_empty()
        || ROLE_LABELS.contains(normalized.as_str())
        || COMMON_WORDS.contains(normalized.as_str())
}

/// Lowercase words a heading title may contain ("Terms of Payment").
const TITLE_FILLERS: &[&str] = &["of", "and", "or", "the", "to", "for", "in", "on", "by", "&"];

const MAX_TITLE_WORDS: usize = 8;

/// Whether `offset` falls inside a clause or section heading.
///
/// Only the title itself counts: the text after a clause number up to the
/// first sentence break, or a short line ending in a colon. The title must
/// read like one, mostly boilerplate words and no lowercase verbs, so names
/// in the body of a numbered clause are never covered.
pub fn is_heading(text: &str, offset: usize) -> bool {
    let line_start = text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = text[offset..]
        .find('\n')
        .map(|i| offset + i)
        .unwrap_or(text.len());
    let line = &text[line_start..line_end];

    let (title_start, title) = match HEADING_MARKER.find(line) {
        Some(marker) => {
            let rest = &line[marker.end()..];
            (line_start + marker.end(), &rest[..title_end(rest)])
        }
        None => {
            let trimmed = line.trim_end();
            match trimmed.strip_suffix(':') {
                Some(title) if title_end(title) == title.len() => (line_start, title),
                _ => return false,
            }
        }
    };

    (title_start..=title_start + title.len()).contains(&offset) && reads_as_title(title)
}

/// Byte length of the leading segment before the first sentence break.
fn title_end(segment: &str) -> usize {
    segment
        .char_indices()
        .find(|&(i, c)| {
            matches!(c, '.' | ':' | ';')
                && segment[i + 1..]
                    .chars()
                    .next()
                    .map_or(true, char::is_whitespace)
        })
        .map(|(i, _)| i)
        .unwrap_or(segment.len())
}

fn reads_as_title(title: &str) -> bool {
    let words: Vec<&str> = title.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_TITLE_WORDS {
        return false;
    }

    let mut capitalised = 0;
    let mut boilerplate = 0;
    for word in &words {
        match word.chars().next() {
            Some(c) if c.is_uppercase() => {
                capitalised += 1;
                if is_common_word(word) {
                    boilerplate += 1;
                }
            }
            Some(c) if c.is_lowercase() => {
                if !TITLE_FILLERS.contains(&word.to_lowercase().as_str()) {
                    return false;
                }
            }
            _ => {}
        }
    }
    capitalised > 0 && boilerplate * 2 >= capitalised
}

/// Categories whose values always carry at least one digit.
pub fn requires_digit(category: EntityCategory) -> bool {
    matches!(
        category,
        EntityCategory::PhoneNumber
            | EntityCategory::IdNumber
            | EntityCategory::Financial(_)
            | EntityCategory::DateOfBirth
            | EntityCategory::LandDetail
    )
}

/// Compile the built-in rules plus any custom patterns from the config
pub fn compile_patterns(config: &MaskingConfig) -> Result<CompiledPatterns> {
    let mut pattern_strings = Vec::new();
    let mut patterns = Vec::new();

    // Helper macro to add a rule table under one category
    macro_rules! add_patterns {
        ($category:expr, $pattern_list:expr) => {
            for (pattern, description, min_tokens, skip_headings) in $pattern_list.iter() {
                let regex = Regex::new(pattern).map_err(|e| {
                    MaskingError::Config(format!("Failed to compile pattern '{}': {}", pattern, e))
                })?;
                pattern_strings.push(pattern.to_string());
                patterns.push(CompiledPattern {
                    category: $category,
                    regex,
                    min_tokens: *min_tokens,
                    skip_headings: *skip_headings,
                    description: description.to_string(),
                });
            }
        };
    }

    add_patterns!(EntityCategory::Email, &*EMAIL_PATTERNS);
    add_patterns!(EntityCategory::IdNumber, &*ID_NUMBER_PATTERNS);
    add_patterns!(
        EntityCategory::Financial(FinancialKind::AccountNumber),
        &*ACCOUNT_NUMBER_PATTERNS
    );
    add_patterns!(
        EntityCategory::Financial(FinancialKind::Amount),
        &*AMOUNT_PATTERNS
    );
    add_patterns!(EntityCategory::DateOfBirth, &*DOB_PATTERNS);
    add_patterns!(EntityCategory::LandDetail, &*LAND_DETAIL_PATTERNS);
    add_patterns!(EntityCategory::Address, &*ADDRESS_PATTERNS);
    add_patterns!(EntityCategory::Signature, &*SIGNATURE_PATTERNS);
    add_patterns!(EntityCategory::PhoneNumber, &*PHONE_PATTERNS);
    add_patterns!(EntityCategory::Organization, &*ORGANIZATION_PATTERNS);
    add_patterns!(EntityCategory::PersonName, &*PERSON_NAME_PATTERNS);

    // Add custom patterns
    for custom in &config.custom_patterns {
        if !custom.enabled {
            continue;
        }
        let category = EntityCategory::from_label(&custom.category, "").ok_or_else(|| {
            MaskingError::Config(format!(
                "Unknown category '{}' for custom pattern '{}'",
                custom.category, custom.pattern
            ))
        })?;
        let regex = Regex::new(&custom.pattern).map_err(|e| {
            MaskingError::Config(format!(
                "Failed to compile custom pattern '{}': {}",
                custom.pattern, e
            ))
        })?;
        pattern_strings.push(custom.pattern.clone());
        patterns.push(CompiledPattern {
            category,
            regex,
            min_tokens: 1,
            skip_headings: false,
            description: custom.description.clone(),
        });
    }

    let regex_set = if pattern_strings.is_empty() {
        RegexSet::empty()
    } else {
        RegexSet::new(&pattern_strings)
            .map_err(|e| MaskingError::Config(format!("Failed to compile RegexSet: {}", e)))?
    };

    Ok(CompiledPatterns {
        regex_set,
        patterns,
    })
}

/// Compile whitelist patterns; matching values are never masked
pub fn compile_whitelist(config: &MaskingConfig) -> Result<Vec<Regex>> {
    config
        .whitelist_patterns
        .iter()
        .map(|pattern| {
            regex::RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    MaskingError::Config(format!("Invalid whitelist pattern '{}': {}", pattern, e))
                })
        })
        .collect()
}
