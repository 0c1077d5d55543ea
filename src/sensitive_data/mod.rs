// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Sensitive data masking for legal documents
//
// Pipeline: tag → resolve identities → render placeholders → report
// - RegexSet prefiltering in the built-in rule classifier
// - Pluggable classification capability (rules or a generative model)
// - Offset-based substitution; text outside spans is preserved byte for byte

pub mod classifier;
pub mod config;
pub mod detector;
pub mod error;
pub mod masking;
pub mod patterns;
pub mod resolver;
pub mod tagger;
pub mod types;

pub use classifier::{
    EntityClassifier, GenerationRequest, GenerativeClassifier, RuleBasedClassifier,
    TextGenerationBackend,
};
pub use config::{CustomPattern, MaskingConfig};
pub use detector::{mask, SensitiveDataMasker};
#[cfg(feature = "python")]
pub use detector::SensitiveDataMaskerRust;
pub use error::{ClassifierError, MaskingError, Result};
pub use types::{
    DetectedSpan, EntityCategory, EntityGroup, FinancialKind, MaskedEntityRecord, MaskingResult,
};
