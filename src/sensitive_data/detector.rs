// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Masking pipeline façade with optional PyO3 bindings

use once_cell::sync::OnceCell;
#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::{PyDict, PyList};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::classifier::{EntityClassifier, RuleBasedClassifier};
use super::config::MaskingConfig;
use super::error::Result;
use super::masking::{build_report, render};
use super::resolver::resolve;
use super::tagger::Tagger;
use super::types::{DetectedSpan, EntityGroup, MaskingResult};

static DEFAULT_MASKER: OnceCell<SensitiveDataMasker> = OnceCell::new();

/// Mask `text` with the built-in rule classifier and default configuration.
///
/// # Errors
/// * `InvalidInput` - `text` is empty or whitespace-only
/// * `DetectionUnavailable` - the classifier failed or returned bad spans
/// * `SpanOutOfBounds` - a span does not address `text`
/// * `OverlapConflict` - two spans claim overlapping ranges
pub fn mask(text: &str) -> Result<MaskingResult> {
    DEFAULT_MASKER
        .get_or_try_init(|| SensitiveDataMasker::new(MaskingConfig::default()))?
        .mask(text)
}

/// Runs tag → resolve → render → report for one document at a time.
///
/// Holds only read-only compiled state, so one instance can serve
/// concurrent callers; every call starts its numbering from 1.
pub struct SensitiveDataMasker {
    config: MaskingConfig,
    tagger: Tagger,
    classifier: Box<dyn EntityClassifier>,
}

impl SensitiveDataMasker {
    /// Masker backed by the built-in [`RuleBasedClassifier`]
    pub fn new(config: MaskingConfig) -> Result<Self> {
        let classifier = RuleBasedClassifier::new(&config)?;
        Self::with_classifier(config, classifier)
    }

    /// Masker backed by a caller-supplied classification capability
    pub fn with_classifier<C>(config: MaskingConfig, classifier: C) -> Result<Self>
    where
        C: EntityClassifier + 'static,
    {
        Ok(Self {
            tagger: Tagger::new(&config)?,
            classifier: Box::new(classifier),
            config,
        })
    }

    pub fn config(&self) -> &MaskingConfig {
        &self.config
    }

    /// Tag `text` without masking it.
    pub fn detect(&self, text: &str) -> Result<Vec<DetectedSpan>> {
        self.tagger.tag(text, self.classifier.as_ref())
    }

    /// Mask every sensitive span in `text`.
    ///
    /// All-or-nothing: any failure aborts the call and no partially masked
    /// text is returned.
    pub fn mask(&self, text: &str) -> Result<MaskingResult> {
        let spans = self.detect(text)?;
        debug!(spans = spans.len(), bytes = text.len(), "tagged document");

        let groups = resolve(spans, self.config.alias_matching);
        let masked_text = render(text, &groups)?.into_owned();
        let result = build_report(masked_text, &groups);

        if self.config.log_detections {
            log_summary(&groups, result.masked_entities.len());
        }
        Ok(result)
    }
}

/// Per-placeholder-prefix counts; original values are never logged.
fn log_summary(groups: &[EntityGroup], mentions: usize) {
    let mut per_prefix: BTreeMap<&'static str, usize> = BTreeMap::new();
    for group in groups {
        *per_prefix.entry(group.category.placeholder_prefix()).or_default() += 1;
    }
    info!(
        entities = groups.len(),
        mentions,
        categories = ?per_prefix,
        "masked sensitive entities"
    );
}

/// Masking pipeline exposed to Python
///
/// # Example (Python)
/// ```python
/// from sensitive_masking import SensitiveDataMaskerRust
///
/// masker = SensitiveDataMaskerRust({"exempt_terms": ["Sub-Lessee"]})
/// result = masker.mask("John Smith lives at 123 Main St.")
/// print(result["maskedText"])  # "[PERSON_NAME_1] lives at [ADDRESS_1]."
/// ```
#[cfg(feature = "python")]
#[pyclass(name = "SensitiveDataMaskerRust")]
pub struct SensitiveDataMaskerRust {
    inner: SensitiveDataMasker,
}

#[cfg(feature = "python")]
#[pymethods]
impl SensitiveDataMaskerRust {
    /// Create a masker
    ///
    /// # Configuration Keys
    /// * `alias_matching` (bool): Merge first-name mentions into full names
    /// * `exempt_terms` (list[str]): Terms that are never masked
    /// * `whitelist_patterns` (list[str]): Regex patterns excluded from masking
    /// * `custom_patterns` (list[dict]): `{"pattern", "category", "description", "enabled"}`
    /// * `log_detections` (bool): Emit a per-category summary through tracing
    #[new]
    #[pyo3(signature = (config_dict = None))]
    pub fn new(config_dict: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config_dict {
            Some(dict) => MaskingConfig::from_py_dict(dict)?,
            None => MaskingConfig::default(),
        };
        Ok(Self {
            inner: SensitiveDataMasker::new(config)?,
        })
    }

    /// Mask a document
    ///
    /// # Returns
    /// ```python
    /// {
    ///     "maskedText": "[PERSON_NAME_1] lives at [ADDRESS_1].",
    ///     "maskedEntities": [
    ///         {"entityType": "PERSON_NAME", "originalText": "John Smith", "maskedText": "[PERSON_NAME_1]"},
    ///         ...
    ///     ]
    /// }
    /// ```
    pub fn mask(&self, py: Python<'_>, text: &str) -> PyResult<Py<PyAny>> {
        let result = py.detach(|| self.inner.mask(text))?;

        let py_dict = PyDict::new(py);
        py_dict.set_item("maskedText", result.masked_text)?;

        let py_list = PyList::empty(py);
        for record in result.masked_entities {
            let item_dict = PyDict::new(py);
            item_dict.set_item("entityType", record.entity_type)?;
            item_dict.set_item("originalText", record.original_text)?;
            item_dict.set_item("maskedText", record.masked_text)?;
            py_list.append(item_dict)?;
        }
        py_dict.set_item("maskedEntities", py_list)?;

        Ok(py_dict.into_any().unbind())
    }

    /// Detected spans in document order; `start`/`end` are UTF-8 byte offsets
    pub fn detect(&self, py: Python<'_>, text: &str) -> PyResult<Py<PyAny>> {
        let spans = py.detach(|| self.inner.detect(text))?;

        let py_list = PyList::empty(py);
        for span in spans {
            let item_dict = PyDict::new(py);
            item_dict.set_item("entityType", span.category.as_str())?;
            item_dict.set_item("placeholderPrefix", span.category.placeholder_prefix())?;
            item_dict.set_item("originalText", span.original_text)?;
            item_dict.set_item("start", span.start)?;
            item_dict.set_item("end", span.end)?;
            py_list.append(item_dict)?;
        }

        Ok(py_list.into_any().unbind())
    }
}
