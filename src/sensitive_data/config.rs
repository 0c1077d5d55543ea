// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the masking pipeline

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::{PyDict, PyList};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Extra detection rule supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub pattern: String,
    /// Category label, e.g. `ID_NUMBER` or `ACCOUNT_NUMBER`
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.1
}

/// Configuration for the masking pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskingConfig {
    // Identity resolution
    pub alias_matching: bool,

    // Terms that are never masked, in addition to the built-in role labels
    pub exempt_terms: Vec<String>,

    // Whitelist patterns (regex strings)
    pub whitelist_patterns: Vec<String>,

    // Custom patterns
    pub custom_patterns: Vec<CustomPattern>,

    // Behavior configuration
    pub log_detections: bool,

    // Generative classifier sampling temperature
    pub temperature: f32,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            alias_matching: true,
            exempt_terms: Vec::new(),
            whitelist_patterns: Vec::new(),
            custom_patterns: Vec::new(),
            log_detections: true,
            temperature: default_temperature(),
        }
    }
}

impl MaskingConfig {
    /// Parse configuration from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Exempt terms trimmed and lowercased, blanks dropped.
    pub fn normalized_exempt_terms(&self) -> HashSet<String> {
        self.exempt_terms
            .iter()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect()
    }
}

#[cfg(feature = "python")]
impl MaskingConfig {
    /// Extract configuration from Python dict
    pub fn from_py_dict(dict: &Bound<'_, PyDict>) -> PyResult<Self> {
        let mut config = Self::default();

        macro_rules! extract_field {
            ($field:ident) => {
                if let Some(value) = dict.get_item(stringify!($field))? {
                    config.$field = value.extract()?;
                }
            };
        }

        extract_field!(alias_matching);
        extract_field!(log_detections);
        extract_field!(temperature);
        extract_field!(exempt_terms);
        extract_field!(whitelist_patterns);

        if let Some(value) = dict.get_item("custom_patterns")? {
            let py_list = value.cast::<PyList>()?;
            for item in py_list.iter() {
                let py_dict = item.cast::<PyDict>()?;
                let pattern: String = py_dict
                    .get_item("pattern")?
                    .ok_or_else(|| {
                        pyo3::exceptions::PyValueError::new_err("Missing 'pattern' field")
                    })?
                    .extract()?;
                let category: String = py_dict
                    .get_item("category")?
                    .ok_or_else(|| {
                        pyo3::exceptions::PyValueError::new_err("Missing 'category' field")
                    })?
                    .extract()?;
                let description: String = match py_dict.get_item("description")? {
                    Some(val) => val.extract()?,
                    None => String::new(),
                };
                let enabled: bool = match py_dict.get_item("enabled")? {
                    Some(val) => val.extract()?,
                    None => true,
                };

                config.custom_patterns.push(CustomPattern {
                    pattern,
                    category,
                    description,
                    enabled,
                });
            }
        }

        Ok(config)
    }
}
