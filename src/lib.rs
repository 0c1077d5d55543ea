// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Sensitive data masking for legal documents
// Usable as a Rust library or, with the `python` feature, through PyO3

pub mod sensitive_data;

pub use sensitive_data::{mask, MaskingConfig, MaskingError, MaskingResult, SensitiveDataMasker};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module: sensitive_masking
///
/// # Examples
///
/// ```python
/// from sensitive_masking import SensitiveDataMaskerRust, DetectionUnavailableError
///
/// masker = SensitiveDataMaskerRust({"alias_matching": True})
///
/// result = masker.mask("John Smith lives at 123 Main St. Contact John at john@example.com.")
/// print(result["maskedText"])
/// # "[PERSON_NAME_1] lives at [ADDRESS_1]. Contact [PERSON_NAME_1] at [EMAIL_1]."
///
/// for entity in result["maskedEntities"]:
///     print(entity["entityType"], entity["maskedText"])
/// ```
#[cfg(feature = "python")]
#[pymodule]
fn sensitive_masking(m: &Bound<'_, pyo3::types::PyModule>) -> PyResult<()> {
    use sensitive_data::error::{DetectionUnavailableError, InvalidInputError, OverlapConflictError};

    m.add_class::<sensitive_data::SensitiveDataMaskerRust>()?;

    let py = m.py();
    m.add("InvalidInputError", py.get_type::<InvalidInputError>())?;
    m.add(
        "DetectionUnavailableError",
        py.get_type::<DetectionUnavailableError>(),
    )?;
    m.add("OverlapConflictError", py.get_type::<OverlapConflictError>())?;

    // Module metadata
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add(
        "__doc__",
        "Sensitive data masking with stable numbered placeholders",
    )?;

    Ok(())
}
