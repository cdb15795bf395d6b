//! Fitted parameters.
//!
//! Everything the pipeline learns from training data lives in one flat,
//! serializable record keyed by column name. `BTreeMap`s keep the serialized
//! form stable across runs.

use crate::encoders::LabelVocabulary;
use crate::error::{PreprocessingError, Result};
use crate::schema::{BOOLEAN_COLUMNS, CATEGORICAL_COLUMNS, EXPENSE_COLUMNS, MEDIAN_COLUMNS, SCALED_COLUMNS, AGE};
use crate::transforms::{QuantileBins, StandardScaler};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statistics and vocabularies learned at fit time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FittedParameters {
    /// Fill value per boolean-as-float column.
    pub modes: BTreeMap<String, f64>,
    /// Fill value per continuous column.
    pub medians: BTreeMap<String, f64>,
    /// Mean/scale pair per standardized column.
    pub scalers: BTreeMap<String, StandardScaler>,
    /// Label vocabulary per categorical column.
    pub vocabularies: BTreeMap<String, LabelVocabulary>,
    /// Quantile edges per binned column.
    pub bins: BTreeMap<String, QuantileBins>,
}

impl FittedParameters {
    pub fn mode(&self, column: &str) -> Result<f64> {
        lookup(&self.modes, "mode", column).copied()
    }

    pub fn median(&self, column: &str) -> Result<f64> {
        lookup(&self.medians, "median", column).copied()
    }

    pub fn scaler(&self, column: &str) -> Result<&StandardScaler> {
        lookup(&self.scalers, "scaler", column)
    }

    pub fn vocabulary(&self, column: &str) -> Result<&LabelVocabulary> {
        lookup(&self.vocabularies, "vocabulary", column)
    }

    pub fn bins(&self, column: &str) -> Result<&QuantileBins> {
        lookup(&self.bins, "bin edges", column)
    }

    /// Check that a record (typically one loaded from disk) is complete and
    /// internally consistent.
    pub fn validate(&self) -> Result<()> {
        for column in BOOLEAN_COLUMNS {
            check_finite("mode", column, self.mode(column)?)?;
        }
        for column in MEDIAN_COLUMNS {
            check_finite("median", column, self.median(column)?)?;
        }
        for column in SCALED_COLUMNS {
            self.scaler(column)?
                .validate()
                .map_err(|reason| invalid("scaler", column, &reason))?;
        }
        for column in CATEGORICAL_COLUMNS {
            self.vocabulary(column)?
                .validate()
                .map_err(|reason| invalid("vocabulary", column, &reason))?;
        }
        for column in EXPENSE_COLUMNS.into_iter().chain([AGE]) {
            self.bins(column)?
                .validate()
                .map_err(|reason| invalid("bin edges", column, &reason))?;
        }
        Ok(())
    }
}

fn lookup<'a, T>(map: &'a BTreeMap<String, T>, kind: &str, column: &str) -> Result<&'a T> {
    map.get(column).ok_or_else(|| {
        PreprocessingError::InvalidParameters(format!("no {} recorded for '{}'", kind, column))
    })
}

fn check_finite(kind: &str, column: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(kind, column, "value is not finite"))
    }
}

fn invalid(kind: &str, column: &str, reason: &str) -> PreprocessingError {
    PreprocessingError::InvalidParameters(format!("{} for '{}': {}", kind, column, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entry_is_invalid_parameters() {
        let params = FittedParameters::default();
        let err = params.median("age").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PARAMETERS");
        assert!(err.to_string().contains("'age'"));
    }

    #[test]
    fn test_empty_record_fails_validation() {
        assert!(FittedParameters::default().validate().is_err());
    }
}
