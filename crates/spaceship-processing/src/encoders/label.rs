//! Label vocabulary for a single categorical column.

use crate::error::{PreprocessingError, Result};
use crate::utils::{column_strings, f64_series};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Ordered mapping from category string to a dense code, fixed at fit time.
///
/// Labels are the distinct fit-time strings sorted byte-wise ascending; a
/// label's code is its position. Any value outside the vocabulary encodes as
/// 0, the code of the first label.
///
/// Nulls are encoded as the missing token. A real category spelled the same
/// as that token shares its code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    /// Build a vocabulary from raw values, mapping nulls to `missing`.
    pub fn fit(values: &[Option<String>], missing: &str) -> Self {
        let distinct: BTreeSet<&str> = values
            .iter()
            .map(|v| v.as_deref().unwrap_or(missing))
            .collect();
        Self {
            labels: distinct.into_iter().map(str::to_string).collect(),
        }
    }

    /// Build a vocabulary from a column of `df`.
    ///
    /// Fails when the column has no non-null values.
    pub fn fit_column(df: &DataFrame, col_name: &str, missing: &str) -> Result<Self> {
        let values = column_strings(df, col_name)?;
        if values.iter().all(Option::is_none) {
            return Err(PreprocessingError::Schema(format!(
                "column '{}' has no non-null values; vocabulary is undefined",
                col_name
            )));
        }
        if values.iter().flatten().any(|v| v == missing) {
            warn!(
                "Column '{}' has a real '{}' category; it shares a code with nulls",
                col_name, missing
            );
        }

        let vocabulary = Self::fit(&values, missing);
        debug!("Vocabulary for '{}': {:?}", col_name, vocabulary.labels);
        Ok(vocabulary)
    }

    /// Code for `value`; unseen values map to 0.
    pub fn encode(&self, value: &str) -> usize {
        self.labels
            .binary_search_by(|label| label.as_str().cmp(value))
            .unwrap_or(0)
    }

    /// Return a copy of `df` with `col_name` replaced by its Float64 codes.
    pub fn transform_column(&self, df: &DataFrame, col_name: &str, missing: &str) -> Result<DataFrame> {
        let values = column_strings(df, col_name)?;
        let mut unseen = 0usize;
        let codes: Vec<f64> = values
            .iter()
            .map(|v| {
                let value = v.as_deref().unwrap_or(missing);
                if !self.contains(value) {
                    unseen += 1;
                }
                self.encode(value) as f64
            })
            .collect();

        if unseen > 0 {
            debug!(
                "{} unseen values in '{}' fell back to '{}'",
                unseen,
                col_name,
                self.labels.first().map(String::as_str).unwrap_or_default()
            );
        }

        let mut out = df.clone();
        out.with_column(f64_series(col_name, codes))?;
        Ok(out)
    }

    /// Whether `value` was seen at fit time.
    pub fn contains(&self, value: &str) -> bool {
        self.labels
            .binary_search_by(|label| label.as_str().cmp(value))
            .is_ok()
    }

    /// Labels in code order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Check that a deserialized vocabulary is usable for lookups.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.labels.is_empty() {
            return Err("vocabulary is empty".to_string());
        }
        if self.labels.windows(2).any(|w| w[0] >= w[1]) {
            return Err("vocabulary is not strictly ascending".to_string());
        }
        Ok(())
    }
}
