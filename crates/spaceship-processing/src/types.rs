//! Data exchanged with the pipeline's collaborators.

use crate::error::{PreprocessingError, Result};
use crate::utils::parse_boolean_string;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Output of `fit_transform` / `transform`.
///
/// `features` has the fixed pipeline column order and no nulls. `labels` is
/// the label column exactly as it arrived, when the input carried one.
#[derive(Debug, Clone)]
pub struct ProcessedFrame {
    pub features: DataFrame,
    pub labels: Option<Series>,
}

impl ProcessedFrame {
    /// Feature names in column order.
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Copy the features into a dense row-major matrix.
    pub fn to_matrix(&self) -> Result<FeatureMatrix> {
        let n_rows = self.features.height();
        let n_cols = self.features.width();
        let mut values = vec![0.0; n_rows * n_cols];

        for (c, column) in self.features.get_columns().iter().enumerate() {
            let series = column.as_materialized_series().cast(&DataType::Float64)?;
            for (r, value) in series.f64()?.into_iter().enumerate() {
                values[r * n_cols + c] = value.ok_or_else(|| {
                    PreprocessingError::Schema(format!(
                        "feature '{}' has a null at row {}",
                        column.name(),
                        r
                    ))
                })?;
            }
        }

        Ok(FeatureMatrix {
            feature_names: self.feature_names(),
            n_rows,
            values,
        })
    }

    /// Labels as booleans, for handing to a [`Classifier`].
    ///
    /// Accepts boolean, boolean-like string, and numeric label columns.
    pub fn label_vector(&self) -> Result<Vec<bool>> {
        let labels = self.labels.as_ref().ok_or_else(|| {
            PreprocessingError::Schema("input carried no label column".to_string())
        })?;

        let parsed: Vec<Option<bool>> = match labels.dtype() {
            DataType::Boolean => labels.bool()?.into_iter().collect(),
            DataType::String => labels
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_boolean_string).map(|f| f == 1.0))
                .collect(),
            _ => labels
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.map(|f| f != 0.0))
                .collect(),
        };

        parsed
            .into_iter()
            .enumerate()
            .map(|(i, v)| {
                v.ok_or_else(|| {
                    PreprocessingError::Schema(format!("label at row {} is missing or not boolean", i))
                })
            })
            .collect()
    }
}

/// Dense row-major feature matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub feature_names: Vec<String>,
    pub n_rows: usize,
    pub values: Vec<f64>,
}

impl FeatureMatrix {
    pub fn n_cols(&self) -> usize {
        self.feature_names.len()
    }

    /// Values of row `i`.
    pub fn row(&self, i: usize) -> &[f64] {
        let n_cols = self.n_cols();
        &self.values[i * n_cols..(i + 1) * n_cols]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks(self.n_cols().max(1)).take(self.n_rows)
    }

    /// Index of a named feature.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.feature_names.iter().position(|n| n == name)
    }
}

/// A binary classifier consuming the pipeline's output.
///
/// The learning algorithm itself lives outside this crate; implementors only
/// need to honour this contract.
pub trait Classifier {
    /// Train on a feature matrix and a parallel label vector.
    fn fit(&mut self, features: &FeatureMatrix, labels: &[bool]) -> Result<()>;

    /// Predict one label per row.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<bool>>;
}

/// Summary of a train/validate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub train_rows: usize,
    pub validation_rows: usize,
    pub n_features: usize,
    pub validation_accuracy: f64,
}
