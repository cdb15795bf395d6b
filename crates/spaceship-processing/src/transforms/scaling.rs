//! Standard scaling with frozen statistics.

use crate::error::{PreprocessingError, Result};
use crate::utils::{float_column, mean_std};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Mean and scale learned for one column.
///
/// `scale` is the population standard deviation, or 1.0 when that deviation
/// is exactly zero; a zero-variance column is therefore only centred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    pub scale: f64,
}

impl StandardScaler {
    /// Learn mean and scale; nulls are skipped.
    pub fn fit(values: &Float64Chunked) -> Option<Self> {
        let (mean, std) = mean_std(values)?;
        let scale = if std == 0.0 { 1.0 } else { std };
        Some(Self { mean, scale })
    }

    /// Learn mean and scale from a column that must not contain nulls.
    pub fn fit_column(df: &DataFrame, col_name: &str) -> Result<Self> {
        let values = Self::dense_values(df, col_name)?;
        Self::fit(&values).ok_or_else(|| {
            PreprocessingError::Schema(format!("column '{}' is empty", col_name))
        })
    }

    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    /// Return a copy of `df` with `col_name` standardized.
    pub fn transform_column(&self, df: &DataFrame, col_name: &str) -> Result<DataFrame> {
        let values = Self::dense_values(df, col_name)?;
        let scaled = ((&values - self.mean) / self.scale).with_name(col_name.into());
        let mut out = df.clone();
        out.with_column(scaled.into_series())?;
        Ok(out)
    }

    /// Check that deserialized statistics are usable.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !self.mean.is_finite() || !self.scale.is_finite() {
            return Err("mean and scale must be finite".to_string());
        }
        if self.scale <= 0.0 {
            return Err(format!("scale must be positive, got {}", self.scale));
        }
        Ok(())
    }

    fn dense_values(df: &DataFrame, col_name: &str) -> Result<Float64Chunked> {
        let values = float_column(df, col_name)?;
        if values.null_count() > 0 {
            return Err(PreprocessingError::Schema(format!(
                "column '{}' still has nulls at scaling time",
                col_name
            )));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dense(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("x".into(), values)
    }

    #[test]
    fn test_fit_and_apply() {
        let scaler = StandardScaler::fit(&dense(&[20.0, 30.0])).unwrap();
        assert_eq!(scaler.mean, 25.0);
        assert_eq!(scaler.scale, 5.0);
        assert_eq!(scaler.apply(20.0), -1.0);
        assert_eq!(scaler.apply(30.0), 1.0);
    }

    #[test]
    fn test_zero_variance_only_centres() {
        let scaler = StandardScaler::fit(&dense(&[4.0, 4.0, 4.0])).unwrap();
        assert_eq!(scaler.scale, 1.0);
        assert_eq!(scaler.apply(4.0), 0.0);
        // later data is shifted, not divided
        assert_eq!(scaler.apply(6.5), 2.5);
    }

    #[test]
    fn test_transform_column_uses_frozen_statistics() {
        let train = df!["age" => [10.0, 20.0, 30.0]].unwrap();
        let scaler = StandardScaler::fit_column(&train, "age").unwrap();

        let test = df!["age" => [20.0, 1000.0]].unwrap();
        let out = scaler.transform_column(&test, "age").unwrap();
        let values: Vec<Option<f64>> = out
            .column("age")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values[0], Some(0.0));
        assert!((values[1].unwrap() - (980.0 / scaler.scale)).abs() < 1e-9);
    }

    #[test]
    fn test_nulls_rejected() {
        let df = df!["age" => [Some(1.0), None]].unwrap();
        assert!(StandardScaler::fit_column(&df, "age").unwrap_err().is_schema_error());
    }

    #[test]
    fn test_empty_column_has_no_scaler() {
        assert!(StandardScaler::fit(&dense(&[])).is_none());
    }

    #[test]
    fn test_validate() {
        assert!(StandardScaler { mean: 0.0, scale: 0.0 }.validate().is_err());
        assert!(StandardScaler { mean: f64::NAN, scale: 1.0 }.validate().is_err());
        assert!(StandardScaler { mean: 1.0, scale: 2.0 }.validate().is_ok());
    }
}
