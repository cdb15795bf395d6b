//! Statistical imputation methods.
//!
//! Fitting and filling are separate so the fill value computed on training
//! data can be replayed against any later table.

use crate::error::{PreprocessingError, Result};
use crate::utils::{first_mode, float_column, median};
use polars::prelude::*;
use tracing::debug;

/// Mode and median imputation for numeric columns.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Learn the fill value for a boolean-as-float column.
    ///
    /// Ties go to the value that appears first in the column.
    pub fn fit_mode(df: &DataFrame, col_name: &str) -> Result<f64> {
        let values = float_column(df, col_name)?;
        first_mode(&values).ok_or_else(|| Self::all_null(col_name, "mode"))
    }

    /// Learn the fill value for a continuous column.
    pub fn fit_median(df: &DataFrame, col_name: &str) -> Result<f64> {
        let values = float_column(df, col_name)?;
        median(&values).ok_or_else(|| Self::all_null(col_name, "median"))
    }

    /// Return a copy of `df` with nulls in `col_name` replaced by `fill_value`.
    ///
    /// The column comes back as Float64.
    pub fn fill(df: &DataFrame, col_name: &str, fill_value: f64) -> Result<DataFrame> {
        let values = float_column(df, col_name)?;
        let missing = values.null_count();
        let filled = values.fill_null_with_values(fill_value)?;

        if missing > 0 {
            debug!("Filled {} nulls in '{}' with {:.4}", missing, col_name, fill_value);
        }

        let mut out = df.clone();
        out.with_column(filled.into_series())?;
        Ok(out)
    }

    fn all_null(col_name: &str, statistic: &str) -> PreprocessingError {
        PreprocessingError::Schema(format!(
            "column '{}' has no non-null values; {} is undefined",
            col_name, statistic
        ))
    }
}
