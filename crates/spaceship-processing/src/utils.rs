//! Shared utilities for the feature pipeline.
//!
//! Column extraction helpers read polars columns as Float64 or String with
//! the pipeline's null conventions; the statistics helpers wrap the polars
//! aggregations the fit-time parameters are computed with.

use crate::error::{PreprocessingError, Result};
use polars::prelude::*;

// =============================================================================
// Column Extraction Utilities
// =============================================================================

/// Read a column as Float64.
///
/// Non-numeric strings and NaN become null. An infinite value is a schema
/// error.
pub fn float_column(df: &DataFrame, name: &str) -> Result<Float64Chunked> {
    let series = df.column(name)?.as_materialized_series().cast(&DataType::Float64)?;
    let values = series.f64()?;

    if let Some(row) = values
        .into_iter()
        .position(|v| v.is_some_and(f64::is_infinite))
    {
        return Err(PreprocessingError::Schema(format!(
            "column '{}' has a non-finite value at row {}",
            name, row
        )));
    }

    let cleaned: Float64Chunked = values
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(cleaned.with_name(name.into()))
}

/// Read a column as optional floats, with the conventions of [`float_column`].
pub fn column_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(float_column(df, name)?.into_iter().collect())
}

/// Read a column as optional strings; non-string values use their string form.
pub fn column_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = df.column(name)?.as_materialized_series().cast(&DataType::String)?;
    Ok(series
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Read a boolean-like column as optional 0.0 / 1.0 floats.
///
/// Booleans map directly, strings go through [`parse_boolean_string`], and
/// numeric columns are cast as-is.
pub fn column_bool_as_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = df.column(name)?.as_materialized_series();
    match series.dtype() {
        DataType::Boolean => Ok(series
            .bool()?
            .into_iter()
            .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
            .collect()),
        DataType::String => Ok(series
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_boolean_string))
            .collect()),
        _ => column_f64(df, name),
    }
}

/// Build a Float64 series from optional values.
pub fn optional_f64_series(name: &str, values: Vec<Option<f64>>) -> Series {
    Series::new(name.into(), values)
}

/// Build a Float64 series from dense values.
pub fn f64_series(name: &str, values: Vec<f64>) -> Series {
    Series::new(name.into(), values)
}

/// Return a copy of `df` with `series` added or replaced.
pub fn with_series(df: &DataFrame, series: Series) -> Result<DataFrame> {
    let mut out = df.clone();
    out.with_column(series)?;
    Ok(out)
}

// =============================================================================
// Statistics Utilities
// =============================================================================

/// Linear-interpolated quantile of the non-null values.
///
/// Position `q * (n - 1)` is interpolated between its neighbours, the
/// pandas/numpy default.
pub fn quantile(values: &Float64Chunked, q: f64) -> Result<Option<f64>> {
    Ok(values.quantile(q.clamp(0.0, 1.0), QuantileMethod::Linear)?)
}

/// Median of the non-null values.
pub fn median(values: &Float64Chunked) -> Option<f64> {
    values.median()
}

/// Mean and population standard deviation (ddof = 0) of the non-null values.
pub fn mean_std(values: &Float64Chunked) -> Option<(f64, f64)> {
    Some((values.mean()?, values.std(0)?))
}

/// Most frequent non-null value; ties go to the value encountered first.
pub fn first_mode(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for v in values.into_iter().flatten() {
        match counts.iter_mut().find(|(seen, _)| seen.to_bits() == v.to_bits()) {
            Some((_, count)) => *count += 1,
            None => counts.push((v, 1)),
        }
    }

    let mut best: Option<(f64, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

// =============================================================================
// Boolean Parsing Utilities
// =============================================================================

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 5] = ["true", "yes", "1", "t", "y"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 5] = ["false", "no", "0", "f", "n"];

/// Parse a boolean-like string into 1.0 / 0.0.
pub fn parse_boolean_string(s: &str) -> Option<f64> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.contains(&lower.as_str()) {
        Some(1.0)
    } else if BOOLEAN_FALSE_VALUES.contains(&lower.as_str()) {
        Some(0.0)
    } else {
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
