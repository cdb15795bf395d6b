//! Quantile binning.
//!
//! Edges are the linear-interpolated quantiles at `0, 1/n, ..., 1` of the
//! fit-time values (nulls replaced by a fill value), with duplicate edges
//! merged. Bin `i` covers `(e_i, e_{i+1}]`; the first bin also includes its
//! lower edge. Values outside the fitted range clamp to the first or last
//! bin, so binning never produces nulls.

use crate::error::Result;
use crate::utils::{f64_series, float_column, quantile};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Bin edges for one column, fixed at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuantileBins {
    edges: Vec<f64>,
}

impl QuantileBins {
    /// Compute edges from raw values.
    ///
    /// A column with fewer distinct quantiles than `n_bins + 1` simply gets
    /// fewer bins.
    pub fn fit(values: &Float64Chunked, n_bins: usize, null_fill: f64) -> Result<Self> {
        let filled = values.fill_null_with_values(null_fill)?;
        let n_bins = n_bins.max(1);

        let mut edges = Vec::with_capacity(n_bins + 1);
        for i in 0..=n_bins {
            if let Some(edge) = quantile(&filled, i as f64 / n_bins as f64)? {
                edges.push(edge);
            }
        }
        edges.dedup_by(|later, kept| *later <= *kept);

        Ok(Self { edges })
    }

    /// Compute edges from a column of `df`.
    pub fn fit_column(df: &DataFrame, col_name: &str, n_bins: usize, null_fill: f64) -> Result<Self> {
        Self::fit(&float_column(df, col_name)?, n_bins, null_fill)
    }

    /// Bin index of `value`.
    pub fn bin_index(&self, value: f64) -> usize {
        let Some(upper_edges) = self.edges.get(1..) else {
            return 0;
        };
        let last_bin = upper_edges.len().saturating_sub(1);
        upper_edges.partition_point(|&edge| edge < value).min(last_bin)
    }

    /// Bin a column of `df`, returning a Float64 series named `output_name`.
    pub fn transform_column(
        &self,
        df: &DataFrame,
        col_name: &str,
        output_name: &str,
        null_fill: f64,
    ) -> Result<Series> {
        let bins: Vec<f64> = float_column(df, col_name)?
            .fill_null_with_values(null_fill)?
            .into_no_null_iter()
            .map(|v| self.bin_index(v) as f64)
            .collect();
        Ok(f64_series(output_name, bins))
    }

    /// Number of bins (at least one).
    pub fn n_bins(&self) -> usize {
        self.edges.len().saturating_sub(1).max(1)
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Check that deserialized edges are usable.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.edges.is_empty() {
            return Err("no bin edges".to_string());
        }
        if self.edges.iter().any(|e| !e.is_finite()) {
            return Err("bin edges must be finite".to_string());
        }
        if self.edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err("bin edges are not strictly ascending".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn present(values: &[f64]) -> Float64Chunked {
        Float64Chunked::from_slice("x".into(), values)
    }

    #[test]
    fn test_deciles_of_uniform_values() {
        let values = present(&(0..=100).map(f64::from).collect::<Vec<_>>());
        let bins = QuantileBins::fit(&values, 10, -1.0).unwrap();

        assert_eq!(bins.edges(), &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]);
        assert_eq!(bins.n_bins(), 10);
        assert_eq!(bins.bin_index(0.0), 0);
        assert_eq!(bins.bin_index(10.0), 0);
        assert_eq!(bins.bin_index(10.5), 1);
        assert_eq!(bins.bin_index(100.0), 9);
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let bins = QuantileBins::fit(&present(&[0.0, 10.0, 20.0]), 2, -1.0).unwrap();
        assert_eq!(bins.bin_index(-50.0), 0);
        assert_eq!(bins.bin_index(500.0), 1);
    }

    #[test]
    fn test_degenerate_column_merges_edges() {
        // mostly zeros, as with the expense columns
        let mut raw = vec![0.0; 8];
        raw.extend([5.0, 100.0]);
        let bins = QuantileBins::fit(&present(&raw), 10, -1.0).unwrap();

        assert!(bins.n_bins() < 10);
        assert!(bins.validate().is_ok());
        assert_eq!(bins.bin_index(0.0), 0);
    }

    #[test]
    fn test_constant_column_single_bin() {
        let bins = QuantileBins::fit(&present(&[3.0, 3.0, 3.0]), 10, -1.0).unwrap();
        assert_eq!(bins.edges(), &[3.0]);
        assert_eq!(bins.n_bins(), 1);
        assert_eq!(bins.bin_index(3.0), 0);
        assert_eq!(bins.bin_index(99.0), 0);
    }

    #[test]
    fn test_nulls_use_fill_value() {
        let values = Float64Chunked::from_slice_options("spa".into(), &[None, None, Some(10.0), Some(20.0)]);
        let bins = QuantileBins::fit(&values, 2, -1.0).unwrap();
        assert_eq!(bins.edges()[0], -1.0);

        let df = df!["spa" => [None, Some(20.0)]].unwrap();
        let series = bins.transform_column(&df, "spa", "spa_bin", -1.0).unwrap();
        let values: Vec<Option<f64>> = series.f64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(0.0), Some(1.0)]);
        assert_eq!(series.name().as_str(), "spa_bin");
    }

    #[test]
    fn test_validate_rejects_bad_edges() {
        let bins: QuantileBins = serde_json::from_str("[1.0, 0.5]").unwrap();
        assert!(bins.validate().is_err());
        let bins: QuantileBins = serde_json::from_str("[]").unwrap();
        assert!(bins.validate().is_err());
    }
}
