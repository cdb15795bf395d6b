//! Configuration types for the feature pipeline.
//!
//! This module provides configuration options using the builder pattern.

use serde::{Deserialize, Serialize};

/// Configuration for the [`Preprocessor`](crate::Preprocessor) and the
/// training workflow around it.
///
/// Use [`PreprocessorConfig::builder()`] to create a validated configuration.
///
/// # Example
///
/// ```rust,ignore
/// use spaceship_processing::PreprocessorConfig;
///
/// let config = PreprocessorConfig::builder()
///     .target_column("Transported")
///     .n_quantile_bins(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreprocessorConfig {
    /// Name of the label column that is split off and passed through untouched.
    /// The snake_case spelling is accepted as an alias.
    /// Default: "Transported"
    pub target_column: String,

    /// Number of quantile bins for expenses and age.
    /// Duplicate edges are merged, so degenerate columns get fewer bins.
    /// Default: 10
    pub n_quantile_bins: usize,

    /// Value substituted for nulls before quantile edges are computed.
    /// Default: -1.0
    pub bin_null_fill: f64,

    /// Category token that replaces nulls in categorical columns. A real
    /// category with the same spelling is encoded like a null.
    /// Default: "Missing"
    pub missing_category: String,

    /// Fraction of rows held out for validation in the training workflow.
    /// Default: 0.2
    pub validation_fraction: f64,

    /// Seed for the train/validation shuffle.
    /// Default: 42
    pub random_seed: u64,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            target_column: "Transported".to_string(),
            n_quantile_bins: 10,
            bin_null_fill: -1.0,
            missing_category: "Missing".to_string(),
            validation_fraction: 0.2,
            random_seed: 42,
        }
    }
}

impl PreprocessorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PreprocessorConfigBuilder {
        PreprocessorConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.target_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyName("target_column"));
        }

        if self.missing_category.is_empty() {
            return Err(ConfigValidationError::EmptyName("missing_category"));
        }

        if self.n_quantile_bins == 0 {
            return Err(ConfigValidationError::InvalidBinCount(self.n_quantile_bins));
        }

        if !self.bin_null_fill.is_finite() {
            return Err(ConfigValidationError::NonFiniteFill(self.bin_null_fill));
        }

        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(ConfigValidationError::InvalidFraction(
                self.validation_fraction,
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("'{0}' must not be empty")]
    EmptyName(&'static str),

    #[error("Invalid quantile bin count: {0} (must be at least 1)")]
    InvalidBinCount(usize),

    #[error("Invalid bin null fill: {0} (must be finite)")]
    NonFiniteFill(f64),

    #[error("Invalid validation fraction: {0} (must be strictly between 0.0 and 1.0)")]
    InvalidFraction(f64),
}

impl From<ConfigValidationError> for crate::error::PreprocessingError {
    fn from(err: ConfigValidationError) -> Self {
        crate::error::PreprocessingError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`PreprocessorConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PreprocessorConfigBuilder {
    target_column: Option<String>,
    n_quantile_bins: Option<usize>,
    bin_null_fill: Option<f64>,
    missing_category: Option<String>,
    validation_fraction: Option<f64>,
    random_seed: Option<u64>,
}

impl PreprocessorConfigBuilder {
    /// Set the label column name.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set the number of quantile bins (10 gives deciles).
    pub fn n_quantile_bins(mut self, n: usize) -> Self {
        self.n_quantile_bins = Some(n);
        self
    }

    /// Set the value used in place of nulls when computing bin edges.
    pub fn bin_null_fill(mut self, value: f64) -> Self {
        self.bin_null_fill = Some(value);
        self
    }

    /// Set the token that replaces null categories.
    pub fn missing_category(mut self, token: impl Into<String>) -> Self {
        self.missing_category = Some(token.into());
        self
    }

    /// Set the validation hold-out fraction.
    pub fn validation_fraction(mut self, fraction: f64) -> Self {
        self.validation_fraction = Some(fraction);
        self
    }

    /// Set the shuffle seed.
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PreprocessorConfig` or an error if validation fails.
    pub fn build(self) -> Result<PreprocessorConfig, ConfigValidationError> {
        let defaults = PreprocessorConfig::default();
        let config = PreprocessorConfig {
            target_column: self.target_column.unwrap_or(defaults.target_column),
            n_quantile_bins: self.n_quantile_bins.unwrap_or(defaults.n_quantile_bins),
            bin_null_fill: self.bin_null_fill.unwrap_or(defaults.bin_null_fill),
            missing_category: self.missing_category.unwrap_or(defaults.missing_category),
            validation_fraction: self
                .validation_fraction
                .unwrap_or(defaults.validation_fraction),
            random_seed: self.random_seed.unwrap_or(defaults.random_seed),
        };

        config.validate()?;
        Ok(config)
    }
}
