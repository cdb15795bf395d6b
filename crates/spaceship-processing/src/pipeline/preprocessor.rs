//! The stateful preprocessor.
//!
//! A [`Preprocessor`] starts `Unfit`. [`Preprocessor::fit_transform`] learns
//! every parameter from a training table and moves it to `Fitted`;
//! [`Preprocessor::transform`] then replays those parameters against any
//! number of later tables. Refitting a fitted instance is rejected.
//!
//! Every call runs the same stages in the same order:
//!
//! 1. derive group/cabin fields from `id` and `cabin`
//! 2. coerce booleans to 0.0 / 1.0
//! 3. expense bins and total_expenses, from un-imputed expenses
//! 4. age bin, from un-imputed age
//! 5. impute booleans with their mode
//! 6. encode categoricals
//! 7. impute continuous columns with their median, then standardize
//! 8. project onto the fixed output columns, dropping raw id/cabin/expenses
//!
//! Each stage consumes a frame and returns a new one. When fitting, learned
//! values go into a local [`FittedParameters`] that is committed to the
//! instance only after the last stage succeeded.

use crate::config::PreprocessorConfig;
use crate::encoders::LabelVocabulary;
use crate::error::{PreprocessingError, Result, ResultExt};
use crate::features::{coerce_boolean_columns, derive_identity_fields, total_expenses};
use crate::imputers::StatisticalImputer;
use crate::pipeline::FittedParameters;
use crate::schema::{
    AGE, AGE_BIN, BOOLEAN_COLUMNS, CATEGORICAL_COLUMNS, EXPENSE_COLUMNS, MEDIAN_COLUMNS,
    OUTPUT_COLUMNS, SCALED_COLUMNS, bin_column, resolve_input,
};
use crate::transforms::{QuantileBins, StandardScaler};
use crate::types::ProcessedFrame;
use crate::utils::with_series;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Lifecycle state of a [`Preprocessor`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "parameters", rename_all = "snake_case")]
pub enum PreprocessorState {
    #[default]
    Unfit,
    Fitted(FittedParameters),
}

/// Leak-free feature pipeline for passenger tables.
///
/// # Example
///
/// ```rust,ignore
/// use spaceship_processing::Preprocessor;
///
/// let mut preprocessor = Preprocessor::new();
/// let train = preprocessor.fit_transform(&train_df)?;
/// let test = preprocessor.transform(&test_df)?;
/// assert_eq!(train.feature_names(), test.feature_names());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    config: PreprocessorConfig,
    state: PreprocessorState,
}

// Fitted instances are shared read-only across threads.
static_assertions::assert_impl_all!(Preprocessor: Send, Sync);

impl Preprocessor {
    /// Create an unfit preprocessor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unfit preprocessor with a custom configuration.
    pub fn with_config(config: PreprocessorConfig) -> Self {
        Self {
            config,
            state: PreprocessorState::Unfit,
        }
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    pub fn state(&self) -> &PreprocessorState {
        &self.state
    }

    pub fn is_fitted(&self) -> bool {
        matches!(self.state, PreprocessorState::Fitted(_))
    }

    /// Fitted parameters, if any.
    pub fn params(&self) -> Option<&FittedParameters> {
        match &self.state {
            PreprocessorState::Fitted(params) => Some(params),
            PreprocessorState::Unfit => None,
        }
    }

    /// Learn all parameters from `df` and return its transformed features.
    ///
    /// Fails with [`PreprocessingError::AlreadyFitted`] on a fitted instance,
    /// which is left unchanged.
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<ProcessedFrame> {
        if self.is_fitted() {
            return Err(PreprocessingError::AlreadyFitted);
        }

        info!("Fitting preprocessor on {} rows", df.height());
        let mut params = FittedParameters::default();
        let output = run(&self.config, df, Pass::Fit(&mut params))?;

        self.state = PreprocessorState::Fitted(params);
        info!(
            "Preprocessor fitted: {} features",
            output.features.width()
        );
        Ok(output)
    }

    /// Transform `df` with the frozen parameters.
    ///
    /// Fails with [`PreprocessingError::NotFitted`] before `fit_transform`.
    pub fn transform(&self, df: &DataFrame) -> Result<ProcessedFrame> {
        let params = self.params().ok_or(PreprocessingError::NotFitted)?;
        debug!("Transforming {} rows with frozen parameters", df.height());
        run(&self.config, df, Pass::Replay(params))
    }

    /// Serialize configuration and state to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a preprocessor from JSON, validating the record.
    pub fn from_json(json: &str) -> Result<Self> {
        let preprocessor: Self = serde_json::from_str(json)?;
        preprocessor.config.validate()?;
        if let Some(params) = preprocessor.params() {
            params.validate()?;
        }
        Ok(preprocessor)
    }

    /// Write the preprocessor to `path` as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Preprocessor saved: {}", path.display());
        Ok(())
    }

    /// Read a preprocessor previously written with [`Preprocessor::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        Self::from_json(&json).context(format!("loading {}", path.display()))
    }
}

/// Whether a run learns parameters or replays frozen ones.
enum Pass<'a> {
    Fit(&'a mut FittedParameters),
    Replay(&'a FittedParameters),
}

impl Pass<'_> {
    fn params(&self) -> &FittedParameters {
        match self {
            Pass::Fit(params) => params,
            Pass::Replay(params) => params,
        }
    }

    fn fitting(&mut self) -> Option<&mut FittedParameters> {
        match self {
            Pass::Fit(params) => Some(&mut **params),
            Pass::Replay(_) => None,
        }
    }
}

fn run(config: &PreprocessorConfig, input: &DataFrame, mut pass: Pass<'_>) -> Result<ProcessedFrame> {
    let resolved = resolve_input(input, &config.target_column)?;

    // 1. derived id/cabin fields
    let frame = derive_identity_fields(&resolved.frame)?;

    // 2. booleans as floats
    let frame = coerce_boolean_columns(&frame)?;

    // 3. expense bins + total, on raw expenses
    if let Some(params) = pass.fitting() {
        for column in EXPENSE_COLUMNS {
            let bins = QuantileBins::fit_column(&frame, column, config.n_quantile_bins, config.bin_null_fill)?;
            debug!("'{}' binned into {} bins", column, bins.n_bins());
            params.bins.insert(column.to_string(), bins);
        }
    }
    let frame = bin_columns(&frame, &EXPENSE_COLUMNS, pass.params(), config)?;
    let frame = with_series(&frame, total_expenses(&frame)?)?;

    // 4. age bin, on raw age
    if let Some(params) = pass.fitting() {
        let bins = QuantileBins::fit_column(&frame, AGE, config.n_quantile_bins, config.bin_null_fill)?;
        params.bins.insert(AGE.to_string(), bins);
    }
    let frame = bin_columns(&frame, &[AGE], pass.params(), config)?;

    // 5. boolean modes
    if let Some(params) = pass.fitting() {
        for column in BOOLEAN_COLUMNS {
            params.modes.insert(column.to_string(), StatisticalImputer::fit_mode(&frame, column)?);
        }
    }
    let mut frame = frame;
    for column in BOOLEAN_COLUMNS {
        frame = StatisticalImputer::fill(&frame, column, pass.params().mode(column)?)?;
    }

    // 6. categorical codes
    if let Some(params) = pass.fitting() {
        for column in CATEGORICAL_COLUMNS {
            let vocabulary = LabelVocabulary::fit_column(&frame, column, &config.missing_category)?;
            params.vocabularies.insert(column.to_string(), vocabulary);
        }
    }
    for column in CATEGORICAL_COLUMNS {
        frame = pass
            .params()
            .vocabulary(column)?
            .transform_column(&frame, column, &config.missing_category)?;
    }

    // 7. medians, then scaling on the imputed values
    if let Some(params) = pass.fitting() {
        for column in MEDIAN_COLUMNS {
            params.medians.insert(column.to_string(), StatisticalImputer::fit_median(&frame, column)?);
        }
    }
    for column in MEDIAN_COLUMNS {
        frame = StatisticalImputer::fill(&frame, column, pass.params().median(column)?)?;
    }
    if let Some(params) = pass.fitting() {
        for column in SCALED_COLUMNS {
            params.scalers.insert(column.to_string(), StandardScaler::fit_column(&frame, column)?);
        }
    }
    for column in SCALED_COLUMNS {
        frame = pass.params().scaler(column)?.transform_column(&frame, column)?;
    }

    // 8. fixed projection; raw id, cabin and expense columns fall away here
    let features = frame.select(OUTPUT_COLUMNS)?;

    let remaining_nulls: usize = features.get_columns().iter().map(|c| c.null_count()).sum();
    debug!("Missing values remaining: {}", remaining_nulls);

    Ok(ProcessedFrame {
        features,
        labels: resolved.labels,
    })
}

/// Add a `<column>_bin` series for each column using the stored edges.
fn bin_columns(
    df: &DataFrame,
    columns: &[&str],
    params: &FittedParameters,
    config: &PreprocessorConfig,
) -> Result<DataFrame> {
    let mut out = df.clone();
    for column in columns {
        let output_name = if *column == AGE { AGE_BIN.to_string() } else { bin_column(column) };
        let series = params
            .bins(column)?
            .transform_column(df, column, &output_name, config.bin_null_fill)?;
        out.with_column(series)?;
    }
    Ok(out)
}
