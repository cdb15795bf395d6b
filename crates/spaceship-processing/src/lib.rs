//! Spaceship Passenger Feature Pipeline
//!
//! A leak-free preprocessing library for passenger manifests, built with Rust
//! and Polars. It turns raw passenger tables into fully numeric feature
//! tables for a binary "transported" classifier.
//!
//! # Overview
//!
//! - **Derived Fields**: group number/position from the passenger id, deck,
//!   cabin number and side from the cabin code
//! - **Binning**: decile bins for every expense column and for age
//! - **Imputation**: mode for booleans, median for continuous columns
//! - **Encoding**: sorted label vocabularies with a fixed code for unseen values
//! - **Scaling**: standardization with frozen mean/scale
//! - **Persistence**: fitted state round-trips through JSON
//!
//! Every statistic is learned once, by [`Preprocessor::fit_transform`], and
//! replayed unchanged by [`Preprocessor::transform`].
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use spaceship_processing::{Preprocessor, io};
//!
//! let train_df = io::load_csv("train.csv")?;
//! let test_df = io::load_csv("test.csv")?;
//!
//! let mut preprocessor = Preprocessor::new();
//! let train = preprocessor.fit_transform(&train_df)?;
//! let test = preprocessor.transform(&test_df)?;
//!
//! preprocessor.save("params.json")?;
//! println!("{} features", train.features.width());
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! use spaceship_processing::PreprocessorConfig;
//!
//! let config = PreprocessorConfig::builder()
//!     .target_column("Transported")
//!     .n_quantile_bins(10)
//!     .validation_fraction(0.2)
//!     .random_seed(42)
//!     .build()?;
//! let preprocessor = Preprocessor::with_config(config);
//! ```
//!
//! # Training a Classifier
//!
//! Implement [`Classifier`] for your model and use [`workflow`] to split,
//! fit, validate and produce a submission table.

pub mod config;
pub mod encoders;
pub mod error;
pub mod features;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod schema;
pub mod transforms;
pub mod types;
pub mod utils;
pub mod workflow;

// Re-exports for convenient access
pub use config::{ConfigValidationError, PreprocessorConfig, PreprocessorConfigBuilder};
pub use encoders::LabelVocabulary;
pub use error::{PreprocessingError, Result as PreprocessingResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use pipeline::{FittedParameters, Preprocessor, PreprocessorState};
pub use schema::OUTPUT_COLUMNS;
pub use transforms::{QuantileBins, StandardScaler};
pub use types::{Classifier, FeatureMatrix, ProcessedFrame, TrainingReport};
pub use workflow::{predict_submission, train_and_validate, train_validation_split};
