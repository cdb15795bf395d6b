//! Imputation module for handling missing values.
//!
//! Statistics are learned once at fit time and replayed at transform time:
//! - boolean-as-float columns are filled with their mode
//! - continuous columns are filled with their median

mod statistical;

pub use statistical::StatisticalImputer;
