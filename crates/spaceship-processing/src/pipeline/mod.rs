//! Pipeline module.
//!
//! The fit-once / transform-many preprocessor and the parameters it learns.

mod params;
mod preprocessor;

pub use params::FittedParameters;
pub use preprocessor::{Preprocessor, PreprocessorState};
