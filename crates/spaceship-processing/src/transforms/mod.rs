//! Numeric transforms with fit-time state.
//!
//! - [`QuantileBins`]: quantile edges for the expense and age bins
//! - [`StandardScaler`]: mean/scale standardization

mod binning;
mod scaling;

pub use binning::QuantileBins;
pub use scaling::StandardScaler;
