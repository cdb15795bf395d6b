//! Categorical encoding.
//!
//! Categories are mapped to dense integer codes through a vocabulary frozen at
//! fit time. Values the vocabulary has never seen fall back to code 0.

mod label;

pub use label::LabelVocabulary;
