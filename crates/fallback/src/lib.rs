//! Simulated Assessment Fallback
//!
//! Produces a usable assessment when the language-model service cannot be
//! reached at all. This is a degraded "no analysis available" path, not
//! response normalization: no model reasoning is carried, only detection
//! results and fixed advisory text.

mod simulated;

pub use simulated::{simulated_assessment, SIMULATED_REASONING};
