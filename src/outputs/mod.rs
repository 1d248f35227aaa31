//! Output generation.
//!
//! # Submodules
//!
//! - [`json`]: Writes raw API responses to JSON files for inspection

pub mod json;
