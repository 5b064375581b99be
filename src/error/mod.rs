//! Error handling module for docquery.
//!
//! This module provides:
//! - The invalid-call errors raised by guarded builder methods
//! - Chain script and configuration errors
//! - A single crate-wide error type with conversions from foreign errors
//!
//! # Example
//!
//! ```rust
//! use docquery::error::{BuilderError, DocQueryError};
//! use docquery::query::Builder;
//!
//! let mut qb = Builder::new("test", "places");
//! let err = qb.distance_multiplier(2.0).unwrap_err();
//! assert!(matches!(
//!     err,
//!     DocQueryError::Builder(BuilderError::RequiresGeoNear { .. })
//! ));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{BuilderError, ConfigError, DocQueryError, ParseError, Result};
