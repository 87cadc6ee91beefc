//! Crate-level error taxonomy.
//!
//! All operations here are deterministic pure computation, so every error is
//! fatal to the calling operation and nothing is retried. Failures indicate
//! an unsupported operation or a parameter/configuration problem.

use thiserror::Error;

use crate::solve::SolveError;

/// Errors surfaced by profile construction and evaluation.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// The requested capability has no implementation for this profile.
    /// Surfaced unchanged to the caller; never silently approximated.
    #[error("{0} is not implemented for this profile")]
    NotImplemented(&'static str),

    /// A shape parameter is outside its documented valid range.
    #[error("invalid parameter {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// A non-finite value appeared during derivation or evaluation.
    #[error("non-finite value encountered in {context}")]
    NonFinite { context: &'static str },

    /// The root finder failed while calibrating a sampling parameter.
    #[error("sampling calibration failed: {0}")]
    Solve(#[from] SolveError),
}
