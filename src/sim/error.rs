//! Simulation precondition failures
//!
//! These indicate a setup bug rather than a runtime condition: the operation
//! that detects one aborts without partial mutation.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("undefined extents for {0}")]
    UndefinedExtents(&'static str),
    #[error("difficulty rubrics have no tier at threshold 0")]
    MissingBaseTier,
    #[error("base difficulty tier is missing `{0}`")]
    IncompleteBaseTier(&'static str),
    #[error("platform {0} has no active body")]
    InactivePlatform(usize),
}
