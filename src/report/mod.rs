//! Report generation over subject rules and mark records.
//!
//! This module aggregates mark records into per-student accumulators and
//! per-subject top scores, classifies each student against a
//! [`classify::ClassificationPolicy`], and derives the pass-percentage
//! extremes and the list of failed students.

pub mod aggregate;
pub mod classify;
pub mod extremes;
pub mod failures;
pub mod generate;
pub mod types;
pub mod utility;
