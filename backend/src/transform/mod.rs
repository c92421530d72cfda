//! Transformation module.
//!
//! - Boolean: shared truthy/falsy normalization
//! - Pipeline: in-place filter, pluck and deduplicate
//! - Grouper: key, composite-key and boolean grouping
//! - Plan: JSON description of a run

pub mod boolean;
pub mod grouper;
pub mod pipeline;
pub mod plan;

pub use boolean::{normalize_boolean, normalize_boolean_str};
pub use grouper::{group_by_key, group_by_key_boolean, group_by_keys};
pub use pipeline::Pipeline;
pub use plan::{example_plan, steps_description, AnalysisPlan, Step};
