//! Pipeline compilation for docjoin.
//!
//! This module compiles a [`FilterSpec`](docjoin_proto::FilterSpec) into an
//! ordered list of aggregation stages, synthesizing the joins needed by
//! relational filters and populate requests.

mod compiler;
mod config;
mod join;
mod normalize;
mod planner;
mod predicate;

#[cfg(test)]
mod test_support;

pub use compiler::PipelineCompiler;
pub use config::{
    CompilerConfig, DEFAULT_ID_FIELD, DEFAULT_POLYMORPHIC_REF_FIELD, DEFAULT_RELATED_VIA,
    DEFAULT_TEMP_FIELD_PREFIX,
};
pub use join::{JoinPlan, JoinStageBuilder};
pub use normalize::{IdNormalizer, ObjectIdNormalizer, PassthroughNormalizer};
pub use planner::{minimal_cover, ExpandMode, JoinPathPlanner};
pub use predicate::PredicateTranslator;
