//! docjoin core - model catalog and pipeline compiler.
//!
//! This crate turns relational filter specs into aggregation pipelines for
//! a document store that has no native join operator.

pub mod catalog;
pub mod error;
pub mod query;

pub use catalog::{
    Association, AssociationResolver, Cardinality, Catalog, ModelDef, Nature, SchemaBundle,
};
pub use error::Error;
pub use query::{
    CompilerConfig, ExpandMode, IdNormalizer, JoinPathPlanner, JoinPlan, JoinStageBuilder,
    ObjectIdNormalizer, PassthroughNormalizer, PipelineCompiler, PredicateTranslator,
};

/// Re-export protocol types.
pub use docjoin_proto as proto;
