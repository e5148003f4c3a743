//! docjoin protocol types.
//!
//! This crate defines the types exchanged between callers, the pipeline
//! compiler and the document store's execution layer.
//!
//! # Modules
//!
//! - [`query`] - Filter specifications (where, sort, pagination, populate)
//! - [`value`] - Scalar/list clause values
//! - [`pipeline`] - Pipeline stages and their document rendering
//! - [`error`] - Protocol error types
//!
//! # Wire form
//!
//! Stages render to the aggregation documents the store executes:
//!
//! ```
//! use docjoin_proto::{Pipeline, PipelineStage};
//!
//! let pipeline = Pipeline::new(vec![PipelineStage::Skip(20), PipelineStage::Limit(10)]);
//! assert_eq!(pipeline.to_json(false).unwrap(), r#"[{"$skip":20},{"$limit":10}]"#);
//! ```

pub mod error;
pub mod pipeline;
pub mod query;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use pipeline::{
    Expr, FieldPredicate, LookupJoin, LookupStage, MatchFilter, Pipeline, PipelineStage,
    UnwindStage,
};
pub use query::{FilterSpec, Operator, SortDirection, SortSpec, WhereClause};
pub use value::ClauseValue;
