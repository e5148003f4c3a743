//! Model catalog for docjoin.
//!
//! The catalog stores model definitions, their associations, and versioned
//! schema snapshots consumed by the pipeline compiler.

mod association;
mod catalog;
mod model;
mod resolver;
mod schema;

pub use association::{Association, Cardinality, Nature};
pub use catalog::Catalog;
pub use model::ModelDef;
pub use resolver::AssociationResolver;
pub use schema::SchemaBundle;
