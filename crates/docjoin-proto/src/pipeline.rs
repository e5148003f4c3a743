//! Pipeline stage types.
//!
//! A pipeline is an ordered list of immutable stages. Each stage renders to
//! the document form the execution layer understands (`$match`, `$lookup`,
//! `$unwind`, ...); that rendering is the compatibility surface between the
//! compiler and the store.

use crate::error::Error;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Aggregation expression, used in `$expr` matches, lookup variables and
/// computed fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Reference to a document field (`$path`).
    Field(String),
    /// Reference to a pipeline variable (`$$name`).
    Variable(String),
    /// Literal value.
    Literal(Value),
    /// Equality of two expressions.
    Eq(Box<Expr>, Box<Expr>),
    /// All expressions must hold.
    And(Vec<Expr>),
    /// First expression, or the fallback when it is null or missing.
    IfNull(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Field reference.
    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field(path.into())
    }

    /// Variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable(name.into())
    }

    /// Literal value.
    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    /// Equality.
    pub fn eq(left: Expr, right: Expr) -> Self {
        Expr::Eq(Box::new(left), Box::new(right))
    }

    /// Null fallback.
    pub fn if_null(expr: Expr, fallback: Expr) -> Self {
        Expr::IfNull(Box::new(expr), Box::new(fallback))
    }

    /// Render to document form.
    pub fn to_document(&self) -> Value {
        match self {
            Expr::Field(path) => Value::String(format!("${}", path)),
            Expr::Variable(name) => Value::String(format!("$${}", name)),
            // Strings starting with '$' would be read back as references.
            Expr::Literal(Value::String(s)) if s.starts_with('$') => json!({ "$literal": s }),
            Expr::Literal(value) => value.clone(),
            Expr::Eq(l, r) => json!({ "$eq": [l.to_document(), r.to_document()] }),
            Expr::And(exprs) => {
                json!({ "$and": exprs.iter().map(Expr::to_document).collect::<Vec<_>>() })
            }
            Expr::IfNull(e, fallback) => {
                json!({ "$ifNull": [e.to_document(), fallback.to_document()] })
            }
        }
    }
}

/// Condition on a single field inside a `$match`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldPredicate {
    Eq(Value),
    Ne(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    /// Field matches the pattern.
    Regex {
        pattern: String,
        case_insensitive: bool,
    },
    /// Field does not match the pattern.
    NotRegex {
        pattern: String,
        case_insensitive: bool,
    },
}

impl FieldPredicate {
    /// Render the condition (the value placed under the field name).
    ///
    /// Equality against an object is wrapped in `$eq`, otherwise keys such
    /// as `$ne` inside the value would be read as operators.
    pub fn to_document(&self) -> Value {
        match self {
            FieldPredicate::Eq(v @ Value::Object(_)) => json!({ "$eq": v }),
            FieldPredicate::Eq(v) => v.clone(),
            FieldPredicate::Ne(v) => json!({ "$ne": v }),
            FieldPredicate::Lt(v) => json!({ "$lt": v }),
            FieldPredicate::Lte(v) => json!({ "$lte": v }),
            FieldPredicate::Gt(v) => json!({ "$gt": v }),
            FieldPredicate::Gte(v) => json!({ "$gte": v }),
            FieldPredicate::In(vs) => json!({ "$in": vs }),
            FieldPredicate::NotIn(vs) => json!({ "$nin": vs }),
            FieldPredicate::Regex {
                pattern,
                case_insensitive,
            } => regex_document(pattern, *case_insensitive),
            FieldPredicate::NotRegex {
                pattern,
                case_insensitive,
            } => json!({ "$not": regex_document(pattern, *case_insensitive) }),
        }
    }
}

fn regex_document(pattern: &str, case_insensitive: bool) -> Value {
    if case_insensitive {
        json!({ "$regex": pattern, "$options": "i" })
    } else {
        json!({ "$regex": pattern })
    }
}

/// Body of a `$match` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchFilter {
    /// Predicate on one field path.
    Field {
        field: String,
        predicate: FieldPredicate,
    },
    /// Aggregation expression evaluated per document.
    Expr(Expr),
}

impl MatchFilter {
    fn to_document(&self) -> Value {
        match self {
            MatchFilter::Field { field, predicate } => {
                let mut doc = Map::new();
                doc.insert(field.clone(), predicate.to_document());
                Value::Object(doc)
            }
            MatchFilter::Expr(expr) => json!({ "$expr": expr.to_document() }),
        }
    }
}

/// How a `$lookup` correlates the two collections.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupJoin {
    /// Plain key equality.
    Equality {
        local_field: String,
        foreign_field: String,
    },
    /// Correlated sub-pipeline with bound variables.
    Correlated {
        variables: Vec<(String, Expr)>,
        pipeline: Vec<PipelineStage>,
    },
}

/// A `$lookup` stage.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupStage {
    /// Foreign collection name.
    pub from: String,
    /// Join condition.
    pub join: LookupJoin,
    /// Output array field.
    pub as_field: String,
}

impl LookupStage {
    fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("from".into(), Value::String(self.from.clone()));
        match &self.join {
            LookupJoin::Equality {
                local_field,
                foreign_field,
            } => {
                doc.insert("localField".into(), Value::String(local_field.clone()));
                doc.insert("foreignField".into(), Value::String(foreign_field.clone()));
            }
            LookupJoin::Correlated {
                variables,
                pipeline,
            } => {
                let vars: Map<String, Value> = variables
                    .iter()
                    .map(|(name, expr)| (name.clone(), expr.to_document()))
                    .collect();
                doc.insert("let".into(), Value::Object(vars));
                doc.insert(
                    "pipeline".into(),
                    Value::Array(pipeline.iter().map(PipelineStage::to_document).collect()),
                );
            }
        }
        doc.insert("as".into(), Value::String(self.as_field.clone()));
        Value::Object(doc)
    }
}

/// An `$unwind` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwindStage {
    /// Array field path (without the `$`).
    pub path: String,
    /// Keep documents whose array is null, missing or empty.
    pub preserve_null_and_empty: bool,
}

impl UnwindStage {
    /// Unwind that keeps unmatched documents.
    pub fn preserving(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            preserve_null_and_empty: true,
        }
    }
}

/// A single pipeline stage.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineStage {
    Match(MatchFilter),
    Lookup(LookupStage),
    Unwind(UnwindStage),
    /// Computed fields, in order.
    AddFields(Vec<(String, Expr)>),
    /// Fields removed from the output.
    Project(Vec<String>),
    /// Sort keys with direction codes (1 or -1), in priority order.
    Sort(Vec<(String, i32)>),
    Skip(u64),
    Limit(u64),
}

impl PipelineStage {
    /// Short stage name, as used in the document form without the `$`.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineStage::Match(_) => "match",
            PipelineStage::Lookup(_) => "lookup",
            PipelineStage::Unwind(_) => "unwind",
            PipelineStage::AddFields(_) => "addFields",
            PipelineStage::Project(_) => "project",
            PipelineStage::Sort(_) => "sort",
            PipelineStage::Skip(_) => "skip",
            PipelineStage::Limit(_) => "limit",
        }
    }

    /// Render the stage to its document form.
    pub fn to_document(&self) -> Value {
        let body = match self {
            PipelineStage::Match(filter) => filter.to_document(),
            PipelineStage::Lookup(lookup) => lookup.to_document(),
            PipelineStage::Unwind(unwind) => json!({
                "path": format!("${}", unwind.path),
                "preserveNullAndEmptyArrays": unwind.preserve_null_and_empty,
            }),
            PipelineStage::AddFields(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, expr)| (name.clone(), expr.to_document()))
                    .collect(),
            ),
            PipelineStage::Project(excluded) => Value::Object(
                excluded
                    .iter()
                    .map(|name| (name.clone(), Value::from(0)))
                    .collect(),
            ),
            PipelineStage::Sort(keys) => Value::Object(
                keys.iter()
                    .map(|(name, code)| (name.clone(), Value::from(*code)))
                    .collect(),
            ),
            PipelineStage::Skip(n) => Value::from(*n),
            PipelineStage::Limit(n) => Value::from(*n),
        };

        let mut doc = Map::new();
        doc.insert(format!("${}", self.kind()), body);
        Value::Object(doc)
    }
}

impl Serialize for PipelineStage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// An ordered, compiled pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

impl Pipeline {
    /// Wrap a list of stages.
    pub fn new(stages: Vec<PipelineStage>) -> Self {
        Self { stages }
    }

    /// The stages in execution order.
    pub fn stages(&self) -> &[PipelineStage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Top-level lookup stages, in order.
    pub fn lookups(&self) -> impl Iterator<Item = &LookupStage> {
        self.stages.iter().filter_map(|stage| match stage {
            PipelineStage::Lookup(lookup) => Some(lookup),
            _ => None,
        })
    }

    /// Render every stage to document form.
    pub fn to_documents(&self) -> Vec<Value> {
        self.stages.iter().map(PipelineStage::to_document).collect()
    }

    /// Render the pipeline as JSON text.
    pub fn to_json(&self, pretty: bool) -> Result<String, Error> {
        let docs = Value::Array(self.to_documents());
        if pretty {
            serde_json::to_string_pretty(&docs).map_err(Error::encode)
        } else {
            serde_json::to_string(&docs).map_err(Error::encode)
        }
    }
}

impl From<Vec<PipelineStage>> for Pipeline {
    fn from(stages: Vec<PipelineStage>) -> Self {
        Self::new(stages)
    }
}

impl IntoIterator for Pipeline {
    type Item = PipelineStage;
    type IntoIter = std::vec::IntoIter<PipelineStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.into_iter()
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.stages.serialize(serializer)
    }
}
