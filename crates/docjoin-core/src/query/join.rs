//! Join stage synthesis for a single association.
//!
//! The store has no join operator, so each expanded association becomes:
//!
//! 1. a `$lookup` into a temporary field (plain key equality, or a
//!    correlated sub-pipeline for polymorphic associations)
//! 2. an `$unwind` of the temporary field, for single-document associations
//! 3. an `$addFields` copying the temporary field to its real path, with
//!    null when nothing matched
//! 4. a `$project` dropping the temporary field

use tracing::trace;

use crate::catalog::{Association, AssociationResolver, Cardinality};
use docjoin_proto::{Expr, LookupJoin, LookupStage, MatchFilter, PipelineStage, UnwindStage};

use super::config::CompilerConfig;

/// Variable bound to the local key in correlated lookups.
const LOCAL_ID_VAR: &str = "local_id";

/// Stages materializing one association at one nesting prefix.
///
/// This is the unit of deduplication: the compiler never emits two plans
/// for the same `(alias, prefix)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    /// Association alias.
    pub alias: String,
    /// Nesting prefix (empty at the root, otherwise ends with `.`).
    pub prefix: String,
    /// Stages in execution order.
    pub stages: Vec<PipelineStage>,
}

impl JoinPlan {
    /// Path the joined documents end up at.
    pub fn real_path(&self) -> String {
        format!("{}{}", self.prefix, self.alias)
    }

    /// Check if this plan materializes `alias` under `prefix`.
    pub fn materializes(&self, alias: &str, prefix: &str) -> bool {
        self.alias == alias && self.prefix == prefix
    }
}

/// Builds the stage sequence for one association.
pub struct JoinStageBuilder<'a> {
    resolver: &'a dyn AssociationResolver,
    config: &'a CompilerConfig,
}

impl<'a> JoinStageBuilder<'a> {
    /// Create a builder.
    pub fn new(resolver: &'a dyn AssociationResolver, config: &'a CompilerConfig) -> Self {
        Self { resolver, config }
    }

    /// Build the join plan for `association` under `prefix`.
    ///
    /// Returns `None` when the target model is not registered.
    pub fn plan(&self, association: &Association, prefix: &str) -> Option<JoinPlan> {
        let stages = self.build(association, prefix);
        if stages.is_empty() {
            return None;
        }
        Some(JoinPlan {
            alias: association.alias.clone(),
            prefix: prefix.to_string(),
            stages,
        })
    }

    /// Build the stages for `association` under `prefix`.
    ///
    /// An unresolvable target model yields no stages.
    pub fn build(&self, association: &Association, prefix: &str) -> Vec<PipelineStage> {
        let Some(target) = self.resolver.resolve_target(association) else {
            trace!(
                alias = %association.alias,
                target = %association.target,
                prefix,
                "Target model not registered, skipping join"
            );
            return Vec::new();
        };

        let real_path = format!("{}{}", prefix, association.alias);
        let temp_path = self.config.temp_field(&real_path);
        let local_field = format!("{}{}", prefix, self.local_key(association));

        let join = if association.is_polymorphic() {
            self.correlated_join(association, &local_field)
        } else {
            LookupJoin::Equality {
                local_field,
                foreign_field: self.foreign_key(association),
            }
        };

        let mut stages = Vec::with_capacity(4);
        stages.push(PipelineStage::Lookup(LookupStage {
            from: target.collection_name.clone(),
            join,
            as_field: temp_path.clone(),
        }));

        if association.cardinality == Cardinality::One {
            stages.push(PipelineStage::Unwind(UnwindStage::preserving(&temp_path)));
        }

        stages.push(PipelineStage::AddFields(vec![(
            real_path,
            Expr::if_null(Expr::field(&temp_path), Expr::literal(serde_json::Value::Null)),
        )]));
        stages.push(PipelineStage::Project(vec![temp_path]));

        stages
    }

    /// Key on the owning document.
    fn local_key<'c>(&'c self, association: &'c Association) -> &'c str {
        let via_related = association.via.as_deref() == Some(self.config.related_via.as_str());
        if association.is_dominant_side() && !via_related {
            &association.alias
        } else {
            &self.config.id_field
        }
    }

    /// Key on the foreign document.
    fn foreign_key(&self, association: &Association) -> String {
        if association.is_polymorphic() {
            format!("{}.{}", self.reference_array(association), self.config.polymorphic_ref_field)
        } else if association.is_dominant_side() {
            self.config.id_field.clone()
        } else {
            association
                .via
                .clone()
                .unwrap_or_else(|| self.config.id_field.clone())
        }
    }

    /// Array of references on a polymorphic target document.
    fn reference_array<'c>(&'c self, association: &'c Association) -> &'c str {
        association.via.as_deref().unwrap_or(&self.config.related_via)
    }

    /// Sub-pipeline matching both the reference and the discriminator.
    fn correlated_join(&self, association: &Association, local_field: &str) -> LookupJoin {
        let array = self.reference_array(association);
        let discriminator = association.discriminator.as_deref().unwrap_or_default();

        LookupJoin::Correlated {
            variables: vec![(LOCAL_ID_VAR.to_string(), Expr::field(local_field))],
            pipeline: vec![
                PipelineStage::Unwind(UnwindStage::preserving(array)),
                PipelineStage::Match(MatchFilter::Expr(Expr::And(vec![
                    Expr::eq(
                        Expr::field(self.foreign_key(association)),
                        Expr::variable(LOCAL_ID_VAR),
                    ),
                    Expr::eq(
                        Expr::field(format!("{}.{}", array, discriminator)),
                        Expr::literal(association.alias.as_str()),
                    ),
                ]))),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelDef, SchemaBundle};
    use crate::query::test_support::blog_schema;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn association<'s>(schema: &'s SchemaBundle, model: &str, alias: &str) -> &'s Association {
        schema
            .get_model(model)
            .and_then(|m| m.association(alias))
            .unwrap()
    }

    fn documents(stages: &[PipelineStage]) -> Vec<Value> {
        stages.iter().map(PipelineStage::to_document).collect()
    }

    #[test]
    fn test_single_dominant_association() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "author"), "");

        assert_eq!(
            documents(&stages),
            vec![
                json!({ "$lookup": {
                    "from": "users", "localField": "author", "foreignField": "_id", "as": "__author"
                }}),
                json!({ "$unwind": { "path": "$__author", "preserveNullAndEmptyArrays": true } }),
                json!({ "$addFields": { "author": { "$ifNull": ["$__author", null] } } }),
                json!({ "$project": { "__author": 0 } }),
            ]
        );
    }

    #[test]
    fn test_many_association_has_no_unwind() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "comments"), "");

        assert_eq!(
            documents(&stages),
            vec![
                json!({ "$lookup": {
                    "from": "comments", "localField": "_id", "foreignField": "article", "as": "__comments"
                }}),
                json!({ "$addFields": { "comments": { "$ifNull": ["$__comments", null] } } }),
                json!({ "$project": { "__comments": 0 } }),
            ]
        );
        assert!(!stages.iter().any(|s| matches!(s, PipelineStage::Unwind(_))));
    }

    #[test]
    fn test_many_to_many_dominant_side() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "tags"), "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "tags", "localField": "tags", "foreignField": "_id", "as": "__tags"
            }})
        );
    }

    #[test]
    fn test_many_to_many_inverse_side() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Tag", "articles"), "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "articles", "localField": "_id", "foreignField": "tags", "as": "__articles"
            }})
        );
    }

    #[test]
    fn test_polymorphic_association_uses_correlated_lookup() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "cover"), "");

        assert_eq!(stages.len(), 4);
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "upload_file",
                "let": { "local_id": "$_id" },
                "pipeline": [
                    { "$unwind": { "path": "$related", "preserveNullAndEmptyArrays": true } },
                    { "$match": { "$expr": { "$and": [
                        { "$eq": ["$related.ref", "$$local_id"] },
                        { "$eq": ["$related.field", "cover"] }
                    ]}}}
                ],
                "as": "__cover"
            }})
        );
        assert!(matches!(stages[1], PipelineStage::Unwind(_)));
    }

    #[test]
    fn test_nested_prefix() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let plan = builder
            .plan(association(&schema, "Comment", "author"), "comments.")
            .unwrap();

        assert_eq!(plan.real_path(), "comments.author");
        assert!(plan.materializes("author", "comments."));
        assert_eq!(
            documents(&plan.stages),
            vec![
                json!({ "$lookup": {
                    "from": "users",
                    "localField": "comments.author",
                    "foreignField": "_id",
                    "as": "__comments__author"
                }}),
                json!({ "$unwind": { "path": "$__comments__author", "preserveNullAndEmptyArrays": true } }),
                json!({ "$addFields": { "comments.author": { "$ifNull": ["$__comments__author", null] } } }),
                json!({ "$project": { "__comments__author": 0 } }),
            ]
        );
    }

    #[test]
    fn test_unresolved_target_yields_nothing() {
        let schema = blog_schema();
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let legacy = association(&schema, "Article", "legacy");
        assert!(builder.build(legacy, "").is_empty());
        assert!(builder.plan(legacy, "").is_none());
    }

    #[test]
    fn test_custom_config_keys() {
        let schema = blog_schema();
        let config = CompilerConfig::new()
            .with_id_field("id")
            .with_temp_field_prefix("_j_");
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "comments"), "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "comments", "localField": "id", "foreignField": "article", "as": "_j_comments"
            }})
        );
    }

    fn attachment_schema(via: &str) -> SchemaBundle {
        SchemaBundle::new(1)
            .with_model(
                ModelDef::new("Article", "articles")
                    .with_association(Association::one("image", "File").with_via(via)),
            )
            .with_model(ModelDef::new("File", "files"))
    }

    #[test]
    fn test_related_via_joins_on_id_field() {
        let schema = attachment_schema("related");
        let config = CompilerConfig::default();
        let builder = JoinStageBuilder::new(&schema, &config);

        let stages = builder.build(association(&schema, "Article", "image"), "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "files", "localField": "_id", "foreignField": "_id", "as": "__image"
            }})
        );
    }

    #[test]
    fn test_custom_related_via() {
        let schema = attachment_schema("attachments");
        let image = association(&schema, "Article", "image");

        let default = CompilerConfig::default();
        let stages = JoinStageBuilder::new(&schema, &default).build(image, "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "files", "localField": "image", "foreignField": "_id", "as": "__image"
            }})
        );

        let custom = CompilerConfig::new().with_related_via("attachments");
        let stages = JoinStageBuilder::new(&schema, &custom).build(image, "");
        assert_eq!(
            stages[0].to_document(),
            json!({ "$lookup": {
                "from": "files", "localField": "_id", "foreignField": "_id", "as": "__image"
            }})
        );
    }
}
