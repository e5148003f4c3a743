//! Pipeline compiler.
//!
//! Assembles the final stage list for a filter spec. Stage order is fixed:
//!
//! 1. joins needed by the where clauses
//! 2. one `$match` per where clause, in input order
//! 3. joins requested by `populate`, minus any already emitted in step 1
//! 4. `$sort`, `$skip`, `$limit`

use tracing::{debug, instrument};

use crate::catalog::{AssociationResolver, ModelDef};
use crate::error::Error;
use docjoin_proto::{FilterSpec, Pipeline, PipelineStage, SortSpec};

use super::config::CompilerConfig;
use super::join::JoinPlan;
use super::normalize::{IdNormalizer, ObjectIdNormalizer};
use super::planner::{ExpandMode, JoinPathPlanner};
use super::predicate::PredicateTranslator;

/// Compiles filter specs into pipelines.
///
/// Compilation is pure: the compiler holds only shared references and
/// configuration, so one instance can serve concurrent compiles.
pub struct PipelineCompiler<'a> {
    resolver: &'a dyn AssociationResolver,
    normalizer: &'a dyn IdNormalizer,
    config: CompilerConfig,
}

impl<'a> PipelineCompiler<'a> {
    /// Create a compiler with object id normalization and default settings.
    pub fn new(resolver: &'a dyn AssociationResolver) -> Self {
        Self {
            resolver,
            normalizer: &ObjectIdNormalizer,
            config: CompilerConfig::default(),
        }
    }

    /// Use a different id normalizer.
    pub fn with_normalizer(mut self, normalizer: &'a dyn IdNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Use a different configuration.
    pub fn with_config(mut self, config: CompilerConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a spec against the model registered as `model_name`.
    pub fn compile_model(&self, model_name: &str, spec: &FilterSpec) -> Result<Pipeline, Error> {
        let root = self
            .resolver
            .resolve_model(None, model_name)
            .ok_or_else(|| Error::UnknownModel(model_name.to_string()))?;
        self.compile(root, spec)
    }

    /// Compile a spec against `root`.
    ///
    /// Fails if any where clause uses an unsupported operator; no stages are
    /// produced in that case.
    #[instrument(skip_all, fields(model = %root.name))]
    pub fn compile(&self, root: &ModelDef, spec: &FilterSpec) -> Result<Pipeline, Error> {
        let planner = JoinPathPlanner::new(self.resolver, &self.config);
        let translator = PredicateTranslator::new(self.normalizer);

        let matches = spec
            .where_clauses
            .iter()
            .map(|clause| translator.translate_clause(clause).map(PipelineStage::Match))
            .collect::<Result<Vec<_>, _>>()?;

        let filter_joins = if spec.where_clauses.is_empty() {
            Vec::new()
        } else {
            planner.plan_paths(root, spec.where_fields())
        };

        let requested = self.populate_joins(&planner, root, spec);
        let requested_count = requested.len();
        let populate_joins: Vec<JoinPlan> = requested
            .into_iter()
            .filter(|plan| !filter_joins.contains(plan))
            .collect();

        debug!(
            filter_joins = filter_joins.len(),
            matches = matches.len(),
            populate_joins = populate_joins.len(),
            redundant_joins = requested_count - populate_joins.len(),
            "Compiled join and match stages"
        );

        let mut stages: Vec<PipelineStage> = filter_joins
            .into_iter()
            .flat_map(|plan| plan.stages)
            .collect();
        stages.extend(matches);
        stages.extend(populate_joins.into_iter().flat_map(|plan| plan.stages));

        if let Some(sort) = sort_stage(&spec.sort) {
            stages.push(sort);
        }
        if let Some(start) = spec.start {
            stages.push(PipelineStage::Skip(start));
        }
        if let Some(limit) = spec.effective_limit() {
            stages.push(PipelineStage::Limit(limit));
        }

        Ok(Pipeline::new(stages))
    }

    /// Root-level joins requested by the spec's populate list.
    fn populate_joins(
        &self,
        planner: &JoinPathPlanner<'_>,
        root: &ModelDef,
        spec: &FilterSpec,
    ) -> Vec<JoinPlan> {
        match &spec.populate {
            Some(aliases) if !aliases.is_empty() => planner.expand(
                root,
                &ExpandMode::whitelist(aliases.iter().map(String::as_str)),
                "",
            ),
            None if self.config.auto_populate => planner.expand(root, &ExpandMode::Auto, ""),
            _ => Vec::new(),
        }
    }
}

/// Sort stage for the given keys; a repeated field keeps its first position
/// and takes the last direction.
fn sort_stage(sort: &[SortSpec]) -> Option<PipelineStage> {
    if sort.is_empty() {
        return None;
    }

    let keys = sort.iter().fold(Vec::<(String, i32)>::new(), |mut keys, spec| {
        let code = spec.direction.code();
        match keys.iter_mut().find(|(field, _)| *field == spec.field) {
            Some(entry) => entry.1 = code,
            None => keys.push((spec.field.clone(), code)),
        }
        keys
    });

    Some(PipelineStage::Sort(keys))
}
