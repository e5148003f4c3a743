//! Join path planning.
//!
//! Decides which associations must be expanded, and in which order, so that
//! every filtered field path resolves against joined documents. Filtering
//! on `a.b.c` only needs the branch `a.b` expanded, which also brings in
//! `a`; the planner keeps the deepest paths and walks each once.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, trace};

use crate::catalog::{AssociationResolver, ModelDef};

use super::config::CompilerConfig;
use super::join::{JoinPlan, JoinStageBuilder};

/// Separator between association aliases in a field path.
const PATH_SEPARATOR: char = '.';

/// Which associations of a model to expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandMode<'m> {
    /// Every association flagged auto-populate.
    Auto,
    /// Only the listed aliases.
    Whitelist(HashSet<&'m str>),
}

impl<'m> ExpandMode<'m> {
    /// Whitelist from a list of aliases.
    pub fn whitelist<I>(aliases: I) -> Self
    where
        I: IntoIterator<Item = &'m str>,
    {
        ExpandMode::Whitelist(aliases.into_iter().collect())
    }

    /// Whitelist of a single alias.
    pub fn only(alias: &'m str) -> Self {
        Self::whitelist([alias])
    }

    fn admits(&self, alias: &str, auto_populate: bool) -> bool {
        match self {
            ExpandMode::Auto => auto_populate,
            ExpandMode::Whitelist(aliases) => aliases.contains(alias),
        }
    }
}

/// Association paths that must be traversed to resolve `field_paths`.
///
/// The leaf attribute is dropped from every path (single-segment paths are
/// kept as they are), then paths are visited in descending lexicographic
/// order and a path is kept only if no kept path already extends it.
pub fn minimal_cover<'p, I>(field_paths: I) -> Vec<String>
where
    I: IntoIterator<Item = &'p str>,
{
    let prefixes: BTreeSet<&str> = field_paths
        .into_iter()
        .map(|path| {
            path.rsplit_once(PATH_SEPARATOR)
                .map_or(path, |(parent, _leaf)| parent)
        })
        .collect();

    prefixes.into_iter().rev().fold(Vec::new(), |mut kept, candidate| {
        if !kept.iter().any(|path: &String| extends(path, candidate)) {
            kept.push(candidate.to_string());
        }
        kept
    })
}

/// Check if `path` traverses `candidate` (segment-aware prefix test).
fn extends(path: &str, candidate: &str) -> bool {
    path == candidate
        || path
            .strip_prefix(candidate)
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}

/// Plans join stages for field paths and populate requests.
pub struct JoinPathPlanner<'a> {
    resolver: &'a dyn AssociationResolver,
    builder: JoinStageBuilder<'a>,
}

impl<'a> JoinPathPlanner<'a> {
    /// Create a planner.
    pub fn new(resolver: &'a dyn AssociationResolver, config: &'a CompilerConfig) -> Self {
        Self {
            resolver,
            builder: JoinStageBuilder::new(resolver, config),
        }
    }

    /// Expand the associations of `model` admitted by `mode`, in
    /// declaration order, under `prefix`.
    pub fn expand(&self, model: &ModelDef, mode: &ExpandMode<'_>, prefix: &str) -> Vec<JoinPlan> {
        model
            .associations
            .iter()
            .filter(|a| mode.admits(&a.alias, a.auto_populate))
            .filter_map(|a| self.builder.plan(a, prefix))
            .collect()
    }

    /// Join plans needed to filter `root` documents on `field_paths`.
    ///
    /// Unknown aliases end their branch silently. A given association at a
    /// given prefix is expanded at most once, even when several kept paths
    /// pass through it.
    pub fn plan_paths<'p, I>(&self, root: &ModelDef, field_paths: I) -> Vec<JoinPlan>
    where
        I: IntoIterator<Item = &'p str>,
    {
        let cover = minimal_cover(field_paths);
        debug!(model = %root.name, paths = ?cover, "Planning filter joins");

        cover.iter().fold(Vec::new(), |plans, path| {
            let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
            self.walk(root, &segments, String::new(), plans)
        })
    }

    /// Expand `segments` one association at a time, starting at `model`.
    fn walk(
        &self,
        model: &ModelDef,
        segments: &[&str],
        prefix: String,
        mut plans: Vec<JoinPlan>,
    ) -> Vec<JoinPlan> {
        let Some((alias, rest)) = segments.split_first() else {
            return plans;
        };

        let Some(association) = self.resolver.resolve_association(model, alias) else {
            trace!(model = %model.name, alias, prefix = %prefix, "Unknown association, ending branch");
            return plans;
        };

        if !plans.iter().any(|p| p.materializes(alias, &prefix)) {
            plans.extend(self.expand(model, &ExpandMode::only(alias), &prefix));
        }

        match self.resolver.resolve_target(association) {
            Some(target) => {
                let prefix = format!("{}{}{}", prefix, alias, PATH_SEPARATOR);
                self.walk(target, rest, prefix, plans)
            }
            None => plans,
        }
    }
}
