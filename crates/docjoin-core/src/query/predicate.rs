//! Where-clause translation.
//!
//! Maps one `field operator value` clause onto a native `$match` predicate.
//! Values of `eq`, `ne`, `in` and `nin` are run through the id normalizer
//! (element-wise for lists); every other operator uses the value as given.

use crate::error::Error;
use docjoin_proto::{ClauseValue, FieldPredicate, MatchFilter, Operator, WhereClause};

use super::normalize::IdNormalizer;

/// Translates where clauses into match filters.
pub struct PredicateTranslator<'a> {
    normalizer: &'a dyn IdNormalizer,
}

impl<'a> PredicateTranslator<'a> {
    /// Create a translator using the given id normalizer.
    pub fn new(normalizer: &'a dyn IdNormalizer) -> Self {
        Self { normalizer }
    }

    /// Translate a where clause.
    pub fn translate_clause(&self, clause: &WhereClause) -> Result<MatchFilter, Error> {
        self.translate(&clause.field, &clause.operator, &clause.value)
    }

    /// Translate a single `field operator value` triple.
    ///
    /// Fails only for operators the store has no predicate for.
    pub fn translate(
        &self,
        field: &str,
        operator: &Operator,
        value: &ClauseValue,
    ) -> Result<MatchFilter, Error> {
        let predicate = match operator {
            Operator::Eq => FieldPredicate::Eq(self.normalize(value).into_value()),
            Operator::Ne => FieldPredicate::Ne(self.normalize(value).into_value()),
            Operator::Lt => FieldPredicate::Lt(value.clone().into_value()),
            Operator::Lte => FieldPredicate::Lte(value.clone().into_value()),
            Operator::Gt => FieldPredicate::Gt(value.clone().into_value()),
            Operator::Gte => FieldPredicate::Gte(value.clone().into_value()),
            Operator::In => FieldPredicate::In(self.normalize(value).into_set()),
            Operator::Nin => FieldPredicate::NotIn(self.normalize(value).into_set()),
            Operator::Contains => FieldPredicate::Regex {
                pattern: value.pattern_text(),
                case_insensitive: true,
            },
            Operator::NContains => FieldPredicate::NotRegex {
                pattern: value.pattern_text(),
                case_insensitive: true,
            },
            Operator::ContainsS => FieldPredicate::Regex {
                pattern: value.pattern_text(),
                case_insensitive: false,
            },
            Operator::NContainsS => FieldPredicate::NotRegex {
                pattern: value.pattern_text(),
                case_insensitive: false,
            },
            Operator::Unknown(_) => {
                return Err(Error::UnsupportedOperator {
                    field: field.to_string(),
                    operator: operator.clone(),
                    value: value.clone(),
                })
            }
        };

        Ok(MatchFilter::Field {
            field: field.to_string(),
            predicate,
        })
    }

    fn normalize(&self, value: &ClauseValue) -> ClauseValue {
        value.map_values(|v| self.normalizer.normalize(v))
    }
}
