use crate::binding::Binding;
use crate::error::QueryEvaluationError;
use crate::eval::{EvaluationResult, SolutionEvaluator};
use crate::functions::StringLiteral;
use crate::numeric::Numeric;
use crate::value::order_terms;
use oxrdf::{Literal, Term, Variable};
use rustc_hash::{FxHashMap, FxHashSet};
use spargebra::algebra::{AggregateExpression, AggregateFunction, GraphPattern};
use std::collections::hash_map::Entry;

impl SolutionEvaluator<'_> {
    /// Groups the solutions of `inner` and computes one solution per group.
    ///
    /// Groups are reported in the order in which their first member was produced. Without group
    /// variables, all solutions (possibly none) form a single group.
    pub(crate) fn evaluate_group(
        &self,
        inner: &GraphPattern,
        variables: &[Variable],
        aggregates: &[(Variable, AggregateExpression)],
    ) -> EvaluationResult<Vec<Binding>> {
        let mut groups: Vec<(Vec<Option<Term>>, Vec<Binding>)> = Vec::new();
        let mut positions: FxHashMap<Vec<Option<Term>>, usize> = FxHashMap::default();
        for solution in self.evaluate(inner)? {
            let key = solution.values_of(variables);
            match positions.entry(key.clone()) {
                Entry::Occupied(entry) => groups[*entry.get()].1.push(solution),
                Entry::Vacant(entry) => {
                    entry.insert(groups.len());
                    groups.push((key, vec![solution]));
                }
            }
        }
        if groups.is_empty() && variables.is_empty() {
            groups.push((Vec::new(), Vec::new()));
        }

        let mut solutions = Vec::with_capacity(groups.len());
        for (key, members) in groups {
            let mut solution = Binding::default();
            for (variable, value) in variables.iter().zip(key) {
                if let Some(value) = value {
                    solution.insert(variable.clone(), value);
                }
            }
            for (variable, aggregate) in aggregates {
                if let Some(value) = self.evaluate_aggregate(aggregate, &members)? {
                    solution.insert(variable.clone(), value);
                }
            }
            solutions.push(solution);
        }
        Ok(solutions)
    }

    fn evaluate_aggregate(
        &self,
        aggregate: &AggregateExpression,
        members: &[Binding],
    ) -> EvaluationResult<Option<Term>> {
        let (name, expr, distinct) = match aggregate {
            AggregateExpression::CountSolutions { distinct } => {
                let count = if *distinct {
                    members
                        .iter()
                        .map(Binding::canonical_key)
                        .collect::<FxHashSet<_>>()
                        .len()
                } else {
                    members.len()
                };
                return Ok(count_literal(count));
            }
            AggregateExpression::FunctionCall {
                name,
                expr,
                distinct,
            } => (name, expr, *distinct),
        };

        let mut values = Vec::with_capacity(members.len());
        let mut had_error = false;
        for member in members {
            match self.evaluate_expression(expr, member)? {
                Some(value) => values.push(value),
                None => had_error = true,
            }
        }
        if distinct {
            let mut seen = FxHashSet::default();
            values.retain(|value| seen.insert(value.clone()));
        }

        let value = match name {
            AggregateFunction::Count => count_literal(values.len()),
            AggregateFunction::Sum => {
                if had_error {
                    None
                } else {
                    sum(&values).map(|sum| sum.into_literal().into())
                }
            }
            AggregateFunction::Avg => {
                if had_error {
                    None
                } else if values.is_empty() {
                    Some(Literal::from(0_i64).into())
                } else {
                    let count = i64::try_from(values.len()).ok().map(Numeric::from);
                    sum(&values)
                        .zip(count)
                        .and_then(|(sum, count)| sum.checked_div(count).ok())
                        .map(|avg| avg.into_literal().into())
                }
            }
            AggregateFunction::Min => values
                .iter()
                .min_by(|lhs, rhs| order_terms(Some(lhs), Some(rhs)))
                .cloned(),
            AggregateFunction::Max => values
                .iter()
                .max_by(|lhs, rhs| order_terms(Some(lhs), Some(rhs)))
                .cloned(),
            AggregateFunction::Sample => values.into_iter().next(),
            AggregateFunction::GroupConcat { separator } => {
                group_concat(&values, separator.as_deref().unwrap_or(" "))
            }
            AggregateFunction::Custom(name) => {
                return QueryEvaluationError::not_implemented(format!(
                    "the custom aggregate {name}"
                ));
            }
        };
        Ok(value)
    }
}

fn count_literal(count: usize) -> Option<Term> {
    i64::try_from(count)
        .ok()
        .map(|count| Literal::from(count).into())
}

fn sum(values: &[Term]) -> Option<Numeric> {
    let mut sum = Numeric::from(0_i64);
    for value in values {
        let Term::Literal(literal) = value else {
            return None;
        };
        sum = sum.checked_add(Numeric::from_literal(literal).ok()?).ok()?;
    }
    Some(sum)
}

/// Joins string values. The language tag is kept only if every value carries the same one.
fn group_concat(values: &[Term], separator: &str) -> Option<Term> {
    let mut parts = Vec::with_capacity(values.len());
    let mut language: Option<Option<&str>> = None;
    for value in values {
        let string = StringLiteral::from_term(value).ok()?;
        language = match language {
            None => Some(string.language),
            Some(previous) if previous == string.language => Some(previous),
            Some(_) => Some(None),
        };
        parts.push(string.value);
    }
    let value = parts.join(separator);
    Some(match language.flatten() {
        Some(language) => Literal::new_language_tagged_literal_unchecked(value, language).into(),
        None => Literal::new_simple_literal(value).into(),
    })
}
