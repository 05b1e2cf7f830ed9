use crate::binding::Binding;
use crate::error::{QueryEvaluationError, ThinError, ThinResult};
use crate::functions;
use crate::numeric::Numeric;
use crate::supported::is_supported_function;
use crate::value::{compare, effective_boolean_value, equals, order_terms};
use oxiri::Iri;
use oxrdf::{BlankNode, Literal, NamedNode, Subject, Term, Triple, Variable};
use rdf_transform_model::TripleIndex;
use rustc_hash::FxHashSet;
use spargebra::algebra::{Expression, Function, GraphPattern, OrderExpression};
use spargebra::term::{GroundTerm, NamedNodePattern, TermPattern, TriplePattern};
use std::cmp::Ordering;

pub(crate) type EvaluationResult<T> = Result<T, QueryEvaluationError>;

/// Evaluates graph patterns and expressions over the triples of one resource.
///
/// Every leaf pattern starts from `seed`, which is how the outer solution of an `EXISTS` is
/// substituted into its pattern.
pub(crate) struct SolutionEvaluator<'a> {
    pub(crate) index: &'a TripleIndex,
    base_iri: Option<Iri<String>>,
    pub(crate) seed: Binding,
}

impl<'a> SolutionEvaluator<'a> {
    pub(crate) fn new(index: &'a TripleIndex, base_iri: Option<Iri<String>>) -> Self {
        Self {
            index,
            base_iri,
            seed: Binding::default(),
        }
    }

    fn seeded(&self, seed: Binding) -> Self {
        Self {
            index: self.index,
            base_iri: self.base_iri.clone(),
            seed,
        }
    }

    pub(crate) fn evaluate(&self, pattern: &GraphPattern) -> EvaluationResult<Vec<Binding>> {
        let solutions = match pattern {
            GraphPattern::Bgp { patterns } => self.evaluate_bgp(patterns),
            GraphPattern::Path {
                subject,
                path,
                object,
            } => self.evaluate_path_pattern(subject, path, object),
            GraphPattern::Join { left, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                left.iter()
                    .flat_map(|l| right.iter().filter_map(|r| l.merge(r)))
                    .collect()
            }
            GraphPattern::LeftJoin {
                left,
                right,
                expression,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                let mut solutions = Vec::new();
                for l in left {
                    let mut matched = false;
                    for r in &right {
                        let Some(merged) = l.merge(r) else {
                            continue;
                        };
                        let passes = match expression {
                            Some(expression) => self.filter_passes(expression, &merged)?,
                            None => true,
                        };
                        if passes {
                            matched = true;
                            solutions.push(merged);
                        }
                    }
                    if !matched {
                        solutions.push(l);
                    }
                }
                solutions
            }
            GraphPattern::Filter { expr, inner } => {
                let mut solutions = Vec::new();
                for solution in self.evaluate(inner)? {
                    if self.filter_passes(expr, &solution)? {
                        solutions.push(solution);
                    }
                }
                solutions
            }
            GraphPattern::Union { left, right } => {
                let mut solutions = self.evaluate(left)?;
                solutions.extend(self.evaluate(right)?);
                solutions
            }
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let mut solutions = self.evaluate(inner)?;
                for solution in &mut solutions {
                    if let Some(value) = self.evaluate_expression(expression, solution)? {
                        solution.insert(variable.clone(), value);
                    }
                }
                solutions
            }
            GraphPattern::Minus { left, right } => {
                let right = self.evaluate(right)?;
                self.evaluate(left)?
                    .into_iter()
                    .filter(|l| {
                        !right
                            .iter()
                            .any(|r| l.shares_variable_with(r) && l.is_compatible(r))
                    })
                    .collect()
            }
            GraphPattern::Values {
                variables,
                bindings,
            } => bindings
                .iter()
                .filter_map(|row| {
                    let mut solution = self.seed.clone();
                    let consistent = variables.iter().zip(row).all(|(variable, value)| {
                        value
                            .as_ref()
                            .map_or(true, |value| solution.unify(variable, &ground_term(value)))
                    });
                    consistent.then_some(solution)
                })
                .collect(),
            GraphPattern::OrderBy { inner, expression } => {
                self.evaluate_order_by(inner, expression)?
            }
            GraphPattern::Project { inner, variables } => self
                .evaluate(inner)?
                .iter()
                .map(|solution| solution.project(variables))
                .collect(),
            GraphPattern::Distinct { inner } => {
                let mut seen = FxHashSet::default();
                self.evaluate(inner)?
                    .into_iter()
                    .filter(|solution| seen.insert(solution.canonical_key()))
                    .collect()
            }
            GraphPattern::Reduced { inner } => self.evaluate(inner)?,
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => self
                .evaluate(inner)?
                .into_iter()
                .skip(*start)
                .take(length.unwrap_or(usize::MAX))
                .collect(),
            GraphPattern::Group {
                inner,
                variables,
                aggregates,
            } => self.evaluate_group(inner, variables, aggregates)?,
            GraphPattern::Graph { .. } => {
                return QueryEvaluationError::not_implemented("GRAPH patterns");
            }
            GraphPattern::Service { .. } => {
                return QueryEvaluationError::not_implemented("SERVICE patterns");
            }
        };
        Ok(solutions)
    }

    fn evaluate_bgp(&self, patterns: &[TriplePattern]) -> Vec<Binding> {
        let mut solutions = vec![self.seed.clone()];
        for pattern in patterns {
            solutions = solutions
                .iter()
                .flat_map(|solution| self.match_triple_pattern(pattern, solution))
                .collect();
            if solutions.is_empty() {
                break;
            }
        }
        solutions
    }

    fn match_triple_pattern(&self, pattern: &TriplePattern, solution: &Binding) -> Vec<Binding> {
        let candidates: Vec<&Triple> = match (
            bound_value(&pattern.subject, solution),
            bound_value(&pattern.object, solution),
        ) {
            (Some(subject), _) => match term_to_subject(subject) {
                Some(subject) => self.index.triples_for_subject(&subject).collect(),
                None => return Vec::new(),
            },
            (None, Some(object)) => self.index.triples_for_object(&object).collect(),
            (None, None) => self.index.iter().collect(),
        };

        candidates
            .into_iter()
            .filter_map(|triple| {
                let mut solution = solution.clone();
                let matches = unify_term_pattern(
                    &mut solution,
                    &pattern.subject,
                    &triple.subject.clone().into(),
                ) && unify_named_node_pattern(&mut solution, &pattern.predicate, &triple.predicate)
                    && unify_term_pattern(&mut solution, &pattern.object, &triple.object);
                matches.then_some(solution)
            })
            .collect()
    }

    fn evaluate_order_by(
        &self,
        inner: &GraphPattern,
        expressions: &[OrderExpression],
    ) -> EvaluationResult<Vec<Binding>> {
        let mut keyed = Vec::new();
        for solution in self.evaluate(inner)? {
            let mut keys = Vec::with_capacity(expressions.len());
            for expression in expressions {
                let (OrderExpression::Asc(expression) | OrderExpression::Desc(expression)) =
                    expression;
                keys.push(self.evaluate_expression(expression, &solution)?);
            }
            keyed.push((keys, solution));
        }

        keyed.sort_by(|(lhs, _), (rhs, _)| {
            for ((lhs, rhs), expression) in lhs.iter().zip(rhs).zip(expressions) {
                let ordering = order_terms(lhs.as_ref(), rhs.as_ref());
                let ordering = match expression {
                    OrderExpression::Asc(_) => ordering,
                    OrderExpression::Desc(_) => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        Ok(keyed.into_iter().map(|(_, solution)| solution).collect())
    }

    fn filter_passes(&self, expression: &Expression, solution: &Binding) -> EvaluationResult<bool> {
        Ok(self.evaluate_ebv(expression, solution)?.unwrap_or(false))
    }

    fn evaluate_ebv(
        &self,
        expression: &Expression,
        solution: &Binding,
    ) -> EvaluationResult<Option<bool>> {
        Ok(self
            .evaluate_expression(expression, solution)?
            .and_then(|value| effective_boolean_value(&value).ok()))
    }

    /// Evaluates `expression`. `None` stands for an expression error (e.g. an unbound variable).
    pub(crate) fn evaluate_expression(
        &self,
        expression: &Expression,
        solution: &Binding,
    ) -> EvaluationResult<Option<Term>> {
        let value = match expression {
            Expression::NamedNode(node) => Some(node.clone().into()),
            Expression::Literal(literal) => Some(literal.clone().into()),
            Expression::Variable(variable) => solution.get(variable).cloned(),
            Expression::Or(lhs, rhs) => {
                let lhs = self.evaluate_ebv(lhs, solution)?;
                if lhs == Some(true) {
                    Some(boolean(true))
                } else {
                    match (lhs, self.evaluate_ebv(rhs, solution)?) {
                        (_, Some(true)) => Some(boolean(true)),
                        (Some(false), Some(false)) => Some(boolean(false)),
                        _ => None,
                    }
                }
            }
            Expression::And(lhs, rhs) => {
                let lhs = self.evaluate_ebv(lhs, solution)?;
                if lhs == Some(false) {
                    Some(boolean(false))
                } else {
                    match (lhs, self.evaluate_ebv(rhs, solution)?) {
                        (_, Some(false)) => Some(boolean(false)),
                        (Some(true), Some(true)) => Some(boolean(true)),
                        _ => None,
                    }
                }
            }
            Expression::Equal(lhs, rhs) => self
                .evaluate_pair(lhs, rhs, solution)?
                .and_then(|(lhs, rhs)| equals(&lhs, &rhs).ok())
                .map(boolean),
            Expression::SameTerm(lhs, rhs) => self
                .evaluate_pair(lhs, rhs, solution)?
                .map(|(lhs, rhs)| boolean(lhs == rhs)),
            Expression::Greater(lhs, rhs) => {
                self.evaluate_comparison(lhs, rhs, solution, Ordering::is_gt)?
            }
            Expression::GreaterOrEqual(lhs, rhs) => {
                self.evaluate_comparison(lhs, rhs, solution, Ordering::is_ge)?
            }
            Expression::Less(lhs, rhs) => {
                self.evaluate_comparison(lhs, rhs, solution, Ordering::is_lt)?
            }
            Expression::LessOrEqual(lhs, rhs) => {
                self.evaluate_comparison(lhs, rhs, solution, Ordering::is_le)?
            }
            Expression::In(needle, haystack) => {
                let Some(needle) = self.evaluate_expression(needle, solution)? else {
                    return Ok(None);
                };
                let mut had_error = false;
                let mut found = false;
                for candidate in haystack {
                    match self
                        .evaluate_expression(candidate, solution)?
                        .map(|candidate| equals(&needle, &candidate))
                    {
                        Some(Ok(true)) => {
                            found = true;
                            break;
                        }
                        Some(Ok(false)) => {}
                        None | Some(Err(_)) => had_error = true,
                    }
                }
                match (found, had_error) {
                    (true, _) => Some(boolean(true)),
                    (false, false) => Some(boolean(false)),
                    (false, true) => None,
                }
            }
            Expression::Add(lhs, rhs) => {
                self.evaluate_arithmetic(lhs, rhs, solution, Numeric::checked_add)?
            }
            Expression::Subtract(lhs, rhs) => {
                self.evaluate_arithmetic(lhs, rhs, solution, Numeric::checked_sub)?
            }
            Expression::Multiply(lhs, rhs) => {
                self.evaluate_arithmetic(lhs, rhs, solution, Numeric::checked_mul)?
            }
            Expression::Divide(lhs, rhs) => {
                self.evaluate_arithmetic(lhs, rhs, solution, Numeric::checked_div)?
            }
            Expression::UnaryPlus(inner) => self
                .evaluate_numeric(inner, solution)?
                .map(|value| value.into_literal().into()),
            Expression::UnaryMinus(inner) => self
                .evaluate_numeric(inner, solution)?
                .and_then(|value| value.checked_neg().ok())
                .map(|value| value.into_literal().into()),
            Expression::Not(inner) => self
                .evaluate_ebv(inner, solution)?
                .map(|value| boolean(!value)),
            Expression::Exists(pattern) => {
                let exists = !self.seeded(solution.clone()).evaluate(pattern)?.is_empty();
                Some(boolean(exists))
            }
            Expression::Bound(variable) => Some(boolean(solution.get(variable).is_some())),
            Expression::If(condition, then, otherwise) => {
                match self.evaluate_ebv(condition, solution)? {
                    Some(true) => self.evaluate_expression(then, solution)?,
                    Some(false) => self.evaluate_expression(otherwise, solution)?,
                    None => None,
                }
            }
            Expression::Coalesce(alternatives) => {
                for alternative in alternatives {
                    if let Some(value) = self.evaluate_expression(alternative, solution)? {
                        return Ok(Some(value));
                    }
                }
                None
            }
            Expression::FunctionCall(function, arguments) => {
                if !is_supported_function(function) {
                    return QueryEvaluationError::not_implemented(format!(
                        "the function {function}"
                    ));
                }
                let mut values = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    match self.evaluate_expression(argument, solution)? {
                        Some(value) => values.push(value),
                        None => return Ok(None),
                    }
                }
                self.call_function(function, &values).ok()
            }
        };
        Ok(value)
    }

    fn evaluate_pair(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
    ) -> EvaluationResult<Option<(Term, Term)>> {
        let Some(lhs) = self.evaluate_expression(lhs, solution)? else {
            return Ok(None);
        };
        Ok(self
            .evaluate_expression(rhs, solution)?
            .map(|rhs| (lhs, rhs)))
    }

    fn evaluate_comparison(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
        accept: fn(Ordering) -> bool,
    ) -> EvaluationResult<Option<Term>> {
        Ok(self
            .evaluate_pair(lhs, rhs, solution)?
            .and_then(|(lhs, rhs)| compare(&lhs, &rhs).ok())
            .map(|ordering| boolean(accept(ordering))))
    }

    fn evaluate_numeric(
        &self,
        expression: &Expression,
        solution: &Binding,
    ) -> EvaluationResult<Option<Numeric>> {
        Ok(match self.evaluate_expression(expression, solution)? {
            Some(Term::Literal(literal)) => Numeric::from_literal(&literal).ok(),
            _ => None,
        })
    }

    fn evaluate_arithmetic(
        &self,
        lhs: &Expression,
        rhs: &Expression,
        solution: &Binding,
        operation: fn(Numeric, Numeric) -> ThinResult<Numeric>,
    ) -> EvaluationResult<Option<Term>> {
        let Some(lhs) = self.evaluate_numeric(lhs, solution)? else {
            return Ok(None);
        };
        let Some(rhs) = self.evaluate_numeric(rhs, solution)? else {
            return Ok(None);
        };
        Ok(operation(lhs, rhs)
            .ok()
            .map(|value| value.into_literal().into()))
    }

    fn call_function(&self, function: &Function, arguments: &[Term]) -> ThinResult<Term> {
        let argument = |index: usize| arguments.get(index).ok_or(ThinError::default());
        match function {
            Function::Str => functions::string_value(argument(0)?),
            Function::Lang => functions::lang(argument(0)?),
            Function::LangMatches => functions::lang_matches(argument(0)?, argument(1)?),
            Function::Datatype => functions::datatype(argument(0)?),
            Function::Iri => functions::iri(argument(0)?, self.base_iri.as_ref()),
            Function::BNode => functions::bnode(arguments.first()),
            Function::Rand => Ok(functions::rand()),
            Function::Abs => functions::abs(argument(0)?),
            Function::Ceil => functions::ceil(argument(0)?),
            Function::Floor => functions::floor(argument(0)?),
            Function::Round => functions::round(argument(0)?),
            Function::Concat => functions::concat(arguments),
            Function::SubStr => functions::substr(argument(0)?, argument(1)?, arguments.get(2)),
            Function::StrLen => functions::str_len(argument(0)?),
            Function::Replace => functions::replace(
                argument(0)?,
                argument(1)?,
                argument(2)?,
                arguments.get(3),
            ),
            Function::UCase => functions::ucase(argument(0)?),
            Function::LCase => functions::lcase(argument(0)?),
            Function::EncodeForUri => functions::encode_for_uri(argument(0)?),
            Function::Contains => functions::contains(argument(0)?, argument(1)?),
            Function::StrStarts => functions::str_starts(argument(0)?, argument(1)?),
            Function::StrEnds => functions::str_ends(argument(0)?, argument(1)?),
            Function::StrBefore => functions::str_before(argument(0)?, argument(1)?),
            Function::StrAfter => functions::str_after(argument(0)?, argument(1)?),
            Function::Year => functions::year(argument(0)?),
            Function::Month => functions::month(argument(0)?),
            Function::Day => functions::day(argument(0)?),
            Function::Hours => functions::hours(argument(0)?),
            Function::Minutes => functions::minutes(argument(0)?),
            Function::Seconds => functions::seconds(argument(0)?),
            Function::Uuid => Ok(functions::uuid()),
            Function::StrUuid => Ok(functions::str_uuid()),
            Function::Md5 => functions::md5(argument(0)?),
            Function::Sha1 => functions::sha1(argument(0)?),
            Function::Sha256 => functions::sha256(argument(0)?),
            Function::Sha384 => functions::sha384(argument(0)?),
            Function::Sha512 => functions::sha512(argument(0)?),
            Function::StrLang => functions::str_lang(argument(0)?, argument(1)?),
            Function::StrDt => functions::str_dt(argument(0)?, argument(1)?),
            Function::IsIri => Ok(functions::is_iri(argument(0)?)),
            Function::IsBlank => Ok(functions::is_blank(argument(0)?)),
            Function::IsLiteral => Ok(functions::is_literal(argument(0)?)),
            Function::IsNumeric => Ok(functions::is_numeric(argument(0)?)),
            Function::Regex => functions::regex(argument(0)?, argument(1)?, arguments.get(2)),
            // Rejected by is_supported_function before the arguments are evaluated.
            _ => ThinError::expected(),
        }
    }
}

/// Blank nodes in graph patterns behave like variables that cannot be projected.
pub(crate) fn blank_node_variable(node: &BlankNode) -> Variable {
    Variable::new_unchecked(format!("_:{}", node.as_str()))
}

pub(crate) fn bound_value(pattern: &TermPattern, solution: &Binding) -> Option<Term> {
    match pattern {
        TermPattern::NamedNode(node) => Some(node.clone().into()),
        TermPattern::Literal(literal) => Some(literal.clone().into()),
        TermPattern::BlankNode(node) => solution.get(&blank_node_variable(node)).cloned(),
        TermPattern::Variable(variable) => solution.get(variable).cloned(),
    }
}

pub(crate) fn unify_term_pattern(solution: &mut Binding, pattern: &TermPattern, value: &Term) -> bool {
    match pattern {
        TermPattern::NamedNode(node) => matches!(value, Term::NamedNode(value) if value == node),
        TermPattern::Literal(literal) => matches!(value, Term::Literal(value) if value == literal),
        TermPattern::BlankNode(node) => solution.unify(&blank_node_variable(node), value),
        TermPattern::Variable(variable) => solution.unify(variable, value),
    }
}

fn unify_named_node_pattern(
    solution: &mut Binding,
    pattern: &NamedNodePattern,
    value: &NamedNode,
) -> bool {
    match pattern {
        NamedNodePattern::NamedNode(node) => node == value,
        NamedNodePattern::Variable(variable) => solution.unify(variable, &value.clone().into()),
    }
}

pub(crate) fn term_to_subject(term: Term) -> Option<Subject> {
    match term {
        Term::NamedNode(node) => Some(node.into()),
        Term::BlankNode(node) => Some(node.into()),
        Term::Literal(_) => None,
    }
}

fn ground_term(term: &GroundTerm) -> Term {
    match term {
        GroundTerm::NamedNode(node) => node.clone().into(),
        GroundTerm::Literal(literal) => literal.clone().into(),
    }
}

pub(crate) fn boolean(value: bool) -> Term {
    Literal::from(value).into()
}
