use crate::error::QueryEvaluationError;
use spargebra::algebra::{
    AggregateExpression, AggregateFunction, Expression, Function, GraphPattern, OrderExpression,
};
use spargebra::Query;

/// Rejects queries that use features the in-memory evaluator cannot answer.
///
/// The check runs before any triple is read so that an unsupported query never consumes the
/// triple stream.
pub(crate) fn check_query(query: &Query) -> Result<(), QueryEvaluationError> {
    let (dataset, pattern) = match query {
        Query::Select {
            dataset, pattern, ..
        }
        | Query::Construct {
            dataset, pattern, ..
        }
        | Query::Describe {
            dataset, pattern, ..
        }
        | Query::Ask {
            dataset, pattern, ..
        } => (dataset, pattern),
    };
    if dataset.is_some() {
        return QueryEvaluationError::not_implemented("FROM and FROM NAMED clauses");
    }
    check_pattern(pattern)
}

fn check_pattern(pattern: &GraphPattern) -> Result<(), QueryEvaluationError> {
    match pattern {
        GraphPattern::Bgp { .. } | GraphPattern::Path { .. } | GraphPattern::Values { .. } => {
            Ok(())
        }
        GraphPattern::Join { left, right }
        | GraphPattern::Union { left, right }
        | GraphPattern::Minus { left, right } => {
            check_pattern(left)?;
            check_pattern(right)
        }
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => {
            check_pattern(left)?;
            check_pattern(right)?;
            expression.iter().try_for_each(check_expression)
        }
        GraphPattern::Filter { expr, inner } => {
            check_expression(expr)?;
            check_pattern(inner)
        }
        GraphPattern::Extend {
            inner, expression, ..
        } => {
            check_expression(expression)?;
            check_pattern(inner)
        }
        GraphPattern::OrderBy { inner, expression } => {
            for expression in expression {
                let (OrderExpression::Asc(expression) | OrderExpression::Desc(expression)) =
                    expression;
                check_expression(expression)?;
            }
            check_pattern(inner)
        }
        GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. } => check_pattern(inner),
        GraphPattern::Group {
            inner, aggregates, ..
        } => {
            for (_, aggregate) in aggregates {
                match aggregate {
                    AggregateExpression::CountSolutions { .. } => {}
                    AggregateExpression::FunctionCall {
                        name: AggregateFunction::Custom(name),
                        ..
                    } => {
                        return QueryEvaluationError::not_implemented(format!(
                            "the custom aggregate {name}"
                        ));
                    }
                    AggregateExpression::FunctionCall { expr, .. } => check_expression(expr)?,
                }
            }
            check_pattern(inner)
        }
        GraphPattern::Graph { .. } => QueryEvaluationError::not_implemented("GRAPH patterns"),
        GraphPattern::Service { .. } => QueryEvaluationError::not_implemented("SERVICE patterns"),
    }
}

fn check_expression(expression: &Expression) -> Result<(), QueryEvaluationError> {
    match expression {
        Expression::NamedNode(_)
        | Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Bound(_) => Ok(()),
        Expression::Or(lhs, rhs)
        | Expression::And(lhs, rhs)
        | Expression::Equal(lhs, rhs)
        | Expression::SameTerm(lhs, rhs)
        | Expression::Greater(lhs, rhs)
        | Expression::GreaterOrEqual(lhs, rhs)
        | Expression::Less(lhs, rhs)
        | Expression::LessOrEqual(lhs, rhs)
        | Expression::Add(lhs, rhs)
        | Expression::Subtract(lhs, rhs)
        | Expression::Multiply(lhs, rhs)
        | Expression::Divide(lhs, rhs) => {
            check_expression(lhs)?;
            check_expression(rhs)
        }
        Expression::In(needle, haystack) => {
            check_expression(needle)?;
            haystack.iter().try_for_each(check_expression)
        }
        Expression::UnaryPlus(inner) | Expression::UnaryMinus(inner) | Expression::Not(inner) => {
            check_expression(inner)
        }
        Expression::Exists(pattern) => check_pattern(pattern),
        Expression::If(condition, then, otherwise) => {
            check_expression(condition)?;
            check_expression(then)?;
            check_expression(otherwise)
        }
        Expression::Coalesce(alternatives) => alternatives.iter().try_for_each(check_expression),
        Expression::FunctionCall(function, arguments) => {
            if !is_supported_function(function) {
                return QueryEvaluationError::not_implemented(format!("the function {function}"));
            }
            arguments.iter().try_for_each(check_expression)
        }
    }
}

/// Returns whether the evaluator implements `function`.
///
/// Custom functions and the functions that depend on the evaluation time or on time zone
/// arithmetic are not supported.
pub(crate) fn is_supported_function(function: &Function) -> bool {
    !matches!(
        function,
        Function::Custom(_) | Function::Now | Function::Timezone | Function::Tz
    )
}
