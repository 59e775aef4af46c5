//! Lowering of the filter AST into a [`Predicate`].
//!
//! | operator | modifier | constraint |
//! |---|---|---|
//! | `=` | none | `Eq v` |
//! | `=` | `lower` | `Matches ^v$`, case-insensitive (v must be a string) |
//! | `=` | `length` | `SizeEq v` (v must be a non-negative whole number) |
//! | `!=` | none | `Ne v` |
//! | `>` `>=` `<` `<=` | none | `Gt` / `Gte` / `Lt` / `Lte` |
//! | `~` | none or `lower` | `Matches wildcard(v)` (v must be a string) |
//! | `!~` | none or `lower` | `NotMatches wildcard(v)` (v must be a string) |
//!
//! Every other operator/modifier pair is rejected.
//!
//! `:lower` never falls back to plain equality: `name:lower = 5` is a
//! `ModifierTypeMismatch`, not `Eq 5`. A fractional or negative length such
//! as `items:length = 2.5` is rejected the same way, so every backend sees
//! an exact element count.

use super::ast::{ComparisonExpression, ComparisonOperator, LogicalExpression, LogicalOperator};
use super::error::{EvalError, EvalResult};
use super::evaluator::ValueEvaluator;
use super::pattern::{exact_regex, wildcard_to_regex};
use super::predicate::{Constraint, ConstraintOperator, Modifier, Predicate};
use super::value::Value;

/// Builds predicates from parsed logical expressions.
pub struct PredicateBuilder<'a> {
    evaluator: ValueEvaluator<'a>,
}

impl<'a> PredicateBuilder<'a> {
    /// Creates a builder that evaluates values with `evaluator`.
    pub fn new(evaluator: ValueEvaluator<'a>) -> Self {
        Self { evaluator }
    }

    /// Lowers a logical chain, keeping its right-nested grouping.
    pub fn build(&self, logical: &LogicalExpression) -> EvalResult<Predicate> {
        let left = self.build_comparison(&logical.left)?;

        let Some((operator, rest)) = &logical.right else {
            return Ok(left);
        };

        let right = self.build(rest)?;
        Ok(match operator {
            LogicalOperator::And => Predicate::and(left, right),
            LogicalOperator::Or => Predicate::or(left, right),
        })
    }

    /// Lowers one comparison into a constraint.
    pub fn build_comparison(&self, comparison: &ComparisonExpression) -> EvalResult<Predicate> {
        let operator = comparison.operator;
        let modifier = match comparison.field.modifier.as_deref() {
            None => None,
            Some(name) => Some(
                Modifier::from_name(name)
                    .ok_or_else(|| EvalError::unsupported_combination(operator.symbol(), name))?,
            ),
        };
        check_combination(operator, modifier)?;

        let value = self.evaluator.evaluate(&comparison.value)?;
        let field = comparison.field.name.clone();

        let constraint = match (operator, modifier) {
            (ComparisonOperator::Eq, None) => Constraint::new(field, ConstraintOperator::Eq, value),
            (ComparisonOperator::Eq, Some(Modifier::Lower)) => {
                let text = require_string_for_modifier(&value, Modifier::Lower)?;
                Constraint::new(field, ConstraintOperator::Matches, exact_regex(text).into())
                    .with_modifier(Modifier::Lower)
            }
            (ComparisonOperator::Eq, Some(Modifier::Length)) => match value {
                Value::Number(n) if n >= 0.0 && n.fract() == 0.0 => {
                    Constraint::new(field, ConstraintOperator::SizeEq, value)
                        .with_modifier(Modifier::Length)
                }
                Value::Number(n) => {
                    return Err(EvalError::modifier_type_mismatch(
                        Modifier::Length.name(),
                        "non-negative integer",
                        format!("number {n}"),
                    ))
                }
                other => {
                    return Err(EvalError::modifier_type_mismatch(
                        Modifier::Length.name(),
                        "number",
                        other.type_name(),
                    ))
                }
            },
            (ComparisonOperator::Ne, None) => Constraint::new(field, ConstraintOperator::Ne, value),
            (ComparisonOperator::Gt, None) => Constraint::new(field, ConstraintOperator::Gt, value),
            (ComparisonOperator::Gte, None) => {
                Constraint::new(field, ConstraintOperator::Gte, value)
            }
            (ComparisonOperator::Lt, None) => Constraint::new(field, ConstraintOperator::Lt, value),
            (ComparisonOperator::Lte, None) => {
                Constraint::new(field, ConstraintOperator::Lte, value)
            }
            (ComparisonOperator::Like | ComparisonOperator::NotLike, modifier) => {
                let pattern = require_string_for_operator(&value, operator)?;
                let constraint_op = if operator == ComparisonOperator::Like {
                    ConstraintOperator::Matches
                } else {
                    ConstraintOperator::NotMatches
                };
                let constraint = Constraint::new(field, constraint_op, wildcard_to_regex(pattern).into());
                match modifier {
                    Some(m) => constraint.with_modifier(m),
                    None => constraint,
                }
            }
            (operator, Some(modifier)) => {
                return Err(EvalError::unsupported_combination(operator.symbol(), modifier.name()))
            }
        };

        tracing::trace!(%constraint, "lowered comparison");
        Ok(constraint.into())
    }
}

/// Rejects operator/modifier pairs that have no lowering.
fn check_combination(operator: ComparisonOperator, modifier: Option<Modifier>) -> EvalResult<()> {
    let supported = match modifier {
        None => true,
        Some(Modifier::Lower) => matches!(
            operator,
            ComparisonOperator::Eq | ComparisonOperator::Like | ComparisonOperator::NotLike
        ),
        Some(Modifier::Length) => operator == ComparisonOperator::Eq,
    };

    match modifier {
        Some(m) if !supported => Err(EvalError::unsupported_combination(operator.symbol(), m.name())),
        _ => Ok(()),
    }
}

fn require_string_for_modifier(value: &Value, modifier: Modifier) -> EvalResult<&str> {
    value
        .as_str()
        .ok_or_else(|| EvalError::modifier_type_mismatch(modifier.name(), "string", value.type_name()))
}

fn require_string_for_operator(value: &Value, operator: ComparisonOperator) -> EvalResult<&str> {
    value
        .as_str()
        .ok_or_else(|| EvalError::operator_type_mismatch(operator.symbol(), "string", value.type_name()))
}
