//! Value evaluation.
//!
//! This module provides the [`ValueEvaluator`], which resolves the right-hand
//! side of a comparison to a [`Value`]. Literals are returned as written, a lone
//! macro resolves to its value, and anything involving operators or
//! parentheses is computed by walking the value tree.
//!
//! # Computed values
//!
//! Inside arithmetic every macro evaluates to epoch milliseconds, numbers
//! combine with `+ - * /` and strings concatenate with `+`. A computed number
//! above [`TIMESTAMP_MILLIS_THRESHOLD`] is read back as a timestamp, so
//! `@now - 604800000` is "seven days ago" rather than a raw count.
//!
//! [`TIMESTAMP_MILLIS_THRESHOLD`]: crate::value::TIMESTAMP_MILLIS_THRESHOLD

use std::fmt;

use chrono::{DateTime, Utc};

use super::ast::{
    AdditiveExpression, AdditiveOperator, MultiplicativeExpression, MultiplicativeOperator,
    Primary, PrimaryExpression, Span, ValueExpression,
};
use super::clock::Clock;
use super::error::{EvalError, EvalResult};
use super::value::{infer_timestamp, timestamp_to_millis, Value};

/// A named runtime value referenced as `@name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Macro {
    /// `@now`: the instant the value is evaluated.
    Now,
}

impl Macro {
    /// Looks up a macro by name (without the `@` prefix).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "now" => Some(Macro::Now),
            _ => None,
        }
    }

    /// Resolves the macro against a clock.
    pub fn resolve(&self, clock: &dyn Clock) -> DateTime<Utc> {
        match self {
            Macro::Now => clock.now(),
        }
    }
}

/// An intermediate arithmetic result.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
}

impl Operand {
    fn type_name(&self) -> &'static str {
        match self {
            Operand::Number(_) => "number",
            Operand::String(_) => "string",
            Operand::Bool(_) => "bool",
            Operand::Null => "null",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ArithmeticOperator {
    Add,
    Sub,
    Mul,
    Div,
}

impl fmt::Display for ArithmeticOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArithmeticOperator::Add => "+",
            ArithmeticOperator::Sub => "-",
            ArithmeticOperator::Mul => "*",
            ArithmeticOperator::Div => "/",
        })
    }
}

impl From<AdditiveOperator> for ArithmeticOperator {
    fn from(op: AdditiveOperator) -> Self {
        match op {
            AdditiveOperator::Add => ArithmeticOperator::Add,
            AdditiveOperator::Sub => ArithmeticOperator::Sub,
        }
    }
}

impl From<MultiplicativeOperator> for ArithmeticOperator {
    fn from(op: MultiplicativeOperator) -> Self {
        match op {
            MultiplicativeOperator::Mul => ArithmeticOperator::Mul,
            MultiplicativeOperator::Div => ArithmeticOperator::Div,
        }
    }
}

/// Evaluates value expressions parsed from one filter source.
///
/// The evaluator borrows the clock and the source text; it keeps no state
/// between calls, and macros read the clock each time they are evaluated.
pub struct ValueEvaluator<'a> {
    clock: &'a dyn Clock,
    source: &'a str,
}

impl<'a> ValueEvaluator<'a> {
    /// Creates an evaluator for values parsed from `source`.
    pub fn new(clock: &'a dyn Clock, source: &'a str) -> Self {
        Self { clock, source }
    }

    /// Evaluates a value expression to a scalar.
    ///
    /// # Errors
    ///
    /// Returns `EvalError::UnsupportedMacro` for an unknown `@name`,
    /// `EvalError::ExpressionFailed` for invalid arithmetic (mismatched
    /// operand types, division by zero) and `EvalError::UnsupportedType` when a
    /// computed number has no representation.
    pub fn evaluate(&self, value: &ValueExpression) -> EvalResult<Value> {
        match value.as_primary().map(|p| &p.kind) {
            Some(Primary::String(s)) => Ok(Value::String(s.clone())),
            Some(Primary::Number(n)) => Ok(Value::Number(*n)),
            Some(Primary::Bool(b)) => Ok(Value::Bool(*b)),
            Some(Primary::Null) => Ok(Value::Null),
            Some(Primary::Macro(name)) => Ok(Value::Timestamp(self.resolve_macro(name)?)),
            Some(Primary::Group(_)) | None => self.evaluate_computed(value),
        }
    }

    fn resolve_macro(&self, name: &str) -> EvalResult<DateTime<Utc>> {
        Macro::from_name(name)
            .map(|m| m.resolve(self.clock))
            .ok_or_else(|| EvalError::unsupported_macro(name))
    }

    fn evaluate_computed(&self, value: &ValueExpression) -> EvalResult<Value> {
        match self.eval_additive(&value.additive)? {
            Operand::Number(n) if !n.is_finite() => {
                Err(EvalError::unsupported_type(format!("non-finite number {n}")))
            }
            Operand::Number(n) => infer_timestamp(n).ok_or_else(|| {
                EvalError::unsupported_type(format!("timestamp out of range ({n} ms)"))
            }),
            Operand::String(s) => Ok(Value::String(s)),
            Operand::Bool(b) => Ok(Value::Bool(b)),
            Operand::Null => Ok(Value::Null),
        }
    }

    fn eval_additive(&self, expr: &AdditiveExpression) -> EvalResult<Operand> {
        let mut acc = self.eval_multiplicative(&expr.left)?;
        for (op, rhs) in &expr.rest {
            let span = Span::new(expr.span.start, rhs.span.end);
            acc = self.apply((*op).into(), acc, self.eval_multiplicative(rhs)?, span)?;
        }
        Ok(acc)
    }

    fn eval_multiplicative(&self, expr: &MultiplicativeExpression) -> EvalResult<Operand> {
        let mut acc = self.eval_primary(&expr.left)?;
        for (op, rhs) in &expr.rest {
            let span = Span::new(expr.span.start, rhs.span.end);
            acc = self.apply((*op).into(), acc, self.eval_primary(rhs)?, span)?;
        }
        Ok(acc)
    }

    fn eval_primary(&self, expr: &PrimaryExpression) -> EvalResult<Operand> {
        match &expr.kind {
            Primary::String(s) => Ok(Operand::String(s.clone())),
            Primary::Number(n) => Ok(Operand::Number(*n)),
            Primary::Bool(b) => Ok(Operand::Bool(*b)),
            Primary::Null => Ok(Operand::Null),
            Primary::Macro(name) => {
                let instant = self.resolve_macro(name)?;
                Ok(Operand::Number(timestamp_to_millis(&instant)))
            }
            Primary::Group(inner) => self.eval_additive(&inner.additive),
        }
    }

    fn apply(
        &self,
        op: ArithmeticOperator,
        lhs: Operand,
        rhs: Operand,
        span: Span,
    ) -> EvalResult<Operand> {
        match (op, lhs, rhs) {
            (ArithmeticOperator::Add, Operand::Number(a), Operand::Number(b)) => {
                Ok(Operand::Number(a + b))
            }
            (ArithmeticOperator::Add, Operand::String(a), Operand::String(b)) => {
                Ok(Operand::String(a + &b))
            }
            (ArithmeticOperator::Sub, Operand::Number(a), Operand::Number(b)) => {
                Ok(Operand::Number(a - b))
            }
            (ArithmeticOperator::Mul, Operand::Number(a), Operand::Number(b)) => {
                Ok(Operand::Number(a * b))
            }
            (ArithmeticOperator::Div, Operand::Number(_), Operand::Number(b)) if b == 0.0 => {
                Err(EvalError::expression_failed(span.slice(self.source), "division by zero"))
            }
            (ArithmeticOperator::Div, Operand::Number(a), Operand::Number(b)) => {
                Ok(Operand::Number(a / b))
            }
            (op, lhs, rhs) => Err(EvalError::expression_failed(
                span.slice(self.source),
                format!(
                    "invalid operation: {} {op} {} (mismatched types)",
                    lhs.type_name(),
                    rhs.type_name()
                ),
            )),
        }
    }
}
