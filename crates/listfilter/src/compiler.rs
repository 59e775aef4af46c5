//! The compilation pipeline: text to tokens to AST to predicate.

use super::builder::PredicateBuilder;
use super::clock::{Clock, SystemClock};
use super::error::CompileResult;
use super::evaluator::ValueEvaluator;
use super::parser::FilterParser;
use super::predicate::Predicate;

/// Compiles filter expressions into predicates.
///
/// A compiler owns nothing but its clock, so one instance can be shared by
/// reference across threads and reused for any number of filters. Each call
/// parses its input from scratch.
///
/// # Example
///
/// ```
/// use listfilter_rs::{FilterCompiler, Predicate};
///
/// let compiler = FilterCompiler::new();
/// let predicate = compiler.compile("status = 'active' && age >= 18").unwrap();
/// assert!(matches!(predicate, Predicate::And { .. }));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterCompiler<C = SystemClock> {
    clock: C,
}

impl FilterCompiler<SystemClock> {
    /// Creates a compiler that resolves macros against the wall clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> FilterCompiler<C> {
    /// Creates a compiler that resolves macros against `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// Compiles a filter expression into a predicate.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::Lex` or `CompileError::Parse` for malformed
    /// input and `CompileError::Eval` when a value cannot be evaluated or a
    /// comparison cannot be lowered.
    pub fn compile(&self, input: &str) -> CompileResult<Predicate> {
        let expression = FilterParser::parse(input)?;
        let evaluator = ValueEvaluator::new(&self.clock, input);
        let predicate = PredicateBuilder::new(evaluator).build(&expression.logical)?;
        tracing::debug!(filter = input, %predicate, "compiled filter");
        Ok(predicate)
    }
}

/// Compiles a filter expression using the wall clock.
///
/// This is shorthand for `FilterCompiler::new().compile(input)`.
///
/// # Example
///
/// ```
/// use listfilter_rs::{compile, ConstraintOperator, Value};
///
/// let predicate = compile("age > 21").unwrap();
/// let constraint = predicate.as_constraint().unwrap();
/// assert_eq!(constraint.field, "age");
/// assert_eq!(constraint.operator, ConstraintOperator::Gt);
/// assert_eq!(constraint.value, Value::Number(21.0));
/// ```
pub fn compile(input: &str) -> CompileResult<Predicate> {
    FilterCompiler::new().compile(input)
}
