//! Compiler for the list-endpoint filter language.
//!
//! This crate turns filter strings such as
//! `status = 'active' && created > @now - 604800000` into a backend-neutral
//! [`Predicate`]: a tree of `AND`/`OR` nodes over field constraints whose
//! values are fully evaluated. Storage adapters translate the predicate into
//! their own query language; [`PredicateMatcher`] evaluates it in memory.
//!
//! # Supported Syntax
//!
//! ## Comparisons
//! - `field = value`, `!=`, `>`, `>=`, `<`, `<=`
//! - `field ~ 'pattern'` / `field !~ 'pattern'` - SQL-style wildcards,
//!   `%` for any run of characters and `_` for exactly one
//!
//! ## Modifiers
//! - `field:lower` - case-insensitive `=`, `~` and `!~`
//! - `field:length` - size of an array or string, with `=`
//!
//! ## Values
//! - `'single'` or `"double"` quoted strings, numbers such as `42`, `2.5` or
//!   `1e3`, `true`, `false`, `null`
//! - `@now` - the current instant
//! - arithmetic with `+ - * /` and parentheses; a computed number above
//!   `1e12` is read as epoch milliseconds
//!
//! ## Boolean Operators
//! - `&&` - AND
//! - `||` - OR
//!
//! Both share one precedence level and group to the right:
//! `a = 1 && b = 2 || c = 3` means `a = 1 && (b = 2 || c = 3)`.
//!
//! # Example
//!
//! ```
//! use listfilter_rs::{compile, Predicate};
//!
//! let predicate = compile("a = 1 && b = 2 || c = 3").unwrap();
//! let Predicate::And { children } = &predicate else { panic!() };
//! assert!(matches!(children[1], Predicate::Or { .. }));
//! ```

mod ast;
mod builder;
mod clock;
mod compiler;
mod error;
mod evaluator;
mod lexer;
mod matcher;
mod parser;
pub mod pattern;
mod predicate;
mod value;

pub use ast::{
    AdditiveExpression, AdditiveOperator, ComparisonExpression, ComparisonOperator, Expression,
    Identifier, LogicalExpression, LogicalOperator, MultiplicativeExpression,
    MultiplicativeOperator, Primary, PrimaryExpression, Span, ValueExpression,
};
pub use builder::PredicateBuilder;
pub use clock::{Clock, FixedClock, SystemClock};
pub use compiler::{compile, FilterCompiler};
pub use error::{CompileError, CompileResult, EvalError, EvalResult, LexError, MatchError, ParseError};
pub use evaluator::{Macro, ValueEvaluator};
pub use lexer::{Lexer, Token, TokenKind};
pub use matcher::PredicateMatcher;
pub use parser::{FilterParser, MAX_CLAUSES, MAX_NESTING};
pub use predicate::{Constraint, ConstraintOperator, Modifier, Predicate};
pub use value::{
    infer_timestamp, timestamp_from_millis, timestamp_to_millis, Value,
    TIMESTAMP_MILLIS_THRESHOLD,
};
