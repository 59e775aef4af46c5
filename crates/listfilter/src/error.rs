//! Error types for filter compilation.

use thiserror::Error;

/// A specialized Result type for filter compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// A specialized Result type for value evaluation and predicate lowering.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur while compiling a filter expression.
///
/// No partial predicate is produced when any of these is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompileError {
    /// The input contains a character no token rule accepts.
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    /// The token stream does not follow the filter grammar.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// A value could not be evaluated or a comparison could not be lowered.
    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

/// Error encountered during lexical analysis.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unexpected character '{character}' at offset {offset}")]
pub struct LexError {
    /// The byte offset (0-indexed) where no token rule matched.
    pub offset: usize,
    /// The character that could not be tokenized.
    pub character: char,
}

/// Error encountered while parsing the token stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("expected {} at offset {offset}, found {found}", .expected.join(" or "))]
pub struct ParseError {
    /// The byte offset of the offending token (input length at end of input).
    pub offset: usize,
    /// Descriptions of the token kinds that would have been accepted.
    pub expected: Vec<String>,
    /// Description of the token actually found.
    pub found: String,
}

impl ParseError {
    /// Creates a parse error from a list of expected token descriptions.
    pub fn new(offset: usize, expected: &[&str], found: impl Into<String>) -> Self {
        ParseError {
            offset,
            expected: expected.iter().map(|e| e.to_string()).collect(),
            found: found.into(),
        }
    }
}

/// Errors raised while evaluating values or lowering comparisons.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    /// A macro name has no registered resolution.
    #[error("unsupported macro: @{name}")]
    UnsupportedMacro {
        /// The macro name without its `@` prefix.
        name: String,
    },

    /// An arithmetic sub-expression could not be evaluated.
    #[error("failed to evaluate expression '{expression}': {reason}")]
    ExpressionFailed {
        /// The source text of the sub-expression.
        expression: String,
        /// Why evaluation failed.
        reason: String,
    },

    /// A computed value has no scalar representation.
    #[error("unsupported value type: {type_name}")]
    UnsupportedType {
        /// Description of the offending value.
        type_name: String,
    },

    /// A field modifier was applied to a value of the wrong type.
    #[error("{modifier} modifier requires a {expected} value, found {found}")]
    ModifierTypeMismatch {
        /// The modifier name.
        modifier: String,
        /// The value type the modifier requires.
        expected: String,
        /// The value type actually supplied.
        found: String,
    },

    /// An operator was applied to a value of the wrong type.
    #[error("{operator} operator requires a {expected} value, found {found}")]
    OperatorTypeMismatch {
        /// The operator symbol.
        operator: String,
        /// The value type the operator requires.
        expected: String,
        /// The value type actually supplied.
        found: String,
    },

    /// The operator does not support the modifier on its field.
    #[error("operator {operator} does not support the '{modifier}' modifier")]
    UnsupportedCombination {
        /// The operator symbol.
        operator: String,
        /// The modifier name.
        modifier: String,
    },
}

impl EvalError {
    /// Creates an unsupported macro error.
    pub fn unsupported_macro(name: impl Into<String>) -> Self {
        EvalError::UnsupportedMacro { name: name.into() }
    }

    /// Creates an expression failure error.
    pub fn expression_failed(expression: impl Into<String>, reason: impl Into<String>) -> Self {
        EvalError::ExpressionFailed {
            expression: expression.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unsupported type error.
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        EvalError::UnsupportedType {
            type_name: type_name.into(),
        }
    }

    /// Creates a modifier type mismatch error.
    pub fn modifier_type_mismatch(
        modifier: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        EvalError::ModifierTypeMismatch {
            modifier: modifier.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an operator type mismatch error.
    pub fn operator_type_mismatch(
        operator: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        EvalError::OperatorTypeMismatch {
            operator: operator.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an unsupported operator/modifier combination error.
    pub fn unsupported_combination(operator: impl Into<String>, modifier: impl Into<String>) -> Self {
        EvalError::UnsupportedCombination {
            operator: operator.into(),
            modifier: modifier.into(),
        }
    }
}

/// Errors raised while matching a predicate against documents.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// A regex constraint holds a pattern the regex engine rejects.
    #[error("invalid regular expression '{pattern}': {reason}")]
    InvalidRegex {
        /// The offending pattern.
        pattern: String,
        /// The regex engine's message.
        reason: String,
    },
}
