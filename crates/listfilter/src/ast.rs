//! Abstract Syntax Tree (AST) for filter expressions.
//!
//! Every node records the [`Span`] of source text it was parsed from, so the
//! evaluator can report failing sub-expressions verbatim without rebuilding
//! them from token offsets.

use std::fmt;

/// A half-open byte range `[start, end)` into the filter source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a span from two offsets.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the source text covered by this span.
    ///
    /// Returns an empty string if the span does not fit `source`.
    pub fn slice<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.start..self.end).unwrap_or("")
    }
}

/// The root of a parsed filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    /// The top-level logical chain.
    pub logical: LogicalExpression,
}

/// A logical connective joining two comparisons or chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("&&"),
            LogicalOperator::Or => f.write_str("||"),
        }
    }
}

/// A comparison optionally followed by a connective and the rest of the chain.
///
/// Chains are right-recursive: `a && b || c` is `a && (b || c)`. `&&` and `||`
/// have no relative precedence.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    /// The leading comparison.
    pub left: ComparisonExpression,
    /// The connective and the remainder of the chain, if any.
    pub right: Option<(LogicalOperator, Box<LogicalExpression>)>,
    /// Source span of the whole chain.
    pub span: Span,
}

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `~` (wildcard pattern match)
    Like,
    /// `!~` (negated wildcard pattern match)
    NotLike,
}

impl ComparisonOperator {
    /// Maps an operator token's text to its operator.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(ComparisonOperator::Eq),
            "!=" => Some(ComparisonOperator::Ne),
            ">" => Some(ComparisonOperator::Gt),
            ">=" => Some(ComparisonOperator::Gte),
            "<" => Some(ComparisonOperator::Lt),
            "<=" => Some(ComparisonOperator::Lte),
            "~" => Some(ComparisonOperator::Like),
            "!~" => Some(ComparisonOperator::NotLike),
            _ => None,
        }
    }

    /// The operator's symbol as written in a filter.
    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::Eq => "=",
            ComparisonOperator::Ne => "!=",
            ComparisonOperator::Gt => ">",
            ComparisonOperator::Gte => ">=",
            ComparisonOperator::Lt => "<",
            ComparisonOperator::Lte => "<=",
            ComparisonOperator::Like => "~",
            ComparisonOperator::NotLike => "!~",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A field reference with an optional `:modifier` suffix.
///
/// The modifier is kept verbatim; unknown modifiers are rejected when the
/// comparison is lowered, not while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    /// The field name.
    pub name: String,
    /// The modifier name, e.g. `lower` in `title:lower`.
    pub modifier: Option<String>,
    /// Source span of `name[:modifier]`.
    pub span: Span,
}

/// `field op value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpression {
    /// The compared field.
    pub field: Identifier,
    /// The comparison operator.
    pub operator: ComparisonOperator,
    /// The right-hand side.
    pub value: ValueExpression,
    /// Source span of the whole comparison.
    pub span: Span,
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueExpression {
    /// The additive (lowest precedence) level.
    pub additive: AdditiveExpression,
    /// Source span of the value.
    pub span: Span,
}

impl ValueExpression {
    /// Returns the lone primary when the value has no operators.
    pub fn as_primary(&self) -> Option<&PrimaryExpression> {
        let additive = &self.additive;
        if !additive.rest.is_empty() || !additive.left.rest.is_empty() {
            return None;
        }
        Some(&additive.left.left)
    }
}

/// `+` or `-`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditiveOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
}

/// `*` or `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultiplicativeOperator {
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// `Multiplicative (("+"|"-") Multiplicative)*`
#[derive(Debug, Clone, PartialEq)]
pub struct AdditiveExpression {
    pub left: MultiplicativeExpression,
    pub rest: Vec<(AdditiveOperator, MultiplicativeExpression)>,
    pub span: Span,
}

/// `Primary (("*"|"/") Primary)*`
#[derive(Debug, Clone, PartialEq)]
pub struct MultiplicativeExpression {
    pub left: PrimaryExpression,
    pub rest: Vec<(MultiplicativeOperator, PrimaryExpression)>,
    pub span: Span,
}

/// An atomic value with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimaryExpression {
    pub kind: Primary,
    pub span: Span,
}

/// The forms a primary value can take.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// A string literal with its quotes removed.
    String(String),
    /// A number literal.
    Number(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
    /// A macro reference, stored without the `@` prefix.
    Macro(String),
    /// A parenthesized value.
    Group(Box<ValueExpression>),
}

impl Primary {
    /// Returns true for string, number, bool and null literals.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Primary::String(_) | Primary::Number(_) | Primary::Bool(_) | Primary::Null
        )
    }
}
