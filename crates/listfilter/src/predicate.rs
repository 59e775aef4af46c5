//! The backend-neutral predicate produced by compilation.

use std::fmt;

use serde::Serialize;

use super::value::Value;

/// A field modifier recognized by the predicate builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Modifier {
    /// `:lower`: compare case-insensitively.
    Lower,
    /// `:length`: constrain the size of an array or string.
    Length,
}

impl Modifier {
    /// Looks up a modifier by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "lower" => Some(Modifier::Lower),
            "length" => Some(Modifier::Length),
            _ => None,
        }
    }

    /// The modifier's name as written after `:`.
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Lower => "lower",
            Modifier::Length => "length",
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The operation a constraint applies to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintOperator {
    /// Field equals the value.
    Eq,
    /// Field does not equal the value.
    Ne,
    /// Field is greater than the value.
    Gt,
    /// Field is greater than or equal to the value.
    Gte,
    /// Field is less than the value.
    Lt,
    /// Field is less than or equal to the value.
    Lte,
    /// Field matches the regular expression held in the value.
    Matches,
    /// Field does not match the regular expression held in the value.
    NotMatches,
    /// The size of the field (array elements or string characters) equals the value.
    SizeEq,
}

impl fmt::Display for ConstraintOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintOperator::Eq => "==",
            ConstraintOperator::Ne => "!=",
            ConstraintOperator::Gt => ">",
            ConstraintOperator::Gte => ">=",
            ConstraintOperator::Lt => "<",
            ConstraintOperator::Lte => "<=",
            ConstraintOperator::Matches => "=~",
            ConstraintOperator::NotMatches => "!=~",
            ConstraintOperator::SizeEq => "size ==",
        })
    }
}

/// A leaf of the predicate tree: `{field, operator, value, modifier}`.
///
/// For [`ConstraintOperator::Matches`] and [`ConstraintOperator::NotMatches`]
/// the value is a string holding an anchored regular expression, and the
/// `lower` modifier makes it case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    /// The constrained field.
    pub field: String,
    /// The operation.
    pub operator: ConstraintOperator,
    /// The fully evaluated operand.
    pub value: Value,
    /// The modifier the filter applied to the field, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Modifier>,
}

impl Constraint {
    /// Creates a constraint without a modifier.
    pub fn new(field: impl Into<String>, operator: ConstraintOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
            modifier: None,
        }
    }

    /// Sets the modifier.
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifier = Some(modifier);
        self
    }

    /// Returns true when a regex constraint ignores case.
    pub fn is_case_insensitive(&self) -> bool {
        self.modifier == Some(Modifier::Lower)
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(modifier) => write!(
                f,
                "{}:{} {} {}",
                self.field, modifier, self.operator, self.value
            ),
            None => write!(f, "{} {} {}", self.field, self.operator, self.value),
        }
    }
}

/// A compiled filter: a boolean tree of field constraints.
///
/// Combinators produced by compilation always have two children and keep the
/// right-nested grouping of the source filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Predicate {
    /// A single constraint.
    Constraint(Constraint),
    /// All children must hold.
    And {
        /// The conjuncts.
        children: Vec<Predicate>,
    },
    /// At least one child must hold.
    Or {
        /// The disjuncts.
        children: Vec<Predicate>,
    },
}

impl Predicate {
    /// Creates an AND node from two predicates.
    pub fn and(left: Predicate, right: Predicate) -> Self {
        Predicate::And {
            children: vec![left, right],
        }
    }

    /// Creates an OR node from two predicates.
    pub fn or(left: Predicate, right: Predicate) -> Self {
        Predicate::Or {
            children: vec![left, right],
        }
    }

    /// Returns the constraint if this is a leaf.
    pub fn as_constraint(&self) -> Option<&Constraint> {
        match self {
            Predicate::Constraint(c) => Some(c),
            _ => None,
        }
    }

    /// Collects every constraint in the tree, left to right.
    pub fn constraints(&self) -> Vec<&Constraint> {
        let mut out = Vec::new();
        self.collect_constraints(&mut out);
        out
    }

    fn collect_constraints<'a>(&'a self, out: &mut Vec<&'a Constraint>) {
        match self {
            Predicate::Constraint(c) => out.push(c),
            Predicate::And { children } | Predicate::Or { children } => {
                for child in children {
                    child.collect_constraints(out);
                }
            }
        }
    }
}

impl From<Constraint> for Predicate {
    fn from(constraint: Constraint) -> Self {
        Predicate::Constraint(constraint)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, children) = match self {
            Predicate::Constraint(c) => return write!(f, "{c}"),
            Predicate::And { children } => ("AND", children),
            Predicate::Or { children } => ("OR", children),
        };
        write!(f, "{name}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        f.write_str(")")
    }
}
