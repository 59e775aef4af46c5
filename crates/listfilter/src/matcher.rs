//! Predicate evaluation against JSON documents.
//!
//! This module provides the [`PredicateMatcher`], an in-memory reference
//! executor for compiled predicates. It follows document-store conventions:
//! equality against `null` also matches a missing field, scalar operators
//! match an array field when any element matches, and regex operators only
//! match strings.
//!
//! # Example
//!
//! ```
//! use listfilter_rs::{compile, PredicateMatcher};
//! use serde_json::json;
//!
//! let predicate = compile("title:lower = 'Report' && pages > 3").unwrap();
//! let matcher = PredicateMatcher::new(&predicate).unwrap();
//!
//! assert!(matcher.matches(&json!({"title": "REPORT", "pages": 10})));
//! assert!(!matcher.matches(&json!({"title": "Reports", "pages": 10})));
//! ```

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde_json::Value as Json;

use super::error::MatchError;
use super::predicate::{Constraint, ConstraintOperator, Predicate};
use super::value::{timestamp_from_millis, Value};

/// Evaluates a compiled predicate against documents.
///
/// Regular expressions are compiled once, when the matcher is created.
#[derive(Debug)]
pub struct PredicateMatcher<'a> {
    predicate: &'a Predicate,
    regexes: HashMap<(String, bool), Regex>,
}

impl<'a> PredicateMatcher<'a> {
    /// Creates a matcher, compiling every regex constraint in the predicate.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::InvalidRegex` if a regex constraint holds a
    /// pattern the regex engine rejects.
    pub fn new(predicate: &'a Predicate) -> Result<Self, MatchError> {
        let mut regexes = HashMap::new();

        for constraint in predicate.constraints() {
            let is_regex = matches!(
                constraint.operator,
                ConstraintOperator::Matches | ConstraintOperator::NotMatches
            );
            let Some(pattern) = constraint.value.as_str().filter(|_| is_regex) else {
                continue;
            };

            let key = (pattern.to_string(), constraint.is_case_insensitive());
            if regexes.contains_key(&key) {
                continue;
            }
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(key.1)
                .build()
                .map_err(|e| MatchError::InvalidRegex {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
            regexes.insert(key, regex);
        }

        Ok(Self { predicate, regexes })
    }

    /// Returns true if the document matches the predicate.
    pub fn matches(&self, document: &Json) -> bool {
        self.evaluate_predicate(self.predicate, document)
    }

    /// Filters a slice of documents, returning only those that match.
    pub fn filter_documents<'b>(&self, documents: &'b [Json]) -> Vec<&'b Json> {
        documents.iter().filter(|doc| self.matches(doc)).collect()
    }

    fn evaluate_predicate(&self, predicate: &Predicate, document: &Json) -> bool {
        match predicate {
            Predicate::Constraint(c) => self.evaluate_constraint(c, document.get(&c.field)),
            Predicate::And { children } => children
                .iter()
                .all(|child| self.evaluate_predicate(child, document)),
            Predicate::Or { children } => children
                .iter()
                .any(|child| self.evaluate_predicate(child, document)),
        }
    }

    fn evaluate_constraint(&self, constraint: &Constraint, field: Option<&Json>) -> bool {
        let value = &constraint.value;
        match constraint.operator {
            ConstraintOperator::Eq => equals(field, value),
            ConstraintOperator::Ne => !equals(field, value),
            ConstraintOperator::Gt => compares(field, value, Ordering::is_gt),
            ConstraintOperator::Gte => compares(field, value, Ordering::is_ge),
            ConstraintOperator::Lt => compares(field, value, Ordering::is_lt),
            ConstraintOperator::Lte => compares(field, value, Ordering::is_le),
            ConstraintOperator::Matches => self.regex_matches(constraint, field),
            ConstraintOperator::NotMatches => !self.regex_matches(constraint, field),
            ConstraintOperator::SizeEq => size_equals(field, value),
        }
    }

    fn regex_matches(&self, constraint: &Constraint, field: Option<&Json>) -> bool {
        let Some(pattern) = constraint.value.as_str() else {
            return false;
        };
        let Some(regex) = self
            .regexes
            .get(&(pattern.to_string(), constraint.is_case_insensitive()))
        else {
            return false;
        };

        match field {
            Some(Json::String(s)) => regex.is_match(s),
            Some(Json::Array(items)) => items
                .iter()
                .any(|item| item.as_str().is_some_and(|s| regex.is_match(s))),
            _ => false,
        }
    }
}

/// Equality with array-element and missing-field semantics.
fn equals(field: Option<&Json>, value: &Value) -> bool {
    match field {
        None => matches!(value, Value::Null),
        Some(Json::Array(items)) => items.iter().any(|item| scalar_equals(item, value)),
        Some(json) => scalar_equals(json, value),
    }
}

fn scalar_equals(json: &Json, value: &Value) -> bool {
    match value {
        Value::String(s) => json.as_str() == Some(s.as_str()),
        Value::Number(n) => json.as_f64() == Some(*n),
        Value::Bool(b) => json.as_bool() == Some(*b),
        Value::Null => json.is_null(),
        Value::Timestamp(t) => json_timestamp(json) == Some(*t),
    }
}

/// Range comparison; only same-typed values are comparable.
fn compares(field: Option<&Json>, value: &Value, accept: fn(Ordering) -> bool) -> bool {
    match field {
        None => false,
        Some(Json::Array(items)) => items
            .iter()
            .any(|item| scalar_cmp(item, value).is_some_and(accept)),
        Some(json) => scalar_cmp(json, value).is_some_and(accept),
    }
}

fn scalar_cmp(json: &Json, value: &Value) -> Option<Ordering> {
    match value {
        Value::String(s) => json.as_str().map(|j| j.cmp(s.as_str())),
        Value::Number(n) => json.as_f64().and_then(|j| j.partial_cmp(n)),
        Value::Bool(b) => json.as_bool().map(|j| j.cmp(b)),
        Value::Null => None,
        Value::Timestamp(t) => json_timestamp(json).map(|j| j.cmp(t)),
    }
}

fn size_equals(field: Option<&Json>, value: &Value) -> bool {
    let Some(expected) = value.as_f64() else {
        return false;
    };
    let size = match field {
        Some(Json::Array(items)) => items.len(),
        Some(Json::String(s)) => s.chars().count(),
        _ => return false,
    };
    size as f64 == expected
}

/// Reads an instant from an RFC 3339 string, epoch milliseconds, or an
/// extended-JSON `{"$date": ...}` wrapper around either.
fn json_timestamp(json: &Json) -> Option<DateTime<Utc>> {
    match json {
        Json::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|t| t.with_timezone(&Utc)),
        Json::Number(n) => n.as_f64().and_then(timestamp_from_millis),
        Json::Object(map) => map.get("$date").and_then(json_timestamp),
        _ => None,
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
