//! MongoDB query lowering for compiled filter predicates.
//!
//! This crate turns a [`Predicate`] into a MongoDB query document in
//! Extended JSON form, ready to hand to a driver as a `find` filter.
//!
//! | constraint | query fragment |
//! |---|---|
//! | `Eq v` | `{f: v}` |
//! | `Ne v` | `{f: {"$ne": v}}` |
//! | `Gt` `Gte` `Lt` `Lte` | `{f: {"$gt": v}}` and so on |
//! | `Matches p` | `{f: {"$regex": p}}`, with `"$options": "i"` for `:lower` |
//! | `NotMatches p` | `{f: {"$not": {"$regex": p}}}` |
//! | `SizeEq n` | `{f: {"$size": n}}` with `n` as an integer (compiled lengths are always whole) |
//! | `And` / `Or` | `{"$and": [..]}` / `{"$or": [..]}` |
//!
//! Timestamps are written as `{"$date": "<RFC 3339>"}`.
//!
//! # Example
//!
//! ```
//! use listfilter_mongo_rs::compile_to_mongo;
//! use serde_json::json;
//!
//! let query = compile_to_mongo("status = 'active' && title:lower ~ 'intro%'").unwrap();
//! assert_eq!(
//!     query,
//!     json!({"$and": [
//!         {"status": "active"},
//!         {"title": {"$regex": "^intro.*$", "$options": "i"}}
//!     ]})
//! );
//! ```

use chrono::SecondsFormat;
use serde_json::{json, Map, Number, Value as Json};

use listfilter_rs::{
    Clock, CompileResult, Constraint, ConstraintOperator, FilterCompiler, Predicate, Value,
};

/// Lowers a predicate into a MongoDB query document.
pub fn to_mongo_query(predicate: &Predicate) -> Json {
    match predicate {
        Predicate::Constraint(constraint) => constraint_query(constraint),
        Predicate::And { children } => json!({ "$and": lower_all(children) }),
        Predicate::Or { children } => json!({ "$or": lower_all(children) }),
    }
}

/// Compiles a filter and lowers it to a MongoDB query in one step.
///
/// # Errors
///
/// Returns the compiler's error unchanged when the filter does not compile.
pub fn compile_to_mongo(filter: &str) -> CompileResult<Json> {
    compile_to_mongo_with(&FilterCompiler::new(), filter)
}

/// Like [`compile_to_mongo`], using the given compiler (and its clock).
pub fn compile_to_mongo_with<C: Clock>(
    compiler: &FilterCompiler<C>,
    filter: &str,
) -> CompileResult<Json> {
    let predicate = compiler.compile(filter)?;
    let query = to_mongo_query(&predicate);
    tracing::debug!(filter, %query, "lowered filter to mongo query");
    Ok(query)
}

fn lower_all(children: &[Predicate]) -> Vec<Json> {
    children.iter().map(to_mongo_query).collect()
}

fn constraint_query(constraint: &Constraint) -> Json {
    let value = to_extended_json(&constraint.value);

    let condition = match constraint.operator {
        ConstraintOperator::Eq => value,
        ConstraintOperator::Ne => json!({ "$ne": value }),
        ConstraintOperator::Gt => json!({ "$gt": value }),
        ConstraintOperator::Gte => json!({ "$gte": value }),
        ConstraintOperator::Lt => json!({ "$lt": value }),
        ConstraintOperator::Lte => json!({ "$lte": value }),
        ConstraintOperator::Matches => regex_condition(constraint, value),
        ConstraintOperator::NotMatches => json!({ "$not": regex_condition(constraint, value) }),
        ConstraintOperator::SizeEq => {
            let size = constraint.value.as_f64().map_or(0, |n| n as i64);
            json!({ "$size": size })
        }
    };

    let mut query = Map::new();
    query.insert(constraint.field.clone(), condition);
    Json::Object(query)
}

fn regex_condition(constraint: &Constraint, pattern: Json) -> Json {
    if constraint.is_case_insensitive() {
        json!({ "$regex": pattern, "$options": "i" })
    } else {
        json!({ "$regex": pattern })
    }
}

/// Converts a scalar into its Extended JSON representation.
pub fn to_extended_json(value: &Value) -> Json {
    match value {
        Value::String(s) => Json::String(s.clone()),
        Value::Number(n) => Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Bool(b) => Json::Bool(*b),
        Value::Null => Json::Null,
        Value::Timestamp(t) => {
            json!({ "$date": t.to_rfc3339_opts(SecondsFormat::Millis, true) })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listfilter_rs::Modifier;

    #[test]
    fn test_eq_is_bare_value() {
        let predicate = Predicate::Constraint(Constraint::new(
            "status",
            ConstraintOperator::Eq,
            Value::from("active"),
        ));
        assert_eq!(to_mongo_query(&predicate), json!({"status": "active"}));
    }

    #[test]
    fn test_not_matches_keeps_options_inside_not() {
        let predicate = Predicate::Constraint(
            Constraint::new("email", ConstraintOperator::NotMatches, Value::from("^a.*$"))
                .with_modifier(Modifier::Lower),
        );
        assert_eq!(
            to_mongo_query(&predicate),
            json!({"email": {"$not": {"$regex": "^a.*$", "$options": "i"}}})
        );
    }

    #[test]
    fn test_size_truncates() {
        let predicate = Predicate::Constraint(Constraint::new(
            "items",
            ConstraintOperator::SizeEq,
            Value::Number(2.9),
        ));
        assert_eq!(to_mongo_query(&predicate), json!({"items": {"$size": 2}}));
    }

    #[test]
    fn test_extended_json_scalars() {
        assert_eq!(to_extended_json(&Value::Number(1.5)), json!(1.5));
        assert_eq!(to_extended_json(&Value::Bool(false)), json!(false));
        assert_eq!(to_extended_json(&Value::Null), Json::Null);
    }
}
