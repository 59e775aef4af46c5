//! Integration tests for filter-to-MongoDB lowering.

use chrono::{TimeZone, Utc};
use serde_json::json;

use listfilter_mongo_rs::{compile_to_mongo, compile_to_mongo_with};
use listfilter_rs::{CompileError, FilterCompiler, FixedClock};

fn fixed_compiler() -> FilterCompiler<FixedClock> {
    FilterCompiler::with_clock(FixedClock(
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap(),
    ))
}

#[test]
fn comparison_operators() {
    assert_eq!(compile_to_mongo("a != 'x'").unwrap(), json!({"a": {"$ne": "x"}}));
    assert_eq!(compile_to_mongo("a > 1").unwrap(), json!({"a": {"$gt": 1.0}}));
    assert_eq!(compile_to_mongo("a >= 1").unwrap(), json!({"a": {"$gte": 1.0}}));
    assert_eq!(compile_to_mongo("a < 1").unwrap(), json!({"a": {"$lt": 1.0}}));
    assert_eq!(compile_to_mongo("a <= 1").unwrap(), json!({"a": {"$lte": 1.0}}));
    assert_eq!(compile_to_mongo("a = null").unwrap(), json!({"a": null}));
    assert_eq!(compile_to_mongo("a = true").unwrap(), json!({"a": true}));
}

#[test]
fn lower_equality_is_anchored_case_insensitive_regex() {
    assert_eq!(
        compile_to_mongo("title:lower = 'C++ Primer'").unwrap(),
        json!({"title": {"$regex": r"^C\+\+ Primer$", "$options": "i"}})
    );
}

#[test]
fn patterns() {
    assert_eq!(
        compile_to_mongo("name ~ 'jo_n%'").unwrap(),
        json!({"name": {"$regex": "^jo.n.*$"}})
    );
    assert_eq!(
        compile_to_mongo("name !~ '%'").unwrap(),
        json!({"name": {"$not": {"$regex": ".*"}}})
    );
}

#[test]
fn length_becomes_size() {
    assert_eq!(
        compile_to_mongo("tags:length = 2").unwrap(),
        json!({"tags": {"$size": 2}})
    );
}

#[test]
fn fractional_length_is_rejected() {
    assert!(matches!(
        compile_to_mongo("tags:length = 2.5"),
        Err(CompileError::Eval(_))
    ));
}

#[test]
fn overflowing_literal_never_becomes_null() {
    assert!(matches!(compile_to_mongo("a = 1e400"), Err(CompileError::Parse(_))));
}

#[test]
fn logical_nesting_is_preserved() {
    assert_eq!(
        compile_to_mongo("a = 1 && b = 2 || c = 3").unwrap(),
        json!({"$and": [
            {"a": 1.0},
            {"$or": [{"b": 2.0}, {"c": 3.0}]}
        ]})
    );
}

#[test]
fn timestamps_use_extended_json_dates() {
    let query = compile_to_mongo_with(&fixed_compiler(), "created > @now - 86400000").unwrap();
    assert_eq!(
        query,
        json!({"created": {"$gt": {"$date": "2024-06-14T12:00:00.000Z"}}})
    );
}

#[test]
fn compile_errors_pass_through() {
    assert!(matches!(compile_to_mongo("a ="), Err(CompileError::Parse(_))));
    assert!(matches!(
        compile_to_mongo("a:length ~ 'x'"),
        Err(CompileError::Eval(_))
    ));
}
