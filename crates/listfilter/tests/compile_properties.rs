//! Integration tests for the public compile API.
//!
//! These exercise `listfilter_rs::compile` end to end with the wall clock,
//! and check compiled predicates against documents with `PredicateMatcher`.

use std::thread;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use listfilter_rs::{
    compile, CompileError, ConstraintOperator, EvalError, FilterCompiler, Predicate,
    PredicateMatcher, Value, MAX_NESTING,
};

fn leaf_value(filter: &str) -> Value {
    let predicate = compile(filter).unwrap();
    predicate
        .as_constraint()
        .unwrap_or_else(|| panic!("expected a leaf for {filter}"))
        .value
        .clone()
}

fn timestamp_of(filter: &str) -> DateTime<Utc> {
    leaf_value(filter)
        .as_timestamp()
        .unwrap_or_else(|| panic!("expected a timestamp for {filter}"))
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn literal_values_round_trip() {
    let cases = [
        ("name = 'Alice'", Value::from("Alice")),
        ("name = \"Alice\"", Value::from("Alice")),
        ("name = ''", Value::from("")),
        ("count = 0", Value::Number(0.0)),
        ("count = 3.25", Value::Number(3.25)),
        ("count = 2E3", Value::Number(2000.0)),
        ("flag = true", Value::Bool(true)),
        ("flag = false", Value::Bool(false)),
        ("parent = null", Value::Null),
    ];

    for (filter, expected) in cases {
        assert_eq!(leaf_value(filter), expected, "filter: {filter}");
    }
}

#[test]
fn literal_keeps_string_content_verbatim() {
    // the opposite quote and wildcard characters are ordinary text here
    assert_eq!(leaf_value("s = \"it's 100%\""), Value::from("it's 100%"));
    assert_eq!(leaf_value("s = 'say \"hi\"'"), Value::from("say \"hi\""));
}

// ============================================================================
// Boolean structure
// ============================================================================

#[test]
fn logical_operators_group_to_the_right() {
    let predicate = compile("a=1 && b=2 || c=3").unwrap();

    let Predicate::And { children } = &predicate else {
        panic!("expected AND at the root, got {predicate}");
    };
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].as_constraint().unwrap().field, "a");

    let Predicate::Or { children: inner } = &children[1] else {
        panic!("expected OR on the right, got {}", children[1]);
    };
    assert_eq!(inner[0].as_constraint().unwrap().field, "b");
    assert_eq!(inner[1].as_constraint().unwrap().field, "c");
}

// ============================================================================
// Modifiers and patterns
// ============================================================================

#[test]
fn lower_modifier_matches_case_insensitively() {
    let predicate = compile("title:lower = 'Test'").unwrap();
    let matcher = PredicateMatcher::new(&predicate).unwrap();

    for title in ["test", "TEST", "TeSt"] {
        assert!(matcher.matches(&json!({ "title": title })), "title: {title}");
    }
    assert!(!matcher.matches(&json!({"title": "testing"})));
}

#[test]
fn wildcard_patterns_translate_to_regexes() {
    let c = compile("name ~ 'test%'").unwrap();
    assert_eq!(c.as_constraint().unwrap().value, Value::from("^test.*$"));

    let anything = compile("name ~ '%'").unwrap();
    let matcher = PredicateMatcher::new(&anything).unwrap();
    assert!(matcher.matches(&json!({"name": ""})));
    assert!(matcher.matches(&json!({"name": "whatever"})));

    let single = compile("name ~ 'a_c'").unwrap();
    let matcher = PredicateMatcher::new(&single).unwrap();
    assert!(matcher.matches(&json!({"name": "abc"})));
    assert!(!matcher.matches(&json!({"name": "ac"})));
    assert!(!matcher.matches(&json!({"name": "abbc"})));
}

#[test]
fn length_modifier_rejects_pattern_operator() {
    match compile("items:length ~ 'abc'") {
        Err(CompileError::Eval(EvalError::UnsupportedCombination { operator, modifier })) => {
            assert_eq!(operator, "~");
            assert_eq!(modifier, "length");
        }
        other => panic!("expected an unsupported combination, got {other:?}"),
    }
}

// ============================================================================
// Macros and arithmetic
// ============================================================================

#[test]
fn now_minus_a_week_is_a_timestamp() {
    let before = Utc::now();
    let predicate = compile("created > @now - 604800000").unwrap();
    let after = Utc::now();

    let constraint = predicate.as_constraint().unwrap();
    assert_eq!(constraint.operator, ConstraintOperator::Gt);

    let value = constraint.value.as_timestamp().unwrap();
    let week = Duration::days(7);
    let tolerance = Duration::seconds(5);
    assert!(value >= before - week - tolerance);
    assert!(value <= after - week + tolerance);
}

#[test]
fn now_is_evaluated_on_every_compile() {
    let first = timestamp_of("created > @now - 604800000");
    thread::sleep(StdDuration::from_millis(20));
    let second = timestamp_of("created > @now - 604800000");
    assert!(second > first);
}

#[test]
fn shared_compiler_works_across_threads() {
    let compiler = FilterCompiler::new();
    let before = Utc::now();

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let compiler = &compiler;
                scope.spawn(move || {
                    (0..50)
                        .map(|_| compiler.compile(&format!("created > @now - {i}000")))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(results.len(), 400);
    for result in results {
        let predicate = result.unwrap();
        let instant = predicate.as_constraint().unwrap().value.as_timestamp().unwrap();
        assert!(instant >= before - Duration::seconds(8));
    }
}

// ============================================================================
// Malformed input
// ============================================================================

#[test]
fn missing_value_is_a_parse_error() {
    match compile("status =") {
        Err(CompileError::Parse(e)) => {
            assert_eq!(e.offset, 8);
            assert_eq!(e.found, "end of input");
            for kind in ["string", "number", "bool", "null", "macro"] {
                assert!(e.expected.iter().any(|x| x == kind), "missing {kind}");
            }
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn unterminated_string_is_a_lex_error() {
    match compile("status = 'unterminated") {
        Err(CompileError::Lex(e)) => {
            assert_eq!(e.offset, 9);
            assert_eq!(e.character, '\'');
        }
        other => panic!("expected a lex error, got {other:?}"),
    }
}

#[test]
fn oversized_inputs_fail_without_crashing() {
    let deep = format!("a = {}1{}", "(".repeat(500), ")".repeat(500));
    assert!(matches!(compile(&deep), Err(CompileError::Parse(_))));

    let long = vec!["a = 1"; 20_000].join(" && ");
    assert!(matches!(compile(&long), Err(CompileError::Parse(_))));

    let ok = format!("a = {}1{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
    assert!(compile(&ok).is_ok());
}

#[test]
fn overflowing_literal_is_rejected() {
    match compile("a = 1e400") {
        Err(CompileError::Parse(e)) => assert_eq!(e.offset, 4),
        other => panic!("expected a parse error, got {other:?}"),
    }
}
