//! Error code coverage tests: every validation error code (E200–E204) has at
//! least one test asserting it is emitted, located at the offending node.

use wasm_proto_types::ast::{Expr, Module};
use wasm_proto_types::build::*;
use wasm_proto_types::{Error, ErrorCategory, ErrorCode, Span, ValueType};

const WHERE: Span = Span {
    start_line: 3,
    start_col: 7,
    end_line: 3,
    end_col: 19,
};

fn check_err(module: &Module) -> Error {
    match wasm_proto_check::check_module(module) {
        Ok(()) => panic!("expected a validation error"),
        Err(err) => err,
    }
}

fn located(results: Vec<ValueType>, body: Expr) -> Module {
    let mut m = module(vec![func(vec![], results, body)]);
    m.file = "located.wast".to_string();
    m
}

fn assert_located(err: &Error, code: ErrorCode) {
    assert_eq!(err.code, code, "{}", err.message);
    assert_eq!(err.category, ErrorCategory::Validation);
    assert_eq!(err.file, "located.wast");
    assert_eq!(err.span, WHERE);
}

// ══════════════════════════════════════════════════════════════════════════════
// E200: TYPE_MISMATCH
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e200_type_mismatch() {
    let err = check_err(&located(
        vec![ValueType::Int32],
        at(f64_const(1.0), WHERE),
    ));
    assert_located(&err, ErrorCode::TYPE_MISMATCH);
    assert!(err.message.contains("[f64]"), "{}", err.message);
    assert!(err.message.contains("[i32]"), "{}", err.message);
    assert!(err.message.starts_with("in function 0:"), "{}", err.message);
}

// ══════════════════════════════════════════════════════════════════════════════
// E201: UNKNOWN_INDEX
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e201_unknown_index() {
    let err = check_err(&located(vec![], at(get_global(2), WHERE)));
    assert_located(&err, ErrorCode::UNKNOWN_INDEX);
    assert!(err.message.contains("unknown global 2"), "{}", err.message);
}

// ══════════════════════════════════════════════════════════════════════════════
// E202: ARITY_MISMATCH
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e202_arity_mismatch() {
    let err = check_err(&located(
        vec![ValueType::Int32],
        at(ret(vec![]), WHERE),
    ));
    assert_located(&err, ErrorCode::ARITY_MISMATCH);
}

// ══════════════════════════════════════════════════════════════════════════════
// E203: DUPLICATE_SWITCH_VALUE
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e203_duplicate_switch_value() {
    let mut second = arm(4, nop(), false);
    second.span = WHERE;
    let err = check_err(&located(
        vec![],
        switch(
            ValueType::Int32,
            i32_const(4),
            vec![arm(4, nop(), false), second],
            nop(),
        ),
    ));
    assert_located(&err, ErrorCode::DUPLICATE_SWITCH_VALUE);
}

// ══════════════════════════════════════════════════════════════════════════════
// E204: BREAK_DEPTH_OUT_OF_RANGE
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn e204_break_depth_out_of_range() {
    let err = check_err(&located(
        vec![],
        loop_(label(at(br(2, vec![]), WHERE))),
    ));
    assert_located(&err, ErrorCode::BREAK_DEPTH_OUT_OF_RANGE);
    assert!(err.message.contains("2 enclosing"), "{}", err.message);
}

#[test]
fn first_error_aborts_checking() {
    let m = module(vec![
        func(vec![], vec![ValueType::Int32], nop()),
        func(vec![], vec![], get_local(9)),
    ]);
    let err = check_err(&m);
    assert_eq!(err.code, ErrorCode::TYPE_MISMATCH);
}

#[test]
fn error_json_shape() {
    let err = check_err(&located(vec![], at(get_local(1), WHERE)));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], 201);
    assert_eq!(json["category"], "validation");
    assert_eq!(json["file"], "located.wast");
    assert_eq!(json["line"], 3);
    assert_eq!(json["column"], 7);
}
