//! Canonical script tests.
//!
//! Small reference programs run end-to-end through the script driver:
//! define (validate + instantiate), then invoke with argument expressions.

use wasm_proto_eval::{Command, EvalConfig, Outcome, Script};
use wasm_proto_types::ast::{Expr, Module};
use wasm_proto_types::build::*;
use wasm_proto_types::ops::*;
use wasm_proto_types::{ErrorCategory, ErrorCode, MemoryType, Result, Value, ValueType};

use ValueType::{Int32, Int64};

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn invoke(export: usize, args: Vec<Expr>) -> Command {
    Command::Invoke { export, args }
}

fn returned(values: Vec<Value>) -> Result<Outcome> {
    Ok(Outcome::Returned(values))
}

fn assert_error(result: &Result<Outcome>, expected_code: ErrorCode) {
    match result {
        Ok(outcome) => panic!("expected error {expected_code}, got {outcome}"),
        Err(err) => assert_eq!(
            err.code, expected_code,
            "expected {expected_code}, got {}: {}",
            err.code, err.message
        ),
    }
}

/// `f(x: i32) -> i32 = if x == 0 then 1 else f(x - 1)`
fn recursive_f() -> Module {
    module(vec![func(
        vec![Int32],
        vec![Int32],
        if_(
            i32_eq(get_local(0), i32_const(0)),
            i32_const(1),
            call(0, vec![i32_sub(get_local(0), i32_const(1))]),
        ),
    )])
}

/// Iterative Fibonacci over i64 with two accumulators.
fn fibonacci() -> Module {
    let i64_add = |a, b| binary(BinOp::Int64(IntBinOp::Add), a, b);
    // locals: 0 = n, 1 = a, 2 = b, 3 = t
    let body = block(vec![
        set_local(2, i64_const(1)),
        loop_(block(vec![
            if_(
                i32_eq(get_local(0), i32_const(0)),
                br(0, vec![get_local(1)]),
                nop(),
            ),
            set_local(3, i64_add(get_local(1), get_local(2))),
            set_local(1, get_local(2)),
            set_local(2, get_local(3)),
            set_local(0, i32_sub(get_local(0), i32_const(1))),
        ])),
    ]);
    module(vec![func_with_locals(
        vec![Int32],
        vec![Int64],
        vec![Int64, Int64, Int64],
        body,
    )])
}

// ══════════════════════════════════════════════════════════════════════════════
// Canonical programs
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn recursive_f_scenario() {
    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(recursive_f()),
        invoke(0, vec![i32_const(5)]),
        invoke(0, vec![i32_const(0)]),
    ]);
    assert_eq!(
        outcomes,
        vec![
            Ok(Outcome::Defined),
            returned(vec![Value::Int32(1)]),
            returned(vec![Value::Int32(1)]),
        ]
    );
}

#[test]
fn mismatched_if_branch_is_rejected() {
    let mut broken = recursive_f();
    broken.funcs[0].body = if_(
        i32_eq(get_local(0), i32_const(0)),
        i64_const(1),
        call(0, vec![i32_sub(get_local(0), i32_const(1))]),
    );
    let mut script = Script::new();
    let result = script.run(&Command::Define(broken));
    assert_error(&result, ErrorCode::TYPE_MISMATCH);
    assert!(script.current().is_none());
}

#[test]
fn fibonacci_loop() {
    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(fibonacci()),
        invoke(0, vec![i32_const(0)]),
        invoke(0, vec![i32_const(10)]),
        invoke(0, vec![i32_const(90)]),
    ]);
    assert_eq!(outcomes[1], returned(vec![Value::Int64(0)]));
    assert_eq!(outcomes[2], returned(vec![Value::Int64(55)]));
    assert_eq!(outcomes[3], returned(vec![Value::Int64(2_880_067_194_370_816_120)]));
}

#[test]
fn memory_fill_and_sum() {
    // fill(n): for i in 0..n { mem[i] = i * i }   (u16 cells)
    let fill = func_with_locals(
        vec![Int32],
        vec![],
        vec![Int32],
        loop_(block(vec![
            if_(
                i32_eq(get_local(1), get_local(0)),
                br(0, vec![]),
                nop(),
            ),
            store(
                MemoryType::Int16U,
                get_local(1),
                i32_mul(get_local(1), get_local(1)),
            ),
            set_local(1, i32_add(get_local(1), i32_const(1))),
        ])),
    );
    // sum(n): acc = 0; for i in 0..n { acc += mem[i] }
    let sum = func_with_locals(
        vec![Int32],
        vec![Int32],
        vec![Int32, Int32],
        loop_(block(vec![
            if_(
                i32_eq(get_local(1), get_local(0)),
                br(0, vec![get_local(2)]),
                nop(),
            ),
            set_local(
                2,
                i32_add(get_local(2), load(MemoryType::Int16U, get_local(1))),
            ),
            set_local(1, i32_add(get_local(1), i32_const(1))),
        ])),
    );
    let mut m = module(vec![fill, sum]);
    m.memory = Some(64);

    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(m),
        invoke(0, vec![i32_const(10)]),
        invoke(1, vec![i32_const(10)]),
        invoke(0, vec![i32_const(33)]),
    ]);
    assert_eq!(outcomes[1], returned(vec![]));
    assert_eq!(outcomes[2], returned(vec![Value::Int32(285)]));
    assert_error(&outcomes[3], ErrorCode::MEMORY_OUT_OF_BOUNDS);
}

// ══════════════════════════════════════════════════════════════════════════════
// Driver behavior
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn failure_does_not_stop_later_commands() {
    let mut script = Script::new();
    let outcomes = script.run_all(&[
        invoke(0, vec![]),
        Command::Define(recursive_f()),
        invoke(3, vec![i32_const(1)]),
        invoke(0, vec![i64_const(1)]),
        invoke(0, vec![i32_const(2)]),
    ]);
    assert_eq!(outcomes.len(), 5);
    assert_error(&outcomes[0], ErrorCode::UNDEFINED_EXPORT);
    assert_eq!(outcomes[1], Ok(Outcome::Defined));
    assert_error(&outcomes[2], ErrorCode::UNDEFINED_EXPORT);
    assert_error(&outcomes[3], ErrorCode::ARGUMENT_MISMATCH);
    assert_eq!(outcomes[4], returned(vec![Value::Int32(1)]));
}

#[test]
fn failed_define_keeps_previous_instance() {
    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(recursive_f()),
        Command::Define(module(vec![func(vec![], vec![Int32], nop())])),
        invoke(0, vec![i32_const(3)]),
    ]);
    assert_error(&outcomes[1], ErrorCode::TYPE_MISMATCH);
    assert_eq!(outcomes[2], returned(vec![Value::Int32(1)]));
}

#[test]
fn define_replaces_current_instance() {
    let mut counter = module(vec![func(
        vec![],
        vec![Int32],
        block(vec![
            set_global(0, i32_add(get_global(0), i32_const(1))),
            get_global(0),
        ]),
    )]);
    counter.globals = vec![Int32];

    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(counter.clone()),
        invoke(0, vec![]),
        invoke(0, vec![]),
        Command::Define(counter),
        invoke(0, vec![]),
    ]);
    assert_eq!(outcomes[2], returned(vec![Value::Int32(2)]));
    assert_eq!(outcomes[4], returned(vec![Value::Int32(1)]));
}

#[test]
fn arguments_are_evaluated_against_the_instance() {
    let mut m = module(vec![
        func(vec![Int32], vec![Int32], i32_mul(get_local(0), i32_const(2))),
        func(vec![], vec![Int32, Int32], ret(vec![i32_const(1), i32_const(2)])),
    ]);
    m.globals = vec![Int32];

    let mut script = Script::new();
    let outcomes = script.run_all(&[
        Command::Define(m),
        invoke(0, vec![i32_add(i32_const(20), i32_const(1))]),
        invoke(0, vec![call(1, vec![])]),
        invoke(0, vec![binary(BinOp::Int32(IntBinOp::DivS), i32_const(1), i32_const(0))]),
    ]);
    assert_eq!(outcomes[1], returned(vec![Value::Int32(42)]));
    assert_error(&outcomes[2], ErrorCode::RESULT_ARITY);
    assert_error(&outcomes[3], ErrorCode::DIVISION_BY_ZERO);
}

#[test]
fn script_config_applies_to_instances() {
    let config = EvalConfig::from_json(r#"{ "max_call_depth": 8 }"#).unwrap();
    let mut script = Script::with_config(config);
    let outcomes = script.run_all(&[
        Command::Define(recursive_f()),
        invoke(0, vec![i32_const(5)]),
        invoke(0, vec![i32_const(50)]),
    ]);
    assert_eq!(outcomes[1], returned(vec![Value::Int32(1)]));
    assert_error(&outcomes[2], ErrorCode::CALL_STACK_EXHAUSTED);
}

#[test]
fn runtime_error_json_shape() {
    let mut script = Script::new();
    script.run(&Command::Define(recursive_f())).unwrap();
    let err = script
        .run(&invoke(0, vec![convert(
            CvtOp::Float32(Float32CvtOp::ToInt32U),
            f32_const(-1.0),
        )]))
        .unwrap_err();
    assert_eq!(err.category, ErrorCategory::Runtime);
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], 701);
    assert_eq!(json["category"], "runtime");
    assert_eq!(json["file"], "test.wast");
}
