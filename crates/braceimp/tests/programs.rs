use braceimp::{
    Error, RunOptions, run, run_program, run_program_with_options,
    error::{Expected, RuntimeError, SyntaxError},
    token::TokenKind,
    value::{Type, Value},
};
use pretty_assertions::assert_eq;

fn assert_output(src: &str, expected: &[&str]) {
    let result = run_program(src).unwrap_or_else(|e| panic!("Program failed:\n{}\nError: {}", src, e));
    assert_eq!(result.output.lines(), expected, "output of:\n{}", src);
}

fn assert_failure(src: &str) -> Error {
    match run(src) {
        Ok(output) => panic!("Expected failure for:\n{}\nGot output: {:?}", src, output),
        Err(e) => e,
    }
}

#[test]
fn arithmetic_precedence() {
    assert_output("print(2 + 3 * 4)", &["14"]);
    assert_output("print((2 + 3) * 4)", &["20"]);
    assert_output("print(20 - 2 * 3 - 4)", &["10"]);
}

#[test]
fn division_never_truncates() {
    assert_output("print(7 / 2)", &["3.5"]);
    assert_output("print(6 / 3)", &["2.0"]);
    assert_output("x = 1 / 4 print(x * 2)", &["0.5"]);
}

#[test]
fn unset_variable_reads_as_zero() {
    assert_output("print x", &["0"]);
    assert_output("print(y + 5)", &["5"]);
}

#[test]
fn if_executes_exactly_one_branch() {
    assert_output(r#"x = 1 if x == 1 { print "a" } else { print "b" }"#, &["a"]);
}

#[test]
fn while_runs_until_condition_fails() {
    assert_output(r#"i = 0 while i < 3 { print i i = i + 1 } print "done""#, &["0", "1", "2", "done"]);
}

#[test]
fn gte_uses_reversed_operands() {
    assert_output("if 3 >= 5 { print('yes') } else { print('no') }", &["yes"]);
    assert_output("if 5 >= 3 { print('yes') } else { print('no') }", &["no"]);
    assert_output("if 3 <= 5 { print('yes') } else { print('no') }", &["yes"]);
}

#[test]
fn loop_body_sees_fresh_bindings_each_iteration() {
    let src = "
        acc = ''
        n = 0
        while n < 4 {
            acc = acc + 'x'
            n = n + 1
            print acc
        }
    ";
    assert_output(src, &["x", "xx", "xxx", "xxxx"]);
}

#[test]
fn unknown_character_fails_without_output() {
    let err = assert_failure("print('before')\nx = 1 @ 2\nprint('after')");
    match err {
        Error::Lex(e) => {
            assert_eq!(e.character, '@');
            assert_eq!(e.line, 2);
        }
        other => panic!("Expected a lexical error, got {:?}", other),
    }
}

#[test]
fn runtime_error_discards_earlier_output() {
    let err = assert_failure("print('first')\nx = 'a' - 1\nprint('never')");
    assert_eq!(
        err,
        Error::Runtime(RuntimeError::TypeError {
            op: "-".to_string(),
            left: Type::String,
            right: Type::Integer,
            line: 2,
            span: err.span().expect("runtime errors carry a span"),
        })
    );
    assert_eq!(
        err.to_string(),
        "type error: unsupported operand types for '-': string and integer on line 2"
    );
}

#[test]
fn mixing_number_and_string_is_a_type_error() {
    assert!(matches!(
        assert_failure("print('n = ' + 1)"),
        Error::Runtime(RuntimeError::TypeError { .. })
    ));
    assert!(matches!(
        assert_failure("if 'a' < 1 { print('x') }"),
        Error::Runtime(RuntimeError::TypeError { .. })
    ));
}

#[test]
fn division_by_zero_is_reported() {
    let err = assert_failure("z = 0\nprint(1 / z)");
    assert!(matches!(err, Error::Runtime(RuntimeError::DivisionByZero { line: 2, .. })));
}

#[test]
fn oversized_string_repeat_is_an_error() {
    let err = assert_failure("x = 'ab' * 4000000000000000000 print 'done'");
    assert!(matches!(
        err,
        Error::Runtime(RuntimeError::StringTooLong { line: 1, .. })
    ));
}

#[test]
fn large_and_tiny_floats_stay_distinguishable() {
    assert_output(
        "print(100000000000000000 / 1) print(10000000000000000 / 1) print(1 / 100000)",
        &["1e17", "1e16", "1e-5"],
    );
    assert_output("print(1000000000000000 / 1)", &["1000000000000000.0"]);
}

#[test]
fn integer_float_equality_is_exact() {
    let src = "a = 9007199254740993 b = 9007199254740992 / 1
        if a == b { print('eq') } else { print('ne') }
        if a > b { print('gt') }";
    assert_output(src, &["ne", "gt"]);
}

#[test]
fn only_the_outer_quotes_are_stripped() {
    assert_output(r#"print('"hi"') print("'a'")"#, &["\"hi\"", "'a'"]);
}

#[test]
fn bare_print_of_literal_is_a_syntax_error() {
    let err = assert_failure("print 5");
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError {
            expected: Expected::Token(TokenKind::Identifier),
            ..
        })
    ));
}

#[test]
fn keyword_prefixed_names_are_split() {
    // `printer` scans as `print er`
    assert_output("er = 9 printer", &["9"]);

    // `iffy = 1` scans as `if fy = 1`, which is not a condition
    let err = assert_failure("iffy = 1");
    assert!(matches!(
        err,
        Error::Syntax(SyntaxError {
            expected: Expected::Token(TokenKind::RelOp),
            ..
        })
    ));
}

#[test]
fn error_messages_carry_kind_and_line() {
    assert_eq!(
        assert_failure("x = 1\ny = 2\n$").to_string(),
        "lexical error: unexpected character '$' on line 3"
    );
    assert_eq!(
        assert_failure("x = 1\n= 2").to_string(),
        "syntax error: expected statement, found \"=\" on line 2"
    );
    assert_eq!(
        assert_failure("while x < 1 {").to_string(),
        "syntax error: expected '}', found end of input"
    );
}

#[test]
fn step_limit_bounds_endless_programs() {
    let options = RunOptions {
        step_limit: Some(50),
        ..RunOptions::default()
    };
    let err = run_program_with_options("i = 0\nwhile 0 < 1 {\n  i = i + 1\n}", options)
        .expect_err("endless loop must be stopped");
    assert!(matches!(err, Error::Runtime(RuntimeError::StepLimit { limit: 50, .. })));
}

#[test]
fn final_environment_is_returned() {
    let result = run_program("a = 2 b = a * 'ab' c = 10 / 4").expect("Program failed");
    assert_eq!(result.environment.get("a"), Value::Integer(2));
    assert_eq!(result.environment.get("b"), Value::from("abab"));
    assert_eq!(result.environment.get("c"), Value::Float(2.5));
    assert_eq!(
        result.environment.sorted().into_iter().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["a", "b", "c"]
    );
}

#[test]
fn demo_programs_run() {
    assert_output(
        include_str!("../../../demos/countdown.bi"),
        &["5", "4", "3", "2", "1", "liftoff"],
    );
    assert_output(
        include_str!("../../../demos/fizzbuzz.bi"),
        &[
            "1", "2", "Fizz", "4", "Buzz", "Fizz", "7", "8", "Fizz", "Buzz", "11", "Fizz", "13",
            "14", "FizzBuzz",
        ],
    );
    assert_output(
        include_str!("../../../demos/averages.bi"),
        &["45", "11.25", "mean of doubling series"],
    );
}
