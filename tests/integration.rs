//! Whole-pipeline tests: one source text through lexing, parsing, checking,
//! and then both evaluation and Java generation.

use brio::interp::Value;
use brio::Error;
use num_bigint::BigInt;
use pretty_assertions::assert_eq;

const FIZZ: &str = "\
LET limit: Integer = 15;

DEF classify(n: Integer): String DO
    IF n / 3 * 3 == n DO
        RETURN \"fizz\";
    END
    RETURN \"\" + n;
END

DEF main(): Integer DO
    LET i = 1;
    WHILE i <= limit DO
        print(classify(i));
        i = i + 1;
    END
    RETURN 0;
END
";

#[test]
fn the_same_program_runs_and_transpiles() {
    let mut out = Vec::new();
    let value = brio::run(FIZZ, &mut out).unwrap();
    assert_eq!(value, Value::Integer(BigInt::from(0)));

    let printed = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = printed.lines().collect();
    assert_eq!(lines.len(), 15);
    assert_eq!(lines[0], "1");
    assert_eq!(lines[2], "fizz");
    assert_eq!(lines[14], "fizz");

    let java = brio::transpile(FIZZ).unwrap();
    assert!(java.starts_with("public class Main {"));
    assert!(java.contains("String classify(int n) {"));
    assert!(java.contains("System.out.println(classify(i));"));
    assert!(java.ends_with("}\n"));
}

#[test]
fn each_phase_reports_its_own_error_kind() {
    // Lexer: unterminated string, offset at end of input.
    let err = brio::run("LET s = \"oops", Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Lex { .. }));
    assert_eq!(err.offset(), Some(13));

    // Parser: missing semicolon.
    let err = brio::run("DEF main(): Integer DO RETURN 0 END", Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert_eq!(err.offset(), Some(32));

    // Checker: unresolved name.
    let err = brio::run("DEF main(): Integer DO RETURN nope; END", Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Type { .. }));
    assert_eq!(err.offset(), None);

    // Interpreter: division by zero.
    let err = brio::run(
        "DEF main(): Integer DO LET z = 0; RETURN 1 / z; END",
        Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
}

#[test]
fn the_ast_dump_round_trips_through_json() {
    let source = brio::parse_source(FIZZ).unwrap();
    let json = serde_json::to_string(&source).unwrap();
    let back: brio::ast::Source = serde_json::from_str(&json).unwrap();
    assert_eq!(source, back);
}
