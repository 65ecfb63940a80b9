use brio::{transpile, Error};
use pretty_assertions::assert_eq;

#[test]
fn a_whole_program_becomes_one_main_class() {
    let text = "LET x: Integer = 1; \
                DEF main(): Integer DO \
                  IF x < 2 DO print(\"small\"); ELSE print(x); END \
                  RETURN x; \
                END";
    let expected = "\
public class Main {

    int x = 1;

    public static void main(String[] args) {
        System.exit(new Main().main());
    }

    int main() {
        if (x < 2) {
            System.out.println(\"small\");
        } else {
            System.out.println(x);
        }
        return x;
    }

}
";
    assert_eq!(transpile(text).unwrap(), expected);
}

#[test]
fn loops_and_void_methods() {
    let text = "DEF sum(xs: IntegerIterable): Integer DO \
                  LET total = 0; \
                  FOR i IN xs DO total = total + i; END \
                  RETURN total; \
                END \
                DEF tick(n: Integer) DO print(n); END \
                DEF main(): Integer DO \
                  LET i = 0; \
                  WHILE i < 3 DO tick(i); i = i + 1; END \
                  RETURN 0; \
                END";
    let expected = "\
public class Main {

    public static void main(String[] args) {
        System.exit(new Main().main());
    }

    int sum(Iterable<Integer> xs) {
        int total = 0;
        for (int i : xs) {
            total = total + i;
        }
        return total;
    }

    void tick(int n) {
        System.out.println(n);
    }

    int main() {
        int i = 0;
        while (i < 3) {
            tick(i);
            i = i + 1;
        }
        return 0;
    }

}
";
    assert_eq!(transpile(text).unwrap(), expected);
}

#[test]
fn literals_take_their_java_spelling() {
    let text = "LET a: Any = NIL; \
                LET b = TRUE; \
                LET c = '\\n'; \
                LET s = \"say \\\"hi\\\"\"; \
                LET d = 1.50; \
                DEF main(): Integer DO RETURN 0; END";
    let java = transpile(text).unwrap();

    assert!(java.contains("Object a = null;"));
    assert!(java.contains("boolean b = true;"));
    assert!(java.contains("char c = '\\n';"));
    assert!(java.contains("String s = \"say \\\"hi\\\"\";"));
    assert!(java.contains("double d = 1.50;"));
}

#[test]
fn logical_operators_and_groups() {
    let text = "DEF check(a: Boolean, b: Boolean): Boolean DO \
                  RETURN (a AND b) OR FALSE; \
                END \
                DEF main(): Integer DO RETURN 0; END";
    let java = transpile(text).unwrap();
    assert!(java.contains("return (a && b) || false;"));
    assert!(java.contains("boolean check(boolean a, boolean b) {"));
}

#[test]
fn emit_writes_into_a_caller_sink() {
    let text = "DEF main(): Integer DO RETURN 0; END";
    let (source, analysis) = brio::analyze(text).unwrap();
    let mut sink = String::new();
    brio::codegen::emit(&source, &analysis, &mut sink).unwrap();
    assert_eq!(sink, brio::codegen::generate(&source, &analysis));
    assert!(sink.contains("System.exit(new Main().main());"));
}

#[test]
fn unchecked_programs_do_not_transpile() {
    let err = transpile("LET v = 1 + 1.0; DEF main(): Integer DO RETURN 0; END").unwrap_err();
    assert!(matches!(err, Error::Type { .. }));
}
