use brio::ast::{BinaryOp, Expr, Literal, Stmt};
use brio::parse_source;
use pretty_assertions::assert_eq;

#[test]
fn fields_then_methods() {
    let source = parse_source(
        "LET a = 1;\
         LET b: String;\
         DEF main(): Integer DO RETURN 0; END",
    )
    .unwrap();

    assert_eq!(source.fields.len(), 2);
    assert_eq!(source.fields[0].name, "a");
    assert_eq!(source.fields[1].type_name.as_deref(), Some("String"));
    assert!(source.fields[1].value.is_none());
    assert_eq!(source.methods.len(), 1);
    assert_eq!(source.methods[0].name, "main");
}

#[test]
fn method_signature_parses() {
    let source =
        parse_source("DEF add(x: Integer, y: Integer): Integer DO RETURN x + y; END").unwrap();
    let method = &source.methods[0];

    assert_eq!(method.parameters.len(), 2);
    assert_eq!(method.parameters[0].name, "x");
    assert_eq!(method.parameters[1].type_name, "Integer");
    assert_eq!(method.return_type_name.as_deref(), Some("Integer"));
    assert_eq!(method.statements.len(), 1);
}

#[test]
fn method_without_return_type() {
    let source = parse_source("DEF go() DO print(1); END").unwrap();
    assert!(source.methods[0].return_type_name.is_none());
}

#[test]
fn if_with_and_without_else() {
    let source = parse_source(
        "DEF main(): Integer DO \
           IF x DO print(1); END \
           IF y DO print(2); ELSE print(3); print(4); END \
           RETURN 0; \
         END",
    )
    .unwrap();
    let statements = &source.methods[0].statements;

    let Stmt::If { else_branch, .. } = &statements[0] else {
        panic!("expected an if");
    };
    assert!(else_branch.is_empty());

    let Stmt::If {
        then_branch,
        else_branch,
        ..
    } = &statements[1]
    else {
        panic!("expected an if");
    };
    assert_eq!(then_branch.len(), 1);
    assert_eq!(else_branch.len(), 2);
}

#[test]
fn loops_parse() {
    let source = parse_source(
        "DEF main(): Integer DO \
           FOR i IN xs DO print(i); END \
           WHILE c DO c = f(); END \
           RETURN 0; \
         END",
    )
    .unwrap();
    let statements = &source.methods[0].statements;

    assert!(matches!(&statements[0], Stmt::For { name, .. } if name == "i"));
    assert!(matches!(&statements[1], Stmt::While { body, .. } if body.len() == 1));
}

#[test]
fn assignment_versus_expression_statement() {
    let source = parse_source("DEF main(): Integer DO x = 1; f(); RETURN 0; END").unwrap();
    let statements = &source.methods[0].statements;

    assert!(matches!(&statements[0], Stmt::Assignment { .. }));
    assert!(matches!(
        &statements[1],
        Stmt::Expression {
            expr: Expr::Call { .. }
        }
    ));
}

#[test]
fn precedence_and_associativity() {
    let source = parse_source("LET v = a OR b AND c == d + e * f;").unwrap();
    let value = source.fields[0].value.as_ref().unwrap();

    // ((a OR b) AND (c == (d + (e * f))))
    let Expr::Binary { op, left, right, .. } = value else {
        panic!("expected a binary expression");
    };
    assert_eq!(*op, BinaryOp::And);
    assert!(matches!(
        left.as_ref(),
        Expr::Binary { op: BinaryOp::Or, .. }
    ));
    let Expr::Binary { op, right, .. } = right.as_ref() else {
        panic!("expected a comparison");
    };
    assert_eq!(*op, BinaryOp::Eq);
    let Expr::Binary { op, right, .. } = right.as_ref() else {
        panic!("expected an addition");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        right.as_ref(),
        Expr::Binary { op: BinaryOp::Mul, .. }
    ));
}

#[test]
fn left_associative_chains() {
    let source = parse_source("LET v = a - b - c;").unwrap();
    let Some(Expr::Binary { left, .. }) = &source.fields[0].value else {
        panic!("expected a binary expression");
    };
    assert!(matches!(
        left.as_ref(),
        Expr::Binary { op: BinaryOp::Sub, .. }
    ));
}

#[test]
fn dotted_access_and_calls() {
    let source = parse_source("LET v = obj.field.compute(1, x);").unwrap();
    let Some(Expr::Call {
        receiver,
        name,
        arguments,
        ..
    }) = &source.fields[0].value
    else {
        panic!("expected a call");
    };
    assert_eq!(name, "compute");
    assert_eq!(arguments.len(), 2);
    assert!(matches!(
        receiver.as_deref(),
        Some(Expr::Access { name, .. }) if name == "field"
    ));
}

#[test]
fn groups_and_literals() {
    let source = parse_source(r"LET v = (1 + 2); LET c = '\n'; LET n = NIL; LET b = TRUE;").unwrap();

    assert!(matches!(
        &source.fields[0].value,
        Some(Expr::Group { .. })
    ));
    assert!(matches!(
        &source.fields[1].value,
        Some(Expr::Literal {
            value: Literal::Character('\n'),
            ..
        })
    ));
    assert!(matches!(
        &source.fields[2].value,
        Some(Expr::Literal {
            value: Literal::Nil,
            ..
        })
    ));
    assert!(matches!(
        &source.fields[3].value,
        Some(Expr::Literal {
            value: Literal::Boolean(true),
            ..
        })
    ));
}

#[test]
fn every_expression_gets_a_distinct_id() {
    let source = parse_source("LET v = a + b * c;").unwrap();
    let mut ids = Vec::new();
    fn collect(expr: &Expr, ids: &mut Vec<brio::common::NodeId>) {
        ids.push(expr.id());
        if let Expr::Binary { left, right, .. } = expr {
            collect(left, ids);
            collect(right, ids);
        }
    }
    collect(source.fields[0].value.as_ref().unwrap(), &mut ids);
    let before = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), before);
}

#[test]
fn missing_do_is_an_error() {
    let err = parse_source("DEF main(): Integer RETURN 0; END").unwrap_err();
    assert!(err.to_string().contains("DO"));
}

#[test]
fn missing_end_is_an_error() {
    let err = parse_source("DEF main(): Integer DO RETURN 0;").unwrap_err();
    assert!(err.to_string().contains("END"));
}

#[test]
fn trailing_input_after_methods_is_an_error() {
    let err = parse_source("DEF main(): Integer DO RETURN 0; END LET x = 1;").unwrap_err();
    assert!(matches!(err, brio::Error::Parse { .. }));
}

#[test]
fn a_field_after_a_method_is_rejected() {
    // Fields must all precede the first method.
    let source = "LET a = 1; DEF f() DO print(1); END LET b = 2;";
    assert!(parse_source(source).is_err());
}

#[test]
fn statement_without_semicolon_is_an_error() {
    let err = parse_source("DEF main(): Integer DO RETURN 0 END").unwrap_err();
    assert!(err.to_string().contains(";"));
}
