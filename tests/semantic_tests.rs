use exprc::{
    ast::{BinOp, Expr, ExprKind, Program, ResolvedType, Statement, Type},
    lex::tokenize,
    parse::parse,
    semantic::{analyze, SemanticError},
};

fn analyzed(text: &str) -> (Program, Vec<String>) {
    let (mut program, errors) = parse(tokenize(text));
    assert!(errors.is_empty(), "unexpected parser errors: {:?}", errors);

    let errors = analyze(&mut program)
        .iter()
        .map(|error| error.val().to_string())
        .collect();

    (program, errors)
}

fn collect_types(expr: &Expr, types: &mut Vec<ResolvedType>) {
    types.push(expr.resolved);
    if let ExprKind::Binary(left, _, right) = &expr.kind {
        collect_types(left.val(), types);
        collect_types(right.val(), types);
    }
}

fn all_types(program: &Program) -> Vec<ResolvedType> {
    let mut types = Vec::new();
    for statement in &program.statements {
        match statement {
            Statement::Assignment { target, value } => {
                types.push(target.val().resolved);
                collect_types(value.val(), &mut types);
            }

            Statement::Expression(expr) | Statement::Print(expr) => {
                collect_types(expr.val(), &mut types)
            }

            Statement::Comment(_) => (),
        }
    }

    types
}

#[test]
fn well_typed_program() {
    let (program, errors) = analyzed("x = 2; y = x * (3 + 4); print y; b = true; print b");

    assert!(errors.is_empty(), "{:?}", errors);
    match &program.statements[2] {
        Statement::Print(expr) => assert_eq!(expr.val().resolved, ResolvedType::Known(Type::Int)),
        other => panic!("expected print statement, found {:?}", other),
    }

    match &program.statements[3] {
        Statement::Assignment { target, .. } => {
            assert_eq!(target.val().resolved, ResolvedType::Known(Type::Bool))
        }

        other => panic!("expected assignment, found {:?}", other),
    }
}

#[test]
fn every_expression_is_resolved() {
    let (program, _) = analyzed("a = 1 + true; b = c; print a / 0; 'x'; \"s\"; d = b * 2 # done");
    let types = all_types(&program);

    assert!(!types.is_empty());
    assert!(types.iter().all(|typ| *typ != ResolvedType::Unresolved));
}

fn assigned_value<'a>(program: &'a Program, index: usize) -> &'a Expr {
    match &program.statements[index] {
        Statement::Assignment { value, .. } => value.val(),
        other => panic!("expected assignment, found {:?}", other),
    }
}

#[test]
fn integer_literals_survive_every_stage() {
    let values = [0, 1, 42, 1 << 31, i64::MAX];

    for value in values {
        let (program, errors) = analyzed(&format!("x = {}", value));
        assert!(errors.is_empty(), "{:?}", errors);

        let expr = assigned_value(&program, 0);
        assert!(matches!(expr.kind, ExprKind::Integer(parsed) if parsed == value));
        assert_eq!(expr.resolved, ResolvedType::Known(Type::Int));
    }

    let (program, errors) = analyzed("x = 0x7fffffffffffffff");
    assert!(errors.is_empty(), "{:?}", errors);
    assert!(matches!(assigned_value(&program, 0).kind, ExprKind::Integer(i64::MAX)));
}

#[test]
fn grouping_changes_shape_but_not_type() {
    let (program, errors) = analyzed("a = 1; b = 2; c = 3; x = (a + b) * c; y = a + b * c");
    assert!(errors.is_empty(), "{:?}", errors);

    let grouped = assigned_value(&program, 3);
    let plain = assigned_value(&program, 4);

    assert!(matches!(grouped.kind, ExprKind::Binary(_, BinOp::Mul, _)));
    assert!(matches!(plain.kind, ExprKind::Binary(_, BinOp::Add, _)));
    assert_eq!(grouped.resolved, ResolvedType::Known(Type::Int));
    assert_eq!(plain.resolved, grouped.resolved);
}

#[test]
fn undefined_variable_is_reported_once() {
    let (_, errors) = analyzed("print y;");

    let undefined = errors
        .iter()
        .filter(|error| *error == "Undefined variable `y`")
        .count();

    assert_eq!(undefined, 1);
}

#[test]
fn printing_invalid_expressions_is_an_error() {
    let (_, errors) = analyzed("print y;");
    assert!(errors.contains(&String::from("Cannot print an expression of invalid type")));
}

#[test]
fn arithmetic_requires_integers() {
    let (_, errors) = analyzed("x = true + 1");
    assert_eq!(
        errors,
        vec!["Operator `+` expects integer operands, found `bool` and `int`"]
    );

    let (_, errors) = analyzed("s = \"a\" * 'b'");
    assert_eq!(
        errors,
        vec!["Operator `*` expects integer operands, found `string` and `char`"]
    );
}

#[test]
fn reassignment_must_keep_its_type() {
    let (program, errors) = analyzed("x = 1; x = true; x = 5");

    assert_eq!(
        errors,
        vec!["Type mismatch in assignment to `x`: expected `int`, found `bool`"]
    );

    match &program.statements[1] {
        Statement::Assignment { target, .. } => assert!(target.val().resolved.is_invalid()),
        other => panic!("expected assignment, found {:?}", other),
    }

    match &program.statements[2] {
        Statement::Assignment { target, .. } => {
            assert_eq!(target.val().resolved, ResolvedType::Known(Type::Int))
        }

        other => panic!("expected assignment, found {:?}", other),
    }
}

#[test]
fn literal_division_by_zero() {
    let (_, errors) = analyzed("x = 10 / 0; print x");

    // `x` queda inválida, por lo que imprimirla también es un error
    assert_eq!(
        errors,
        vec!["Division by zero", "Cannot print an expression of invalid type"]
    );

    let (_, errors) = analyzed("z = 0; x = 10 / z");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn invalid_operands_do_not_cascade() {
    let (program, errors) = analyzed("y = z + 1; w = y * 2; v = w - y");

    assert_eq!(errors, vec!["Undefined variable `z`"]);
    assert!(program.statements.iter().all(|statement| matches!(
        statement,
        Statement::Assignment { target, .. } if target.val().resolved.is_invalid()
    )));
}

#[test]
fn infix_assignment_checks_operands() {
    let (_, errors) = analyzed("(a) = 1");
    assert_eq!(errors, vec!["Undefined variable `a`"]);

    let (_, errors) = analyzed("a = 2; (a) = 1");
    assert!(errors.is_empty(), "{:?}", errors);
}

#[test]
fn errors_are_located_at_the_offending_node() {
    let (mut program, _) = parse(tokenize("x = 1\nprint x + missing"));
    let errors = analyze(&mut program);

    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0].val(), SemanticError::Undefined(name) if name.to_string() == "missing"));
    assert_eq!(errors[0].location().to_string(), "<input>:[2:11-2:17]");
}
