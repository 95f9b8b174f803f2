use exprc::{
    ast::Program,
    lex::tokenize,
    parse::parse,
    semantic::analyze,
    target::{generate, Abi},
};

fn program(text: &str) -> Program {
    let (program, errors) = parse(tokenize(text));
    assert!(errors.is_empty(), "unexpected parser errors: {:?}", errors);

    program
}

/// Líneas del listado con espacios normalizados.
fn lines(asm: &str) -> Vec<String> {
    asm.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn compile(text: &str, abi: Abi) -> Vec<String> {
    let mut program = program(text);
    let semantic_errors = analyze(&mut program);
    assert!(semantic_errors.is_empty(), "unexpected semantic errors: {:?}", semantic_errors);

    let (asm, errors) = generate(&program, abi);
    assert!(errors.is_empty(), "unexpected codegen errors: {:?}", errors);

    lines(&asm)
}

fn compile_lenient(text: &str, abi: Abi) -> (Vec<String>, Vec<String>) {
    let mut program = program(text);
    analyze(&mut program);

    let (asm, errors) = generate(&program, abi);
    let errors = errors.iter().map(|error| error.val().to_string()).collect();

    (lines(&asm), errors)
}

/// Verifica que `expected` aparezca en orden dentro de `lines`, no
/// necesariamente en forma contigua.
fn assert_in_order(lines: &[String], expected: &[&str]) {
    let mut cursor = 0;
    for wanted in expected {
        match lines[cursor..].iter().position(|line| line == wanted) {
            Some(offset) => cursor += offset + 1,
            None => panic!("`{}` not found in order within:\n{}", wanted, lines.join("\n")),
        }
    }
}

/// Verifica que `expected` aparezca contiguo dentro de `lines`.
fn assert_sequence(lines: &[String], expected: &[&str]) {
    let found = lines
        .windows(expected.len())
        .any(|window| window.iter().zip(expected).all(|(line, wanted)| line == wanted));

    assert!(found, "sequence {:?} not found within:\n{}", expected, lines.join("\n"));
}

#[test]
fn store_load_and_print_in_order() {
    let lines = compile("x = 2; print x;", Abi::SysV);

    assert_in_order(
        &lines,
        &[
            "mov $2, %rax",
            "mov %rax, -0x8(%rbp)",
            "mov -0x8(%rbp), %rax",
            "mov %rax, %rdi",
            "call print_int",
        ],
    );
}

#[test]
fn variables_get_distinct_slots() {
    let lines = compile("a = 1; b = 2; a = 3", Abi::SysV);

    assert_in_order(
        &lines,
        &["mov %rax, -0x8(%rbp)", "mov %rax, -0x10(%rbp)", "mov %rax, -0x8(%rbp)"],
    );

    assert!(!lines.iter().any(|line| line.contains("-0x18(%rbp)")));
}

#[test]
fn sysv_listing_shape() {
    let lines = compile("x = 1", Abi::SysV);

    assert_eq!(
        &lines[..6],
        &[".text", ".globl main", "main:", "push %rbp", "mov %rsp, %rbp", "sub $0x10, %rsp"]
    );

    assert_eq!(
        &lines[lines.len() - 6..],
        &[
            ".Lmain.0:",
            "xor %eax, %eax",
            "mov %rbp, %rsp",
            "pop %rbp",
            "ret",
            ".section .note.GNU-stack,\"\",@progbits",
        ]
    );
}

#[test]
fn empty_program_reserves_nothing() {
    let lines = compile("", Abi::SysV);

    assert!(!lines.iter().any(|line| line.starts_with("sub")));
    assert_sequence(&lines, &["push %rbp", "mov %rsp, %rbp", ".Lmain.0:", "xor %eax, %eax"]);
}

#[test]
fn frame_is_aligned() {
    let lines = compile("a = 1; b = 2; c = 3; a = 4", Abi::SysV);
    assert!(lines.contains(&String::from("sub $0x20, %rsp")));

    let lines = compile("a = 1; b = 2; c = 3; a = 4", Abi::Win64);
    assert!(lines.contains(&String::from("sub $0x40, %rsp")));
}

#[test]
fn win64_uses_shadow_space_and_rcx() {
    let lines = compile("print 1", Abi::Win64);

    assert!(lines.contains(&String::from("sub $0x20, %rsp")));
    assert_sequence(&lines, &["mov $1, %rax", "mov %rax, %rcx", "call print_int"]);
    assert!(!lines.iter().any(|line| line.contains("GNU-stack")));
}

#[test]
fn darwin_decorates_symbols() {
    let lines = compile("print false", Abi::Darwin);

    assert!(lines.contains(&String::from(".globl _main")));
    assert!(lines.contains(&String::from("_main:")));
    assert!(lines.contains(&String::from("Lmain.0:")));
    assert_sequence(&lines, &["mov %rax, %rdi", "call _print_bool"]);
}

#[test]
fn binary_operands_go_through_the_stack() {
    let lines = compile("print 7 - 3", Abi::SysV);

    assert_sequence(
        &lines,
        &[
            "mov $3, %rax",
            "push %rax",
            "mov $7, %rax",
            "pop %rcx",
            "sub %rcx, %rax",
        ],
    );
}

#[test]
fn arithmetic_instructions() {
    let lines = compile("print 1 + 2", Abi::SysV);
    assert_sequence(&lines, &["pop %rcx", "add %rcx, %rax"]);

    let lines = compile("print 6 * 7", Abi::SysV);
    assert_sequence(&lines, &["pop %rcx", "imul %rcx"]);

    let lines = compile("print 8 / 2", Abi::SysV);
    assert_sequence(&lines, &["pop %rcx", "cqo", "idiv %rcx"]);
}

#[test]
fn nested_expressions_evaluate_right_first() {
    let lines = compile("print (1 + 2) * 3", Abi::SysV);

    assert_in_order(
        &lines,
        &[
            "mov $3, %rax",
            "push %rax",
            "mov $2, %rax",
            "push %rax",
            "mov $1, %rax",
            "pop %rcx",
            "add %rcx, %rax",
            "pop %rcx",
            "imul %rcx",
        ],
    );
}

#[test]
fn booleans_use_byte_slots() {
    let lines = compile("b = true; print b", Abi::SysV);

    assert_in_order(
        &lines,
        &[
            "movb $1, %al",
            "movzbq %al, %rax",
            "movb %al, -0x8(%rbp)",
            "movb -0x8(%rbp), %al",
            "movzbq %al, %rax",
            "mov %rax, %rdi",
            "call print_bool",
        ],
    );
}

#[test]
fn wide_integers_use_movabs() {
    let lines = compile("print 5000000000", Abi::SysV);
    assert!(lines.contains(&String::from("movabs $5000000000, %rax")));

    let lines = compile("print 2147483647", Abi::SysV);
    assert!(lines.contains(&String::from("mov $2147483647, %rax")));
}

#[test]
fn chars_load_their_scalar_value() {
    let lines = compile("c = 'A'", Abi::SysV);
    assert_sequence(&lines, &["mov $65, %rax", "mov %rax, -0x8(%rbp)"]);
}

#[test]
fn undefined_variables_become_zero() {
    let (lines, errors) = compile_lenient("print y;", Abi::SysV);

    assert_eq!(
        errors,
        vec![
            "Undefined variable `y` during code generation",
            "Cannot print a value of type `<invalid>`",
        ]
    );

    assert!(lines.contains(&String::from("mov $0, %rax")));
    assert!(!lines.iter().any(|line| line.starts_with("call")));
    assert_eq!(lines.last().map(String::as_str), Some(".section .note.GNU-stack,\"\",@progbits"));
}

#[test]
fn unsupported_constructs_are_reported() {
    let (lines, errors) = compile_lenient("s = \"hi\"", Abi::SysV);
    assert_eq!(errors, vec!["Code generation for string literals is not supported"]);
    assert_sequence(&lines, &["mov $0, %rax", "mov %rax, -0x8(%rbp)"]);

    let (_, errors) = compile_lenient("a = 1; (a) = 2", Abi::SysV);
    assert_eq!(errors, vec!["Operator `=` is not supported by the code generator"]);

    let (_, errors) = compile_lenient("c = 'c'; print c", Abi::SysV);
    assert_eq!(errors, vec!["Cannot print a value of type `char`"]);
}

#[test]
fn unanalyzed_trees_do_not_crash() {
    let program = program("x = 1; print x + y");
    let (asm, errors) = generate(&program, Abi::SysV);

    assert!(asm.contains("ret"));
    assert_eq!(errors.len(), 2);
}

#[test]
fn label_counters_are_per_listing() {
    let program = program("x = 1");

    let (first, _) = generate(&program, Abi::SysV);
    let (second, _) = generate(&program, Abi::SysV);

    assert_eq!(first, second);
    assert!(first.contains(".Lmain.0:"));
    assert!(!first.contains(".Lmain.1:"));
}

#[test]
fn comments_emit_nothing() {
    let with_comments = compile("# hi\nx = 1 ### block ###", Abi::SysV);
    let without = compile("x = 1", Abi::SysV);

    assert_eq!(with_comments, without);
}
