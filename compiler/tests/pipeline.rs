use exprc::ast::{Expr, Function, Node, Prototype};
use exprc::{ANON_FUNCTION_NAME, CodeGen, CodegenError, Lowered, Parser};
use inkwell::builder::BuilderError;
use inkwell::context::Context;
use inkwell::values::AnyValue;

fn define(codegen: &mut CodeGen, source: &str) -> Result<String, CodegenError> {
    let function = Parser::from_source(source)
        .parse_definition()
        .expect("definition should parse");
    codegen
        .lower_function(&function)
        .map(|f| f.print_to_string().to_string())
}

fn top_level(codegen: &mut CodeGen, source: &str) -> Result<String, CodegenError> {
    let function = Parser::from_source(source)
        .parse_top_level_expr()
        .expect("expression should parse");
    codegen
        .lower_function(&function)
        .map(|f| f.print_to_string().to_string())
}

#[test]
fn defines_function_with_double_parameters() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let ir = define(&mut codegen, "func add(a b) a + b").expect("lowering failed");
    assert!(ir.contains("define double @add(double %a, double %b)"), "{ir}");
    assert!(ir.contains("fadd double %a, %b"), "{ir}");
    assert!(ir.contains("ret double"), "{ir}");

    let add = codegen.module.get_function("add").expect("add not in module");
    assert_eq!(add.count_params(), 2);
    assert!(add.verify(false));
}

#[test]
fn lowers_every_operator() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let ir = define(&mut codegen, "func ops(a b) (a - b) * (a + b) < b").expect("lowering failed");
    assert!(ir.contains("fsub double"), "{ir}");
    assert!(ir.contains("fmul double"), "{ir}");
    assert!(ir.contains("fadd double"), "{ir}");
    assert!(ir.contains("fcmp ult double"), "{ir}");
    assert!(ir.contains("uitofp i1"), "{ir}");
}

#[test]
fn calls_previously_defined_function() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func square(x) x * x").expect("square failed");
    let ir = define(&mut codegen, "func twice(y) square(y) + square(2)").expect("twice failed");
    assert!(ir.contains("call double @square(double %y)"), "{ir}");
}

#[test]
fn arity_mismatch_emits_no_call() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func id(x) x").expect("id failed");
    let err = define(&mut codegen, "func bad() id(1, 2)").unwrap_err();
    assert!(
        matches!(
            err,
            CodegenError::ArgumentCount {
                expected: 1,
                found: 2,
                ..
            }
        ),
        "{err}"
    );

    assert!(codegen.module.get_function("bad").is_none());
    assert!(!codegen.module_ir().contains("call"));
}

#[test]
fn redefinition_keeps_original() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let original = define(&mut codegen, "func f(x) x + 1").expect("first definition failed");
    let err = define(&mut codegen, "func f(x) x * 2").unwrap_err();
    assert!(matches!(err, CodegenError::Redefinition(ref name) if name == "f"));

    assert_eq!(codegen.function_ir("f"), Some(original));
}

#[test]
fn failed_definition_is_rolled_back() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let err = define(&mut codegen, "func g(x) y").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownVariable(ref name) if name == "y"));
    assert!(codegen.module.get_function("g").is_none());

    // The name is free again.
    define(&mut codegen, "func g(x) x").expect("second attempt failed");
}

#[test]
fn unknown_function_is_reported() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let err = top_level(&mut codegen, "missing(1)").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownFunction(ref name) if name == "missing"));
    assert!(codegen.module.get_function(ANON_FUNCTION_NAME).is_none());
}

#[test]
fn bindings_do_not_leak_between_functions() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func first(x) x").expect("first failed");
    let err = define(&mut codegen, "func second(y) x").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownVariable(ref name) if name == "x"));
}

#[test]
fn invalid_operator_is_rejected() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let function = Function {
        proto: Prototype::new("div", vec!["a".to_string(), "b".to_string()]),
        body: Expr::binary('/', Expr::variable("a"), Expr::variable("b")),
    };
    let err = codegen.lower(&Node::Function(function)).unwrap_err();
    assert!(matches!(err, CodegenError::InvalidOperator('/')));
    assert!(codegen.module.get_function("div").is_none());
}

#[test]
fn string_literals_are_not_lowered() {
    let context = Context::create();
    let codegen = CodeGen::new(&context, "test");

    let err = codegen
        .lower_expr(&Expr::StringLiteral("hello".to_string()))
        .unwrap_err();
    assert!(matches!(err, CodegenError::UnsupportedStringLiteral));
}

#[test]
fn number_constants_are_independent_and_equal() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let node = Node::Expr(Expr::Number(4.5));
    let first = codegen.lower(&node).expect("first lowering failed");
    let second = codegen.lower(&node).expect("second lowering failed");

    let (Lowered::Value(first), Lowered::Value(second)) = (first, second) else {
        panic!("numbers lower to values");
    };
    assert_eq!(first.get_constant(), Some((4.5, false)));
    assert_eq!(second.get_constant(), Some((4.5, false)));
}

#[test]
fn prototype_declares_without_body() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let proto = Prototype::new("ext", vec!["a".to_string()]);
    let Lowered::Function(decl) = codegen.lower(&Node::Prototype(proto.clone())).unwrap() else {
        panic!("prototypes lower to functions");
    };
    assert_eq!(decl.count_basic_blocks(), 0);
    assert_eq!(decl.count_params(), 1);

    // Redeclaring reuses the declaration; a different arity conflicts.
    let Lowered::Function(again) = codegen.lower(&Node::Prototype(proto)).unwrap() else {
        panic!("prototypes lower to functions");
    };
    assert_eq!(again, decl);

    let err = codegen
        .lower_prototype(&Prototype::new("ext", vec![]))
        .unwrap_err();
    assert!(matches!(
        err,
        CodegenError::ConflictingDeclaration {
            declared: 1,
            found: 0,
            ..
        }
    ));

    // A later definition fills in the declaration.
    let ir = define(&mut codegen, "func ext(a) a * a").expect("definition failed");
    assert!(ir.contains("define double @ext(double %a)"), "{ir}");
}

#[test]
fn duplicate_parameters_are_rejected() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let err = define(&mut codegen, "func dup(x x) x").unwrap_err();
    assert!(matches!(err, CodegenError::DuplicateParameter(ref name) if name == "x"));
    assert!(codegen.module.get_function("dup").is_none());
}

#[test]
fn anonymous_function_can_be_reused_after_removal() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    top_level(&mut codegen, "1 + 2").expect("first expression failed");
    assert!(matches!(
        top_level(&mut codegen, "3"),
        Err(CodegenError::Redefinition(_))
    ));

    // SAFETY: no handle to the anonymous function is held.
    assert!(unsafe { codegen.remove_function(ANON_FUNCTION_NAME) });
    let ir = top_level(&mut codegen, "3").expect("expression failed after removal");
    assert!(ir.contains("ret double 3.000000e+00"), "{ir}");
}

#[test]
fn parenthesized_and_bare_expressions_lower_identically() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let bare = define(&mut codegen, "func a(x y) x + y").expect("a failed");
    let parens = define(&mut codegen, "func b(x y) (x + y)").expect("b failed");
    assert_eq!(bare.replace("@a(", "@b("), parens);
}

#[test]
fn comments_and_whitespace_do_not_affect_parsing() {
    let mut parser = Parser::from_source("# leading comment\nfunc f(x)\n  # body follows\n  x + 1");
    let function = parser.parse_definition().expect("definition should parse");
    assert_eq!(function.proto.name, "f");
    assert_eq!(
        function.body,
        Expr::binary('+', Expr::variable("x"), Expr::Number(1.0))
    );
}

fn call_id_once<'ctx>(codegen: &mut CodeGen<'ctx>) -> Result<Lowered<'ctx>, CodegenError> {
    codegen.lower(&Node::Expr(Expr::call("id", vec![Expr::Number(1.0)])))
}

#[test]
fn failed_definition_leaves_no_insertion_point() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func id(x) x").expect("id failed");
    let err = define(&mut codegen, "func g(x) id(x) + y").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownVariable(ref name) if name == "y"));

    let err = call_id_once(&mut codegen).unwrap_err();
    assert!(
        matches!(err, CodegenError::Builder(BuilderError::UnsetPosition)),
        "{err}"
    );
    assert!(!codegen.module_ir().contains("call"));
}

#[test]
fn finished_definition_leaves_no_insertion_point() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let ir = define(&mut codegen, "func id(x) x").expect("id failed");
    let err = call_id_once(&mut codegen).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::Builder(BuilderError::UnsetPosition)
    ));
    assert_eq!(codegen.function_ir("id"), Some(ir));
}

#[test]
fn removed_function_leaves_no_insertion_point() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func id(x) x").expect("id failed");
    top_level(&mut codegen, "id(2)").expect("expression failed");
    // SAFETY: no handle to the anonymous function is held.
    assert!(unsafe { codegen.remove_function(ANON_FUNCTION_NAME) });

    let err = call_id_once(&mut codegen).unwrap_err();
    assert!(matches!(
        err,
        CodegenError::Builder(BuilderError::UnsetPosition)
    ));
}

#[test]
fn definition_renames_declared_parameters() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let proto = Prototype::new("f", vec!["x".to_string()]);
    codegen
        .lower(&Node::Prototype(proto))
        .expect("declaration failed");

    let ir = define(&mut codegen, "func f(y) y + 1").expect("definition failed");
    assert!(ir.contains("define double @f(double %y)"), "{ir}");
    assert!(ir.contains("fadd double %y, 1.000000e+00"), "{ir}");
}

#[test]
fn failed_definition_keeps_earlier_declaration() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    let proto = Prototype::new("f", vec!["x".to_string()]);
    let Lowered::Function(decl) = codegen.lower(&Node::Prototype(proto)).unwrap() else {
        panic!("prototypes lower to functions");
    };

    let err = define(&mut codegen, "func f(y) z").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownVariable(ref name) if name == "z"));

    let f = codegen.module.get_function("f").expect("declaration was removed");
    assert_eq!(f, decl);
    assert_eq!(f.count_basic_blocks(), 0);

    define(&mut codegen, "func f(y) y").expect("definition after failure failed");
}

#[test]
fn failing_argument_aborts_the_call() {
    let context = Context::create();
    let mut codegen = CodeGen::new(&context, "test");

    define(&mut codegen, "func id(x) x").expect("id failed");
    let err = define(&mut codegen, "func h(x) id(q)").unwrap_err();
    assert!(matches!(err, CodegenError::UnknownVariable(ref name) if name == "q"));

    assert!(codegen.module.get_function("h").is_none());
    assert!(!codegen.module_ir().contains("call"));
}
