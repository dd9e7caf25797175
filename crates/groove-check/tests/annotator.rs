//! End-to-end checks over hand-built files, driving the bundled `FileDb`.

use groove_check::{check_file, codes, CheckConfig};
use groove_core::{CancelToken, Diagnostic, Severity, Span};
use groove_flow::FileDb;
use groove_syntax::{
    ClassDecl, ClassKind, CtorTarget, ExprKind, File, Literal, MapEntry, MapKey, MethodDecl,
    Modifier, ModifierList, Param, StmtKind, StringKind, StringLit, TypeRef,
};
use pretty_assertions::assert_eq;

fn sp(start: usize, end: usize) -> Span {
    Span::new(start, end)
}

fn check(file: &File) -> Vec<Diagnostic> {
    let db = FileDb::new(file);
    check_file(file, &db, &CheckConfig::default(), &CancelToken::new())
}

fn with_code<'d>(diags: &'d [Diagnostic], code: &str) -> Vec<&'d Diagnostic> {
    diags.iter().filter(|d| d.code == code).collect()
}

#[test]
fn value_return_from_void_method_points_at_the_value() {
    let mut file = File::new("demo");
    let five = file.alloc_expr(ExprKind::Literal(Literal::Int(5)), sp(24, 25));
    let ret = file.alloc_stmt(StmtKind::Return(Some(five)), sp(17, 25));
    let body = file.alloc_stmt(
        StmtKind::Block {
            statements: vec![ret],
        },
        sp(15, 27),
    );

    let mut method = MethodDecl::new("foo", sp(10, 13));
    method.return_type = Some(TypeRef::simple("void", sp(5, 9)));
    method.body = Some(body);
    let method_id = file.alloc_method(method);

    let mut class = ClassDecl::new("Demo", ClassKind::Class, sp(0, 4));
    class.methods.push(method_id);
    file.add_top_level_class(class);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::RETURN_FROM_VOID);
    assert_eq!(diags[0].severity, Severity::Error);
    assert_eq!(diags[0].span, sp(24, 25));
}

#[test]
fn extending_a_final_class_points_at_the_subclass_name() {
    let mut file = File::new("demo");

    let mut final_class = ClassDecl::new("Sealed", ClassKind::Class, sp(6, 12));
    final_class.modifiers = ModifierList::of(&[(Modifier::Final, sp(0, 5))]);
    file.add_top_level_class(final_class);

    let mut sub = ClassDecl::new("Sub", ClassKind::Class, sp(21, 24));
    sub.extends = Some(TypeRef::simple("Sealed", sp(33, 39)));
    file.add_top_level_class(sub);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::FINAL_SUPERCLASS);
    assert_eq!(diags[0].span, sp(21, 24));
    assert!(diags[0].message.contains("cannot be extended"));
}

#[test]
fn overriding_a_final_method_is_exactly_one_error() {
    let mut file = File::new("demo");

    let mut base_method = MethodDecl::new("run", sp(20, 23));
    base_method.modifiers = ModifierList::of(&[(Modifier::Final, sp(14, 19))]);
    // Incompatible return spelling on purpose: the final violation must win
    // and be the only diagnostic for this pair.
    base_method.return_type = Some(TypeRef::simple("String", sp(7, 13)));
    let base_method_id = file.alloc_method(base_method);
    let mut base = ClassDecl::new("Base", ClassKind::Class, sp(0, 4));
    base.methods.push(base_method_id);
    file.add_top_level_class(base);

    let mut sub_method = MethodDecl::new("run", sp(60, 63));
    sub_method.return_type = Some(TypeRef::simple("Object", sp(53, 59)));
    let sub_method_id = file.alloc_method(sub_method);
    let mut sub = ClassDecl::new("Sub", ClassKind::Class, sp(40, 43));
    sub.extends = Some(TypeRef::simple("Base", sp(48, 52)));
    sub.methods.push(sub_method_id);
    file.add_top_level_class(sub);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::OVERRIDES_FINAL);
    assert_eq!(diags[0].span, sp(60, 63));
}

#[test]
fn covariant_override_is_clean_and_widening_is_not() {
    let mut file = File::new("demo");

    let mut base_method = MethodDecl::new("name", sp(20, 24));
    base_method.return_type = Some(TypeRef::simple("Object", sp(13, 19)));
    let base_method_id = file.alloc_method(base_method);
    let mut base = ClassDecl::new("Base", ClassKind::Class, sp(0, 4));
    base.methods.push(base_method_id);
    file.add_top_level_class(base);

    // Narrowing Object -> String is covariant and fine.
    let mut narrow = MethodDecl::new("name", sp(60, 64));
    narrow.return_type = Some(TypeRef::simple("String", sp(53, 59)));
    let narrow_id = file.alloc_method(narrow);
    let mut narrow_class = ClassDecl::new("Narrow", ClassKind::Class, sp(40, 46));
    narrow_class.extends = Some(TypeRef::simple("Base", sp(48, 52)));
    narrow_class.methods.push(narrow_id);
    file.add_top_level_class(narrow_class);

    let diags = check(&file);
    assert_eq!(diags, vec![], "covariant override must be clean");

    // Widening String -> Object on a String-returning super is an error.
    let mut file = File::new("demo2");
    let mut base_method = MethodDecl::new("name", sp(20, 24));
    base_method.return_type = Some(TypeRef::simple("String", sp(13, 19)));
    let base_method_id = file.alloc_method(base_method);
    let mut base = ClassDecl::new("Base", ClassKind::Class, sp(0, 4));
    base.methods.push(base_method_id);
    file.add_top_level_class(base);

    let mut wide = MethodDecl::new("name", sp(60, 64));
    wide.return_type = Some(TypeRef::simple("Object", sp(53, 59)));
    let wide_id = file.alloc_method(wide);
    let mut wide_class = ClassDecl::new("Wide", ClassKind::Class, sp(40, 44));
    wide_class.extends = Some(TypeRef::simple("Base", sp(48, 52)));
    wide_class.methods.push(wide_id);
    file.add_top_level_class(wide_class);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::INCOMPATIBLE_RETURN_TYPE);
}

#[test]
fn duplicate_named_arguments_error_but_map_keys_only_warn() {
    let mut file = File::new("script");

    // foo(x: 1, x: 2)
    let one = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), sp(7, 8));
    let two = file.alloc_expr(ExprKind::Literal(Literal::Int(2)), sp(13, 14));
    let arg1 = file.alloc_expr(
        ExprKind::NamedArg {
            name: "x".into(),
            name_span: sp(4, 5),
            value: one,
        },
        sp(4, 8),
    );
    let arg2 = file.alloc_expr(
        ExprKind::NamedArg {
            name: "x".into(),
            name_span: sp(10, 11),
            value: two,
        },
        sp(10, 14),
    );
    let call = file.alloc_expr(
        ExprKind::Call {
            receiver: None,
            name: "foo".into(),
            name_span: sp(0, 3),
            args: vec![arg1, arg2],
        },
        sp(0, 15),
    );
    let call_stmt = file.alloc_stmt(StmtKind::Expr(call), sp(0, 15));

    // [a: 1, a: 2]
    let three = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), sp(20, 21));
    let four = file.alloc_expr(ExprKind::Literal(Literal::Int(2)), sp(26, 27));
    let map = file.alloc_expr(
        ExprKind::MapLit {
            entries: vec![
                MapEntry {
                    key: MapKey::Name("a".into()),
                    key_span: sp(17, 18),
                    value: three,
                },
                MapEntry {
                    key: MapKey::Name("a".into()),
                    key_span: sp(23, 24),
                    value: four,
                },
            ],
        },
        sp(16, 28),
    );
    let map_stmt = file.alloc_stmt(StmtKind::Expr(map), sp(16, 28));

    file.push_script_stmt(call_stmt);
    file.push_script_stmt(map_stmt);

    let diags = check(&file);
    let call_dups = with_code(&diags, codes::DUPLICATE_NAMED_ARGUMENT);
    assert_eq!(call_dups.len(), 1);
    assert_eq!(call_dups[0].severity, Severity::Error);
    assert_eq!(call_dups[0].span, sp(10, 11));

    let map_dups = with_code(&diags, codes::DUPLICATE_MAP_KEY);
    assert_eq!(map_dups.len(), 1);
    assert_eq!(map_dups[0].severity, Severity::Warning);
    assert_eq!(map_dups[0].span, sp(23, 24));

    assert_eq!(diags.len(), 2, "unexpected diagnostics: {diags:?}");
}

fn delegating_constructor(
    file: &mut File,
    class_name: &str,
    name_span: Span,
    params: usize,
    delegate_args: usize,
) -> groove_syntax::MethodId {
    let mut args = Vec::with_capacity(delegate_args);
    for _ in 0..delegate_args {
        args.push(file.alloc_expr(ExprKind::Literal(Literal::Int(0)), sp(0, 1)));
    }
    let call = file.alloc_stmt(
        StmtKind::ConstructorCall {
            target: CtorTarget::This,
            args,
        },
        name_span,
    );
    let body = file.alloc_stmt(
        StmtKind::Block {
            statements: vec![call],
        },
        name_span,
    );

    let mut ctor = MethodDecl::constructor(class_name, name_span);
    for index in 0..params {
        ctor.params.push(Param::untyped(format!("p{index}"), sp(0, 1)));
    }
    ctor.body = Some(body);
    file.alloc_method(ctor)
}

#[test]
fn two_constructor_delegation_cycle_flags_both() {
    let mut file = File::new("demo");
    let c0 = delegating_constructor(&mut file, "Demo", sp(10, 14), 0, 1);
    let c1 = delegating_constructor(&mut file, "Demo", sp(30, 34), 1, 0);

    let mut class = ClassDecl::new("Demo", ClassKind::Class, sp(0, 4));
    class.methods.push(c0);
    class.methods.push(c1);
    file.add_top_level_class(class);

    let diags = check(&file);
    let cycle = with_code(&diags, codes::RECURSIVE_CONSTRUCTOR);
    assert_eq!(cycle.len(), 2, "both cycle members flag: {diags:?}");
    let spans: Vec<Span> = cycle.iter().map(|d| d.span).collect();
    assert!(spans.contains(&sp(10, 14)));
    assert!(spans.contains(&sp(30, 34)));
}

#[test]
fn fifty_constructor_cycle_terminates_and_flags_all() {
    let mut file = File::new("big");
    let mut ctors = Vec::new();
    for index in 0..50usize {
        let name_span = sp(index * 10, index * 10 + 3);
        ctors.push(delegating_constructor(
            &mut file,
            "Big",
            name_span,
            index,
            (index + 1) % 50,
        ));
    }

    let mut class = ClassDecl::new("Big", ClassKind::Class, sp(0, 3));
    class.methods.extend(ctors);
    file.add_top_level_class(class);

    let diags = check(&file);
    let cycle = with_code(&diags, codes::RECURSIVE_CONSTRUCTOR);
    assert_eq!(cycle.len(), 50);
}

#[test]
fn missing_default_super_constructor_is_reported() {
    let mut file = File::new("demo");

    let mut base_ctor = MethodDecl::constructor("Base", sp(10, 14));
    base_ctor.params.push(Param {
        name: "seed".into(),
        ty: Some(TypeRef::simple("int", sp(15, 18))),
        default: None,
        span: sp(15, 23),
    });
    let base_ctor_id = file.alloc_method(base_ctor);
    let mut base = ClassDecl::new("Base", ClassKind::Class, sp(0, 4));
    base.methods.push(base_ctor_id);
    file.add_top_level_class(base);

    let mut sub = ClassDecl::new("Sub", ClassKind::Class, sp(40, 43));
    sub.extends = Some(TypeRef::simple("Base", sp(52, 56)));
    file.add_top_level_class(sub);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::NO_DEFAULT_SUPER_CONSTRUCTOR);
    assert_eq!(diags[0].span, sp(40, 43));
}

#[test]
fn all_default_parameters_satisfy_the_super_requirement() {
    let mut file = File::new("demo");

    let default_value = file.alloc_expr(ExprKind::Literal(Literal::Int(1)), sp(20, 21));
    let mut base_ctor = MethodDecl::constructor("Base", sp(10, 14));
    base_ctor.params.push(Param {
        name: "seed".into(),
        ty: Some(TypeRef::simple("int", sp(15, 18))),
        default: Some(default_value),
        span: sp(15, 23),
    });
    let base_ctor_id = file.alloc_method(base_ctor);
    let mut base = ClassDecl::new("Base", ClassKind::Class, sp(0, 4));
    base.methods.push(base_ctor_id);
    file.add_top_level_class(base);

    let mut sub = ClassDecl::new("Sub", ClassKind::Class, sp(40, 43));
    sub.extends = Some(TypeRef::simple("Base", sp(52, 56)));
    file.add_top_level_class(sub);

    assert_eq!(check(&file), vec![]);
}

#[test]
fn cyclic_inheritance_flags_each_participant() {
    let mut file = File::new("demo");
    let mut a = ClassDecl::new("Alpha", ClassKind::Class, sp(0, 5));
    a.extends = Some(TypeRef::simple("Beta", sp(14, 18)));
    file.add_top_level_class(a);
    let mut b = ClassDecl::new("Beta", ClassKind::Class, sp(30, 34));
    b.extends = Some(TypeRef::simple("Alpha", sp(43, 48)));
    file.add_top_level_class(b);

    let diags = check(&file);
    let cyclic = with_code(&diags, codes::CYCLIC_INHERITANCE);
    assert_eq!(cyclic.len(), 2, "unexpected diagnostics: {diags:?}");
}

#[test]
fn malformed_string_literal_positions_at_first_offender() {
    let mut file = File::new("script");
    let lit = file.alloc_expr(
        ExprKind::Literal(Literal::Str(StringLit {
            kind: StringKind::Double,
            text: "\"a\\qb\"".to_string(),
        })),
        sp(100, 106),
    );
    let stmt = file.alloc_stmt(StmtKind::Expr(lit), sp(100, 106));
    file.push_script_stmt(stmt);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::MALFORMED_STRING_LITERAL);
    // Token-relative 2..4, rebased onto the literal's span.
    assert_eq!(diags[0].span, sp(102, 104));
}

#[test]
fn primitive_type_arguments_are_errors() {
    let mut file = File::new("script");
    let decl = file.alloc_stmt(
        StmtKind::VarDecl {
            name: "xs".into(),
            name_span: sp(10, 12),
            declared: Some(TypeRef::generic(
                "List",
                vec![TypeRef::simple("int", sp(5, 8))],
                sp(0, 9),
            )),
            initializer: None,
        },
        sp(0, 12),
    );
    file.push_script_stmt(decl);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::PRIMITIVE_TYPE_ARGUMENT);
    assert_eq!(diags[0].span, sp(5, 8));
}

#[test]
fn wrong_type_argument_arity_warns() {
    let mut file = File::new("script");
    let decl = file.alloc_stmt(
        StmtKind::VarDecl {
            name: "xs".into(),
            name_span: sp(22, 24),
            declared: Some(TypeRef::generic(
                "List",
                vec![
                    TypeRef::simple("String", sp(5, 11)),
                    TypeRef::simple("String", sp(13, 19)),
                ],
                sp(0, 20),
            )),
            initializer: None,
        },
        sp(0, 24),
    );
    file.push_script_stmt(decl);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::WRONG_TYPE_ARGUMENT_COUNT);
    assert_eq!(diags[0].severity, Severity::Warning);
}

#[test]
fn top_level_visibility_is_gated_by_language_level() {
    let mut file = File::new("demo");
    let mut class = ClassDecl::new("Hidden", ClassKind::Class, sp(8, 14));
    class.modifiers = ModifierList::of(&[(Modifier::Private, sp(0, 7))]);
    file.add_top_level_class(class);

    let diags = check(&file);
    assert_eq!(diags.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(diags[0].code, codes::TOP_LEVEL_VISIBILITY);

    let db = FileDb::new(&file);
    let legacy = CheckConfig {
        language_level: groove_syntax::GroovyLanguageLevel::GROOVY_1_8,
        ..CheckConfig::default()
    };
    let diags = check_file(&file, &db, &legacy, &CancelToken::new());
    assert_eq!(diags, vec![], "1.8 allows private top-level classes");
}

#[test]
fn duplicate_methods_flag_every_member_of_the_group() {
    let mut file = File::new("demo");
    let mut first = MethodDecl::new("work", sp(10, 14));
    first.params = vec![Param {
        name: "x".into(),
        ty: Some(TypeRef::simple("String", sp(15, 21))),
        default: None,
        span: sp(15, 23),
    }];
    let first_id = file.alloc_method(first);

    let mut second = MethodDecl::new("work", sp(40, 44));
    second.params = vec![Param {
        name: "y".into(),
        ty: Some(TypeRef::simple("String", sp(45, 51))),
        default: None,
        span: sp(45, 53),
    }];
    let second_id = file.alloc_method(second);

    let mut class = ClassDecl::new("Demo", ClassKind::Class, sp(0, 4));
    class.methods.push(first_id);
    class.methods.push(second_id);
    file.add_top_level_class(class);

    let diags = check(&file);
    let dups = with_code(&diags, codes::DUPLICATE_METHOD);
    assert_eq!(dups.len(), 2, "unexpected diagnostics: {diags:?}");
}

#[test]
fn cancellation_yields_no_partial_diagnostics() {
    let mut file = File::new("demo");
    // A file that would produce diagnostics.
    let mut final_class = ClassDecl::new("Sealed", ClassKind::Class, sp(6, 12));
    final_class.modifiers = ModifierList::of(&[(Modifier::Final, sp(0, 5))]);
    file.add_top_level_class(final_class);
    let mut sub = ClassDecl::new("Sub", ClassKind::Class, sp(21, 24));
    sub.extends = Some(TypeRef::simple("Sealed", sp(33, 39)));
    file.add_top_level_class(sub);

    let db = FileDb::new(&file);
    let cancel = CancelToken::new();
    cancel.cancel();
    let diags = check_file(&file, &db, &CheckConfig::default(), &cancel);
    assert_eq!(diags, vec![], "cancelled pass surfaces nothing");
}

#[test]
fn duplicate_class_names_count_the_script_class() {
    // A class named like the script file collides with the synthetic
    // script class once script statements exist.
    let mut file = File::new("build");
    let nop = file.alloc_stmt(StmtKind::Nop, sp(0, 1));
    file.push_script_stmt(nop);
    file.add_top_level_class(ClassDecl::new("build", ClassKind::Class, sp(10, 15)));

    let diags = check(&file);
    let dups = with_code(&diags, codes::DUPLICATE_CLASS);
    assert_eq!(dups.len(), 1, "unexpected diagnostics: {diags:?}");
    assert_eq!(dups[0].span, sp(10, 15));
}
