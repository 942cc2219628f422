//! End-to-end scenarios A-G, run directly against the per-file jobs
//! (no thread pool involved — `alchemy-runner`'s fan-out is exercised
//! separately). Each test builds a small `SyntaxTree` by hand and drives
//! Gather, Base, and Member in order, exactly as one worker thread would
//! for one file.
use std::sync::Arc;

use alchemy_ast::{
    FieldSyntax, MethodSyntax, NamespaceDeclSyntax, ParameterSyntax, SyntaxNodeId, SyntaxTree, TopLevelItem, TypeClassSyntax, TypeDeclSyntax,
    TypeSyntax, UsingDirectiveSyntax, VariableDeclaratorSyntax,
};
use alchemy_checker::SourceFile;
use alchemy_data::{ErrorCode, FileId, Span, TokenKind};
use alchemy_syntax::{TypeClass, TypeInfoFlags, TypeTable, Visibility};

fn span() -> Span {
    Span::synthetic()
}

fn node() -> SyntaxNodeId {
    SyntaxNodeId(0)
}

fn predefined(keyword: TokenKind) -> TypeSyntax {
    TypeSyntax::Predefined { keyword, span: span() }
}

fn identifier(name: &str) -> TypeSyntax {
    TypeSyntax::IdentifierName { name: name.to_string(), span: span() }
}

fn generic(name: &str, arguments: Vec<TypeSyntax>) -> TypeSyntax {
    TypeSyntax::GenericName { name: name.to_string(), arguments, span: span() }
}

fn field(type_syntax: TypeSyntax, name: &str) -> FieldSyntax {
    FieldSyntax { type_syntax, declarators: vec![VariableDeclaratorSyntax { name: name.to_string(), span: span() }], modifiers: vec![], span: span(), node: node() }
}

fn empty_type(name: &str, class: TypeClassSyntax) -> TypeDeclSyntax {
    TypeDeclSyntax {
        type_class: class,
        name: name.to_string(),
        modifiers: Vec::new(),
        generic_parameters: Vec::new(),
        base_list: Vec::new(),
        fields: Vec::new(),
        methods: Vec::new(),
        properties: Vec::new(),
        indexers: Vec::new(),
        constructors: Vec::new(),
        span: span(),
        node: node(),
    }
}

fn run_file(file: Arc<SourceFile>, table: &TypeTable) -> Arc<SourceFile> {
    alchemy_checker::gather::run(&file, table);
    alchemy_checker::base::run(&file, table);
    alchemy_checker::member::run(&file, table);
    file
}

/// A — Basic struct, global namespace.
#[test]
fn scenario_a_basic_struct_global_namespace() {
    let mut decl = empty_type("Foo", TypeClassSyntax::Struct);
    decl.fields = vec![field(predefined(TokenKind::Int), "x"), field(predefined(TokenKind::Float), "y")];
    let tree = SyntaxTree { file: FileId(0), items: vec![TopLevelItem::Type(decl)] };

    let table = TypeTable::new();
    let file = run_file(Arc::new(SourceFile::new(FileId(0), "foo.alch".into(), tree)), &table);

    assert!(file.diagnostics.is_empty());
    let foo = table.try_resolve("global::Foo").expect("Foo resolves");
    assert_eq!(foo.type_class, TypeClass::Struct);
    assert_eq!(foo.visibility, Visibility::Public);
    assert!(foo.base_types().is_empty());
    let fields = foo.fields();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].name, "x");
    assert_eq!(fields[0].field_type.type_info.as_ref().unwrap().fully_qualified_name, "BuiltIn::Int32");
    assert_eq!(fields[1].name, "y");
    assert_eq!(fields[1].field_type.type_info.as_ref().unwrap().fully_qualified_name, "BuiltIn::Float");
}

/// B — Namespaced class with generics.
#[test]
fn scenario_b_namespaced_generic_class() {
    let mut decl = empty_type("Box", TypeClassSyntax::Class);
    decl.generic_parameters = vec![alchemy_ast::GenericParameterSyntax { name: "T".to_string(), span: span() }];
    decl.fields = vec![field(identifier("T"), "value")];
    let tree = SyntaxTree {
        file: FileId(0),
        items: vec![
            TopLevelItem::Namespace(NamespaceDeclSyntax { namespace: "N::M".to_string(), span: span() }),
            TopLevelItem::Type(decl),
        ],
    };

    let table = TypeTable::new();
    let file = run_file(Arc::new(SourceFile::new(FileId(0), "box.alch".into(), tree)), &table);

    assert!(file.diagnostics.is_empty());
    let open = table.try_resolve("N::M::Box$1").expect("Box$1 resolves");
    assert!(open.flags.contains(TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION));
    assert_eq!(open.fields().len(), 1);
    assert_eq!(open.fields()[0].name, "value");

    let arg = table.try_resolve("N::M::Box$1_T[0]").expect("generic argument resolves");
    assert!(arg.flags.contains(TypeInfoFlags::IS_GENERIC_ARGUMENT_DEFINITION));
    assert_eq!(arg.type_class, TypeClass::GenericArgument);
}

/// C — Closed generic instantiation.
#[test]
fn scenario_c_closed_generic_instantiation() {
    let mut box_decl = empty_type("Box", TypeClassSyntax::Class);
    box_decl.generic_parameters = vec![alchemy_ast::GenericParameterSyntax { name: "T".to_string(), span: span() }];
    box_decl.fields = vec![field(identifier("T"), "value")];

    let mut user_decl = empty_type("User", TypeClassSyntax::Struct);
    user_decl.fields = vec![field(generic("Box", vec![predefined(TokenKind::Int)]), "boxed")];

    let tree = SyntaxTree {
        file: FileId(0),
        items: vec![
            TopLevelItem::Namespace(NamespaceDeclSyntax { namespace: "N::M".to_string(), span: span() }),
            TopLevelItem::Type(box_decl),
            TopLevelItem::Type(user_decl),
        ],
    };

    let table = TypeTable::new();
    let _file = run_file(Arc::new(SourceFile::new(FileId(0), "box.alch".into(), tree)), &table);

    let closed = table.try_resolve("N::M::Box$1<BuiltIn::Int32>").expect("closed instantiation resolves");
    assert!(closed.flags.contains(TypeInfoFlags::INSTANTIATED_GENERIC));
    assert!(!closed.flags.contains(TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION));
    assert_eq!(closed.fields()[0].field_type.type_info.as_ref().unwrap().fully_qualified_name, "BuiltIn::Int32");
}

/// D — Class cycle.
#[test]
fn scenario_d_class_cycle() {
    let mut a = empty_type("A", TypeClassSyntax::Class);
    a.base_list = vec![identifier("B")];
    let mut b = empty_type("B", TypeClassSyntax::Class);
    b.base_list = vec![identifier("A")];

    let tree = SyntaxTree { file: FileId(0), items: vec![TopLevelItem::Type(a), TopLevelItem::Type(b)] };

    let table = TypeTable::new();
    let file = Arc::new(SourceFile::new(FileId(0), "cycle.alch".into(), tree));
    alchemy_checker::gather::run(&file, &table);
    alchemy_checker::base::run(&file, &table);
    alchemy_checker::base::detect_cycles(std::slice::from_ref(&file), &table);
    alchemy_checker::member::run(&file, &table);

    let diagnostics = file.diagnostics.snapshot();
    let cycles: Vec<_> = diagnostics.iter().filter(|d| d.code == ErrorCode::CycleDetectedInClassHierarchy).collect();
    assert_eq!(cycles.len(), 1, "exactly one cycle diagnostic, not one per member of the cycle");
    assert_eq!(cycles[0].message.as_deref(), Some("global::A -> global::B -> global::A"));
}

/// E — Struct inheriting a class.
#[test]
fn scenario_e_struct_inheriting_class() {
    let some_class = empty_type("SomeClass", TypeClassSyntax::Class);
    let mut s = empty_type("S", TypeClassSyntax::Struct);
    s.base_list = vec![identifier("SomeClass")];

    let tree = SyntaxTree { file: FileId(0), items: vec![TopLevelItem::Type(some_class), TopLevelItem::Type(s)] };

    let table = TypeTable::new();
    let file = run_file(Arc::new(SourceFile::new(FileId(0), "s.alch".into(), tree)), &table);

    let diagnostics = file.diagnostics.snapshot();
    assert!(diagnostics.iter().any(|d| d.code == ErrorCode::StructsCanOnlyInheritInterfaces));
}

/// F — Ambiguous identifier.
#[test]
fn scenario_f_ambiguous_identifier() {
    let foo_in_n = empty_type("Foo", TypeClassSyntax::Struct);
    let foo_in_m = empty_type("Foo", TypeClassSyntax::Struct);

    let tree_n = SyntaxTree {
        file: FileId(0),
        items: vec![TopLevelItem::Namespace(NamespaceDeclSyntax { namespace: "N".to_string(), span: span() }), TopLevelItem::Type(foo_in_n)],
    };
    let tree_m = SyntaxTree {
        file: FileId(1),
        items: vec![TopLevelItem::Namespace(NamespaceDeclSyntax { namespace: "M".to_string(), span: span() }), TopLevelItem::Type(foo_in_m)],
    };

    let mut consumer = empty_type("Consumer", TypeClassSyntax::Struct);
    consumer.fields = vec![field(identifier("Foo"), "x")];
    let tree_consumer = SyntaxTree {
        file: FileId(2),
        items: vec![
            TopLevelItem::Using(UsingDirectiveSyntax { namespace: "N".to_string(), span: span() }),
            TopLevelItem::Using(UsingDirectiveSyntax { namespace: "M".to_string(), span: span() }),
            TopLevelItem::Type(consumer),
        ],
    };

    let table = TypeTable::new();
    let files = vec![
        Arc::new(SourceFile::new(FileId(0), "n.alch".into(), tree_n)),
        Arc::new(SourceFile::new(FileId(1), "m.alch".into(), tree_m)),
        Arc::new(SourceFile::new(FileId(2), "consumer.alch".into(), tree_consumer)),
    ];
    for file in &files {
        alchemy_checker::gather::run(file, &table);
    }
    for file in &files {
        alchemy_checker::base::run(file, &table);
    }
    for file in &files {
        alchemy_checker::member::run(file, &table);
    }

    let consumer_diagnostics = files[2].diagnostics.snapshot();
    assert!(consumer_diagnostics.iter().any(|d| d.code == ErrorCode::AmbiguousTypeMatch));
}

/// G — Default parameter ordering error.
#[test]
fn scenario_g_default_parameter_ordering_error() {
    let mut decl = empty_type("Holder", TypeClassSyntax::Struct);
    decl.methods = vec![MethodSyntax {
        name: "M".to_string(),
        return_type: predefined(TokenKind::Void),
        parameters: vec![
            ParameterSyntax { name: "a".to_string(), type_syntax: predefined(TokenKind::Int), modifiers: vec![], has_default_value: true, span: span(), node: node() },
            ParameterSyntax { name: "b".to_string(), type_syntax: predefined(TokenKind::Int), modifiers: vec![], has_default_value: false, span: span(), node: node() },
        ],
        modifiers: vec![],
        span: span(),
        node: node(),
    }];

    let tree = SyntaxTree { file: FileId(0), items: vec![TopLevelItem::Type(decl)] };
    let table = TypeTable::new();
    let file = run_file(Arc::new(SourceFile::new(FileId(0), "holder.alch".into(), tree)), &table);

    let diagnostics = file.diagnostics.snapshot();
    assert!(diagnostics.iter().any(|d| d.code == ErrorCode::OptionalParameterOrder));

    let holder = table.try_resolve("global::Holder").unwrap();
    assert_eq!(holder.methods().len(), 1, "malformed method produces no overloads, only the base slot");
    assert!(!holder.methods()[0].is_default_parameter_overload);
}
