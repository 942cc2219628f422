use std::sync::{Arc, OnceLock};

use alchemy_ast::{ModifierToken, TopLevelItem, TypeClassSyntax, TypeDeclSyntax};
use alchemy_data::{ErrorCode, TokenKind};
use alchemy_syntax::{TypeClass, TypeInfo, TypeInfoFlags, TypeTable, Visibility};

use crate::source_file::SourceFile;

/// §4.5 GatherJob: a single pass over top-level members enforcing namespace
/// → usings → declarations order, then allocating one `TypeInfo` shell
/// (with its generic-argument placeholders) per declared type.
pub fn run(file: &SourceFile, table: &TypeTable) {
    let mut namespace: Option<String> = None;
    let mut usings: Vec<String> = Vec::new();
    let mut declared: Vec<Arc<TypeInfo>> = Vec::new();
    let mut seen_using_or_decl = false;
    let mut seen_decl = false;

    for item in &file.tree.items {
        match item {
            TopLevelItem::Namespace(ns) => {
                if seen_using_or_decl {
                    file.diagnostics.report(ErrorCode::NamespaceMustComeBeforeUsingsAndDeclarations, ns.span);
                } else if namespace.is_some() {
                    file.diagnostics.report(ErrorCode::MulitpleNamespaces, ns.span);
                } else {
                    namespace = Some(ns.namespace.clone());
                }
            }
            TopLevelItem::Using(using) => {
                seen_using_or_decl = true;
                if seen_decl {
                    file.diagnostics.report(ErrorCode::UsingsMustComeBeforeDeclarations, using.span);
                } else if usings.contains(&using.namespace) {
                    file.diagnostics.report(ErrorCode::DuplicateUsingDirective, using.span);
                } else {
                    usings.push(using.namespace.clone());
                }
            }
            TopLevelItem::Type(decl) => {
                seen_using_or_decl = true;
                seen_decl = true;
                declared.push(gather_type(file, table, namespace.as_deref().unwrap_or(""), decl));
            }
        }
    }

    let namespace_name = namespace.unwrap_or_default();
    // The file's own namespace is the first implicit using (GLOSSARY).
    let mut all_usings = Vec::with_capacity(usings.len() + 1);
    all_usings.push(namespace_name.clone());
    all_usings.extend(usings);

    let _ = file.namespace_name.set(namespace_name);
    let _ = file.using_directives.set(all_usings);
    let _ = file.declared_types.set(declared);
}

fn gather_type(file: &SourceFile, table: &TypeTable, namespace: &str, decl: &TypeDeclSyntax) -> Arc<TypeInfo> {
    let arity = decl.generic_parameters.len();
    let fqn = alchemy_syntax::naming::make_fully_qualified_name(namespace, &decl.name, arity);

    let (visibility, mut flags) = process_type_modifiers(file, &decl.modifiers);
    if arity > 0 {
        flags |= TypeInfoFlags::IS_GENERIC_TYPE_DEFINITION;
    }

    let generic_arguments = decl
        .generic_parameters
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let arg_fqn = alchemy_syntax::naming::make_generic_arg_name(&fqn, &param.name, index);
            let arg = Arc::new(TypeInfo {
                type_class: TypeClass::GenericArgument,
                flags: TypeInfoFlags::IS_GENERIC_ARGUMENT_DEFINITION,
                visibility,
                built_in_type_name: None,
                fully_qualified_name: arg_fqn,
                generic_arg_simple_name: Some(param.name.clone()),
                declaring_file: Some(file.file),
                syntax_node: None,
                span: param.span,
                base_types: OnceLock::new(),
                fields: OnceLock::new(),
                methods: OnceLock::new(),
                properties: OnceLock::new(),
                indexers: OnceLock::new(),
                constructors: OnceLock::new(),
                generic_arguments: Vec::new(),
                constraints: OnceLock::new(),
            });
            let _ = arg.base_types.set(Vec::new());
            let _ = arg.fields.set(Vec::new());
            let _ = arg.methods.set(Vec::new());
            let _ = arg.properties.set(Vec::new());
            let _ = arg.indexers.set(Vec::new());
            let _ = arg.constructors.set(Vec::new());
            let _ = arg.constraints.set(Vec::new());
            table.add_locked(arg.clone());
            alchemy_syntax::ResolvedType::new(arg)
        })
        .collect();

    let type_class = match decl.type_class {
        TypeClassSyntax::Class => TypeClass::Class,
        TypeClassSyntax::Struct => TypeClass::Struct,
        TypeClassSyntax::Interface => TypeClass::Interface,
        TypeClassSyntax::Enum => TypeClass::Enum,
        TypeClassSyntax::Delegate => TypeClass::Delegate,
        TypeClassSyntax::Widget => TypeClass::Widget,
    };

    let shell = Arc::new(TypeInfo {
        type_class,
        flags,
        visibility,
        built_in_type_name: None,
        fully_qualified_name: fqn,
        generic_arg_simple_name: None,
        declaring_file: Some(file.file),
        syntax_node: Some(decl.node),
        span: decl.span,
        base_types: OnceLock::new(),
        fields: OnceLock::new(),
        methods: OnceLock::new(),
        properties: OnceLock::new(),
        indexers: OnceLock::new(),
        constructors: OnceLock::new(),
        generic_arguments,
        constraints: OnceLock::new(),
    });

    if !table.add_locked(shell.clone()) {
        file.diagnostics.report(ErrorCode::DuplicateIdentifierInScope, decl.span);
    }
    shell
}

/// Processes visibility/sealed/abstract/ref/protected modifiers for a type
/// declaration (§4.5 step 4).
fn process_type_modifiers(file: &SourceFile, modifiers: &[ModifierToken]) -> (Visibility, TypeInfoFlags) {
    let mut visibility = Visibility::Public;
    let mut visibility_set = false;
    let mut flags = TypeInfoFlags::empty();
    let mut sealed = false;
    let mut abstract_ = false;

    for modifier in modifiers {
        match modifier.keyword {
            TokenKind::Public | TokenKind::Private | TokenKind::Internal | TokenKind::Export => {
                if visibility_set {
                    file.diagnostics.report(ErrorCode::MulitpleVisibiltyDeclarations, modifier.span);
                }
                visibility = match modifier.keyword {
                    TokenKind::Public => Visibility::Public,
                    TokenKind::Private => Visibility::Private,
                    TokenKind::Internal => Visibility::Internal,
                    TokenKind::Export => Visibility::Export,
                    _ => unreachable!(),
                };
                visibility_set = true;
            }
            TokenKind::Sealed => {
                sealed = true;
                flags |= TypeInfoFlags::SEALED;
            }
            TokenKind::Abstract => {
                abstract_ = true;
                flags |= TypeInfoFlags::ABSTRACT;
            }
            TokenKind::Ref => file.diagnostics.report(ErrorCode::TypeCannotBeRef, modifier.span),
            TokenKind::Protected => file.diagnostics.report(ErrorCode::TypeCannotBeProtected, modifier.span),
            _ => {}
        }
        if sealed && abstract_ {
            file.diagnostics.report(ErrorCode::SealedOrAbstract, modifier.span);
        }
    }

    (visibility, flags)
}
