use alchemy_data::{FileId, Span, TokenKind};
use serde::{Deserialize, Serialize};

/// A reference into the parse tree. Parsing and tree storage are out of
/// scope here; a syntax node is identified by its span plus an index the
/// upstream front-end assigns, so semantic passes can report precise
/// locations without owning the tree themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNodeId(pub u32);

/// A modifier keyword attached to a declaration, carrying the span it
/// appeared at so duplicate/conflicting-modifier diagnostics can point at it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ModifierToken {
    pub keyword: TokenKind,
    pub span: Span,
}

/// The surface syntax for a type reference, before resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TypeSyntax {
    /// A built-in keyword type, e.g. `int`, `float4`, `object`.
    Predefined { keyword: TokenKind, span: Span },
    /// A bare identifier, e.g. `Foo`.
    IdentifierName { name: String, span: Span },
    /// A generic reference, e.g. `Box<int>`.
    GenericName { name: String, arguments: Vec<TypeSyntax>, span: Span },
    /// `T?`
    Nullable { inner: Box<TypeSyntax>, span: Span },
    /// `ref T`
    Ref { inner: Box<TypeSyntax>, span: Span },
    /// `(T, U, ...)` — reserved, not yet implemented.
    Tuple { elements: Vec<TypeSyntax>, span: Span },
    /// `A::B` — reserved, not yet implemented.
    Qualified { left: Box<TypeSyntax>, right: String, span: Span },
}

impl TypeSyntax {
    pub fn span(&self) -> Span {
        match self {
            TypeSyntax::Predefined { span, .. }
            | TypeSyntax::IdentifierName { span, .. }
            | TypeSyntax::GenericName { span, .. }
            | TypeSyntax::Nullable { span, .. }
            | TypeSyntax::Ref { span, .. }
            | TypeSyntax::Tuple { span, .. }
            | TypeSyntax::Qualified { span, .. } => *span,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSyntax {
    pub name: String,
    pub type_syntax: TypeSyntax,
    pub modifiers: Vec<ModifierToken>,
    pub has_default_value: bool,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VariableDeclaratorSyntax {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldSyntax {
    pub type_syntax: TypeSyntax,
    pub declarators: Vec<VariableDeclaratorSyntax>,
    pub modifiers: Vec<ModifierToken>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MethodSyntax {
    pub name: String,
    pub return_type: TypeSyntax,
    pub parameters: Vec<ParameterSyntax>,
    pub modifiers: Vec<ModifierToken>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PropertySyntax {
    pub name: String,
    pub type_syntax: TypeSyntax,
    pub modifiers: Vec<ModifierToken>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexerSyntax {
    pub type_syntax: TypeSyntax,
    pub parameters: Vec<ParameterSyntax>,
    pub modifiers: Vec<ModifierToken>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConstructorSyntax {
    pub parameters: Vec<ParameterSyntax>,
    pub modifiers: Vec<ModifierToken>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeClassSyntax {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Widget,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenericParameterSyntax {
    pub name: String,
    pub span: Span,
}

/// A top-level or nested type declaration, as written by the user.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypeDeclSyntax {
    pub type_class: TypeClassSyntax,
    pub name: String,
    pub modifiers: Vec<ModifierToken>,
    pub generic_parameters: Vec<GenericParameterSyntax>,
    pub base_list: Vec<TypeSyntax>,
    pub fields: Vec<FieldSyntax>,
    pub methods: Vec<MethodSyntax>,
    pub properties: Vec<PropertySyntax>,
    pub indexers: Vec<IndexerSyntax>,
    pub constructors: Vec<ConstructorSyntax>,
    pub span: Span,
    pub node: SyntaxNodeId,
}

/// One using directive, e.g. `using N::M;`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UsingDirectiveSyntax {
    pub namespace: String,
    pub span: Span,
}

/// One namespace declaration, e.g. `namespace N::M;`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NamespaceDeclSyntax {
    pub namespace: String,
    pub span: Span,
}

/// A top-level item in source declaration order. Keeping these in one
/// undifferentiated, ordered sequence (rather than three pre-split lists)
/// is what lets GatherJob detect ordering violations between the namespace
/// declaration, using directives, and type declarations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TopLevelItem {
    Namespace(NamespaceDeclSyntax),
    Using(UsingDirectiveSyntax),
    Type(TypeDeclSyntax),
}

/// The parsed form of one source file, as handed to the semantic layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub file: FileId,
    pub items: Vec<TopLevelItem>,
}
