use std::sync::{Arc, OnceLock};

use alchemy_ast::SyntaxNodeId;
use alchemy_data::{FileId, Span, TokenKind};
use bitflags::bitflags;

use crate::naming;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeClass {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    Widget,
    GenericArgument,
    Unresolved,
    Void,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct TypeInfoFlags: u32 {
        const IS_GENERIC_ARGUMENT_DEFINITION = 1 << 0;
        const IS_GENERIC_TYPE_DEFINITION      = 1 << 1;
        const IS_NULLABLE                     = 1 << 2;
        const SEALED                          = 1 << 3;
        const ABSTRACT                        = 1 << 4;
        const IS_PRIMITIVE                    = 1 << 5;
        const INSTANTIATED_GENERIC            = 1 << 6;
        const REQUIRES_INIT_CONSTRUCTOR       = 1 << 7;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Internal,
    Export,
}

/// The closed set of built-in types, eagerly materialized before any job runs.
/// C#-style aliases collapse onto the same representation the original's
/// `BuiltInTypeName` enum uses: `Short`=Int16, `Int`=Int32, `Long`=Int64,
/// `Ushort`=UInt16, `Ulong`=UInt64 — `Float`, `Bool`, `Byte`, `Sbyte`, and
/// `Uint` are themselves the canonical display names, not aliases onto
/// something else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltInTypeName {
    Int,
    Int2,
    Int3,
    Int4,
    Uint,
    Uint2,
    Uint3,
    Uint4,
    Float,
    Float2,
    Float3,
    Float4,
    Bool,
    Char,
    Color,
    Color32,
    Color64,
    Byte,
    Sbyte,
    Short,
    Ushort,
    Long,
    Ulong,
    Dynamic,
    String,
    Object,
    Double,
    Void,
}

impl BuiltInTypeName {
    pub const ALL: &'static [BuiltInTypeName] = &[
        BuiltInTypeName::Int,
        BuiltInTypeName::Int2,
        BuiltInTypeName::Int3,
        BuiltInTypeName::Int4,
        BuiltInTypeName::Uint,
        BuiltInTypeName::Uint2,
        BuiltInTypeName::Uint3,
        BuiltInTypeName::Uint4,
        BuiltInTypeName::Float,
        BuiltInTypeName::Float2,
        BuiltInTypeName::Float3,
        BuiltInTypeName::Float4,
        BuiltInTypeName::Bool,
        BuiltInTypeName::Char,
        BuiltInTypeName::Color,
        BuiltInTypeName::Color32,
        BuiltInTypeName::Color64,
        BuiltInTypeName::Byte,
        BuiltInTypeName::Sbyte,
        BuiltInTypeName::Short,
        BuiltInTypeName::Ushort,
        BuiltInTypeName::Long,
        BuiltInTypeName::Ulong,
        BuiltInTypeName::Dynamic,
        BuiltInTypeName::String,
        BuiltInTypeName::Object,
        BuiltInTypeName::Double,
        BuiltInTypeName::Void,
    ];

    /// The simple display name, matching the keyword spelling for types that
    /// have one.
    pub const fn display_name(self) -> &'static str {
        match self {
            BuiltInTypeName::Int => "Int32",
            BuiltInTypeName::Int2 => "Int2",
            BuiltInTypeName::Int3 => "Int3",
            BuiltInTypeName::Int4 => "Int4",
            BuiltInTypeName::Uint => "UInt",
            BuiltInTypeName::Uint2 => "UInt2",
            BuiltInTypeName::Uint3 => "UInt3",
            BuiltInTypeName::Uint4 => "UInt4",
            BuiltInTypeName::Float => "Float",
            BuiltInTypeName::Float2 => "Float2",
            BuiltInTypeName::Float3 => "Float3",
            BuiltInTypeName::Float4 => "Float4",
            BuiltInTypeName::Bool => "Bool",
            BuiltInTypeName::Char => "Char",
            BuiltInTypeName::Color => "Color",
            BuiltInTypeName::Color32 => "Color32",
            BuiltInTypeName::Color64 => "Color64",
            BuiltInTypeName::Byte => "Byte",
            BuiltInTypeName::Sbyte => "SByte",
            BuiltInTypeName::Short => "Int16",
            BuiltInTypeName::Ushort => "UInt16",
            BuiltInTypeName::Long => "Int64",
            BuiltInTypeName::Ulong => "UInt64",
            BuiltInTypeName::Dynamic => "Dynamic",
            BuiltInTypeName::String => "String",
            BuiltInTypeName::Object => "Object",
            BuiltInTypeName::Double => "Double",
            BuiltInTypeName::Void => "Void",
        }
    }

    /// `"BuiltIn::" + display_name`, the FQN every pre-built `TypeInfo` is
    /// keyed under in the table. The original C++ source emits a single
    /// colon for `Object` specifically (`"BuiltIn:Object"`); that's treated
    /// here as a source typo, not a behavior to preserve — see DESIGN.md.
    pub fn to_fully_qualified_name(self) -> String {
        format!("BuiltIn::{}", self.display_name())
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            BuiltInTypeName::Bool
                | BuiltInTypeName::Char
                | BuiltInTypeName::Sbyte
                | BuiltInTypeName::Short
                | BuiltInTypeName::Int
                | BuiltInTypeName::Long
                | BuiltInTypeName::Byte
                | BuiltInTypeName::Ushort
                | BuiltInTypeName::Uint
                | BuiltInTypeName::Ulong
                | BuiltInTypeName::Float
                | BuiltInTypeName::Double
        )
    }

    /// Maps a lexical keyword to the built-in it names, or `None` if the
    /// keyword doesn't name a built-in type (e.g. `if`, `class`).
    pub fn from_keyword(keyword: TokenKind) -> Option<BuiltInTypeName> {
        Some(match keyword {
            TokenKind::Int => BuiltInTypeName::Int,
            TokenKind::Int2 => BuiltInTypeName::Int2,
            TokenKind::Int3 => BuiltInTypeName::Int3,
            TokenKind::Int4 => BuiltInTypeName::Int4,
            TokenKind::UInt => BuiltInTypeName::Uint,
            TokenKind::Uint2 => BuiltInTypeName::Uint2,
            TokenKind::Uint3 => BuiltInTypeName::Uint3,
            TokenKind::Uint4 => BuiltInTypeName::Uint4,
            TokenKind::Float => BuiltInTypeName::Float,
            TokenKind::Float2 => BuiltInTypeName::Float2,
            TokenKind::Float3 => BuiltInTypeName::Float3,
            TokenKind::Float4 => BuiltInTypeName::Float4,
            TokenKind::Bool => BuiltInTypeName::Bool,
            TokenKind::Char => BuiltInTypeName::Char,
            TokenKind::Color8 => BuiltInTypeName::Color,
            TokenKind::Color16 => BuiltInTypeName::Color32,
            TokenKind::Color32 => BuiltInTypeName::Color64,
            TokenKind::Byte => BuiltInTypeName::Byte,
            TokenKind::SByte => BuiltInTypeName::Sbyte,
            TokenKind::Short => BuiltInTypeName::Short,
            TokenKind::UShort => BuiltInTypeName::Ushort,
            TokenKind::Long => BuiltInTypeName::Long,
            TokenKind::ULong => BuiltInTypeName::Ulong,
            TokenKind::Dynamic => BuiltInTypeName::Dynamic,
            TokenKind::String => BuiltInTypeName::String,
            TokenKind::Object => BuiltInTypeName::Object,
            TokenKind::Double => BuiltInTypeName::Double,
            TokenKind::Void => BuiltInTypeName::Void,
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldModifier {
    Readonly,
    Static,
    Const,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodModifier {
    Override,
    Sealed,
    Abstract,
    Virtual,
    Static,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterModifier {
    Ref,
    Temp,
    Out,
    Readonly,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct ResolvedTypeFlags: u32 {
        const IS_VOID          = 1 << 0;
        const IS_NULLABLE       = 1 << 1;
        const IS_ARRAY          = 1 << 2;
        const IS_ENUM           = 1 << 3;
        const IS_VECTOR         = 1 << 4;
        const IS_NULL_OR_DEFAULT = 1 << 5;
        const IS_METHOD_GROUP   = 1 << 6;
        const IS_VAR            = 1 << 7;
        const IS_REF            = 1 << 8;
        const IS_TUPLE          = 1 << 9;
        const IS_UNRESOLVED     = 1 << 10;
    }
}

/// A value pair of "which type" and "how it's qualified at this use site".
/// Two `ResolvedType`s are equal iff both the referenced `TypeInfo` (by
/// pointer identity via `Arc::ptr_eq`) and the flags match.
#[derive(Clone)]
pub struct ResolvedType {
    pub type_info: Option<Arc<TypeInfo>>,
    pub flags: ResolvedTypeFlags,
}

impl ResolvedType {
    pub fn new(type_info: Arc<TypeInfo>) -> Self {
        Self { type_info: Some(type_info), flags: ResolvedTypeFlags::empty() }
    }

    pub fn with_flags(type_info: Arc<TypeInfo>, flags: ResolvedTypeFlags) -> Self {
        Self { type_info: Some(type_info), flags }
    }

    pub fn unresolved() -> Self {
        Self { type_info: None, flags: ResolvedTypeFlags::IS_UNRESOLVED }
    }

    pub fn void() -> Self {
        Self { type_info: None, flags: ResolvedTypeFlags::IS_VOID }
    }

    pub fn is_unresolved(&self) -> bool {
        self.flags.contains(ResolvedTypeFlags::IS_UNRESOLVED)
    }

    pub fn with_flag(&self, flag: ResolvedTypeFlags) -> Self {
        Self { type_info: self.type_info.clone(), flags: self.flags | flag }
    }
}

impl PartialEq for ResolvedType {
    fn eq(&self, other: &Self) -> bool {
        let same_type = match (&self.type_info, &other.type_info) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_type && self.flags == other.flags
    }
}

impl Eq for ResolvedType {}

#[derive(Clone)]
pub struct FieldInfo {
    pub field_type: ResolvedType,
    pub name: String,
    pub declaring_type: Arc<TypeInfo>,
    pub node: SyntaxNodeId,
    pub modifiers: Vec<FieldModifier>,
    pub visibility: Visibility,
}

#[derive(Clone)]
pub struct ParameterInfo {
    pub param_type: ResolvedType,
    pub name: String,
    pub modifiers: Vec<ParameterModifier>,
    pub node: SyntaxNodeId,
}

/// One slot of a (possibly default-parameter-overloaded) method. Every
/// overload generated from the same declaration shares the same backing
/// parameter array and differs only in how many of its entries it exposes,
/// the Rust-idiomatic substitute for the original "same array, shrinking
/// exposed count" design.
#[derive(Clone)]
pub struct MethodInfo {
    pub declaring_type: Arc<TypeInfo>,
    pub all_parameters: Arc<[ParameterInfo]>,
    pub parameter_count: usize,
    pub node: SyntaxNodeId,
    pub return_type: ResolvedType,
    pub name: String,
    pub modifiers: Vec<MethodModifier>,
    pub visibility: Visibility,
    pub is_default_parameter_overload: bool,
}

impl MethodInfo {
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.all_parameters[..self.parameter_count]
    }
}

#[derive(Clone)]
pub struct PropertyInfo {
    pub property_type: ResolvedType,
    pub name: String,
    pub declaring_type: Arc<TypeInfo>,
    pub node: SyntaxNodeId,
    pub visibility: Visibility,
}

#[derive(Clone)]
pub struct IndexerInfo {
    pub element_type: ResolvedType,
    pub parameters: Vec<ParameterInfo>,
    pub declaring_type: Arc<TypeInfo>,
    pub node: SyntaxNodeId,
    pub visibility: Visibility,
}

#[derive(Clone)]
pub struct ConstructorInfo {
    pub parameters: Vec<ParameterInfo>,
    pub declaring_type: Arc<TypeInfo>,
    pub node: SyntaxNodeId,
    pub visibility: Visibility,
}

/// The central entity: one resolved or in-progress type. Member arrays are
/// `OnceLock`-guarded: Gather allocates the shell (members unset), Member
/// fills each array exactly once, and Base/Member readers across the phase
/// barrier see a fully-initialized `Vec` with no lock needed on the read
/// path. This is the safe-Rust reading of "written once per phase, read
/// lock-free after the barrier releases."
pub struct TypeInfo {
    pub type_class: TypeClass,
    pub flags: TypeInfoFlags,
    pub visibility: Visibility,
    pub built_in_type_name: Option<BuiltInTypeName>,
    pub fully_qualified_name: String,
    /// The bare parameter name, set only for `IsGenericArgumentDefinition`
    /// entities. A generic argument's FQN is `<declaringFqn>_<argName>[<index>]`
    /// (§3 invariant 5), so slicing past the last `"::"` lands inside the
    /// declaring type's own name instead of recovering `argName` — the
    /// original (`GatherTypeInfo.cpp`) stores the identifier directly rather
    /// than deriving it positionally, and `type_name()` does the same here.
    pub generic_arg_simple_name: Option<String>,
    pub declaring_file: Option<FileId>,
    pub syntax_node: Option<SyntaxNodeId>,
    pub span: Span,

    pub base_types: OnceLock<Vec<ResolvedType>>,
    pub fields: OnceLock<Vec<FieldInfo>>,
    pub methods: OnceLock<Vec<MethodInfo>>,
    pub properties: OnceLock<Vec<PropertyInfo>>,
    pub indexers: OnceLock<Vec<IndexerInfo>>,
    pub constructors: OnceLock<Vec<ConstructorInfo>>,
    pub generic_arguments: Vec<ResolvedType>,
    pub constraints: OnceLock<Vec<ResolvedType>>,
}

impl TypeInfo {
    /// §3 invariant 4, with the §3 invariant 5 special case: a generic
    /// argument definition's simple name is the stored bare parameter name,
    /// not a slice of the FQN (see `generic_arg_simple_name`'s doc comment).
    pub fn type_name(&self) -> &str {
        match &self.generic_arg_simple_name {
            Some(name) => name,
            None => naming::type_name_of(&self.fully_qualified_name),
        }
    }

    pub fn base_types(&self) -> &[ResolvedType] {
        self.base_types.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> &[FieldInfo] {
        self.fields.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn methods(&self) -> &[MethodInfo] {
        self.methods.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        self.properties.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn indexers(&self) -> &[IndexerInfo] {
        self.indexers.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn constructors(&self) -> &[ConstructorInfo] {
        self.constructors.get().map(Vec::as_slice).unwrap_or(&[])
    }

    /// §4.2 `getBaseClass`: the sole class base, if this entity is a class
    /// with at least one base entry that is itself a class.
    pub fn get_base_class(self: &Arc<Self>) -> Option<Arc<TypeInfo>> {
        if self.type_class != TypeClass::Class {
            return None;
        }
        let first = self.base_types().first()?;
        let base = first.type_info.as_ref()?;
        (base.type_class == TypeClass::Class).then(|| base.clone())
    }

    /// §4.2 `gatherFieldInfos`: for a struct, its own fields; for a class,
    /// ancestors' fields (base-first) followed by its own.
    pub fn gather_field_infos(self: &Arc<Self>) -> Vec<FieldInfo> {
        if self.type_class != TypeClass::Class {
            return self.fields().to_vec();
        }
        let mut chain = Vec::new();
        let mut current = Some(self.clone());
        while let Some(t) = current {
            chain.push(t.clone());
            current = t.get_base_class();
        }
        let mut out = Vec::new();
        for t in chain.into_iter().rev() {
            out.extend(t.fields().iter().cloned());
        }
        out
    }

    /// §4.2 `detectClassCycle`: DFS over the class chain, returning the path
    /// (first == last) the first time a node repeats.
    pub fn detect_class_cycle(self: &Arc<Self>) -> Option<Vec<Arc<TypeInfo>>> {
        let mut visited: Vec<Arc<TypeInfo>> = Vec::new();
        let mut current = Some(self.clone());
        while let Some(t) = current {
            if let Some(pos) = visited.iter().position(|v| Arc::ptr_eq(v, &t)) {
                let mut path: Vec<Arc<TypeInfo>> = visited[pos..].to_vec();
                path.push(t);
                return Some(path);
            }
            visited.push(t.clone());
            current = t.get_base_class();
        }
        None
    }
}

impl std::fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeInfo").field("fqn", &self.fully_qualified_name).field("class", &self.type_class).finish()
    }
}
