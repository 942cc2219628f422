//! Shared type-system entities for the Alchemy semantic-analysis pipeline:
//! the `TypeTable` directory, `TypeInfo` and its member records, and
//! fully-qualified naming.

pub mod naming;
pub mod type_table;
pub mod types;

pub use type_table::TypeTable;
pub use types::{
    BuiltInTypeName, ConstructorInfo, FieldInfo, FieldModifier, IndexerInfo, MethodInfo, MethodModifier, ParameterInfo, ParameterModifier,
    PropertyInfo, ResolvedType, ResolvedTypeFlags, TypeClass, TypeInfo, TypeInfoFlags, Visibility,
};
