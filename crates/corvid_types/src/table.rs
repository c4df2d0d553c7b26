//! The type table: an interning store for [`Type`] values, keyed by
//! structural equality so that, e.g., two `*i32` pointer types anywhere in
//! a program share one [`TypeId`].

use std::collections::HashMap;

use corvid_ast::TypeId;
use corvid_base::Symbol;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    pub fn is_signed(self) -> bool {
        matches!(self, IntKind::I8 | IntKind::I16 | IntKind::I32 | IntKind::I64)
    }

    /// Wider types sort later; used to pick the promotion target between
    /// two integer types in the same signedness category.
    pub fn width_rank(self) -> u8 {
        match self {
            IntKind::I8 | IntKind::U8 => 0,
            IntKind::I16 | IntKind::U16 => 1,
            IntKind::I32 | IntKind::U32 => 2,
            IntKind::I64 | IntKind::U64 => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructField {
    pub name: Symbol,
    pub ty: TypeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumVariant {
    pub name: Symbol,
    pub payload: Vec<TypeId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: Symbol,
    pub params: Vec<TypeId>,
    pub ret: TypeId,
}

/// A fully resolved Corvid type.
///
/// `Struct`/`Enum`/`Interface` carry their own name so two distinct
/// nominal declarations with identical structure still intern to distinct
/// `TypeId`s; everything else is interned purely structurally.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Error,
    Void,
    Bool,
    Int(IntKind),
    Float(FloatKind),
    Str,
    Char,
    Pointer(TypeId),
    Slice(TypeId),
    Array(TypeId, u64),
    Channel(TypeId),
    Function { params: Vec<TypeId>, ret: TypeId },
    Struct { name: Symbol, fields: Vec<StructField> },
    Enum { name: Symbol, variants: Vec<EnumVariant> },
    Interface { name: Symbol, methods: Vec<MethodSignature> },
    /// A fixed-arity value group with no nominal identity, produced by
    /// multi-value forms such as the closed-aware channel receive
    /// (`element, bool`).
    Tuple(Vec<TypeId>),
    /// A `type Name = Target` alias. Kept as its own `TypeId` (rather than
    /// collapsed to `Target`) so diagnostics can name the alias the user
    /// wrote.
    Alias { name: Symbol, target: TypeId },
}

/// The checker's type interning table, plus the fixed built-in types every
/// program starts with.
pub struct TypeTable {
    types: Vec<Type>,
    index: HashMap<Type, TypeId>,
}

impl TypeTable {
    pub const ERROR: TypeId = TypeId(0);
    pub const VOID: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const I8: TypeId = TypeId(3);
    pub const I16: TypeId = TypeId(4);
    pub const I32: TypeId = TypeId(5);
    pub const I64: TypeId = TypeId(6);
    pub const U8: TypeId = TypeId(7);
    pub const U16: TypeId = TypeId(8);
    pub const U32: TypeId = TypeId(9);
    pub const U64: TypeId = TypeId(10);
    pub const F32: TypeId = TypeId(11);
    pub const F64: TypeId = TypeId(12);
    pub const STR: TypeId = TypeId(13);
    pub const CHAR: TypeId = TypeId(14);

    pub fn new() -> Self {
        let mut table = Self { types: Vec::new(), index: HashMap::new() };
        let builtins = [
            Type::Error,
            Type::Void,
            Type::Bool,
            Type::Int(IntKind::I8),
            Type::Int(IntKind::I16),
            Type::Int(IntKind::I32),
            Type::Int(IntKind::I64),
            Type::Int(IntKind::U8),
            Type::Int(IntKind::U16),
            Type::Int(IntKind::U32),
            Type::Int(IntKind::U64),
            Type::Float(FloatKind::F32),
            Type::Float(FloatKind::F64),
            Type::Str,
            Type::Char,
        ];
        for ty in builtins {
            table.intern(ty);
        }
        table
    }

    /// Interns `ty`, returning its existing `TypeId` if an identical type
    /// was already registered.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(&id) = self.index.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.index.insert(ty.clone(), id);
        self.types.push(ty);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn is_numeric(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int(_) | Type::Float(_))
    }

    pub fn is_integer(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int(_))
    }

    /// Comparable types support `==`/`!=`: numerics, bool, string, char,
    /// and pointers by identity. Structs/enums/interfaces are not
    /// comparable at this layer (the checker may special-case field-wise
    /// comparison later; this predicate covers only the built-in rule).
    pub fn is_comparable(&self, id: TypeId) -> bool {
        matches!(
            self.get(id),
            Type::Int(_) | Type::Float(_) | Type::Bool | Type::Str | Type::Char | Type::Pointer(_)
        )
    }

    /// Types usable as a `switch`/`select` discriminant or array length:
    /// integers, bool, string, char, and enums.
    pub fn is_ordinal_like(&self, id: TypeId) -> bool {
        matches!(self.get(id), Type::Int(_) | Type::Bool | Type::Str | Type::Char | Type::Enum { .. })
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_preregistered_and_stable() {
        let table = TypeTable::new();
        assert_eq!(table.get(TypeTable::I32), &Type::Int(IntKind::I32));
        assert_eq!(table.get(TypeTable::BOOL), &Type::Bool);
        assert_eq!(table.get(TypeTable::ERROR), &Type::Error);
    }

    #[test]
    fn structural_types_dedup() {
        let mut table = TypeTable::new();
        let a = table.intern(Type::Pointer(TypeTable::I32));
        let b = table.intern(Type::Pointer(TypeTable::I32));
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_struct_names_do_not_dedup() {
        let mut interner = corvid_base::Interner::new();
        let foo = interner.intern("Foo");
        let bar = interner.intern("Bar");
        let mut table = TypeTable::new();
        let a = table.intern(Type::Struct { name: foo, fields: vec![] });
        let b = table.intern(Type::Struct { name: bar, fields: vec![] });
        assert_ne!(a, b);
    }

    #[test]
    fn numeric_and_comparable_predicates() {
        let table = TypeTable::new();
        assert!(table.is_numeric(TypeTable::I32));
        assert!(table.is_numeric(TypeTable::F64));
        assert!(!table.is_numeric(TypeTable::STR));
        assert!(table.is_comparable(TypeTable::STR));
        assert!(!table.is_comparable(TypeTable::VOID));
    }
}
