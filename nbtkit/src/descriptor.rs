//! Runtime type descriptors, the keys of the engine's adapter registry.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::adapter::{ErasedDeserializer, ErasedSerializer};
use crate::engine::NbtKit;
use crate::error::Result;

/// A type that can describe itself to the engine.
///
/// Implementations exist for the scalar types, `String`, the NBT array
/// newtypes, the common containers, `Box<T>` and [`Value`](crate::Value);
/// user types get one from [`derive(Nbt)`](crate::Nbt).
pub trait Described: 'static {
    fn descriptor() -> TypeDesc;
}

/// The scalar classification used by [`DescKind::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Char,
}

/// What shape of data a descriptor's type holds. Built-in adapter factories
/// dispatch on this.
#[derive(Clone)]
pub enum DescKind {
    Scalar(ScalarKind),
    Text,
    ByteArray,
    IntArray,
    LongArray,
    /// An ordered collection. `element` is a lazy thunk so that
    /// self-referential types can produce a descriptor at all.
    Sequence { element: fn() -> TypeDesc },
    Mapping {
        key: fn() -> TypeDesc,
        value: fn() -> TypeDesc,
    },
    /// A user struct handled by the reflective structure adapter.
    Structure,
    Enumeration { names: &'static [&'static str] },
    /// The dynamic [`Value`](crate::Value) tree.
    Dynamic,
    /// No structural information; only registered adapters apply.
    Opaque,
}

impl fmt::Debug for DescKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DescKind::Scalar(s) => return write!(f, "Scalar({s:?})"),
            DescKind::Text => "Text",
            DescKind::ByteArray => "ByteArray",
            DescKind::IntArray => "IntArray",
            DescKind::LongArray => "LongArray",
            DescKind::Sequence { .. } => "Sequence",
            DescKind::Mapping { .. } => "Mapping",
            DescKind::Structure => "Structure",
            DescKind::Enumeration { .. } => "Enumeration",
            DescKind::Dynamic => "Dynamic",
            DescKind::Opaque => "Opaque",
        };
        f.write_str(name)
    }
}

type BuildSerializer = fn(&NbtKit) -> Result<ErasedSerializer>;
type BuildDeserializer = fn(&NbtKit) -> Result<ErasedDeserializer>;

/// A reified concrete type: the engine's cache key and the carrier of the
/// monomorphized adapter constructors for that type.
///
/// Equality and hashing go by the underlying [`TypeId`]; the compiler has
/// already substituted all type parameters, so `Vec<i32>` and `Vec<String>`
/// are distinct descriptors.
#[derive(Clone)]
pub struct TypeDesc {
    id: TypeId,
    name: &'static str,
    kind: DescKind,
    build_ser: Option<BuildSerializer>,
    build_de: Option<BuildDeserializer>,
}

impl TypeDesc {
    /// Descriptor for `T` with the given structural classification and no
    /// adapter constructors. Chain [`with_serializer`](Self::with_serializer)
    /// and [`with_deserializer`](Self::with_deserializer) to attach them.
    pub fn new<T: 'static>(kind: DescKind) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            kind,
            build_ser: None,
            build_de: None,
        }
    }

    /// Shorthand for `T::descriptor()`.
    pub fn of<T: Described>() -> Self {
        T::descriptor()
    }

    pub fn with_serializer(mut self, build: BuildSerializer) -> Self {
        self.build_ser = Some(build);
        self
    }

    pub fn with_deserializer(mut self, build: BuildDeserializer) -> Self {
        self.build_de = Some(build);
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> &DescKind {
        &self.kind
    }

    /// Element descriptor of a sequence type.
    pub fn element(&self) -> Option<TypeDesc> {
        match self.kind {
            DescKind::Sequence { element } => Some(element()),
            _ => None,
        }
    }

    /// Key descriptor of a mapping type.
    pub fn key(&self) -> Option<TypeDesc> {
        match self.kind {
            DescKind::Mapping { key, .. } => Some(key()),
            _ => None,
        }
    }

    /// Value descriptor of a mapping type.
    pub fn mapped_value(&self) -> Option<TypeDesc> {
        match self.kind {
            DescKind::Mapping { value, .. } => Some(value()),
            _ => None,
        }
    }

    pub(crate) fn new_serializer(&self, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        self.build_ser.map(|build| build(kit))
    }

    pub(crate) fn new_deserializer(&self, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        self.build_de.map(|build| build(kit))
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDesc {}

impl Hash for TypeDesc {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
