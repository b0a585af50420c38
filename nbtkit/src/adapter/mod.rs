//! The adapter traits the engine is built from, their factories, and the
//! built-in adapter implementations.

pub mod array;
pub mod collection;
pub mod enums;
pub mod map;
pub mod object;
pub mod primitive;
pub mod resolver;

use std::any::Any;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::descriptor::{Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::Result;
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

pub use array::ArrayAdapterFactory;
pub use collection::CollectionAdapterFactory;
pub use enums::EnumAdapterFactory;
pub use map::MapAdapterFactory;
pub use primitive::PrimitiveAdapterFactory;

pub use crate::value::DynamicAdapterFactory;

/// Encodes values of `T` as a token stream on an [`NbtWriter`].
pub trait TypeSerializer<T>: Send + Sync {
    fn write(&self, value: &T, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()>;

    /// The outermost [`TagKind`] this serializer produces, when that is
    /// data-independent. Sequence adapters use it to type empty lists.
    fn kind(&self) -> Option<TagKind> {
        None
    }
}

/// Decodes values of `T` from the token stream of an [`NbtReader`].
pub trait TypeDeserializer<T>: Send + Sync {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<T>;
}

/// Both directions in one object.
pub trait TypeAdapter<T>: TypeSerializer<T> + TypeDeserializer<T> {}

impl<T, A: TypeSerializer<T> + TypeDeserializer<T>> TypeAdapter<T> for A {}

/// Produces fresh, usable instances of `T` for the reflective decoder.
/// Any `Fn() -> T` qualifies.
pub trait InstanceCreator<T>: Send + Sync {
    fn create_instance(&self) -> Result<T>;
}

impl<T, F: Fn() -> T + Send + Sync> InstanceCreator<T> for F {
    fn create_instance(&self) -> Result<T> {
        Ok(self())
    }
}

/// Constructor hook for adapter types pinned to a field or type with
/// `#[nbt(with = "...")]` and friends. The engine handle allows the pinned
/// adapter to resolve adapters for the types it composes over.
pub trait AdapterPin: Sized {
    fn instantiate(kit: &NbtKit) -> Result<Self>;
}

/// Builds serializers for descriptors it recognizes; returns `None` to let
/// the next factory try. Later-registered factories win.
pub trait SerializerFactory: Send + Sync {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>>;
}

/// Builds deserializers for descriptors it recognizes.
pub trait DeserializerFactory: Send + Sync {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>>;
}

/// Builds instance creators for descriptors it recognizes.
pub trait InstanceCreatorFactory: Send + Sync {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedCreator>>;
}

// ---------------------------------------------------------------------------
// Type-erased adapter handles.
//
// The caches map descriptors to these; the generic entry points downcast
// them back. A handle built for `T` only downcasts to `T`, so a factory
// that erases the wrong type is caught at lookup time.

struct SerSlot<T: 'static>(Arc<dyn TypeSerializer<T>>);
struct DeSlot<T: 'static>(Arc<dyn TypeDeserializer<T>>);
struct CreatorSlot<T: 'static>(Arc<dyn InstanceCreator<T>>);

/// A serializer with its value type erased.
#[derive(Clone)]
pub struct ErasedSerializer {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedSerializer {
    pub fn new<T: 'static>(adapter: Arc<dyn TypeSerializer<T>>) -> Self {
        Self {
            inner: Arc::new(SerSlot(adapter)),
        }
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn TypeSerializer<T>>> {
        self.inner
            .downcast_ref::<SerSlot<T>>()
            .map(|slot| slot.0.clone())
    }
}

/// A deserializer with its value type erased.
#[derive(Clone)]
pub struct ErasedDeserializer {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedDeserializer {
    pub fn new<T: 'static>(adapter: Arc<dyn TypeDeserializer<T>>) -> Self {
        Self {
            inner: Arc::new(DeSlot(adapter)),
        }
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn TypeDeserializer<T>>> {
        self.inner
            .downcast_ref::<DeSlot<T>>()
            .map(|slot| slot.0.clone())
    }
}

/// An instance creator with its value type erased.
#[derive(Clone)]
pub struct ErasedCreator {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedCreator {
    pub fn new<T: 'static>(creator: Arc<dyn InstanceCreator<T>>) -> Self {
        Self {
            inner: Arc::new(CreatorSlot(creator)),
        }
    }

    pub(crate) fn get<T: 'static>(&self) -> Option<Arc<dyn InstanceCreator<T>>> {
        self.inner
            .downcast_ref::<CreatorSlot<T>>()
            .map(|slot| slot.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Box<T> delegates to T's adapters.

struct BoxSerializer<T>(Arc<dyn TypeSerializer<T>>);

impl<T: 'static> TypeSerializer<Box<T>> for BoxSerializer<T> {
    fn write(&self, value: &Box<T>, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        self.0.write(value, writer)
    }

    fn kind(&self) -> Option<TagKind> {
        self.0.kind()
    }
}

struct BoxDeserializer<T>(Arc<dyn TypeDeserializer<T>>);

impl<T: 'static> TypeDeserializer<Box<T>> for BoxDeserializer<T> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<Box<T>> {
        Ok(Box::new(self.0.read(reader)?))
    }
}

impl<T: Described> Described for Box<T> {
    fn descriptor() -> TypeDesc {
        TypeDesc::new::<Box<T>>(T::descriptor().kind().clone())
            .with_serializer(|kit| {
                Ok(ErasedSerializer::new::<Box<T>>(Arc::new(BoxSerializer(
                    kit.serializer::<T>()?,
                ))))
            })
            .with_deserializer(|kit| {
                Ok(ErasedDeserializer::new::<Box<T>>(Arc::new(
                    BoxDeserializer(kit.deserializer::<T>()?),
                )))
            })
    }
}
