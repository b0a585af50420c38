//! The enumeration adapter.
//!
//! Enums serialize as a String of their symbolic name. Reading accepts the
//! name (exact match) or any integer kind as an index into the declaration
//! order; anything else is [`Error::InvalidEnumValue`].

use std::any::type_name;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::adapter::{
    DeserializerFactory, ErasedDeserializer, ErasedSerializer, SerializerFactory,
    TypeDeserializer, TypeSerializer,
};
use crate::descriptor::{DescKind, TypeDesc};
use crate::engine::NbtKit;
use crate::error::{Error, Result};
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// A fieldless enum with name and declaration-order tables, as generated
/// by [`derive(Nbt)`](crate::Nbt).
pub trait NbtEnum: Sized + 'static {
    /// Variant names in declaration order.
    const NAMES: &'static [&'static str];

    fn from_name(name: &str) -> Option<Self>;

    fn from_index(index: usize) -> Option<Self>;

    fn name(&self) -> &'static str;
}

/// Builds the adapters for descriptors classified as enumerations.
pub struct EnumAdapterFactory;

impl SerializerFactory for EnumAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::Enumeration { .. } => desc.new_serializer(kit),
            _ => None,
        }
    }
}

impl DeserializerFactory for EnumAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::Enumeration { .. } => desc.new_deserializer(kit),
            _ => None,
        }
    }
}

struct EnumAdapter<E>(PhantomData<fn() -> E>);

impl<E: NbtEnum> TypeSerializer<E> for EnumAdapter<E> {
    fn write(&self, value: &E, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        writer.value_str(value.name())
    }

    fn kind(&self) -> Option<TagKind> {
        Some(TagKind::String)
    }
}

impl<E: NbtEnum> TypeDeserializer<E> for EnumAdapter<E> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<E> {
        match reader.peek()? {
            TagKind::String => {
                let name = reader.next_string()?;
                E::from_name(&name).ok_or_else(|| invalid::<E>(name))
            }
            TagKind::Byte => from_ordinal(reader.next_i8()? as i64),
            TagKind::Short => from_ordinal(reader.next_i16()? as i64),
            TagKind::Int => from_ordinal(reader.next_i32()? as i64),
            TagKind::Long => from_ordinal(reader.next_i64()?),
            found => Err(Error::UnexpectedKind {
                expected: TagKind::String,
                found,
                path: reader.path(),
            }),
        }
    }
}

fn from_ordinal<E: NbtEnum>(ordinal: i64) -> Result<E> {
    usize::try_from(ordinal)
        .ok()
        .and_then(E::from_index)
        .ok_or_else(|| invalid::<E>(ordinal.to_string()))
}

fn invalid<E>(value: impl Into<String>) -> Error {
    Error::InvalidEnumValue {
        enum_type: type_name::<E>(),
        value: value.into(),
    }
}

/// Adapter constructor wired into derived enum descriptors.
pub fn build_enum_serializer<E: NbtEnum>(_kit: &NbtKit) -> Result<ErasedSerializer> {
    Ok(ErasedSerializer::new::<E>(Arc::new(EnumAdapter::<E>(
        PhantomData,
    ))))
}

/// Adapter constructor wired into derived enum descriptors.
pub fn build_enum_deserializer<E: NbtEnum>(_kit: &NbtKit) -> Result<ErasedDeserializer> {
    Ok(ErasedDeserializer::new::<E>(Arc::new(EnumAdapter::<E>(
        PhantomData,
    ))))
}

/// Key bridge for enum-keyed maps, used by derived [`MapKey`]
/// (crate::MapKey) impls.
pub fn enum_key_from_name<E: NbtEnum>(name: &str) -> Result<E> {
    E::from_name(name).ok_or_else(|| invalid::<E>(name))
}
