//! The NBT array types and their adapters.
//!
//! `Vec<i8>` is a List of Byte on the wire; to get the dedicated
//! ByteArray/IntArray/LongArray kinds, use these newtypes. Reading is
//! forgiving: any of the three array kinds converts into any of the
//! newtypes with element casts, and a List of a matching numeric kind is
//! accepted as well.

use std::io::{Read, Write};
use std::ops::Deref;
use std::sync::Arc;

use crate::adapter::{
    primitive, DeserializerFactory, ErasedDeserializer, ErasedSerializer, SerializerFactory,
    TypeDeserializer, TypeSerializer,
};
use crate::descriptor::{DescKind, Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::Result;
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// Builds the adapters for the three array newtypes.
pub struct ArrayAdapterFactory;

impl SerializerFactory for ArrayAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::ByteArray | DescKind::IntArray | DescKind::LongArray => {
                desc.new_serializer(kit)
            }
            _ => None,
        }
    }
}

impl DeserializerFactory for ArrayAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::ByteArray | DescKind::IntArray | DescKind::LongArray => {
                desc.new_deserializer(kit)
            }
            _ => None,
        }
    }
}

macro_rules! nbt_array {
    (
        $(#[$doc:meta])*
        $name:ident, $elem:ty, $desc_kind:ident, $tag:ident,
        $adapter:ident, $write_value:ident, $next_any:ident, $read_elem:path
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            data: Vec<$elem>,
        }

        impl $name {
            pub fn new(data: Vec<$elem>) -> Self {
                Self { data }
            }

            pub fn into_inner(self) -> Vec<$elem> {
                self.data
            }
        }

        impl Deref for $name {
            type Target = Vec<$elem>;

            fn deref(&self) -> &Self::Target {
                &self.data
            }
        }

        impl From<Vec<$elem>> for $name {
            fn from(data: Vec<$elem>) -> Self {
                Self::new(data)
            }
        }

        impl Described for $name {
            fn descriptor() -> TypeDesc {
                TypeDesc::new::<$name>(DescKind::$desc_kind)
                    .with_serializer(|_| {
                        Ok(ErasedSerializer::new::<$name>(Arc::new($adapter)))
                    })
                    .with_deserializer(|_| {
                        Ok(ErasedDeserializer::new::<$name>(Arc::new($adapter)))
                    })
            }
        }

        struct $adapter;

        impl TypeSerializer<$name> for $adapter {
            fn write(
                &self,
                value: &$name,
                writer: &mut NbtWriter<&mut dyn Write>,
            ) -> Result<()> {
                writer.$write_value(&value.data)
            }

            fn kind(&self) -> Option<TagKind> {
                Some(TagKind::$tag)
            }
        }

        impl TypeDeserializer<$name> for $adapter {
            fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<$name> {
                if reader.peek()? == TagKind::List {
                    // old data sometimes stores arrays as plain lists
                    let mut data = Vec::with_capacity(reader.begin_list()?);
                    while reader.has_next()? {
                        data.push($read_elem(reader)?);
                    }
                    reader.end_list()?;
                    return Ok($name::new(data));
                }
                Ok($name::new(reader.$next_any()?))
            }
        }
    };
}

nbt_array!(
    /// An NBT ByteArray: a length-prefixed run of i8.
    ByteArray, i8, ByteArray, ByteArray,
    ByteArrayAdapter, value_byte_array, next_array_as_i8, primitive::read_i8
);

nbt_array!(
    /// An NBT IntArray: a length-prefixed run of big-endian i32.
    IntArray, i32, IntArray, IntArray,
    IntArrayAdapter, value_int_array, next_array_as_i32, primitive::read_i32
);

nbt_array!(
    /// An NBT LongArray: a length-prefixed run of big-endian i64.
    LongArray, i64, LongArray, LongArray,
    LongArrayAdapter, value_long_array, next_array_as_i64, primitive::read_i64
);
