//! A dynamic NBT tree for data whose structure is not known up front.

use std::io::{Read, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::adapter::{
    DeserializerFactory, ErasedDeserializer, ErasedSerializer, SerializerFactory,
    TypeDeserializer, TypeSerializer,
};
use crate::descriptor::{DescKind, Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::{Error, Result};
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::{ByteArray, IntArray, LongArray, TagKind};

/// Any NBT value, preserving the wire-level kind of every node.
///
/// Compounds keep their insertion order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    ByteArray(ByteArray),
    IntArray(IntArray),
    LongArray(LongArray),
    List(Vec<Value>),
    Compound(IndexMap<String, Value>),
}

impl Value {
    /// The wire kind of this value.
    pub fn kind(&self) -> TagKind {
        match self {
            Value::Byte(_) => TagKind::Byte,
            Value::Short(_) => TagKind::Short,
            Value::Int(_) => TagKind::Int,
            Value::Long(_) => TagKind::Long,
            Value::Float(_) => TagKind::Float,
            Value::Double(_) => TagKind::Double,
            Value::String(_) => TagKind::String,
            Value::ByteArray(_) => TagKind::ByteArray,
            Value::IntArray(_) => TagKind::IntArray,
            Value::LongArray(_) => TagKind::LongArray,
            Value::List(_) => TagKind::List,
            Value::Compound(_) => TagKind::Compound,
        }
    }

    /// Child of a compound, `None` for other kinds or missing names.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Compound(map) => map.get(name),
            _ => None,
        }
    }

    /// The value as an `i64` if it is any integral kind.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(*v as i64),
            Value::Short(v) => Some(*v as i64),
            Value::Int(v) => Some(*v as i64),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an `f64` if it is either floating kind.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_compound(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Compound(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from! {
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    &str => String,
    ByteArray => ByteArray,
    IntArray => IntArray,
    LongArray => LongArray,
    Vec<Value> => List,
    IndexMap<String, Value> => Compound,
}

impl Described for Value {
    fn descriptor() -> TypeDesc {
        TypeDesc::new::<Value>(DescKind::Dynamic)
            .with_serializer(|_| Ok(ErasedSerializer::new::<Value>(Arc::new(DynamicAdapter))))
            .with_deserializer(|_| Ok(ErasedDeserializer::new::<Value>(Arc::new(DynamicAdapter))))
    }
}

/// Builds the [`Value`] adapter.
pub struct DynamicAdapterFactory;

impl SerializerFactory for DynamicAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::Dynamic => desc.new_serializer(kit),
            _ => None,
        }
    }
}

impl DeserializerFactory for DynamicAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::Dynamic => desc.new_deserializer(kit),
            _ => None,
        }
    }
}

struct DynamicAdapter;

impl TypeSerializer<Value> for DynamicAdapter {
    fn write(&self, value: &Value, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        write_value(value, writer)
    }
}

impl TypeDeserializer<Value> for DynamicAdapter {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<Value> {
        read_value(reader)
    }
}

fn read_value(reader: &mut NbtReader<&mut dyn Read>) -> Result<Value> {
    match reader.peek()? {
        TagKind::Compound => {
            let mut map = IndexMap::new();
            reader.begin_compound()?;
            while reader.has_next()? {
                let name = reader.name()?.to_owned();
                map.insert(name, read_value(reader)?);
            }
            reader.end_compound()?;
            Ok(Value::Compound(map))
        }
        TagKind::List => {
            let mut list = Vec::with_capacity(reader.begin_list()?);
            while reader.has_next()? {
                list.push(read_value(reader)?);
            }
            reader.end_list()?;
            Ok(Value::List(list))
        }
        TagKind::String => Ok(Value::String(reader.next_string()?)),
        TagKind::Byte => Ok(Value::Byte(reader.next_i8()?)),
        TagKind::Short => Ok(Value::Short(reader.next_i16()?)),
        TagKind::Int => Ok(Value::Int(reader.next_i32()?)),
        TagKind::Long => Ok(Value::Long(reader.next_i64()?)),
        TagKind::Float => Ok(Value::Float(reader.next_f32()?)),
        TagKind::Double => Ok(Value::Double(reader.next_f64()?)),
        TagKind::ByteArray => Ok(Value::ByteArray(reader.next_byte_array()?.into())),
        TagKind::IntArray => Ok(Value::IntArray(reader.next_int_array()?.into())),
        TagKind::LongArray => Ok(Value::LongArray(reader.next_long_array()?.into())),
        TagKind::End => Err(Error::corrupt(format!(
            "found an unexpected end tag at: {}",
            reader.path()
        ))),
    }
}

fn write_value(value: &Value, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    match value {
        Value::Byte(v) => writer.value_i8(*v),
        Value::Short(v) => writer.value_i16(*v),
        Value::Int(v) => writer.value_i32(*v),
        Value::Long(v) => writer.value_i64(*v),
        Value::Float(v) => writer.value_f32(*v),
        Value::Double(v) => writer.value_f64(*v),
        Value::String(v) => writer.value_str(v),
        Value::ByteArray(v) => writer.value_byte_array(v),
        Value::IntArray(v) => writer.value_int_array(v),
        Value::LongArray(v) => writer.value_long_array(v),
        Value::List(items) => {
            let element_kind = items.first().map(Value::kind).unwrap_or(TagKind::End);
            if let Some(stray) = items.iter().find(|item| item.kind() != element_kind) {
                return Err(Error::corrupt(format!(
                    "list mixes {} and {} values",
                    element_kind,
                    stray.kind()
                )));
            }
            writer.begin_list_of(element_kind, items.len())?;
            for item in items {
                write_value(item, writer)?;
            }
            writer.end_list()
        }
        Value::Compound(map) => {
            writer.begin_compound()?;
            for (name, child) in map {
                writer.name(name)?;
                write_value(child, writer)?;
            }
            writer.end_compound()
        }
    }
}
