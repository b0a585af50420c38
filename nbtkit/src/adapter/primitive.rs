//! Adapters for the scalar types and `String`.
//!
//! Writing uses the fixed kind mapping (bool and i8 are Byte, char and i16
//! are Short, and so on). Reading is lenient the way existing world data
//! demands: any numeric kind converts into any numeric type with a
//! narrowing cast, strings parse into numbers, and numbers format into
//! strings.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::adapter::{
    DeserializerFactory, ErasedDeserializer, ErasedSerializer, SerializerFactory, TypeDeserializer,
    TypeSerializer,
};
use crate::descriptor::{DescKind, Described, ScalarKind, TypeDesc};
use crate::engine::NbtKit;
use crate::error::{Error, Result};
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// Builds the adapters for descriptors classified as scalar or text.
pub struct PrimitiveAdapterFactory;

impl SerializerFactory for PrimitiveAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::Scalar(_) | DescKind::Text => desc.new_serializer(kit),
            _ => None,
        }
    }
}

impl DeserializerFactory for PrimitiveAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::Scalar(_) | DescKind::Text => desc.new_deserializer(kit),
            _ => None,
        }
    }
}

struct ScalarSerializer<T: 'static> {
    kind: TagKind,
    write: fn(&T, &mut NbtWriter<&mut dyn Write>) -> Result<()>,
}

impl<T> TypeSerializer<T> for ScalarSerializer<T> {
    fn write(&self, value: &T, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        (self.write)(value, writer)
    }

    fn kind(&self) -> Option<TagKind> {
        Some(self.kind)
    }
}

struct ScalarDeserializer<T: 'static> {
    read: fn(&mut NbtReader<&mut dyn Read>) -> Result<T>,
}

impl<T> TypeDeserializer<T> for ScalarDeserializer<T> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<T> {
        (self.read)(reader)
    }
}

macro_rules! scalar_described {
    ($ty:ty, $desc_kind:expr, $kind:ident, $read:path, $write:path) => {
        impl Described for $ty {
            fn descriptor() -> TypeDesc {
                TypeDesc::new::<$ty>($desc_kind)
                    .with_serializer(|_| {
                        Ok(ErasedSerializer::new::<$ty>(Arc::new(ScalarSerializer {
                            kind: TagKind::$kind,
                            write: $write,
                        })))
                    })
                    .with_deserializer(|_| {
                        Ok(ErasedDeserializer::new::<$ty>(Arc::new(
                            ScalarDeserializer { read: $read },
                        )))
                    })
            }
        }
    };
}

scalar_described!(bool, DescKind::Scalar(ScalarKind::Bool), Byte, read_bool, write_bool);
scalar_described!(i8, DescKind::Scalar(ScalarKind::Byte), Byte, read_i8, write_i8);
scalar_described!(i16, DescKind::Scalar(ScalarKind::Short), Short, read_i16, write_i16);
scalar_described!(i32, DescKind::Scalar(ScalarKind::Int), Int, read_i32, write_i32);
scalar_described!(i64, DescKind::Scalar(ScalarKind::Long), Long, read_i64, write_i64);
scalar_described!(f32, DescKind::Scalar(ScalarKind::Float), Float, read_f32, write_f32);
scalar_described!(f64, DescKind::Scalar(ScalarKind::Double), Double, read_f64, write_f64);
scalar_described!(char, DescKind::Scalar(ScalarKind::Char), Short, read_char, write_char);
scalar_described!(String, DescKind::Text, String, read_string, write_string);

pub fn write_bool(value: &bool, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i8(if *value { 1 } else { 0 })
}

pub fn write_i8(value: &i8, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i8(*value)
}

pub fn write_i16(value: &i16, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i16(*value)
}

pub fn write_i32(value: &i32, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i32(*value)
}

pub fn write_i64(value: &i64, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i64(*value)
}

pub fn write_f32(value: &f32, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_f32(*value)
}

pub fn write_f64(value: &f64, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_f64(*value)
}

pub fn write_char(value: &char, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_i16(*value as u16 as i16)
}

pub fn write_string(value: &String, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
    writer.value_str(value)
}

/// Any numeric payload, integral or floating.
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn as_i64(&self) -> i64 {
        match self {
            Num::Int(v) => *v,
            Num::Float(v) => *v as i64,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Num::Int(v) => *v as f64,
            Num::Float(v) => *v,
        }
    }
}

/// Read whatever numeric kind is next, also accepting strings that parse
/// as a number. `expected` only shapes the error message.
fn read_number(reader: &mut NbtReader<&mut dyn Read>, expected: TagKind) -> Result<Num> {
    match reader.peek()? {
        TagKind::Byte => Ok(Num::Int(reader.next_i8()? as i64)),
        TagKind::Short => Ok(Num::Int(reader.next_i16()? as i64)),
        TagKind::Int => Ok(Num::Int(reader.next_i32()? as i64)),
        TagKind::Long => Ok(Num::Int(reader.next_i64()?)),
        TagKind::Float => Ok(Num::Float(reader.next_f32()? as f64)),
        TagKind::Double => Ok(Num::Float(reader.next_f64()?)),
        TagKind::String => {
            let text = reader.next_string()?;
            if let Ok(v) = text.parse::<i64>() {
                return Ok(Num::Int(v));
            }
            text.parse::<f64>().map(Num::Float).map_err(|_| {
                Error::corrupt(format!("'{text}' does not parse as a number"))
            })
        }
        found => Err(Error::UnexpectedKind {
            expected,
            found,
            path: reader.path(),
        }),
    }
}

pub fn read_bool(reader: &mut NbtReader<&mut dyn Read>) -> Result<bool> {
    if reader.peek()? == TagKind::String {
        let text = reader.next_string()?;
        return text
            .parse::<bool>()
            .map_err(|_| Error::corrupt(format!("'{text}' does not parse as a bool")));
    }
    Ok(read_number(reader, TagKind::Byte)?.as_i64() != 0)
}

pub fn read_i8(reader: &mut NbtReader<&mut dyn Read>) -> Result<i8> {
    Ok(read_number(reader, TagKind::Byte)?.as_i64() as i8)
}

pub fn read_i16(reader: &mut NbtReader<&mut dyn Read>) -> Result<i16> {
    Ok(read_number(reader, TagKind::Short)?.as_i64() as i16)
}

pub fn read_i32(reader: &mut NbtReader<&mut dyn Read>) -> Result<i32> {
    Ok(read_number(reader, TagKind::Int)?.as_i64() as i32)
}

pub fn read_i64(reader: &mut NbtReader<&mut dyn Read>) -> Result<i64> {
    Ok(read_number(reader, TagKind::Long)?.as_i64())
}

pub fn read_f32(reader: &mut NbtReader<&mut dyn Read>) -> Result<f32> {
    Ok(read_number(reader, TagKind::Float)?.as_f64() as f32)
}

pub fn read_f64(reader: &mut NbtReader<&mut dyn Read>) -> Result<f64> {
    Ok(read_number(reader, TagKind::Double)?.as_f64())
}

pub fn read_char(reader: &mut NbtReader<&mut dyn Read>) -> Result<char> {
    let code = read_number(reader, TagKind::Short)?.as_i64() as u16;
    char::from_u32(code as u32)
        .ok_or_else(|| Error::corrupt(format!("{code:#x} is not a valid character")))
}

pub fn read_string(reader: &mut NbtReader<&mut dyn Read>) -> Result<String> {
    match reader.peek()? {
        TagKind::String => reader.next_string(),
        TagKind::Byte | TagKind::Short | TagKind::Int | TagKind::Long => {
            Ok(read_number(reader, TagKind::String)?.as_i64().to_string())
        }
        TagKind::Float | TagKind::Double => {
            Ok(read_number(reader, TagKind::String)?.as_f64().to_string())
        }
        found => Err(Error::UnexpectedKind {
            expected: TagKind::String,
            found,
            path: reader.path(),
        }),
    }
}
