//! nbtkit is a schema-directed encoder and decoder for the NBT format used
//! by *Minecraft: Java Edition* to store world data, player inventories and
//! friends.
//!
//! The crate has two layers that can be used independently:
//!
//! * [`NbtReader`] and [`NbtWriter`]: streaming state machines over the raw
//!   wire format. They enforce the structure of compounds and lists while
//!   you pull or push individual values, and support skipping and capturing
//!   whole subtrees.
//! * [`NbtKit`]: a type-directed (de)serialization engine that maps between
//!   your own types and NBT trees, driven by a registry of per-type
//!   adapters. Types opt in with [`derive(Nbt)`](Nbt).
//!
//! # Quick example
//!
//! ```
//! use nbtkit::{NbtKit, Nbt};
//!
//! #[derive(Nbt, Debug, Default, PartialEq)]
//! struct Server {
//!     motd: String,
//!     max_players: i32,
//! }
//!
//! let kit = NbtKit::new();
//! let server = Server { motd: "hello".to_string(), max_players: 20 };
//!
//! let bytes = kit.to_bytes(&server).unwrap();
//! let back: Server = kit.from_bytes(&bytes).unwrap();
//! assert_eq!(server, back);
//! ```
//!
//! # Streaming
//!
//! The streaming layer takes any [`Read`](std::io::Read) or
//! [`Write`](std::io::Write). Compression is applied externally; for a
//! gzipped level.dat wrap the file in a `GzDecoder` first.
//!
//! ```no_run
//! use nbtkit::{NbtReader, TagKind};
//! use flate2::read::GzDecoder;
//!
//! let file = std::fs::File::open("level.dat").unwrap();
//! let mut reader = NbtReader::new(GzDecoder::new(file));
//!
//! assert_eq!(reader.peek().unwrap(), TagKind::Compound);
//! reader.begin_compound().unwrap();
//! while reader.has_next().unwrap() {
//!     let name = reader.name().unwrap().to_string();
//!     println!("{}: {:?}", name, reader.peek().unwrap());
//!     reader.skip().unwrap();
//! }
//! ```

extern crate self as nbtkit;

pub mod adapter;
pub mod error;
pub mod reader;
pub mod writer;

mod descriptor;
mod engine;
mod input;
mod macros;
mod naming;
mod value;

#[cfg(test)]
mod test;

// Support for macro expansions; not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use indexmap::IndexMap;
}

pub use adapter::array::{ByteArray, IntArray, LongArray};
pub use adapter::enums::NbtEnum;
pub use adapter::map::MapKey;
pub use adapter::object::{FieldBinding, FieldDecl, NbtStruct};
pub use adapter::resolver::{ResolverVariant, TypeResolver};
pub use adapter::{
    AdapterPin, InstanceCreator, TypeAdapter, TypeDeserializer, TypeSerializer,
};
pub use descriptor::{DescKind, Described, ScalarKind, TypeDesc};
pub use engine::NbtKit;
pub use error::{Error, Result};
pub use naming::NamingStrategy;
pub use reader::NbtReader;
pub use value::Value;
pub use writer::NbtWriter;

pub use nbtkit_derive::Nbt;

use std::convert::TryFrom;
use std::fmt;
use std::io::{Read, Write};

/// An NBT tag kind. This does not carry the value or the name of the data.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
#[repr(u8)]
pub enum TagKind {
    /// Terminates a Compound. Also the reported element kind of empty lists.
    End = 0,
    /// Equivalent to i8.
    Byte = 1,
    /// Equivalent to i16.
    Short = 2,
    /// Equivalent to i32.
    Int = 3,
    /// Equivalent to i64.
    Long = 4,
    /// Equivalent to f32.
    Float = 5,
    /// Equivalent to f64.
    Double = 6,
    /// An array of Byte (i8).
    ByteArray = 7,
    /// A modified-UTF-8 string.
    String = 8,
    /// A length-prefixed sequence of unnamed tags sharing one kind.
    List = 9,
    /// A struct-like collection of named tags, terminated by End.
    Compound = 10,
    /// An array of Int (i32).
    IntArray = 11,
    /// An array of Long (i64).
    LongArray = 12,
}

// Crates exist to generate these conversions for us, but the tag set very
// rarely changes and writing them out keeps the dependency tree small.
impl TryFrom<u8> for TagKind {
    type Error = ();

    fn try_from(value: u8) -> std::result::Result<Self, ()> {
        use TagKind::*;
        Ok(match value {
            0 => End,
            1 => Byte,
            2 => Short,
            3 => Int,
            4 => Long,
            5 => Float,
            6 => Double,
            7 => ByteArray,
            8 => String,
            9 => List,
            10 => Compound,
            11 => IntArray,
            12 => LongArray,
            13..=u8::MAX => return Err(()),
        })
    }
}

impl From<TagKind> for u8 {
    fn from(kind: TagKind) -> Self {
        kind as u8
    }
}

impl TagKind {
    /// Payload size in bytes for the fixed-size scalar kinds, `None` for
    /// everything variable-length.
    pub fn payload_size(self) -> Option<usize> {
        match self {
            TagKind::Byte => Some(1),
            TagKind::Short => Some(2),
            TagKind::Int => Some(4),
            TagKind::Long => Some(8),
            TagKind::Float => Some(4),
            TagKind::Double => Some(8),
            _ => None,
        }
    }
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Decode a `T` from NBT bytes with a fresh engine.
///
/// For repeated conversions prefer keeping a [`NbtKit`] around: the engine
/// caches resolved adapters per type.
pub fn from_bytes<T: Described>(bytes: &[u8]) -> Result<T> {
    NbtKit::new().from_bytes(bytes)
}

/// Decode a `T` from any reader with a fresh engine.
pub fn from_reader<T: Described>(reader: impl Read) -> Result<T> {
    NbtKit::new().read(reader)
}

/// Encode a value to NBT bytes with a fresh engine.
pub fn to_bytes<T: Described>(value: &T) -> Result<Vec<u8>> {
    NbtKit::new().to_bytes(value)
}

/// Encode a value to any writer with a fresh engine.
pub fn to_writer<T: Described>(writer: impl Write, value: &T) -> Result<()> {
    NbtKit::new().write(writer, value)
}
