//! The reflective structure adapter: reads and writes user structs through
//! the field bindings generated by [`derive(Nbt)`](crate::Nbt).
//!
//! This is the engine's default when no factory claims a descriptor.

use std::any::type_name;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::adapter::{ErasedDeserializer, ErasedSerializer, InstanceCreator, TypeDeserializer, TypeSerializer};
use crate::descriptor::Described;
use crate::engine::{NameTransformer, NbtKit};
use crate::error::{Error, Result};
use crate::naming::NamingStrategy;
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// A struct that can be assembled field by field. Implemented by
/// [`derive(Nbt)`](crate::Nbt); the trait is the stable contract between
/// the derive and the structure adapter.
pub trait NbtStruct: Sized + 'static {
    /// A fresh instance with every field at its default, for the decoder
    /// to assign into.
    fn blank() -> Self;

    /// The bindable fields, in declaration order.
    fn declared_fields() -> Vec<FieldDecl<Self>>;

    /// Runs after all fields of a decoded instance are populated.
    fn post_deserialize(&mut self) {}
}

/// One field of an [`NbtStruct`], before binding: its names and a
/// monomorphized constructor for its accessors.
pub struct FieldDecl<T> {
    /// The declared field name, input to the naming strategy.
    pub field_name: &'static str,
    /// Explicit NBT names. Empty means "apply the naming strategy"; the
    /// first entry is the write name, all entries are read aliases.
    pub nbt_names: &'static [&'static str],
    /// Resolve the field's adapters against the engine and produce its
    /// accessors. Receives the name to emit when writing.
    pub bind: fn(&NbtKit, String) -> Result<FieldBinding<T>>,
}

impl<T> FieldDecl<T> {
    fn write_name(&self, strategy: &NamingStrategy) -> String {
        match self.nbt_names.first() {
            Some(name) => (*name).to_owned(),
            None => strategy.apply(self.field_name),
        }
    }
}

/// The bound accessors of one field.
pub struct FieldBinding<T> {
    /// Emit the field's name and value. Fields holding `None` emit nothing.
    pub write: Box<dyn Fn(&T, &mut NbtWriter<&mut dyn Write>) -> Result<()> + Send + Sync>,
    /// Read the field's value from the current position and assign it.
    pub read: Box<dyn Fn(&mut T, &mut NbtReader<&mut dyn Read>) -> Result<()> + Send + Sync>,
}

/// Serializer constructor wired into derived struct descriptors; also the
/// engine's fallback for structure descriptors.
pub fn build_struct_serializer<T: NbtStruct + Described>(kit: &NbtKit) -> Result<ErasedSerializer> {
    let strategy = kit.naming_strategy();
    let mut fields = Vec::new();
    for decl in T::declared_fields() {
        let write_name = decl.write_name(&strategy);
        fields.push((decl.bind)(kit, write_name)?);
    }
    Ok(ErasedSerializer::new::<T>(Arc::new(StructSerializer::<T> {
        fields,
    })))
}

/// Deserializer constructor wired into derived struct descriptors.
pub fn build_struct_deserializer<T: NbtStruct + Described>(
    kit: &NbtKit,
) -> Result<ErasedDeserializer> {
    let strategy = kit.naming_strategy();
    let mut fields = Vec::new();
    let mut by_name = HashMap::new();

    for decl in T::declared_fields() {
        let index = fields.len();
        if decl.nbt_names.is_empty() {
            by_name.entry(strategy.apply(decl.field_name)).or_insert(index);
        } else {
            for name in decl.nbt_names {
                by_name.entry((*name).to_owned()).or_insert(index);
            }
        }
        let write_name = decl.write_name(&strategy);
        fields.push(((decl.bind)(kit, write_name)?, decl.field_name));
    }

    Ok(ErasedDeserializer::new::<T>(Arc::new(
        StructDeserializer::<T> {
            fields,
            by_name,
            creator: kit.creator_or::<T>(T::blank)?,
            transformer: kit.field_name_transformer(),
        },
    )))
}

struct StructSerializer<T: 'static> {
    fields: Vec<FieldBinding<T>>,
}

impl<T> TypeSerializer<T> for StructSerializer<T> {
    fn write(&self, value: &T, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        writer.begin_compound()?;
        for field in &self.fields {
            (field.write)(value, writer)?;
        }
        writer.end_compound()
    }

    fn kind(&self) -> Option<TagKind> {
        Some(TagKind::Compound)
    }
}

struct StructDeserializer<T: NbtStruct> {
    fields: Vec<(FieldBinding<T>, &'static str)>,
    /// Read aliases and strategy-derived names, to field index.
    by_name: HashMap<String, usize>,
    creator: Arc<dyn InstanceCreator<T>>,
    transformer: NameTransformer,
}

impl<T: NbtStruct> StructDeserializer<T> {
    fn lookup(&self, raw: &str) -> Option<usize> {
        // exact aliases first, then the transformed incoming name
        self.by_name
            .get(raw)
            .or_else(|| self.by_name.get(&self.transformer.as_ref()(raw)))
            .copied()
    }
}

impl<T: NbtStruct> TypeDeserializer<T> for StructDeserializer<T> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<T> {
        let mut value = self.creator.create_instance()?;
        reader.begin_compound()?;
        while reader.has_next()? {
            let raw = reader.name()?.to_owned();
            match self.lookup(&raw) {
                Some(index) => {
                    let (binding, field_name) = &self.fields[index];
                    (binding.read)(&mut value, reader)
                        .map_err(|e| Error::field(field_name, type_name::<T>(), e))?;
                }
                // fields we don't know are passed over in silence
                None => reader.skip()?,
            }
        }
        reader.end_compound()?;
        value.post_deserialize();
        Ok(value)
    }
}
