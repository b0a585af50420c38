//! The mapping adapter: maps as NBT Compounds.
//!
//! Compound children are addressed by name, so map keys must be strings or
//! enums (which serialize as their symbolic name). Writes follow the map's
//! own iteration order; reads accept keys in any order.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::io::{Read, Write};
use std::sync::Arc;

use indexmap::IndexMap;

use crate::adapter::{
    DeserializerFactory, ErasedDeserializer, ErasedSerializer, InstanceCreator, SerializerFactory,
    TypeDeserializer, TypeSerializer,
};
use crate::descriptor::{DescKind, Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::{Error, Result};
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// A type usable as a map key on the wire. Implemented for `String`;
/// `derive(Nbt)` implements it for fieldless enums.
pub trait MapKey: Sized + 'static {
    /// The compound-child name this key serializes to.
    fn as_nbt_name(&self) -> Cow<'_, str>;

    /// Recover a key from a compound-child name.
    fn from_nbt_name(name: &str) -> Result<Self>;
}

impl MapKey for String {
    fn as_nbt_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }

    fn from_nbt_name(name: &str) -> Result<Self> {
        Ok(name.to_owned())
    }
}

/// Builds the adapters for descriptors classified as mappings.
pub struct MapAdapterFactory;

impl MapAdapterFactory {
    fn key_supported(desc: &TypeDesc) -> Result<()> {
        let key = desc.key().expect("mapping descriptors carry a key");
        match key.kind() {
            DescKind::Text | DescKind::Enumeration { .. } => Ok(()),
            _ => Err(Error::UnsupportedKeyType(key.type_name())),
        }
    }
}

impl SerializerFactory for MapAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::Mapping { .. } => {
                if let Err(e) = Self::key_supported(desc) {
                    return Some(Err(e));
                }
                desc.new_serializer(kit)
            }
            _ => None,
        }
    }
}

impl DeserializerFactory for MapAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::Mapping { .. } => {
                if let Err(e) = Self::key_supported(desc) {
                    return Some(Err(e));
                }
                desc.new_deserializer(kit)
            }
            _ => None,
        }
    }
}

pub(crate) struct MapSerializer<M: 'static, K: 'static, V: 'static> {
    pub value: Arc<dyn TypeSerializer<V>>,
    pub iter: for<'a> fn(&'a M) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>,
}

impl<M, K: MapKey, V> TypeSerializer<M> for MapSerializer<M, K, V> {
    fn write(&self, map: &M, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        writer.begin_compound()?;
        for (key, value) in (self.iter)(map) {
            writer.name(&key.as_nbt_name())?;
            self.value.write(value, writer)?;
        }
        writer.end_compound()
    }

    fn kind(&self) -> Option<TagKind> {
        Some(TagKind::Compound)
    }
}

pub(crate) struct MapDeserializer<M: 'static, K: 'static, V: 'static> {
    pub value: Arc<dyn TypeDeserializer<V>>,
    pub creator: Arc<dyn InstanceCreator<M>>,
    pub insert: fn(&mut M, K, V),
}

impl<M, K: MapKey, V> TypeDeserializer<M> for MapDeserializer<M, K, V> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<M> {
        let mut map = self.creator.create_instance()?;
        reader.begin_compound()?;
        while reader.has_next()? {
            let key = K::from_nbt_name(reader.name()?)?;
            let value = self.value.read(reader)?;
            (self.insert)(&mut map, key, value);
        }
        reader.end_compound()?;
        Ok(map)
    }
}

macro_rules! mapping_described {
    ($container:ident $(, $extra:ident)*) => {
        impl<K, V> Described for $container<K, V>
        where
            K: MapKey + Described $(+ $extra)*,
            V: Described,
        {
            fn descriptor() -> TypeDesc {
                TypeDesc::new::<$container<K, V>>(DescKind::Mapping {
                    key: K::descriptor,
                    value: V::descriptor,
                })
                .with_serializer(|kit| {
                    Ok(ErasedSerializer::new::<$container<K, V>>(Arc::new(
                        MapSerializer::<$container<K, V>, K, V> {
                            value: kit.serializer::<V>()?,
                            iter: |m| Box::new(m.iter()),
                        },
                    )))
                })
                .with_deserializer(|kit| {
                    Ok(ErasedDeserializer::new::<$container<K, V>>(Arc::new(
                        MapDeserializer::<$container<K, V>, K, V> {
                            value: kit.deserializer::<V>()?,
                            creator: kit.creator_or::<$container<K, V>>($container::new)?,
                            insert: |m, k, v| {
                                m.insert(k, v);
                            },
                        },
                    )))
                })
            }
        }
    };
}

mapping_described!(HashMap, Eq, Hash);
mapping_described!(BTreeMap, Ord);
mapping_described!(IndexMap, Eq, Hash);
