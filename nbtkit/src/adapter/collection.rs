//! The sequence adapter: ordered collections as NBT Lists.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::hash::Hash;
use std::io::{Read, Write};
use std::sync::Arc;

use indexmap::IndexSet;

use crate::adapter::{
    DeserializerFactory, ErasedDeserializer, ErasedSerializer, InstanceCreator, SerializerFactory,
    TypeDeserializer, TypeSerializer,
};
use crate::descriptor::{DescKind, Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::Result;
use crate::reader::NbtReader;
use crate::writer::NbtWriter;
use crate::TagKind;

/// Builds the adapters for descriptors classified as sequences.
pub struct CollectionAdapterFactory;

impl SerializerFactory for CollectionAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        match desc.kind() {
            DescKind::Sequence { .. } => desc.new_serializer(kit),
            _ => None,
        }
    }
}

impl DeserializerFactory for CollectionAdapterFactory {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        match desc.kind() {
            DescKind::Sequence { .. } => desc.new_deserializer(kit),
            _ => None,
        }
    }
}

/// Serializer for any container `C` of elements `E`, driven by hooks
/// captured when the container's descriptor was created.
pub(crate) struct SeqSerializer<C: 'static, E: 'static> {
    pub element: Arc<dyn TypeSerializer<E>>,
    pub iter: for<'a> fn(&'a C) -> Box<dyn Iterator<Item = &'a E> + 'a>,
    pub len: fn(&C) -> usize,
}

impl<C, E> TypeSerializer<C> for SeqSerializer<C, E> {
    fn write(&self, value: &C, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        let len = (self.len)(value);
        if len == 0 {
            // an empty list still needs an element kind in its header; ask
            // the element serializer, End when it has no fixed kind
            writer.begin_list_of(self.element.kind().unwrap_or(TagKind::End), 0)?;
        } else {
            writer.begin_list(len)?;
        }
        for element in (self.iter)(value) {
            self.element.write(element, writer)?;
        }
        writer.end_list()
    }

    fn kind(&self) -> Option<TagKind> {
        Some(TagKind::List)
    }
}

pub(crate) struct SeqDeserializer<C: 'static, E: 'static> {
    pub element: Arc<dyn TypeDeserializer<E>>,
    pub creator: Arc<dyn InstanceCreator<C>>,
    pub push: fn(&mut C, E),
}

impl<C, E> TypeDeserializer<C> for SeqDeserializer<C, E> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<C> {
        let mut collection = self.creator.create_instance()?;
        reader.begin_list()?;
        while reader.has_next()? {
            (self.push)(&mut collection, self.element.read(reader)?);
        }
        reader.end_list()?;
        Ok(collection)
    }
}

macro_rules! sequence_described {
    ($container:ident $(, $extra:ident)*) => {
        impl<T: Described $(+ $extra)*> Described for $container<T> {
            fn descriptor() -> TypeDesc {
                TypeDesc::new::<$container<T>>(DescKind::Sequence {
                    element: T::descriptor,
                })
                .with_serializer(|kit| {
                    Ok(ErasedSerializer::new::<$container<T>>(Arc::new(
                        SeqSerializer::<$container<T>, T> {
                            element: kit.serializer::<T>()?,
                            iter: |c| Box::new(c.iter()),
                            len: |c| c.len(),
                        },
                    )))
                })
                .with_deserializer(|kit| {
                    Ok(ErasedDeserializer::new::<$container<T>>(Arc::new(
                        SeqDeserializer::<$container<T>, T> {
                            element: kit.deserializer::<T>()?,
                            creator: kit.creator_or::<$container<T>>($container::new)?,
                            push: |c, e| {
                                c.push_into(e);
                            },
                        },
                    )))
                })
            }
        }
    };
}

/// The one insertion operation the sequence adapter needs, under one name.
trait PushInto<T> {
    fn push_into(&mut self, value: T);
}

impl<T> PushInto<T> for Vec<T> {
    fn push_into(&mut self, value: T) {
        self.push(value);
    }
}

impl<T> PushInto<T> for VecDeque<T> {
    fn push_into(&mut self, value: T) {
        self.push_back(value);
    }
}

impl<T: Eq + Hash> PushInto<T> for HashSet<T> {
    fn push_into(&mut self, value: T) {
        self.insert(value);
    }
}

impl<T: Ord> PushInto<T> for BTreeSet<T> {
    fn push_into(&mut self, value: T) {
        self.insert(value);
    }
}

impl<T: Eq + Hash> PushInto<T> for IndexSet<T> {
    fn push_into(&mut self, value: T) {
        self.insert(value);
    }
}

sequence_described!(Vec);
sequence_described!(VecDeque);
sequence_described!(HashSet, Eq, Hash);
sequence_described!(BTreeSet, Ord);
sequence_described!(IndexSet, Eq, Hash);
