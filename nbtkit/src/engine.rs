//! The engine facade: adapter registry, caches and entry points.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, ReentrantMutex, RwLock};

use crate::adapter::resolver::{ErasedResolver, TypeResolver, TypeResolvingDeserializer};
use crate::adapter::{
    ArrayAdapterFactory, CollectionAdapterFactory, DeserializerFactory, EnumAdapterFactory,
    ErasedCreator, ErasedDeserializer, ErasedSerializer, InstanceCreator, InstanceCreatorFactory,
    MapAdapterFactory, PrimitiveAdapterFactory, SerializerFactory, TypeDeserializer,
    TypeSerializer,
};
use crate::descriptor::{DescKind, Described, TypeDesc};
use crate::error::{Error, Result};
use crate::naming::{lower_first, NamingStrategy};
use crate::reader::NbtReader;
use crate::value::DynamicAdapterFactory;
use crate::writer::NbtWriter;
use crate::TagKind;

pub(crate) type NameTransformer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The (de)serialization engine.
///
/// Holds ordered lists of adapter factories and caches the adapter resolved
/// for each type descriptor. Lookups are cheap after the first one; keep an
/// engine around rather than building one per call.
///
/// The engine can be shared between threads. Registrations and lookups are
/// internally synchronized; a registration clears the caches its kind of
/// adapter lives in, so later registrations win over earlier ones.
pub struct NbtKit {
    serializer_factories: Mutex<Vec<Arc<dyn SerializerFactory>>>,
    deserializer_factories: Mutex<Vec<Arc<dyn DeserializerFactory>>>,
    creator_factories: Mutex<Vec<Arc<dyn InstanceCreatorFactory>>>,
    resolver_factories: Mutex<Vec<Arc<dyn ResolverFactory>>>,

    ser_cache: RwLock<HashMap<TypeDesc, ErasedSerializer>>,
    de_cache: RwLock<HashMap<TypeDesc, ErasedDeserializer>>,
    creator_cache: RwLock<HashMap<TypeDesc, ErasedCreator>>,

    /// Serializes adapter construction. Reentrant: building an adapter
    /// recursively builds the adapters of its component types.
    construction: ReentrantMutex<()>,

    naming: RwLock<NamingStrategy>,
    transformer: RwLock<NameTransformer>,
}

impl Default for NbtKit {
    fn default() -> Self {
        Self::new()
    }
}

impl NbtKit {
    /// An engine with the built-in adapters registered.
    pub fn new() -> Self {
        let kit = Self {
            serializer_factories: Mutex::new(Vec::new()),
            deserializer_factories: Mutex::new(Vec::new()),
            creator_factories: Mutex::new(Vec::new()),
            resolver_factories: Mutex::new(Vec::new()),
            ser_cache: RwLock::new(HashMap::new()),
            de_cache: RwLock::new(HashMap::new()),
            creator_cache: RwLock::new(HashMap::new()),
            construction: ReentrantMutex::new(()),
            naming: RwLock::new(NamingStrategy::default()),
            transformer: RwLock::new(Arc::new(lower_first) as NameTransformer),
        };
        kit.register_adapter_factory(Arc::new(ArrayAdapterFactory));
        kit.register_adapter_factory(Arc::new(PrimitiveAdapterFactory));
        kit.register_adapter_factory(Arc::new(CollectionAdapterFactory));
        kit.register_adapter_factory(Arc::new(MapAdapterFactory));
        kit.register_adapter_factory(Arc::new(EnumAdapterFactory));
        kit.register_adapter_factory(Arc::new(DynamicAdapterFactory));
        kit
    }

    // -- configuration ------------------------------------------------------

    /// The strategy deriving NBT names from field names. Snapshotted when a
    /// structure adapter is built.
    pub fn set_naming_strategy(&self, strategy: NamingStrategy) {
        *self.naming.write() = strategy;
    }

    pub fn naming_strategy(&self) -> NamingStrategy {
        self.naming.read().clone()
    }

    /// The transformation applied to incoming NBT names before field
    /// lookup when no alias matches. Defaults to lower-casing the first
    /// letter, so a `Difficulty` tag lands in a `difficulty` field.
    pub fn set_field_name_transformer(
        &self,
        transformer: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        *self.transformer.write() = Arc::new(transformer);
    }

    pub(crate) fn field_name_transformer(&self) -> NameTransformer {
        self.transformer.read().clone()
    }

    // -- registration -------------------------------------------------------

    /// Register a factory for both directions.
    pub fn register_adapter_factory<F>(&self, factory: Arc<F>)
    where
        F: SerializerFactory + DeserializerFactory + 'static,
    {
        self.serializer_factories.lock().push(factory.clone());
        self.deserializer_factories.lock().push(factory);
        self.ser_cache.write().clear();
        self.de_cache.write().clear();
    }

    pub fn register_serializer_factory(&self, factory: Arc<dyn SerializerFactory>) {
        self.serializer_factories.lock().push(factory);
        self.ser_cache.write().clear();
    }

    pub fn register_deserializer_factory(&self, factory: Arc<dyn DeserializerFactory>) {
        self.deserializer_factories.lock().push(factory);
        self.de_cache.write().clear();
    }

    pub fn register_creator_factory(&self, factory: Arc<dyn InstanceCreatorFactory>) {
        self.creator_factories.lock().push(factory);
        self.creator_cache.write().clear();
    }

    /// Register an adapter for exactly `T`.
    pub fn register_adapter<T, A>(&self, adapter: Arc<A>)
    where
        T: Described,
        A: TypeSerializer<T> + TypeDeserializer<T> + 'static,
    {
        self.register_serializer::<T>(adapter.clone());
        self.register_deserializer::<T>(adapter);
    }

    /// Register a serializer for exactly `T`.
    pub fn register_serializer<T: Described>(&self, serializer: Arc<dyn TypeSerializer<T>>) {
        self.register_serializer_factory(Arc::new(ExactSerializer {
            desc: T::descriptor(),
            adapter: ErasedSerializer::new::<T>(serializer),
        }));
    }

    /// Register a deserializer for exactly `T`.
    pub fn register_deserializer<T: Described>(&self, deserializer: Arc<dyn TypeDeserializer<T>>) {
        self.register_deserializer_factory(Arc::new(ExactDeserializer {
            desc: T::descriptor(),
            adapter: ErasedDeserializer::new::<T>(deserializer),
        }));
    }

    /// Register an instance creator for exactly `T`.
    pub fn register_instance_creator<T: Described>(&self, creator: Arc<dyn InstanceCreator<T>>) {
        self.register_creator_factory(Arc::new(ExactCreator {
            desc: T::descriptor(),
            creator: ErasedCreator::new::<T>(creator),
        }));
    }

    /// Register a polymorphic type resolver for its target type. Reads of
    /// the target will buffer the raw tag, parse it as the resolver's base
    /// type, and re-parse as whichever concrete type the resolver picks.
    pub fn register_type_resolver<R>(&self, resolver: R)
    where
        R: TypeResolver,
        R::Target: Described,
    {
        let resolver = Arc::new(resolver);
        let erased = ErasedResolver::new::<R::Target>(Arc::new(move |kit: &NbtKit, natural| {
            let base = kit.deserializer::<R::Base>()?;
            let mut variants = HashMap::new();
            for variant in resolver.possible_types() {
                let (desc, build) = variant.into_parts();
                variants.insert(desc, build(kit)?);
            }
            Ok(Arc::new(TypeResolvingDeserializer::new(
                resolver.clone(),
                base,
                variants,
                natural,
            )) as Arc<dyn TypeDeserializer<R::Target>>)
        }));
        self.resolver_factories.lock().push(Arc::new(ExactResolver {
            desc: <R::Target as Described>::descriptor(),
            resolver: erased,
        }));
        self.de_cache.write().clear();
    }

    // -- lookup -------------------------------------------------------------

    /// The serializer for `T`, building and caching it on first use.
    pub fn serializer<T: Described>(&self) -> Result<Arc<dyn TypeSerializer<T>>> {
        let desc = T::descriptor();
        if let Some(hit) = self.cached_serializer::<T>(&desc) {
            return Ok(hit);
        }

        let _guard = self.construction.lock();
        if let Some(hit) = self.cached_serializer::<T>(&desc) {
            return Ok(hit);
        }

        // Install a placeholder before running factories, so recursive
        // lookups for the same descriptor resolve instead of recursing
        // forever. It is completed exactly once, below.
        let future = Arc::new(FutureSerializer::<T> {
            slot: OnceLock::new(),
        });
        self.ser_cache.write().insert(
            desc.clone(),
            ErasedSerializer::new::<T>(future.clone() as Arc<dyn TypeSerializer<T>>),
        );

        match self.build_serializer::<T>(&desc) {
            Ok(adapter) => {
                let _ = future.slot.set(adapter.clone());
                self.ser_cache
                    .write()
                    .insert(desc, ErasedSerializer::new::<T>(adapter.clone()));
                Ok(adapter)
            }
            Err(e) => {
                self.ser_cache.write().remove(&desc);
                Err(e)
            }
        }
    }

    /// The deserializer for `T`, building and caching it on first use.
    pub fn deserializer<T: Described>(&self) -> Result<Arc<dyn TypeDeserializer<T>>> {
        let desc = T::descriptor();
        if let Some(hit) = self.cached_deserializer::<T>(&desc) {
            return Ok(hit);
        }

        let _guard = self.construction.lock();
        if let Some(hit) = self.cached_deserializer::<T>(&desc) {
            return Ok(hit);
        }

        let future = Arc::new(FutureDeserializer::<T> {
            slot: OnceLock::new(),
        });
        self.de_cache.write().insert(
            desc.clone(),
            ErasedDeserializer::new::<T>(future.clone() as Arc<dyn TypeDeserializer<T>>),
        );

        match self.build_deserializer::<T>(&desc) {
            Ok(adapter) => {
                let _ = future.slot.set(adapter.clone());
                self.de_cache
                    .write()
                    .insert(desc, ErasedDeserializer::new::<T>(adapter.clone()));
                Ok(adapter)
            }
            Err(e) => {
                self.de_cache.write().remove(&desc);
                Err(e)
            }
        }
    }

    /// The registered instance creator for `T`, if any.
    pub fn instance_creator<T: Described>(&self) -> Result<Option<Arc<dyn InstanceCreator<T>>>> {
        let desc = T::descriptor();
        if let Some(hit) = self.creator_cache.read().get(&desc).and_then(|e| e.get::<T>()) {
            return Ok(Some(hit));
        }
        let factories = self.creator_factories.lock().clone();
        for factory in factories.iter().rev() {
            if let Some(result) = factory.create(&desc, self) {
                let erased = result?;
                let creator = erased.get::<T>().ok_or_else(|| {
                    Error::NoConstructor(desc.type_name())
                })?;
                self.creator_cache.write().insert(desc, erased);
                return Ok(Some(creator));
            }
        }
        Ok(None)
    }

    /// The instance creator for `T`, or `fallback` if none is registered.
    pub fn creator_or<T: Described>(
        &self,
        fallback: fn() -> T,
    ) -> Result<Arc<dyn InstanceCreator<T>>> {
        match self.instance_creator::<T>()? {
            Some(creator) => Ok(creator),
            None => Ok(Arc::new(fallback) as Arc<dyn InstanceCreator<T>>),
        }
    }

    // -- entry points -------------------------------------------------------

    /// Decode a `T` from `source`.
    pub fn read<T: Described>(&self, source: impl Read) -> Result<T> {
        let mut source = source;
        let dyn_source: &mut dyn Read = &mut source;
        let mut reader = NbtReader::new(dyn_source);
        self.read_from(&mut reader)
    }

    /// Decode a `T` from an already-positioned reader.
    pub fn read_from<T: Described>(
        &self,
        reader: &mut NbtReader<&mut dyn Read>,
    ) -> Result<T> {
        self.deserializer::<T>()?.read(reader)
    }

    /// Decode a `T` from a byte slice.
    pub fn from_bytes<T: Described>(&self, bytes: &[u8]) -> Result<T> {
        self.read(bytes)
    }

    /// Encode `value` to `sink`.
    pub fn write<T: Described>(&self, sink: impl Write, value: &T) -> Result<()> {
        let mut sink = sink;
        let dyn_sink: &mut dyn Write = &mut sink;
        let mut writer = NbtWriter::new(dyn_sink);
        self.write_to(&mut writer, value)?;
        writer.finish()?;
        Ok(())
    }

    /// Encode `value` onto an already-positioned writer.
    pub fn write_to<T: Described>(
        &self,
        writer: &mut NbtWriter<&mut dyn Write>,
        value: &T,
    ) -> Result<()> {
        self.serializer::<T>()?.write(value, writer)
    }

    /// Encode `value` to a byte vector.
    pub fn to_bytes<T: Described>(&self, value: &T) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write(&mut out, value)?;
        Ok(out)
    }

    // -- construction -------------------------------------------------------

    fn cached_serializer<T: Described>(&self, desc: &TypeDesc) -> Option<Arc<dyn TypeSerializer<T>>> {
        self.ser_cache.read().get(desc).and_then(|e| e.get::<T>())
    }

    fn cached_deserializer<T: Described>(
        &self,
        desc: &TypeDesc,
    ) -> Option<Arc<dyn TypeDeserializer<T>>> {
        self.de_cache.read().get(desc).and_then(|e| e.get::<T>())
    }

    fn build_serializer<T: Described>(&self, desc: &TypeDesc) -> Result<Arc<dyn TypeSerializer<T>>> {
        let factories = self.serializer_factories.lock().clone();
        for factory in factories.iter().rev() {
            if let Some(result) = factory.create(desc, self) {
                return result?.get::<T>().ok_or_else(|| wrong_erasure(desc));
            }
        }
        // no factory claimed it: fall back to the reflective structure
        // adapter for struct types
        if matches!(desc.kind(), DescKind::Structure) {
            if let Some(result) = desc.new_serializer(self) {
                return result?.get::<T>().ok_or_else(|| wrong_erasure(desc));
            }
        }
        Err(Error::corrupt(format!(
            "no serializer available for type {desc}"
        )))
    }

    fn build_deserializer<T: Described>(
        &self,
        desc: &TypeDesc,
    ) -> Result<Arc<dyn TypeDeserializer<T>>> {
        let natural = self.build_deserializer_natural::<T>(desc)?;

        // a registered type resolver intercepts reads of its target type
        let factories = self.resolver_factories.lock().clone();
        for factory in factories.iter().rev() {
            if let Some(result) = factory.create(desc, self) {
                let wrap = result?
                    .wrap_fn::<T>()
                    .ok_or_else(|| wrong_erasure(desc))?;
                return wrap.as_ref()(self, natural);
            }
        }
        Ok(natural)
    }

    fn build_deserializer_natural<T: Described>(
        &self,
        desc: &TypeDesc,
    ) -> Result<Arc<dyn TypeDeserializer<T>>> {
        let factories = self.deserializer_factories.lock().clone();
        for factory in factories.iter().rev() {
            if let Some(result) = factory.create(desc, self) {
                return result?.get::<T>().ok_or_else(|| wrong_erasure(desc));
            }
        }
        if matches!(desc.kind(), DescKind::Structure) {
            if let Some(result) = desc.new_deserializer(self) {
                return result?.get::<T>().ok_or_else(|| wrong_erasure(desc));
            }
        }
        Err(Error::corrupt(format!(
            "no deserializer available for type {desc}"
        )))
    }
}

fn wrong_erasure(desc: &TypeDesc) -> Error {
    Error::corrupt(format!(
        "a factory produced an adapter erased for a different type than {desc}"
    ))
}

fn used_before_ready() -> Error {
    Error::corrupt(
        "adapter for a recursive type was used before its construction completed".to_owned(),
    )
}

/// Placeholder serializer installed in the cache while the real adapter is
/// under construction. Completion is monotonic: the slot is set once and
/// every holder sees the final adapter from then on.
struct FutureSerializer<T: 'static> {
    slot: OnceLock<Arc<dyn TypeSerializer<T>>>,
}

impl<T: 'static> TypeSerializer<T> for FutureSerializer<T> {
    fn write(&self, value: &T, writer: &mut NbtWriter<&mut dyn Write>) -> Result<()> {
        self.slot.get().ok_or_else(used_before_ready)?.write(value, writer)
    }

    fn kind(&self) -> Option<TagKind> {
        self.slot.get().and_then(|adapter| adapter.kind())
    }
}

struct FutureDeserializer<T: 'static> {
    slot: OnceLock<Arc<dyn TypeDeserializer<T>>>,
}

impl<T: 'static> TypeDeserializer<T> for FutureDeserializer<T> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<T> {
        self.slot.get().ok_or_else(used_before_ready)?.read(reader)
    }
}

// ---------------------------------------------------------------------------
// Exact-descriptor registrations are factories that match by equality.

struct ExactSerializer {
    desc: TypeDesc,
    adapter: ErasedSerializer,
}

impl SerializerFactory for ExactSerializer {
    fn create(&self, desc: &TypeDesc, _kit: &NbtKit) -> Option<Result<ErasedSerializer>> {
        (*desc == self.desc).then(|| Ok(self.adapter.clone()))
    }
}

struct ExactDeserializer {
    desc: TypeDesc,
    adapter: ErasedDeserializer,
}

impl DeserializerFactory for ExactDeserializer {
    fn create(&self, desc: &TypeDesc, _kit: &NbtKit) -> Option<Result<ErasedDeserializer>> {
        (*desc == self.desc).then(|| Ok(self.adapter.clone()))
    }
}

struct ExactCreator {
    desc: TypeDesc,
    creator: ErasedCreator,
}

impl InstanceCreatorFactory for ExactCreator {
    fn create(&self, desc: &TypeDesc, _kit: &NbtKit) -> Option<Result<ErasedCreator>> {
        (*desc == self.desc).then(|| Ok(self.creator.clone()))
    }
}

/// Supplies resolver wraps for descriptors it recognizes.
pub(crate) trait ResolverFactory: Send + Sync {
    fn create(&self, desc: &TypeDesc, kit: &NbtKit) -> Option<Result<ErasedResolver>>;
}

struct ExactResolver {
    desc: TypeDesc,
    resolver: ErasedResolver,
}

impl ResolverFactory for ExactResolver {
    fn create(&self, desc: &TypeDesc, _kit: &NbtKit) -> Option<Result<ErasedResolver>> {
        (*desc == self.desc).then(|| Ok(self.resolver.clone()))
    }
}
