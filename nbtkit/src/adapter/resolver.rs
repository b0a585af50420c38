//! Polymorphic decoding: pick the concrete type from a first parse of the
//! data itself.
//!
//! A [`TypeResolver`] registered with
//! [`register_type_resolver`](crate::NbtKit::register_type_resolver)
//! intercepts reads of its target type. The raw tag is buffered, parsed as
//! the resolver's base type, and parsed again as whichever concrete type
//! the resolver picks from the base value.

use std::any::Any;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use crate::adapter::TypeDeserializer;
use crate::descriptor::{Described, TypeDesc};
use crate::engine::NbtKit;
use crate::error::{Error, Result};
use crate::reader::NbtReader;

/// A policy for polymorphic decoding of `Target` values.
pub trait TypeResolver: Send + Sync + 'static {
    /// The type reads of which this resolver intercepts.
    type Target: 'static;
    /// The (usually partial) type the raw data is parsed into first.
    type Base: Described;

    /// The concrete types `resolve` may pick.
    fn possible_types(&self) -> Vec<ResolverVariant<Self::Target>>;

    /// Pick the concrete type for this value. Returning `None`, or a
    /// descriptor that is not among [`possible_types`](Self::possible_types),
    /// falls back to the target's ordinary adapter.
    fn resolve(&self, base: &Self::Base) -> Option<TypeDesc>;

    /// Called when parsing the base type (`base` is `None`) or the
    /// resolved type (`base` is `Some`) failed. May recover with a default
    /// value; rethrows by default.
    fn on_error(&self, error: Error, base: Option<&Self::Base>) -> Result<Self::Target> {
        let _ = base;
        Err(error)
    }
}

type VariantReader<T> = Box<dyn Fn(&mut NbtReader<&mut dyn Read>) -> Result<T> + Send + Sync>;
type BuildVariant<T> = fn(&NbtKit) -> Result<VariantReader<T>>;

/// One concrete type a resolver may pick: its descriptor plus a bridge
/// that parses it and converts into the target type.
pub struct ResolverVariant<T> {
    desc: TypeDesc,
    build: BuildVariant<T>,
}

impl<T: 'static> ResolverVariant<T> {
    /// The variant for concrete type `S`.
    pub fn of<S>() -> Self
    where
        S: Described + Into<T>,
    {
        Self {
            desc: TypeDesc::of::<S>(),
            build: |kit| {
                let de = kit.deserializer::<S>()?;
                Ok(Box::new(move |reader: &mut NbtReader<&mut dyn Read>| {
                    Ok(de.read(reader)?.into())
                }))
            },
        }
    }

    pub(crate) fn into_parts(self) -> (TypeDesc, BuildVariant<T>) {
        (self.desc, self.build)
    }
}

/// The deserializer installed for a resolver's target type.
pub(crate) struct TypeResolvingDeserializer<R: TypeResolver> {
    resolver: Arc<R>,
    base: Arc<dyn TypeDeserializer<R::Base>>,
    variants: HashMap<TypeDesc, VariantReader<R::Target>>,
    fallback: Arc<dyn TypeDeserializer<R::Target>>,
}

impl<R: TypeResolver> TypeResolvingDeserializer<R> {
    pub fn new(
        resolver: Arc<R>,
        base: Arc<dyn TypeDeserializer<R::Base>>,
        variants: HashMap<TypeDesc, VariantReader<R::Target>>,
        fallback: Arc<dyn TypeDeserializer<R::Target>>,
    ) -> Self {
        Self {
            resolver,
            base,
            variants,
            fallback,
        }
    }
}

impl<R: TypeResolver> TypeDeserializer<R::Target> for TypeResolvingDeserializer<R> {
    fn read(&self, reader: &mut NbtReader<&mut dyn Read>) -> Result<R::Target> {
        let raw = reader.capture_raw()?;

        let base = match reparse(&raw, |r| self.base.read(r)) {
            Ok(base) => base,
            Err(e) => return self.resolver.on_error(e, None),
        };

        let chosen = self.resolver.resolve(&base);
        let result = match chosen.and_then(|desc| self.variants.get(&desc)) {
            Some(variant) => reparse(&raw, |r| variant(r)),
            None => reparse(&raw, |r| self.fallback.read(r)),
        };
        result.or_else(|e| self.resolver.on_error(e, Some(&base)))
    }
}

/// Parse a captured raw tag from the beginning.
fn reparse<T>(
    raw: &[u8],
    parse: impl FnOnce(&mut NbtReader<&mut dyn Read>) -> Result<T>,
) -> Result<T> {
    let mut slice: &[u8] = raw;
    let source: &mut dyn Read = &mut slice;
    let mut reader = NbtReader::new(source);
    parse(&mut reader)
}

type WrapFn<T> = Arc<
    dyn Fn(&NbtKit, Arc<dyn TypeDeserializer<T>>) -> Result<Arc<dyn TypeDeserializer<T>>>
        + Send
        + Sync,
>;

struct ResolverSlot<T: 'static>(WrapFn<T>);

/// A resolver wrap with its target type erased.
#[derive(Clone)]
pub(crate) struct ErasedResolver {
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedResolver {
    pub fn new<T: 'static>(wrap: WrapFn<T>) -> Self {
        Self {
            inner: Arc::new(ResolverSlot(wrap)),
        }
    }

    pub fn wrap_fn<T: 'static>(&self) -> Option<WrapFn<T>> {
        self.inner
            .downcast_ref::<ResolverSlot<T>>()
            .map(|slot| slot.0.clone())
    }
}
