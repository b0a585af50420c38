//! The `#[derive(Nbt)]` macro.
//!
//! On a struct with named fields it generates the `Described` and
//! `NbtStruct` implementations the reflective structure adapter is driven
//! by: the field declaration list, a blank-instance constructor, and the
//! post-deserialize hooks. On a fieldless enum it generates `Described`,
//! `NbtEnum` (name and declaration-order tables) and `MapKey`.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, PathArguments,
    Type,
};

#[proc_macro_derive(Nbt, attributes(nbt))]
pub fn derive_nbt(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Nbt)] does not support generic types; \
             wrap the generic part in a container the engine already knows",
        ));
    }
    match &input.data {
        Data::Struct(data) => expand_struct(input, data),
        Data::Enum(data) => expand_enum(input, data),
        Data::Union(_) => Err(syn::Error::new_spanned(
            &input.ident,
            "#[derive(Nbt)] supports structs and fieldless enums, not unions",
        )),
    }
}

// ---------------------------------------------------------------------------
// attribute parsing

#[derive(Default)]
struct TypeAttrs {
    post_deserialize: Vec<Ident>,
    with: Option<Type>,
    serialize_with: Option<Type>,
    deserialize_with: Option<Type>,
}

fn parse_type_attrs(input: &DeriveInput) -> syn::Result<TypeAttrs> {
    let mut out = TypeAttrs::default();
    for attr in &input.attrs {
        if !attr.path().is_ident("nbt") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("post_deserialize") {
                let lit: LitStr = meta.value()?.parse()?;
                out.post_deserialize
                    .push(format_ident!("{}", lit.value(), span = lit.span()));
                Ok(())
            } else if meta.path.is_ident("with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.with = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("serialize_with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.serialize_with = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("deserialize_with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.deserialize_with = Some(lit.parse()?);
                Ok(())
            } else {
                Err(meta.error("unknown nbt type attribute"))
            }
        })?;
    }
    Ok(out)
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    aliases: Vec<String>,
    with: Option<Type>,
    serialize_with: Option<Type>,
    deserialize_with: Option<Type>,
    skip: bool,
}

fn parse_field_attrs(field: &syn::Field) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("nbt") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                out.rename = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("alias") {
                let lit: LitStr = meta.value()?.parse()?;
                out.aliases.push(lit.value());
                Ok(())
            } else if meta.path.is_ident("with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.with = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("serialize_with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.serialize_with = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("deserialize_with") {
                let lit: LitStr = meta.value()?.parse()?;
                out.deserialize_with = Some(lit.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                out.skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown nbt field attribute"))
            }
        })?;
    }
    if out.with.is_some() && (out.serialize_with.is_some() || out.deserialize_with.is_some()) {
        return Err(syn::Error::new_spanned(
            field,
            "#[nbt(with)] can not be combined with serialize_with/deserialize_with",
        ));
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// structs

fn expand_struct(input: &DeriveInput, data: &syn::DataStruct) -> syn::Result<TokenStream2> {
    let fields = match &data.fields {
        Fields::Named(named) => &named.named,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Nbt)] needs named fields",
            ))
        }
    };

    let name = &input.ident;
    let type_attrs = parse_type_attrs(input)?;

    let mut blank_fields = Vec::new();
    let mut decls = Vec::new();

    for field in fields {
        let ident = field.ident.as_ref().expect("named field");
        let attrs = parse_field_attrs(field)?;

        blank_fields.push(quote! {
            #ident: ::core::default::Default::default()
        });
        if attrs.skip {
            continue;
        }

        let field_name = ident.to_string();
        let nbt_names = field_names_tokens(&attrs);
        let bind = bind_fn(ident, &field.ty, &attrs)?;

        decls.push(quote! {
            ::nbtkit::FieldDecl {
                field_name: #field_name,
                nbt_names: #nbt_names,
                bind: #bind,
            }
        });
    }

    let post_calls = type_attrs.post_deserialize.iter().map(|method| {
        quote! { self.#method(); }
    });

    let (build_ser, build_de) = type_builders(&type_attrs);

    Ok(quote! {
        impl ::nbtkit::Described for #name {
            fn descriptor() -> ::nbtkit::TypeDesc {
                ::nbtkit::TypeDesc::new::<Self>(::nbtkit::DescKind::Structure)
                    .with_serializer(#build_ser)
                    .with_deserializer(#build_de)
            }
        }

        impl ::nbtkit::NbtStruct for #name {
            fn blank() -> Self {
                Self { #(#blank_fields),* }
            }

            fn declared_fields() -> ::std::vec::Vec<::nbtkit::FieldDecl<Self>> {
                ::std::vec![ #(#decls),* ]
            }

            fn post_deserialize(&mut self) {
                #(#post_calls)*
            }
        }
    })
}

fn type_builders(attrs: &TypeAttrs) -> (TokenStream2, TokenStream2) {
    let ser = match attrs.with.as_ref().or(attrs.serialize_with.as_ref()) {
        Some(pin) => quote! {
            |kit| {
                let adapter = ::std::sync::Arc::new(
                    <#pin as ::nbtkit::AdapterPin>::instantiate(kit)?,
                );
                Ok(::nbtkit::adapter::ErasedSerializer::new::<Self>(adapter))
            }
        },
        None => quote! { ::nbtkit::adapter::object::build_struct_serializer::<Self> },
    };
    let de = match attrs.with.as_ref().or(attrs.deserialize_with.as_ref()) {
        Some(pin) => quote! {
            |kit| {
                let adapter = ::std::sync::Arc::new(
                    <#pin as ::nbtkit::AdapterPin>::instantiate(kit)?,
                );
                Ok(::nbtkit::adapter::ErasedDeserializer::new::<Self>(adapter))
            }
        },
        None => quote! { ::nbtkit::adapter::object::build_struct_deserializer::<Self> },
    };
    (ser, de)
}

fn field_names_tokens(attrs: &FieldAttrs) -> TokenStream2 {
    let mut names = Vec::new();
    if let Some(rename) = &attrs.rename {
        names.push(rename.clone());
    }
    names.extend(attrs.aliases.iter().cloned());
    quote! { &[ #(#names),* ] }
}

/// The monomorphized binding constructor for one field.
fn bind_fn(ident: &Ident, ty: &Type, attrs: &FieldAttrs) -> syn::Result<TokenStream2> {
    if attrs.with.is_some() || attrs.serialize_with.is_some() || attrs.deserialize_with.is_some() {
        return Ok(pinned_bind_fn(ident, ty, attrs));
    }

    if let Some(inner) = option_inner(ty) {
        return Ok(quote! {
            |kit, write_name| {
                let ser = kit.serializer::<#inner>()?;
                let de = kit.deserializer::<#inner>()?;
                Ok(::nbtkit::FieldBinding {
                    write: ::std::boxed::Box::new(
                        move |value: &Self, w: &mut ::nbtkit::NbtWriter<&mut dyn ::std::io::Write>| {
                            if let ::core::option::Option::Some(inner) = &value.#ident {
                                w.name(&write_name)?;
                                ::nbtkit::TypeSerializer::write(&*ser, inner, w)?;
                            }
                            Ok(())
                        },
                    ),
                    read: ::std::boxed::Box::new(
                        move |value: &mut Self, r: &mut ::nbtkit::NbtReader<&mut dyn ::std::io::Read>| {
                            value.#ident = ::core::option::Option::Some(
                                ::nbtkit::TypeDeserializer::read(&*de, r)?,
                            );
                            Ok(())
                        },
                    ),
                })
            }
        });
    }

    if let Some((write_fn, read_fn)) = primitive_accessors(ty) {
        // scalar fields go straight to the stream, no adapter lookup
        return Ok(quote! {
            |_kit, write_name| {
                Ok(::nbtkit::FieldBinding {
                    write: ::std::boxed::Box::new(
                        move |value: &Self, w: &mut ::nbtkit::NbtWriter<&mut dyn ::std::io::Write>| {
                            w.name(&write_name)?;
                            ::nbtkit::adapter::primitive::#write_fn(&value.#ident, w)
                        },
                    ),
                    read: ::std::boxed::Box::new(
                        move |value: &mut Self, r: &mut ::nbtkit::NbtReader<&mut dyn ::std::io::Read>| {
                            value.#ident = ::nbtkit::adapter::primitive::#read_fn(r)?;
                            Ok(())
                        },
                    ),
                })
            }
        });
    }

    Ok(quote! {
        |kit, write_name| {
            let ser = kit.serializer::<#ty>()?;
            let de = kit.deserializer::<#ty>()?;
            Ok(::nbtkit::FieldBinding {
                write: ::std::boxed::Box::new(
                    move |value: &Self, w: &mut ::nbtkit::NbtWriter<&mut dyn ::std::io::Write>| {
                        w.name(&write_name)?;
                        ::nbtkit::TypeSerializer::write(&*ser, &value.#ident, w)
                    },
                ),
                read: ::std::boxed::Box::new(
                    move |value: &mut Self, r: &mut ::nbtkit::NbtReader<&mut dyn ::std::io::Read>| {
                        value.#ident = ::nbtkit::TypeDeserializer::read(&*de, r)?;
                        Ok(())
                    },
                ),
            })
        }
    })
}

fn pinned_bind_fn(ident: &Ident, ty: &Type, attrs: &FieldAttrs) -> TokenStream2 {
    let ser_init = match attrs.with.as_ref().or(attrs.serialize_with.as_ref()) {
        Some(pin) => quote! {
            let ser = ::std::sync::Arc::new(<#pin as ::nbtkit::AdapterPin>::instantiate(kit)?);
        },
        None => quote! { let ser = kit.serializer::<#ty>()?; },
    };
    let de_init = match attrs.with.as_ref().or(attrs.deserialize_with.as_ref()) {
        Some(pin) => quote! {
            let de = ::std::sync::Arc::new(<#pin as ::nbtkit::AdapterPin>::instantiate(kit)?);
        },
        None => quote! { let de = kit.deserializer::<#ty>()?; },
    };
    quote! {
        |kit, write_name| {
            #ser_init
            #de_init
            Ok(::nbtkit::FieldBinding {
                write: ::std::boxed::Box::new(
                    move |value: &Self, w: &mut ::nbtkit::NbtWriter<&mut dyn ::std::io::Write>| {
                        w.name(&write_name)?;
                        ::nbtkit::TypeSerializer::write(&*ser, &value.#ident, w)
                    },
                ),
                read: ::std::boxed::Box::new(
                    move |value: &mut Self, r: &mut ::nbtkit::NbtReader<&mut dyn ::std::io::Read>| {
                        value.#ident = ::nbtkit::TypeDeserializer::read(&*de, r)?;
                        Ok(())
                    },
                ),
            })
        }
    }
}

/// `Option<T>` detected syntactically, the way serde does it.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

/// Direct accessors for the scalar field types.
fn primitive_accessors(ty: &Type) -> Option<(Ident, Ident)> {
    let Type::Path(path) = ty else { return None };
    let segment = path.path.segments.last()?;
    if !segment.arguments.is_empty() || path.path.segments.len() != 1 || path.qself.is_some() {
        return None;
    }
    let name = segment.ident.to_string();
    match name.as_str() {
        "bool" | "i8" | "i16" | "i32" | "i64" | "f32" | "f64" | "char" => Some((
            format_ident!("write_{}", name),
            format_ident!("read_{}", name),
        )),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// enums

fn expand_enum(input: &DeriveInput, data: &syn::DataEnum) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let mut variants = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "#[derive(Nbt)] on enums needs fieldless variants",
            ));
        }
        variants.push(&variant.ident);
    }

    let names: Vec<String> = variants.iter().map(|v| v.to_string()).collect();
    let indices: Vec<usize> = (0..variants.len()).collect();

    Ok(quote! {
        impl ::nbtkit::NbtEnum for #name {
            const NAMES: &'static [&'static str] = &[ #(#names),* ];

            fn from_name(name: &str) -> ::core::option::Option<Self> {
                match name {
                    #(#names => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn from_index(index: usize) -> ::core::option::Option<Self> {
                match index {
                    #(#indices => ::core::option::Option::Some(Self::#variants),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn name(&self) -> &'static str {
                match self {
                    #(Self::#variants => #names,)*
                }
            }
        }

        impl ::nbtkit::Described for #name {
            fn descriptor() -> ::nbtkit::TypeDesc {
                ::nbtkit::TypeDesc::new::<Self>(::nbtkit::DescKind::Enumeration {
                    names: <Self as ::nbtkit::NbtEnum>::NAMES,
                })
                .with_serializer(::nbtkit::adapter::enums::build_enum_serializer::<Self>)
                .with_deserializer(::nbtkit::adapter::enums::build_enum_deserializer::<Self>)
            }
        }

        impl ::nbtkit::MapKey for #name {
            fn as_nbt_name(&self) -> ::std::borrow::Cow<'_, str> {
                ::std::borrow::Cow::Borrowed(::nbtkit::NbtEnum::name(self))
            }

            fn from_nbt_name(name: &str) -> ::nbtkit::Result<Self> {
                ::nbtkit::adapter::enums::enum_key_from_name(name)
            }
        }
    })
}
