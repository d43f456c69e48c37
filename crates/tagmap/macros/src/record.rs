use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{DeriveInput, Field, LitStr, parse_macro_input, parse_quote};

use crate::support::{attrs, diag, utils};

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(input) {
        Ok(ts) => ts.into(),
        Err(e) => diag::to_compile_error(e),
    }
}

/// A field that takes part in enumeration.
struct RecordField<'a> {
    field: &'a Field,
    name: String,
    tags: Vec<(String, LitStr)>,
}

fn expand(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let named = utils::require_named_fields(&input)?;
    utils::reject_lifetimes(&input)?;

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param.bounds.push(parse_quote!(::tagmap::Reflect));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        if let Some(parsed) = parse_field(field)? {
            fields.push(parsed);
        }
    }

    let values = fields.iter().map(|f| {
        let ident = &f.field.ident;
        let name = &f.name;
        let tags = tags_expr(&f.tags);
        quote! { ::tagmap::Field::new(#name, #tags, &self.#ident) }
    });

    let shapes = fields.iter().map(|f| {
        let ty = &f.field.ty;
        let name = &f.name;
        let tags = tags_expr(&f.tags);
        quote! { ::tagmap::FieldShape::of::<#ty>(#name, #tags) }
    });

    Ok(quote! {
        impl #impl_generics ::tagmap::Reflect for #struct_name #ty_generics #where_clause {
            fn type_shape() -> ::tagmap::Shape {
                ::tagmap::Shape::Record(::tagmap::RecordShape::of::<Self>())
            }

            fn shape(&self) -> ::tagmap::Shape {
                <Self as ::tagmap::Reflect>::type_shape()
            }

            fn as_record(&self) -> ::core::option::Option<&dyn ::tagmap::Record> {
                ::core::option::Option::Some(self)
            }
        }

        impl #impl_generics ::tagmap::Record for #struct_name #ty_generics #where_clause {
            fn fields(&self) -> ::std::vec::Vec<::tagmap::Field<'_>> {
                ::std::vec![#(#values),*]
            }

            fn field_shapes() -> ::std::vec::Vec<::tagmap::FieldShape> {
                ::std::vec![#(#shapes),*]
            }
        }
    })
}

fn parse_field(field: &Field) -> syn::Result<Option<RecordField<'_>>> {
    let args = attrs::parse_attrs(&field.attrs, "tag")?;

    if let Some(flag) = args.unknown_flags(&["skip"]).next() {
        return Err(diag::error_spanned(
            flag,
            format!("unknown tag flag `{flag}`, expected `skip` or `name = \"value\"`"),
        ));
    }

    let mut tags: Vec<(String, LitStr)> = Vec::new();
    for (key, value) in args.pairs() {
        let key = key.unraw().to_string();
        if tags.iter().any(|(k, _)| *k == key) {
            return Err(diag::error_spanned(
                value,
                format!("tag `{key}` is given more than once"),
            ));
        }
        if value.value().is_empty() {
            return Err(diag::error_spanned(
                value,
                format!("tag `{key}` must not be empty"),
            ));
        }
        tags.push((key, value.clone()));
    }

    if args.has_flag("skip") {
        if let Some((_, value)) = tags.first() {
            return Err(diag::error_spanned(
                value,
                "a skipped field cannot carry tags",
            ));
        }
        return Ok(None);
    }

    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| diag::error_spanned(field, "Record derive requires named fields"))?;

    Ok(Some(RecordField {
        field,
        name: ident.unraw().to_string(),
        tags,
    }))
}

fn tags_expr(tags: &[(String, LitStr)]) -> TokenStream2 {
    if tags.is_empty() {
        return quote! { ::tagmap::Tags::EMPTY };
    }
    let pairs = tags.iter().map(|(key, value)| quote! { (#key, #value) });
    quote! { ::tagmap::Tags::new(&[#(#pairs),*]) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_err(input: DeriveInput) -> String {
        expand(input).err().expect("expansion should fail").to_string()
    }

    #[test]
    fn test_expands_tagged_and_nested_fields() {
        let input: DeriveInput = parse_quote! {
            struct Outer {
                #[tag(config = "a")]
                a: i32,
                b: Box<Inner>,
            }
        };

        let out = expand(input).unwrap().to_string();
        assert!(out.contains("impl :: tagmap :: Reflect for Outer"));
        assert!(out.contains("impl :: tagmap :: Record for Outer"));
        assert!(out.contains(r#"("config" , "a")"#));
        assert!(out.contains(":: tagmap :: Tags :: EMPTY"));
    }

    #[test]
    fn test_skipped_field_is_omitted() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(config = "a")]
                a: i32,
                #[tag(skip)]
                cache: NotReflect,
            }
        };

        let out = expand(input).unwrap().to_string();
        assert!(!out.contains("NotReflect"));
        assert!(!out.contains("cache"));
    }

    #[test]
    fn test_type_params_get_reflect_bound() {
        let input: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                #[tag(config = "inner")]
                inner: T,
            }
        };

        let out = expand(input).unwrap().to_string();
        assert!(out.contains("T : :: tagmap :: Reflect"));
    }

    #[test]
    fn test_rejects_enums() {
        let input: DeriveInput = parse_quote! {
            enum Mode { Fast, Safe }
        };
        assert_eq!(expand_err(input), "Record derive can only be used on structs");
    }

    #[test]
    fn test_rejects_tuple_structs() {
        let input: DeriveInput = parse_quote! {
            struct Pair(u8, u8);
        };
        assert!(expand_err(input).contains("named fields"));
    }

    #[test]
    fn test_rejects_lifetimes() {
        let input: DeriveInput = parse_quote! {
            struct Borrowed<'a> {
                #[tag(config = "name")]
                name: &'a str,
            }
        };
        assert_eq!(
            expand_err(input),
            "Record derive does not support lifetime parameters"
        );
    }

    #[test]
    fn test_rejects_skip_with_tags() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(skip, config = "a")]
                a: i32,
            }
        };
        assert_eq!(expand_err(input), "a skipped field cannot carry tags");
    }

    #[test]
    fn test_rejects_repeated_tag_name() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(config = "a")]
                #[tag(config = "b")]
                a: i32,
            }
        };
        assert_eq!(expand_err(input), "tag `config` is given more than once");
    }

    #[test]
    fn test_rejects_empty_tag_value() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(config = "")]
                a: i32,
            }
        };
        assert_eq!(expand_err(input), "tag `config` must not be empty");
    }

    #[test]
    fn test_rejects_unknown_flag() {
        let input: DeriveInput = parse_quote! {
            struct Config {
                #[tag(flatten)]
                a: i32,
            }
        };
        assert!(expand_err(input).starts_with("unknown tag flag `flatten`"));
    }
}
