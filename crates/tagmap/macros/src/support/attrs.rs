use syn::{
    Attribute, Ident, Lit, LitStr, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

use crate::support::diag;

/// Parsed attribute arguments container.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single attribute item.
#[derive(Debug, Clone)]
pub enum AttrItem {
    /// A flag like `skip`
    Flag(Ident),
    /// Key-value pair like `config = "NAME"`
    KeyValue { key: Ident, value: LitStr },
}

impl AttrArgs {
    /// Check if a flag is present.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, AttrItem::Flag(f) if f == flag))
    }

    /// Flags other than those in `known`.
    pub fn unknown_flags<'a>(&'a self, known: &'a [&str]) -> impl Iterator<Item = &'a Ident> {
        self.items.iter().filter_map(move |item| match item {
            AttrItem::Flag(f) if !known.iter().any(|k| f == k) => Some(f),
            _ => None,
        })
    }

    /// All key-value pairs in declaration order.
    pub fn pairs(&self) -> impl Iterator<Item = (&Ident, &LitStr)> {
        self.items.iter().filter_map(|item| match item {
            AttrItem::KeyValue { key, value } => Some((key, value)),
            AttrItem::Flag(_) => None,
        })
    }
}

/// Parse attribute like `#[tag(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::Path(path) => Err(diag::error_spanned(
            path,
            format!("#[{expected}] requires arguments, e.g. #[{expected}(config = \"NAME\")]"),
        )),
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::NameValue(nv) => Err(diag::error_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given type and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs::default();

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.items.extend(args.items);
        }
    }

    Ok(result)
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
            .into_iter()
            .map(|x| x.0)
            .collect();
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;

        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;

            let value = match input.parse::<Lit>()? {
                Lit::Str(s) => s,
                other => {
                    return Err(diag::error_spanned(
                        &other,
                        format!("tag `{key}` expects a string literal"),
                    ));
                }
            };
            return Ok(Self(AttrItem::KeyValue { key, value }));
        }

        Ok(Self(AttrItem::Flag(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    #[test]
    fn test_parse_pairs_and_flags() {
        let tokens = quote!(config = "PORT", env = "APP_PORT", skip);
        let parsed: AttrArgsParser = syn::parse2(tokens).unwrap();

        let pairs: Vec<_> = parsed
            .0
            .pairs()
            .map(|(k, v)| (k.to_string(), v.value()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("config".to_string(), "PORT".to_string()),
                ("env".to_string(), "APP_PORT".to_string()),
            ]
        );
        assert!(parsed.0.has_flag("skip"));
    }

    #[test]
    fn test_reject_non_string_value() {
        let tokens = quote!(config = 42);
        let err = syn::parse2::<AttrArgsParser>(tokens).err().unwrap();
        assert_eq!(err.to_string(), "tag `config` expects a string literal");
    }

    #[test]
    fn test_unknown_flags() {
        let tokens = quote!(skip, flatten);
        let parsed: AttrArgsParser = syn::parse2(tokens).unwrap();

        let unknown: Vec<_> = parsed.0.unknown_flags(&["skip"]).map(ToString::to_string).collect();
        assert_eq!(unknown, vec!["flatten"]);
    }

    #[test]
    fn test_bare_attribute_is_rejected() {
        let attr: Attribute = syn::parse_quote!(#[tag]);
        assert!(parse_attr(&attr, "tag").is_err());
    }

    #[test]
    fn test_other_attributes_are_ignored() {
        let attr: Attribute = syn::parse_quote!(#[serde(rename = "x")]);
        assert!(parse_attr(&attr, "tag").unwrap().is_none());
    }
}
