//! Folding collected fields into a variable map.

use std::any::Any;
use std::collections::HashMap;
use std::collections::hash_map::{self, Entry};

use crate::collect::{VisitedTypes, collect};
use crate::error::Error;
use crate::record::{Field, Record};
use crate::reflect::Reflect;
use crate::{Result, TAG_NAME};

/// Tag values mapped to the fields carrying them.
///
/// Values borrow the record they were collected from and keep their declared
/// types; use [`Vars::get_as`] to get a typed reference back.
#[derive(Debug, Clone, Default)]
pub struct Vars<'a> {
    vars: HashMap<&'static str, &'a dyn Reflect>,
}

impl<'a> Vars<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&'a dyn Reflect> {
        self.vars.get(key).copied()
    }

    /// The value under `key`, if present and of type `T`.
    pub fn get_as<T: Any>(&self, key: &str) -> Option<&'a T> {
        let value: &'a dyn Any = self.get(key)?;
        value.downcast_ref()
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.vars.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'a dyn Reflect)> + '_ {
        self.vars.iter().map(|(key, value)| (*key, *value))
    }

    /// Insert a collected field under its `tag` value.
    fn insert_field(&mut self, field: &Field<'a>, tag: &str) -> Result<()> {
        let Some(key) = field.tag(tag) else {
            return Err(Error::untagged_field(field.name()));
        };

        match self.vars.entry(key) {
            Entry::Occupied(_) => Err(Error::duplicate_tag(key, field.name())),
            Entry::Vacant(slot) => {
                slot.insert(field.value());
                Ok(())
            }
        }
    }
}

impl<'a> IntoIterator for Vars<'a> {
    type Item = (&'static str, &'a dyn Reflect);
    type IntoIter = hash_map::IntoIter<&'static str, &'a dyn Reflect>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

/// Convert a reference to a record into a variable map keyed by
/// [`TAG_NAME`] tag values.
///
/// `value` must be a pointer (`Option`, `Box`, `Rc` or `Arc`) with a target,
/// and the target must be a record.
///
/// ```
/// use tagmap::{Record, to_map};
///
/// #[derive(Debug, Record)]
/// struct Inner {
///     #[tag(config = "c")]
///     c: i32,
/// }
///
/// #[derive(Debug, Record)]
/// struct Outer {
///     #[tag(config = "a")]
///     a: i32,
///     b: Box<Inner>,
/// }
///
/// let outer = Box::new(Outer { a: 1, b: Box::new(Inner { c: 2 }) });
/// let vars = to_map(&outer).unwrap();
///
/// assert_eq!(vars.get_as::<i32>("a"), Some(&1));
/// assert_eq!(vars.get_as::<i32>("c"), Some(&2));
/// ```
pub fn to_map(value: &dyn Reflect) -> Result<Vars<'_>> {
    to_map_with_tag(value, TAG_NAME)
}

/// Like [`to_map`], selecting fields by the tag `tag` instead.
pub fn to_map_with_tag<'a>(value: &'a dyn Reflect, tag: &str) -> Result<Vars<'a>> {
    if !value.shape().is_pointer() {
        return Err(Error::not_a_pointer(value.type_name()));
    }
    let Some(record) = value.pointee() else {
        return Err(Error::nil_reference(value.type_name()));
    };

    build(record, tag)
}

/// Conversion entry points for values already known to be records.
pub trait RecordExt: Record + Sized {
    /// Convert `self` into a variable map keyed by [`TAG_NAME`] tag values.
    fn to_vars(&self) -> Result<Vars<'_>> {
        self.to_vars_with_tag(TAG_NAME)
    }

    fn to_vars_with_tag(&self, tag: &str) -> Result<Vars<'_>> {
        build(self, tag)
    }
}

impl<R: Record> RecordExt for R {}

fn build<'a>(record: &'a dyn Reflect, tag: &str) -> Result<Vars<'a>> {
    let result = collect(record, tag, &mut VisitedTypes::new()).and_then(|fields| fold(&fields, tag));

    match &result {
        Ok(vars) => {
            tracing::debug!(record = record.type_name(), vars = vars.len(), "converted record to vars");
        }
        Err(e) => {
            tracing::debug!(record = record.type_name(), error = %e, "record conversion failed");
        }
    }
    result
}

fn fold<'a>(fields: &[Field<'a>], tag: &str) -> Result<Vars<'a>> {
    let mut vars = Vars {
        vars: HashMap::with_capacity(fields.len()),
    };
    for field in fields {
        vars.insert_field(field, tag)?;
    }
    Ok(vars)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::ErrorKind;
    use crate::record::Tags;

    #[test]
    fn test_fold_rejects_untagged_field() {
        let port = 80_u16;
        let fields = [Field::new("port", Tags::EMPTY, &port)];

        let err = fold(&fields, TAG_NAME).unwrap_err();
        assert_eq!(err, Error::untagged_field("port"));
    }

    #[test]
    fn test_fold_rejects_duplicate_tag() {
        const X: Tags = Tags::new(&[("config", "x")]);
        let (a, c) = (1_i32, 2_i32);
        let fields = [Field::new("A", X, &a), Field::new("C", X, &c)];

        let err = fold(&fields, TAG_NAME).unwrap_err();
        assert_eq!(err, Error::duplicate_tag("x", "C"));
        assert_eq!(err.kind(), ErrorKind::DuplicateTag);
    }

    #[test]
    fn test_fold_keeps_values_typed() {
        const NAME: Tags = Tags::new(&[("config", "NAME")]);
        const PORT: Tags = Tags::new(&[("config", "PORT")]);
        let name = String::from("edge");
        let port = 443_u16;
        let fields = [Field::new("name", NAME, &name), Field::new("port", PORT, &port)];

        let vars = fold(&fields, TAG_NAME).unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars.get_as::<String>("NAME").map(String::as_str), Some("edge"));
        assert_eq!(vars.get_as::<u16>("PORT"), Some(&443));
        assert_eq!(vars.get_as::<u32>("PORT"), None);
        assert!(vars.get("MISSING").is_none());
    }

    #[test]
    fn test_scalar_is_not_a_pointer() {
        let err = to_map(&3_u32).unwrap_err();
        assert_eq!(err, Error::not_a_pointer("u32"));
    }

    #[test]
    fn test_absent_pointer_is_nil_reference() {
        let value: Option<Box<u32>> = None;
        let err = to_map(&value).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NilReference);
    }

    #[test]
    fn test_pointer_to_scalar_is_not_a_struct() {
        let value = Box::new(3_u32);
        let err = to_map(&value).unwrap_err();
        assert_eq!(err, Error::not_a_struct("u32"));
    }
}
