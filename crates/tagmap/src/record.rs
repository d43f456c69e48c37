//! Records and their field descriptors.

use std::fmt;

use crate::reflect::{Reflect, Shape};

/// A struct whose fields can be enumerated.
///
/// Usually derived with `#[derive(Record)]`; a hand-written implementation
/// must list the same fields, in the same order, from both methods.
///
/// ```
/// use tagmap::{Field, FieldShape, Record, RecordShape, Reflect, Shape, Tags};
///
/// #[derive(Debug)]
/// struct Limits {
///     max_entries: u32,
/// }
///
/// const MAX_ENTRIES: Tags = Tags::new(&[("config", "MAX_ENTRIES")]);
///
/// impl Reflect for Limits {
///     fn type_shape() -> Shape {
///         Shape::Record(RecordShape::of::<Self>())
///     }
///
///     fn shape(&self) -> Shape {
///         Self::type_shape()
///     }
///
///     fn as_record(&self) -> Option<&dyn Record> {
///         Some(self)
///     }
/// }
///
/// impl Record for Limits {
///     fn fields(&self) -> Vec<Field<'_>> {
///         vec![Field::new("max_entries", MAX_ENTRIES, &self.max_entries)]
///     }
///
///     fn field_shapes() -> Vec<FieldShape> {
///         vec![FieldShape::of::<u32>("max_entries", MAX_ENTRIES)]
///     }
/// }
///
/// let limits = Limits { max_entries: 1024 };
/// assert_eq!(limits.fields()[0].tag("config"), Some("MAX_ENTRIES"));
/// ```
pub trait Record: Reflect {
    /// Field descriptors borrowing the current values, in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Field descriptors without values, in declaration order.
    fn field_shapes() -> Vec<FieldShape>
    where
        Self: Sized;
}

/// Tags attached to a field at its declaration, as `(name, value)` pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags(&'static [(&'static str, &'static str)]);

impl Tags {
    pub const EMPTY: Self = Self(&[]);

    pub const fn new(pairs: &'static [(&'static str, &'static str)]) -> Self {
        Self(pairs)
    }

    /// Value of the tag `name`; empty values count as absent.
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .filter(|value| !value.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().copied()
    }
}

/// Static description of one field: name, tags and the shape of its type.
#[derive(Clone, Copy)]
pub struct FieldShape {
    name: &'static str,
    tags: Tags,
    shape: fn() -> Shape,
}

impl FieldShape {
    pub fn of<T: Reflect>(name: &'static str, tags: Tags) -> Self {
        Self {
            name,
            tags,
            shape: T::type_shape,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tags(&self) -> Tags {
        self.tags
    }

    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags.get(name)
    }

    pub fn shape(&self) -> Shape {
        (self.shape)()
    }
}

impl fmt::Debug for FieldShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldShape")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// One field of a record together with a handle to its current value.
#[derive(Clone, Copy)]
pub struct Field<'a> {
    shape: FieldShape,
    value: &'a dyn Reflect,
}

impl<'a> Field<'a> {
    pub fn new<T: Reflect>(name: &'static str, tags: Tags, value: &'a T) -> Self {
        Self {
            shape: FieldShape::of::<T>(name, tags),
            value,
        }
    }

    pub fn name(&self) -> &'static str {
        self.shape.name
    }

    pub fn tags(&self) -> Tags {
        self.shape.tags
    }

    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.shape.tag(name)
    }

    /// Static description of the declared type.
    pub fn field_shape(&self) -> FieldShape {
        self.shape
    }

    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.shape.name)
            .field("tags", &self.shape.tags)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TAGS: Tags = Tags::new(&[("config", "PORT"), ("json", ""), ("env", "APP_PORT")]);

    #[test]
    fn test_tag_lookup_by_name() {
        assert_eq!(TAGS.get("config"), Some("PORT"));
        assert_eq!(TAGS.get("env"), Some("APP_PORT"));
        assert_eq!(TAGS.get("yaml"), None);
    }

    #[test]
    fn test_empty_tag_value_is_absent() {
        assert_eq!(TAGS.get("json"), None);
        assert!(Tags::EMPTY.is_empty());
        assert_eq!(Tags::EMPTY.get("config"), None);
    }

    #[test]
    fn test_field_exposes_value_and_shape() {
        let port = 8080_u16;
        let field = Field::new("port", TAGS, &port);

        assert_eq!(field.name(), "port");
        assert_eq!(field.tag("config"), Some("PORT"));
        assert!(matches!(field.field_shape().shape(), Shape::Opaque));

        let any: &dyn std::any::Any = field.value();
        assert_eq!(any.downcast_ref::<u16>(), Some(&8080));
    }
}
