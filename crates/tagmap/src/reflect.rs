//! The reflection contract every participating type implements.
//!
//! Types describe themselves statically through [`Shape`] and dynamically
//! through [`Reflect`]. Three shapes matter to the collector:
//!
//! - records, which expose their fields (see [`Record`]);
//! - pointers, which may or may not have a target;
//! - everything else, which is opaque and never walked.
//!
//! `Box`, `Rc` and `Arc` are pointers that always have a target. `Option<T>`
//! is a nullable pointer, and `Option<Box<T>>` collapses into a single
//! nullable pointer to `T`.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::record::{FieldShape, Record};

/// Static description of a type.
#[derive(Clone, Copy)]
pub enum Shape {
    /// A record with enumerable fields.
    Record(RecordShape),
    /// A reference; the function yields the shape of the pointee.
    Pointer(fn() -> Shape),
    /// Anything the collector does not look into.
    Opaque,
}

impl Shape {
    /// The record this shape describes, either directly or through one pointer.
    pub fn record_behind_pointer(self) -> Option<RecordShape> {
        match self {
            Self::Record(record) => Some(record),
            Self::Pointer(elem) => match elem() {
                Self::Record(record) => Some(record),
                _ => None,
            },
            Self::Opaque => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Record(record) => f.debug_tuple("Record").field(record).finish(),
            Self::Pointer(elem) => f.debug_tuple("Pointer").field(&elem()).finish(),
            Self::Opaque => f.write_str("Opaque"),
        }
    }
}

/// Static identity and layout of a record type.
#[derive(Clone, Copy)]
pub struct RecordShape {
    id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<FieldShape>,
}

impl RecordShape {
    pub fn of<R: Record>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
            fields: R::field_shapes,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order.
    pub fn fields(&self) -> Vec<FieldShape> {
        (self.fields)()
    }
}

impl fmt::Debug for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Field shapes are not expanded: recursive types would never finish.
        f.debug_struct("RecordShape")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Runtime view of a value the collector can inspect.
///
/// Implemented for records by `#[derive(Record)]`, for opaque types by
/// [`impl_opaque!`](crate::impl_opaque), and for the standard pointer and
/// collection types below.
pub trait Reflect: Any + fmt::Debug {
    /// Shape of `Self`, available without a value.
    fn type_shape() -> Shape
    where
        Self: Sized;

    /// Shape of the concrete type behind `self`.
    fn shape(&self) -> Shape;

    /// Target of a pointer, or `None` for absent pointers and non-pointers.
    fn pointee(&self) -> Option<&dyn Reflect> {
        None
    }

    /// Record view of `self`, if it is a record.
    fn as_record(&self) -> Option<&dyn Record> {
        None
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Implement [`Reflect`] as an opaque value for one or more types.
///
/// ```
/// use tagmap::{Reflect, Shape, impl_opaque};
///
/// #[derive(Debug)]
/// enum Mode {
///     Fast,
///     Safe,
/// }
///
/// impl_opaque!(Mode);
///
/// assert!(matches!(Mode::Fast.shape(), Shape::Opaque));
/// ```
#[macro_export]
macro_rules! impl_opaque {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Reflect for $ty {
                fn type_shape() -> $crate::Shape {
                    $crate::Shape::Opaque
                }

                fn shape(&self) -> $crate::Shape {
                    $crate::Shape::Opaque
                }
            }
        )+
    };
}

impl_opaque!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
    std::time::Duration,
    std::path::PathBuf,
    std::net::IpAddr,
    std::net::Ipv4Addr,
    std::net::Ipv6Addr,
    std::net::SocketAddr,
);

macro_rules! impl_opaque_generic {
    ($($ty:ident<$($param:ident),+>),+ $(,)?) => {
        $(
            impl<$($param: fmt::Debug + 'static),+> Reflect for $ty<$($param),+> {
                fn type_shape() -> Shape {
                    Shape::Opaque
                }

                fn shape(&self) -> Shape {
                    Shape::Opaque
                }
            }
        )+
    };
}

impl_opaque_generic!(
    Vec<T>,
    HashMap<K, V>,
    BTreeMap<K, V>,
    HashSet<T>,
    BTreeSet<T>,
);

impl<T: fmt::Debug + 'static, const N: usize> Reflect for [T; N] {
    fn type_shape() -> Shape {
        Shape::Opaque
    }

    fn shape(&self) -> Shape {
        Shape::Opaque
    }
}

macro_rules! impl_pointer {
    ($($ptr:ident),+ $(,)?) => {
        $(
            impl<T: Reflect> Reflect for $ptr<T> {
                fn type_shape() -> Shape {
                    Shape::Pointer(T::type_shape)
                }

                fn shape(&self) -> Shape {
                    Self::type_shape()
                }

                fn pointee(&self) -> Option<&dyn Reflect> {
                    Some(&**self)
                }
            }
        )+
    };
}

impl_pointer!(Box, Rc, Arc);

impl<T: Reflect> Reflect for Option<T> {
    fn type_shape() -> Shape {
        match T::type_shape() {
            // Option<Box<T>> is a single nullable pointer to T.
            Shape::Pointer(elem) => Shape::Pointer(elem),
            _ => Shape::Pointer(T::type_shape),
        }
    }

    fn shape(&self) -> Shape {
        Self::type_shape()
    }

    fn pointee(&self) -> Option<&dyn Reflect> {
        let inner = self.as_ref()?;
        if T::type_shape().is_pointer() {
            inner.pointee()
        } else {
            Some(inner)
        }
    }
}
