//! Recursive collection of tagged fields.
//!
//! [`collect`] walks a record in declaration order. A field carrying the tag
//! is taken as is and never descended into. Untagged fields holding a record,
//! or a pointer to one, are descended into and their tagged fields are
//! spliced in at the container's position. Everything else is skipped.
//!
//! Each descent enters the record's type into a [`VisitedTypes`] cursor and
//! removes it again on the way out, so a type reaching itself is reported as
//! [`Error::RecursiveType`] instead of looping forever. Where no value is
//! available to descend into (absent pointers, tagged fields) the static
//! [`Shape`] of the type is checked instead. The type behind a tagged field
//! only fails that check when it leads back to a record on the current path;
//! cycles closed entirely inside it are accepted.

use std::any::TypeId;
use std::collections::HashSet;

use crate::error::Error;
use crate::record::Field;
use crate::reflect::{RecordShape, Reflect, Shape};
use crate::Result;

/// Record types on the current descent path.
#[derive(Debug, Default)]
pub struct VisitedTypes {
    types: HashSet<TypeId>,
}

impl VisitedTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, record: &RecordShape) -> bool {
        self.types.contains(&record.type_id())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Run `f` with `record` on the path. Fails if it is already there.
    fn descend<T>(
        &mut self,
        record: RecordShape,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if !self.types.insert(record.type_id()) {
            return Err(Error::recursive_type(record.type_name()));
        }
        let result = f(self);
        self.types.remove(&record.type_id());
        result
    }
}

/// Collect every field reachable from `value` that carries the tag `tag`.
///
/// `value` must be a record. The returned fields are in declaration order,
/// depth first. `visited` is left as it was found, on success and on error.
pub fn collect<'a>(
    value: &'a dyn Reflect,
    tag: &str,
    visited: &mut VisitedTypes,
) -> Result<Vec<Field<'a>>> {
    let (Shape::Record(shape), Some(record)) = (value.shape(), value.as_record()) else {
        return Err(Error::not_a_struct(value.type_name()));
    };

    visited.descend(shape, |visited| {
        let fields = record.fields();
        let mut collected = Vec::with_capacity(fields.len());

        for field in fields {
            if let Some(name) = field.tag(tag) {
                check_tagged(field.field_shape().shape(), visited)
                    .map_err(|e| e.in_field(field.name()))?;
                tracing::trace!(field = field.name(), tag = name, "collected tagged field");
                collected.push(field);
                continue;
            }

            let nested = match field.field_shape().shape() {
                Shape::Record(_) => field.value(),
                Shape::Pointer(elem) => {
                    let Shape::Record(target) = elem() else {
                        continue;
                    };
                    match field.value().pointee() {
                        Some(pointee) => pointee,
                        None => {
                            // A self-reference is reported even when absent.
                            check_record(target, tag, visited).map_err(|e| e.in_field(field.name()))?;
                            return Err(Error::nil_nested_reference(target.type_name())
                                .in_field(field.name()));
                        }
                    }
                }
                Shape::Opaque => continue,
            };

            tracing::trace!(field = field.name(), "descending into nested record");
            let inner = collect(nested, tag, visited).map_err(|e| e.in_field(field.name()))?;
            collected.extend(inner);
        }

        Ok(collected)
    })
}

/// Check the type described by `shape` for recursion without a value.
///
/// Follows the same route [`collect`] would take: untagged records and
/// pointers to records are entered on the `visited` path, tagged fields are
/// only checked against it.
pub fn check_shape(shape: Shape, tag: &str, visited: &mut VisitedTypes) -> Result<()> {
    match shape.record_behind_pointer() {
        Some(record) => check_record(record, tag, visited),
        None => Ok(()),
    }
}

fn check_record(record: RecordShape, tag: &str, visited: &mut VisitedTypes) -> Result<()> {
    visited.descend(record, |visited| {
        for field in record.fields() {
            let checked = if field.tag(tag).is_some() {
                check_tagged(field.shape(), visited)
            } else {
                check_shape(field.shape(), tag, visited)
            };
            checked.map_err(|e| e.in_field(field.name()))?;
        }
        Ok(())
    })
}

/// Fail if the type behind a tagged field reaches a record on `path`.
fn check_tagged(shape: Shape, path: &VisitedTypes) -> Result<()> {
    let mut seen = HashSet::new();
    reaches_path(shape, path, &mut seen)
}

fn reaches_path(shape: Shape, path: &VisitedTypes, seen: &mut HashSet<TypeId>) -> Result<()> {
    let Some(record) = shape.record_behind_pointer() else {
        return Ok(());
    };
    if path.contains(&record) {
        return Err(Error::recursive_type(record.type_name()));
    }
    if !seen.insert(record.type_id()) {
        return Ok(());
    }
    for field in record.fields() {
        reaches_path(field.shape(), path, seen).map_err(|e| e.in_field(field.name()))?;
    }
    Ok(())
}
