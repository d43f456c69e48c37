//! Conversion error types

use smallvec::SmallVec;
use thiserror::Error;

/// Errors raised while turning a record into a variable map.
///
/// Every variant signals a defect in the record's type or tagging, never a
/// transient condition. Recursive descent wraps errors in [`Error::Field`] so
/// the offending field can be traced back from the top-level record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The top-level input is not a reference.
    #[error("{type_name} is not a pointer to struct")]
    NotAPointer { type_name: &'static str },

    /// The top-level reference has no target.
    #[error("nil pointer to {type_name}")]
    NilReference { type_name: &'static str },

    /// A value expected to be a record is something else.
    #[error("{type_name} is not a struct")]
    NotAStruct { type_name: &'static str },

    /// A record type reaches itself through nesting or pointers.
    #[error("recursion on type {type_name}")]
    RecursiveType { type_name: &'static str },

    /// An untagged reference to a record has no target.
    #[error("nil pointer to {type_name}")]
    NilNestedReference { type_name: &'static str },

    /// A collected field does not carry the tag.
    #[error("field {field} has no tag")]
    UntaggedField { field: &'static str },

    /// Two fields carry the same tag value.
    #[error("tag {tag} on field {field} occurs multiple times in object")]
    DuplicateTag { tag: &'static str, field: &'static str },

    /// Error raised while descending into a field.
    #[error("field {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<Error>,
    },
}

/// Discriminant of an [`Error`], ignoring field breadcrumbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotAPointer,
    NilReference,
    NotAStruct,
    RecursiveType,
    NilNestedReference,
    UntaggedField,
    DuplicateTag,
}

impl Error {
    pub fn not_a_pointer(type_name: &'static str) -> Self {
        Self::NotAPointer { type_name }
    }

    pub fn nil_reference(type_name: &'static str) -> Self {
        Self::NilReference { type_name }
    }

    pub fn not_a_struct(type_name: &'static str) -> Self {
        Self::NotAStruct { type_name }
    }

    pub fn recursive_type(type_name: &'static str) -> Self {
        Self::RecursiveType { type_name }
    }

    pub fn nil_nested_reference(type_name: &'static str) -> Self {
        Self::NilNestedReference { type_name }
    }

    pub fn untagged_field(field: &'static str) -> Self {
        Self::UntaggedField { field }
    }

    pub fn duplicate_tag(tag: &'static str, field: &'static str) -> Self {
        Self::DuplicateTag { tag, field }
    }

    /// Wrap this error with the name of the field being descended into.
    pub fn in_field(self, field: &'static str) -> Self {
        Self::Field {
            field,
            source: Box::new(self),
        }
    }

    /// The innermost error, with all field wrappers removed.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Self::Field { source, .. } = current {
            current = source;
        }
        current
    }

    /// Kind of the innermost error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAPointer { .. } => ErrorKind::NotAPointer,
            Self::NilReference { .. } => ErrorKind::NilReference,
            Self::NotAStruct { .. } => ErrorKind::NotAStruct,
            Self::RecursiveType { .. } => ErrorKind::RecursiveType,
            Self::NilNestedReference { .. } => ErrorKind::NilNestedReference,
            Self::UntaggedField { .. } => ErrorKind::UntaggedField,
            Self::DuplicateTag { .. } => ErrorKind::DuplicateTag,
            Self::Field { source, .. } => source.kind(),
        }
    }

    /// Field names from the top-level record down to the failure.
    pub fn path(&self) -> SmallVec<[&'static str; 4]> {
        let mut path = SmallVec::new();
        let mut current = self;
        while let Self::Field { field, source } = current {
            path.push(*field);
            current = source;
        }
        path
    }
}
