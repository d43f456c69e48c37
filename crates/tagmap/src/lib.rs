//! # tagmap
//!
//! Flattens a typed configuration record into a map of tagged values.
//!
//! Only fields carrying a tag are exported; the tag value becomes the key.
//! Untagged fields holding a nested record, directly or behind a pointer, are
//! searched for more tagged fields. The resulting [`Vars`] borrows the record
//! and hands the values to a loader that knows nothing about the record type.
//!
//! ## Key Components
//!
//! - **[`Reflect`] / [`Record`]**: the per-type contract, usually generated by
//!   `#[derive(Record)]`
//! - **[`collect`]**: the recursive field collector with recursion detection
//! - **[`to_map`] / [`RecordExt::to_vars`]**: fold collected fields into
//!   [`Vars`], rejecting duplicate tags
//!
//! ## Usage
//!
//! ```rust
//! use tagmap::{Record, RecordExt};
//!
//! #[derive(Debug, Record)]
//! struct Limits {
//!     #[tag(config = "MAX_ENTRIES")]
//!     max_entries: u32,
//! }
//!
//! #[derive(Debug, Record)]
//! struct Datapath {
//!     #[tag(config = "ENABLE_IPV6")]
//!     enable_ipv6: bool,
//!     limits: Limits,
//!     #[tag(skip)]
//!     _scratch: std::cell::Cell<u8>,
//! }
//!
//! let datapath = Datapath {
//!     enable_ipv6: true,
//!     limits: Limits { max_entries: 65536 },
//!     _scratch: Default::default(),
//! };
//!
//! let vars = datapath.to_vars().unwrap();
//! assert_eq!(vars.len(), 2);
//! assert_eq!(vars.get_as::<bool>("ENABLE_IPV6"), Some(&true));
//! assert_eq!(vars.get_as::<u32>("MAX_ENTRIES"), Some(&65536));
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Lets `#[derive(Record)]` refer to `::tagmap` from inside this crate.
extern crate self as tagmap;

pub mod collect;
pub mod error;
pub mod map;
pub mod record;
pub mod reflect;

pub use collect::{VisitedTypes, check_shape, collect};
pub use error::{Error, ErrorKind};
pub use map::{RecordExt, Vars, to_map, to_map_with_tag};
pub use record::{Field, FieldShape, Record, Tags};
pub use reflect::{RecordShape, Reflect, Shape};

#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use tagmap_macros::Record;

/// Tag name selecting the fields exported by [`to_map`] and [`RecordExt::to_vars`].
pub const TAG_NAME: &str = "config";

/// Result type used throughout tagmap
pub type Result<T> = std::result::Result<T, Error>;

/// Common imports for declaring and converting records
pub mod prelude {
    pub use super::{
        Error, ErrorKind, Record, RecordExt, Reflect, Result, TAG_NAME, Vars, impl_opaque, to_map,
    };
}
